//! Configuration module
//!
//! The configuration is read once by the entrypoint and passed by reference into
//! every operation. Nothing in the workspace reads the environment after startup.

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_INPUT_PREFIX, DEFAULT_MAX_RECURSION_DEPTH, DEFAULT_MAX_WORKERS, DEFAULT_OUTPUT_PREFIX,
    DEFAULT_REGION,
};
use crate::storage_types::StorageBackend;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Credentials injected by the function runtime (or the local shell).
#[derive(Clone, Default)]
pub struct Credentials {
    pub secret_id: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Target bucket; preferably the full `<bucket>-<appid>` form.
    pub cos_bucket: Option<String>,
    /// Prefix watched for archive uploads. Always empty or ending in `/`.
    pub input_prefix: String,
    /// Prefix receiving extracted files. Always empty or ending in `/`.
    pub output_prefix: String,
    pub region: String,
    pub credentials: Credentials,
    pub storage_backend: StorageBackend,
    pub storage_endpoint: Option<String>,
    pub local_storage_path: Option<PathBuf>,
    pub max_workers: usize,
    pub max_recursion_depth: u32,
    pub staging_dir: PathBuf,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        // TENCENTCLOUD_* is what the function runtime injects; the short names are for local runs.
        let either = |primary: &str, fallback: &str| var(primary).or_else(|| var(fallback));

        let region = either("TENCENTCLOUD_REGION", "REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let max_workers = var("MAX_WORKERS")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_WORKERS);

        let max_recursion_depth = var("MAX_RECURSION_DEPTH")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_RECURSION_DEPTH);

        let log_format = match var("LOG_FORMAT").map(|v| v.to_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Config {
            cos_bucket: var("COS_BUCKET"),
            input_prefix: ensure_trailing_slash(
                lookup("INPUT_PREFIX").unwrap_or_else(|| DEFAULT_INPUT_PREFIX.to_string()),
            ),
            output_prefix: ensure_trailing_slash(
                lookup("OUTPUT_PREFIX").unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
            ),
            credentials: Credentials {
                secret_id: either("TENCENTCLOUD_SECRETID", "SECRETID"),
                secret_key: either("TENCENTCLOUD_SECRETKEY", "SECRETKEY"),
                session_token: either("TENCENTCLOUD_SESSIONTOKEN", "SESSIONTOKEN"),
            },
            storage_endpoint: var("STORAGE_ENDPOINT"),
            local_storage_path: var("LOCAL_STORAGE_PATH").map(PathBuf::from),
            staging_dir: var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            region,
            storage_backend,
            max_workers,
            max_recursion_depth,
            log_format,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_workers == 0 {
            return Err(anyhow::anyhow!("MAX_WORKERS must be greater than zero"));
        }

        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when using local storage backend"
            ));
        }

        Ok(())
    }

    /// Endpoint for the S3-compatible API; COS is addressed per region.
    pub fn s3_endpoint(&self) -> String {
        self.storage_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cos.{}.myqcloud.com", self.region))
    }
}

fn ensure_trailing_slash(prefix: String) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix
    } else {
        format!("{}/", prefix)
    }
}
