//! Unzipper CLI: run one extraction the way a COS trigger would.
//!
//! Configuration comes from the environment (and `.env`); see `Config`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use unzipper_core::Config;
use unzipper_handler::{init_telemetry, ArchiveHandler, CosEvent, HandlerResponse};

#[derive(Parser)]
#[command(name = "unzipper", about = "Recursively extract a zip archive in object storage")]
struct Cli {
    /// Event JSON file, or `-` to read it from stdin
    #[arg(long, conflicts_with_all = ["key", "bucket"])]
    event: Option<PathBuf>,
    /// Object key of the archive [default: <INPUT_PREFIX>sample.zip]
    #[arg(long)]
    key: Option<String>,
    /// Bucket name for the synthesized event [default: COS_BUCKET]
    #[arg(long)]
    bucket: Option<String>,
}

fn read_event(path: &Path) -> anyhow::Result<CosEvent> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Read event file {}", path.display()))?
    };
    serde_json::from_str(&raw).context("Parse event JSON")
}

fn print_json(response: &HandlerResponse) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(response).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    init_telemetry(config.log_format)?;

    let event = match cli.event {
        Some(path) => read_event(&path)?,
        None => {
            let key = cli
                .key
                .unwrap_or_else(|| format!("{}sample.zip", config.input_prefix));
            CosEvent::single(cli.bucket.or_else(|| config.cos_bucket.clone()), key)
        }
    };

    let handler = ArchiveHandler::from_config(Arc::new(config));
    let response = handler.handle(&event).await;
    print_json(&response)?;

    Ok(if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
