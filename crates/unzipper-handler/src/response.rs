use serde::Serialize;
use unzipper_core::ErrorMetadata;
use unzipper_extract::LevelResult;

use crate::event::SeenKey;

/// Structured handler outcome, serialized with a `status` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HandlerResponse {
    Ok {
        bucket: String,
        source_key: String,
        output_prefix: String,
        #[serde(flatten)]
        result: LevelResult,
    },
    Ignored {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        keys: Option<Vec<SeenKey>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        bucket: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        input_prefix: Option<String>,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<String>,
    },
}

impl HandlerResponse {
    pub fn no_records() -> Self {
        HandlerResponse::Ignored {
            reason: "no records".to_string(),
            keys: None,
            bucket: None,
            input_prefix: None,
        }
    }

    pub fn no_archive(keys: Vec<SeenKey>, bucket: String, input_prefix: String) -> Self {
        HandlerResponse::Ignored {
            reason: "no zip in records".to_string(),
            keys: Some(keys),
            bucket: Some(bucket),
            input_prefix: Some(input_prefix),
        }
    }

    pub fn from_error<E: ErrorMetadata + std::fmt::Display>(error: &E) -> Self {
        HandlerResponse::Error {
            message: error.to_string(),
            error_code: Some(error.error_code().to_string()),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            HandlerResponse::Ok { .. } => "ok",
            HandlerResponse::Ignored { .. } => "ignored",
            HandlerResponse::Error { .. } => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HandlerResponse::Error { .. })
    }
}
