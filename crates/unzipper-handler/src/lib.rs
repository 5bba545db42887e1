//! Unzipper Handler
//!
//! Turns a COS PutObject notification into one recursive extraction: pick the
//! archive out of the event, resolve the bucket, stage the archive locally and
//! hand it to the extraction engine. Every outcome is reported as a
//! [`HandlerResponse`]; nothing escapes the handler as an error or a panic.

pub mod error;
pub mod event;
pub mod handler;
pub mod response;
pub mod telemetry;

pub use error::HandlerError;
pub use event::{CosEvent, SeenKey, Selection};
pub use handler::ArchiveHandler;
pub use response::HandlerResponse;
pub use telemetry::init_telemetry;
