//! Deckpull engine: submission, progress streaming and effect execution.
mod client;
mod download;
mod engine;
mod filename;
mod monitor;
mod persist;
mod settings;
mod sse;
mod types;

pub use client::{ExtractionClient, ReqwestExtractionClient};
pub use download::{DownloadError, Downloader};
pub use engine::EngineHandle;
pub use filename::download_filename;
pub use monitor::{ProgressMonitor, Subscription};
pub use persist::{PartialDownload, PersistError};
pub use settings::EngineConfig;
pub use sse::{decode_server_event, DecodeError, SseDecoder};
pub use types::{EngineEvent, EngineStopped, MonitorEvent, SubmissionError, SubmissionFailure};
