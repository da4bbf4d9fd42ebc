//! Deckpull core: pure upload/monitor state machine and view-model helpers.
mod effect;
mod msg;
mod selection;
mod state;
mod task;
mod update;
mod view_model;

pub use effect::{Effect, Notice};
pub use msg::Msg;
pub use selection::{format_size, FileHandle, SelectedFile, ValidationError, ACCEPTED_EXTENSION};
pub use state::{AppState, DownloadStatus, ProgressSnapshot, SessionState};
pub use task::{ResultSummary, ServerEvent, SubmissionId, SubmissionOptions, TaskHandle};
pub use update::update;
pub use view_model::{AppViewModel, FileView, ProgressView, ResultView};
