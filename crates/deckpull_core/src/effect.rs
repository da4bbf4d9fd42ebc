use std::fmt;

use crate::{SelectedFile, SubmissionId, SubmissionOptions, TaskHandle, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the file to the extraction service.
    Submit {
        submission: SubmissionId,
        file: SelectedFile,
        options: SubmissionOptions,
    },
    /// Open the progress stream for `task`.
    OpenStream { task: TaskHandle },
    /// Close the progress stream for `task`. Closing twice is harmless.
    CloseStream { task: TaskHandle },
    /// Fetch the finished document.
    Download { url: String },
    /// Show a blocking notification to the user.
    Notify(Notice),
}

const CONNECTION_LOST: &str = "Connection lost, please retry";

/// A user-facing failure. Every variant is recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Local rejection; never reached the server.
    Validation(ValidationError),
    /// Submit request failed or was rejected.
    SubmissionFailed(String),
    /// Server reported the job as failed over the stream.
    JobFailed(String),
    /// Stream dropped before a terminal event. Carries the transport's reason.
    ConnectionLost(String),
    /// Result download failed; the job itself succeeded.
    DownloadFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Validation(err) => write!(f, "{err}"),
            Notice::SubmissionFailed(message) => write!(f, "submission failed: {message}"),
            Notice::JobFailed(message) => write!(f, "extraction failed: {message}"),
            Notice::ConnectionLost(reason) if reason.trim().is_empty() => {
                write!(f, "{CONNECTION_LOST}")
            }
            Notice::ConnectionLost(reason) => write!(f, "{CONNECTION_LOST} ({reason})"),
            Notice::DownloadFailed(message) => write!(f, "download failed: {message}"),
        }
    }
}
