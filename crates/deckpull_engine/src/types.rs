use std::fmt;
use std::path::PathBuf;

use deckpull_core::{ServerEvent, SubmissionId, TaskHandle};

use crate::download::DownloadError;

pub(crate) const DEFAULT_REJECTION: &str = "Extraction failed, please retry";
pub(crate) const DEFAULT_NETWORK_ERROR: &str = "Network error, please retry";

/// What the engine reports back to the host loop.
#[derive(Debug)]
pub enum EngineEvent {
    Submitted {
        submission: SubmissionId,
        result: Result<TaskHandle, SubmissionError>,
    },
    Stream {
        task: TaskHandle,
        event: MonitorEvent,
    },
    Downloaded {
        url: String,
        result: Result<PathBuf, DownloadError>,
    },
}

/// The engine worker thread is gone; no further events will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine worker has stopped")]
pub struct EngineStopped;

/// One item of a progress subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Decoded message, delivered in server-send order.
    Server(ServerEvent),
    /// Synthesized once when the transport fails before a terminal message.
    Disconnected { reason: String },
}

impl MonitorEvent {
    pub fn is_terminal(&self) -> bool {
        match self {
            MonitorEvent::Server(event) => event.is_terminal(),
            MonitorEvent::Disconnected { .. } => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub kind: SubmissionFailure,
    pub message: String,
}

impl SubmissionError {
    pub(crate) fn new(kind: SubmissionFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Uses the server's message when it sent a non-empty one, otherwise the default for `kind`.
    pub(crate) fn with_server_message(kind: SubmissionFailure, message: Option<String>) -> Self {
        match message.filter(|m| !m.trim().is_empty()) {
            Some(message) => Self::new(kind, message),
            None => {
                let fallback = kind.default_message();
                Self::new(kind, fallback)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    FileUnreadable,
    InvalidEndpoint,
    /// The multipart body could not be assembled.
    InvalidRequest,
    Network,
    Timeout,
    HttpStatus(u16),
    /// Transport succeeded but the body said `success: false` or had no task id.
    Rejected,
    MalformedResponse,
}

impl SubmissionFailure {
    fn default_message(&self) -> &'static str {
        match self {
            SubmissionFailure::Network | SubmissionFailure::Timeout => DEFAULT_NETWORK_ERROR,
            _ => DEFAULT_REJECTION,
        }
    }
}

impl fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionFailure::FileUnreadable => write!(f, "file unreadable"),
            SubmissionFailure::InvalidEndpoint => write!(f, "invalid endpoint"),
            SubmissionFailure::InvalidRequest => write!(f, "invalid request"),
            SubmissionFailure::Network => write!(f, "network error"),
            SubmissionFailure::Timeout => write!(f, "timeout"),
            SubmissionFailure::HttpStatus(code) => write!(f, "http status {code}"),
            SubmissionFailure::Rejected => write!(f, "rejected"),
            SubmissionFailure::MalformedResponse => write!(f, "malformed response"),
        }
    }
}
