use std::fmt;

/// Identifies one submit attempt so a late outcome can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SubmissionId(pub u64);

/// Server-issued identifier that correlates a submission with its progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options sent with a submission. Copied at submit time; later toggles do not affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOptions {
    pub column_sort: bool,
    pub keep_format: bool,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            column_sort: true,
            keep_format: true,
        }
    }
}

/// Summary of a finished extraction, immutable once shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub total_slides: u32,
    /// Not every server build reports this; absent stays absent.
    pub text_blocks: Option<u32>,
    /// Already formatted by the server, e.g. `"1.2 MB"`.
    pub file_size: String,
    /// Opaque reference, not validated by the client.
    pub download_url: String,
}

/// One decoded message from the progress stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Percent is passed through as sent; it is not guaranteed to be monotonic.
    Progress { percent: u32, message: String },
    Completed(ResultSummary),
    Error { message: String },
}

impl ServerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ServerEvent::Progress { .. })
    }
}
