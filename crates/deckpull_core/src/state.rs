use std::path::PathBuf;

use crate::view_model::AppViewModel;
use crate::{Notice, ResultSummary, SelectedFile, SubmissionId, SubmissionOptions, TaskHandle};

/// Phase of the single upload/monitor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Selected,
    Submitting,
    Monitoring,
    Completed,
    Failed,
}

impl SessionState {
    /// A request or stream is in flight; submit and select are disabled.
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Submitting | SessionState::Monitoring)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub percent: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Pending,
    Saved(PathBuf),
    Failed(String),
}

/// The single source of truth for what the user sees. Mutated only by [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    selected: Option<SelectedFile>,
    options: SubmissionOptions,
    last_submission: SubmissionId,
    pending_submission: Option<SubmissionId>,
    task: Option<TaskHandle>,
    progress: Option<ProgressSnapshot>,
    result: Option<ResultSummary>,
    failure: Option<Notice>,
    download: Option<DownloadStatus>,
    auto_download: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session that fetches each finished document automatically.
    pub fn with_auto_download(mut self, enabled: bool) -> Self {
        self.auto_download = enabled;
        self
    }

    pub fn with_options(mut self, options: SubmissionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn options(&self) -> SubmissionOptions {
        self.options
    }

    pub fn task(&self) -> Option<&TaskHandle> {
        self.task.as_ref()
    }

    pub fn pending_submission(&self) -> Option<SubmissionId> {
        self.pending_submission
    }

    pub fn progress(&self) -> Option<&ProgressSnapshot> {
        self.progress.as_ref()
    }

    pub fn result(&self) -> Option<&ResultSummary> {
        self.result.as_ref()
    }

    pub fn failure(&self) -> Option<&Notice> {
        self.failure.as_ref()
    }

    pub fn download(&self) -> Option<&DownloadStatus> {
        self.download.as_ref()
    }

    pub fn auto_download(&self) -> bool {
        self.auto_download
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn select(&mut self, file: SelectedFile) {
        self.selected = Some(file);
        self.failure = None;
        self.session = SessionState::Selected;
        self.mark_dirty();
    }

    pub(crate) fn set_options(&mut self, options: SubmissionOptions) {
        if self.options != options {
            self.options = options;
            self.mark_dirty();
        }
    }

    /// Moves to `Submitting` and returns the id the outcome must carry.
    pub(crate) fn begin_submission(&mut self) -> SubmissionId {
        self.last_submission = SubmissionId(self.last_submission.0 + 1);
        self.pending_submission = Some(self.last_submission);
        self.failure = None;
        self.progress = Some(ProgressSnapshot {
            percent: 0,
            message: "Preparing...".to_string(),
        });
        self.session = SessionState::Submitting;
        self.mark_dirty();
        self.last_submission
    }

    pub(crate) fn accept_submission(&mut self, task: TaskHandle) {
        self.pending_submission = None;
        self.task = Some(task);
        self.session = SessionState::Monitoring;
        self.mark_dirty();
    }

    /// Back to `Selected`: the server never accepted a job, so the file stays.
    pub(crate) fn reject_submission(&mut self, notice: Notice) {
        self.pending_submission = None;
        self.progress = None;
        self.failure = Some(notice);
        self.session = SessionState::Selected;
        self.mark_dirty();
    }

    pub(crate) fn apply_progress(&mut self, percent: u32, message: String) {
        self.progress = Some(ProgressSnapshot { percent, message });
        self.mark_dirty();
    }

    /// Ends monitoring successfully and returns the handle whose stream must close.
    pub(crate) fn complete(&mut self, summary: ResultSummary) -> Option<TaskHandle> {
        self.result = Some(summary);
        self.progress = None;
        self.session = SessionState::Completed;
        self.mark_dirty();
        self.task.take()
    }

    /// Ends monitoring with a failure and returns the handle whose stream must close.
    pub(crate) fn fail(&mut self, notice: Notice) -> Option<TaskHandle> {
        self.failure = Some(notice);
        self.progress = None;
        self.session = SessionState::Failed;
        self.mark_dirty();
        self.task.take()
    }

    pub(crate) fn set_download(&mut self, status: DownloadStatus) {
        self.download = Some(status);
        self.mark_dirty();
    }

    /// Discards everything job-related and returns any handle whose stream is still open.
    /// Options survive; they are user preferences rather than job state.
    pub(crate) fn reset(&mut self) -> Option<TaskHandle> {
        let task = self.task.take();
        self.session = SessionState::Idle;
        self.selected = None;
        self.pending_submission = None;
        self.progress = None;
        self.result = None;
        self.failure = None;
        self.download = None;
        self.mark_dirty();
        task
    }
}
