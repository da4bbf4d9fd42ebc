use std::path::PathBuf;

use crate::{AppState, DownloadStatus, ResultSummary, SessionState, SubmissionOptions};

/// Shown in place of a metric the server did not report.
const MISSING_METRIC: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub file: Option<FileView>,
    pub options: SubmissionOptions,
    pub submit_enabled: bool,
    pub remove_enabled: bool,
    pub progress: Option<ProgressView>,
    pub result: Option<ResultView>,
    pub failure: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileView {
    pub name: String,
    pub size_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub total_slides: String,
    pub text_blocks: String,
    pub file_size: String,
    pub download_url: String,
    pub saved_to: Option<PathBuf>,
    pub download_pending: bool,
}

impl ResultView {
    /// Renders a summary as display strings. The download URL is passed through untouched.
    pub fn present(summary: &ResultSummary) -> Self {
        Self {
            total_slides: summary.total_slides.to_string(),
            text_blocks: summary
                .text_blocks
                .map(|count| count.to_string())
                .unwrap_or_else(|| MISSING_METRIC.to_string()),
            file_size: summary.file_size.clone(),
            download_url: summary.download_url.clone(),
            saved_to: None,
            download_pending: false,
        }
    }
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let session = state.session();
        let file = state.selected().map(|file| FileView {
            name: file.name().to_string(),
            size_label: file.size_label(),
        });
        let progress = state.progress().map(|progress| ProgressView {
            percent: progress.percent,
            label: if progress.message.is_empty() {
                format!("{}%", progress.percent)
            } else {
                progress.message.clone()
            },
        });
        let result = state.result().map(|summary| {
            let mut view = ResultView::present(summary);
            match state.download() {
                Some(DownloadStatus::Pending) => view.download_pending = true,
                Some(DownloadStatus::Saved(path)) => view.saved_to = Some(path.clone()),
                Some(DownloadStatus::Failed(_)) | None => {}
            }
            view
        });
        let has_file = state.selected().is_some();

        Self {
            session,
            file,
            options: state.options(),
            submit_enabled: has_file
                && matches!(session, SessionState::Selected | SessionState::Failed),
            remove_enabled: matches!(session, SessionState::Selected | SessionState::Failed),
            progress,
            result,
            failure: state.failure().map(ToString::to_string),
            dirty: state.is_dirty(),
        }
    }
}
