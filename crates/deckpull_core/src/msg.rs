use std::path::PathBuf;

use crate::{FileHandle, ServerEvent, SubmissionId, TaskHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked or dropped a file. Validation happens in `update`.
    FileChosen {
        name: String,
        size_bytes: u64,
        handle: FileHandle,
    },
    /// User removed the selected file before submitting it.
    FileRemoved,
    /// User toggled the column-sort option.
    ColumnSortChanged(bool),
    /// User toggled the keep-format option.
    KeepFormatChanged(bool),
    /// User clicked Extract.
    SubmitClicked,
    /// Server accepted the submission and issued a task handle.
    SubmissionAccepted {
        submission: SubmissionId,
        task: TaskHandle,
    },
    /// Submission failed at transport or application level.
    SubmissionRejected {
        submission: SubmissionId,
        message: String,
    },
    /// A decoded message from the progress stream of `task`.
    Server { task: TaskHandle, event: ServerEvent },
    /// The progress stream of `task` dropped before a terminal event.
    StreamLost { task: TaskHandle, reason: String },
    /// Result download finished, successfully or not.
    DownloadFinished {
        url: String,
        outcome: Result<PathBuf, String>,
    },
    /// User asked to start over.
    ResetClicked,
    /// User closed the result view ("extract another").
    ResultDismissed,
    /// Render tick from the host loop.
    Tick,
}
