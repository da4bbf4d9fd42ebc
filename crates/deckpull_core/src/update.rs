use deck_logging::{deck_debug, deck_info};

use crate::{
    AppState, DownloadStatus, Effect, Msg, Notice, SelectedFile, ServerEvent, SessionState,
    SubmissionOptions, TaskHandle,
};

const DEFAULT_JOB_ERROR: &str = "Extraction failed";

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that are not valid for the current phase leave the state untouched
/// and produce no effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let phase = state.session();
    let effects = match msg {
        Msg::FileChosen {
            name,
            size_bytes,
            handle,
        } => match phase {
            SessionState::Idle | SessionState::Selected | SessionState::Failed => {
                match SelectedFile::select(name, size_bytes, handle) {
                    Ok(file) => {
                        deck_info!("Selected {} ({} bytes)", file.name(), file.size_bytes());
                        state.select(file);
                        Vec::new()
                    }
                    Err(err) => {
                        deck_info!("Rejected selection: {}", err);
                        vec![Effect::Notify(Notice::Validation(err))]
                    }
                }
            }
            _ => ignored(phase, "FileChosen"),
        },
        Msg::FileRemoved => match phase {
            SessionState::Selected | SessionState::Failed => {
                state.reset();
                Vec::new()
            }
            _ => ignored(phase, "FileRemoved"),
        },
        Msg::ColumnSortChanged(column_sort) => {
            if phase.is_busy() {
                ignored(phase, "ColumnSortChanged")
            } else {
                let options = state.options();
                state.set_options(SubmissionOptions {
                    column_sort,
                    ..options
                });
                Vec::new()
            }
        }
        Msg::KeepFormatChanged(keep_format) => {
            if phase.is_busy() {
                ignored(phase, "KeepFormatChanged")
            } else {
                let options = state.options();
                state.set_options(SubmissionOptions {
                    keep_format,
                    ..options
                });
                Vec::new()
            }
        }
        Msg::SubmitClicked => match (phase, state.selected().cloned()) {
            (SessionState::Selected | SessionState::Failed, Some(file)) => {
                let options = state.options();
                let submission = state.begin_submission();
                deck_info!(
                    "Submitting {} as submission {} (column_sort={}, keep_format={})",
                    file.name(),
                    submission.0,
                    options.column_sort,
                    options.keep_format
                );
                vec![Effect::Submit {
                    submission,
                    file,
                    options,
                }]
            }
            _ => ignored(phase, "SubmitClicked"),
        },
        Msg::SubmissionAccepted { submission, task } => {
            if phase == SessionState::Submitting && state.pending_submission() == Some(submission)
            {
                deck_info!("Submission {} accepted as task {}", submission.0, task);
                state.accept_submission(task.clone());
                vec![Effect::OpenStream { task }]
            } else {
                deck_debug!(
                    "Dropping stale acceptance of submission {} (task {})",
                    submission.0,
                    task
                );
                Vec::new()
            }
        }
        Msg::SubmissionRejected {
            submission,
            message,
        } => {
            if phase == SessionState::Submitting && state.pending_submission() == Some(submission)
            {
                deck_info!("Submission {} rejected: {}", submission.0, message);
                let notice = Notice::SubmissionFailed(message);
                state.reject_submission(notice.clone());
                vec![Effect::Notify(notice)]
            } else {
                deck_debug!("Dropping stale rejection of submission {}", submission.0);
                Vec::new()
            }
        }
        Msg::Server { task, event } => {
            if phase != SessionState::Monitoring || state.task() != Some(&task) {
                deck_debug!("Dropping event for inactive task {}", task);
                return (state, Vec::new());
            }
            match event {
                ServerEvent::Progress { percent, message } => {
                    state.apply_progress(percent, message);
                    Vec::new()
                }
                ServerEvent::Completed(summary) => {
                    deck_info!(
                        "Task {} completed: {} slides, {}",
                        task,
                        summary.total_slides,
                        summary.file_size
                    );
                    let download_url = summary.download_url.clone();
                    let mut effects = Vec::with_capacity(2);
                    if let Some(task) = state.complete(summary) {
                        effects.push(Effect::CloseStream { task });
                    }
                    if state.auto_download() {
                        state.set_download(DownloadStatus::Pending);
                        effects.push(Effect::Download { url: download_url });
                    }
                    effects
                }
                ServerEvent::Error { message } => {
                    let message = if message.trim().is_empty() {
                        DEFAULT_JOB_ERROR.to_string()
                    } else {
                        message
                    };
                    deck_info!("Task {} failed: {}", task, message);
                    let notice = Notice::JobFailed(message);
                    close_and_notify(state.fail(notice.clone()), notice)
                }
            }
        }
        Msg::StreamLost { task, reason } => {
            if phase == SessionState::Monitoring && state.task() == Some(&task) {
                deck_info!("Stream for task {} lost: {}", task, reason);
                let notice = Notice::ConnectionLost(reason);
                close_and_notify(state.fail(notice.clone()), notice)
            } else {
                deck_debug!("Dropping stream loss for inactive task {}", task);
                Vec::new()
            }
        }
        Msg::DownloadFinished { url, outcome } => {
            let current = state.result().map(|summary| summary.download_url.as_str());
            if phase != SessionState::Completed || current != Some(url.as_str()) {
                deck_debug!("Dropping download outcome for {}", url);
                return (state, Vec::new());
            }
            match outcome {
                Ok(path) => {
                    state.set_download(DownloadStatus::Saved(path));
                    Vec::new()
                }
                Err(message) => {
                    state.set_download(DownloadStatus::Failed(message.clone()));
                    vec![Effect::Notify(Notice::DownloadFailed(message))]
                }
            }
        }
        Msg::ResetClicked => reset(&mut state),
        Msg::ResultDismissed => match phase {
            SessionState::Completed | SessionState::Failed => reset(&mut state),
            _ => ignored(phase, "ResultDismissed"),
        },
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn reset(state: &mut AppState) -> Vec<Effect> {
    if state.session() != SessionState::Idle || state.selected().is_some() {
        deck_info!("Resetting session from {:?}", state.session());
    }
    match state.reset() {
        Some(task) => vec![Effect::CloseStream { task }],
        None => Vec::new(),
    }
}

fn close_and_notify(task: Option<TaskHandle>, notice: Notice) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(2);
    if let Some(task) = task {
        effects.push(Effect::CloseStream { task });
    }
    effects.push(Effect::Notify(notice));
    effects
}

fn ignored(phase: SessionState, what: &str) -> Vec<Effect> {
    deck_debug!("Ignoring {} in phase {:?}", what, phase);
    Vec::new()
}
