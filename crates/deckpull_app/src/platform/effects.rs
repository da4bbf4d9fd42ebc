use std::time::Duration;

use deck_logging::{deck_error, deck_info, deck_warn};
use deckpull_core::{AppState, DownloadStatus, Effect, Msg, Notice, SessionState};
use deckpull_engine::{
    EngineConfig, EngineEvent, EngineHandle, EngineStopped, MonitorEvent, SubmissionError,
};

/// Hands effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig) -> Result<Self, SubmissionError> {
        Ok(Self {
            engine: EngineHandle::new(config)?,
        })
    }

    /// Starts engine work for each effect. Notices are handed back for the caller to show.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::Submit {
                    submission,
                    file,
                    options,
                } => {
                    deck_info!(
                        "Submit submission={} file={:?}",
                        submission.0,
                        file.handle().path()
                    );
                    self.engine.submit(submission, file, options);
                }
                Effect::OpenStream { task } => self.engine.open_stream(task),
                Effect::CloseStream { task } => self.engine.close_stream(task),
                Effect::Download { url } => {
                    deck_info!("Download url={}", url);
                    self.engine.download(url);
                }
                Effect::Notify(notice) => notices.push(notice),
            }
        }
        notices
    }

    /// Waits up to `wait` for engine output; a quiet engine yields a `Tick`.
    ///
    /// A dead engine yields whatever message ends the work `state` is waiting on.
    pub fn next_msg(&self, wait: Duration, state: &AppState) -> Msg {
        match self.engine.recv_timeout(wait) {
            Ok(Some(event)) => map_event(event),
            Ok(None) => Msg::Tick,
            Err(stopped) => {
                deck_error!("{}", stopped);
                abandon(state, stopped)
            }
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

/// The message that fails whatever outstanding work `state` expects from the engine.
fn abandon(state: &AppState, stopped: EngineStopped) -> Msg {
    let reason = stopped.to_string();
    match state.session() {
        SessionState::Submitting => match state.pending_submission() {
            Some(submission) => Msg::SubmissionRejected {
                submission,
                message: reason,
            },
            None => Msg::Tick,
        },
        SessionState::Monitoring => match state.task() {
            Some(task) => Msg::StreamLost {
                task: task.clone(),
                reason,
            },
            None => Msg::Tick,
        },
        SessionState::Completed if state.download() == Some(&DownloadStatus::Pending) => {
            match state.result() {
                Some(summary) => Msg::DownloadFinished {
                    url: summary.download_url.clone(),
                    outcome: Err(reason),
                },
                None => Msg::Tick,
            }
        }
        _ => Msg::Tick,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted { submission, result } => match result {
            Ok(task) => Msg::SubmissionAccepted { submission, task },
            Err(err) => {
                deck_warn!("Submission {} failed ({:?}): {}", submission.0, err.kind, err);
                Msg::SubmissionRejected {
                    submission,
                    message: err.message,
                }
            }
        },
        EngineEvent::Stream { task, event } => match event {
            MonitorEvent::Server(event) => Msg::Server { task, event },
            MonitorEvent::Disconnected { reason } => {
                deck_warn!("Progress stream for {} dropped: {}", task, reason);
                Msg::StreamLost { task, reason }
            }
        },
        EngineEvent::Downloaded { url, result } => Msg::DownloadFinished {
            url,
            outcome: result.map_err(|err| err.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckpull_core::{update, FileHandle, ServerEvent, SubmissionId, TaskHandle};
    use deckpull_engine::{DownloadError, SubmissionFailure};
    use pretty_assertions::assert_eq;

    #[test]
    fn rejected_submission_carries_the_user_message() {
        let msg = map_event(EngineEvent::Submitted {
            submission: SubmissionId(3),
            result: Err(SubmissionError {
                kind: SubmissionFailure::Rejected,
                message: "Unsupported deck".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::SubmissionRejected {
                submission: SubmissionId(3),
                message: "Unsupported deck".to_string(),
            }
        );
    }

    #[test]
    fn disconnect_becomes_stream_loss_not_server_error() {
        let task = TaskHandle::new("t-1");
        let lost = map_event(EngineEvent::Stream {
            task: task.clone(),
            event: MonitorEvent::Disconnected {
                reason: "stream ended before the job finished".to_string(),
            },
        });
        assert_eq!(
            lost,
            Msg::StreamLost {
                task: task.clone(),
                reason: "stream ended before the job finished".to_string(),
            }
        );

        let server = map_event(EngineEvent::Stream {
            task: task.clone(),
            event: MonitorEvent::Server(ServerEvent::Error {
                message: "bad deck".to_string(),
            }),
        });
        assert!(matches!(server, Msg::Server { .. }));
    }

    #[test]
    fn download_errors_are_flattened_to_text() {
        let msg = map_event(EngineEvent::Downloaded {
            url: "/download/x.docx".to_string(),
            result: Err(DownloadError::HttpStatus(404)),
        });
        assert_eq!(
            msg,
            Msg::DownloadFinished {
                url: "/download/x.docx".to_string(),
                outcome: Err("http status 404".to_string()),
            }
        );
    }

    fn submitting() -> AppState {
        let (state, _) = update(
            AppState::new(),
            Msg::FileChosen {
                name: "deck.pptx".to_string(),
                size_bytes: 10,
                handle: FileHandle::new("deck.pptx"),
            },
        );
        let (state, _) = update(state, Msg::SubmitClicked);
        state
    }

    #[test]
    fn stopped_engine_fails_pending_submission() {
        let state = submitting();
        let pending = state.pending_submission().unwrap();

        let msg = abandon(&state, EngineStopped);
        assert_eq!(
            msg,
            Msg::SubmissionRejected {
                submission: pending,
                message: "engine worker has stopped".to_string(),
            }
        );

        let (state, _) = update(state, msg);
        assert_eq!(state.session(), SessionState::Selected);
    }

    #[test]
    fn stopped_engine_drops_the_open_stream() {
        let state = submitting();
        let submission = state.pending_submission().unwrap();
        let (state, _) = update(
            state,
            Msg::SubmissionAccepted {
                submission,
                task: TaskHandle::new("t-9"),
            },
        );

        let (state, _) = update(state.clone(), abandon(&state, EngineStopped));
        assert_eq!(state.session(), SessionState::Failed);
    }

    #[test]
    fn stopped_engine_is_quiet_when_nothing_is_pending() {
        assert_eq!(abandon(&AppState::new(), EngineStopped), Msg::Tick);
    }
}
