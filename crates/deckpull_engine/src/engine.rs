use std::sync::{mpsc, Arc};
use std::thread;

use deck_logging::{deck_debug, deck_error, deck_warn};
use deckpull_core::{SelectedFile, SubmissionId, SubmissionOptions, TaskHandle};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::client::{ExtractionClient, ReqwestExtractionClient};
use crate::{
    Downloader, EngineConfig, EngineEvent, EngineStopped, ProgressMonitor, SubmissionError,
    SubmissionFailure,
};

enum EngineCommand {
    Submit {
        submission: SubmissionId,
        file: SelectedFile,
        options: SubmissionOptions,
    },
    OpenStream {
        task: TaskHandle,
    },
    CloseStream {
        task: TaskHandle,
    },
    Download {
        url: String,
    },
    Shutdown,
}

struct Services {
    client: Arc<dyn ExtractionClient>,
    monitor: ProgressMonitor,
    downloader: Downloader,
}

/// Runs network work on a background runtime and reports back over a channel.
///
/// Commands never block the caller. At most one progress stream is kept open.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, SubmissionError> {
        let client = ReqwestExtractionClient::new(config.clone())?;
        Self::with_client(config, Arc::new(client))
    }

    /// Like [`EngineHandle::new`] but with a caller-supplied submission client.
    pub fn with_client(
        config: EngineConfig,
        client: Arc<dyn ExtractionClient>,
    ) -> Result<Self, SubmissionError> {
        let to_error = |err: reqwest::Error| {
            SubmissionError::new(SubmissionFailure::Network, err.to_string())
        };
        let services = Services {
            client,
            monitor: ProgressMonitor::new(config.clone()).map_err(to_error)?,
            downloader: Downloader::new(config).map_err(to_error)?,
        };

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    deck_error!("Could not start engine runtime: {}", err);
                    return;
                }
            };
            let mut active: Option<(TaskHandle, CancellationToken)> = None;
            while let Ok(command) = cmd_rx.recv() {
                if matches!(command, EngineCommand::Shutdown) {
                    deck_debug!("Engine worker shutting down");
                    break;
                }
                let _guard = runtime.enter();
                handle_command(&services, &mut active, command, &event_tx);
            }
            if let Some((_, token)) = active.take() {
                token.cancel();
            }
            // Dropping the runtime here aborts in-flight requests; the host then
            // sees `EngineStopped` from every receive.
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, submission: SubmissionId, file: SelectedFile, options: SubmissionOptions) {
        self.send(EngineCommand::Submit {
            submission,
            file,
            options,
        });
    }

    pub fn open_stream(&self, task: TaskHandle) {
        self.send(EngineCommand::OpenStream { task });
    }

    pub fn close_stream(&self, task: TaskHandle) {
        self.send(EngineCommand::CloseStream { task });
    }

    pub fn download(&self, url: impl Into<String>) {
        self.send(EngineCommand::Download { url: url.into() });
    }

    /// Stops the worker. Open streams are closed and pending work is abandoned.
    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }

    /// `Ok(None)` means nothing is ready yet; `Err` means the worker is gone for good.
    pub fn try_recv(&self) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(EngineStopped),
        }
    }

    /// Waits up to `timeout`. `Ok(None)` is a quiet engine; `Err` is a dead one.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            deck_error!("Engine worker is gone; command dropped");
        }
    }
}

fn handle_command(
    services: &Services,
    active: &mut Option<(TaskHandle, CancellationToken)>,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit {
            submission,
            file,
            options,
        } => {
            let client = services.client.clone();
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let result = client.submit(&file, options).await;
                let _ = event_tx.send(EngineEvent::Submitted { submission, result });
            });
        }
        EngineCommand::OpenStream { task } => {
            if let Some((previous, token)) = active.take() {
                if !token.is_cancelled() {
                    deck_warn!(
                        "Opening stream for {} while {} is still open; closing the old one",
                        task,
                        previous
                    );
                    token.cancel();
                }
            }
            let mut subscription = services.monitor.monitor(&task);
            *active = Some((task.clone(), subscription.close_token()));
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                while let Some(event) = subscription.next().await {
                    let terminal = event.is_terminal();
                    let forwarded = event_tx.send(EngineEvent::Stream {
                        task: task.clone(),
                        event,
                    });
                    if forwarded.is_err() || terminal {
                        break;
                    }
                }
                subscription.close();
            });
        }
        EngineCommand::CloseStream { task } => match active.take() {
            Some((open, token)) if open == task => {
                deck_debug!("Closing stream for {}", task);
                token.cancel();
            }
            other => {
                deck_debug!("Close for {} with no matching open stream", task);
                *active = other;
            }
        },
        EngineCommand::Shutdown => {}
        EngineCommand::Download { url } => {
            let downloader = services.downloader.clone();
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let result = downloader.download(&url).await;
                let _ = event_tx.send(EngineEvent::Downloaded { url, result });
            });
        }
    }
}
