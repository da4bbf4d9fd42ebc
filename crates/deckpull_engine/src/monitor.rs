use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use deck_logging::{deck_debug, deck_trace, deck_warn};
use deckpull_core::TaskHandle;
use futures_util::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::sse::{decode_server_event, SseDecoder};
use crate::{EngineConfig, MonitorEvent};

/// Opens progress subscriptions against the extraction service.
#[derive(Debug, Clone)]
pub struct ProgressMonitor {
    config: EngineConfig,
    client: reqwest::Client,
}

impl ProgressMonitor {
    pub fn new(config: EngineConfig) -> reqwest::Result<Self> {
        // The stream is long-lived; only connect and idle limits apply.
        let client = config.build_client(false)?;
        Ok(Self { config, client })
    }

    /// Opens one subscription for `task`. Must be called from within a tokio runtime.
    ///
    /// The returned stream yields events in server-send order and ends after the
    /// first terminal event, after a synthesized [`MonitorEvent::Disconnected`], or
    /// once the subscription is closed.
    pub fn monitor(&self, task: &TaskHandle) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        match self.progress_url(task) {
            Ok(url) => {
                let reader = StreamReader {
                    client: self.client.clone(),
                    url,
                    idle_timeout: self.config.stream_idle_timeout,
                    tx,
                };
                let token = cancel.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => deck_debug!("Progress reader cancelled"),
                        _ = reader.run() => {}
                    }
                });
            }
            Err(reason) => {
                let _ = tx.send(MonitorEvent::Disconnected { reason });
            }
        }

        Subscription {
            task: task.clone(),
            rx,
            cancel,
        }
    }

    fn progress_url(&self, task: &TaskHandle) -> Result<Url, String> {
        let mut url = self
            .config
            .endpoint("progress/")
            .map_err(|err| format!("invalid progress endpoint: {err}"))?;
        url.path_segments_mut()
            .map_err(|_| "progress endpoint cannot take a path".to_string())?
            .pop_if_empty()
            .push(task.id());
        Ok(url)
    }
}

/// A live progress stream for one task.
///
/// Closing is idempotent. Nothing is delivered after [`Subscription::close`],
/// even events that were already buffered. Dropping the subscription closes it.
#[derive(Debug)]
pub struct Subscription {
    task: TaskHandle,
    rx: mpsc::UnboundedReceiver<MonitorEvent>,
    cancel: CancellationToken,
}

impl Subscription {
    pub fn task(&self) -> &TaskHandle {
        &self.task
    }

    pub fn close(&mut self) {
        if !self.cancel.is_cancelled() {
            deck_debug!("Closing progress stream for task {}", self.task);
        }
        self.cancel.cancel();
        self.rx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A token that closes this subscription from elsewhere when cancelled.
    pub fn close_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Stream for Subscription {
    type Item = MonitorEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct StreamReader {
    client: reqwest::Client,
    url: Url,
    idle_timeout: Duration,
    tx: mpsc::UnboundedSender<MonitorEvent>,
}

impl StreamReader {
    async fn run(self) {
        if let Err(reason) = self.read().await {
            let _ = self.tx.send(MonitorEvent::Disconnected { reason });
        }
    }

    /// Forwards events until a terminal one. `Err` means the transport gave out first.
    async fn read(&self) -> Result<(), String> {
        deck_debug!("Opening progress stream {}", self.url);
        let request = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "text/event-stream")
            .send();
        let response = tokio::time::timeout(self.idle_timeout, request)
            .await
            .map_err(|_| self.silence())?
            .map_err(|err| format!("could not open progress stream: {err}"))?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("progress stream returned http status {}", status.as_u16()));
        }

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        loop {
            let chunk = match tokio::time::timeout(self.idle_timeout, body.next()).await {
                Err(_) => return Err(self.silence()),
                Ok(None) => return Err("stream ended before the job finished".to_string()),
                Ok(Some(Err(err))) => return Err(format!("stream interrupted: {err}")),
                Ok(Some(Ok(chunk))) => chunk,
            };

            for payload in decoder.push(&chunk) {
                match decode_server_event(&payload) {
                    Ok(Some(event)) => {
                        let terminal = event.is_terminal();
                        if self.tx.send(MonitorEvent::Server(event)).is_err() {
                            // Receiver gone: the subscription was closed.
                            return Ok(());
                        }
                        if terminal {
                            return Ok(());
                        }
                    }
                    Ok(None) => deck_trace!("Heartbeat on {}", self.url),
                    Err(err) => deck_warn!("Skipping undecodable progress payload: {}", err),
                }
            }
        }
    }

    fn silence(&self) -> String {
        format!("no data from server for {:?}", self.idle_timeout)
    }
}
