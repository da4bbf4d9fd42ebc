use std::path::PathBuf;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of the extraction service, e.g. `http://127.0.0.1:5002/`.
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Applies to the submit and download requests, never to the progress stream.
    pub request_timeout: Duration,
    /// Silence on the progress stream longer than this counts as a dropped connection.
    /// The server sends a heartbeat every 30 seconds.
    pub stream_idle_timeout: Duration,
    pub output_dir: PathBuf,
}

impl EngineConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            stream_idle_timeout: Duration::from_secs(90),
            output_dir: PathBuf::from("downloads"),
        }
    }

    /// Resolves a path relative to the service root, keeping any base path prefix.
    pub(crate) fn endpoint(&self, relative: &str) -> Result<Url, url::ParseError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(relative)
    }

    /// Resolves a server-supplied reference such as `/download/x.docx`.
    pub fn resolve(&self, reference: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(reference)
    }

    pub(crate) fn build_client(&self, with_request_timeout: bool) -> reqwest::Result<reqwest::Client> {
        let builder = reqwest::Client::builder().connect_timeout(self.connect_timeout);
        let builder = if with_request_timeout {
            builder.timeout(self.request_timeout)
        } else {
            builder
        };
        builder.build()
    }
}
