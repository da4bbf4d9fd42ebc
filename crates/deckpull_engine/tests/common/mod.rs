#![allow(dead_code)]

use std::io::Write;
use std::time::Duration;

use deckpull_core::{FileHandle, SelectedFile};
use deckpull_engine::EngineConfig;
use tempfile::NamedTempFile;
use url::Url;
use wiremock::MockServer;

pub fn init_logging() {
    deck_logging::initialize_for_tests();
}

pub fn config_for(server: &MockServer) -> EngineConfig {
    let mut config = EngineConfig::new(Url::parse(&server.uri()).expect("mock uri"));
    config.request_timeout = Duration::from_secs(5);
    config.stream_idle_timeout = Duration::from_secs(5);
    config
}

/// A `.pptx` selection backed by a real temp file holding `content`.
pub fn deck_file(content: &[u8]) -> (NamedTempFile, SelectedFile) {
    let mut tmp = NamedTempFile::new().expect("temp file");
    tmp.write_all(content).expect("write deck");
    let file = SelectedFile::select(
        "slides.pptx",
        content.len() as u64,
        FileHandle::new(tmp.path()),
    )
    .expect("valid name");
    (tmp, file)
}

/// Formats JSON payloads as one `text/event-stream` body.
pub fn sse_body(payloads: &[&str]) -> String {
    payloads
        .iter()
        .map(|payload| format!("data: {payload}\n\n"))
        .collect()
}
