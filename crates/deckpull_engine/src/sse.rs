//! Server-sent-event framing and progress payload decoding.

use bytes::{Buf, BytesMut};
use deckpull_core::{ResultSummary, ServerEvent};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("payload has no status field")]
    MissingStatus,
    #[error("unknown status {0:?}")]
    UnknownStatus(String),
    #[error("malformed {status} payload: {message}")]
    Malformed { status: String, message: String },
}

/// Incremental `text/event-stream` parser.
///
/// Feed raw chunks as they arrive; complete `data` payloads come out in order.
/// Only the `data` field is used. Comments and other fields are skipped, and an
/// event without a terminating blank line is never dispatched.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    data: String,
    has_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(newline);
            self.buffer.advance(1);
            let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
            let line = String::from_utf8_lossy(line);
            if let Some(payload) = self.process_line(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if !self.has_data {
                return None;
            }
            self.has_data = false;
            let mut payload = std::mem::take(&mut self.data);
            if payload.ends_with('\n') {
                payload.pop();
            }
            return Some(payload);
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push_str(value);
            self.data.push('\n');
            self.has_data = true;
        }
        None
    }
}

#[derive(Debug, Deserialize)]
struct ProgressPayload {
    #[serde(deserialize_with = "whole_percent")]
    percent: u32,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletedPayload {
    total_slides: u32,
    #[serde(default)]
    text_blocks: Option<u32>,
    file_size: String,
    download_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
}

/// Any JSON number is accepted: fractions round to the nearest whole percent and
/// negatives become 0. Values above 100 pass through; display clamps them.
fn whole_percent<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Decodes one stream payload. Heartbeats decode to `Ok(None)`.
pub fn decode_server_event(payload: &str) -> Result<Option<ServerEvent>, DecodeError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingStatus)?
        .to_string();

    let event = match status.as_str() {
        "heartbeat" => return Ok(None),
        "progress" => {
            let p: ProgressPayload = from_value(&status, value)?;
            ServerEvent::Progress {
                percent: p.percent,
                message: p.message.unwrap_or_default(),
            }
        }
        "completed" => {
            let c: CompletedPayload = from_value(&status, value)?;
            ServerEvent::Completed(ResultSummary {
                total_slides: c.total_slides,
                text_blocks: c.text_blocks,
                file_size: c.file_size,
                download_url: c.download_url,
            })
        }
        "error" => {
            let e: ErrorPayload = from_value(&status, value)?;
            ServerEvent::Error {
                message: e.message.unwrap_or_default(),
            }
        }
        _ => return Err(DecodeError::UnknownStatus(status)),
    };
    Ok(Some(event))
}

fn from_value<T: serde::de::DeserializeOwned>(status: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|err| DecodeError::Malformed {
        status: status.to_string(),
        message: err.to_string(),
    })
}
