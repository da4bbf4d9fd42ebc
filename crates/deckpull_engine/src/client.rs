use deck_logging::{deck_debug, deck_warn};
use deckpull_core::{SelectedFile, SubmissionOptions, TaskHandle};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::{EngineConfig, SubmissionError, SubmissionFailure};

const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// One-shot submission of a presentation to the extraction service.
#[async_trait::async_trait]
pub trait ExtractionClient: Send + Sync {
    async fn submit(
        &self,
        file: &SelectedFile,
        options: SubmissionOptions,
    ) -> Result<TaskHandle, SubmissionError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    task_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestExtractionClient {
    config: EngineConfig,
    client: reqwest::Client,
}

impl ReqwestExtractionClient {
    pub fn new(config: EngineConfig) -> Result<Self, SubmissionError> {
        let client = config
            .build_client(true)
            .map_err(|err| SubmissionError::new(SubmissionFailure::Network, err.to_string()))?;
        Ok(Self { config, client })
    }

    async fn build_form(
        &self,
        file: &SelectedFile,
        options: SubmissionOptions,
    ) -> Result<Form, SubmissionError> {
        let path = file.handle().path();
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            SubmissionError::new(
                SubmissionFailure::FileUnreadable,
                format!("could not read {}: {err}", path.display()),
            )
        })?;
        let part = file_part(bytes, file.name(), PPTX_MIME)?;

        Ok(Form::new()
            .part("file", part)
            .text("column_sort", options.column_sort.to_string())
            .text("keep_format", options.keep_format.to_string()))
    }
}

#[async_trait::async_trait]
impl ExtractionClient for ReqwestExtractionClient {
    async fn submit(
        &self,
        file: &SelectedFile,
        options: SubmissionOptions,
    ) -> Result<TaskHandle, SubmissionError> {
        let url = self.config.endpoint("extract").map_err(|err| {
            SubmissionError::new(SubmissionFailure::InvalidEndpoint, err.to_string())
        })?;
        let form = self.build_form(file, options).await?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        let parsed = serde_json::from_str::<SubmitResponse>(&body);

        if !status.is_success() {
            deck_warn!("Submit of {} returned {}", file.name(), status);
            let message = parsed.ok().and_then(|reply| reply.error);
            return Err(SubmissionError::with_server_message(
                SubmissionFailure::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let reply = parsed.map_err(|err| {
            deck_warn!("Submit reply is not valid JSON: {}", err);
            SubmissionError::with_server_message(SubmissionFailure::MalformedResponse, None)
        })?;
        deck_debug!(
            "Submit reply success={} task_id={:?}",
            reply.success,
            reply.task_id
        );

        match reply.task_id.filter(|id| !id.is_empty()) {
            Some(task_id) if reply.success => Ok(TaskHandle::new(task_id)),
            _ => Err(SubmissionError::with_server_message(
                SubmissionFailure::Rejected,
                reply.error,
            )),
        }
    }
}

fn file_part(bytes: Vec<u8>, name: &str, mime: &str) -> Result<Part, SubmissionError> {
    Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str(mime)
        .map_err(|err| {
            SubmissionError::new(
                SubmissionFailure::InvalidRequest,
                format!("could not attach {name} as {mime}: {err}"),
            )
        })
}

fn map_reqwest_error(err: reqwest::Error) -> SubmissionError {
    deck_warn!("Submit transport error: {}", err);
    let kind = if err.is_timeout() {
        SubmissionFailure::Timeout
    } else {
        SubmissionFailure::Network
    };
    SubmissionError::with_server_message(kind, None)
}
