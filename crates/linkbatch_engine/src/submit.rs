use linkbatch_logging::{lb_debug, lb_info, lb_warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::settings::{ClientSettings, ServiceContract};
use crate::{LinkOutcome, SubmitAck, SubmitError, TaskId};

/// Sends a batch to the service.
#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(
        &self,
        links: &[String],
        credential: Option<&str>,
    ) -> Result<SubmitAck, SubmitError>;
}

#[derive(Serialize)]
struct DownloadRequest<'a> {
    links: &'a [String],
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResultsBody {
    results: Option<Vec<LinkOutcome>>,
}

#[derive(Debug, Clone)]
pub struct ReqwestSubmitter {
    settings: ClientSettings,
}

impl ReqwestSubmitter {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, SubmitError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.settings.connect_timeout);
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| SubmitError::Transport(err.to_string()))
    }
}

#[async_trait::async_trait]
impl Submitter for ReqwestSubmitter {
    async fn submit(
        &self,
        links: &[String],
        credential: Option<&str>,
    ) -> Result<SubmitAck, SubmitError> {
        let url = self
            .settings
            .submit_url()
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        let body = serde_json::to_vec(&DownloadRequest { links })
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        let client = self.build_client()?;

        lb_info!(
            "POST {} links={} credential={}",
            url,
            links.len(),
            linkbatch_logging::redact(credential)
        );

        let mut request = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);
        if let Some(credential) = credential.filter(|value| !value.is_empty()) {
            request = request.header(AUTHORIZATION, credential);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        let status = response.status();

        if !status.is_success() {
            // A truncated error body still reports the status.
            let text = response.text().await.unwrap_or_default();
            lb_debug!(
                "Submit rejected with {} body={}",
                status,
                linkbatch_logging::preview(&text, 200)
            );
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .filter(|message| !message.is_empty());
            return Err(SubmitError::Request {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|err| SubmitError::Transport(err.to_string()))?;
        lb_debug!(
            "Submit answered {} body={}",
            status,
            linkbatch_logging::preview(&text, 200)
        );

        match self.settings.contract {
            ServiceContract::Streaming => parse_task_id(&text)
                .map(SubmitAck::Task)
                .ok_or_else(|| {
                    lb_warn!("Submit succeeded without a task id");
                    SubmitError::Protocol("no task id".to_string())
                }),
            ServiceContract::SingleShot => serde_json::from_str::<ResultsBody>(&text)
                .ok()
                .and_then(|body| body.results)
                .map(SubmitAck::Results)
                .ok_or_else(|| SubmitError::Protocol("no results".to_string())),
        }
    }
}

/// Accepts `task_id` as a non-empty JSON string or as a number.
fn parse_task_id(body: &str) -> Option<TaskId> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("task_id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
