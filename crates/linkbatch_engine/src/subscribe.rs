use futures_util::StreamExt;
use linkbatch_logging::{lb_debug, lb_info, lb_trace, lb_warn};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::settings::ClientSettings;
use crate::sse::SseDecoder;
use crate::StreamEvent;

/// Receives a subscription's events in transport order.
pub trait StreamSink: Send + Sync {
    fn emit(&self, event: StreamEvent);
}

/// Opens a task's status stream and forwards its events.
///
/// Implementations end every subscription with exactly one
/// [`StreamEvent::Closed`], unless `cancel` fires first, in which case they
/// return silently.
#[async_trait::async_trait]
pub trait Subscriber: Send + Sync {
    async fn subscribe(&self, task_id: &str, sink: &dyn StreamSink, cancel: CancellationToken);
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestSubscriber {
    settings: ClientSettings,
}

impl ReqwestSubscriber {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    /// Streams until the channel ends; returns `false` if cancelled.
    async fn run(&self, task_id: &str, sink: &dyn StreamSink, cancel: &CancellationToken) -> bool {
        let url = match self.settings.status_url(task_id) {
            Ok(url) => url,
            Err(err) => {
                sink.emit(StreamEvent::Error(Some(format!("invalid status url: {err}"))));
                return true;
            }
        };
        // No request timeout: the stream lives as long as the task does.
        let client = match reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                sink.emit(StreamEvent::Error(Some(err.to_string())));
                return true;
            }
        };

        lb_info!("GET {} (status stream)", url);
        let request = client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return false,
            response = request => response,
        };
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                lb_warn!("Task {}: status stream failed to open: {}", task_id, err);
                return true;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                body = response.text() => body.unwrap_or_default(),
            };
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.error)
                .map(|message| format!(" - {message}"))
                .unwrap_or_default();
            lb_warn!("Task {}: status stream rejected with {}", task_id, status);
            sink.emit(StreamEvent::Error(Some(format!(
                "status stream rejected: {}{}",
                status, detail
            ))));
            return true;
        }

        let mut decoder = SseDecoder::new();
        let mut chunks = response.bytes_stream();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                next = chunks.next() => next,
            };
            match next {
                Some(Ok(chunk)) => {
                    lb_trace!("Task {}: {} byte(s) received", task_id, chunk.len());
                    for frame in decoder.feed(&chunk) {
                        if let Some(event) = frame.into_stream_event() {
                            sink.emit(event);
                        }
                    }
                }
                Some(Err(err)) => {
                    lb_warn!("Task {}: status stream dropped: {}", task_id, err);
                    return true;
                }
                None => {
                    lb_debug!("Task {}: status stream ended", task_id);
                    return true;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Subscriber for ReqwestSubscriber {
    async fn subscribe(&self, task_id: &str, sink: &dyn StreamSink, cancel: CancellationToken) {
        if self.run(task_id, sink, &cancel).await {
            sink.emit(StreamEvent::Closed);
        } else {
            lb_debug!("Task {}: status stream torn down by client", task_id);
        }
    }
}
