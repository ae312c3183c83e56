use serde::Deserialize;
use thiserror::Error;

pub type TaskId = String;

/// What a successful submit produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAck {
    /// Streaming contract: results follow on the task's status stream.
    Task(TaskId),
    /// Single-shot contract: every result came back in the response.
    Results(Vec<LinkOutcome>),
}

/// One link's outcome as serialized by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkOutcome {
    pub link: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Inbound signal on a status stream, in transport order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Default (unnamed) event payload.
    Message(String),
    /// `event: complete`.
    Complete,
    /// `event: error` with its payload, if any.
    Error(Option<String>),
    /// The channel ended. Emitted once, last.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SubmitCompleted(Result<SubmitAck, SubmitError>),
    Stream { task_id: TaskId, event: StreamEvent },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Non-2xx response; `message` is the `error` field of a JSON body.
    #[error("Error: {status}{}{}", text_suffix(.status_text), detail_suffix(.message))]
    Request {
        status: u16,
        status_text: String,
        message: Option<String>,
    },
    /// The request never produced a response.
    #[error("An unexpected error occurred: {0}")]
    Transport(String),
    /// 2xx response that broke the service contract.
    #[error("Invalid response from server: {0}")]
    Protocol(String),
}

fn text_suffix(status_text: &str) -> String {
    if status_text.is_empty() {
        String::new()
    } else {
        format!(" {status_text}")
    }
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(" - {message}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_combines_status_and_message() {
        let err = SubmitError::Request {
            status: 500,
            status_text: "Internal Server Error".into(),
            message: Some("db down".into()),
        };
        assert_eq!(err.to_string(), "Error: 500 Internal Server Error - db down");

        let bare = SubmitError::Request {
            status: 401,
            status_text: "Unauthorized".into(),
            message: None,
        };
        assert_eq!(bare.to_string(), "Error: 401 Unauthorized");
    }

    #[test]
    fn nonstandard_status_has_no_trailing_space() {
        let err = SubmitError::Request {
            status: 599,
            status_text: String::new(),
            message: None,
        };
        assert_eq!(err.to_string(), "Error: 599");

        let with_detail = SubmitError::Request {
            status: 599,
            status_text: String::new(),
            message: Some("gateway gave up".into()),
        };
        assert_eq!(with_detail.to_string(), "Error: 599 - gateway gave up");
    }
}
