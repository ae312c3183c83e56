use serde::{Deserialize, Serialize};

/// Outcome of one link as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEvent {
    pub link: String,
    pub status: LinkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultEvent {
    /// Error text, if the service sent a non-empty one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|msg| !msg.trim().is_empty())
    }
}

/// `"success"` is the only status the service treats as a good download;
/// everything else (typically `"fail"`) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LinkStatus {
    Success,
    Other(String),
}

impl LinkStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, LinkStatus::Success)
    }

    pub fn as_str(&self) -> &str {
        match self {
            LinkStatus::Success => "success",
            LinkStatus::Other(status) => status,
        }
    }
}

impl From<String> for LinkStatus {
    fn from(value: String) -> Self {
        if value == "success" {
            LinkStatus::Success
        } else {
            LinkStatus::Other(value)
        }
    }
}

impl From<LinkStatus> for String {
    fn from(value: LinkStatus) -> Self {
        match value {
            LinkStatus::Success => "success".to_string(),
            LinkStatus::Other(status) => status,
        }
    }
}

/// Decodes the payload of a default stream event into a result.
pub fn decode_result_event(payload: &str) -> Result<ResultEvent, serde_json::Error> {
    serde_json::from_str(payload)
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Extracts a user-facing message from an `error` stream event.
///
/// Prefers the `error` field of a JSON body, then the raw payload.
pub fn decode_error_signal(payload: Option<&str>) -> String {
    let raw = payload.map(str::trim).unwrap_or_default();
    if let Ok(ErrorBody { error: Some(message) }) = serde_json::from_str::<ErrorBody>(raw) {
        if !message.trim().is_empty() {
            return message;
        }
    }
    if raw.is_empty() {
        "unknown stream error".to_string()
    } else {
        raw.to_string()
    }
}
