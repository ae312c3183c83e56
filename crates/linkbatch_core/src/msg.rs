use crate::{ResultEvent, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the links text box.
    InputChanged(String),
    /// User edited the password box.
    CredentialChanged(String),
    /// User pressed the submit button.
    SubmitClicked,
    /// The service created a task for the in-flight batch.
    SubmitAccepted { task_id: TaskId },
    /// Single-shot service returned every result in the submit response.
    LegacyResults(Vec<ResultEvent>),
    /// The in-flight submit failed.
    SubmitFailed { kind: FailureKind, message: String },
    /// Inbound signal on a task's status stream.
    Stream { task_id: TaskId, signal: StreamSignal },
    /// Fallback for placeholder wiring.
    NoOp,
}

/// Why a submit request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-2xx response.
    Request,
    /// No response at all.
    Transport,
    /// 2xx response missing the expected fields.
    Protocol,
}

/// One inbound event on a status stream, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    /// Default (unnamed) event; payload should hold a JSON result.
    Message(String),
    /// Named `error` event with its optional payload.
    Error(Option<String>),
    /// Named `complete` event.
    Complete,
    /// The channel went away.
    Closed,
}
