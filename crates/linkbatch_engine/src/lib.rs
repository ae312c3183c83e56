//! Linkbatch engine: submit/stream transports and effect execution.
mod engine;
mod settings;
mod sse;
mod submit;
mod subscribe;
mod types;

pub use engine::EngineHandle;
pub use settings::{ClientSettings, ServiceContract};
pub use sse::{SseDecoder, SseFrame};
pub use submit::{ReqwestSubmitter, Submitter};
pub use subscribe::{ReqwestSubscriber, StreamSink, Subscriber};
pub use types::{EngineEvent, LinkOutcome, StreamEvent, SubmitAck, SubmitError, TaskId};
