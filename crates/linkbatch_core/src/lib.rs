//! Linkbatch core: pure submission/stream state machine and view-model helpers.
mod effect;
mod event;
mod msg;
mod normalize;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use event::{decode_error_signal, decode_result_event, LinkStatus, ResultEvent};
pub use msg::{FailureKind, Msg, StreamSignal};
pub use normalize::{normalize_links, LinkBatch, ValidationError};
pub use state::{AppState, StreamOutcome, StreamPhase, TaskId, UiState};
pub use update::update;
pub use view_model::{AppViewModel, Banner, OutputLine};
