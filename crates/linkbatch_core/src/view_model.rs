use crate::{ResultEvent, StreamOutcome, UiState};

/// Transient text shown above the results; replaced, never appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Submitting,
    Waiting,
    Validation(String),
    SubmitFailed(String),
    NoResults,
}

impl Banner {
    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Validation(_) | Banner::SubmitFailed(_))
    }
}

/// One entry of the append-only results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Result(ResultEvent),
    /// A default event whose payload did not decode; kept verbatim.
    DecodeWarning { raw: String },
    /// Explicit `error` signal from the service.
    ServerError(String),
    /// Completion marker.
    Completed,
    /// The channel closed without a completion signal.
    ClosedMaybeIncomplete,
}

impl OutputLine {
    pub fn is_terminal_marker(&self) -> bool {
        matches!(self, OutputLine::Completed | OutputLine::ClosedMaybeIncomplete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub ui: UiState,
    pub submit_enabled: bool,
    pub banner: Option<Banner>,
    pub lines: Vec<OutputLine>,
    pub outcome: Option<StreamOutcome>,
    pub submissions: u64,
    pub dirty: bool,
}

impl AppViewModel {
    /// Number of per-link result entries rendered so far.
    pub fn result_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| matches!(line, OutputLine::Result(_)))
            .count()
    }
}
