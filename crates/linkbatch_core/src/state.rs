use crate::view_model::{AppViewModel, Banner, OutputLine};

/// Opaque server-assigned task identifier.
pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    #[default]
    AwaitingFirstEvent,
    Receiving,
    /// An `error` signal arrived; completion is still awaited.
    ErrorReported,
}

/// Drives whether the submit affordance is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Submitting,
    Streaming {
        task_id: TaskId,
        phase: StreamPhase,
    },
    Done,
}

impl UiState {
    pub fn submit_enabled(&self) -> bool {
        matches!(self, UiState::Idle | UiState::Done)
    }
}

/// Terminal outcome of one task's stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    /// Closed without completion after the service reported an error.
    Errored(String),
    ClosedWithoutSignal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskSession {
    pub(crate) task_id: TaskId,
    pub(crate) last_error: Option<String>,
    pub(crate) outcome: Option<StreamOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    input: String,
    credential: String,
    ui: UiState,
    banner: Option<Banner>,
    lines: Vec<OutputLine>,
    task: Option<TaskSession>,
    submissions: u64,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            ui: self.ui.clone(),
            submit_enabled: self.ui.submit_enabled(),
            banner: self.banner.clone(),
            lines: self.lines.clone(),
            outcome: self.task.as_ref().and_then(|task| task.outcome.clone()),
            submissions: self.submissions,
            dirty: self.dirty,
        }
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Credential to attach to the submit request; empty means none.
    pub(crate) fn credential(&self) -> Option<String> {
        if self.credential.is_empty() {
            None
        } else {
            Some(self.credential.clone())
        }
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
    }

    pub(crate) fn set_credential(&mut self, credential: String) {
        self.credential = credential;
    }

    pub(crate) fn show_validation_error(&mut self, message: String) {
        self.lines.clear();
        self.dirty = true;
        self.set_banner(Some(Banner::Validation(message)));
    }

    pub(crate) fn begin_submission(&mut self) {
        self.submissions += 1;
        self.task = None;
        self.lines.clear();
        self.ui = UiState::Submitting;
        self.dirty = true;
        self.set_banner(Some(Banner::Submitting));
    }

    pub(crate) fn fail_submission(&mut self, message: String) {
        self.ui = UiState::Idle;
        self.dirty = true;
        self.set_banner(Some(Banner::SubmitFailed(message)));
    }

    pub(crate) fn accept_task(&mut self, task_id: TaskId) {
        self.task = Some(TaskSession {
            task_id: task_id.clone(),
            last_error: None,
            outcome: None,
        });
        self.ui = UiState::Streaming {
            task_id,
            phase: StreamPhase::AwaitingFirstEvent,
        };
        self.dirty = true;
        self.set_banner(Some(Banner::Waiting));
    }

    pub(crate) fn finish_legacy(&mut self, lines: Vec<OutputLine>) {
        let banner = if lines.is_empty() {
            Some(Banner::NoResults)
        } else {
            None
        };
        self.lines.extend(lines);
        self.ui = UiState::Done;
        self.dirty = true;
        self.set_banner(banner);
    }

    /// The session for `task_id` if it is current and not yet terminal.
    pub(crate) fn open_session(&mut self, task_id: &str) -> Option<&mut TaskSession> {
        self.task
            .as_mut()
            .filter(|task| task.task_id == task_id && task.outcome.is_none())
    }

    pub(crate) fn set_phase(&mut self, next: StreamPhase) {
        if let UiState::Streaming { phase, .. } = &mut self.ui {
            if *phase != next {
                *phase = next;
                self.dirty = true;
            }
        }
    }

    pub(crate) fn push_line(&mut self, line: OutputLine) {
        self.lines.push(line);
        self.dirty = true;
    }

    /// Records the terminal outcome, appends its marker and re-enables submit.
    pub(crate) fn finish_stream(&mut self, outcome: StreamOutcome) {
        let marker = match outcome {
            StreamOutcome::Completed => OutputLine::Completed,
            StreamOutcome::Errored(_) | StreamOutcome::ClosedWithoutSignal => {
                OutputLine::ClosedMaybeIncomplete
            }
        };
        if let Some(task) = self.task.as_mut() {
            task.outcome = Some(outcome);
        }
        self.push_line(marker);
        self.ui = UiState::Done;
        self.set_banner(None);
    }

    pub(crate) fn set_banner(&mut self, banner: Option<Banner>) {
        if self.banner != banner {
            self.banner = banner;
            self.dirty = true;
        }
    }
}
