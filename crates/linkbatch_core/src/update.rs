use linkbatch_logging::{lb_debug, lb_info, lb_warn};

use crate::event::{decode_error_signal, decode_result_event};
use crate::{
    normalize_links, AppState, Effect, Msg, OutputLine, StreamOutcome, StreamPhase,
    StreamSignal, TaskId, UiState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::CredentialChanged(credential) => {
            state.set_credential(credential);
            Vec::new()
        }
        Msg::SubmitClicked => {
            // The affordance is disabled from submit start until a terminal
            // state, so clicks in between never produce a second request.
            if !state.ui().submit_enabled() {
                lb_debug!("Submit ignored while {:?}", state.ui());
                return (state, Vec::new());
            }
            match normalize_links(state.input()) {
                Err(err) => {
                    state.show_validation_error(err.to_string());
                    Vec::new()
                }
                Ok(batch) => {
                    state.begin_submission();
                    lb_info!("Submitting batch of {} link(s)", batch.len());
                    vec![Effect::SubmitBatch {
                        batch,
                        credential: state.credential(),
                    }]
                }
            }
        }
        Msg::SubmitAccepted { task_id } => {
            if *state.ui() != UiState::Submitting {
                lb_warn!("Ignoring task {} accepted outside of a submission", task_id);
                return (state, Vec::new());
            }
            lb_info!("Task {} accepted; subscribing to status stream", task_id);
            state.accept_task(task_id.clone());
            vec![Effect::Subscribe { task_id }]
        }
        Msg::LegacyResults(results) => {
            if *state.ui() != UiState::Submitting {
                return (state, Vec::new());
            }
            state.finish_legacy(results.into_iter().map(OutputLine::Result).collect());
            Vec::new()
        }
        Msg::SubmitFailed { kind, message } => {
            if *state.ui() != UiState::Submitting {
                return (state, Vec::new());
            }
            lb_warn!("Submit failed ({:?}): {}", kind, message);
            state.fail_submission(message);
            Vec::new()
        }
        Msg::Stream { task_id, signal } => apply_stream_signal(&mut state, task_id, signal),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_stream_signal(state: &mut AppState, task_id: TaskId, signal: StreamSignal) -> Vec<Effect> {
    let Some(session) = state.open_session(&task_id) else {
        // Unknown task, or a terminal outcome is already recorded: the
        // channel teardown that follows `complete` lands here.
        lb_debug!("Dropping {:?} for inactive task {}", signal, task_id);
        return Vec::new();
    };

    match signal {
        StreamSignal::Message(payload) => {
            let line = match decode_result_event(&payload) {
                Ok(result) => OutputLine::Result(result),
                Err(err) => {
                    lb_warn!(
                        "Task {}: undecodable result event ({}): {}",
                        task_id,
                        err,
                        linkbatch_logging::preview(&payload, 200)
                    );
                    OutputLine::DecodeWarning { raw: payload }
                }
            };
            state.set_banner(None);
            state.push_line(line);
            state.set_phase(StreamPhase::Receiving);
            Vec::new()
        }
        StreamSignal::Error(payload) => {
            let message = decode_error_signal(payload.as_deref());
            lb_warn!("Task {}: service reported error: {}", task_id, message);
            session.last_error = Some(message.clone());
            state.set_banner(None);
            state.push_line(OutputLine::ServerError(message));
            state.set_phase(StreamPhase::ErrorReported);
            Vec::new()
        }
        StreamSignal::Complete => {
            lb_info!("Task {} completed", task_id);
            state.finish_stream(StreamOutcome::Completed);
            vec![Effect::CloseSubscription { task_id }]
        }
        StreamSignal::Closed => {
            let outcome = match session.last_error.clone() {
                Some(message) => StreamOutcome::Errored(message),
                None => StreamOutcome::ClosedWithoutSignal,
            };
            lb_warn!("Task {}: stream closed without completion", task_id);
            state.finish_stream(outcome);
            vec![Effect::CloseSubscription { task_id }]
        }
    }
}
