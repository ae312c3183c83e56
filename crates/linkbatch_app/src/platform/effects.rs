use linkbatch_core::{Effect, FailureKind, LinkStatus, Msg, ResultEvent, StreamSignal};
use linkbatch_engine::{
    ClientSettings, EngineEvent, EngineHandle, LinkOutcome, StreamEvent, SubmitAck, SubmitError,
};
use linkbatch_logging::{lb_debug, lb_info};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings) -> Self {
        Self::with_engine(EngineHandle::new(settings))
    }

    pub fn with_engine(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitBatch { batch, credential } => {
                    lb_info!("SubmitBatch links={}", batch.len());
                    self.engine.submit(batch.into_links(), credential);
                }
                Effect::Subscribe { task_id } => {
                    lb_info!("Subscribe task_id={}", task_id);
                    self.engine.subscribe(task_id);
                }
                Effect::CloseSubscription { task_id } => {
                    lb_debug!("CloseSubscription task_id={}", task_id);
                    self.engine.close_subscription(task_id);
                }
            }
        }
    }

    /// Blocks for the next engine event; `None` once the engine has stopped.
    pub fn next_msg(&self) -> Option<Msg> {
        self.engine.recv().map(map_event)
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SubmitCompleted(Ok(SubmitAck::Task(task_id))) => Msg::SubmitAccepted { task_id },
        EngineEvent::SubmitCompleted(Ok(SubmitAck::Results(results))) => {
            Msg::LegacyResults(results.into_iter().map(map_outcome).collect())
        }
        EngineEvent::SubmitCompleted(Err(err)) => Msg::SubmitFailed {
            kind: failure_kind(&err),
            message: err.to_string(),
        },
        EngineEvent::Stream { task_id, event } => Msg::Stream {
            task_id,
            signal: map_stream_event(event),
        },
    }
}

fn failure_kind(err: &SubmitError) -> FailureKind {
    match err {
        SubmitError::Request { .. } => FailureKind::Request,
        SubmitError::Transport(_) => FailureKind::Transport,
        SubmitError::Protocol(_) => FailureKind::Protocol,
    }
}

fn map_stream_event(event: StreamEvent) -> StreamSignal {
    match event {
        StreamEvent::Message(payload) => StreamSignal::Message(payload),
        StreamEvent::Complete => StreamSignal::Complete,
        StreamEvent::Error(payload) => StreamSignal::Error(payload),
        StreamEvent::Closed => StreamSignal::Closed,
    }
}

fn map_outcome(outcome: LinkOutcome) -> ResultEvent {
    ResultEvent {
        link: outcome.link,
        status: LinkStatus::from(outcome.status),
        error: outcome.error,
    }
}
