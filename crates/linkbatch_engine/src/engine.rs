use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use linkbatch_logging::{lb_debug, lb_error, lb_warn};
use tokio_util::sync::CancellationToken;

use crate::settings::ClientSettings;
use crate::submit::{ReqwestSubmitter, Submitter};
use crate::subscribe::{ReqwestSubscriber, StreamSink, Subscriber};
use crate::{EngineEvent, StreamEvent, TaskId};

enum EngineCommand {
    Submit {
        links: Vec<String>,
        credential: Option<String>,
    },
    Subscribe {
        task_id: TaskId,
    },
    CloseSubscription {
        task_id: TaskId,
    },
}

/// Runs transports on a background tokio runtime and reports
/// [`EngineEvent`]s over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Self {
        Self::with_transports(
            Arc::new(ReqwestSubmitter::new(settings.clone())),
            Arc::new(ReqwestSubscriber::new(settings)),
        )
    }

    pub fn with_transports(submitter: Arc<dyn Submitter>, subscriber: Arc<dyn Subscriber>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    // Dropping `event_tx` tells the host the engine is gone.
                    lb_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let mut subscriptions: Subscriptions = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                handle_command(
                    &runtime,
                    &submitter,
                    &subscriber,
                    &mut subscriptions,
                    command,
                    &event_tx,
                );
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, links: Vec<String>, credential: Option<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { links, credential });
    }

    pub fn subscribe(&self, task_id: impl Into<TaskId>) {
        let _ = self.cmd_tx.send(EngineCommand::Subscribe {
            task_id: task_id.into(),
        });
    }

    pub fn close_subscription(&self, task_id: impl Into<TaskId>) {
        let _ = self.cmd_tx.send(EngineCommand::CloseSubscription {
            task_id: task_id.into(),
        });
    }

    /// Blocks for the next event; `None` once the engine has stopped.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

/// One entry per task seen this run. A closed task keeps its id with no
/// token, which blocks re-subscription while releasing the token.
type Subscriptions = HashMap<TaskId, Option<CancellationToken>>;

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    submitter: &Arc<dyn Submitter>,
    subscriber: &Arc<dyn Subscriber>,
    subscriptions: &mut Subscriptions,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit { links, credential } => {
            let submitter = submitter.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = submitter.submit(&links, credential.as_deref()).await;
                let _ = event_tx.send(EngineEvent::SubmitCompleted(result));
            });
        }
        EngineCommand::Subscribe { task_id } => {
            if subscriptions.contains_key(&task_id) {
                lb_warn!("Task {} already has a status stream", task_id);
                return;
            }
            let cancel = CancellationToken::new();
            subscriptions.insert(task_id.clone(), Some(cancel.clone()));
            let subscriber = subscriber.clone();
            let sink = ChannelStreamSink::new(task_id.clone(), event_tx.clone());
            runtime.spawn(async move {
                subscriber.subscribe(&task_id, &sink, cancel).await;
            });
        }
        EngineCommand::CloseSubscription { task_id } => {
            match subscriptions.get_mut(&task_id).and_then(Option::take) {
                Some(cancel) => cancel.cancel(),
                None => lb_debug!("No status stream to close for task {}", task_id),
            }
        }
    }
}

struct ChannelStreamSink {
    task_id: TaskId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelStreamSink {
    fn new(task_id: TaskId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { task_id, tx }
    }
}

impl StreamSink for ChannelStreamSink {
    fn emit(&self, event: StreamEvent) {
        let _ = self.tx.send(EngineEvent::Stream {
            task_id: self.task_id.clone(),
            event,
        });
    }
}
