use crate::{LinkBatch, TaskId};

/// Work the host must perform on behalf of [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue exactly one submit request for the batch.
    SubmitBatch {
        batch: LinkBatch,
        credential: Option<String>,
    },
    /// Open the status stream for a freshly created task.
    Subscribe { task_id: TaskId },
    /// Tear down the task's stream after a terminal outcome.
    CloseSubscription { task_id: TaskId },
}
