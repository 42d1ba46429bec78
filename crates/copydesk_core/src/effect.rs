use crate::{GenerationTask, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// New tasks were appended in `Pending`.
    TasksQueued { task_ids: Vec<TaskId> },
    /// The task has moved to `Generating` and must be run by the worker.
    Dispatch(GenerationTask),
    /// The task reached a terminal state.
    TaskSettled(GenerationTask),
    /// No pending task remains; the queue is idle.
    Drained,
}
