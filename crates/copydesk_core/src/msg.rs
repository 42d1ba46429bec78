#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A batch of task inputs was submitted, in submission order.
    TasksSubmitted(Vec<crate::TaskInput>),
    /// The worker finished running a dispatched task.
    TaskFinished {
        task_id: crate::TaskId,
        outcome: TaskOutcome,
    },
    /// Nothing to apply; sent when the command channel closes.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Generated and persisted.
    Success,
    /// Generation or persistence failed; carries the message shown to the user.
    Failed(String),
}
