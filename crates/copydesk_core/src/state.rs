use crate::view_model::{QueueViewModel, StatusCounts, TaskRowView};
use crate::TaskOutcome;

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Generating,
    Success,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Generating => "generating",
            TaskStatus::Success => "success",
            TaskStatus::Error => "error",
        }
    }
}

/// Immutable parameters of one requested article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub keyword: String,
    pub custom_title: Option<String>,
    pub client_name: String,
    pub client_id: String,
    pub language: String,
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTask {
    pub id: TaskId,
    pub input: TaskInput,
    pub status: TaskStatus,
    /// Set only when `status` is `Error`.
    pub error: Option<String>,
}

/// Session-lifetime list of generation tasks, in insertion order.
///
/// Tasks are never removed. At most one task is `Generating` at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueState {
    tasks: Vec<GenerationTask>,
    next_id: TaskId,
    dirty: bool,
}

impl Default for QueueState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            dirty: false,
        }
    }
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[GenerationTask] {
        &self.tasks
    }

    pub fn task(&self, task_id: TaskId) -> Option<&GenerationTask> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// The task currently `Generating`, if any.
    pub fn in_flight(&self) -> Option<TaskId> {
        self.tasks
            .iter()
            .find(|task| task.status == TaskStatus::Generating)
            .map(|task| task.id)
    }

    pub fn is_running(&self) -> bool {
        self.in_flight().is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.tasks
            .iter()
            .any(|task| task.status == TaskStatus::Pending)
    }

    /// Returns true once after any mutation, then resets.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> QueueViewModel {
        let mut counts = StatusCounts::default();
        let rows = self
            .tasks
            .iter()
            .map(|task| {
                counts.record(task.status);
                TaskRowView {
                    task_id: task.id,
                    keyword: task.input.keyword.clone(),
                    custom_title: task.input.custom_title.clone(),
                    client_name: task.input.client_name.clone(),
                    status: task.status,
                    error: task.error.clone(),
                }
            })
            .collect();
        QueueViewModel {
            running: self.is_running(),
            tasks: rows,
            counts,
            dirty: self.dirty,
        }
    }

    pub(crate) fn enqueue(&mut self, inputs: Vec<TaskInput>) -> Vec<TaskId> {
        let mut ids = Vec::with_capacity(inputs.len());
        for input in inputs {
            let id = self.next_id;
            self.next_id += 1;
            self.tasks.push(GenerationTask {
                id,
                input,
                status: TaskStatus::Pending,
                error: None,
            });
            ids.push(id);
        }
        if !ids.is_empty() {
            self.dirty = true;
        }
        ids
    }

    /// Moves the earliest pending task to `Generating`.
    ///
    /// Returns `None` while another task is in flight or when nothing is pending.
    pub(crate) fn claim_next(&mut self) -> Option<GenerationTask> {
        if self.is_running() {
            return None;
        }
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.status == TaskStatus::Pending)?;
        task.status = TaskStatus::Generating;
        self.dirty = true;
        Some(task.clone())
    }

    /// Applies a terminal outcome to a `Generating` task.
    ///
    /// Outcomes for tasks in any other state are ignored so that status never regresses.
    pub(crate) fn finish(&mut self, task_id: TaskId, outcome: TaskOutcome) -> Option<GenerationTask> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id && task.status == TaskStatus::Generating)?;
        match outcome {
            TaskOutcome::Success => {
                task.status = TaskStatus::Success;
                task.error = None;
            }
            TaskOutcome::Failed(message) => {
                task.status = TaskStatus::Error;
                task.error = Some(message);
            }
        }
        self.dirty = true;
        Some(task.clone())
    }
}
