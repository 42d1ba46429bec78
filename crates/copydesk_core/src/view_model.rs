use crate::{TaskId, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub pending: usize,
    pub generating: usize,
    pub success: usize,
    pub error: usize,
}

impl StatusCounts {
    pub(crate) fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::Generating => self.generating += 1,
            TaskStatus::Success => self.success += 1,
            TaskStatus::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.generating + self.success + self.error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueViewModel {
    pub running: bool,
    pub tasks: Vec<TaskRowView>,
    pub counts: StatusCounts,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    pub task_id: TaskId,
    pub keyword: String,
    pub custom_title: Option<String>,
    pub client_name: String,
    pub status: TaskStatus,
    pub error: Option<String>,
}
