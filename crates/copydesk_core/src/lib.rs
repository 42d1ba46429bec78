//! Copydesk core: pure generation-queue state machine and view-model helpers.
mod batch;
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use batch::{parse_batch, BatchSettings};
pub use effect::Effect;
pub use msg::{Msg, TaskOutcome};
pub use state::{GenerationTask, QueueState, TaskId, TaskInput, TaskStatus};
pub use update::update;
pub use view_model::{QueueViewModel, StatusCounts, TaskRowView};
