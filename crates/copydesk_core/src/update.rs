use crate::{Effect, Msg, QueueState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Draining is driven by the returned effects: every terminal transition
/// immediately claims the next pending task, so one `Dispatch` is outstanding
/// at a time until `Drained` is emitted.
pub fn update(mut state: QueueState, msg: Msg) -> (QueueState, Vec<Effect>) {
    let effects = match msg {
        Msg::TasksSubmitted(inputs) => {
            let task_ids = state.enqueue(inputs);
            if task_ids.is_empty() {
                return (state, Vec::new());
            }
            let mut effects = vec![Effect::TasksQueued { task_ids }];
            // While a task is in flight the new tasks wait behind the current pending ones.
            if let Some(task) = state.claim_next() {
                effects.push(Effect::Dispatch(task));
            }
            effects
        }
        Msg::TaskFinished { task_id, outcome } => {
            let Some(settled) = state.finish(task_id, outcome) else {
                return (state, Vec::new());
            };
            let mut effects = vec![Effect::TaskSettled(settled)];
            match state.claim_next() {
                Some(next) => effects.push(Effect::Dispatch(next)),
                None => effects.push(Effect::Drained),
            }
            effects
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
