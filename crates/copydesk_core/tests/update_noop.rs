use copydesk_core::{update, Msg, QueueState};

#[test]
fn update_is_noop() {
    let state = QueueState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn empty_submission_is_noop() {
    let state = QueueState::new();
    let (mut next, effects) = update(state.clone(), Msg::TasksSubmitted(Vec::new()));

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(next.view().counts.total(), 0);
}
