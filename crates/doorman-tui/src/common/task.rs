use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Claims the slot for a task that is about to be spawned with `cancel`.
    pub fn reserve(&mut self, id: TaskId, cancel: CancellationToken) {
        self.active = Some(id);
        self.cancel = Some(cancel);
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_seq_is_monotonic() {
        let mut seq = TaskSeq::default();
        assert_eq!(seq.next_id(), TaskId(0));
        assert_eq!(seq.next_id(), TaskId(1));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut state = TaskState::default();
        state.reserve(TaskId(2), CancellationToken::new());

        assert!(!state.finish_if_active(TaskId(1)));
        assert!(state.is_running());
        assert!(state.finish_if_active(TaskId(2)));
        assert!(!state.is_running());
    }

    #[test]
    fn test_reserved_token_is_the_one_taken_on_cancel() {
        let mut state = TaskState::default();
        let token = CancellationToken::new();
        state.reserve(TaskId(5), token.clone());

        let taken = state.cancel.take().unwrap();
        state.clear();
        taken.cancel();

        assert!(token.is_cancelled());
        assert!(!state.is_running());
    }
}
