//! Async task bookkeeping.
//!
//! The reducer allocates a [`TaskId`] and marks the task active when it emits
//! the effect. A completion is applied only if its id is still the active one
//! for that kind; navigating away clears the active ids, so late results from
//! a screen that is no longer mounted are dropped.

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Session,
    Feed,
    PostLoad,
    Auth,
    Logout,
    Submit,
    Delete,
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
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, id: TaskId) {
        self.active = Some(id);
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub session: TaskState,
    pub feed: TaskState,
    pub post_load: TaskState,
    pub auth: TaskState,
    pub logout: TaskState,
    pub submit: TaskState,
    pub delete: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Session => &self.session,
            TaskKind::Feed => &self.feed,
            TaskKind::PostLoad => &self.post_load,
            TaskKind::Auth => &self.auth,
            TaskKind::Logout => &self.logout,
            TaskKind::Submit => &self.submit,
            TaskKind::Delete => &self.delete,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Session => &mut self.session,
            TaskKind::Feed => &mut self.feed,
            TaskKind::PostLoad => &mut self.post_load,
            TaskKind::Auth => &mut self.auth,
            TaskKind::Logout => &mut self.logout,
            TaskKind::Submit => &mut self.submit,
            TaskKind::Delete => &mut self.delete,
        }
    }

    /// Forgets every screen-scoped task. Session and logout survive navigation.
    pub fn clear_screen_tasks(&mut self) {
        self.feed.clear();
        self.post_load.clear();
        self.auth.clear();
        self.submit.clear();
        self.delete.clear();
    }

    pub fn is_any_running(&self) -> bool {
        self.session.is_running()
            || self.feed.is_running()
            || self.post_load.is_running()
            || self.auth.is_running()
            || self.logout.is_running()
            || self.submit.is_running()
            || self.delete.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_completion_is_rejected() {
        let mut seq = TaskSeq::default();
        let mut tasks = Tasks::default();

        let first = seq.next_id();
        tasks.state_mut(TaskKind::Feed).start(first);
        let second = seq.next_id();
        tasks.state_mut(TaskKind::Feed).start(second);

        assert!(!tasks.state_mut(TaskKind::Feed).finish_if_active(first));
        assert!(tasks.state_mut(TaskKind::Feed).finish_if_active(second));
        assert!(!tasks.is_any_running());
    }

    #[test]
    fn test_clear_screen_tasks_keeps_session() {
        let mut seq = TaskSeq::default();
        let mut tasks = Tasks::default();
        tasks.state_mut(TaskKind::Session).start(seq.next_id());
        tasks.state_mut(TaskKind::Submit).start(seq.next_id());

        tasks.clear_screen_tasks();
        assert!(tasks.state(TaskKind::Session).is_running());
        assert!(!tasks.state(TaskKind::Submit).is_running());
    }
}
