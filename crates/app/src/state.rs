//! State Store - the single owner of the session snapshot
//!
//! Exclusive-write contract: the snapshot is only ever swapped whole via
//! `replace`. Readers get a clone or a closure view; nobody mutates fields
//! through the store. This keeps the renderer from ever observing a torn
//! mix of old and new state.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use storyweave_domain::Session;

#[derive(Clone, Default)]
pub struct StateStore {
    inner: Arc<RwLock<Session>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Atomically swap the entire session
    pub fn replace(&self, snapshot: Session) {
        *self.write_lock() = snapshot;
    }

    /// Clone of the current snapshot
    pub fn snapshot(&self) -> Session {
        self.read_lock().clone()
    }

    /// Read-only closure view, cheaper than a full clone
    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.read_lock())
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Session> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Session> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_swaps_the_whole_snapshot() {
        let store = StateStore::new();
        assert!(store.read(|s| s.auto_response_enabled));

        let mut next = Session::default();
        next.auto_response_enabled = false;
        next.current_message_index = 3;
        store.replace(next);

        let snapshot = store.snapshot();
        assert!(!snapshot.auto_response_enabled);
        assert_eq!(snapshot.current_message_index, 3);
    }

    #[test]
    fn snapshot_is_a_detached_clone() {
        let store = StateStore::new();
        let mut taken = store.snapshot();
        taken.show_reactions = false;
        // the store is unaffected by mutations of the clone
        assert!(store.read(|s| s.show_reactions));
    }
}
