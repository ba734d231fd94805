//! Session updates from the shared store

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use proto::GameSession;
use session_sync::{SyncChannel, SyncError};

/// Queue between store notifications and the frame loop
///
/// Notifications may arrive on any thread; they are only queued here and
/// drained at the start of the next frame, never mid-tick.
#[derive(Clone, Default)]
pub struct Inbox {
    queue: Arc<Mutex<VecDeque<GameSession>>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<GameSession>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, session: GameSession) {
        self.lock().push_back(session);
    }

    /// Take every queued snapshot in arrival order
    pub fn drain(&self) -> Vec<GameSession> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Route every update of the channel's session into this inbox
    pub fn attach(&self, channel: &mut SyncChannel) -> Result<(), SyncError> {
        let inbox = self.clone();
        channel.subscribe(move |session| inbox.push(session))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session_sync::{InMemoryStore, SystemEnv};

    #[test]
    fn test_attach_queues_replay_and_updates() {
        let store = InMemoryStore::new();
        let mut host = SyncChannel::new(Arc::new(store.clone()), Arc::new(SystemEnv));
        let mut guest = SyncChannel::new(Arc::new(store.clone()), Arc::new(SystemEnv));
        let code = host.create_session("Asha").unwrap();
        let inbox = Inbox::new();

        inbox.attach(&mut host).unwrap();
        assert_eq!(inbox.len(), 1, "Current state is replayed");
        guest.join_session(&code, "Ben").unwrap();

        let updates = inbox.drain();
        assert!(inbox.is_empty());
        let last = updates.last().unwrap();
        assert!(last.player(2).is_some());
    }
}
