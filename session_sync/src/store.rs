use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

/// Identity handed out by [`SharedStore::authenticate`]
pub type ClientId = String;

/// Every `(key, value)` pair under a subscribed prefix, in key order
pub type Snapshot = Vec<(String, Vec<u8>)>;

/// Callback invoked with a fresh snapshot whenever its prefix changes
pub type Listener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store is unreachable")]
    Offline,
    #[error("authentication rejected: {0}")]
    AuthRejected(String),
    #[error("unknown client {0}")]
    UnknownClient(String),
}

/// Key-addressable store shared by both players
///
/// Writes are single-key overwrites (last write wins). Subscriptions are
/// per prefix and replay the current snapshot immediately. Prefixes
/// registered with [`SharedStore::delete_on_disconnect`] are removed when
/// their client disconnects.
pub trait SharedStore: Send + Sync {
    fn authenticate(&self) -> Result<ClientId, StoreError>;
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn read_prefix(&self, prefix: &str) -> Result<Snapshot, StoreError>;
    fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
    fn delete_prefix(&self, prefix: &str) -> Result<(), StoreError>;
    fn subscribe(&self, prefix: &str, listener: Listener) -> Result<ListenerId, StoreError>;
    fn unsubscribe(&self, id: ListenerId) -> Result<(), StoreError>;
    fn delete_on_disconnect(&self, client: &str, prefix: &str) -> Result<(), StoreError>;
    fn disconnect(&self, client: &str) -> Result<(), StoreError>;
}

#[derive(Default)]
struct StoreInner {
    data: BTreeMap<String, Vec<u8>>,
    listeners: BTreeMap<ListenerId, (String, Listener)>,
    next_listener: u64,
    next_client: u64,
    clients: HashSet<ClientId>,
    on_disconnect: HashMap<ClientId, Vec<String>>,
    offline: bool,
}

impl StoreInner {
    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Offline)
        } else {
            Ok(())
        }
    }

    fn snapshot(&self, prefix: &str) -> Snapshot {
        self.data
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Listeners affected by a change under `changed`, with their new snapshot
    fn notifications(&self, changed: &str) -> Vec<(Listener, Snapshot)> {
        self.listeners
            .values()
            .filter(|(prefix, _)| changed.starts_with(prefix.as_str()) || prefix.starts_with(changed))
            .map(|(prefix, listener)| (listener.clone(), self.snapshot(prefix)))
            .collect()
    }

    fn remove_prefix(&mut self, prefix: &str) -> bool {
        let before = self.data.len();
        self.data.retain(|key, _| !key.starts_with(prefix));
        self.data.len() != before
    }
}

/// Process-local [`SharedStore`]
///
/// Clones share the same data, so two channels built from clones of one
/// store see each other's writes. Listeners run on the writing thread after
/// the store lock has been released.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate losing or regaining the connection to the backend
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn key_count(&self) -> usize {
        self.lock().data.len()
    }

    fn notify(pending: Vec<(Listener, Snapshot)>) {
        for (listener, snapshot) in pending {
            listener(&snapshot);
        }
    }
}

impl SharedStore for InMemoryStore {
    fn authenticate(&self) -> Result<ClientId, StoreError> {
        let mut inner = self.lock();
        inner.check_online()?;
        inner.next_client += 1;
        let client = format!("anon-{}", inner.next_client);
        inner.clients.insert(client.clone());
        Ok(client)
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let inner = self.lock();
        inner.check_online()?;
        Ok(inner.data.get(key).cloned())
    }

    fn read_prefix(&self, prefix: &str) -> Result<Snapshot, StoreError> {
        let inner = self.lock();
        inner.check_online()?;
        Ok(inner.snapshot(prefix))
    }

    fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let pending = {
            let mut inner = self.lock();
            inner.check_online()?;
            inner.data.insert(key.to_string(), value);
            inner.notifications(key)
        };
        Self::notify(pending);
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<(), StoreError> {
        let pending = {
            let mut inner = self.lock();
            inner.check_online()?;
            if !inner.remove_prefix(prefix) {
                return Ok(());
            }
            inner.notifications(prefix)
        };
        Self::notify(pending);
        Ok(())
    }

    fn subscribe(&self, prefix: &str, listener: Listener) -> Result<ListenerId, StoreError> {
        let (id, snapshot) = {
            let mut inner = self.lock();
            inner.check_online()?;
            inner.next_listener += 1;
            let id = ListenerId(inner.next_listener);
            inner
                .listeners
                .insert(id, (prefix.to_string(), listener.clone()));
            (id, inner.snapshot(prefix))
        };
        listener(&snapshot);
        Ok(id)
    }

    fn unsubscribe(&self, id: ListenerId) -> Result<(), StoreError> {
        // Local bookkeeping only; works while offline
        self.lock().listeners.remove(&id);
        Ok(())
    }

    fn delete_on_disconnect(&self, client: &str, prefix: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.check_online()?;
        if !inner.clients.contains(client) {
            return Err(StoreError::UnknownClient(client.to_string()));
        }
        inner
            .on_disconnect
            .entry(client.to_string())
            .or_default()
            .push(prefix.to_string());
        Ok(())
    }

    fn disconnect(&self, client: &str) -> Result<(), StoreError> {
        let pending = {
            let mut inner = self.lock();
            if !inner.clients.remove(client) {
                return Err(StoreError::UnknownClient(client.to_string()));
            }
            let prefixes = inner.on_disconnect.remove(client).unwrap_or_default();
            let mut pending = Vec::new();
            for prefix in prefixes {
                if inner.remove_prefix(&prefix) {
                    pending.extend(inner.notifications(&prefix));
                }
            }
            pending
        };
        Self::notify(pending);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Listener, Arc<Mutex<Vec<Snapshot>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener: Listener = Arc::new(move |snapshot: &Snapshot| {
            sink.lock().unwrap().push(snapshot.clone());
        });
        (listener, seen)
    }

    #[test]
    fn test_subscribe_replays_and_notifies() {
        let store = InMemoryStore::new();
        store.write("a/x", vec![1]).unwrap();
        let (listener, seen) = recorder();

        store.subscribe("a/", listener).unwrap();
        store.write("a/y", vec![2]).unwrap();
        store.write("b/z", vec![3]).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2, "Replay plus one matching write");
        assert_eq!(seen[0], vec![("a/x".to_string(), vec![1])]);
        assert_eq!(seen[1].len(), 2);
    }

    #[test]
    fn test_prefix_reads_do_not_leak() {
        let store = InMemoryStore::new();
        store.write("sessions/A/status", vec![0]).unwrap();
        store.write("sessions/AB/status", vec![1]).unwrap();
        let snapshot = store.read_prefix("sessions/A/").unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_disconnect_runs_cleanup() {
        let store = InMemoryStore::new();
        let client = store.authenticate().unwrap();
        store.write("s/players/1/id", vec![1]).unwrap();
        store.write("s/status", vec![0]).unwrap();
        store.delete_on_disconnect(&client, "s/players/1/").unwrap();
        let (listener, seen) = recorder();
        store.subscribe("s/", listener).unwrap();

        store.disconnect(&client).unwrap();

        assert_eq!(store.read("s/players/1/id").unwrap(), None);
        assert!(store.read("s/status").unwrap().is_some());
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(
            store.disconnect(&client),
            Err(StoreError::UnknownClient(client))
        );
    }

    #[test]
    fn test_offline_store_rejects_calls() {
        let store = InMemoryStore::new();
        store.set_offline(true);
        assert_eq!(store.authenticate(), Err(StoreError::Offline));
        assert_eq!(store.write("k", vec![]), Err(StoreError::Offline));
        store.set_offline(false);
        assert!(store.authenticate().is_ok());
    }
}
