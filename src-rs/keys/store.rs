use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, warn};

use super::persist::{MemorySettings, SettingsBackend};
use super::types::{KeySnapshot, PersistedState};
use crate::config::RemovalPolicy;

/// Re-render callback, invoked with the new state after every mutation.
pub type KeyObserver = Arc<dyn Fn(&KeySnapshot) + Send + Sync>;

#[derive(Debug, Default)]
struct KeyState {
    keys: Vec<String>,
    current_index: usize,
    enabled: bool,
}

impl KeyState {
    fn from_persisted(state: PersistedState, policy: RemovalPolicy) -> Self {
        let keys = state
            .api_keys
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
        let mut loaded = Self {
            keys,
            current_index: state.current_index,
            enabled: state.enabled,
        };
        loaded.clamp(policy);
        loaded
    }

    /// Empty list resets the pointer to 0; otherwise it is pulled back into range.
    fn clamp(&mut self, policy: RemovalPolicy) {
        let len = self.keys.len();
        if len == 0 {
            self.current_index = 0;
        } else if self.current_index >= len {
            self.current_index = match policy {
                RemovalPolicy::WrapToStart => 0,
                RemovalPolicy::ClampToEnd => len - 1,
            };
        }
    }

    fn snapshot(&self) -> KeySnapshot {
        KeySnapshot {
            keys: self.keys.clone(),
            current_index: self.current_index,
            enabled: self.enabled,
        }
    }
}

/// Ordered API keys plus the rotation pointer.
///
/// Every operation is total: bad input is a silent no-op and persistence
/// failures are logged while the in-memory state carries on. All reads and
/// writes of the pointer happen under one lock, so concurrent `advance` calls
/// never lose an increment.
pub struct KeyStore {
    storage_key: String,
    policy: RemovalPolicy,
    backend: Arc<dyn SettingsBackend>,
    state: Mutex<KeyState>,
    observers: RwLock<Vec<KeyObserver>>,
}

impl KeyStore {
    /// Loads the record stored under `storage_key`, falling back to empty
    /// defaults when nothing is stored or the record cannot be read.
    pub fn open(backend: Arc<dyn SettingsBackend>, storage_key: &str, policy: RemovalPolicy) -> Self {
        let state = match backend.load(storage_key) {
            Ok(Some(persisted)) => KeyState::from_persisted(persisted, policy),
            Ok(None) => KeyState::default(),
            Err(err) => {
                warn!(storage_key, error = %err, "failed to load key settings, starting empty");
                KeyState::default()
            }
        };
        debug!(storage_key, keys = state.keys.len(), index = state.current_index, "key store opened");
        Self {
            storage_key: storage_key.to_string(),
            policy,
            backend,
            state: Mutex::new(state),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemorySettings::new()), "apirotay", RemovalPolicy::default())
    }

    pub fn subscribe(&self, observer: KeyObserver) {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        observers.push(observer);
    }

    /// Appends a trimmed key. Blank input is ignored; duplicates are kept.
    pub fn add(&self, key: &str) -> bool {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.mutate(|state| {
            state.keys.push(trimmed.to_string());
            Some(())
        })
        .is_some()
    }

    /// Appends each non-blank key only when the list is still empty.
    pub fn seed_if_empty(&self, keys: &[String]) -> usize {
        self.mutate(|state| {
            if !state.keys.is_empty() {
                return None;
            }
            state.keys.extend(
                keys.iter()
                    .map(|key| key.trim())
                    .filter(|key| !key.is_empty())
                    .map(str::to_string),
            );
            if state.keys.is_empty() {
                None
            } else {
                Some(state.keys.len())
            }
        })
        .unwrap_or(0)
    }

    /// Removes the key at `index`, returning it. Out-of-range is a no-op.
    ///
    /// Removing below the pointer shifts it down so the same key stays current;
    /// removing at or above it only clamps per the configured policy.
    pub fn remove_at(&self, index: usize) -> Option<String> {
        let policy = self.policy;
        self.mutate(|state| {
            if index >= state.keys.len() {
                return None;
            }
            let removed = state.keys.remove(index);
            if index < state.current_index {
                state.current_index -= 1;
            }
            state.clamp(policy);
            Some(removed)
        })
    }

    pub fn list(&self) -> Vec<String> {
        self.lock().keys.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().keys.is_empty()
    }

    pub fn current(&self) -> Option<String> {
        let state = self.lock();
        state.keys.get(state.current_index).cloned()
    }

    pub fn current_index(&self) -> usize {
        self.lock().current_index
    }

    /// Moves the pointer one step, wrapping, and returns the newly current key.
    pub fn advance(&self) -> Option<String> {
        self.mutate(|state| {
            if state.keys.is_empty() {
                return None;
            }
            state.current_index = (state.current_index + 1) % state.keys.len();
            state.keys.get(state.current_index).cloned()
        })
    }

    pub fn set_enabled(&self, flag: bool) {
        self.mutate(|state| {
            state.enabled = flag;
            Some(())
        });
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    pub fn snapshot(&self) -> KeySnapshot {
        self.lock().snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, KeyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `op` under the state lock. `Some` means the state changed: it is
    /// saved while still locked, then observers see the new snapshot.
    fn mutate<T>(&self, op: impl FnOnce(&mut KeyState) -> Option<T>) -> Option<T> {
        let mut state = self.lock();
        let out = op(&mut *state)?;
        let snapshot = state.snapshot();
        let persisted = PersistedState::from(snapshot.clone());
        if let Err(err) = self.backend.save(&self.storage_key, &persisted) {
            warn!(storage_key = %self.storage_key, error = %err, "failed to persist key settings");
        }
        drop(state);

        let observers = self.observers.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer(&snapshot);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::{Result, RotatorError};

    fn store_with(keys: &[&str]) -> KeyStore {
        let store = KeyStore::in_memory();
        for key in keys {
            store.add(key);
        }
        store
    }

    struct FailingSettings;

    impl SettingsBackend for FailingSettings {
        fn load(&self, _: &str) -> Result<Option<PersistedState>> {
            Err(RotatorError::Io(std::io::Error::other("disk gone")))
        }

        fn save(&self, _: &str, _: &PersistedState) -> Result<()> {
            Err(RotatorError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn add_trims_and_rejects_blank() {
        let store = store_with(&["  a  "]);
        assert!(!store.add(""));
        assert!(!store.add("   "));
        assert_eq!(store.list(), vec!["a"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let store = store_with(&["a", "a"]);
        assert_eq!(store.list(), vec!["a", "a"]);
    }

    #[test]
    fn advance_cycles_from_start() {
        let store = store_with(&["a", "b", "c"]);
        let seen: Vec<_> = (0..4).filter_map(|_| store.advance()).collect();
        assert_eq!(seen, vec!["b", "c", "a", "b"]);
    }

    #[test]
    fn advance_on_empty_returns_none_and_keeps_state() {
        let store = KeyStore::in_memory();
        assert_eq!(store.advance(), None);
        assert_eq!(store.current(), None);
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn remove_preserves_order() {
        let store = store_with(&["a", "b", "c"]);
        assert_eq!(store.remove_at(1), Some("b".to_string()));
        assert_eq!(store.list(), vec!["a", "c"]);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let store = store_with(&["a", "b"]);
        store.advance();
        assert_eq!(store.remove_at(2), None);
        assert_eq!(store.list(), vec!["a", "b"]);
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn remove_below_pointer_keeps_current_key() {
        let store = store_with(&["a", "b", "c"]);
        store.advance();
        store.advance();
        assert_eq!(store.current().as_deref(), Some("c"));
        store.remove_at(0);
        assert_eq!(store.current().as_deref(), Some("c"));
        assert_eq!(store.current_index(), 1);
    }

    #[test]
    fn remove_last_current_wraps_to_start_by_default() {
        let store = store_with(&["a", "b", "c"]);
        store.advance();
        store.advance();
        store.remove_at(2);
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current().as_deref(), Some("a"));
    }

    #[test]
    fn remove_last_current_clamps_to_end_when_configured() {
        let store = KeyStore::open(Arc::new(MemorySettings::new()), "k", RemovalPolicy::ClampToEnd);
        for key in ["a", "b", "c"] {
            store.add(key);
        }
        store.advance();
        store.advance();
        store.remove_at(2);
        assert_eq!(store.current_index(), 1);
        assert_eq!(store.current().as_deref(), Some("b"));
    }

    #[test]
    fn removing_everything_resets_pointer() {
        let store = store_with(&["a", "b"]);
        store.advance();
        store.remove_at(1);
        store.remove_at(0);
        assert!(store.is_empty());
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.current(), None);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let backend = Arc::new(MemorySettings::new());
        let store = KeyStore::open(backend.clone(), "apirotay", RemovalPolicy::default());
        store.add("k1");
        store.add("k2");
        store.advance();
        store.set_enabled(true);

        let saved = backend.load("apirotay").unwrap().unwrap();
        assert_eq!(
            saved,
            PersistedState {
                enabled: true,
                api_keys: vec!["k1".into(), "k2".into()],
                current_index: 1,
            }
        );

        let reopened = KeyStore::open(backend, "apirotay", RemovalPolicy::default());
        assert_eq!(reopened.snapshot(), store.snapshot());
    }

    #[test]
    fn open_normalizes_stored_record() {
        let backend = Arc::new(MemorySettings::new());
        backend
            .save(
                "apirotay",
                &PersistedState {
                    enabled: true,
                    api_keys: vec![" a ".into(), "".into(), "b".into()],
                    current_index: 7,
                },
            )
            .unwrap();
        let store = KeyStore::open(backend, "apirotay", RemovalPolicy::default());
        assert_eq!(store.list(), vec!["a", "b"]);
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn persistence_failure_keeps_memory_state() {
        let store = KeyStore::open(Arc::new(FailingSettings), "apirotay", RemovalPolicy::default());
        assert!(store.add("k1"));
        assert!(store.add("k2"));
        assert_eq!(store.advance().as_deref(), Some("k2"));
        assert_eq!(store.list(), vec!["k1", "k2"]);
    }

    #[test]
    fn observers_see_each_mutation_but_not_noops() {
        let store = KeyStore::in_memory();
        let renders = Arc::new(AtomicUsize::new(0));
        let counter = renders.clone();
        store.subscribe(Arc::new(move |_snapshot: &KeySnapshot| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        store.add("a");
        store.add("  ");
        store.remove_at(5);
        store.advance();
        store.set_enabled(true);
        assert_eq!(renders.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn seed_only_fills_empty_store() {
        let store = KeyStore::in_memory();
        assert_eq!(store.seed_if_empty(&["a".to_string(), " ".to_string(), "b".to_string()]), 2);
        assert_eq!(store.seed_if_empty(&["c".to_string()]), 0);
        assert_eq!(store.list(), vec!["a", "b"]);
    }
}
