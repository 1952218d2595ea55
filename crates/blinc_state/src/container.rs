//! Hybrid controlled/uncontrolled state container
//!
//! `HybridState<V>` owns a store of named values. On every access each key is
//! resolved independently: if the caller's [`Overrides`] snapshot has an entry
//! for it, that value is authoritative (the key is *controlled*); otherwise the
//! container's own stored value is used (the key is *uncontrolled*).
//!
//! Updates are applied to uncontrolled keys only. Change detection runs against
//! the effective view, so the change hook fires whenever an effective value
//! would differ, including for controlled keys whose owner is expected to act
//! on the notification:
//!
//! ```rust
//! use blinc_state::{HybridState, Overrides, Patch};
//!
//! let state = HybridState::new([("on", false)]);
//!
//! // Uncontrolled: the write is persisted
//! state.update(Patch::single("on", true), &Overrides::new());
//! assert_eq!(state.get("on", &Overrides::new()), Some(true));
//!
//! // Controlled: the owner's value wins, the write is only reported
//! let controlled = Overrides::new().control("on", false);
//! let changes = state.update(Patch::single("on", true), &controlled);
//! assert!(changes.contains("on"));
//! assert_eq!(state.get("on", &controlled), Some(false));
//! ```

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::state::{
    ChangeSet, ContainerState, EffectiveState, Overrides, Patch, StateKey, Update,
};

/// Hook invoked with the changed keys and the post-update effective state
pub type ChangeCallback<V> = Arc<dyn Fn(&ChangeSet<V>, &EffectiveState<V>) + Send + Sync>;

fn noop_change<V>() -> ChangeCallback<V> {
    Arc::new(|_: &ChangeSet<V>, _: &EffectiveState<V>| {})
}

/// Shared handle to a hybrid state container
///
/// Cloning the handle shares the store and the change hook.
pub struct HybridState<V> {
    store: Arc<Mutex<ContainerState<V>>>,
    on_change: ChangeCallback<V>,
}

impl<V> Clone for HybridState<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            on_change: Arc::clone(&self.on_change),
        }
    }
}

impl<V> std::fmt::Debug for HybridState<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridState").finish_non_exhaustive()
    }
}

/// Builder for [`HybridState`]
pub struct HybridStateBuilder<V> {
    initial: ContainerState<V>,
    on_change: Option<ChangeCallback<V>>,
}

impl<V> Default for HybridStateBuilder<V> {
    fn default() -> Self {
        Self {
            initial: ContainerState::default(),
            on_change: None,
        }
    }
}

impl<V: Clone + PartialEq + Send + Sync + 'static> HybridStateBuilder<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an initial value
    pub fn initial(mut self, key: impl Into<StateKey>, value: V) -> Self {
        self.initial.insert(key.into(), value);
        self
    }

    /// Add several initial values
    pub fn with_initial<K, I>(mut self, values: I) -> Self
    where
        K: Into<StateKey>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.initial
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Set the change hook
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&ChangeSet<V>, &EffectiveState<V>) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> HybridState<V> {
        HybridState {
            store: Arc::new(Mutex::new(self.initial)),
            on_change: self.on_change.unwrap_or_else(noop_change),
        }
    }
}

impl<V: Clone + PartialEq + Send + Sync + 'static> HybridState<V> {
    /// Create a container from initial values, with no change hook
    pub fn new<K, I>(initial: I) -> Self
    where
        K: Into<StateKey>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::builder().with_initial(initial).build()
    }

    pub fn builder() -> HybridStateBuilder<V> {
        HybridStateBuilder::new()
    }

    /// Whether `key` is controlled in this snapshot
    ///
    /// Never cached: control can move between evaluations.
    pub fn is_controlled(&self, key: &str, overrides: &Overrides<V>) -> bool {
        overrides.contains(key)
    }

    /// The effective state for this snapshot
    pub fn read(&self, overrides: &Overrides<V>) -> EffectiveState<V> {
        EffectiveState::merge(&self.lock(), overrides)
    }

    /// The effective value of a single key
    pub fn get(&self, key: &str, overrides: &Overrides<V>) -> Option<V> {
        if let Some(value) = overrides.get(key) {
            return Some(value.clone());
        }
        self.lock().get(key).cloned()
    }

    /// The raw stored value of a key, ignoring any control
    ///
    /// For a controlled key this is the shadow value that will be revealed
    /// once control is released.
    pub fn stored(&self, key: &str) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Propose a single value
    pub fn set(&self, key: impl Into<StateKey>, value: V, overrides: &Overrides<V>) -> ChangeSet<V> {
        self.update(Patch::single(key, value), overrides)
    }

    /// Apply an update and notify the change hook if anything changed
    pub fn update<'a>(
        &self,
        updater: impl Into<Update<'a, V>>,
        overrides: &Overrides<V>,
    ) -> ChangeSet<V> {
        self.update_then(updater, overrides, |_| {})
    }

    /// Like [`update`](Self::update), then run `on_complete`
    ///
    /// `on_complete` always runs, after the change hook, whether or not the
    /// update changed anything.
    pub fn update_then<'a, C>(
        &self,
        updater: impl Into<Update<'a, V>>,
        overrides: &Overrides<V>,
        on_complete: C,
    ) -> ChangeSet<V>
    where
        C: FnOnce(&ChangeSet<V>),
    {
        let updater = updater.into();
        let result = self.try_update_then(
            |current| Ok::<_, Infallible>(updater.resolve(current)),
            overrides,
            on_complete,
        );
        match result {
            Ok(changes) => changes,
            Err(never) => match never {},
        }
    }

    /// Apply a fallible functional update
    ///
    /// If `updater` fails nothing is written and no callback runs.
    pub fn try_update<F, E>(&self, updater: F, overrides: &Overrides<V>) -> Result<ChangeSet<V>, E>
    where
        F: FnOnce(&EffectiveState<V>) -> Result<Patch<V>, E>,
    {
        self.try_update_then(updater, overrides, |_| {})
    }

    /// Fallible update with a completion callback
    pub fn try_update_then<F, E, C>(
        &self,
        updater: F,
        overrides: &Overrides<V>,
        on_complete: C,
    ) -> Result<ChangeSet<V>, E>
    where
        F: FnOnce(&EffectiveState<V>) -> Result<Patch<V>, E>,
        C: FnOnce(&ChangeSet<V>),
    {
        // The lock spans read, updater and commit so the updater always sees
        // the latest committed store.
        let changes = {
            let mut store = self.lock();
            let current = EffectiveState::merge(&store, overrides);
            let proposed = updater(&current)?;
            commit(&mut store, proposed, &current, overrides)
        };

        if !changes.is_empty() {
            let next = self.read(overrides);
            tracing::trace!(changed = changes.len(), "hybrid state changed");
            (self.on_change)(&changes, &next);
        }
        on_complete(&changes);

        Ok(changes)
    }

    fn lock(&self) -> MutexGuard<'_, ContainerState<V>> {
        // Commit is the last step under the lock, so a poisoned store is
        // still consistent.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Write uncontrolled values and collect effective differences
fn commit<V: Clone + PartialEq>(
    store: &mut ContainerState<V>,
    proposed: Patch<V>,
    current: &EffectiveState<V>,
    overrides: &Overrides<V>,
) -> ChangeSet<V> {
    let mut changes = ChangeSet::default();
    for (key, value) in proposed {
        let changed = current.get(key.as_str()) != Some(&value);
        if overrides.contains(key.as_str()) {
            tracing::debug!(key = %key, changed, "not persisting controlled key");
            if changed {
                changes.push(key, value);
            }
        } else {
            if changed {
                changes.push(key.clone(), value.clone());
            }
            store.insert(key, value);
        }
    }
    changes
}
