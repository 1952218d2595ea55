//! State keys, override snapshots, patches and change sets
//!
//! These are the plain data types the [`HybridState`](crate::HybridState)
//! container reconciles. None of them carry behavior beyond lookup and
//! construction; the merge and diff rules live in the container.

use std::borrow::{Borrow, Cow};
use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{Result, StateError};

/// Identifier for a piece of state inside one container
///
/// Keys are scoped to a single container instance. They are usually
/// `&'static str` literals (`"on"`, `"focused"`, `"query"`), but owned strings
/// work as well for keys built at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Cow<'static, str>);

impl StateKey {
    /// Create a key from a static string (usable in `const` context)
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for StateKey {
    fn from(key: &'static str) -> Self {
        Self::from_static(key)
    }
}

impl From<String> for StateKey {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

impl Borrow<str> for StateKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The internally persisted store of a container
///
/// Holds the latest uncontrolled value for every key ever written. Entries for
/// keys that are currently controlled are kept but ignored.
pub type ContainerState<V> = FxHashMap<StateKey, V>;

// =========================================================================
// Overrides
// =========================================================================

/// Snapshot of externally controlled values for one evaluation
///
/// A key is controlled iff it has an entry here. Absence is the only way to
/// express "not controlled"; a legitimately empty value is modelled by using
/// an `Option<T>` value type and inserting `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Overrides<V> {
    values: FxHashMap<StateKey, V>,
}

impl<V> Default for Overrides<V> {
    fn default() -> Self {
        Self {
            values: FxHashMap::default(),
        }
    }
}

impl<V> Overrides<V> {
    /// An empty snapshot (every key uncontrolled)
    pub fn new() -> Self {
        Self::default()
    }

    /// Control `key` with `value`
    pub fn control(mut self, key: impl Into<StateKey>, value: V) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Control `key` when `value` is `Some`, leave it uncontrolled otherwise
    ///
    /// This is the shape optional control props naturally have.
    pub fn with(mut self, key: impl Into<StateKey>, value: Option<V>) -> Self {
        let key = key.into();
        match value {
            Some(value) => {
                self.values.insert(key, value);
            }
            None => {
                self.values.remove(key.as_str());
            }
        }
        self
    }

    /// Control `key` with `value`, returning the previous override
    pub fn insert(&mut self, key: impl Into<StateKey>, value: V) -> Option<V> {
        self.values.insert(key.into(), value)
    }

    /// Hand `key` back to the container, returning the override it had
    pub fn release(&mut self, key: &str) -> Option<V> {
        self.values.remove(key)
    }

    /// The override for `key`, if controlled
    pub fn get(&self, key: &str) -> Option<&V> {
        self.values.get(key)
    }

    /// Whether `key` is controlled in this snapshot
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &V)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<StateKey>, V> FromIterator<(K, V)> for Overrides<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Source of the override snapshot for each evaluation
///
/// Behaviors implement this over their current control props so every read
/// and update sees the owner's latest values.
pub trait OverridesProvider<V> {
    fn overrides(&self) -> Overrides<V>;
}

impl<V: Clone> OverridesProvider<V> for Overrides<V> {
    fn overrides(&self) -> Overrides<V> {
        self.clone()
    }
}

// =========================================================================
// Effective State
// =========================================================================

/// The merged view of a container: overrides where present, stored values
/// otherwise
///
/// Effective state is always derived on demand and never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectiveState<V> {
    values: FxHashMap<StateKey, V>,
}

impl<V: Clone> EffectiveState<V> {
    /// Merge a store with an override snapshot
    ///
    /// Covers every key in either the store or the overrides.
    pub(crate) fn merge(store: &ContainerState<V>, overrides: &Overrides<V>) -> Self {
        let mut values = FxHashMap::with_capacity_and_hasher(
            store.len() + overrides.len(),
            Default::default(),
        );
        for (key, value) in store {
            if !overrides.contains(key.as_str()) {
                values.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in overrides.iter() {
            values.insert(key.clone(), value.clone());
        }
        Self { values }
    }
}

impl<V> EffectiveState<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.values.get(key)
    }

    /// Like [`get`](Self::get), but a missing key is an error
    pub fn require(&self, key: &str) -> Result<&V> {
        self.values
            .get(key)
            .ok_or_else(|| StateError::MissingKey(StateKey::from(key.to_owned())))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &V)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =========================================================================
// Patches & Updates
// =========================================================================

/// A partial state: an ordered set of keys with proposed values
///
/// Inserting a key twice keeps the last value at the first position.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch<V> {
    entries: SmallVec<[(StateKey, V); 4]>,
}

impl<V> Default for Patch<V> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<V> Patch<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch proposing a single value
    pub fn single(key: impl Into<StateKey>, value: V) -> Self {
        Self::new().set(key, value)
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn set(mut self, key: impl Into<StateKey>, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Propose `value` for `key`
    pub fn insert(&mut self, key: impl Into<StateKey>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<StateKey>, V> FromIterator<(K, V)> for Patch<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut patch = Patch::new();
        for (key, value) in iter {
            patch.insert(key, value);
        }
        patch
    }
}

impl<V> IntoIterator for Patch<V> {
    type Item = (StateKey, V);
    type IntoIter = smallvec::IntoIter<[(StateKey, V); 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Function form of an update, evaluated against the current effective state
pub type Updater<'a, V> = Box<dyn FnOnce(&EffectiveState<V>) -> Patch<V> + 'a>;

/// A state update: a literal patch or a function producing one
pub enum Update<'a, V> {
    Patch(Patch<V>),
    Func(Updater<'a, V>),
}

impl<'a, V> Update<'a, V> {
    /// A functional update
    ///
    /// The function sees the effective state, including controlled values,
    /// and must be pure: it runs while the container's store is locked.
    pub fn func<F>(f: F) -> Self
    where
        F: FnOnce(&EffectiveState<V>) -> Patch<V> + 'a,
    {
        Update::Func(Box::new(f))
    }

    pub(crate) fn resolve(self, current: &EffectiveState<V>) -> Patch<V> {
        match self {
            Update::Patch(patch) => patch,
            Update::Func(f) => f(current),
        }
    }
}

impl<V> From<Patch<V>> for Update<'_, V> {
    fn from(patch: Patch<V>) -> Self {
        Update::Patch(patch)
    }
}

impl<V: fmt::Debug> fmt::Debug for Update<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Patch(patch) => f.debug_tuple("Patch").field(patch).finish(),
            Update::Func(_) => f.write_str("Func(..)"),
        }
    }
}

// =========================================================================
// Change Sets
// =========================================================================

/// The keys of an update whose effective value actually changed, with their
/// proposed values, in the order the update proposed them
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeSet<V> {
    entries: SmallVec<[(StateKey, V); 4]>,
}

impl<V> Default for ChangeSet<V> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<V> ChangeSet<V> {
    pub(crate) fn push(&mut self, key: StateKey, value: V) {
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
