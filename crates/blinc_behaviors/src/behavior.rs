//! Base behavior trait and shared callback types

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Callback receiving a single value
pub type Callback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Base trait for all behaviors
///
/// A behavior wraps a hybrid state container under a fixed set of keys and
/// exposes its current state plus operations as a plain view record. Mounting
/// and drawing the view is left to the UI layer.
pub trait Behavior {
    /// Snapshot of state fields and operations handed to the UI layer
    type View;

    /// Evaluate the behavior against the owner's current props
    fn render(&self) -> Self::View;
}

/// Lock props shared between a behavior and its change hook
///
/// Props are only replaced wholesale, so a poisoned lock still holds a valid
/// value.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
