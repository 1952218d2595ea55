//! Toggle behavior for on/off state
//!
//! Wraps a hybrid state container under the single key `on`. The toggle can be
//! uncontrolled (it remembers its own state, starting from `initial`) or
//! controlled by the owner through the `on` prop, in which case `toggle()` only
//! reports the proposed flip through `on_toggle` and the owner decides.
//!
//! # Example
//!
//! ```rust
//! use blinc_behaviors::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = seen.clone();
//!
//! let toggle = Toggle::new(
//!     ToggleProps::new().on_toggle(move |on| seen_clone.lock().unwrap().push(on)),
//! );
//!
//! let view = toggle.render();
//! assert!(!view.on);
//! view.toggle();
//!
//! assert!(toggle.render().on);
//! assert_eq!(*seen.lock().unwrap(), vec![true]);
//! ```

use std::sync::{Arc, Mutex};

use blinc_state::{
    ChangeSet, EffectiveState, HybridState, Overrides, OverridesProvider, Patch, Update,
};

use crate::behavior::{lock, Behavior, Callback};
use crate::config::ToggleConfig;

/// State key for the toggle value
pub const ON: &str = "on";

/// Toggle props
#[derive(Clone, Default)]
pub struct ToggleProps {
    /// Starting value when uncontrolled. Only read at construction.
    pub initial: bool,
    /// Control prop
    pub on: Option<bool>,
    /// Called with the new value whenever a toggle changes it
    pub on_toggle: Option<Callback<bool>>,
}

impl ToggleProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Props seeded from config defaults
    pub fn from_config(config: &ToggleConfig) -> Self {
        Self::new().initial(config.initial)
    }

    /// Set the initial value
    pub fn initial(mut self, initial: bool) -> Self {
        self.initial = initial;
        self
    }

    /// Control the value from outside
    pub fn controlled(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    /// Set the toggle callback
    pub fn on_toggle<F>(mut self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_toggle = Some(Arc::new(f));
        self
    }
}

/// Toggle behavior
///
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct Toggle {
    state: HybridState<bool>,
    props: Arc<Mutex<ToggleProps>>,
}

impl Toggle {
    pub fn new(props: ToggleProps) -> Self {
        let initial = props.initial;
        let props = Arc::new(Mutex::new(props));

        let hook_props = Arc::clone(&props);
        let state = HybridState::builder()
            .initial(ON, initial)
            .on_change(move |changes: &ChangeSet<bool>, _: &EffectiveState<bool>| {
                let Some(&on) = changes.get(ON) else {
                    return;
                };
                let callback = lock(&hook_props).on_toggle.clone();
                if let Some(callback) = callback {
                    callback(on);
                }
            })
            .build();

        Self { state, props }
    }

    /// Current value
    pub fn on(&self) -> bool {
        self.state
            .get(ON, &self.overrides())
            .unwrap_or_default()
    }

    /// Flip the current effective value
    pub fn toggle(&self) {
        let overrides = self.overrides();
        let changes = self.state.update(
            Update::func(|prev: &EffectiveState<bool>| {
                Patch::single(ON, !prev.get(ON).copied().unwrap_or_default())
            }),
            &overrides,
        );
        tracing::trace!(
            controlled = self.state.is_controlled(ON, &overrides),
            changed = !changes.is_empty(),
            "toggle"
        );
    }

    /// Replace the props, as an owner re-render would
    ///
    /// `initial` is ignored after construction.
    pub fn set_props(&self, props: ToggleProps) {
        *lock(&self.props) = props;
    }

    /// Take or release control of the value
    pub fn set_controlled(&self, on: Option<bool>) {
        lock(&self.props).on = on;
    }
}

impl OverridesProvider<bool> for Toggle {
    fn overrides(&self) -> Overrides<bool> {
        Overrides::new().with(ON, lock(&self.props).on)
    }
}

impl Behavior for Toggle {
    type View = ToggleView;

    fn render(&self) -> ToggleView {
        ToggleView {
            on: self.on(),
            handle: self.clone(),
        }
    }
}

/// Rendered toggle: the current value and the toggle operation
#[derive(Clone)]
pub struct ToggleView {
    pub on: bool,
    handle: Toggle,
}

impl ToggleView {
    pub fn toggle(&self) {
        self.handle.toggle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_props() -> (ToggleProps, Arc<Mutex<Vec<bool>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let props = ToggleProps::new().on_toggle(move |on| seen_clone.lock().unwrap().push(on));
        (props, seen)
    }

    #[test]
    fn test_default_is_off() {
        let toggle = Toggle::new(ToggleProps::new());
        assert!(!toggle.on());
    }

    #[test]
    fn test_initial_value() {
        let toggle = Toggle::new(ToggleProps::new().initial(true));
        assert!(toggle.on());
        toggle.toggle();
        assert!(!toggle.on());
    }

    #[test]
    fn test_uncontrolled_toggle_notifies() {
        let (props, seen) = recording_props();
        let toggle = Toggle::new(props);

        toggle.toggle();
        toggle.toggle();
        toggle.toggle();

        assert!(toggle.on());
        assert_eq!(*seen.lock().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_release_control_reveals_internal_value() {
        let toggle = Toggle::new(ToggleProps::new().controlled(true));
        assert!(toggle.on());

        toggle.set_controlled(None);
        assert!(!toggle.on());
    }

    #[test]
    fn test_set_props_replaces_callback() {
        let (props, seen) = recording_props();
        let toggle = Toggle::new(ToggleProps::new());

        toggle.toggle();
        toggle.set_props(props);
        toggle.toggle();

        assert_eq!(*seen.lock().unwrap(), vec![false]);
    }
}
