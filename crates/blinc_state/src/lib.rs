//! Blinc Hybrid State
//!
//! This crate provides the state primitive behind Blinc's behavior
//! components:
//!
//! - **Hybrid State**: a keyed store where each key is either controlled by the
//!   owner (supplied per read) or uncontrolled (persisted by the container)
//! - **Change Sets**: updates report exactly the keys whose effective value
//!   changed
//! - **Event Dispatch**: handler composition for intercepted target events
//!
//! # Example
//!
//! ```rust
//! use blinc_state::{HybridState, Overrides, Patch, Update};
//! use std::sync::{Arc, Mutex};
//!
//! let toggled = Arc::new(Mutex::new(Vec::new()));
//! let toggled_clone = toggled.clone();
//!
//! let state = HybridState::builder()
//!     .initial("on", false)
//!     .on_change(move |changes, _state| {
//!         if let Some(on) = changes.get("on") {
//!             toggled_clone.lock().unwrap().push(*on);
//!         }
//!     })
//!     .build();
//!
//! let flip = || {
//!     Update::func(|prev: &blinc_state::EffectiveState<bool>| {
//!         Patch::single("on", !prev.get("on").copied().unwrap_or(false))
//!     })
//! };
//!
//! // Uncontrolled: the flip is persisted
//! state.update(flip(), &Overrides::new());
//! assert_eq!(state.get("on", &Overrides::new()), Some(true));
//!
//! // Controlled: the flip is reported but the owner's value stays
//! let controlled = Overrides::new().control("on", true);
//! state.update(flip(), &controlled);
//! assert_eq!(state.get("on", &controlled), Some(true));
//!
//! assert_eq!(*toggled.lock().unwrap(), vec![true, false]);
//! ```

pub mod container;
pub mod error;
pub mod events;
pub mod state;

pub use container::{ChangeCallback, HybridState, HybridStateBuilder};
pub use error::{Result, StateError};
pub use events::{compose, Event, EventDispatcher, EventHandler, EventType};
pub use state::{
    ChangeSet, ContainerState, EffectiveState, Overrides, OverridesProvider, Patch, StateKey, Update,
    Updater,
};
