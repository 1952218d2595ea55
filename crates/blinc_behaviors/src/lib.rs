//! Blinc Behaviors
//!
//! Headless behavior primitives built on [`blinc_state::HybridState`]:
//!
//! - **Toggle**: on/off state with an optional control prop
//! - **Focus**: focus tracking and focus/blur commands for a target
//! - **Filter**: query-driven filtering of a list of items
//!
//! Each behavior keeps its state under a fixed key, forwards effective
//! changes to a named callback (`on_toggle`, `on_focus_change`,
//! `on_query_change`) and renders to a plain view record for the UI layer.

pub mod behavior;
pub mod config;
pub mod error;
pub mod filter;
pub mod focus;
pub mod toggle;

pub use behavior::{Behavior, Callback};
pub use config::{BehaviorConfig, FilterConfig, ToggleConfig};
pub use error::{BehaviorError, Result};
pub use filter::{substring_filter, Filter, FilterFunc, FilterProps, FilterView};
pub use focus::{Focus, FocusProps, FocusTarget, FocusView, Focusable, TargetProps};
pub use toggle::{Toggle, ToggleProps, ToggleView};

/// Common imports for using behaviors
pub mod prelude {
    pub use crate::behavior::{Behavior, Callback};
    pub use crate::config::BehaviorConfig;
    pub use crate::error::BehaviorError;
    pub use crate::filter::{substring_filter, Filter, FilterFunc, FilterProps, FilterView};
    pub use crate::focus::{Focus, FocusProps, FocusTarget, FocusView, Focusable, TargetProps};
    pub use crate::toggle::{Toggle, ToggleProps, ToggleView};
    pub use blinc_state::{Event, EventDispatcher, OverridesProvider};
}
