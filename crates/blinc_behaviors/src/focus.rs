//! Focus behavior for tracking and commanding target focus
//!
//! The `focused` flag lives in a hybrid state container like any other
//! behavior state, while moving focus is an imperative command against the
//! captured target. A typical cycle:
//!
//! 1. The UI layer mounts the target with [`Focus::get_target_props`] and calls
//!    [`TargetProps::attach`] with the mounted element
//! 2. Focus/blur events dispatched to the target run the caller's handler,
//!    then the internal one, which updates `focused`
//! 3. [`Focus::focus`] / [`Focus::blur`] ask the target to move focus; the
//!    target's own events then close the loop
//!
//! ```ignore
//! let focus = Focus::new(FocusProps::new().on_focus(|_| println!("focused")));
//! let props = focus.get_target_props(TargetProps::new());
//! props.register(&mut dispatcher, input_id);
//! props.attach(input_handle);
//! ```

use std::sync::{Arc, Mutex};

use blinc_state::events::event_types;
use blinc_state::{
    compose, ChangeSet, EffectiveState, Event, EventDispatcher, EventHandler, HybridState,
    Overrides, OverridesProvider,
};

use crate::behavior::{lock, Behavior, Callback};
use crate::error::{BehaviorError, Result};

/// State key for the focus flag
pub const FOCUSED: &str = "focused";

/// A target that can be focused and blurred
pub trait Focusable: Send + Sync {
    fn focus(&self);
    fn blur(&self);
}

/// Shared focus target reference
pub type FocusTarget = Arc<dyn Focusable>;

/// Focus props
#[derive(Clone, Default)]
pub struct FocusProps {
    /// Called after the target gains focus
    pub on_focus: Option<EventHandler>,
    /// Called after the target loses focus
    pub on_blur: Option<EventHandler>,
    /// Called with the target whenever it is captured
    pub target_ref: Option<Callback<FocusTarget>>,
    /// Control prop for the focus flag
    pub focused: Option<bool>,
    /// Called with the new flag whenever it changes
    pub on_focus_change: Option<Callback<bool>>,
}

impl FocusProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_focus<F>(mut self, f: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.on_focus = Some(Arc::new(f));
        self
    }

    pub fn on_blur<F>(mut self, f: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.on_blur = Some(Arc::new(f));
        self
    }

    pub fn target_ref<F>(mut self, f: F) -> Self
    where
        F: Fn(FocusTarget) + Send + Sync + 'static,
    {
        self.target_ref = Some(Arc::new(f));
        self
    }

    pub fn controlled(mut self, focused: bool) -> Self {
        self.focused = Some(focused);
        self
    }

    pub fn on_focus_change<F>(mut self, f: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_focus_change = Some(Arc::new(f));
        self
    }
}

/// Props for the focus target
///
/// Passed to [`Focus::get_target_props`] as the caller's own props and returned
/// merged with the behavior's interception.
#[derive(Clone, Default)]
pub struct TargetProps {
    pub on_focus: Option<EventHandler>,
    pub on_blur: Option<EventHandler>,
    pub target_ref: Option<Callback<FocusTarget>>,
}

impl TargetProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_focus<F>(mut self, f: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.on_focus = Some(Arc::new(f));
        self
    }

    pub fn on_blur<F>(mut self, f: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.on_blur = Some(Arc::new(f));
        self
    }

    pub fn target_ref<F>(mut self, f: F) -> Self
    where
        F: Fn(FocusTarget) + Send + Sync + 'static,
    {
        self.target_ref = Some(Arc::new(f));
        self
    }

    /// Register the focus and blur handlers for `target` with a dispatcher
    pub fn register(&self, dispatcher: &mut EventDispatcher, target: u64) {
        if let Some(handler) = &self.on_focus {
            dispatcher.register_handler(target, event_types::FOCUS, Arc::clone(handler));
        }
        if let Some(handler) = &self.on_blur {
            dispatcher.register_handler(target, event_types::BLUR, Arc::clone(handler));
        }
    }

    /// Hand the mounted target to the reference callback
    pub fn attach(&self, target: FocusTarget) {
        if let Some(target_ref) = &self.target_ref {
            target_ref(target);
        }
    }
}

/// Focus behavior
///
/// Cloning shares the underlying state and captured target.
#[derive(Clone)]
pub struct Focus {
    state: HybridState<bool>,
    props: Arc<Mutex<FocusProps>>,
    target: Arc<Mutex<Option<FocusTarget>>>,
}

impl Focus {
    pub fn new(props: FocusProps) -> Self {
        let props = Arc::new(Mutex::new(props));

        let hook_props = Arc::clone(&props);
        let state = HybridState::builder()
            .initial(FOCUSED, false)
            .on_change(move |changes: &ChangeSet<bool>, _: &EffectiveState<bool>| {
                let Some(&focused) = changes.get(FOCUSED) else {
                    return;
                };
                let callback = lock(&hook_props).on_focus_change.clone();
                if let Some(callback) = callback {
                    callback(focused);
                }
            })
            .build();

        Self {
            state,
            props,
            target: Arc::new(Mutex::new(None)),
        }
    }

    /// Current focus flag
    pub fn focused(&self) -> bool {
        self.state
            .get(FOCUSED, &self.overrides())
            .unwrap_or_default()
    }

    /// Ask the captured target to take focus
    pub fn focus(&self) -> Result<()> {
        self.captured()?.focus();
        Ok(())
    }

    /// Ask the captured target to give up focus
    pub fn blur(&self) -> Result<()> {
        self.captured()?.blur();
        Ok(())
    }

    /// Merge the caller's target props with focus tracking
    ///
    /// The caller's handlers run first and are always invoked. The returned
    /// reference callback captures the target for [`focus`](Self::focus) and
    /// [`blur`](Self::blur), then hands it to the caller's `target_ref`.
    pub fn get_target_props(&self, extra: TargetProps) -> TargetProps {
        let this = self.clone();
        let handle_focus: EventHandler = Arc::new(move |event: &Event| this.handle_focus(event));
        let this = self.clone();
        let handle_blur: EventHandler = Arc::new(move |event: &Event| this.handle_blur(event));
        let this = self.clone();
        let extra_ref = extra.target_ref;
        let capture: Callback<FocusTarget> = Arc::new(move |target: FocusTarget| {
            this.capture(Arc::clone(&target));
            if let Some(extra_ref) = &extra_ref {
                extra_ref(target);
            }
        });

        TargetProps {
            on_focus: compose(extra.on_focus, Some(handle_focus)),
            on_blur: compose(extra.on_blur, Some(handle_blur)),
            target_ref: Some(capture),
        }
    }

    /// Replace the props, as an owner re-render would
    pub fn set_props(&self, props: FocusProps) {
        *lock(&self.props) = props;
    }

    fn handle_focus(&self, event: &Event) {
        self.state.set(FOCUSED, true, &self.overrides());
        let on_focus = lock(&self.props).on_focus.clone();
        if let Some(on_focus) = on_focus {
            on_focus(event);
        }
    }

    fn handle_blur(&self, event: &Event) {
        self.state.set(FOCUSED, false, &self.overrides());
        let on_blur = lock(&self.props).on_blur.clone();
        if let Some(on_blur) = on_blur {
            on_blur(event);
        }
    }

    fn capture(&self, target: FocusTarget) {
        *lock(&self.target) = Some(Arc::clone(&target));
        let target_ref = lock(&self.props).target_ref.clone();
        if let Some(target_ref) = target_ref {
            target_ref(target);
        }
    }

    fn captured(&self) -> Result<FocusTarget> {
        let target = lock(&self.target).clone();
        target.ok_or_else(|| {
            tracing::debug!("focus command without a captured target");
            BehaviorError::MissingTarget
        })
    }
}

impl OverridesProvider<bool> for Focus {
    fn overrides(&self) -> Overrides<bool> {
        Overrides::new().with(FOCUSED, lock(&self.props).focused)
    }
}

impl Behavior for Focus {
    type View = FocusView;

    fn render(&self) -> FocusView {
        FocusView {
            focused: self.focused(),
            handle: self.clone(),
        }
    }
}

/// Rendered focus state with its operations
#[derive(Clone)]
pub struct FocusView {
    pub focused: bool,
    handle: Focus,
}

impl FocusView {
    pub fn focus(&self) -> Result<()> {
        self.handle.focus()
    }

    pub fn blur(&self) -> Result<()> {
        self.handle.blur()
    }

    pub fn get_target_props(&self, extra: TargetProps) -> TargetProps {
        self.handle.get_target_props(extra)
    }
}
