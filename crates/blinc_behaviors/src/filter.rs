//! Filter behavior for refining a list of items by a query
//!
//! The query lives under the key `query` in a hybrid state container and can
//! be controlled by the owner. Every render derives the filtered items from
//! the current items and the effective query.
//!
//! # Example
//!
//! ```rust
//! use blinc_behaviors::prelude::*;
//!
//! let filter = Filter::new(
//!     FilterProps::substring(false)
//!         .items(vec!["orange".to_string(), "apple".to_string(), "onion".to_string()]),
//! )
//! .unwrap();
//! assert_eq!(filter.query().as_deref(), Some(""));
//!
//! filter.refine("ON".to_string());
//! assert_eq!(filter.render().filtered_items, vec!["onion".to_string()]);
//! ```

use std::sync::{Arc, Mutex};

use blinc_state::{
    ChangeSet, EffectiveState, HybridState, Overrides, OverridesProvider, Patch,
};

use crate::behavior::{lock, Behavior, Callback};
use crate::config::FilterConfig;
use crate::error::{BehaviorError, Result};

/// State key for the query
pub const QUERY: &str = "query";

/// Filters items by a query
///
/// Must return every item when the query is `None`.
pub type FilterFunc<T, Q> = Arc<dyn Fn(&[T], Option<&Q>) -> Vec<T> + Send + Sync>;

/// Substring filter for string items
///
/// An absent or empty query keeps every item.
pub fn substring_filter(case_sensitive: bool) -> FilterFunc<String, String> {
    Arc::new(move |items: &[String], query: Option<&String>| {
        let query = match query {
            Some(query) if !query.is_empty() => query,
            _ => return items.to_vec(),
        };
        if case_sensitive {
            items
                .iter()
                .filter(|item| item.contains(query.as_str()))
                .cloned()
                .collect()
        } else {
            let query = query.to_lowercase();
            items
                .iter()
                .filter(|item| item.to_lowercase().contains(&query))
                .cloned()
                .collect()
        }
    })
}

/// Filter props
pub struct FilterProps<T, Q> {
    /// The items to filter
    pub items: Vec<T>,
    /// Required filter function
    pub filter_func: Option<FilterFunc<T, Q>>,
    /// Starting query when uncontrolled. Only read at construction.
    pub default_query: Option<Q>,
    /// Control prop
    pub query: Option<Q>,
    /// Called with the new query whenever a refinement changes it
    pub on_query_change: Option<Callback<Q>>,
}

impl<T, Q> Default for FilterProps<T, Q> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filter_func: None,
            default_query: None,
            query: None,
            on_query_change: None,
        }
    }
}

impl<T: Clone, Q: Clone> Clone for FilterProps<T, Q> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            filter_func: self.filter_func.clone(),
            default_query: self.default_query.clone(),
            query: self.query.clone(),
            on_query_change: self.on_query_change.clone(),
        }
    }
}

impl FilterProps<String, String> {
    /// Text filter props: substring matching from an empty query
    pub fn substring(case_sensitive: bool) -> Self {
        Self::new()
            .filter_func(substring_filter(case_sensitive))
            .default_query(String::new())
    }

    /// Props seeded from config defaults, with a substring filter
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            default_query: config.default_query.clone(),
            ..Self::substring(config.case_sensitive)
        }
    }
}

impl<T, Q> FilterProps<T, Q> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }

    pub fn filter_func(mut self, f: FilterFunc<T, Q>) -> Self {
        self.filter_func = Some(f);
        self
    }

    pub fn default_query(mut self, query: Q) -> Self {
        self.default_query = Some(query);
        self
    }

    /// Control the query from outside
    pub fn controlled(mut self, query: Q) -> Self {
        self.query = Some(query);
        self
    }

    pub fn on_query_change<F>(mut self, f: F) -> Self
    where
        F: Fn(Q) + Send + Sync + 'static,
    {
        self.on_query_change = Some(Arc::new(f));
        self
    }
}

/// Props the owner can change after construction
struct Shared<T, Q> {
    items: Arc<[T]>,
    filter_func: FilterFunc<T, Q>,
    query: Option<Q>,
    on_query_change: Option<Callback<Q>>,
}

/// Filter behavior
///
/// Cloning shares the underlying state.
pub struct Filter<T, Q> {
    state: HybridState<Q>,
    shared: Arc<Mutex<Shared<T, Q>>>,
}

impl<T, Q> Clone for Filter<T, Q> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, Q> Filter<T, Q>
where
    T: Clone + Send + Sync + 'static,
    Q: Clone + PartialEq + Send + Sync + 'static,
{
    /// Build a filter
    ///
    /// Fails with [`BehaviorError::MissingFilterFunc`] when no filter function
    /// is given.
    pub fn new(props: FilterProps<T, Q>) -> Result<Self> {
        let FilterProps {
            items,
            filter_func,
            default_query,
            query,
            on_query_change,
        } = props;
        let filter_func = filter_func.ok_or(BehaviorError::MissingFilterFunc)?;

        let shared = Arc::new(Mutex::new(Shared {
            items: items.into(),
            filter_func,
            query,
            on_query_change,
        }));

        let hook_shared = Arc::clone(&shared);
        let mut builder = HybridState::builder().on_change(
            move |changes: &ChangeSet<Q>, _: &EffectiveState<Q>| {
                let Some(query) = changes.get(QUERY) else {
                    return;
                };
                let callback = lock(&hook_shared).on_query_change.clone();
                if let Some(callback) = callback {
                    callback(query.clone());
                }
            },
        );
        if let Some(query) = default_query {
            builder = builder.initial(QUERY, query);
        }

        Ok(Self {
            state: builder.build(),
            shared,
        })
    }

    /// Current effective query
    pub fn query(&self) -> Option<Q> {
        self.state.get(QUERY, &self.overrides())
    }

    /// Items matching the current query
    pub fn filtered_items(&self) -> Vec<T> {
        let (items, filter_func) = {
            let shared = lock(&self.shared);
            (Arc::clone(&shared.items), Arc::clone(&shared.filter_func))
        };
        let query = self.query();
        filter_func(&items[..], query.as_ref())
    }

    /// Propose a new query
    pub fn refine(&self, query: Q) {
        let changes = self.state.update(Patch::single(QUERY, query), &self.overrides());
        tracing::trace!(changed = !changes.is_empty(), "refine");
    }

    /// Replace the items
    pub fn set_items(&self, items: Vec<T>) {
        lock(&self.shared).items = items.into();
    }

    /// Take or release control of the query
    pub fn set_controlled(&self, query: Option<Q>) {
        lock(&self.shared).query = query;
    }

    /// Replace the query callback
    pub fn set_on_query_change(&self, callback: Option<Callback<Q>>) {
        lock(&self.shared).on_query_change = callback;
    }
}

impl<T, Q: Clone> OverridesProvider<Q> for Filter<T, Q> {
    fn overrides(&self) -> Overrides<Q> {
        Overrides::new().with(QUERY, lock(&self.shared).query.clone())
    }
}

impl<T, Q> Behavior for Filter<T, Q>
where
    T: Clone + Send + Sync + 'static,
    Q: Clone + PartialEq + Send + Sync + 'static,
{
    type View = FilterView<T, Q>;

    fn render(&self) -> FilterView<T, Q> {
        FilterView {
            filtered_items: self.filtered_items(),
            query: self.query(),
            handle: self.clone(),
        }
    }
}

/// Rendered filter: matching items, the query and the refine operation
pub struct FilterView<T, Q> {
    pub filtered_items: Vec<T>,
    pub query: Option<Q>,
    handle: Filter<T, Q>,
}

impl<T, Q> FilterView<T, Q>
where
    T: Clone + Send + Sync + 'static,
    Q: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn refine(&self, query: Q) {
        self.handle.refine(query);
    }
}
