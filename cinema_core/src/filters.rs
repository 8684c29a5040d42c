// Filter set: active / in-view / hidden subsets of a fixed universe of names.
// Names outside the universe are ignored by every operation.

use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::loader::{DataSource, JsonFetch, Resource};

/// One filter as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub is_active: bool,
    pub is_hidden: bool,
}

/// Emitted after the active set changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterChangeEvent {
    pub active_filters: Vec<String>,
    /// Empty when the change was not caused by a single filter (clear, init).
    pub changed_filter_name: String,
}

/// A single filter name or a batch of them.
pub trait FilterNames {
    fn names(&self) -> Vec<&str>;
}

impl FilterNames for str {
    fn names(&self) -> Vec<&str> {
        vec![self]
    }
}

impl FilterNames for String {
    fn names(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl<S: AsRef<str>> FilterNames for [S] {
    fn names(&self) -> Vec<&str> {
        self.iter().map(AsRef::as_ref).collect()
    }
}

impl<S: AsRef<str>> FilterNames for Vec<S> {
    fn names(&self) -> Vec<&str> {
        self.as_slice().names()
    }
}

impl<S: AsRef<str>, const N: usize> FilterNames for [S; N] {
    fn names(&self) -> Vec<&str> {
        self.as_slice().names()
    }
}

impl<T: FilterNames + ?Sized> FilterNames for &T {
    fn names(&self) -> Vec<&str> {
        (**self).names()
    }
}

/// Categorical filters with toggle semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    universe: HashSet<String>,
    active: HashSet<String>,
    in_view: HashSet<String>,
    hidden: HashSet<String>,
}

impl FilterSet {
    pub fn new<S: Into<String>>(universe: impl IntoIterator<Item = S>) -> Self {
        FilterSet {
            universe: universe.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Universe with the configured in-view filters placed and the default
    /// active filters toggled on.
    pub fn with_defaults<S: Into<String>>(
        universe: impl IntoIterator<Item = S>,
        config: &CoreConfig,
    ) -> Self {
        let mut filters = FilterSet::new(universe);
        filters.set_in_view(&config.default_in_view_filters);
        filters.toggle_active(&config.default_active_filters);
        filters
    }

    pub fn contains(&self, name: &str) -> bool {
        self.universe.contains(name)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    /// Flip membership in the active set for each known name.
    pub fn toggle_active(&mut self, names: impl FilterNames) {
        for name in names.names() {
            if !self.universe.contains(name) {
                continue;
            }
            if !self.active.remove(name) {
                self.active.insert(name.to_string());
            }
        }
    }

    pub fn clear_active(&mut self) {
        self.active.clear();
    }

    pub fn set_hidden(&mut self, names: impl FilterNames) {
        for name in self.known(&names) {
            self.hidden.insert(name);
        }
    }

    pub fn set_visible(&mut self, names: impl FilterNames) {
        for name in names.names() {
            self.hidden.remove(name);
        }
    }

    pub fn set_in_view(&mut self, names: impl FilterNames) {
        for name in self.known(&names) {
            self.in_view.insert(name);
        }
    }

    pub fn remove_in_view(&mut self, names: impl FilterNames) {
        for name in names.names() {
            self.in_view.remove(name);
        }
    }

    /// Hide every in-view filter once fewer than `min_visible` still fit inline,
    /// leaving them reachable only through the overflow menu.
    pub fn collapse_crowded_in_view(&mut self, min_visible: usize) {
        let visible = self
            .in_view
            .iter()
            .filter(|name| !self.hidden.contains(*name))
            .count();
        if visible < min_visible {
            let in_view: Vec<String> = self.in_view.iter().cloned().collect();
            self.set_hidden(in_view);
        }
    }

    /// Every filter in the universe, sorted case-insensitively.
    pub fn filters(&self) -> Vec<Filter> {
        self.describe(&self.universe)
    }

    /// Filters rendered inline, sorted case-insensitively.
    pub fn in_view_filters(&self) -> Vec<Filter> {
        self.describe(&self.in_view)
    }

    pub fn active_filters(&self) -> Vec<String> {
        sorted(&self.active)
    }

    pub fn hidden_filters(&self) -> Vec<String> {
        sorted(&self.hidden)
    }

    /// Toggle one filter and report the resulting active set.
    pub fn toggle_and_report(&mut self, name: &str) -> FilterChangeEvent {
        self.toggle_active(name);
        self.change_event(name)
    }

    /// Clear the active set and report it.
    pub fn clear_and_report(&mut self) -> FilterChangeEvent {
        self.clear_active();
        self.change_event("")
    }

    pub fn change_event(&self, changed_filter_name: &str) -> FilterChangeEvent {
        FilterChangeEvent {
            active_filters: self.active_filters(),
            changed_filter_name: changed_filter_name.to_string(),
        }
    }

    fn known(&self, names: &impl FilterNames) -> Vec<String> {
        names
            .names()
            .into_iter()
            .filter(|name| self.universe.contains(*name))
            .map(String::from)
            .collect()
    }

    fn describe(&self, names: &HashSet<String>) -> Vec<Filter> {
        sorted(names)
            .into_iter()
            .map(|name| Filter {
                is_active: self.active.contains(&name),
                is_hidden: self.hidden.contains(&name),
                name,
            })
            .collect()
    }
}

/// Case-insensitive order, ties broken by the raw name so output is stable.
fn sorted(names: &HashSet<String>) -> Vec<String> {
    let ordered: BTreeSet<(String, &String)> =
        names.iter().map(|name| (name.to_lowercase(), name)).collect();
    ordered.into_iter().map(|(_, name)| name.clone()).collect()
}

fn filters_unavailable(cause: String) -> CoreError {
    CoreError::FiltersUnavailable { cause }
}

/// Loads the filter universe once and builds filter sets from it.
#[derive(Debug)]
pub struct FilterService {
    resource: Resource<Vec<String>>,
}

impl FilterService {
    pub fn new(source: impl DataSource<Vec<String>> + 'static) -> Self {
        FilterService {
            resource: Resource::new("filters", source, filters_unavailable),
        }
    }

    pub async fn universe(&self) -> Result<Rc<Vec<String>>> {
        self.resource.get().await
    }

    /// A fresh set over the loaded universe with the configured defaults applied.
    pub async fn filter_set(&self, config: &CoreConfig) -> Result<FilterSet> {
        let universe = self.universe().await?;
        Ok(FilterSet::with_defaults(universe.iter().cloned(), config))
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

fn parse_names(json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json).map_err(|e| CoreError::InvalidArgument(format!("filter names: {}", e)))
}

/// WASM-exposed filter set. Batches are passed as JSON arrays of names.
#[wasm_bindgen]
pub struct WasmFilterSet {
    inner: FilterSet,
}

#[wasm_bindgen]
impl WasmFilterSet {
    /// `universe_json` is the filters data file (a JSON array of names).
    #[wasm_bindgen(constructor)]
    pub fn new(universe_json: &str, config_json: &str) -> Result<WasmFilterSet, JsValue> {
        let universe = serde_json::from_str::<Vec<String>>(universe_json).map_err(|e| {
            crate::to_js(CoreError::FiltersUnavailable {
                cause: e.to_string(),
            })
        })?;
        let config = CoreConfig::from_json(config_json).map_err(crate::to_js)?;
        Ok(WasmFilterSet {
            inner: FilterSet::with_defaults(universe, &config),
        })
    }

    /// Toggle one filter. Returns the `FilterChangeEvent` as JSON.
    pub fn toggle_active(&mut self, name: &str) -> Result<String, JsValue> {
        let event = self.inner.toggle_and_report(name);
        crate::json_string(&event)
    }

    /// Clear all active filters. Returns the `FilterChangeEvent` as JSON.
    pub fn clear_active(&mut self) -> Result<String, JsValue> {
        let event = self.inner.clear_and_report();
        crate::json_string(&event)
    }

    pub fn set_hidden(&mut self, names_json: &str) -> Result<(), JsValue> {
        let names = parse_names(names_json).map_err(crate::to_js)?;
        self.inner.set_hidden(names);
        Ok(())
    }

    pub fn set_visible(&mut self, names_json: &str) -> Result<(), JsValue> {
        let names = parse_names(names_json).map_err(crate::to_js)?;
        self.inner.set_visible(names);
        Ok(())
    }

    pub fn set_in_view(&mut self, names_json: &str) -> Result<(), JsValue> {
        let names = parse_names(names_json).map_err(crate::to_js)?;
        self.inner.set_in_view(names);
        Ok(())
    }

    pub fn collapse_crowded_in_view(&mut self, min_visible: usize) {
        self.inner.collapse_crowded_in_view(min_visible);
    }

    pub fn filters(&self) -> Result<String, JsValue> {
        crate::json_string(&self.inner.filters())
    }

    pub fn in_view_filters(&self) -> Result<String, JsValue> {
        crate::json_string(&self.inner.in_view_filters())
    }

    pub fn active_filters(&self) -> Result<String, JsValue> {
        crate::json_string(&self.inner.active_filters())
    }
}

/// Fetch `config.filters_url` and build a `WasmFilterSet` with the default
/// active and in-view filters.
#[wasm_bindgen]
pub async fn load_filter_set(
    fetch: js_sys::Function,
    config_json: String,
) -> Result<WasmFilterSet, JsValue> {
    let config = CoreConfig::from_json(&config_json).map_err(crate::to_js)?;
    let service = FilterService::new(JsonFetch::new(fetch, config.filters_url.clone()));
    let inner = service.filter_set(&config).await.map_err(crate::to_js)?;
    Ok(WasmFilterSet { inner })
}
