use std::collections::BTreeMap;

use common::facet_config::CompiledFacetConfig;
use serde::{Deserialize, Serialize};

use super::storage::PreferenceStorage;


/// Visibility per attribute path. A missing key means hidden.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityState(pub BTreeMap<String, bool>);

impl VisibilityState {
    pub fn is_visible(&self, field: &str) -> bool {
        self.0.get(field).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
struct VisibilityEntry {
    field: String,
    group_id: Option<String>,
    default_visible: bool,
}

/// Default visibility from configuration, overlaid with the user's saved choices.
///
/// Changes stay in memory until [`save`](Self::save) writes the whole map back; [`load`](Self::load)
/// discards anything unsaved. Saves are last-writer-wins.
#[derive(Debug)]
pub struct FacetVisibilityStore<S> {
    storage: S,
    namespace: String,
    entries: Vec<VisibilityEntry>,
    state: VisibilityState,
}

impl<S: PreferenceStorage> FacetVisibilityStore<S> {
    /// Builds the store and loads saved preferences under `namespace`.
    pub fn open(storage: S, namespace: impl Into<String>, config: &CompiledFacetConfig) -> Self {
        let entries = config
            .widgets()
            .into_iter()
            .map(|spec| VisibilityEntry {
                field: spec.attribute.clone(),
                group_id: spec.group_id.clone(),
                default_visible: spec.hints.default_visible,
            })
            .collect();
        let mut store = Self { storage, namespace: namespace.into(), entries, state: VisibilityState::default() };
        store.load();
        store
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Depends on configuration only.
    pub fn get_default_visibility(&self) -> VisibilityState {
        VisibilityState(self.entries.iter().map(|entry| (entry.field.clone(), entry.default_visible)).collect())
    }

    /// Resets to defaults and applies the saved overrides. Unreadable preferences count as none.
    pub fn load(&mut self) {
        let mut state = self.get_default_visibility();
        match self.read_overrides() {
            Ok(Some(overrides)) => {
                for (field, visible) in overrides.0 {
                    match state.0.get_mut(&field) {
                        Some(slot) => *slot = visible,
                        None => tracing::debug!("Ignoring saved visibility of unknown attribute {}", field),
                    }
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring saved facet visibility under {}: {:#}", self.namespace, e),
        }
        self.state = state;
    }

    fn read_overrides(&self) -> anyhow::Result<Option<VisibilityState>> {
        let Some(raw) = self.storage.read(&self.namespace)? else { return Ok(None) };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        let raw = serde_json::to_string(&self.state)?;
        self.storage.write(&self.namespace, &raw)?;
        tracing::info!("Saved visibility of {} facets under {}", self.state.0.len(), self.namespace);
        Ok(())
    }

    pub fn state(&self) -> &VisibilityState {
        &self.state
    }

    pub fn is_visible(&self, field: &str) -> bool {
        self.state.is_visible(field)
    }

    /// A group is visible when any of its attributes is.
    pub fn is_group_visible(&self, group_id: &str) -> bool {
        self.entries
            .iter()
            .filter(|entry| entry.group_id.as_deref() == Some(group_id))
            .any(|entry| self.state.is_visible(&entry.field))
    }

    /// Returns false for attributes the configuration does not know.
    pub fn set_visible(&mut self, field: &str, visible: bool) -> bool {
        match self.state.0.get_mut(field) {
            Some(slot) => {
                *slot = visible;
                true
            }
            None => {
                tracing::debug!("Cannot change visibility of unknown attribute {}", field);
                false
            }
        }
    }

    pub fn show(&mut self, field: &str) -> bool {
        self.set_visible(field, true)
    }

    pub fn hide(&mut self, field: &str) -> bool {
        self.set_visible(field, false)
    }

    pub fn toggle(&mut self, field: &str) -> bool {
        let visible = !self.is_visible(field);
        self.set_visible(field, visible)
    }

    pub fn show_all(&mut self) {
        self.state.0.values_mut().for_each(|visible| *visible = true);
    }

    pub fn hide_all(&mut self) {
        self.state.0.values_mut().for_each(|visible| *visible = false);
    }

    /// Visible attributes in configuration order.
    pub fn visible_attributes(&self) -> Vec<&str> {
        self.entries.iter().filter(|entry| self.state.is_visible(&entry.field)).map(|entry| entry.field.as_str()).collect()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
