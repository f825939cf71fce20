//! Batch state bound to a persistent store.
//!
//! Every mutation is written through to the store. Each persisted key is
//! recovered independently on open, and store failures only degrade the
//! session to in-memory operation.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::{
    AppError, BaseConfig, BaseField, BatchState, OsId, SelectionChange, TemplateConfig, VmId,
};
use crate::ports::{OsCatalog, StateKey, StateStore};

/// A batch editing session.
pub struct BatchSession<S: StateStore, C: OsCatalog> {
    store: S,
    catalog: C,
    state: BatchState,
    /// Base configuration used when nothing is persisted and after a full reset.
    defaults: BaseConfig,
    persistence_degraded: bool,
}

impl<S: StateStore, C: OsCatalog> BatchSession<S, C> {
    /// Load the batch from `store`, falling back to `defaults` per key.
    pub fn open(store: S, catalog: C, defaults: BaseConfig) -> Self {
        let mut degraded = false;

        let base = load_key::<_, BaseConfig>(&store, StateKey::BaseConfig, &mut degraded)
            .and_then(|base| match base.validate() {
                Ok(()) => Some(base),
                Err(err) => {
                    warn!(
                        key = %StateKey::BaseConfig,
                        error = %err,
                        "discarding invalid persisted entry"
                    );
                    None
                }
            })
            .unwrap_or_else(|| defaults.clone());

        let selection =
            load_key::<_, BTreeMap<OsId, bool>>(&store, StateKey::Selection, &mut degraded)
                .map(|selection| canonicalize_selection(selection, &catalog))
                .unwrap_or_default();

        let templates =
            load_key::<_, Vec<TemplateConfig>>(&store, StateKey::Templates, &mut degraded)
                .map(|templates| canonicalize_templates(templates, &catalog))
                .map(discard_invalid_templates)
                .unwrap_or_default();

        let state = BatchState::restore(base, selection, templates);
        debug!(
            templates = state.templates().len(),
            selected = state.selection().count(),
            "opened batch session"
        );

        Self { store, catalog, state, defaults, persistence_degraded: degraded }
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn defaults(&self) -> &BaseConfig {
        &self.defaults
    }

    /// Whether a store read or write failed during this session.
    pub fn is_persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    pub fn toggle_os(&mut self, os_id: &str) -> Result<SelectionChange, AppError> {
        let change = self.state.toggle_os(os_id, &self.catalog)?;
        debug!(?change, "toggled OS");
        self.persist();
        Ok(change)
    }

    pub fn toggle_group(&mut self, label: &str) -> Result<SelectionChange, AppError> {
        let change = self.state.toggle_group(label, &self.catalog)?;
        debug!(group = label, ?change, "toggled group");
        self.persist();
        Ok(change)
    }

    pub fn select_all(&mut self) -> Result<Vec<OsId>, AppError> {
        let added = self.state.select_all(&self.catalog)?;
        debug!(added = added.len(), "selected all catalog entries");
        self.persist();
        Ok(added)
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
        debug!("cleared selection");
        self.persist();
    }

    /// Apply a form edit. A rejected edit leaves state and store untouched.
    pub fn update_base(&mut self, field: BaseField, raw: &str) -> Result<(), AppError> {
        self.state.update_base(field, raw)?;
        debug!(%field, value = raw, "updated base configuration");
        self.persist();
        Ok(())
    }

    /// Empty the template list, keep the selection and restore the persisted
    /// starting VM id.
    pub fn clear_templates(&mut self) {
        let persisted = self.persisted_vm_id();
        self.state.clear_templates(persisted);
        debug!(starting_vm_id = %self.state.starting_vm_id(), "cleared template list");
        self.persist();
    }

    /// Wipe every persisted entry and reset to the configured defaults.
    pub fn clear_everything(&mut self) {
        for key in StateKey::ALL {
            if let Err(err) = self.store.remove(key) {
                self.degrade(key, &err);
            }
        }
        self.state.reset(self.defaults.clone());
        debug!("reset batch to defaults");
    }

    pub fn merged_command(&self) -> String {
        self.state.merged_command(&self.catalog)
    }

    fn persisted_vm_id(&mut self) -> Option<VmId> {
        let mut degraded = false;
        let base = load_key::<_, BaseConfig>(&self.store, StateKey::BaseConfig, &mut degraded);
        self.persistence_degraded |= degraded;
        base.map(|base| base.vm_id)
    }

    /// Write every key through to the store.
    fn persist(&mut self) {
        let selection = self.state.selection_map();
        self.save_key(StateKey::BaseConfig, self.state.base().clone());
        self.save_key(StateKey::Selection, selection);
        self.save_key(StateKey::Templates, self.state.templates().to_vec());
    }

    fn save_key<T: Serialize>(&mut self, key: StateKey, value: T) {
        let result = serde_json::to_string_pretty(&value)
            .map_err(|e| AppError::Serialization { what: key.to_string(), details: e.to_string() })
            .and_then(|json| self.store.save(key, &json));
        if let Err(err) = result {
            self.degrade(key, &err);
        }
    }

    fn degrade(&mut self, key: StateKey, err: &AppError) {
        if !self.persistence_degraded {
            warn!(%key, error = %err, "state store unavailable, continuing in memory");
        }
        self.persistence_degraded = true;
    }
}

/// Read and decode one key. Missing, unreadable and corrupt entries all
/// yield `None`; only read failures mark the store as degraded.
fn load_key<S: StateStore, T: DeserializeOwned>(
    store: &S,
    key: StateKey,
    degraded: &mut bool,
) -> Option<T> {
    let raw = match store.load(key) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!(%key, error = %err, "cannot read persisted entry, using default");
            *degraded = true;
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%key, error = %err, "discarding corrupt persisted entry");
            None
        }
    }
}

fn canonical_id<C: OsCatalog>(os_id: OsId, catalog: &C) -> OsId {
    catalog.lookup(os_id.as_str()).found().map(|entry| entry.id.clone()).unwrap_or(os_id)
}

fn canonicalize_selection<C: OsCatalog>(
    selection: BTreeMap<OsId, bool>,
    catalog: &C,
) -> BTreeMap<OsId, bool> {
    let mut canonical = BTreeMap::new();
    for (os_id, selected) in selection {
        let entry = canonical.entry(canonical_id(os_id, catalog)).or_insert(false);
        *entry |= selected;
    }
    canonical
}

fn canonicalize_templates<C: OsCatalog>(
    templates: Vec<TemplateConfig>,
    catalog: &C,
) -> Vec<TemplateConfig> {
    templates
        .into_iter()
        .map(|template| TemplateConfig {
            os_id: canonical_id(template.os_id.clone(), catalog),
            ..template
        })
        .collect()
}

/// Drop restored templates that break the rules the form enforces. Their OS
/// stays selected and shows up as pending.
fn discard_invalid_templates(templates: Vec<TemplateConfig>) -> Vec<TemplateConfig> {
    templates
        .into_iter()
        .filter(|template| match template.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    key = %StateKey::Templates,
                    os_id = %template.os_id,
                    error = %err,
                    "discarding invalid persisted template"
                );
                false
            }
        })
        .collect()
}
