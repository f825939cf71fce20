//! Batch operations and the batch report.

use serde::Serialize;

use crate::domain::generator::generate;
use crate::domain::{AppError, BaseConfig, BaseField, OsId, SelectionChange, VmId};
use crate::ports::{OsCatalog, StateStore};
use crate::services::BatchSession;

/// One mutation of the persisted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAction {
    Toggle(String),
    Group(String),
    SelectAll,
    ClearSelection,
    Set { field: BaseField, value: String },
    /// Empty the template list but keep the selection.
    ClearTemplates,
    /// Wipe persisted state and return to defaults.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Selection(SelectionChange),
    Updated { field: BaseField },
    ClearedSelection,
    ClearedTemplates,
    Reset,
}

/// Apply `action` to the session. Rejected input leaves the batch unchanged.
pub fn apply<S: StateStore, C: OsCatalog>(
    session: &mut BatchSession<S, C>,
    action: BatchAction,
) -> Result<BatchOutcome, AppError> {
    let outcome = match action {
        BatchAction::Toggle(os_id) => BatchOutcome::Selection(session.toggle_os(&os_id)?),
        BatchAction::Group(label) => BatchOutcome::Selection(session.toggle_group(&label)?),
        BatchAction::SelectAll => {
            BatchOutcome::Selection(SelectionChange::Selected(session.select_all()?))
        }
        BatchAction::ClearSelection => {
            session.clear_selection();
            BatchOutcome::ClearedSelection
        }
        BatchAction::Set { field, value } => {
            session.update_base(field, &value)?;
            BatchOutcome::Updated { field }
        }
        BatchAction::ClearTemplates => {
            session.clear_templates();
            BatchOutcome::ClearedTemplates
        }
        BatchAction::Reset => {
            session.clear_everything();
            BatchOutcome::Reset
        }
    };
    Ok(outcome)
}

/// A template as listed in the batch report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRow {
    pub vm_id: VmId,
    pub os_id: OsId,
    /// Catalog label, absent for OSes the catalog does not know.
    pub label: Option<String>,
    pub template_name: String,
    pub storage_target: String,
    pub network_bridge: String,
    pub enable_guest_agent: bool,
    pub enable_root_ssh: bool,
    pub step_count: usize,
}

/// Snapshot of the batch for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub base: BaseConfig,
    pub next_free_vm_id: VmId,
    pub templates: Vec<TemplateRow>,
    /// Selected OSes that currently have no template.
    pub pending: Vec<OsId>,
    pub duplicate_vm_ids: Vec<VmId>,
    pub merged_command: String,
    pub persistence_degraded: bool,
}

pub fn report<S: StateStore, C: OsCatalog>(session: &BatchSession<S, C>) -> BatchReport {
    let state = session.state();
    let catalog = session.catalog();

    let templates = state
        .templates()
        .iter()
        .map(|template| TemplateRow {
            vm_id: template.vm_id,
            os_id: template.os_id.clone(),
            label: catalog.lookup(template.os_id.as_str()).found().map(|entry| entry.label.clone()),
            template_name: template.os_id.template_name(),
            storage_target: template.storage_target.clone(),
            network_bridge: template.network_bridge.clone(),
            enable_guest_agent: template.enable_guest_agent,
            enable_root_ssh: template.enable_root_ssh,
            step_count: generate(template, catalog).len(),
        })
        .collect();

    let pending = state
        .selection()
        .filter(|id| !state.templates().iter().any(|t| &t.os_id == *id))
        .cloned()
        .collect();

    BatchReport {
        base: state.base().clone(),
        next_free_vm_id: state.next_free_vm_id(),
        templates,
        pending,
        duplicate_vm_ids: state.duplicate_vm_ids(),
        merged_command: session.merged_command(),
        persistence_degraded: session.is_persistence_degraded(),
    }
}
