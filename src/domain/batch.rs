//! Batch orchestration: a set of template jobs, one per selected OS.
//!
//! `BatchState` is a plain value mutated by reducer-style operations. Each
//! operation runs to completion and leaves the state consistent; persistence
//! is the caller's concern (see `services::BatchSession`).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::domain::command_step::AND_SEPARATOR;
use crate::domain::generator;
use crate::domain::template_config::{MAX_VM_ID, parse_flag};
use crate::domain::{AppError, BaseConfig, BaseField, OsId, TemplateConfig, VmId};
use crate::ports::OsCatalog;

/// What a toggle operation did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(Vec<OsId>),
    Deselected(Vec<OsId>),
}

impl SelectionChange {
    pub fn os_ids(&self) -> &[OsId] {
        match self {
            SelectionChange::Selected(ids) | SelectionChange::Deselected(ids) => ids,
        }
    }
}

/// In-memory model of the batch form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchState {
    base: BaseConfig,
    selection: BTreeSet<OsId>,
    templates: Vec<TemplateConfig>,
}

impl Default for BatchState {
    fn default() -> Self {
        Self::new(BaseConfig::default())
    }
}

impl BatchState {
    /// Empty batch using `base` as form defaults.
    pub fn new(base: BaseConfig) -> Self {
        Self { base, selection: BTreeSet::new(), templates: Vec::new() }
    }

    /// Rebuild a batch from independently persisted parts.
    ///
    /// Only OSes mapped to `true` count as selected. Templates for unselected
    /// OSes and repeated templates for the same OS are dropped.
    pub fn restore(
        base: BaseConfig,
        selection: BTreeMap<OsId, bool>,
        templates: Vec<TemplateConfig>,
    ) -> Self {
        let selection = selection.into_iter().filter(|(_, on)| *on).map(|(id, _)| id).collect();
        let mut state = Self { base, selection, templates };
        state.heal();
        state
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }

    pub fn templates(&self) -> &[TemplateConfig] {
        &self.templates
    }

    pub fn selection(&self) -> impl Iterator<Item = &OsId> {
        self.selection.iter()
    }

    pub fn is_selected(&self, os_id: &OsId) -> bool {
        self.selection.contains(os_id)
    }

    /// Selection in its persisted `osId -> bool` form.
    pub fn selection_map(&self) -> BTreeMap<OsId, bool> {
        self.selection.iter().map(|id| (id.clone(), true)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// VM id the batch starts numbering from.
    pub fn starting_vm_id(&self) -> VmId {
        self.base.vm_id
    }

    /// VM id the next added template receives.
    ///
    /// Position based (`starting + len`), never `max(existing) + 1`: the
    /// starting id always takes priority. After a removal this may collide
    /// with an existing template; see `duplicate_vm_ids`.
    pub fn next_free_vm_id(&self) -> VmId {
        self.starting_vm_id().offset(self.templates.len())
    }

    /// VM ids used by more than one template, in ascending order.
    pub fn duplicate_vm_ids(&self) -> Vec<VmId> {
        let mut seen = HashSet::new();
        let duplicates: BTreeSet<VmId> =
            self.templates.iter().map(|t| t.vm_id).filter(|id| !seen.insert(*id)).collect();
        duplicates.into_iter().collect()
    }

    /// Select or deselect a single OS.
    pub fn toggle_os<C: OsCatalog + ?Sized>(
        &mut self,
        os_id: &str,
        catalog: &C,
    ) -> Result<SelectionChange, AppError> {
        let id = catalog.lookup(os_id).require(os_id)?.id.clone();
        if self.selection.contains(&id) {
            self.deselect(std::slice::from_ref(&id));
            Ok(SelectionChange::Deselected(vec![id]))
        } else {
            self.select(std::slice::from_ref(&id))?;
            Ok(SelectionChange::Selected(vec![id]))
        }
    }

    /// Toggle a catalog group: deselect it when fully selected, otherwise
    /// select every member not yet selected.
    pub fn toggle_group<C: OsCatalog + ?Sized>(
        &mut self,
        label: &str,
        catalog: &C,
    ) -> Result<SelectionChange, AppError> {
        let group = catalog.group(label).ok_or_else(|| AppError::UnknownGroup {
            name: label.to_string(),
            available: catalog
                .groups()
                .iter()
                .map(|g| g.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })?;
        self.toggle_ids(&group.os_ids)
    }

    /// Bulk toggle over arbitrary identifiers with group semantics.
    pub fn toggle_ids(&mut self, os_ids: &[OsId]) -> Result<SelectionChange, AppError> {
        if !os_ids.is_empty() && os_ids.iter().all(|id| self.selection.contains(id)) {
            self.deselect(os_ids);
            Ok(SelectionChange::Deselected(os_ids.to_vec()))
        } else {
            let added: Vec<OsId> =
                os_ids.iter().filter(|id| !self.selection.contains(*id)).cloned().collect();
            self.select(&added)?;
            Ok(SelectionChange::Selected(added))
        }
    }

    /// Select every catalog entry. Returns the newly selected identifiers.
    pub fn select_all<C: OsCatalog + ?Sized>(
        &mut self,
        catalog: &C,
    ) -> Result<Vec<OsId>, AppError> {
        let added: Vec<OsId> =
            catalog.all_ids().into_iter().filter(|id| !self.selection.contains(id)).collect();
        self.select(&added)?;
        Ok(added)
    }

    /// Deselect everything and drop every template.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.templates.clear();
    }

    /// Apply a raw form edit to the base configuration.
    ///
    /// Input is validated before anything changes: a rejected edit keeps the
    /// previous value.
    pub fn update_base(&mut self, field: BaseField, raw: &str) -> Result<(), AppError> {
        match field {
            BaseField::VmId => {
                let vm_id = VmId::parse(field.name(), raw)?;
                self.set_starting_vm_id(vm_id)?;
            }
            BaseField::Storage => {
                self.base.storage_target = non_empty(field, raw)?;
            }
            BaseField::Bridge => {
                self.base.network_bridge = non_empty(field, raw)?;
            }
            BaseField::GuestAgent => {
                let enabled = parse_flag(field.name(), raw)?;
                self.set_guest_agent(enabled);
            }
            BaseField::RootSsh => {
                let enabled = parse_flag(field.name(), raw)?;
                self.set_root_ssh(enabled)?;
            }
        }
        Ok(())
    }

    /// Change the starting VM id and renumber every template by position.
    ///
    /// The only base edit that propagates to existing templates. Rejected
    /// when the last template would land past `MAX_VM_ID`.
    pub fn set_starting_vm_id(&mut self, vm_id: VmId) -> Result<(), AppError> {
        if let Some(last) = self.templates.len().checked_sub(1) {
            let last_id = vm_id.offset(last);
            if !last_id.in_range() {
                return Err(AppError::invalid_numeric(
                    BaseField::VmId.name(),
                    &vm_id.to_string(),
                    format!(
                        "{} templates starting here would end at {}, past {}",
                        self.templates.len(),
                        last_id,
                        MAX_VM_ID
                    ),
                ));
            }
        }
        self.base.vm_id = vm_id;
        for (index, template) in self.templates.iter_mut().enumerate() {
            template.vm_id = vm_id.offset(index);
        }
        Ok(())
    }

    /// Toggle the guest agent default; disabling it clears root SSH too.
    pub fn set_guest_agent(&mut self, enabled: bool) {
        self.base.enable_guest_agent = enabled;
        if !enabled {
            self.base.enable_root_ssh = false;
        }
    }

    /// Toggle the root SSH default; requires the guest agent.
    pub fn set_root_ssh(&mut self, enabled: bool) -> Result<(), AppError> {
        if enabled && !self.base.enable_guest_agent {
            return Err(AppError::RootSshRequiresGuestAgent);
        }
        self.base.enable_root_ssh = enabled;
        Ok(())
    }

    /// Merged shell line for the whole batch, templates in insertion order.
    pub fn merged_command<C: OsCatalog + ?Sized>(&self, catalog: &C) -> String {
        self.templates
            .iter()
            .map(|template| generator::generate_line(template, catalog))
            .collect::<Vec<_>>()
            .join(AND_SEPARATOR)
    }

    /// Empty the template list only, keeping the selection.
    ///
    /// The starting VM id reverts to `persisted_vm_id` when one is stored.
    pub fn clear_templates(&mut self, persisted_vm_id: Option<VmId>) {
        self.templates.clear();
        if let Some(vm_id) = persisted_vm_id {
            self.base.vm_id = vm_id;
        }
    }

    /// Reset to an empty batch with `base` as defaults.
    pub fn reset(&mut self, base: BaseConfig) {
        *self = Self::new(base);
    }

    /// All-or-nothing: fails before any change when the new templates would
    /// be numbered past `MAX_VM_ID`.
    fn select(&mut self, os_ids: &[OsId]) -> Result<(), AppError> {
        let new_templates =
            os_ids.iter().filter(|id| !self.templates.iter().any(|t| &t.os_id == *id)).count();
        if let Some(last) = new_templates.checked_sub(1) {
            let next = self.next_free_vm_id();
            if !next.offset(last).in_range() {
                return Err(AppError::VmIdsExhausted {
                    next: next.get(),
                    count: new_templates,
                    max: MAX_VM_ID,
                });
            }
        }
        for id in os_ids {
            match self.templates.iter().position(|t| &t.os_id == id) {
                Some(index) => self.templates[index].resync(&self.base),
                None => {
                    let vm_id = self.next_free_vm_id();
                    self.templates.push(TemplateConfig::from_base(&self.base, id.clone(), vm_id));
                }
            }
            self.selection.insert(id.clone());
        }
        self.heal();
        Ok(())
    }

    fn deselect(&mut self, os_ids: &[OsId]) {
        for id in os_ids {
            self.selection.remove(id);
        }
        self.heal();
    }

    fn heal(&mut self) {
        let selection = &self.selection;
        let mut seen = HashSet::new();
        self.templates.retain(|t| selection.contains(&t.os_id) && seen.insert(t.os_id.clone()));
    }
}

fn non_empty(field: BaseField, raw: &str) -> Result<String, AppError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::EmptyField(field.name().to_string()));
    }
    Ok(value.to_string())
}
