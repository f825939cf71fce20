//! Single-template generation.

use crate::domain::command_step::join_steps;
use crate::domain::generator::generate;
use crate::domain::{AppError, BaseConfig, BaseField, BatchState, CommandStep, TemplateConfig};
use crate::ports::OsCatalog;

/// Form values for one template. Unset fields keep the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub os: String,
    pub vm_id: Option<String>,
    pub storage: Option<String>,
    pub bridge: Option<String>,
    pub guest_agent: Option<bool>,
    pub root_ssh: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct GenerateOutput {
    pub config: TemplateConfig,
    pub steps: Vec<CommandStep>,
}

impl GenerateOutput {
    /// All steps joined into one shell line.
    pub fn merged(&self) -> String {
        join_steps(&self.steps)
    }
}

/// Build one template from `defaults` and `options` and expand it.
///
/// Options go through the same edit rules as the batch form: invalid values
/// are rejected, and turning the agent off also turns root SSH off.
pub fn execute<C: OsCatalog>(
    catalog: &C,
    defaults: &BaseConfig,
    options: &GenerateOptions,
) -> Result<GenerateOutput, AppError> {
    let mut form = BatchState::new(defaults.clone());

    if let Some(vm_id) = &options.vm_id {
        form.update_base(BaseField::VmId, vm_id)?;
    }
    if let Some(storage) = &options.storage {
        form.update_base(BaseField::Storage, storage)?;
    }
    if let Some(bridge) = &options.bridge {
        form.update_base(BaseField::Bridge, bridge)?;
    }
    if let Some(agent) = options.guest_agent {
        form.set_guest_agent(agent);
    }
    if let Some(root_ssh) = options.root_ssh {
        form.set_root_ssh(root_ssh)?;
    }

    form.toggle_os(&options.os, catalog)?;
    let config = form
        .templates()
        .first()
        .cloned()
        .ok_or_else(|| AppError::UnknownOs(options.os.clone()))?;
    let steps = generate(&config, catalog);
    Ok(GenerateOutput { config, steps })
}
