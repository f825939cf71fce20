//! pveqc: render Proxmox VE template provisioning jobs into shell commands.
//!
//! The engine maps an OS image to its provisioning metadata, expands a
//! template configuration into ordered `qm`/`virt-customize` steps, and keeps
//! a persisted batch of templates (one per selected OS) with sequential VM ids.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::{
    BatchAction, BatchOutcome, BatchReport, CopyOutcome, GenerateOptions, GenerateOutput,
    TemplateRow,
};
pub use domain::{
    AppError, BaseConfig, BaseField, BatchState, CommandStep, OsId, SelectionChange, StepKind,
    TemplateConfig, VmId,
};
pub use services::BatchSession;
