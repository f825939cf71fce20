pub mod batch;
pub mod catalog;
pub mod clone;
pub mod cloud_init;
pub mod command_step;
pub mod error;
pub mod firewall;
pub mod generator;
pub mod identifiers;
pub mod numeric;
pub mod template_config;

pub use batch::{BatchState, SelectionChange};
pub use catalog::{CatalogLookup, OsCatalogEntry, OsGroup, PackageManager};
pub use clone::{CloneConfig, CloneRequest, CloneType};
pub use cloud_init::CloudConfig;
pub use command_step::{CommandStep, StepKind, join_steps};
pub use error::AppError;
pub use firewall::{FirewallRule, FirewallRuleSet, Protocol};
pub use identifiers::OsId;
pub use template_config::{BaseConfig, BaseField, TemplateConfig, TemplateId, VmId};
