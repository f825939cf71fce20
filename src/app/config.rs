//! Application configuration: state directory and form defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::template_config::{MAX_VM_ID, MIN_VM_ID};
use crate::domain::{AppError, BaseConfig, VmId};

/// Configuration file name inside the state directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the state directory.
pub const STATE_DIR_ENV: &str = "PVEQC_STATE_DIR";

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: DefaultsSection,
}

/// `[defaults]` table. Unset keys keep the built-in values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    pub vm_id: Option<u32>,
    pub storage: Option<String>,
    pub bridge: Option<String>,
    pub guest_agent: Option<bool>,
    pub root_ssh: Option<bool>,
}

impl DefaultsSection {
    /// Apply overrides to the built-in base configuration.
    pub fn to_base_config(&self) -> Result<BaseConfig, AppError> {
        let mut base = BaseConfig::default();
        if let Some(vm_id) = self.vm_id {
            if !(MIN_VM_ID..=MAX_VM_ID).contains(&vm_id) {
                return Err(AppError::config_error(format!(
                    "{}: defaults.vm_id must be between {} and {}, got {}",
                    CONFIG_FILE, MIN_VM_ID, MAX_VM_ID, vm_id
                )));
            }
            base.vm_id = VmId::new(vm_id);
        }
        if let Some(storage) = &self.storage {
            base.storage_target = storage.trim().to_string();
        }
        if let Some(bridge) = &self.bridge {
            base.network_bridge = bridge.trim().to_string();
        }
        if let Some(agent) = self.guest_agent {
            base.enable_guest_agent = agent;
        }
        if let Some(root_ssh) = self.root_ssh {
            base.enable_root_ssh = root_ssh;
        }
        base.validate().map_err(|e| {
            AppError::config_error(format!("{}: invalid [defaults]: {}", CONFIG_FILE, e))
        })?;
        Ok(base)
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub state_dir: PathBuf,
    pub defaults: BaseConfig,
}

impl AppConfig {
    /// Load `<state_dir>/config.toml` when present, else use built-in defaults.
    pub fn load(state_dir: PathBuf) -> Result<Self, AppError> {
        let path = state_dir.join(CONFIG_FILE);
        let file = read_config_file(&path)?.unwrap_or_default();
        let defaults = file.defaults.to_base_config()?;
        Ok(Self { state_dir, defaults })
    }
}

fn read_config_file(path: &Path) -> Result<Option<ConfigFile>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let file = toml::from_str(&content)
        .map_err(|e| AppError::config_error(format!("Failed to parse {}: {}", path.display(), e)))?;
    Ok(Some(file))
}
