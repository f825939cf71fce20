//! Template provisioning job configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::numeric::parse_in_range;
use crate::domain::{AppError, OsId};

/// Lowest VM identifier Proxmox accepts for guests.
pub const MIN_VM_ID: u32 = 100;
/// Highest VM identifier accepted by the form.
pub const MAX_VM_ID: u32 = 999_999;

/// Proxmox VM identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VmId(u32);

impl VmId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Parse user input for the given form field.
    pub fn parse(field: &str, raw: &str) -> Result<Self, AppError> {
        parse_in_range(field, raw, MIN_VM_ID, MAX_VM_ID).map(Self)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Whether Proxmox and the form accept this identifier.
    pub fn in_range(&self) -> bool {
        (MIN_VM_ID..=MAX_VM_ID).contains(&self.0)
    }

    /// Identifier `offset` positions after this one.
    pub fn offset(&self, offset: usize) -> Self {
        let offset = u32::try_from(offset).unwrap_or(u32::MAX);
        Self(self.0.saturating_add(offset))
    }
}

impl fmt::Display for VmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of a template entry, stable across reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(Uuid);

impl TemplateId {
    /// Fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Form values used as defaults for new template entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfig {
    /// Starting VM identifier of the batch.
    pub vm_id: VmId,
    pub storage_target: String,
    pub network_bridge: String,
    pub enable_guest_agent: bool,
    pub enable_root_ssh: bool,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            vm_id: VmId::new(9000),
            storage_target: "local-lvm".to_string(),
            network_bridge: "vmbr0".to_string(),
            enable_guest_agent: true,
            enable_root_ssh: false,
        }
    }
}

impl BaseConfig {
    /// Check the invariants a stored or configured base must satisfy.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.storage_target.trim().is_empty() {
            return Err(AppError::EmptyField("storage".to_string()));
        }
        if self.network_bridge.trim().is_empty() {
            return Err(AppError::EmptyField("bridge".to_string()));
        }
        if self.enable_root_ssh && !self.enable_guest_agent {
            return Err(AppError::RootSshRequiresGuestAgent);
        }
        Ok(())
    }
}

/// One template provisioning job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub id: TemplateId,
    pub vm_id: VmId,
    pub os_id: OsId,
    pub storage_target: String,
    pub network_bridge: String,
    pub enable_guest_agent: bool,
    pub enable_root_ssh: bool,
}

impl TemplateConfig {
    /// Snapshot `base` into a new entry for `os_id` with a fresh identity.
    pub fn from_base(base: &BaseConfig, os_id: OsId, vm_id: VmId) -> Self {
        Self {
            id: TemplateId::generate(),
            vm_id,
            os_id,
            storage_target: base.storage_target.clone(),
            network_bridge: base.network_bridge.clone(),
            enable_guest_agent: base.enable_guest_agent,
            enable_root_ssh: base.enable_root_ssh && base.enable_guest_agent,
        }
    }

    /// Check a restored entry against the same rules the form enforces.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.vm_id.in_range() {
            return Err(AppError::invalid_numeric(
                "vm-id",
                &self.vm_id.to_string(),
                format!("must be between {} and {}", MIN_VM_ID, MAX_VM_ID),
            ));
        }
        if self.storage_target.trim().is_empty() {
            return Err(AppError::EmptyField("storage".to_string()));
        }
        if self.network_bridge.trim().is_empty() {
            return Err(AppError::EmptyField("bridge".to_string()));
        }
        if self.enable_root_ssh && !self.enable_guest_agent {
            return Err(AppError::RootSshRequiresGuestAgent);
        }
        Ok(())
    }

    /// Refresh every field except identity, VM id and OS from `base`.
    pub fn resync(&mut self, base: &BaseConfig) {
        self.storage_target = base.storage_target.clone();
        self.network_bridge = base.network_bridge.clone();
        self.enable_guest_agent = base.enable_guest_agent;
        self.enable_root_ssh = base.enable_root_ssh && base.enable_guest_agent;
    }
}

/// Editable field of the base configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseField {
    VmId,
    Storage,
    Bridge,
    GuestAgent,
    RootSsh,
}

impl BaseField {
    pub const ALL: [BaseField; 5] = [
        BaseField::VmId,
        BaseField::Storage,
        BaseField::Bridge,
        BaseField::GuestAgent,
        BaseField::RootSsh,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BaseField::VmId => "vm-id",
            BaseField::Storage => "storage",
            BaseField::Bridge => "bridge",
            BaseField::GuestAgent => "guest-agent",
            BaseField::RootSsh => "root-ssh",
        }
    }
}

impl FromStr for BaseField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "vm-id" | "vmid" => Ok(BaseField::VmId),
            "storage" | "storage-target" => Ok(BaseField::Storage),
            "bridge" | "network-bridge" => Ok(BaseField::Bridge),
            "guest-agent" | "agent" | "qemu-agent" => Ok(BaseField::GuestAgent),
            "root-ssh" => Ok(BaseField::RootSsh),
            _ => Err(AppError::UnknownField(s.to_string())),
        }
    }
}

impl fmt::Display for BaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a boolean form value (`true/false`, `on/off`, `yes/no`, `1/0`).
pub fn parse_flag(field: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(AppError::config_error(format!(
            "Invalid value '{}' for {}: expected on/off, true/false, yes/no",
            raw, field
        ))),
    }
}
