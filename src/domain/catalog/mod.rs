//! OS catalog domain model: provisioning metadata per OS image.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{AppError, OsId};

/// Package manager used inside the guest image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Dnf,
}

impl PackageManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static provisioning metadata for one OS image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsCatalogEntry {
    /// Image identifier; also the downloaded file name.
    pub id: OsId,
    /// Human-readable label, e.g. "Rocky Linux 9".
    pub label: String,
    /// Cloud image download location.
    pub url: Url,
    pub package_manager: PackageManager,
    /// SELinux must be disabled before the guest agent is installed.
    pub needs_selinux_disable: bool,
    pub rhel_family: bool,
    /// Image ships a persistent network link rule that must be masked.
    pub network_link_fix: bool,
}

impl OsCatalogEntry {
    /// Shell command fetching the disk image into `<id>`.
    pub fn download_command(&self) -> String {
        format!("wget {} -O {}", self.url, self.id)
    }
}

/// A labelled group of catalog entries, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsGroup {
    pub label: String,
    pub os_ids: Vec<OsId>,
}

/// Result of a catalog lookup. Call sites must handle the missing case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogLookup<'a> {
    Found(&'a OsCatalogEntry),
    NotFound,
}

impl<'a> CatalogLookup<'a> {
    pub fn found(self) -> Option<&'a OsCatalogEntry> {
        match self {
            CatalogLookup::Found(entry) => Some(entry),
            CatalogLookup::NotFound => None,
        }
    }

    /// Convert a missing entry into `AppError::UnknownOs`.
    pub fn require(self, os_id: &str) -> Result<&'a OsCatalogEntry, AppError> {
        self.found().ok_or_else(|| AppError::UnknownOs(os_id.to_string()))
    }
}
