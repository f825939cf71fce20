//! Clone command generator: a new guest from an existing template.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::identifiers::validation::validate_guest_name;
use crate::domain::numeric::{parse_at_least, parse_in_range};
use crate::domain::{AppError, VmId};

/// Whether the clone copies the template disks or links to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloneType {
    #[default]
    Full,
    Linked,
}

impl FromStr for CloneType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(CloneType::Full),
            "linked" => Ok(CloneType::Linked),
            other => Err(AppError::config_error(format!(
                "Invalid clone type '{}': expected full or linked",
                other
            ))),
        }
    }
}

impl fmt::Display for CloneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneType::Full => f.write_str("full"),
            CloneType::Linked => f.write_str("linked"),
        }
    }
}

/// Raw form input; empty resource fields are left out of the command.
#[derive(Debug, Clone, Default)]
pub struct CloneRequest {
    pub template_id: String,
    pub name: String,
    pub disk_gb: Option<String>,
    pub memory_mb: Option<String>,
    pub cores: Option<String>,
    pub clone_type: CloneType,
}

/// Validated clone parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneConfig {
    pub template_id: VmId,
    pub name: String,
    pub disk_gb: Option<u32>,
    pub memory_mb: Option<u32>,
    pub cores: Option<u32>,
    pub clone_type: CloneType,
}

impl CloneConfig {
    /// Validate raw input, rejecting the first invalid field.
    pub fn from_request(request: &CloneRequest) -> Result<Self, AppError> {
        let template_id = VmId::parse("template-id", &request.template_id)?;
        let name = request.name.trim();
        if !validate_guest_name(name) {
            return Err(AppError::InvalidCloneName(request.name.clone()));
        }

        Ok(Self {
            template_id,
            name: name.to_string(),
            disk_gb: optional(&request.disk_gb, |raw| parse_at_least("disk", raw, 1))?,
            memory_mb: optional(&request.memory_mb, |raw| parse_at_least("memory", raw, 512))?,
            cores: optional(&request.cores, |raw| parse_in_range("cores", raw, 1, 128))?,
            clone_type: request.clone_type,
        })
    }

    /// Render the `qm clone` command line.
    pub fn command(&self) -> String {
        let mut command = format!("qm clone {} {}", self.template_id, self.name);
        if self.clone_type == CloneType::Full {
            command.push_str(" --full");
        }
        if let Some(disk) = self.disk_gb {
            command.push_str(&format!(" --disk {}", disk));
        }
        if let Some(memory) = self.memory_mb {
            command.push_str(&format!(" --memory {}", memory));
        }
        if let Some(cores) = self.cores {
            command.push_str(&format!(" --cores {}", cores));
        }
        command
    }
}

fn optional(
    raw: &Option<String>,
    parse: impl Fn(&str) -> Result<u32, AppError>,
) -> Result<Option<u32>, AppError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse(value).map(Some),
    }
}
