//! Cloud-init user-data enabling password root login over SSH.

use serde::{Deserialize, Serialize};

use crate::domain::AppError;

const HEADER: &str = "#cloud-config\n";

/// Subset of cloud-config keys the generator emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudConfig {
    pub ssh_pwauth: bool,
    pub disable_root: bool,
    pub runcmd: Vec<String>,
}

impl CloudConfig {
    pub fn root_login() -> Self {
        Self {
            ssh_pwauth: true,
            disable_root: false,
            runcmd: vec![
                "sed -i 's/^#\\?PermitRootLogin.*/PermitRootLogin yes/g' /etc/ssh/sshd_config"
                    .to_string(),
                "sed -i 's/^#\\?PasswordAuthentication.*/PasswordAuthentication yes/g' /etc/ssh/sshd_config"
                    .to_string(),
                "service sshd restart || service ssh restart".to_string(),
            ],
        }
    }

    /// Render as a user-data document.
    pub fn render(&self) -> Result<String, AppError> {
        let body = serde_yaml::to_string(self).map_err(|e| AppError::Serialization {
            what: "cloud-config".to_string(),
            details: e.to_string(),
        })?;
        Ok(format!("{}{}", HEADER, body))
    }
}
