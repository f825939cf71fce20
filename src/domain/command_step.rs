//! Command steps produced by the generators.

use serde::Serialize;

/// Logical position of a step in the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Download,
    InstallTooling,
    NetworkLinkFix,
    InstallGuestAgent,
    EnableRootSsh,
    CreateVm,
    ImportDisk,
    AttachScsi,
    ConfigureDisplay,
    AttachCloudInit,
    ConfigureCloudInitUser,
    SetBootDisk,
    EnableAgentFlag,
    ConvertToTemplate,
    Unsupported,
}

/// One shell command with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandStep {
    pub kind: StepKind,
    pub description: String,
    pub command: String,
}

impl CommandStep {
    pub fn new(
        kind: StepKind,
        description: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self { kind, description: description.into(), command: command.into() }
    }
}

/// Operator sequencing steps so the line stops at the first failure.
pub const AND_SEPARATOR: &str = " && ";

/// Join step commands into one shell line.
pub fn join_steps(steps: &[CommandStep]) -> String {
    steps.iter().map(|step| step.command.as_str()).collect::<Vec<_>>().join(AND_SEPARATOR)
}
