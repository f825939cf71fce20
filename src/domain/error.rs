use std::io;

use thiserror::Error;

/// Library-wide error type for pveqc operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// OS identifier is not present in the catalog.
    #[error("Operating system type '{0}' is not supported")]
    UnknownOs(String),

    /// OS group label is not present in the catalog.
    #[error("OS group '{name}' not found. Available: {available}")]
    UnknownGroup { name: String, available: String },

    /// Port has no entry in the firewall rule table.
    #[error("No firewall rule for port '{port}'. Available: {available}")]
    UnknownFirewallRule { port: String, available: String },

    /// OS identifier is syntactically invalid.
    #[error("Invalid OS identifier '{0}': must be alphanumeric with hyphens, underscores, or periods")]
    InvalidOsId(String),

    /// Numeric form field rejected; the previous value is retained.
    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidNumericField { field: String, value: String, reason: String },

    /// Free-form field must not be empty.
    #[error("{0} must not be empty")]
    EmptyField(String),

    /// Base configuration field name is not recognized.
    #[error("Unknown field '{0}'. Expected one of: vm-id, storage, bridge, guest-agent, root-ssh")]
    UnknownField(String),

    /// Root SSH can only be enabled together with the guest agent.
    #[error("Root SSH access requires the QEMU guest agent to be enabled")]
    RootSshRequiresGuestAgent,

    /// Adding templates would number them past the highest VM id.
    #[error("Cannot add {count} template(s) from VM id {next}: ids must stay at or below {max}")]
    VmIdsExhausted { next: u32, count: usize, max: u32 },

    /// Clone target name is invalid.
    #[error("Invalid template name '{0}': only letters, numbers, and hyphens are allowed")]
    InvalidCloneName(String),

    /// Persistent store could not be read or written.
    #[error("State store unavailable: {0}")]
    PersistenceUnavailable(String),

    /// System clipboard could not be accessed.
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// Serialization of a persisted or rendered document failed.
    #[error("Failed to serialize {what}: {details}")]
    Serialization { what: String, details: String },

    /// Export template rendering failed.
    #[error("Failed to render export script: {0}")]
    Render(String),

    /// Embedded catalog asset is malformed.
    #[error("Invalid catalog asset '{asset}': {reason}")]
    InvalidCatalogAsset { asset: String, reason: String },
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn invalid_numeric(field: &str, value: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidNumericField {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
