use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::AppError;
use crate::impl_validated_id;

/// A validated OS image identifier, e.g. `ubuntu-22.04.qcow2`.
///
/// The identifier doubles as the image file name in generated commands.
///
/// Guarantees:
/// - Non-empty
/// - Contains only alphanumeric characters, `-`, `_`, or `.`
/// - No path separators or shell metacharacters
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OsId(String);

impl_validated_id!(OsId, true, AppError::InvalidOsId);

impl OsId {
    /// Proxmox guest name for the template built from this image.
    ///
    /// Keeps everything up to the first `.`, drops characters outside
    /// `[A-Za-z0-9-]`, and appends `-template`.
    pub fn template_name(&self) -> String {
        let stem = self.0.split('.').next().unwrap_or_default();
        let cleaned: String =
            stem.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect();
        format!("{}-template", cleaned)
    }

    /// Capitalized distribution family, e.g. `Rocky` for `rocky-9.qcow2`.
    pub fn family_label(&self) -> String {
        let family = self.0.split(['.', '-']).next().unwrap_or_default();
        let mut chars = family.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<OsId> for String {
    fn from(val: OsId) -> Self {
        val.0
    }
}

impl Serialize for OsId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OsId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OsId::new(&s).map_err(serde::de::Error::custom)
    }
}
