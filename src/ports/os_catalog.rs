//! OS catalog port definition.

use crate::domain::catalog::{CatalogLookup, OsCatalogEntry, OsGroup};
use crate::domain::OsId;

/// Read-only access to the OS catalog.
pub trait OsCatalog {
    /// Look up an entry by identifier.
    fn lookup(&self, os_id: &str) -> CatalogLookup<'_>;

    /// Groups in display order.
    fn groups(&self) -> &[OsGroup];

    /// Find a group by label, ignoring case.
    fn group(&self, label: &str) -> Option<&OsGroup> {
        self.groups().iter().find(|group| group.label.eq_ignore_ascii_case(label.trim()))
    }

    /// Every catalog identifier in display order.
    fn all_ids(&self) -> Vec<OsId> {
        self.groups().iter().flat_map(|group| group.os_ids.iter().cloned()).collect()
    }

    /// Every catalog entry in display order.
    fn entries(&self) -> Vec<&OsCatalogEntry> {
        self.groups()
            .iter()
            .flat_map(|group| group.os_ids.iter())
            .filter_map(|id| self.lookup(id.as_str()).found())
            .collect()
    }
}
