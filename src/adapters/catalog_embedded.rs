//! OS catalog loaded from embedded TOML assets.

use std::collections::BTreeMap;

use include_dir::{Dir, include_dir};
use serde::Deserialize;
use url::Url;

use crate::domain::catalog::{CatalogLookup, OsCatalogEntry, OsGroup, PackageManager};
use crate::domain::{AppError, OsId};
use crate::ports::OsCatalog;

/// Embedded catalog directory, one file per OS family.
static CATALOG_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/src/assets/catalog");

const IMAGE_SUFFIX: &str = ".qcow2";

/// Contents of one family file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FamilyFile {
    /// Group label shown to the operator.
    label: String,
    /// Display position of the group.
    order: u32,
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryRecord {
    id: String,
    label: String,
    url: String,
    package_manager: PackageManager,
    #[serde(default)]
    needs_selinux_disable: bool,
    #[serde(default)]
    rhel_family: bool,
    #[serde(default)]
    network_link_fix: bool,
}

/// Catalog of supported OS images compiled into the binary.
#[derive(Debug)]
pub struct EmbeddedOsCatalog {
    entries: BTreeMap<String, OsCatalogEntry>,
    /// Bare names (`rocky-9`) pointing at canonical ids (`rocky-9.qcow2`).
    aliases: BTreeMap<String, String>,
    groups: Vec<OsGroup>,
}

impl EmbeddedOsCatalog {
    /// Load every embedded family file.
    pub fn new() -> Result<Self, AppError> {
        let mut families = Vec::new();
        for file in CATALOG_DIR.files() {
            let path = file.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            let asset = path.display().to_string();
            let content = file.contents_utf8().ok_or_else(|| AppError::InvalidCatalogAsset {
                asset: asset.clone(),
                reason: "not valid UTF-8".to_string(),
            })?;
            families.push((asset, content));
        }
        Self::from_sources(families)
    }

    /// Build a catalog from `(asset name, TOML text)` pairs.
    fn from_sources<S: AsRef<str>>(sources: Vec<(String, S)>) -> Result<Self, AppError> {
        let mut parsed = Vec::new();
        for (asset, content) in sources {
            let family: FamilyFile = toml::from_str(content.as_ref())
                .map_err(|e| AppError::InvalidCatalogAsset {
                    asset: asset.clone(),
                    reason: e.to_string(),
                })?;
            parsed.push((asset, family));
        }
        parsed.sort_by(|(a_name, a), (b_name, b)| {
            a.order.cmp(&b.order).then_with(|| a_name.cmp(b_name))
        });

        let mut entries = BTreeMap::new();
        let mut aliases = BTreeMap::new();
        let mut groups = Vec::new();

        for (asset, family) in parsed {
            let mut os_ids = Vec::new();
            for record in family.entries {
                let entry = build_entry(&asset, record)?;
                let key = entry.id.to_string();
                if entries.contains_key(&key) {
                    return Err(AppError::InvalidCatalogAsset {
                        asset,
                        reason: format!("Duplicate OS id '{}'", key),
                    });
                }
                if let Some(bare) = key.strip_suffix(IMAGE_SUFFIX) {
                    aliases.insert(bare.to_string(), key.clone());
                }
                os_ids.push(entry.id.clone());
                entries.insert(key, entry);
            }
            groups.push(OsGroup { label: family.label, os_ids });
        }

        Ok(Self { entries, aliases, groups })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_entry(asset: &str, record: EntryRecord) -> Result<OsCatalogEntry, AppError> {
    let invalid =
        |reason: String| AppError::InvalidCatalogAsset { asset: asset.to_string(), reason };

    let id = OsId::new(&record.id).map_err(|_| invalid(format!("Invalid OS id '{}'", record.id)))?;
    let url = Url::parse(&record.url)
        .map_err(|e| invalid(format!("Invalid URL for '{}': {}", record.id, e)))?;
    if record.needs_selinux_disable && !record.rhel_family {
        return Err(invalid(format!(
            "'{}' needs SELinux disabled but is not marked as RHEL family",
            record.id
        )));
    }

    Ok(OsCatalogEntry {
        id,
        label: record.label,
        url,
        package_manager: record.package_manager,
        needs_selinux_disable: record.needs_selinux_disable,
        rhel_family: record.rhel_family,
        network_link_fix: record.network_link_fix,
    })
}

impl OsCatalog for EmbeddedOsCatalog {
    fn lookup(&self, os_id: &str) -> CatalogLookup<'_> {
        let os_id = os_id.trim();
        let canonical = self.aliases.get(os_id).map(String::as_str).unwrap_or(os_id);
        match self.entries.get(canonical) {
            Some(entry) => CatalogLookup::Found(entry),
            None => CatalogLookup::NotFound,
        }
    }

    fn groups(&self) -> &[OsGroup] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EmbeddedOsCatalog {
        EmbeddedOsCatalog::new().unwrap()
    }

    #[test]
    fn loads_all_families_in_display_order() {
        let catalog = catalog();
        let labels: Vec<_> = catalog.groups().iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["Ubuntu", "Debian", "CentOS", "Rocky Linux", "AlmaLinux", "Fedora"]);
        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.all_ids().len(), 12);
        assert_eq!(catalog.all_ids()[0].as_str(), "ubuntu-24.04.qcow2");
    }

    #[test]
    fn lookup_accepts_bare_names() {
        let catalog = catalog();
        let entry = catalog.lookup("rocky-9").found().expect("rocky-9 should resolve");
        assert_eq!(entry.id.as_str(), "rocky-9.qcow2");
        assert_eq!(catalog.lookup("rocky-9.qcow2").found(), Some(entry));
        assert_eq!(catalog.lookup("plan9"), CatalogLookup::NotFound);
    }

    #[test]
    fn flags_follow_family() {
        let catalog = catalog();
        let rocky = catalog.lookup("rocky-9").found().unwrap();
        assert!(rocky.needs_selinux_disable && rocky.rhel_family);
        assert_eq!(rocky.package_manager, PackageManager::Dnf);

        let centos = catalog.lookup("centos-stream-9").found().unwrap();
        assert!(centos.rhel_family && !centos.needs_selinux_disable);

        let ubuntu = catalog.lookup("ubuntu-22.04").found().unwrap();
        assert!(!ubuntu.rhel_family);
        assert_eq!(ubuntu.package_manager, PackageManager::Apt);

        assert!(catalog.lookup("debian-11").found().unwrap().network_link_fix);
        assert!(!catalog.lookup("debian-12").found().unwrap().network_link_fix);
    }

    #[test]
    fn download_command_targets_image_id() {
        let entry = catalog().lookup("ubuntu-22.04").found().cloned().unwrap();
        assert_eq!(
            entry.download_command(),
            "wget https://cloud-images.ubuntu.com/jammy/current/jammy-server-cloudimg-amd64.img -O ubuntu-22.04.qcow2"
        );
    }

    #[test]
    fn group_lookup_ignores_case() {
        let catalog = catalog();
        let group = catalog.group("rocky linux").expect("group should resolve");
        assert_eq!(group.os_ids.len(), 2);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let family = r#"
            label = "Debian"
            order = 1
            [[entries]]
            id = "debian-12.qcow2"
            label = "Debian 12"
            url = "https://example.test/debian-12.qcow2"
            package_manager = "apt"
        "#;
        let err = EmbeddedOsCatalog::from_sources(vec![
            ("a.toml".to_string(), family),
            ("b.toml".to_string(), family),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidCatalogAsset { reason, .. } if reason.contains("Duplicate")
        ));
    }

    #[test]
    fn rejects_malformed_entries() {
        let bad_url = r#"
            label = "X"
            order = 1
            [[entries]]
            id = "x.qcow2"
            label = "X"
            url = "not a url"
            package_manager = "apt"
        "#;
        assert!(EmbeddedOsCatalog::from_sources(vec![("x.toml".to_string(), bad_url)]).is_err());

        let bad_pm = r#"
            label = "X"
            order = 1
            [[entries]]
            id = "x.qcow2"
            label = "X"
            url = "https://example.test/x"
            package_manager = "pacman"
        "#;
        assert!(EmbeddedOsCatalog::from_sources(vec![("x.toml".to_string(), bad_pm)]).is_err());
    }
}
