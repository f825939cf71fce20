use std::collections::BTreeMap;

use url::Url;

use crate::domain::catalog::{CatalogLookup, OsCatalogEntry, OsGroup, PackageManager};
use crate::domain::OsId;
use crate::ports::OsCatalog;

/// Small in-memory catalog for unit tests.
#[derive(Debug)]
pub struct TestCatalog {
    entries: BTreeMap<String, OsCatalogEntry>,
    aliases: BTreeMap<String, String>,
    groups: Vec<OsGroup>,
}

impl TestCatalog {
    pub fn new(groups: Vec<(&str, Vec<OsCatalogEntry>)>) -> Self {
        let mut entries = BTreeMap::new();
        let mut group_list = Vec::new();
        for (label, members) in groups {
            let os_ids = members.iter().map(|e| e.id.clone()).collect();
            for entry in members {
                entries.insert(entry.id.to_string(), entry);
            }
            group_list.push(OsGroup { label: label.to_string(), os_ids });
        }
        Self { entries, aliases: BTreeMap::new(), groups: group_list }
    }

    /// Ubuntu (apt), Debian (apt, 11 needs the link fix), and an enterprise
    /// group with Rocky (dnf, SELinux) and CentOS Stream (dnf, RHEL only).
    pub fn standard() -> Self {
        Self::new(vec![
            ("Ubuntu", vec![entry("ubuntu-22.04", "Ubuntu 22.04 LTS", PackageManager::Apt)]),
            (
                "Debian",
                vec![
                    entry("debian-12", "Debian 12", PackageManager::Apt),
                    OsCatalogEntry {
                        network_link_fix: true,
                        ..entry("debian-11", "Debian 11", PackageManager::Apt)
                    },
                ],
            ),
            (
                "Enterprise Linux",
                vec![
                    OsCatalogEntry {
                        needs_selinux_disable: true,
                        rhel_family: true,
                        ..entry("rocky-9", "Rocky Linux 9", PackageManager::Dnf)
                    },
                    OsCatalogEntry {
                        rhel_family: true,
                        ..entry("centos-stream-9", "CentOS Stream 9", PackageManager::Dnf)
                    },
                ],
            ),
        ])
    }

    /// Two `.qcow2` entries also reachable by their bare names.
    pub fn with_qcow2_aliases() -> Self {
        let mut catalog = Self::new(vec![(
            "Debian",
            vec![
                entry("debian-12.qcow2", "Debian 12", PackageManager::Apt),
                entry("debian-11.qcow2", "Debian 11", PackageManager::Apt),
            ],
        )]);
        catalog.add_alias("debian-12", "debian-12.qcow2");
        catalog.add_alias("debian-11", "debian-11.qcow2");
        catalog
    }

    pub fn add_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases.insert(alias.to_string(), canonical.to_string());
    }
}

pub fn entry(id: &str, label: &str, package_manager: PackageManager) -> OsCatalogEntry {
    OsCatalogEntry {
        id: OsId::new(id).unwrap(),
        label: label.to_string(),
        url: Url::parse(&format!("https://images.example.test/{}.img", id)).unwrap(),
        package_manager,
        needs_selinux_disable: false,
        rhel_family: false,
        network_link_fix: false,
    }
}

impl OsCatalog for TestCatalog {
    fn lookup(&self, os_id: &str) -> CatalogLookup<'_> {
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
