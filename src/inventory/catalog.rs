use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{read_json, DataError};

/// Static description of an item, keyed by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCatalogEntry {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "ammoName", skip_serializing_if = "Option::is_none")]
    pub ammo_name: Option<String>,
}

/// Read-only item lookup supplied by the host.
#[derive(Resource, Debug, Default, Clone)]
pub struct ItemCatalog {
    entries: HashMap<String, ItemCatalogEntry>,
}

impl ItemCatalog {
    pub fn from_entries(entries: impl IntoIterator<Item = ItemCatalogEntry>) -> Self {
        let mut catalog = Self::default();
        catalog.merge(entries);
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&ItemCatalogEntry> {
        self.entries.get(name)
    }

    /// Catalog label for `name`, falling back to the raw name when absent or empty.
    pub fn label_or_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name)
            .map(|e| e.label.as_str())
            .filter(|label| !label.is_empty())
            .unwrap_or(name)
    }

    /// Insert or replace entries. Returns how many were applied.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = ItemCatalogEntry>) -> usize {
        let mut applied = 0;
        for entry in entries {
            self.entries.insert(entry.name.clone(), entry);
            applied += 1;
        }
        applied
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn load_catalog(path: &str) -> Result<ItemCatalog, DataError> {
    let entries: Vec<ItemCatalogEntry> = read_json(path)?;
    Ok(ItemCatalog::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, label: &str) -> ItemCatalogEntry {
        ItemCatalogEntry {
            name: name.into(),
            label: label.into(),
            description: None,
            ammo_name: None,
        }
    }

    #[test]
    fn label_falls_back_to_name() {
        let catalog = ItemCatalog::from_entries([entry("steel", "Steel")]);
        assert_eq!(catalog.label_or_name("steel"), "Steel");
        assert_eq!(catalog.label_or_name("ghost_item"), "ghost_item");
    }

    #[test]
    fn merge_replaces_existing_entries() {
        let mut catalog = ItemCatalog::from_entries([entry("water", "Water")]);
        assert_eq!(catalog.merge([entry("water", "Bottled Water"), entry("bread", "Bread")]), 2);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("water").unwrap().label, "Bottled Water");
    }

    #[test]
    fn empty_label_falls_back_to_name() {
        let catalog = ItemCatalog::from_entries([entry("water", "Water"), entry("scrap", "")]);
        assert_eq!(catalog.label_or_name("water"), "Water");
        assert_eq!(catalog.label_or_name("scrap"), "scrap");
        assert_eq!(catalog.label_or_name("ghost_item"), "ghost_item");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(load_catalog("does/not/exist.json"), Err(DataError::Io(_))));
    }

    #[test]
    fn entry_reads_ammo_name() {
        let e: ItemCatalogEntry = serde_json::from_str(
            r#"{ "name": "WEAPON_PISTOL", "label": "Pistol", "ammoName": "ammo-9" }"#,
        )
        .unwrap();
        assert_eq!(e.ammo_name.as_deref(), Some("ammo-9"));
    }
}
