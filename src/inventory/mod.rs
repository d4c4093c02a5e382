pub mod catalog;
pub mod error;
pub mod inventory;
pub mod item;

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::config::{AdditionalMetadataField, HudConfig};
use crate::host::HostEvent;
use crate::locale::{self, Locale};
use catalog::ItemCatalog;
use inventory::{Inventory, InventoryKind};

/// Snapshot of everything the host owns: inventories, busy flag, extra tooltip rows.
#[derive(Resource, Debug, Default, Clone)]
pub struct InventoryStore {
    pub inventories: Vec<Inventory>,
    /// Set while a host request is in flight; locks grid input.
    pub busy: bool,
    pub additional_metadata: Vec<AdditionalMetadataField>,
}

impl InventoryStore {
    pub fn get(&self, id: &str) -> Option<&Inventory> {
        self.inventories.iter().find(|inv| inv.id == id)
    }

    /// The inventory the hotbar reads from: first player inventory, else the first one.
    pub fn hotbar_source(&self) -> Option<&Inventory> {
        self.inventories
            .iter()
            .find(|inv| inv.kind == InventoryKind::Player)
            .or_else(|| self.inventories.first())
    }

    pub fn replace_all(&mut self, inventories: Vec<Inventory>) {
        self.inventories = inventories.into_iter().map(sanitize).collect();
    }

    /// Replace the inventory with the same id, or append it.
    pub fn upsert(&mut self, inventory: Inventory) {
        let inventory = sanitize(inventory);
        match self.inventories.iter_mut().find(|inv| inv.id == inventory.id) {
            Some(existing) => *existing = inventory,
            None => self.inventories.push(inventory),
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.inventories.len();
        self.inventories.retain(|inv| inv.id != id);
        self.inventories.len() != before
    }
}

fn sanitize(mut inventory: Inventory) -> Inventory {
    for slot in inventory.dedup_slots() {
        warn!("Inventory {} repeats slot {}; keeping the first", inventory.id, slot);
    }
    inventory
}

pub struct InventoryPlugin;

impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        let config = crate::config::load_config();
        let mut store = InventoryStore {
            additional_metadata: config.additional_metadata.clone(),
            ..default()
        };
        store.replace_all(load_snapshot(&config));
        app.insert_resource(load_item_catalog(&config))
            .insert_resource(load_locale_table(&config))
            .insert_resource(store)
            .insert_resource(config)
            .add_systems(PreUpdate, apply_host_events);
    }
}

fn load_snapshot(config: &HudConfig) -> Vec<Inventory> {
    match error::read_json::<Vec<Inventory>>(&config.snapshot_path) {
        Ok(inventories) => {
            info!("Loaded {} inventories from {}", inventories.len(), config.snapshot_path);
            inventories
        }
        Err(error::DataError::Io(_)) => crate::demo::demo_inventories(),
        Err(e) => {
            warn!("Failed to load inventory snapshot: {}", e);
            crate::demo::demo_inventories()
        }
    }
}

fn load_item_catalog(config: &HudConfig) -> ItemCatalog {
    match catalog::load_catalog(&config.catalog_path) {
        Ok(catalog) => {
            info!("Items loaded: {}", catalog.len());
            catalog
        }
        Err(e) => {
            warn!("Failed to load item catalog: {}", e);
            ItemCatalog::default()
        }
    }
}

fn load_locale_table(config: &HudConfig) -> Locale {
    match locale::load_locale(&config.locale_path) {
        Ok(table) => table,
        Err(error::DataError::Io(_)) => Locale::default(),
        Err(e) => {
            warn!("Failed to load locale: {}", e);
            Locale::default()
        }
    }
}

/// Fold host notifications into the store, catalog and locale.
pub fn apply_host_events(
    mut events: MessageReader<HostEvent>,
    mut store: ResMut<InventoryStore>,
    mut catalog: ResMut<ItemCatalog>,
    mut locale: ResMut<Locale>,
) {
    for event in events.read() {
        match event {
            HostEvent::SetInventories(inventories) => store.replace_all(inventories.clone()),
            HostEvent::UpdateInventory(inventory) => store.upsert(inventory.clone()),
            HostEvent::CloseInventory { id } => {
                if !store.remove(id) {
                    debug!("closeInventory for unknown id {}", id);
                }
            }
            HostEvent::SetBusy(busy) => {
                if store.busy != *busy {
                    store.busy = *busy;
                }
            }
            HostEvent::SetItems(entries) => {
                let applied = catalog.merge(entries.iter().cloned());
                debug!("Catalog updated with {} entries", applied);
            }
            HostEvent::SetAdditionalMetadata(fields) => store.additional_metadata = fields.clone(),
            HostEvent::SetLocale(strings) => locale.merge(strings.clone()),
            HostEvent::ToggleHotbar => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item::SlotItem;
    use inventory::Slot;

    fn inv(id: &str, kind: InventoryKind) -> Inventory {
        Inventory::new(id, kind, id)
    }

    #[test]
    fn hotbar_source_prefers_player() {
        let mut store = InventoryStore::default();
        assert!(store.hotbar_source().is_none());
        store.replace_all(vec![inv("stash", InventoryKind::Stash), inv("me", InventoryKind::Player)]);
        assert_eq!(store.hotbar_source().unwrap().id, "me");
        store.remove("me");
        assert_eq!(store.hotbar_source().unwrap().id, "stash");
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut store = InventoryStore::default();
        store.upsert(inv("trunk", InventoryKind::Trunk));
        let mut updated = inv("trunk", InventoryKind::Trunk);
        updated.slots.push(Slot::with_item(1, SlotItem::new("water", 1, 500.0)));
        store.upsert(updated);
        assert_eq!(store.inventories.len(), 1);
        assert_eq!(store.get("trunk").unwrap().slots.len(), 1);
    }

    #[test]
    fn ingest_drops_duplicate_slots() {
        let mut store = InventoryStore::default();
        let mut dup = inv("box", InventoryKind::Container);
        dup.slots = vec![Slot::empty(1), Slot::empty(1), Slot::empty(2)];
        store.replace_all(vec![dup]);
        assert_eq!(store.get("box").unwrap().slots.len(), 2);
    }

    #[test]
    fn remove_reports_unknown_ids() {
        let mut store = InventoryStore::default();
        assert!(!store.remove("nope"));
    }
}
