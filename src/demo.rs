//! Built-in snapshot used when no inventory file is present.

use std::collections::BTreeMap;

use serde_json::json;

use crate::inventory::inventory::{Inventory, InventoryKind, Slot};
use crate::inventory::item::{ItemMetadata, SlotItem};

const PLAYER_SLOTS: u32 = 50;
const STASH_SLOTS: u32 = 200;

/// (name, unit weight in grams) for random stash fill.
const STASH_POOL: &[(&str, f64)] = &[
    ("water", 500.0),
    ("bread", 150.0),
    ("bandage", 115.0),
    ("lockpick", 160.0),
    ("scrapmetal", 80.0),
    ("steel", 300.0),
    ("cloth", 50.0),
    ("phone", 190.0),
];

fn meta(value: serde_json::Value) -> Option<ItemMetadata> {
    serde_json::from_value(value).ok()
}

fn fill(len: u32, mut items: Vec<(u32, SlotItem)>) -> Vec<Slot> {
    items.sort_by_key(|(slot, _)| *slot);
    let mut slots: Vec<Slot> = (1..=len).map(Slot::empty).collect();
    for (slot, item) in items {
        if let Some(target) = slots.get_mut(slot as usize - 1) {
            target.item = Some(item);
        }
    }
    slots
}

fn player() -> Inventory {
    let mut pistol = SlotItem::new("WEAPON_PISTOL", 1, 1130.0);
    pistol.durability = Some(63.7);
    pistol.metadata = meta(json!({
        "ammo": 12,
        "serial": "POL3X92KD01",
        "components": ["at_flashlight", "at_clip_extended_pistol"],
        "weapontint": 2,
        "rarity": "epic",
    }));

    let mut phone = SlotItem::new("phone", 1, 190.0);
    phone.metadata = meta(json!({ "label": "Burner Phone", "description": "Untraceable. Mostly." }));

    let mut bandage = SlotItem::new("bandage", 4, 115.0);
    bandage.durability = Some(22.0);

    let mut ghost = SlotItem::new("ghost_item", 1, 10.0);
    ghost.metadata = meta(json!({ "label": "Unlisted" }));

    let mut id_card = SlotItem::new("id_card", 1, 10.0);
    id_card.metadata = meta(json!({ "plate": "46EEK572", "rarity": "legendary" }));

    let mut inv = Inventory::new("player", InventoryKind::Player, "Player");
    inv.max_weight = Some(30000.0);
    inv.slots = fill(
        PLAYER_SLOTS,
        vec![
            (1, pistol),
            (2, SlotItem::new("ammo-9", 48, 5.0)),
            (3, SlotItem::new("water", 3, 500.0)),
            (4, bandage),
            (5, phone),
            (7, ghost),
            (8, id_card),
            (12, SlotItem::new("money", 2450, 0.0)),
        ],
    );
    inv
}

fn stash() -> Inventory {
    let mut items = Vec::new();
    for slot in 1..=STASH_SLOTS {
        if rand::random::<f32>() > 0.55 {
            continue;
        }
        let (name, weight) = STASH_POOL[rand::random::<u32>() as usize % STASH_POOL.len()];
        let count = 1 + rand::random::<u32>() % 20;
        let mut item = SlotItem::new(name, count, weight);
        if name == "lockpick" {
            item.durability = Some((rand::random::<f32>() * 100.0).round() as f64);
        }
        items.push((slot, item));
    }
    let mut inv = Inventory::new("stash:warehouse", InventoryKind::Stash, "Warehouse");
    inv.max_weight = Some(250000.0);
    inv.slots = fill(STASH_SLOTS, items);
    inv
}

fn workbench() -> Inventory {
    let mut lockpick = SlotItem::new("lockpick", 1, 160.0);
    lockpick.ingredients = Some(BTreeMap::from([
        ("scrapmetal".to_string(), 5.0),
        ("steel".to_string(), 0.5),
        ("WEAPON_HAMMER".to_string(), 0.0),
    ]));
    lockpick.duration = Some(4500);

    let mut bandage = SlotItem::new("bandage", 2, 115.0);
    bandage.ingredients = Some(BTreeMap::from([("cloth".to_string(), 2.0)]));

    let mut inv = Inventory::new("crafting:bench", InventoryKind::Crafting, "Workbench");
    inv.slots = vec![Slot::with_item(1, lockpick), Slot::with_item(2, bandage)];
    inv
}

pub fn demo_inventories() -> Vec<Inventory> {
    vec![player(), stash(), workbench()]
}
