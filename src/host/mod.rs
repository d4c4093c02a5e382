pub mod bridge;

use std::collections::HashMap;

use bevy::ecs::message::Message;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::AdditionalMetadataField;
use crate::inventory::catalog::ItemCatalogEntry;
use crate::inventory::inventory::{Inventory, InventoryKind};

/// Named notification from the host game process.
#[derive(Message, Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum HostEvent {
    ToggleHotbar,
    SetInventories(Vec<Inventory>),
    UpdateInventory(Inventory),
    CloseInventory { id: String },
    SetBusy(bool),
    SetItems(Vec<ItemCatalogEntry>),
    SetAdditionalMetadata(Vec<AdditionalMetadataField>),
    SetLocale(HashMap<String, String>),
}

/// Address of one slot in one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SlotRef {
    pub inventory: String,
    #[serde(rename = "type")]
    pub kind: InventoryKind,
    pub slot: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "slot", rename_all = "camelCase")]
pub enum DropTarget {
    Slot(SlotRef),
    /// Released outside every slot (e.g. onto the game world).
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotAction {
    Use,
    QuickMove,
    QuickMoveHalf,
}

/// User gesture reported to the host. Fire-and-forget.
#[derive(Message, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "gesture", rename_all = "camelCase")]
pub enum SlotGesture {
    DragStart { source: SlotRef },
    Drop { source: SlotRef, target: DropTarget, split: bool },
    Activate { slot: SlotRef, action: SlotAction },
    ContextMenu { slot: SlotRef },
    CopySerial { slot: SlotRef, serial: String },
}

pub struct HostPlugin;

impl Plugin for HostPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<HostEvent>()
            .add_message::<SlotGesture>()
            .add_plugins(bridge::BridgePlugin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_events() {
        let toggle: HostEvent = serde_json::from_str(r#"{ "action": "toggleHotbar" }"#).unwrap();
        assert_eq!(toggle, HostEvent::ToggleHotbar);

        let busy: HostEvent = serde_json::from_str(r#"{ "action": "setBusy", "data": true }"#).unwrap();
        assert_eq!(busy, HostEvent::SetBusy(true));

        let close: HostEvent =
            serde_json::from_str(r#"{ "action": "closeInventory", "data": { "id": "trunk:ABC" } }"#).unwrap();
        assert_eq!(close, HostEvent::CloseInventory { id: "trunk:ABC".into() });
    }

    #[test]
    fn parses_inventory_update() {
        let event: HostEvent = serde_json::from_str(
            r#"{ "action": "updateInventory", "data": {
                "id": "glove:1", "type": "glovebox", "label": "Glovebox", "maxWeight": 5000,
                "slots": [ { "slot": 1, "item": { "name": "water", "count": 2, "weight": 500 } }, { "slot": 2 } ]
            } }"#,
        )
        .unwrap();
        let HostEvent::UpdateInventory(inv) = event else {
            panic!("wrong variant");
        };
        assert_eq!(inv.kind, InventoryKind::Glovebox);
        assert_eq!(inv.max_weight, Some(5000.0));
        assert!(inv.slots[1].item.is_none());
    }

    #[test]
    fn gestures_serialize_with_tags() {
        let source = SlotRef { inventory: "player".into(), kind: InventoryKind::Player, slot: 3 };
        let drop = SlotGesture::Drop { source, target: DropTarget::External, split: false };
        let json = serde_json::to_value(&drop).unwrap();
        assert_eq!(json["gesture"], "drop");
        assert_eq!(json["target"]["kind"], "external");
        assert_eq!(json["source"]["type"], "player");
    }
}
