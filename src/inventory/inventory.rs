use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::item::SlotItem;

/// Upper bound on a computed total, in grams.
pub const WEIGHT_LIMIT: f64 = 1.0e12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InventoryKind {
    Player,
    Shop,
    Crafting,
    Container,
    Stash,
    Trunk,
    Glovebox,
    #[default]
    Other,
}

impl InventoryKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "player" => Self::Player,
            "shop" => Self::Shop,
            "crafting" => Self::Crafting,
            "container" => Self::Container,
            "stash" => Self::Stash,
            "trunk" => Self::Trunk,
            "glovebox" => Self::Glovebox,
            _ => Self::Other,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Shop => "shop",
            Self::Crafting => "crafting",
            Self::Container => "container",
            Self::Stash => "stash",
            Self::Trunk => "trunk",
            Self::Glovebox => "glovebox",
            Self::Other => "other",
        }
    }
}

impl From<String> for InventoryKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<InventoryKind> for String {
    fn from(kind: InventoryKind) -> Self {
        kind.tag().to_string()
    }
}

/// One fixed-index storage unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub slot: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<SlotItem>,
}

impl Slot {
    pub fn empty(slot: u32) -> Self {
        Self { slot, item: None }
    }

    pub fn with_item(slot: u32, item: SlotItem) -> Self {
        Self { slot, item: Some(item) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: InventoryKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub slots: Vec<Slot>,
    /// Capacity in grams; `None` means uncapped.
    #[serde(default, rename = "maxWeight", skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<f64>,
}

impl Inventory {
    pub fn new(id: impl Into<String>, kind: InventoryKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            slots: Vec::new(),
            max_weight: None,
        }
    }

    /// Drop slots whose index repeats an earlier one. Returns the dropped indices.
    pub fn dedup_slots(&mut self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        self.slots.retain(|s| {
            if seen.insert(s.slot) {
                true
            } else {
                dropped.push(s.slot);
                false
            }
        });
        dropped
    }

    pub fn weight(&self) -> WeightSummary {
        WeightSummary {
            total: total_weight(&self.slots),
            capacity: self.max_weight,
        }
    }
}

/// Sum of stack weights over occupied slots, truncated to 3 decimals.
pub fn total_weight(slots: &[Slot]) -> f64 {
    let mut parts: Vec<f64> = slots
        .iter()
        .filter_map(|s| s.item.as_ref())
        .map(SlotItem::stack_weight)
        .filter(|w| w.is_finite() && *w > 0.0)
        .collect();
    // Fixed summation order keeps the result independent of slot order.
    parts.sort_by(f64::total_cmp);
    let sum: f64 = parts.iter().sum();
    truncate_milli(sum.min(WEIGHT_LIMIT))
}

/// Truncate (never round up) to 3 decimal places.
pub fn truncate_milli(value: f64) -> f64 {
    (value * 1000.0).floor() / 1000.0
}

/// `None` when there is no usable capacity.
pub fn fill_percent(total: f64, capacity: Option<f64>) -> Option<f64> {
    match capacity {
        Some(max) if max > 0.0 => Some(total / max * 100.0),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSummary {
    pub total: f64,
    pub capacity: Option<f64>,
}

impl WeightSummary {
    pub fn percent(&self) -> Option<f64> {
        fill_percent(self.total, self.capacity)
    }

    /// Percent used by the fill bar, untruncated; absent capacity renders as empty.
    pub fn bar_percent(&self) -> f64 {
        self.percent().unwrap_or(0.0)
    }

    /// `"6/10kg"`, or `None` when uncapped.
    pub fn totals_line(&self) -> Option<String> {
        let max = self.capacity.filter(|m| *m > 0.0)?;
        Some(format!("{}/{}kg", grams_to_kg(self.total), grams_to_kg(max)))
    }

    /// `"60% full"`, or `None` when uncapped.
    pub fn percent_line(&self) -> Option<String> {
        self.percent().map(|p| format!("{}% full", p.trunc() as i64))
    }
}

/// Kilograms truncated to 3 decimals, without trailing zeros.
pub fn grams_to_kg(grams: f64) -> String {
    let kg = truncate_milli(grams / 1000.0);
    let text = format!("{:.3}", kg);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(slot: u32, weight: f64, count: u32) -> Slot {
        Slot::with_item(slot, SlotItem::new(format!("item_{slot}"), count, weight))
    }

    #[test]
    fn capacity_scenario() {
        let mut inv = Inventory::new("p", InventoryKind::Player, "Player");
        inv.max_weight = Some(10000.0);
        inv.slots = vec![stack(1, 2000.0, 3), Slot::empty(2)];
        let w = inv.weight();
        assert_eq!(w.total, 6000.0);
        assert_eq!(w.percent(), Some(60.0));
        assert_eq!(w.totals_line().as_deref(), Some("6/10kg"));
        assert_eq!(w.percent_line().as_deref(), Some("60% full"));
    }

    #[test]
    fn total_is_truncated_not_rounded() {
        let slots = vec![stack(1, 0.0019, 1), stack(2, 1.0, 1)];
        assert_eq!(total_weight(&slots), 1.001);
        assert_eq!(truncate_milli(2.9999), 2.999);
    }

    #[test]
    fn total_ignores_slot_order() {
        let slots = vec![
            stack(1, 0.1, 3),
            stack(2, 1234.567, 7),
            stack(3, 0.2, 1),
            stack(4, 99.999, 13),
            stack(5, 0.3, 11),
        ];
        let forward = total_weight(&slots);
        let mut reversed = slots.clone();
        reversed.reverse();
        let mut rotated = slots.clone();
        rotated.rotate_left(2);
        assert_eq!(forward, total_weight(&reversed));
        assert_eq!(forward, total_weight(&rotated));
        assert_eq!(forward, total_weight(&slots));
    }

    #[test]
    fn total_is_clamped_and_skips_bad_values() {
        let slots = vec![stack(1, f64::NAN, 1), stack(2, -5.0, 2), stack(3, 1.0e11, 50)];
        assert_eq!(total_weight(&slots), WEIGHT_LIMIT);
    }

    #[test]
    fn uncapped_inventory_has_no_percent() {
        let mut inv = Inventory::new("s", InventoryKind::Shop, "Shop");
        inv.slots = vec![stack(1, 500.0, 2)];
        let w = inv.weight();
        assert_eq!(w.percent(), None);
        assert_eq!(w.bar_percent(), 0.0);
        assert_eq!(w.totals_line(), None);
        assert_eq!(fill_percent(10.0, Some(0.0)), None);
    }

    #[test]
    fn bar_keeps_fractional_percent() {
        use crate::ui::weight_bar::{bar_visible, bar_width};

        let light = WeightSummary { total: 50.0, capacity: Some(10000.0) };
        assert!((light.bar_percent() - 0.5).abs() < 1e-9);
        assert!(bar_visible(light.bar_percent()));
        assert_eq!(light.percent_line().as_deref(), Some("0% full"));

        let heavy = WeightSummary { total: 6070.0, capacity: Some(10000.0) };
        assert!((bar_width(heavy.bar_percent()) - 60.7).abs() < 1e-4);
        assert_eq!(heavy.percent_line().as_deref(), Some("60% full"));
    }

    #[test]
    fn percent_line_truncates() {
        let w = WeightSummary { total: 2999.0, capacity: Some(4000.0) };
        assert_eq!(w.percent_line().as_deref(), Some("74% full"));
    }

    #[test]
    fn kg_formatting_truncates() {
        assert_eq!(grams_to_kg(1234.5678), "1.234");
        assert_eq!(grams_to_kg(2500.0), "2.5");
        assert_eq!(grams_to_kg(0.0), "0");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut inv = Inventory::new("c", InventoryKind::Container, "Box");
        inv.slots = vec![stack(1, 1.0, 1), stack(2, 1.0, 1), stack(1, 9.0, 9)];
        assert_eq!(inv.dedup_slots(), vec![1]);
        assert_eq!(inv.slots.len(), 2);
        assert_eq!(inv.slots[0].item.as_ref().unwrap().weight, 1.0);
    }

    #[test]
    fn unknown_kind_tag_maps_to_other() {
        let inv: Inventory = serde_json::from_str(
            r#"{ "id": "x", "type": "newtype", "label": "Drop", "slots": [] }"#,
        )
        .unwrap();
        assert_eq!(inv.kind, InventoryKind::Other);
        assert_eq!(inv.max_weight, None);
    }
}
