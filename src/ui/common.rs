use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;
use bevy::ui::UiGlobalTransform;

use crate::inventory::catalog::ItemCatalog;
use crate::inventory::inventory::Slot;
use crate::inventory::item::SlotItem;
use super::weight_bar::{spawn_weight_bar, BarMode};

pub const SLOT_SIZE: f32 = 72.0;
pub const SLOT_GAP: f32 = 4.0;
pub const BORDER_WIDTH: f32 = 1.0;
pub const ICON_SIZE: f32 = 24.0;
pub const GRID_COLUMNS: usize = 5;
pub const EMPTY_SLOT_COLOR: Color = Color::srgba(0.15, 0.15, 0.15, 0.8);
pub const SLOT_BORDER_COLOR: Color = Color::srgba(0.5, 0.5, 0.5, 0.35);
pub const PANEL_COLOR: Color = Color::srgba(0.05, 0.05, 0.05, 0.92);
pub const ACCENT_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);
pub const MUTED_TEXT: Color = Color::srgb(0.533, 0.533, 0.533);

/// Insert `,` between groups of three digits of an unsigned integer string.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// en-US number text with thousands separators and between `min_frac` and `max_frac` decimals.
pub fn format_number(value: f64, min_frac: usize, max_frac: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let fixed = format!("{:.*}", max_frac, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_frac {
        frac.push('0');
    }
    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, group_digits(int_part))
    } else {
        format!("{}{}.{}", sign, group_digits(int_part), frac)
    }
}

/// Stack weight caption for a slot: grams below one kilogram, kilograms above, empty for weightless stacks.
pub fn format_slot_weight(grams: f64) -> String {
    if grams.is_nan() || grams <= 0.0 {
        String::new()
    } else if grams >= 1000.0 {
        format!("{}kg", format_number(grams / 1000.0, 2, 3))
    } else {
        format!("{}g", format_number(grams, 0, 3))
    }
}

/// Count caption (shows nothing for a zero count).
pub fn format_count(count: u32) -> String {
    if count == 0 {
        String::new()
    } else {
        format!("{}x", group_digits(&count.to_string()))
    }
}

/// Label on the slot face: metadata label, then catalog label, then the raw name.
pub fn slot_label<'a>(item: &'a SlotItem, catalog: &'a ItemCatalog) -> &'a str {
    item.meta()
        .and_then(|m| m.label())
        .unwrap_or_else(|| catalog.label_or_name(&item.name))
}

/// Placeholder icon color until item images exist. Stable per item name.
pub fn placeholder_color(name: &str) -> Color {
    // FNV-1a
    let mut hash: u32 = 0x811c_9dc5;
    for byte in name.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    let hue = (hash % 360) as f32;
    Color::hsl(hue, 0.45, 0.45)
}

pub fn slot_bg(item: Option<&SlotItem>) -> BackgroundColor {
    match item {
        None => BackgroundColor(EMPTY_SLOT_COLOR),
        Some(_) => BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.85)),
    }
}

fn caption(text: impl Into<String>, size: f32, color: Color) -> (Text, TextFont, TextColor) {
    (
        Text::new(text),
        TextFont { font_size: size, ..default() },
        TextColor(color),
    )
}

/// Slot face: number and weight/count header, placeholder icon, durability bar, label.
pub fn spawn_slot_contents(parent: &mut ChildSpawnerCommands, slot: &Slot, catalog: &ItemCatalog) {
    let Some(item) = &slot.item else {
        return;
    };

    // Header row
    parent
        .spawn(Node {
            width: Val::Percent(100.0),
            justify_content: JustifyContent::SpaceBetween,
            ..default()
        })
        .with_children(|row| {
            row.spawn(caption(slot.slot.to_string(), 9.0, MUTED_TEXT));
            row.spawn(Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::End,
                ..default()
            })
            .with_children(|info| {
                info.spawn(caption(format_slot_weight(item.stack_weight()), 9.0, Color::WHITE));
                info.spawn(caption(format_count(item.count), 9.0, Color::WHITE));
            });
        });

    parent
        .spawn(Node {
            flex_grow: 1.0,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        })
        .with_children(|center| {
            center.spawn((
                Node {
                    width: Val::Px(ICON_SIZE),
                    height: Val::Px(ICON_SIZE),
                    ..default()
                },
                BackgroundColor(placeholder_color(&item.name)),
            ));
        });

    if let Some(durability) = item.durability {
        spawn_weight_bar(parent, durability, BarMode::Durability, 3.0);
    }

    parent
        .spawn((
            Node {
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                padding: UiRect::top(Val::Px(2.0)),
                overflow: Overflow::clip(),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.35)),
        ))
        .with_children(|label| {
            label.spawn(caption(slot_label(item, catalog), 10.0, Color::WHITE));
        });
}

/// Bounds of a laid-out node in physical pixels.
pub fn node_rect(node: &ComputedNode, transform: &UiGlobalTransform) -> Rect {
    Rect::from_center_size(transform.translation, node.size())
}

/// One-pixel accent rule between a header and its body.
pub fn spawn_divider(parent: &mut ChildSpawnerCommands) {
    parent.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Px(1.0),
            margin: UiRect::vertical(Val::Px(12.0)),
            ..default()
        },
        BackgroundColor(ACCENT_COLOR.with_alpha(0.6)),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::catalog::ItemCatalogEntry;

    #[test]
    fn slot_weight_switches_units_at_a_kilogram() {
        assert_eq!(format_slot_weight(0.0), "");
        assert_eq!(format_slot_weight(500.0), "500g");
        assert_eq!(format_slot_weight(999.5), "999.5g");
        assert_eq!(format_slot_weight(1000.0), "1.00kg");
        assert_eq!(format_slot_weight(1500.0), "1.50kg");
        assert_eq!(format_slot_weight(1234.0), "1.234kg");
        assert_eq!(format_slot_weight(2_345_600.0), "2,345.60kg");
    }

    #[test]
    fn counts_are_grouped() {
        assert_eq!(format_count(0), "");
        assert_eq!(format_count(3), "3x");
        assert_eq!(format_count(2450), "2,450x");
        assert_eq!(format_count(1_000_000), "1,000,000x");
    }

    #[test]
    fn number_formatting_trims_to_bounds() {
        assert_eq!(format_number(12.0, 0, 3), "12");
        assert_eq!(format_number(12.5, 2, 3), "12.50");
        assert_eq!(format_number(-1234.5, 0, 1), "-1,234.5");
        assert_eq!(format_number(f64::NAN, 0, 3), "");
    }

    #[test]
    fn label_prefers_metadata_then_catalog() {
        let catalog = ItemCatalog::from_entries([ItemCatalogEntry {
            name: "phone".into(),
            label: "Phone".into(),
            description: None,
            ammo_name: None,
        }]);
        let mut item = SlotItem::new("phone", 1, 190.0);
        assert_eq!(slot_label(&item, &catalog), "Phone");
        item.metadata = serde_json::from_value(serde_json::json!({ "label": "Burner" })).ok();
        assert_eq!(slot_label(&item, &catalog), "Burner");
        let unknown = SlotItem::new("ghost_item", 1, 0.0);
        assert_eq!(slot_label(&unknown, &catalog), "ghost_item");
    }

    #[test]
    fn placeholder_color_is_stable() {
        assert_eq!(placeholder_color("water"), placeholder_color("water"));
    }
}
