use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;
use bevy::ui::FocusPolicy;
use bevy::window::PrimaryWindow;

use crate::config::{AdditionalMetadataField, HudConfig};
use crate::host::SlotRef;
use crate::inventory::catalog::ItemCatalog;
use crate::inventory::inventory::InventoryKind;
use crate::inventory::item::SlotItem;
use crate::inventory::InventoryStore;
use crate::locale::Locale;
use super::common::{spawn_divider, ACCENT_COLOR, MUTED_TEXT, PANEL_COLOR};
use super::drag::DragService;
use super::grid::GridSlot;

/// Craft time shown when a recipe does not carry one, in milliseconds.
pub const DEFAULT_CRAFT_MS: u64 = 3000;
pub const TOOLTIP_WIDTH: f32 = 260.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RarityTier {
    Rare,
    Epic,
    Legendary,
    Default,
}

impl RarityTier {
    pub fn from_rarity(rarity: Option<&str>) -> Self {
        match rarity {
            Some("rare") => Self::Rare,
            Some("epic") => Self::Epic,
            Some("legendary") => Self::Legendary,
            _ => Self::Default,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Rare => Color::srgb_u8(0xff, 0xd7, 0x00),
            Self::Epic => Color::srgb_u8(0x8a, 0x2b, 0xe2),
            Self::Legendary => Color::srgb_u8(0xff, 0x8c, 0x00),
            Self::Default => Color::srgb_u8(0xff, 0x00, 0x00),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderNote {
    /// Crafting: seconds to craft, e.g. `"4.5s"`.
    Duration(String),
    /// Everywhere else: the metadata `type`, if any.
    Kind(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipRow {
    Field { label: String, value: String, monospace: bool },
    Components { label: String, names: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipDetails {
    Rows(Vec<TooltipRow>),
    Ingredients { heading: String, lines: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnownTooltip {
    pub title: String,
    pub rarity: RarityTier,
    pub rarity_caption: Option<String>,
    pub note: HeaderNote,
    pub description: Option<String>,
    pub details: TooltipDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipContent {
    /// No catalog entry: the raw name and a marker, nothing else.
    Unknown { name: String, marker: String },
    Known(KnownTooltip),
}

/// Plain number text without float noise (`0.1 * 100` prints as `10`).
fn quantity_text(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    format!("{}", rounded)
}

/// Recipe notation: `"5x Scrap"` for whole amounts, bare label for zero,
/// `"50% Steel"` for a partial consumption.
pub fn format_ingredient(quantity: f64, label: &str) -> String {
    if quantity >= 1.0 {
        format!("{}x {}", quantity_text(quantity), label)
    } else if quantity == 0.0 {
        label.to_string()
    } else {
        format!("{}% {}", quantity_text(quantity * 100.0), label)
    }
}

fn field(label: &str, value: String) -> TooltipRow {
    TooltipRow::Field { label: label.to_string(), value, monospace: false }
}

pub fn resolve_tooltip(
    item: &SlotItem,
    kind: InventoryKind,
    catalog: &ItemCatalog,
    locale: &Locale,
    additional_metadata: &[AdditionalMetadataField],
) -> TooltipContent {
    let Some(entry) = catalog.get(&item.name) else {
        return TooltipContent::Unknown {
            name: item.name.clone(),
            marker: locale.get("ui_unknown_item").to_string(),
        };
    };
    let meta = item.meta();

    let title = meta
        .and_then(|m| m.label())
        .or(Some(entry.label.as_str()).filter(|l| !l.is_empty()))
        .unwrap_or(item.name.as_str())
        .to_string();
    let rarity_name = meta.and_then(|m| m.rarity());
    let description = meta
        .and_then(|m| m.description())
        .or(entry.description.as_deref().filter(|d| !d.is_empty()))
        .map(str::to_string);

    let (note, details) = if kind == InventoryKind::Crafting {
        let ms = item.duration.unwrap_or(DEFAULT_CRAFT_MS);
        let note = HeaderNote::Duration(format!("{}s", quantity_text(ms as f64 / 1000.0)));

        let mut ingredients: Vec<(&String, f64)> = item
            .ingredients
            .iter()
            .flatten()
            .map(|(name, qty)| (name, *qty))
            .collect();
        ingredients.sort_by(|a, b| a.1.total_cmp(&b.1));
        let lines = ingredients
            .into_iter()
            .map(|(name, qty)| format_ingredient(qty, catalog.label_or_name(name)))
            .collect();
        (
            note,
            TooltipDetails::Ingredients { heading: locale.get("ui_required_materials").to_string(), lines },
        )
    } else {
        let mut rows = Vec::new();
        if let Some(durability) = item.durability {
            rows.push(field(locale.get("ui_durability"), format!("{}%", durability.trunc() as i64)));
        }
        if let Some(meta) = meta {
            if let Some(ammo) = meta.ammo() {
                rows.push(field(locale.get("ui_ammo"), ammo));
            }
        }
        let ammo_label = entry
            .ammo_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .and_then(|name| catalog.get(name))
            .map(|ammo| ammo.label.clone())
            .filter(|label| !label.is_empty());
        if let Some(ammo_label) = ammo_label {
            rows.push(field(locale.get("ammo_type"), ammo_label));
        }
        if let Some(meta) = meta {
            if let Some(serial) = meta.serial() {
                rows.push(TooltipRow::Field {
                    label: locale.get("ui_serial").to_string(),
                    value: serial,
                    monospace: true,
                });
            }
            if let Some(components) = meta.components() {
                rows.push(TooltipRow::Components {
                    label: locale.get("ui_components").to_string(),
                    names: components.into_iter().map(|c| catalog.label_or_name(c).to_string()).collect(),
                });
            }
            if let Some(tint) = meta.weapon_tint() {
                rows.push(field(locale.get("ui_tint"), tint));
            }
            for extra in additional_metadata {
                if let Some(value) = meta.display_value(&extra.metadata) {
                    rows.push(field(&extra.value, value));
                }
            }
        }
        (HeaderNote::Kind(meta.and_then(|m| m.item_type()).map(str::to_string)), TooltipDetails::Rows(rows))
    };

    TooltipContent::Known(KnownTooltip {
        title,
        rarity: RarityTier::from_rarity(rarity_name),
        rarity_caption: rarity_name.map(str::to_uppercase),
        note,
        description,
        details,
    })
}

/// Top-left for a tooltip of `size` near `pointer`, flipped to the other side of the
/// pointer on any axis where it would leave the window.
pub fn place_tooltip(pointer: Vec2, size: Vec2, window: Vec2, offset: f32) -> Vec2 {
    let mut pos = pointer + Vec2::splat(offset);
    if pos.x + size.x > window.x {
        pos.x = pointer.x - offset - size.x;
    }
    if pos.y + size.y > window.y {
        pos.y = pointer.y - offset - size.y;
    }
    pos.max(Vec2::ZERO)
}

/// Slot under the pointer whose tooltip is shown.
#[derive(Resource, Debug, Default)]
pub struct TooltipState {
    pub hovered: Option<SlotRef>,
}

#[derive(Component)]
pub(crate) struct TooltipRoot;

pub fn track_tooltip_hover(
    drag: Res<DragService>,
    slots: Query<(&Interaction, &GridSlot)>,
    mut state: ResMut<TooltipState>,
) {
    let hovered = if drag.is_dragging() {
        None
    } else {
        slots
            .iter()
            .find(|(interaction, slot)| **interaction == Interaction::Hovered && slot.occupied)
            .map(|(_, slot)| slot.slot.clone())
    };
    if state.hovered != hovered {
        state.hovered = hovered;
    }
}

fn label_text(text: impl Into<String>, size: f32, color: Color) -> (Text, TextFont, TextColor) {
    (Text::new(text), TextFont { font_size: size, ..default() }, TextColor(color))
}

fn spawn_row(parent: &mut ChildSpawnerCommands, label: &str, value: &str, monospace: bool) {
    parent
        .spawn(Node {
            justify_content: JustifyContent::SpaceBetween,
            align_items: AlignItems::Center,
            ..default()
        })
        .with_children(|row| {
            row.spawn(label_text(format!("{}:", label), 12.0, Color::srgb(0.8, 0.8, 0.8)));
            row.spawn(label_text(value, if monospace { 10.0 } else { 12.0 }, ACCENT_COLOR));
        });
}

fn spawn_tooltip_body(parent: &mut ChildSpawnerCommands, content: &TooltipContent) {
    match content {
        TooltipContent::Unknown { name, marker } => {
            parent.spawn(label_text(name.as_str(), 14.0, Color::WHITE));
            spawn_divider(parent);
            parent.spawn(label_text(marker.as_str(), 12.0, Color::srgb_u8(0xff, 0x66, 0x66)));
        }
        TooltipContent::Known(tip) => {
            parent
                .spawn(Node {
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::Start,
                    ..default()
                })
                .with_children(|header| {
                    header
                        .spawn(Node { flex_direction: FlexDirection::Column, ..default() })
                        .with_children(|titles| {
                            titles.spawn(label_text(tip.title.as_str(), 14.0, tip.rarity.color()));
                            if let Some(caption) = &tip.rarity_caption {
                                titles.spawn(label_text(caption.as_str(), 10.0, tip.rarity.color()));
                            }
                        });
                    let note = match &tip.note {
                        HeaderNote::Duration(secs) => secs.clone(),
                        HeaderNote::Kind(kind) => kind.clone().unwrap_or_default(),
                    };
                    header.spawn(label_text(note, 12.0, MUTED_TEXT));
                });

            spawn_divider(parent);

            if let Some(description) = &tip.description {
                parent.spawn(label_text(description.as_str(), 12.0, Color::WHITE));
            }

            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(8.0),
                    margin: UiRect::top(Val::Px(12.0)),
                    ..default()
                })
                .with_children(|body| match &tip.details {
                    TooltipDetails::Rows(rows) => {
                        for row in rows {
                            match row {
                                TooltipRow::Field { label, value, monospace } => {
                                    spawn_row(body, label, value, *monospace);
                                }
                                TooltipRow::Components { label, names } => {
                                    body.spawn(label_text(format!("{}:", label), 12.0, Color::srgb(0.8, 0.8, 0.8)));
                                    body.spawn(Node {
                                        flex_wrap: FlexWrap::Wrap,
                                        column_gap: Val::Px(4.0),
                                        row_gap: Val::Px(4.0),
                                        ..default()
                                    })
                                    .with_children(|chips| {
                                        for name in names {
                                            chips
                                                .spawn((
                                                    Node {
                                                        padding: UiRect::axes(Val::Px(6.0), Val::Px(2.0)),
                                                        border: UiRect::all(Val::Px(1.0)),
                                                        ..default()
                                                    },
                                                    BackgroundColor(ACCENT_COLOR.with_alpha(0.2)),
                                                    BorderColor::all(ACCENT_COLOR.with_alpha(0.3)),
                                                ))
                                                .with_children(|chip| {
                                                    chip.spawn(label_text(
                                                        name.as_str(),
                                                        10.0,
                                                        Color::srgb_u8(0xff, 0x66, 0x66),
                                                    ));
                                                });
                                        }
                                    });
                                }
                            }
                        }
                    }
                    TooltipDetails::Ingredients { heading, lines } => {
                        body.spawn(label_text(
                            format!("{}:", heading.to_uppercase()),
                            12.0,
                            Color::srgb(0.8, 0.8, 0.8),
                        ));
                        for line in lines {
                            body.spawn(label_text(line.as_str(), 12.0, Color::WHITE));
                        }
                    }
                });
        }
    }
}

/// Rebuild the tooltip when the hovered slot or any of its inputs change.
pub fn render_tooltip(
    mut commands: Commands,
    state: Res<TooltipState>,
    store: Res<InventoryStore>,
    catalog: Res<ItemCatalog>,
    locale: Res<Locale>,
    mut shown: Local<Option<TooltipContent>>,
    roots: Query<Entity, With<TooltipRoot>>,
) {
    if !(state.is_changed() || store.is_changed() || catalog.is_changed() || locale.is_changed()) {
        return;
    }
    let content = state.hovered.as_ref().and_then(|slot_ref| {
        let inv = store.get(&slot_ref.inventory)?;
        let item = inv.slots.iter().find(|s| s.slot == slot_ref.slot)?.item.as_ref()?;
        Some(resolve_tooltip(item, inv.kind, &catalog, &locale, &store.additional_metadata))
    });
    // Same content for the same slot: keep the laid-out tooltip in place.
    if !state.is_changed() && *shown == content {
        return;
    }
    for entity in &roots {
        commands.entity(entity).despawn();
    }
    *shown = content.clone();
    let Some(content) = content else {
        return;
    };

    commands
        .spawn((
            TooltipRoot,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Px(TOOLTIP_WIDTH),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(12.0)),
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BackgroundColor(PANEL_COLOR),
            BorderColor::all(ACCENT_COLOR.with_alpha(0.4)),
            FocusPolicy::Pass,
            GlobalZIndex(200),
            Visibility::Hidden,
        ))
        .with_children(|tooltip| spawn_tooltip_body(tooltip, &content));
}

pub fn position_tooltip(
    drag: Res<DragService>,
    config: Res<HudConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut roots: Query<(&mut Node, &ComputedNode, &mut Visibility), With<TooltipRoot>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let window_size = Vec2::new(window.width(), window.height());
    for (mut node, computed, mut vis) in &mut roots {
        let size = computed.size() * computed.inverse_scale_factor();
        let Some(pointer) = drag.pointer else {
            *vis = Visibility::Hidden;
            continue;
        };
        let pos = place_tooltip(pointer, size, window_size, config.tooltip_offset);
        node.left = Val::Px(pos.x);
        node.top = Val::Px(pos.y);
        // Wait for the first layout so it never flashes at the wrong spot.
        *vis = if size.y > 0.0 { Visibility::Visible } else { Visibility::Hidden };
    }
}
