use bevy::input::mouse::{AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy::ui::{FocusPolicy, UiGlobalTransform};

use crate::host::SlotRef;
use crate::inventory::catalog::ItemCatalog;
use crate::inventory::inventory::{Inventory, InventoryKind, Slot};
use crate::inventory::InventoryStore;
use super::common::*;
use super::drag::DragService;
use super::paging::{visible_fraction, PagedSlotFeed, SentinelSensor, SentinelSlot};
use super::weight_bar::{spawn_weight_bar, BarMode, WeightBar};

/// Rows of slots visible before scrolling.
pub const VISIBLE_ROWS: f32 = 4.0;
pub const PANEL_PADDING: f32 = 12.0;
/// Pixels scrolled per wheel line.
const SCROLL_LINE_PX: f32 = 24.0;

pub fn panel_width() -> f32 {
    GRID_COLUMNS as f32 * SLOT_SIZE + (GRID_COLUMNS as f32 - 1.0) * SLOT_GAP + PANEL_PADDING * 2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindIcon {
    Person,
    Cart,
    Wrench,
    Folder,
}

impl KindIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Person => "@",
            Self::Cart => "$",
            Self::Wrench => "%",
            Self::Folder => "#",
        }
    }
}

/// Header metadata for one inventory panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindDisplay {
    pub icon: KindIcon,
    pub title: String,
    pub subtitle: &'static str,
}

impl InventoryKind {
    pub fn display(self, label: &str) -> KindDisplay {
        let (icon, title, subtitle) = match self {
            Self::Player => (KindIcon::Person, "POCKETS", "Items on your character"),
            Self::Shop => (KindIcon::Cart, "SHOP", "Purchase items"),
            Self::Crafting => (KindIcon::Wrench, "CRAFTING", "Craft new items"),
            Self::Container => (KindIcon::Folder, "CONTAINER", "Container storage"),
            Self::Stash => (KindIcon::Folder, "STASH", "Personal storage"),
            Self::Trunk => (KindIcon::Folder, "TRUNK", "Vehicle trunk"),
            Self::Glovebox => (KindIcon::Folder, "GLOVEBOX", "Vehicle glovebox"),
            Self::Other => {
                let title = if label.is_empty() { "STORAGE".to_string() } else { label.to_uppercase() };
                return KindDisplay { icon: KindIcon::Folder, title, subtitle: "Storage container" };
            }
        };
        KindDisplay { icon, title: title.to_string(), subtitle }
    }
}

#[derive(Component)]
pub(crate) struct GridRoot;

#[derive(Component)]
pub(crate) struct GridPanel {
    inventory: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PanelField {
    Icon,
    Title,
    Subtitle,
    Totals,
    Percent,
}

#[derive(Component)]
pub(crate) struct PanelText {
    inventory: String,
    field: PanelField,
}

/// Column holding the totals and percent lines; hidden for uncapped inventories.
#[derive(Component)]
pub(crate) struct PanelWeightBlock(String);

#[derive(Component)]
pub(crate) struct PanelBar(String);

#[derive(Component)]
pub(crate) struct GridSlotContainer {
    inventory: String,
}

/// Slots the container last rendered, so unrelated store changes (busy, other panels)
/// leave the slot entities and their hover state alone.
#[derive(Component, Debug, Default)]
pub(crate) struct RenderedSlots(Option<Vec<Slot>>);

impl RenderedSlots {
    pub fn is_stale(&self, slots: &[Slot]) -> bool {
        self.0.as_deref() != Some(slots)
    }

    pub fn record(&mut self, slots: &[Slot]) {
        self.0 = Some(slots.to_vec());
    }
}

/// A rendered slot and the address reported in gestures.
#[derive(Component, Debug, Clone)]
pub struct GridSlot {
    pub slot: SlotRef,
    pub occupied: bool,
}

/// Transparent input blocker shown while the store is busy.
#[derive(Component)]
pub(crate) struct BusyOverlay;

fn panel_text(inv: &Inventory, field: PanelField) -> String {
    let display = inv.kind.display(&inv.label);
    let weight = inv.weight();
    match field {
        PanelField::Icon => display.icon.glyph().to_string(),
        PanelField::Title => display.title,
        PanelField::Subtitle => display.subtitle.to_string(),
        PanelField::Totals => weight.totals_line().unwrap_or_default(),
        PanelField::Percent => weight.percent_line().unwrap_or_default(),
    }
}

fn weight_block_display(inv: &Inventory) -> Display {
    if inv.weight().totals_line().is_some() {
        Display::Flex
    } else {
        Display::None
    }
}

pub fn spawn_grid_root(mut commands: Commands) {
    commands.spawn((
        GridRoot,
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            column_gap: Val::Px(24.0),
            ..default()
        },
    ));
}

/// Spawn panels for new inventories and despawn panels whose inventory was closed.
pub fn sync_grid_panels(
    mut commands: Commands,
    store: Res<InventoryStore>,
    root_q: Query<Entity, With<GridRoot>>,
    panels: Query<(Entity, &GridPanel)>,
) {
    if !store.is_changed() {
        return;
    }
    let Ok(root) = root_q.single() else {
        return;
    };

    for (entity, panel) in &panels {
        if store.get(&panel.inventory).is_none() {
            debug!("Closing panel for {}", panel.inventory);
            commands.entity(entity).despawn();
        }
    }

    for inv in &store.inventories {
        if panels.iter().any(|(_, p)| p.inventory == inv.id) {
            continue;
        }
        let panel = spawn_panel(&mut commands, inv);
        commands.entity(root).add_child(panel);
    }
}

fn spawn_panel(commands: &mut Commands, inv: &Inventory) -> Entity {
    let id = inv.id.clone();
    let text = |field: PanelField| PanelText { inventory: id.clone(), field };
    let viewport_height = VISIBLE_ROWS * SLOT_SIZE + (VISIBLE_ROWS - 1.0) * SLOT_GAP;

    commands
        .spawn((
            GridPanel { inventory: id.clone() },
            Node {
                width: Val::Px(panel_width()),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(PANEL_PADDING)),
                row_gap: Val::Px(8.0),
                ..default()
            },
            BackgroundColor(PANEL_COLOR),
        ))
        .with_children(|panel| {
            // Header
            panel
                .spawn(Node {
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::Center,
                    ..default()
                })
                .with_children(|header| {
                    header
                        .spawn(Node {
                            align_items: AlignItems::Center,
                            column_gap: Val::Px(12.0),
                            ..default()
                        })
                        .with_children(|left| {
                            left.spawn((
                                text(PanelField::Icon),
                                Text::new(panel_text(inv, PanelField::Icon)),
                                TextFont { font_size: 22.0, ..default() },
                                TextColor(ACCENT_COLOR),
                            ));
                            left.spawn(Node { flex_direction: FlexDirection::Column, ..default() })
                                .with_children(|titles| {
                                    titles.spawn((
                                        text(PanelField::Title),
                                        Text::new(panel_text(inv, PanelField::Title)),
                                        TextFont { font_size: 16.0, ..default() },
                                        TextColor(Color::WHITE),
                                    ));
                                    titles.spawn((
                                        text(PanelField::Subtitle),
                                        Text::new(panel_text(inv, PanelField::Subtitle)),
                                        TextFont { font_size: 12.0, ..default() },
                                        TextColor(MUTED_TEXT),
                                    ));
                                });
                        });
                    header
                        .spawn((
                            PanelWeightBlock(id.clone()),
                            Node {
                                display: weight_block_display(inv),
                                flex_direction: FlexDirection::Column,
                                align_items: AlignItems::End,
                                ..default()
                            },
                        ))
                        .with_children(|weights| {
                            weights.spawn((
                                text(PanelField::Totals),
                                Text::new(panel_text(inv, PanelField::Totals)),
                                TextFont { font_size: 14.0, ..default() },
                                TextColor(Color::WHITE),
                            ));
                            weights.spawn((
                                text(PanelField::Percent),
                                Text::new(panel_text(inv, PanelField::Percent)),
                                TextFont { font_size: 12.0, ..default() },
                                TextColor(MUTED_TEXT),
                            ));
                        });
                });

            spawn_weight_bar(panel, inv.weight().bar_percent(), BarMode::Fill, 4.0);

            panel.spawn((
                GridSlotContainer { inventory: id.clone() },
                PagedSlotFeed::default(),
                SentinelSensor::default(),
                RenderedSlots::default(),
                ScrollPosition::default(),
                Node {
                    height: Val::Px(viewport_height),
                    flex_wrap: FlexWrap::Wrap,
                    align_content: AlignContent::FlexStart,
                    column_gap: Val::Px(SLOT_GAP),
                    row_gap: Val::Px(SLOT_GAP),
                    overflow: Overflow::scroll_y(),
                    ..default()
                },
            ));

            panel.spawn((
                BusyOverlay,
                Node {
                    display: Display::None,
                    position_type: PositionType::Absolute,
                    left: Val::Px(0.0),
                    top: Val::Px(0.0),
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                FocusPolicy::Block,
                ZIndex(10),
            ));
        })
        .id()
}

/// Tag the panel's fill bar once it exists; `spawn_weight_bar` does not know about panels.
pub fn tag_panel_bars(
    mut commands: Commands,
    panels: Query<(&GridPanel, &Children), Added<GridPanel>>,
    bars: Query<(), (With<WeightBar>, Without<PanelBar>)>,
) {
    for (panel, children) in &panels {
        for child in children.iter() {
            if bars.contains(child) {
                commands.entity(child).insert(PanelBar(panel.inventory.clone()));
            }
        }
    }
}

/// Refresh header texts, weight visibility and the fill bar after store changes.
pub fn refresh_grid_headers(
    store: Res<InventoryStore>,
    mut texts: Query<(&PanelText, &mut Text)>,
    mut blocks: Query<(&PanelWeightBlock, &mut Node)>,
    mut bars: Query<(&PanelBar, &mut WeightBar)>,
) {
    if !store.is_changed() {
        return;
    }
    for (marker, mut text) in &mut texts {
        if let Some(inv) = store.get(&marker.inventory) {
            let wanted = panel_text(inv, marker.field);
            if text.0 != wanted {
                text.0 = wanted;
            }
        }
    }
    for (block, mut node) in &mut blocks {
        if let Some(inv) = store.get(&block.0) {
            node.display = weight_block_display(inv);
        }
    }
    for (tag, mut bar) in &mut bars {
        if let Some(inv) = store.get(&tag.0) {
            bar.percent = inv.weight().bar_percent();
        }
    }
}

/// Rebuild the rendered slot prefix when the inventory's slots, the catalog or the page change.
pub fn refresh_grid_slots(
    mut commands: Commands,
    store: Res<InventoryStore>,
    catalog: Res<ItemCatalog>,
    mut containers: Query<(
        Entity,
        &GridSlotContainer,
        Ref<PagedSlotFeed>,
        &mut SentinelSensor,
        &mut RenderedSlots,
    )>,
) {
    for (entity, container, feed, mut sensor, mut rendered) in &mut containers {
        if !(store.is_changed() || catalog.is_changed() || feed.is_changed()) {
            continue;
        }
        let Some(inv) = store.get(&container.inventory) else {
            continue;
        };
        if !(catalog.is_changed() || feed.is_changed() || rendered.is_stale(&inv.slots)) {
            continue;
        }
        rendered.record(&inv.slots);
        let len = inv.slots.len();
        let sentinel = feed.sentinel_index(len);
        sensor.retarget(sentinel);

        let mut container_cmds = commands.entity(entity);
        container_cmds.despawn_related::<Children>();
        container_cmds.with_children(|grid| {
            for (index, slot) in inv.slots[..feed.visible_len(len)].iter().enumerate() {
                let mut slot_cmds = grid.spawn((
                    GridSlot {
                        slot: SlotRef { inventory: inv.id.clone(), kind: inv.kind, slot: slot.slot },
                        occupied: slot.item.is_some(),
                    },
                    Node {
                        width: Val::Px(SLOT_SIZE),
                        height: Val::Px(SLOT_SIZE),
                        border: UiRect::all(Val::Px(BORDER_WIDTH)),
                        padding: UiRect::all(Val::Px(3.0)),
                        flex_direction: FlexDirection::Column,
                        overflow: Overflow::clip(),
                        ..default()
                    },
                    slot_bg(slot.item.as_ref()),
                    BorderColor::all(SLOT_BORDER_COLOR),
                    Interaction::default(),
                ));
                if Some(index) == sentinel {
                    slot_cmds.insert(SentinelSlot);
                }
                slot_cmds.with_children(|face| spawn_slot_contents(face, slot, &catalog));
            }
        });
    }
}

/// Advance a feed when its sentinel slot scrolls at least halfway into view.
pub fn sense_sentinels(
    store: Res<InventoryStore>,
    mut containers: Query<(
        &GridSlotContainer,
        &mut PagedSlotFeed,
        &mut SentinelSensor,
        &ComputedNode,
        &UiGlobalTransform,
        &Children,
    )>,
    sentinels: Query<(&ComputedNode, &UiGlobalTransform), With<SentinelSlot>>,
) {
    for (container, mut feed, mut sensor, node, transform, children) in &mut containers {
        let Some(inv) = store.get(&container.inventory) else {
            continue;
        };
        let Some((slot_node, slot_transform)) = children.iter().find_map(|child| sentinels.get(child).ok()) else {
            continue;
        };
        let fraction = (slot_node.size() != Vec2::ZERO)
            .then(|| visible_fraction(node_rect(slot_node, slot_transform), node_rect(node, transform)));
        if sensor.sample(fraction) && feed.observe(inv.slots.len(), true) {
            debug!("{} paged to {}", inv.id, feed.page());
        }
    }
}

pub fn scroll_grids(
    scroll: Res<AccumulatedMouseScroll>,
    store: Res<InventoryStore>,
    drag: Res<DragService>,
    mut containers: Query<(&mut ScrollPosition, &ComputedNode, &UiGlobalTransform), With<GridSlotContainer>>,
) {
    if store.busy || scroll.delta.y == 0.0 {
        return;
    }
    let Some(pointer) = drag.pointer else {
        return;
    };
    let dy = match scroll.unit {
        MouseScrollUnit::Line => scroll.delta.y * SCROLL_LINE_PX,
        MouseScrollUnit::Pixel => scroll.delta.y,
    };
    for (mut position, node, transform) in &mut containers {
        if node_rect(node, transform).contains(pointer * drag.scale_factor) {
            position.y = (position.y - dy).max(0.0);
        }
    }
}

/// The overlay only takes part in layout while busy; it draws nothing either way.
pub fn busy_overlay_display(busy: bool) -> Display {
    if busy { Display::Flex } else { Display::None }
}

pub fn update_busy_overlays(store: Res<InventoryStore>, mut overlays: Query<&mut Node, With<BusyOverlay>>) {
    if !store.is_changed() {
        return;
    }
    let display = busy_overlay_display(store.busy);
    for mut node in &mut overlays {
        if node.display != display {
            node.display = display;
        }
    }
}

pub fn grid_slot_hover(mut slots: Query<(&Interaction, &mut BorderColor), (Changed<Interaction>, With<GridSlot>)>) {
    for (interaction, mut border) in &mut slots {
        *border = match interaction {
            Interaction::Hovered | Interaction::Pressed => BorderColor::all(ACCENT_COLOR),
            Interaction::None => BorderColor::all(SLOT_BORDER_COLOR),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::item::SlotItem;

    #[test]
    fn known_kinds_have_fixed_headers() {
        let player = InventoryKind::Player.display("Bob");
        assert_eq!(player.title, "POCKETS");
        assert_eq!(player.subtitle, "Items on your character");
        assert_eq!(player.icon, KindIcon::Person);
        assert_eq!(InventoryKind::Shop.display("").icon, KindIcon::Cart);
        assert_eq!(InventoryKind::Crafting.display("").subtitle, "Craft new items");
        assert_eq!(InventoryKind::Glovebox.display("x").title, "GLOVEBOX");
    }

    #[test]
    fn other_kinds_fall_back_to_label() {
        let other = InventoryKind::Other.display("Evidence Locker");
        assert_eq!(other.title, "EVIDENCE LOCKER");
        assert_eq!(other.subtitle, "Storage container");
        assert_eq!(InventoryKind::Other.display("").title, "STORAGE");
    }

    #[test]
    fn header_texts_follow_capacity() {
        let mut inv = Inventory::new("trunk:1", InventoryKind::Trunk, "Trunk");
        inv.slots = vec![Slot::with_item(1, SlotItem::new("steel", 3, 2000.0))];
        assert_eq!(panel_text(&inv, PanelField::Totals), "");
        assert_eq!(weight_block_display(&inv), Display::None);

        inv.max_weight = Some(10000.0);
        assert_eq!(panel_text(&inv, PanelField::Totals), "6/10kg");
        assert_eq!(panel_text(&inv, PanelField::Percent), "60% full");
        assert_eq!(weight_block_display(&inv), Display::Flex);
    }

    #[test]
    fn rendered_slots_ignore_busy_toggles() {
        let mut store = InventoryStore::default();
        let mut inv = Inventory::new("player", InventoryKind::Player, "Pockets");
        inv.slots = vec![Slot::with_item(1, SlotItem::new("water", 2, 500.0)), Slot::empty(2)];
        store.replace_all(vec![inv]);

        let mut rendered = RenderedSlots::default();
        assert!(rendered.is_stale(&store.inventories[0].slots));
        rendered.record(&store.inventories[0].slots);

        store.busy = true;
        assert!(!rendered.is_stale(&store.inventories[0].slots));

        let mut moved = store.inventories[0].clone();
        moved.slots.swap(0, 1);
        store.upsert(moved);
        assert!(rendered.is_stale(&store.inventories[0].slots));
    }

    #[test]
    fn busy_overlay_only_joins_layout_while_busy() {
        assert_eq!(busy_overlay_display(true), Display::Flex);
        assert_eq!(busy_overlay_display(false), Display::None);
    }
}
