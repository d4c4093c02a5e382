use std::time::Duration;

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::host::HostEvent;
use crate::inventory::catalog::ItemCatalog;
use crate::inventory::InventoryStore;
use crate::locale::Locale;
use super::common::{slot_bg, spawn_slot_contents, ACCENT_COLOR, BORDER_WIDTH, SLOT_BORDER_COLOR, SLOT_GAP, SLOT_SIZE};

pub const HOTBAR_SLOTS: usize = 5;
/// Auto-hide delay after the hotbar is shown.
pub const HOTBAR_TIMEOUT_SECS: f32 = 3.0;
pub const SLIDE_SECS: f32 = 0.3;
const REST_BOTTOM: f32 = 24.0;
const HIDDEN_BOTTOM: f32 = -(SLOT_SIZE + 48.0);

/// Two-state visibility. The timer is owned by the shown state, so leaving it drops the
/// pending auto-hide and entering it always starts a fresh one.
#[derive(Resource, Debug, Default)]
pub enum HotbarVisibility {
    #[default]
    Hidden,
    Shown(Timer),
}

impl HotbarVisibility {
    pub fn is_shown(&self) -> bool {
        matches!(self, Self::Shown(_))
    }

    /// Hidden -> shown with a fresh timer; shown -> hidden, cancelling it.
    pub fn toggle(&mut self) {
        *self = match self {
            Self::Hidden => Self::Shown(Timer::from_seconds(HOTBAR_TIMEOUT_SECS, TimerMode::Once)),
            Self::Shown(_) => Self::Hidden,
        };
    }

    /// Advance the auto-hide timer. Returns true when it just hid the hotbar.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Self::Shown(timer) = self else {
            return false;
        };
        timer.tick(delta);
        if timer.just_finished() {
            *self = Self::Hidden;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        *self = Self::Hidden;
    }
}

/// Slide progress: 0 fully off-screen, 1 at rest.
pub fn slide_step(current: f32, shown: bool, dt: f32) -> f32 {
    let step = dt / SLIDE_SECS;
    if shown {
        (current + step).min(1.0)
    } else {
        (current - step).max(0.0)
    }
}

#[derive(Component, Default)]
pub(crate) struct HotbarRoot {
    progress: f32,
}

#[derive(Component)]
pub(crate) struct HotbarRow;

#[derive(Component)]
pub(crate) struct HotbarTitle;

pub fn spawn_hotbar(mut commands: Commands, locale: Res<Locale>) {
    let total_width = HOTBAR_SLOTS as f32 * SLOT_SIZE + (HOTBAR_SLOTS as f32 - 1.0) * SLOT_GAP;

    commands
        .spawn((
            HotbarRoot::default(),
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(HIDDEN_BOTTOM),
                left: Val::Percent(50.0),
                margin: UiRect {
                    left: Val::Px(-total_width / 2.0 - 70.0),
                    ..default()
                },
                display: Display::Flex,
                flex_direction: FlexDirection::Row,
                align_items: AlignItems::Center,
                ..default()
            },
            Visibility::Hidden,
            GlobalZIndex(50),
        ))
        .with_children(|parent| {
            parent.spawn((
                HotbarTitle,
                Text::new(format!("* {}", locale.get("ui_hotbar").to_uppercase())),
                TextColor(ACCENT_COLOR),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                Node {
                    margin: UiRect::right(Val::Px(20.0)),
                    ..default()
                },
            ));

            parent.spawn((
                HotbarRow,
                Node {
                    display: Display::Flex,
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(SLOT_GAP),
                    ..default()
                },
            ));
        });
}

pub fn toggle_hotbar(mut events: MessageReader<HostEvent>, mut visibility: ResMut<HotbarVisibility>) {
    for event in events.read() {
        if matches!(event, HostEvent::ToggleHotbar) {
            visibility.toggle();
            debug!("Hotbar shown: {}", visibility.is_shown());
        }
    }
}

pub fn tick_hotbar(time: Res<Time>, mut visibility: ResMut<HotbarVisibility>) {
    if !visibility.is_shown() {
        return;
    }
    if visibility.tick(time.delta()) {
        debug!("Hotbar auto-hidden");
    }
}

/// Drop any pending auto-hide once the hotbar has nothing to show.
pub fn teardown_hotbar(store: Res<InventoryStore>, mut visibility: ResMut<HotbarVisibility>) {
    if store.is_changed() && store.hotbar_source().is_none() && visibility.is_shown() {
        visibility.cancel();
    }
}

/// Rebuild the hotbar slots from the first slots of the designated inventory.
pub fn sync_hotbar_slots(
    mut commands: Commands,
    store: Res<InventoryStore>,
    catalog: Res<ItemCatalog>,
    rows: Query<(Entity, Ref<HotbarRow>)>,
) {
    for (row, marker) in &rows {
        if !(store.is_changed() || catalog.is_changed() || marker.is_added()) {
            continue;
        }
        let mut row_cmds = commands.entity(row);
        row_cmds.despawn_related::<Children>();
        let Some(source) = store.hotbar_source() else {
            continue;
        };
        row_cmds.with_children(|row| {
            for (index, slot) in source.slots.iter().take(HOTBAR_SLOTS).enumerate() {
                row.spawn((
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
                ))
                .with_children(|face| {
                    spawn_slot_contents(face, slot, &catalog);

                    // Key indicator
                    face.spawn((
                        Node {
                            position_type: PositionType::Absolute,
                            bottom: Val::Px(-12.0),
                            left: Val::Px(SLOT_SIZE / 2.0 - 12.0),
                            width: Val::Px(24.0),
                            height: Val::Px(24.0),
                            justify_content: JustifyContent::Center,
                            align_items: AlignItems::Center,
                            ..default()
                        },
                        BackgroundColor(ACCENT_COLOR),
                    ))
                    .with_children(|key| {
                        key.spawn((
                            Text::new((index + 1).to_string()),
                            TextFont { font_size: 12.0, ..default() },
                            TextColor(Color::WHITE),
                        ));
                    });
                });
            }
        });
    }
}

pub fn update_hotbar_title(locale: Res<Locale>, mut titles: Query<&mut Text, With<HotbarTitle>>) {
    if !locale.is_changed() {
        return;
    }
    for mut text in &mut titles {
        **text = format!("* {}", locale.get("ui_hotbar").to_uppercase());
    }
}

pub fn slide_hotbar(
    time: Res<Time>,
    visibility: Res<HotbarVisibility>,
    mut roots: Query<(&mut HotbarRoot, &mut Node, &mut Visibility)>,
) {
    let shown = visibility.is_shown();
    for (mut root, mut node, mut vis) in &mut roots {
        let next = slide_step(root.progress, shown, time.delta_secs());
        if next == root.progress {
            continue;
        }
        root.progress = next;
        node.bottom = Val::Px(HIDDEN_BOTTOM + (REST_BOTTOM - HIDDEN_BOTTOM) * next);
        *vis = if next > 0.0 { Visibility::Inherited } else { Visibility::Hidden };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn double_toggle_hides_and_cancels() {
        let mut vis = HotbarVisibility::default();
        vis.toggle();
        assert!(vis.is_shown());
        vis.toggle();
        assert!(!vis.is_shown());
        // The first timer is gone: nothing fires later.
        assert!(!vis.tick(secs(5.0)));
        assert!(!vis.is_shown());
    }

    #[test]
    fn auto_hides_after_timeout() {
        let mut vis = HotbarVisibility::default();
        vis.toggle();
        assert!(!vis.tick(secs(2.9)));
        assert!(vis.is_shown());
        assert!(vis.tick(secs(0.2)));
        assert!(!vis.is_shown());
    }

    #[test]
    fn reshow_arms_a_fresh_timer() {
        let mut vis = HotbarVisibility::default();
        vis.toggle();
        vis.tick(secs(2.0));
        vis.toggle();
        vis.toggle();
        assert!(!vis.tick(secs(2.0)));
        assert!(vis.is_shown());
        assert!(vis.tick(secs(1.1)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut vis = HotbarVisibility::default();
        vis.cancel();
        vis.toggle();
        vis.cancel();
        vis.cancel();
        assert!(!vis.is_shown());
    }

    #[test]
    fn slide_moves_towards_target() {
        assert_eq!(slide_step(0.0, true, SLIDE_SECS), 1.0);
        assert_eq!(slide_step(1.0, false, SLIDE_SECS * 2.0), 0.0);
        let half = slide_step(0.0, true, SLIDE_SECS / 2.0);
        assert!((half - 0.5).abs() < 1e-5);
        assert_eq!(slide_step(1.0, true, 0.016), 1.0);
    }
}
