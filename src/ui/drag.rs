use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy::ui::{FocusPolicy, UiGlobalTransform};
use bevy::window::PrimaryWindow;

use crate::host::{DropTarget, SlotAction, SlotGesture, SlotRef};
use crate::inventory::InventoryStore;
use super::common::{format_count, node_rect, placeholder_color, ICON_SIZE};
use super::grid::GridSlot;

/// Seconds a press must be held before it becomes a drag.
pub const DRAG_HOLD_SECS: f32 = 0.15;
/// Pointer travel, in logical pixels, that turns a press into a drag.
pub const DRAG_TRAVEL_PX: f32 = 4.0;

/// Where the gesture started: pointer and source top-left, both in logical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragOrigin {
    pub initial_pointer: Option<Vec2>,
    pub initial_source: Option<Vec2>,
}

/// Grab offset inside the source. Zero unless both positions are known.
pub fn parent_offset(initial_pointer: Option<Vec2>, initial_source: Option<Vec2>) -> Vec2 {
    match (initial_pointer, initial_source) {
        (Some(pointer), Some(source)) => pointer - source,
        _ => Vec2::ZERO,
    }
}

/// Whether the drag proxy has been laid out yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ProxyMeasure {
    #[default]
    Unmeasured,
    Measured { size: Vec2 },
}

impl ProxyMeasure {
    /// Layout reports zero size until the proxy's first layout pass.
    pub fn from_size(size: Vec2) -> Self {
        if size.x > 0.0 && size.y > 0.0 {
            Self::Measured { size }
        } else {
            Self::Unmeasured
        }
    }
}

/// Top-left of the proxy for the current pointer, or `None` to hide it.
///
/// Before the proxy is measured it keeps the original grab offset so the first frame does
/// not jump; once measured it is centered under the pointer.
pub fn pointer_offset(current: Option<Vec2>, origin: &DragOrigin, measure: ProxyMeasure) -> Option<Vec2> {
    let current = current?;
    Some(match measure {
        ProxyMeasure::Unmeasured => current - parent_offset(origin.initial_pointer, origin.initial_source),
        ProxyMeasure::Measured { size } => current - size / 2.0,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn read(keys: &ButtonInput<KeyCode>) -> Self {
        Self {
            alt: keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
            ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
            shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        }
    }
}

/// What a left press on an occupied slot means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressIntent {
    Activate(SlotAction),
    Drag { split: bool },
}

pub fn classify_press(mods: Modifiers) -> PressIntent {
    if mods.alt {
        PressIntent::Activate(SlotAction::Use)
    } else if mods.ctrl && mods.shift {
        PressIntent::Activate(SlotAction::QuickMoveHalf)
    } else if mods.ctrl {
        PressIntent::Activate(SlotAction::QuickMove)
    } else {
        PressIntent::Drag { split: mods.shift }
    }
}

#[derive(Debug, Clone)]
pub struct DragGesture {
    pub source: SlotRef,
    pub origin: DragOrigin,
    /// Source slot bounds in physical pixels, for recognising a drop back onto it.
    pub source_rect: Rect,
    pub split: bool,
    pub held: f32,
}

/// Pointer sample and the gesture in progress, if any.
#[derive(Resource, Debug, Default)]
pub struct DragService {
    pub pointer: Option<Vec2>,
    pub scale_factor: f32,
    pub pending: Option<DragGesture>,
    pub active: Option<DragGesture>,
}

impl DragService {
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Promote the pending press once it was held or moved far enough.
    pub fn advance(&mut self, dt: f32) -> Option<&DragGesture> {
        let pending = self.pending.as_mut()?;
        pending.held += dt;
        let travel = match (self.pointer, pending.origin.initial_pointer) {
            (Some(now), Some(start)) => now.distance(start),
            _ => 0.0,
        };
        if pending.held < DRAG_HOLD_SECS && travel < DRAG_TRAVEL_PX {
            return None;
        }
        self.active = self.pending.take();
        self.active.as_ref()
    }
}

/// Where a released drag lands, or `None` when it is dropped without a report: while busy,
/// back onto its own slot, or over the source's bounds with no slot hovered.
pub fn resolve_drop(hovered: Option<&SlotRef>, source: &SlotRef, over_source: bool, busy: bool) -> Option<DropTarget> {
    if busy {
        return None;
    }
    match hovered {
        Some(slot) if slot != source => Some(DropTarget::Slot(slot.clone())),
        Some(_) => None,
        None if over_source => None,
        None => Some(DropTarget::External),
    }
}

/// New presses are ignored while the host is busy or a drag is already in flight.
pub fn accepts_press(busy: bool, drag: &DragService) -> bool {
    !busy && !drag.is_dragging()
}

#[derive(Component)]
pub(crate) struct DragProxy;

pub fn track_pointer(windows: Query<&Window, With<PrimaryWindow>>, mut drag: ResMut<DragService>) {
    let Ok(window) = windows.single() else {
        drag.pointer = None;
        return;
    };
    drag.pointer = window.cursor_position();
    drag.scale_factor = window.scale_factor();
}

/// Left presses start drags or modifier activations; right press opens the context menu;
/// Ctrl+C copies a hovered weapon serial.
pub fn slot_press(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    store: Res<InventoryStore>,
    mut drag: ResMut<DragService>,
    slots: Query<(&Interaction, &GridSlot, &ComputedNode, &UiGlobalTransform)>,
    mut gestures: MessageWriter<SlotGesture>,
) {
    if !accepts_press(store.busy, &drag) {
        return;
    }
    let mods = Modifiers::read(&keys);
    let pointer = drag.pointer;
    for (interaction, grid_slot, node, transform) in &slots {
        if !grid_slot.occupied {
            continue;
        }
        let slot = grid_slot.slot.clone();
        match *interaction {
            Interaction::Pressed if mouse.just_pressed(MouseButton::Left) => match classify_press(mods) {
                PressIntent::Activate(action) => {
                    gestures.write(SlotGesture::Activate { slot, action });
                }
                PressIntent::Drag { split } => {
                    let rect = node_rect(node, transform);
                    let inverse = node.inverse_scale_factor();
                    drag.pending = Some(DragGesture {
                        source: slot,
                        origin: DragOrigin {
                            initial_pointer: pointer,
                            initial_source: Some(rect.min * inverse),
                        },
                        source_rect: rect,
                        split,
                        held: 0.0,
                    });
                }
            },
            Interaction::Hovered if mouse.just_pressed(MouseButton::Right) => {
                gestures.write(SlotGesture::ContextMenu { slot });
            }
            Interaction::Hovered if mods.ctrl && keys.just_pressed(KeyCode::KeyC) => {
                let serial = store
                    .get(&slot.inventory)
                    .and_then(|inv| inv.slots.iter().find(|s| s.slot == slot.slot))
                    .and_then(|s| s.item.as_ref())
                    .and_then(|item| item.meta())
                    .and_then(|meta| meta.serial());
                if let Some(serial) = serial {
                    gestures.write(SlotGesture::CopySerial { slot, serial });
                }
            }
            _ => {}
        }
    }
}

pub fn promote_drag(
    mut commands: Commands,
    time: Res<Time>,
    mouse: Res<ButtonInput<MouseButton>>,
    store: Res<InventoryStore>,
    mut drag: ResMut<DragService>,
    mut gestures: MessageWriter<SlotGesture>,
) {
    if drag.pending.is_none() {
        return;
    }
    if !mouse.pressed(MouseButton::Left) {
        // Released before it became a drag: a plain click.
        drag.pending = None;
        return;
    }
    let Some(gesture) = drag.advance(time.delta_secs()) else {
        return;
    };
    let source = gesture.source.clone();
    let item = store
        .get(&source.inventory)
        .and_then(|inv| inv.slots.iter().find(|s| s.slot == source.slot))
        .and_then(|s| s.item.clone());
    gestures.write(SlotGesture::DragStart { source });

    let (color, count) = match &item {
        Some(item) => (placeholder_color(&item.name), format_count(item.count)),
        None => (Color::NONE, String::new()),
    };
    commands
        .spawn((
            DragProxy,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Px(ICON_SIZE),
                height: Val::Px(ICON_SIZE),
                justify_content: JustifyContent::End,
                align_items: AlignItems::End,
                ..default()
            },
            BackgroundColor(color),
            FocusPolicy::Pass,
            GlobalZIndex(100),
            Visibility::Hidden,
        ))
        .with_children(|proxy| {
            proxy.spawn((
                Text::new(count),
                TextFont { font_size: 10.0, ..default() },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn position_drag_proxy(
    drag: Res<DragService>,
    mut proxies: Query<(&mut Node, &ComputedNode, &mut Visibility), With<DragProxy>>,
) {
    let Some(active) = &drag.active else {
        return;
    };
    for (mut node, computed, mut vis) in &mut proxies {
        let measure = ProxyMeasure::from_size(computed.size() * computed.inverse_scale_factor());
        match pointer_offset(drag.pointer, &active.origin, measure) {
            Some(pos) => {
                node.left = Val::Px(pos.x);
                node.top = Val::Px(pos.y);
                *vis = Visibility::Visible;
            }
            None => *vis = Visibility::Hidden,
        }
    }
}

pub fn finish_drag(
    mut commands: Commands,
    mouse: Res<ButtonInput<MouseButton>>,
    store: Res<InventoryStore>,
    mut drag: ResMut<DragService>,
    slots: Query<(&Interaction, &GridSlot)>,
    proxies: Query<Entity, With<DragProxy>>,
    mut gestures: MessageWriter<SlotGesture>,
) {
    if drag.active.is_none() || mouse.pressed(MouseButton::Left) {
        return;
    }
    let Some(gesture) = drag.active.take() else {
        return;
    };
    for proxy in &proxies {
        commands.entity(proxy).despawn();
    }
    if store.busy {
        debug!("Drop of slot {} cancelled while busy", gesture.source.slot);
    }

    let hovered = slots
        .iter()
        .find(|(interaction, _)| **interaction == Interaction::Hovered)
        .map(|(_, slot)| &slot.slot);
    let over_source = drag
        .pointer
        .is_some_and(|p| gesture.source_rect.contains(p * drag.scale_factor));
    let Some(target) = resolve_drop(hovered, &gesture.source, over_source, store.busy) else {
        return;
    };
    gestures.write(SlotGesture::Drop {
        source: gesture.source,
        target,
        split: gesture.split,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::inventory::InventoryKind;

    fn gesture(pointer: Vec2) -> DragGesture {
        DragGesture {
            source: SlotRef { inventory: "player".into(), kind: InventoryKind::Player, slot: 1 },
            origin: DragOrigin { initial_pointer: Some(pointer), initial_source: Some(Vec2::ZERO) },
            source_rect: Rect::new(0.0, 0.0, 96.0, 96.0),
            split: false,
            held: 0.0,
        }
    }

    #[test]
    fn parent_offset_needs_both_positions() {
        assert_eq!(parent_offset(None, None), Vec2::ZERO);
        assert_eq!(parent_offset(Some(Vec2::new(5.0, 5.0)), None), Vec2::ZERO);
        assert_eq!(parent_offset(None, Some(Vec2::new(5.0, 5.0))), Vec2::ZERO);
        assert_eq!(
            parent_offset(Some(Vec2::new(130.0, 60.0)), Some(Vec2::new(100.0, 40.0))),
            Vec2::new(30.0, 20.0)
        );
    }

    #[test]
    fn no_pointer_hides_proxy_in_every_state() {
        let origin = DragOrigin { initial_pointer: Some(Vec2::ONE), initial_source: Some(Vec2::ZERO) };
        assert_eq!(pointer_offset(None, &origin, ProxyMeasure::Unmeasured), None);
        let measured = ProxyMeasure::Measured { size: Vec2::splat(40.0) };
        assert_eq!(pointer_offset(None, &origin, measured), None);
    }

    #[test]
    fn unmeasured_proxy_keeps_grab_offset() {
        let origin = DragOrigin {
            initial_pointer: Some(Vec2::new(130.0, 60.0)),
            initial_source: Some(Vec2::new(100.0, 40.0)),
        };
        let pos = pointer_offset(Some(Vec2::new(200.0, 200.0)), &origin, ProxyMeasure::Unmeasured);
        assert_eq!(pos, Some(Vec2::new(170.0, 180.0)));

        let unknown = DragOrigin::default();
        let pos = pointer_offset(Some(Vec2::new(200.0, 200.0)), &unknown, ProxyMeasure::Unmeasured);
        assert_eq!(pos, Some(Vec2::new(200.0, 200.0)));
    }

    #[test]
    fn measured_proxy_is_centered() {
        let origin = DragOrigin {
            initial_pointer: Some(Vec2::new(130.0, 60.0)),
            initial_source: Some(Vec2::new(100.0, 40.0)),
        };
        let measure = ProxyMeasure::from_size(Vec2::new(40.0, 40.0));
        assert_eq!(pointer_offset(Some(Vec2::new(200.0, 200.0)), &origin, measure), Some(Vec2::new(180.0, 180.0)));
        assert_eq!(ProxyMeasure::from_size(Vec2::ZERO), ProxyMeasure::Unmeasured);
    }

    #[test]
    fn modifiers_pick_the_activation() {
        let none = Modifiers::default();
        assert_eq!(classify_press(none), PressIntent::Drag { split: false });
        assert_eq!(classify_press(Modifiers { shift: true, ..none }), PressIntent::Drag { split: true });
        assert_eq!(classify_press(Modifiers { alt: true, ..none }), PressIntent::Activate(SlotAction::Use));
        assert_eq!(classify_press(Modifiers { ctrl: true, ..none }), PressIntent::Activate(SlotAction::QuickMove));
        assert_eq!(
            classify_press(Modifiers { ctrl: true, shift: true, ..none }),
            PressIntent::Activate(SlotAction::QuickMoveHalf)
        );
    }

    #[test]
    fn press_becomes_drag_after_hold_or_travel() {
        let mut drag = DragService { pointer: Some(Vec2::new(10.0, 10.0)), ..default() };
        drag.pending = Some(gesture(Vec2::new(10.0, 10.0)));
        assert!(drag.advance(0.05).is_none());
        assert!(drag.advance(0.05).is_none());
        assert!(drag.advance(0.06).is_some());
        assert!(drag.pending.is_none());
        assert!(drag.is_dragging());

        let mut drag = DragService { pointer: Some(Vec2::new(15.0, 10.0)), ..default() };
        drag.pending = Some(gesture(Vec2::new(10.0, 10.0)));
        assert!(drag.advance(0.0).is_some());
    }

    #[test]
    fn advance_without_press_is_noop() {
        let mut drag = DragService::default();
        assert!(drag.advance(1.0).is_none());
        assert!(!drag.is_dragging());
    }

    #[test]
    fn drop_lands_on_other_slot_or_outside() {
        let source = gesture(Vec2::ZERO).source;
        let other = SlotRef { inventory: "stash".into(), kind: InventoryKind::Stash, slot: 7 };
        assert_eq!(resolve_drop(Some(&other), &source, false, false), Some(DropTarget::Slot(other.clone())));
        assert_eq!(resolve_drop(Some(&other), &source, true, false), Some(DropTarget::Slot(other)));
        assert_eq!(resolve_drop(None, &source, false, false), Some(DropTarget::External));
    }

    #[test]
    fn drop_on_source_is_cancelled() {
        let source = gesture(Vec2::ZERO).source;
        assert_eq!(resolve_drop(Some(&source), &source, true, false), None);
        assert_eq!(resolve_drop(None, &source, true, false), None);
    }

    #[test]
    fn busy_cancels_drops_and_blocks_presses() {
        let source = gesture(Vec2::ZERO).source;
        let other = SlotRef { inventory: "player".into(), kind: InventoryKind::Player, slot: 2 };
        assert_eq!(resolve_drop(Some(&other), &source, false, true), None);
        assert_eq!(resolve_drop(None, &source, false, true), None);

        let mut drag = DragService::default();
        assert!(accepts_press(false, &drag));
        assert!(!accepts_press(true, &drag));
        drag.active = Some(gesture(Vec2::ZERO));
        assert!(!accepts_press(false, &drag));
    }
}
