pub mod common;
pub mod controls;
pub mod drag;
pub mod grid;
pub mod hotbar;
pub mod paging;
pub mod tooltip;
pub mod weight_bar;

use bevy::prelude::*;

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<drag::DragService>()
            .init_resource::<tooltip::TooltipState>()
            .init_resource::<hotbar::HotbarVisibility>()
            .init_resource::<controls::ControlsOpen>()
            .add_systems(
                Startup,
                (
                    setup_camera,
                    grid::spawn_grid_root,
                    hotbar::spawn_hotbar,
                    controls::spawn_controls_button,
                ),
            )
            .add_systems(
                Update,
                (
                    drag::track_pointer,
                    drag::slot_press.after(drag::track_pointer),
                    drag::promote_drag.after(drag::slot_press),
                    drag::position_drag_proxy.after(drag::promote_drag),
                    drag::finish_drag.after(drag::promote_drag),
                ),
            )
            .add_systems(
                Update,
                (
                    grid::sync_grid_panels,
                    grid::tag_panel_bars.after(grid::sync_grid_panels),
                    grid::refresh_grid_headers.after(grid::sync_grid_panels),
                    grid::refresh_grid_slots.after(grid::sync_grid_panels),
                    grid::sense_sentinels.after(grid::refresh_grid_slots),
                    grid::scroll_grids.after(drag::track_pointer),
                    grid::update_busy_overlays.after(grid::sync_grid_panels),
                    grid::grid_slot_hover,
                    weight_bar::animate_weight_bars.after(grid::refresh_grid_headers),
                ),
            )
            .add_systems(
                Update,
                (
                    tooltip::track_tooltip_hover.after(drag::finish_drag),
                    tooltip::render_tooltip.after(tooltip::track_tooltip_hover),
                    tooltip::position_tooltip.after(tooltip::render_tooltip),
                ),
            )
            .add_systems(
                Update,
                (
                    hotbar::toggle_hotbar,
                    hotbar::teardown_hotbar.after(hotbar::toggle_hotbar),
                    hotbar::tick_hotbar.after(hotbar::teardown_hotbar),
                    hotbar::sync_hotbar_slots,
                    hotbar::update_hotbar_title,
                    hotbar::slide_hotbar.after(hotbar::tick_hotbar),
                ),
            )
            .add_systems(
                Update,
                (
                    controls::toggle_controls,
                    controls::controls_button_interaction,
                    controls::spawn_controls_ui
                        .after(controls::toggle_controls)
                        .after(controls::controls_button_interaction),
                    controls::despawn_controls_ui
                        .after(controls::toggle_controls)
                        .after(controls::controls_button_interaction),
                    controls::controls_button_hover,
                ),
            );
    }
}
