use bevy::prelude::*;

mod config;
mod demo;
mod host;
mod inventory;
mod locale;
mod ui;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Inventory HUD".into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.04, 0.04, 0.05)))
        .add_plugins((host::HostPlugin, inventory::InventoryPlugin, ui::UiPlugin))
        .run();
}
