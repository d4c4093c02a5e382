use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;
use bevy::ui::FocusPolicy;

use crate::locale::Locale;
use super::common::{spawn_divider, ACCENT_COLOR, PANEL_COLOR};

#[derive(Resource, Default)]
pub struct ControlsOpen(pub bool);

#[derive(Component)]
pub(crate) struct ControlsUiRoot;

#[derive(Component, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlsButton {
    Open,
    Close,
    /// Press outside the dialog.
    Dismiss,
}

const DIALOG_WIDTH: f32 = 360.0;

/// Key chord and localized description for each hint, in display order.
pub fn control_hints(locale: &Locale) -> Vec<(&'static str, String)> {
    [
        ("RMB", "ui_rmb"),
        ("ALT + LMB", "ui_alt_lmb"),
        ("CTRL + LMB", "ui_ctrl_lmb"),
        ("SHIFT + Drag", "ui_shift_drag"),
        ("CTRL + SHIFT + LMB", "ui_ctrl_shift_lmb"),
        ("CTRL + C", "ui_ctrl_c"),
    ]
    .into_iter()
    .map(|(chord, key)| (chord, locale.get(key).to_string()))
    .collect()
}

pub fn spawn_controls_button(mut commands: Commands) {
    commands
        .spawn((
            ControlsButton::Open,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(16.0),
                right: Val::Px(16.0),
                width: Val::Px(32.0),
                height: Val::Px(32.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                border: UiRect::all(Val::Px(1.0)),
                ..default()
            },
            BorderColor::all(ACCENT_COLOR),
            BackgroundColor(PANEL_COLOR),
            Interaction::default(),
        ))
        .with_children(|btn| {
            btn.spawn((
                Text::new("?"),
                TextColor(ACCENT_COLOR),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
            ));
        });
}

pub fn toggle_controls(keys: Res<ButtonInput<KeyCode>>, mut open: ResMut<ControlsOpen>) {
    if keys.just_pressed(KeyCode::F1) {
        open.0 = !open.0;
    } else if open.0 && keys.just_pressed(KeyCode::Escape) {
        open.0 = false;
    }
}

pub fn spawn_controls_ui(
    mut commands: Commands,
    open: Res<ControlsOpen>,
    locale: Res<Locale>,
    existing: Query<Entity, With<ControlsUiRoot>>,
) {
    if !open.is_changed() || !open.0 || !existing.is_empty() {
        return;
    }

    commands
        .spawn((
            ControlsUiRoot,
            ControlsButton::Dismiss,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            Interaction::default(),
            FocusPolicy::Block,
            GlobalZIndex(300),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(DIALOG_WIDTH),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(16.0)),
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                    BackgroundColor(PANEL_COLOR),
                    BorderColor::all(ACCENT_COLOR.with_alpha(0.4)),
                    Interaction::default(),
                    FocusPolicy::Block,
                ))
                .with_children(|dialog| {
                    dialog
                        .spawn(Node {
                            justify_content: JustifyContent::SpaceBetween,
                            align_items: AlignItems::Center,
                            ..default()
                        })
                        .with_children(|title| {
                            title.spawn((
                                Text::new(locale.get("ui_usefulcontrols")),
                                TextColor(Color::WHITE),
                                TextFont {
                                    font_size: 18.0,
                                    ..default()
                                },
                            ));
                            title
                                .spawn((
                                    ControlsButton::Close,
                                    Node {
                                        width: Val::Px(24.0),
                                        height: Val::Px(24.0),
                                        justify_content: JustifyContent::Center,
                                        align_items: AlignItems::Center,
                                        ..default()
                                    },
                                    BackgroundColor(Color::NONE),
                                    Interaction::default(),
                                ))
                                .with_children(|close| {
                                    close.spawn((
                                        Text::new("x"),
                                        TextColor(Color::WHITE),
                                        TextFont {
                                            font_size: 16.0,
                                            ..default()
                                        },
                                    ));
                                });
                        });

                    spawn_divider(dialog);

                    for (chord, description) in control_hints(&locale) {
                        spawn_hint(dialog, chord, &description);
                    }
                });
        });
}

fn spawn_hint(parent: &mut ChildSpawnerCommands, chord: &str, description: &str) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            margin: UiRect::bottom(Val::Px(10.0)),
            ..default()
        })
        .with_children(|hint| {
            hint.spawn((
                Node {
                    padding: UiRect::axes(Val::Px(6.0), Val::Px(2.0)),
                    border: UiRect::all(Val::Px(1.0)),
                    align_self: AlignSelf::FlexStart,
                    ..default()
                },
                BorderColor::all(ACCENT_COLOR),
            ))
            .with_children(|kbd| {
                kbd.spawn((
                    Text::new(chord),
                    TextColor(ACCENT_COLOR),
                    TextFont {
                        font_size: 12.0,
                        ..default()
                    },
                ));
            });
            hint.spawn((
                Text::new(description),
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
            ));
        });
}

pub fn despawn_controls_ui(
    mut commands: Commands,
    open: Res<ControlsOpen>,
    query: Query<Entity, With<ControlsUiRoot>>,
) {
    if !open.is_changed() || open.0 {
        return;
    }

    for entity in &query {
        commands.entity(entity).despawn();
    }
}

pub fn controls_button_interaction(
    mut open: ResMut<ControlsOpen>,
    button_q: Query<(&Interaction, &ControlsButton), Changed<Interaction>>,
) {
    for (interaction, button) in &button_q {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            ControlsButton::Open => open.0 = true,
            ControlsButton::Close | ControlsButton::Dismiss => open.0 = false,
        }
    }
}

pub fn controls_button_hover(
    mut button_q: Query<(&Interaction, &ControlsButton, &mut BackgroundColor), Changed<Interaction>>,
) {
    for (interaction, button, mut bg) in &mut button_q {
        if *button == ControlsButton::Dismiss {
            continue;
        }
        let idle = if *button == ControlsButton::Open { PANEL_COLOR } else { Color::NONE };
        *bg = match interaction {
            Interaction::Hovered => BackgroundColor(ACCENT_COLOR.with_alpha(0.25)),
            Interaction::Pressed => BackgroundColor(ACCENT_COLOR.with_alpha(0.4)),
            Interaction::None => BackgroundColor(idle),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn hints_fall_back_to_english() {
        let hints = control_hints(&Locale::default());
        assert_eq!(hints.len(), 6);
        assert_eq!(hints[0], ("RMB", "Open item context menu".to_string()));
        assert_eq!(hints[5], ("CTRL + C", "Copy weapon serial".to_string()));
    }

    #[test]
    fn hints_use_localized_text() {
        let locale = Locale::from_map(HashMap::from([("ui_shift_drag".to_string(), "Stapel teilen".to_string())]));
        let hints = control_hints(&locale);
        assert_eq!(hints[3], ("SHIFT + Drag", "Stapel teilen".to_string()));
        assert_eq!(hints[2].1, "Fast move items");
    }
}
