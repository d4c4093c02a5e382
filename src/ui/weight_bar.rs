use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;

/// Seconds for a bar to catch up with a new width or color.
pub const BAR_TRANSITION_SECS: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    /// Higher is worse (weight against capacity).
    Fill,
    /// Higher is better (item condition).
    Durability,
}

/// Four discrete severity levels. There is deliberately no continuous ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarBand {
    Good,
    Fair,
    Poor,
    Critical,
}

pub fn color_for(percent: f64, mode: BarMode) -> BarBand {
    match mode {
        BarMode::Durability => {
            if percent > 75.0 {
                BarBand::Good
            } else if percent > 50.0 {
                BarBand::Fair
            } else if percent > 25.0 {
                BarBand::Poor
            } else {
                BarBand::Critical
            }
        }
        BarMode::Fill => {
            if percent < 50.0 {
                BarBand::Good
            } else if percent < 75.0 {
                BarBand::Fair
            } else if percent < 90.0 {
                BarBand::Poor
            } else {
                BarBand::Critical
            }
        }
    }
}

impl BarBand {
    /// Gradient stops, left to right.
    pub fn stops(self) -> (Color, Color) {
        match self {
            Self::Good => (Color::srgb_u8(0x00, 0xff, 0x00), Color::srgb_u8(0x32, 0xcd, 0x32)),
            Self::Fair => (Color::srgb_u8(0xff, 0xff, 0x00), Color::srgb_u8(0xff, 0xa5, 0x00)),
            Self::Poor => (Color::srgb_u8(0xff, 0xa5, 0x00), Color::srgb_u8(0xff, 0x45, 0x00)),
            Self::Critical => (Color::srgb_u8(0xff, 0x45, 0x00), Color::srgb_u8(0xff, 0x00, 0x00)),
        }
    }

    /// Single fill color: the midpoint of the stops.
    pub fn color(self) -> Color {
        let (a, b) = self.stops();
        lerp_color(a, b, 0.5)
    }
}

/// Displayed width as a percentage of the track.
pub fn bar_width(percent: f64) -> f32 {
    percent.clamp(0.0, 100.0) as f32
}

/// An empty bar keeps its layout slot but draws nothing.
pub fn bar_visible(percent: f64) -> bool {
    percent > 0.0
}

/// Move `current` towards `target`, covering the gap in `BAR_TRANSITION_SECS`.
pub fn approach(current: f32, target: f32, dt: f32) -> f32 {
    let t = (dt / BAR_TRANSITION_SECS).clamp(0.0, 1.0);
    current + (target - current) * t
}

pub fn lerp_color(from: Color, to: Color, t: f32) -> Color {
    let a = from.to_srgba();
    let b = to.to_srgba();
    Color::srgba(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
        a.alpha + (b.alpha - a.alpha) * t,
    )
}

/// Target state of a bar; update `percent` and the fill animates towards it.
#[derive(Component, Debug, Clone, Copy)]
pub struct WeightBar {
    pub percent: f64,
    pub mode: BarMode,
}

/// The colored child of a [`WeightBar`] track, with its current animated state.
#[derive(Component, Debug, Clone, Copy)]
pub struct WeightBarFill {
    width: f32,
    color: Color,
}

const TRACK_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.08);

/// Spawn a bar track of the given height. Width follows the parent.
pub fn spawn_weight_bar(parent: &mut ChildSpawnerCommands, percent: f64, mode: BarMode, height: f32) {
    let band = color_for(percent, mode);
    parent
        .spawn((
            WeightBar { percent, mode },
            Node {
                width: Val::Percent(100.0),
                height: Val::Px(height),
                ..default()
            },
            BackgroundColor(TRACK_COLOR),
        ))
        .with_children(|track| {
            track.spawn((
                WeightBarFill { width: bar_width(percent), color: band.color() },
                Node {
                    width: Val::Percent(bar_width(percent)),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(band.color()),
                if bar_visible(percent) { Visibility::Inherited } else { Visibility::Hidden },
            ));
        });
}

pub fn animate_weight_bars(
    time: Res<Time>,
    bars: Query<(&WeightBar, &Children)>,
    mut fills: Query<(&mut WeightBarFill, &mut Node, &mut BackgroundColor, &mut Visibility)>,
) {
    let dt = time.delta_secs();
    for (bar, children) in &bars {
        let target_width = bar_width(bar.percent);
        let target_color = color_for(bar.percent, bar.mode).color();
        for child in children.iter() {
            let Ok((mut fill, mut node, mut bg, mut vis)) = fills.get_mut(child) else {
                continue;
            };
            fill.width = approach(fill.width, target_width, dt);
            fill.color = lerp_color(fill.color, target_color, (dt / BAR_TRANSITION_SECS).clamp(0.0, 1.0));
            node.width = Val::Percent(fill.width);
            *bg = BackgroundColor(fill.color);
            let wanted = if bar_visible(bar.percent) { Visibility::Inherited } else { Visibility::Hidden };
            if *vis != wanted {
                *vis = wanted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durability_bands_are_exclusive_at_boundaries() {
        assert_eq!(color_for(100.0, BarMode::Durability), BarBand::Good);
        assert_eq!(color_for(75.0, BarMode::Durability), BarBand::Fair);
        assert_eq!(color_for(75.01, BarMode::Durability), BarBand::Good);
        assert_eq!(color_for(50.0, BarMode::Durability), BarBand::Poor);
        assert_eq!(color_for(25.0, BarMode::Durability), BarBand::Critical);
        assert_eq!(color_for(0.0, BarMode::Durability), BarBand::Critical);
    }

    #[test]
    fn fill_bands_rise_with_percent() {
        assert_eq!(color_for(0.0, BarMode::Fill), BarBand::Good);
        assert_eq!(color_for(49.99, BarMode::Fill), BarBand::Good);
        assert_eq!(color_for(50.0, BarMode::Fill), BarBand::Fair);
        assert_eq!(color_for(60.0, BarMode::Fill), BarBand::Fair);
        assert_eq!(color_for(75.0, BarMode::Fill), BarBand::Poor);
        assert_eq!(color_for(90.0, BarMode::Fill), BarBand::Critical);
        assert_eq!(color_for(140.0, BarMode::Fill), BarBand::Critical);
    }

    #[test]
    fn classification_is_pure() {
        for p in [-5.0, 0.0, 33.3, 50.0, 74.9, 90.0, 250.0] {
            for mode in [BarMode::Fill, BarMode::Durability] {
                assert_eq!(color_for(p, mode), color_for(p, mode));
            }
        }
    }

    #[test]
    fn width_is_capped_and_empty_bars_hide() {
        assert_eq!(bar_width(140.0), 100.0);
        assert_eq!(bar_width(42.5), 42.5);
        assert_eq!(bar_width(-3.0), 0.0);
        assert!(!bar_visible(0.0));
        assert!(!bar_visible(-1.0));
        assert!(bar_visible(0.1));
    }

    #[test]
    fn approach_converges_without_overshoot() {
        assert_eq!(approach(0.0, 100.0, 1.0), 100.0);
        let halfway = approach(0.0, 100.0, BAR_TRANSITION_SECS / 2.0);
        assert!((halfway - 50.0).abs() < 1e-3);
        assert_eq!(approach(40.0, 40.0, 0.016), 40.0);
    }
}
