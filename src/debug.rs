use bevy::{
    color::palettes::css::GOLD,
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use crate::geojson::CountryStats;

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        if cfg!(debug_assertions) {
            app.add_plugins(FrameTimeDiagnosticsPlugin::default())
                .add_systems(Startup, debug_draw_counters)
                .add_systems(Update, (text_update_fps, text_update_shapes));
        }
    }
}

#[derive(Component)]
pub struct FpsText;

#[derive(Component)]
pub struct ShapesText;

fn counter(commands: &mut Commands, label: &str, top: f32, marker: impl Component) {
    commands
        .spawn((
            Text::new(label),
            TextFont {
                font_size: 16.0,
                ..default()
            },
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(top),
                right: Val::Px(5.0),
                ..default()
            },
        ))
        .with_child((
            TextSpan::default(),
            TextFont {
                font_size: 16.0,
                ..default()
            },
            TextColor(GOLD.into()),
            marker,
        ));
}

pub fn debug_draw_counters(mut commands: Commands) {
    counter(&mut commands, "FPS: ", 5.0, FpsText);
    counter(&mut commands, "Shapes: ", 25.0, ShapesText);
}

pub fn text_update_fps(diagnostics: Res<DiagnosticsStore>, mut query: Query<&mut TextSpan, With<FpsText>>) {
    for mut span in &mut query {
        if let Some(value) = diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed())
        {
            **span = format!("{value:.2}");
        }
    }
}

pub fn text_update_shapes(stats: Res<CountryStats>, mut query: Query<&mut TextSpan, With<ShapesText>>) {
    if !stats.is_changed() {
        return;
    }
    for mut span in &mut query {
        **span = format!("{} ({} countries)", stats.shapes, stats.countries);
    }
}
