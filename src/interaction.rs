use bevy::{
    prelude::*,
    window::{CursorGrabMode, PrimaryWindow},
};

use crate::{geojson::get_file_data, globe::GlobeRoot, settings::GlobeSettings, types::GeoBundle};

pub struct InteractionSystemPlugin;

impl Plugin for InteractionSystemPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, auto_rotate_globe)
            .add_systems(Update, file_drop);
    }
}

/// Turns the globe a little every frame unless the user is holding a button or the
/// pointer is locked.
pub fn auto_rotate_globe(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    settings: Res<GlobeSettings>,
    mut root: Query<&mut Transform, With<GlobeRoot>>,
) {
    let pointer_locked = windows
        .single()
        .is_ok_and(|w| w.cursor_options.grab_mode != CursorGrabMode::None);
    if !settings.auto_rotate || pointer_locked || buttons.get_pressed().next().is_some() {
        return;
    }

    for mut transform in &mut root {
        transform.rotate_y(settings.rotation_speed);
    }
}

fn file_drop(mut evr_dnd: EventReader<FileDragAndDrop>, mut geo_bundle: ResMut<GeoBundle>) {
    for ev in evr_dnd.read() {
        if let FileDragAndDrop::DroppedFile { path_buf, .. } = ev {
            if path_buf.extension().is_none_or(|ext| ext != "geojson" && ext != "json") {
                continue;
            }
            match get_file_data(path_buf) {
                Ok(features) => {
                    info!("Loaded {} countries from {}", features.len(), path_buf.display());
                    geo_bundle.replace(features);
                }
                Err(e) => error!("Could not load {}: {}", path_buf.display(), e),
            }
        }
    }
}
