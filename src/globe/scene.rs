use bevy::prelude::*;

use crate::settings::{GlobeSettings, rgb};

/// Parent of the base sphere and every country mesh. Auto-rotation turns this.
#[derive(Component)]
pub struct GlobeRoot;

/// The plain sphere under the country meshes. Hovering it clears the selection.
#[derive(Component)]
pub struct BaseGlobe;

pub fn setup_globe(
    mut commands: Commands,
    settings: Res<GlobeSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 600.0,
        ..default()
    });
    commands.spawn((
        DirectionalLight {
            illuminance: 4000.0,
            ..default()
        },
        Transform::from_xyz(50.0, 40.0, 60.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands
        .spawn((GlobeRoot, Transform::default(), Visibility::default()))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Sphere::new(settings.globe_radius).mesh().uv(64, 32))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: rgb(settings.globe_color),
                    perceptual_roughness: 0.8,
                    ..default()
                })),
                BaseGlobe,
            ));
        });
}
