use bevy::{
    picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings},
    prelude::*,
    window::{CursorLeft, PrimaryWindow},
};

use crate::{
    EguiBlockInputState,
    camera::OrbitCamera,
    geojson::Country,
    globe::BaseGlobe,
    settings::GlobeSettings,
};

use super::{Pick, SelectionEffect, SelectionState};

pub struct PickingPlugin;

impl Plugin for PickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HoverSelection>()
            .add_systems(Startup, spawn_label)
            .add_systems(Update, (track_pointer_buttons, hover_countries).chain());
    }
}

/// Hover state shared by the pointer handlers.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct HoverSelection(pub SelectionState<Entity>);

impl HoverSelection {
    pub fn selected_name(&self) -> Option<&str> {
        self.selected().map(|s| s.name.as_str())
    }
}

/// Text showing the hovered country's name.
#[derive(Component)]
pub struct CountryLabel;

fn spawn_label(mut commands: Commands) {
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 26.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(20.0),
            left: Val::Px(20.0),
            ..default()
        },
        CountryLabel,
    ));
}

/// Nearest country or base globe under `pointer`.
fn pick_scene(
    pointer: Vec2,
    ray_cast: &mut MeshRayCast,
    camera: (&Camera, &GlobalTransform),
    countries: &Query<(&Country, &MeshMaterial3d<StandardMaterial>)>,
    globe: &Query<(), With<BaseGlobe>>,
    materials: &Assets<StandardMaterial>,
) -> Option<Pick<Entity>> {
    let ray = camera.0.viewport_to_world(camera.1, pointer).ok()?;

    let filter = |entity: Entity| countries.contains(entity) || globe.contains(entity);
    let settings = MeshRayCastSettings::default()
        .with_filter(&filter)
        .never_early_exit();

    let (entity, _) = ray_cast.cast_ray(ray, &settings).first()?;
    if globe.contains(*entity) {
        return Some(Pick::Globe);
    }

    let (country, material) = countries.get(*entity).ok()?;
    let color = materials.get(&material.0)?.base_color;
    Some(Pick::Country {
        id: *entity,
        color,
        name: country.name.clone(),
    })
}

fn apply_effects(
    effects: Vec<SelectionEffect<Entity>>,
    handles: &Query<&MeshMaterial3d<StandardMaterial>, With<Country>>,
    materials: &mut Assets<StandardMaterial>,
    label: &mut Query<&mut Text, With<CountryLabel>>,
    highlight: Color,
) {
    for effect in effects {
        match effect {
            SelectionEffect::Highlight { id, name } => {
                set_color(id, highlight, handles, materials);
                for mut text in label.iter_mut() {
                    text.0 = name.clone();
                }
            }
            // The entity may be gone after a respawn, nothing to restore then.
            SelectionEffect::Restore { id, color } => set_color(id, color, handles, materials),
            SelectionEffect::ClearLabel => {
                for mut text in label.iter_mut() {
                    text.0.clear();
                }
            }
        }
    }
}

fn set_color(
    id: Entity,
    color: Color,
    handles: &Query<&MeshMaterial3d<StandardMaterial>, With<Country>>,
    materials: &mut Assets<StandardMaterial>,
) {
    if let Ok(handle) = handles.get(id) {
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color = color;
        }
    }
}

fn track_pointer_buttons(
    buttons: Res<ButtonInput<MouseButton>>,
    state: Res<EguiBlockInputState>,
    mut selection: ResMut<HoverSelection>,
    handles: Query<&MeshMaterial3d<StandardMaterial>, With<Country>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut label: Query<&mut Text, With<CountryLabel>>,
    settings: Res<GlobeSettings>,
) {
    if buttons.get_just_pressed().next().is_some() && !state.block_input && !selection.is_dragging() {
        let effects = selection.pointer_down();
        apply_effects(effects, &handles, &mut materials, &mut label, settings.highlight());
    }
    if selection.is_dragging() && buttons.get_pressed().next().is_none() {
        selection.pointer_up();
    }
}

fn hover_countries(
    mut cursor_moved: EventReader<CursorMoved>,
    mut cursor_left: EventReader<CursorLeft>,
    windows: Query<Entity, With<PrimaryWindow>>,
    camera: Query<(&Camera, &GlobalTransform), With<OrbitCamera>>,
    mut ray_cast: MeshRayCast,
    countries: Query<(&Country, &MeshMaterial3d<StandardMaterial>)>,
    globe: Query<(), With<BaseGlobe>>,
    handles: Query<&MeshMaterial3d<StandardMaterial>, With<Country>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut label: Query<&mut Text, With<CountryLabel>>,
    mut selection: ResMut<HoverSelection>,
    state: Res<EguiBlockInputState>,
    settings: Res<GlobeSettings>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    // Over an egui panel nothing on the globe is under the pointer either.
    if cursor_left.read().any(|e| e.window == window) || state.block_input {
        let effects = selection.pointer_left();
        apply_effects(effects, &handles, &mut materials, &mut label, settings.highlight());
        cursor_moved.clear();
        return;
    }

    let Some(pointer) = cursor_moved
        .read()
        .filter(|e| e.window == window)
        .last()
        .map(|e| e.position)
    else {
        return;
    };
    let Ok((camera, camera_transform)) = camera.single() else {
        return;
    };

    let mut caster =
        |pointer: Vec2| pick_scene(pointer, &mut ray_cast, (camera, camera_transform), &countries, &globe, &materials);
    let effects = selection.pointer_moved(pointer, &mut caster);
    apply_effects(effects, &handles, &mut materials, &mut label, settings.highlight());
}
