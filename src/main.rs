use bevy::{
    prelude::*,
    winit::{UpdateMode, WinitSettings},
};

use bevy_egui::EguiPlugin;
use camera::CameraSystemPlugin;
use debug::DebugPlugin;
use crate::geojson::GeoDataPlugin;
use globe::GlobeScenePlugin;
use interaction::InteractionSystemPlugin;
use settings::SettingsPlugin;
use tools::ToolsPlugin;

pub mod camera;
pub mod debug;
pub mod geojson;
pub mod globe;
pub mod interaction;
pub mod settings;
pub mod tools;
pub mod types;

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Country Globe".to_string(),
                canvas: Some("#globe-canvas".to_string()),
                fit_canvas_to_parent: true,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: false,
        })
        .add_plugins(DebugPlugin)
        .insert_resource(EguiBlockInputState::default())
        .insert_resource(WinitSettings {
            unfocused_mode: UpdateMode::Reactive {
                wait: std::time::Duration::from_secs(1),
                react_to_device_events: true,
                react_to_user_events: true,
                react_to_window_events: true,
            },
            ..Default::default()
        })
        .insert_resource(ClearColor(Color::from(Srgba {
            red: 0.02,
            green: 0.02,
            blue: 0.05,
            alpha: 1.0,
        })))
        .add_plugins(SettingsPlugin)
        .add_plugins((GlobeScenePlugin, CameraSystemPlugin, InteractionSystemPlugin))
        .add_plugins(GeoDataPlugin)
        .add_plugins(ToolsPlugin)
        .add_systems(Update, absorb_egui_inputs)
        .run();
}

#[derive(Resource, Default)]
pub struct EguiBlockInputState {
    pub block_input: bool,
}

fn absorb_egui_inputs(mut contexts: bevy_egui::EguiContexts, mut state: ResMut<EguiBlockInputState>) {
    let ctx = contexts.ctx_mut();
    let block_input = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
    // Only write on change so the orbit camera can react to `is_changed`.
    if state.block_input != block_input {
        state.block_input = block_input;
    }
}
