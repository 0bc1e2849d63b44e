mod mesh;
mod projection;
mod scene;

pub use mesh::*;
pub use projection::*;
pub use scene::*;

use bevy::prelude::*;

pub struct GlobeScenePlugin;

impl Plugin for GlobeScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_globe);
    }
}
