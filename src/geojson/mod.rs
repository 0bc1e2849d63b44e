mod loader;
mod renderer;
mod worker;

pub use loader::*;
pub use renderer::*;
pub use worker::*;

use bevy::prelude::*;

use crate::types::GeoBundle;

pub struct GeoDataPlugin;

impl Plugin for GeoDataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GeoBundle>()
            .init_resource::<CountryStats>()
            .add_plugins(GeoWorkerPlugin)
            .add_systems(Update, (respawn_countries.after(read_geo_receiver), draw_borders));
    }
}
