//! # Hover Tools
//!
//! Pointer driven interaction with the countries on the globe.
//!
//! ## Sub-modules
//! - `selection`: the hover selection state machine, independent of Bevy's scene
//! - `picking`: ray casts against the scene and applies highlight/restore to materials

mod picking;
mod selection;

pub use picking::*;
pub use selection::*;

use bevy::app::*;

pub struct ToolsPlugin;

impl Plugin for ToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PickingPlugin);
    }
}
