use bevy::prelude::*;

/// One country: a display name and the polygons that make it up.
///
/// Coordinates are `x = longitude`, `y = latitude`, in degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFeature {
    pub name: String,
    pub polygons: Vec<geo::Polygon<f64>>,
}

#[derive(Resource, Clone, Debug, Default)]
pub struct GeoBundle {
    pub features: Vec<GeoFeature>,
    /// Set when the country meshes have to be rebuilt from `features`.
    pub respawn: bool,
}

impl GeoBundle {
    pub fn replace(&mut self, features: Vec<GeoFeature>) {
        self.features = features;
        self.respawn = true;
    }
}
