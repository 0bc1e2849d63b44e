use std::path::Path;

use bevy::prelude::*;
use geojson::{Feature, GeoJson, JsonObject};

use crate::types::GeoFeature;

/// Everything that can go wrong while getting the country data. None of it is fatal,
/// the worker logs it and carries on without overlays.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read geo data: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(not(target_arch = "wasm32"))]
    #[error("request failed: {0}")]
    Http(#[from] ureq::Error),
    #[cfg(target_arch = "wasm32")]
    #[error("request failed: {0}")]
    Fetch(#[from] gloo_net::Error),
    #[cfg(target_arch = "wasm32")]
    #[error("server answered with status {0}")]
    Status(u16),
    #[cfg(target_arch = "wasm32")]
    #[error("local files cannot be read from the browser")]
    FileInBrowser,
    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),
}

/// Parses a GeoJSON document into countries.
pub fn parse_features(data: &str) -> Result<Vec<GeoFeature>, LoadError> {
    let geojson: GeoJson = data.parse()?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            warn!("GeoJSON document is a bare geometry, no countries to show");
            Vec::new()
        }
    };

    Ok(features.into_iter().filter_map(to_geo_feature).collect())
}

/// Reads and parses a GeoJSON file from disk.
pub fn get_file_data(path: &Path) -> Result<Vec<GeoFeature>, LoadError> {
    let data = std::fs::read_to_string(path)?;
    parse_features(&data)
}

fn to_geo_feature(feature: Feature) -> Option<GeoFeature> {
    let name = feature_name(feature.properties.as_ref());
    let Some(geometry) = feature.geometry else {
        debug!("Skipping {name}: no geometry");
        return None;
    };

    let polygons = match geometry.value {
        geojson::Value::Polygon(rings) => polygon_from_rings(&rings).into_iter().collect(),
        // Every entry is a polygon wrapped one level deeper, unwrap it to its rings.
        geojson::Value::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| polygon_from_rings(rings))
            .collect(),
        _ => {
            debug!("Skipping {name}: not a polygon");
            return None;
        }
    };

    Some(GeoFeature { name, polygons })
}

/// `properties.admin`, then `properties.name`, then "Unknown".
pub fn feature_name(properties: Option<&JsonObject>) -> String {
    properties
        .and_then(|p| {
            ["admin", "name"]
                .iter()
                .find_map(|key| p.get(*key).and_then(|v| v.as_str()))
        })
        .unwrap_or("Unknown")
        .to_string()
}

/// First ring is the outline, the rest are holes.
fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<geo::Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| to_line_string(ring));
    let exterior = rings.next()?;
    if exterior.0.is_empty() {
        return None;
    }
    Some(geo::Polygon::new(exterior, rings.collect()))
}

fn to_line_string(ring: &[Vec<f64>]) -> geo::LineString<f64> {
    ring.iter()
        .filter(|p| p.len() >= 2)
        .map(|p| geo::Coord { x: p[0], y: p[1] })
        .collect()
}
