use bevy::math::{Vec2, Vec3};

/// Unit of the angles handed to [`geo_to_cartesian`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

/// Places a geographic coordinate on a sphere of the given radius.
///
/// `lon` is the angle out of the equatorial plane and `lat` the rotation within it:
///
/// ```text
/// y = radius * sin(lon)
/// x = radius * sin(lat) * cos(lon)
/// z = radius * cos(lat) * cos(lon)
/// ```
///
/// The angle roles are swapped compared to the usual mapping. Keep it that way,
/// [`shape_point_to_cartesian`] relies on the order.
pub fn geo_to_cartesian(lat: f32, lon: f32, radius: f32, unit: AngleUnit) -> Vec3 {
    let (lat, lon) = match unit {
        AngleUnit::Degrees => (lat.to_radians(), lon.to_radians()),
        AngleUnit::Radians => (lat, lon),
    };

    Vec3::new(
        radius * lat.sin() * lon.cos(),
        radius * lon.sin(),
        radius * lat.cos() * lon.cos(),
    )
}

/// Curves a vertex of a flat (lon, lat) shape onto the sphere.
///
/// The flat x/y pair feeds the first/second angle of [`geo_to_cartesian`] in that
/// order, which puts GeoJSON latitude on the vertical axis.
pub fn shape_point_to_cartesian(point: Vec2, radius: f32) -> Vec3 {
    geo_to_cartesian(point.x, point.y, radius, AngleUnit::Degrees)
}

/// Projects every vertex of a ring on its own. Edges stay straight chords.
pub fn project_ring(ring: &geo::LineString<f64>, radius: f32) -> Vec<Vec3> {
    ring.coords()
        .map(|c| shape_point_to_cartesian(Vec2::new(c.x as f32, c.y as f32), radius))
        .collect()
}
