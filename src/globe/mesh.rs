use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::mesh::{Indices, PrimitiveTopology},
};
use lyon::{
    math::{Point, point},
    path::Path,
    tessellation::{BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers},
};

use super::shape_point_to_cartesian;

#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("exterior ring has fewer than three distinct points")]
    Degenerate,
    #[error("tessellation failed: {0}")]
    Tessellation(String),
}

/// A country polygon curved onto the sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGeometry {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// Ring vertices as flat (lon, lat) points, without the repeated closing vertex.
fn ring_points(ring: &geo::LineString<f64>) -> Vec<Point> {
    let mut points: Vec<Point> = ring
        .coords()
        .map(|c| point(c.x as f32, c.y as f32))
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Builds the flat outline of a polygon: one closed subpath per ring, first point
/// moved to and the rest lined to, in ring order.
pub fn flat_shape_path(polygon: &geo::Polygon<f64>) -> Result<Path, ShapeError> {
    let exterior = ring_points(polygon.exterior());
    if exterior.len() < 3 {
        return Err(ShapeError::Degenerate);
    }

    let mut builder = Path::builder();
    let holes = polygon.interiors().iter().map(ring_points).filter(|r| r.len() >= 3);
    for ring in std::iter::once(exterior).chain(holes) {
        builder.begin(ring[0]);
        for p in &ring[1..] {
            builder.line_to(*p);
        }
        builder.end(true);
    }
    Ok(builder.build())
}

/// Tessellates the polygon in the flat (lon, lat) plane and only then moves every
/// vertex onto the sphere. Doing it the other way round needs a 3D triangulation and
/// changes the topology.
pub fn build_shape(polygon: &geo::Polygon<f64>, radius: f32) -> Result<ShapeGeometry, ShapeError> {
    let path = flat_shape_path(polygon)?;

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                let p = vertex.position();
                Vec2::new(p.x, p.y)
            }),
        )
        .map_err(|e| ShapeError::Tessellation(format!("{e:?}")))?;

    let positions: Vec<Vec3> = buffers
        .vertices
        .iter()
        .map(|v| shape_point_to_cartesian(*v, radius))
        .collect();
    let mut indices = buffers.indices;
    face_outward(&positions, &mut indices);

    Ok(ShapeGeometry { positions, indices })
}

// Flat winding depends on ring orientation, after curving we want every face to
// point away from the centre.
fn face_outward(positions: &[Vec3], indices: &mut [u32]) {
    for tri in indices.chunks_exact_mut(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| positions[i as usize]);
        let normal = (b - a).cross(c - a);
        if normal.dot(a + b + c) < 0.0 {
            tri.swap(1, 2);
        }
    }
}

impl ShapeGeometry {
    pub fn into_mesh(self) -> Mesh {
        let normals: Vec<[f32; 3]> = self
            .positions
            .iter()
            .map(|p| p.normalize_or_zero().to_array())
            .collect();
        let positions: Vec<[f32; 3]> = self.positions.iter().map(|p| p.to_array()).collect();

        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
            .with_inserted_indices(Indices::U32(self.indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn triangle() -> geo::Polygon<f64> {
        geo::Polygon::new(
            geo::LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![],
        )
    }

    #[test]
    fn triangle_lands_on_the_sphere() {
        let shape = build_shape(&triangle(), 20.0).unwrap();

        assert_eq!(shape.positions.len(), 3);
        assert_eq!(shape.indices.len(), 3);
        for p in &shape.positions {
            assert!((p.length() - 20.0).abs() < 1e-3, "norm {}", p.length());
        }

        let mut ys: Vec<f32> = shape.positions.iter().map(|p| p.y).collect();
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!(ys[0].abs() < 1e-4);
        assert!(ys[1].abs() < 1e-4);
        assert!((ys[2] - 20.0 * 10f32.to_radians().sin()).abs() < 1e-4);
    }

    #[test]
    fn closing_vertex_is_dropped() {
        let open = geo::Polygon::new(
            geo::LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]),
            vec![],
        );
        // geo closes rings on construction, both end up identical
        let a = build_shape(&open, 5.0).unwrap();
        let b = build_shape(&triangle(), 5.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_ring_is_rejected() {
        let line = geo::Polygon::new(geo::LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]), vec![]);
        assert!(matches!(build_shape(&line, 1.0), Err(ShapeError::Degenerate)));
    }

    #[test]
    fn faces_point_outward() {
        // clockwise and counter-clockwise squares must both face away from the centre
        let ccw = vec![(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)];
        let cw: Vec<_> = ccw.iter().rev().copied().collect();

        for ring in [ccw, cw] {
            let shape = build_shape(&geo::Polygon::new(ring.into(), vec![]), 10.0).unwrap();
            for tri in shape.indices.chunks_exact(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| shape.positions[i as usize]);
                assert!((b - a).cross(c - a).dot(a + b + c) > 0.0);
            }
        }
    }

    #[test]
    fn hole_removes_area() {
        let outer = vec![(0.0, 0.0), (30.0, 0.0), (30.0, 30.0), (0.0, 30.0)];
        let inner = vec![(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0)];

        let solid = build_shape(&geo::Polygon::new(outer.clone().into(), vec![]), 1.0).unwrap();
        let holed = build_shape(&geo::Polygon::new(outer.into(), vec![inner.into()]), 1.0).unwrap();

        assert_eq!(solid.indices.len(), 6);
        assert!(holed.indices.len() > solid.indices.len());
        assert_eq!(holed.positions.len(), 8);

        // Undo the projection: y = sin(second), x / z = tan(first).
        let flat = |p: Vec3| Vec2::new(p.x.atan2(p.z).to_degrees(), p.y.asin().to_degrees());
        for tri in holed.indices.chunks_exact(3) {
            let centroid = tri.iter().map(|&i| flat(holed.positions[i as usize])).sum::<Vec2>() / 3.0;
            let inside = (10.0..20.0).contains(&centroid.x) && (10.0..20.0).contains(&centroid.y);
            assert!(!inside, "triangle centred at {centroid} fills the hole");
        }
    }

    #[test]
    fn mesh_has_normals_for_every_vertex() {
        let mesh = build_shape(&triangle(), 2.0).unwrap().into_mesh();
        assert_eq!(mesh.count_vertices(), 3);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }
}
