use bevy::prelude::*;
use rand::Rng;

use crate::{
    globe::{GlobeRoot, build_shape, project_ring},
    settings::{GlobeSettings, rgb},
    types::GeoBundle,
};

/// Tint every country color is OR'd with.
pub const BASE_TINT: u32 = 0x204a20;
/// Upper bound (exclusive) of the random byte replicated into each channel.
pub const COLOR_JITTER: u8 = 0x40;

/// A country mesh on the globe. One entity per polygon.
#[derive(Component, Clone, Debug)]
pub struct Country {
    pub name: String,
}

/// Projected rings of a country polygon, in globe-local space.
#[derive(Component, Clone, Debug, Default)]
pub struct CountryOutline(pub Vec<Vec<Vec3>>);

#[derive(Resource, Default, Debug)]
pub struct CountryStats {
    pub countries: usize,
    pub shapes: usize,
}

/// `b` in every channel, OR'd with [`BASE_TINT`].
pub fn muted_rgb(b: u8) -> u32 {
    let b = b as u32;
    ((b << 16) | (b << 8) | b) | BASE_TINT
}

pub fn feature_color(rng: &mut impl Rng) -> Color {
    let rgb = muted_rgb(rng.gen_range(0..COLOR_JITTER));
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

pub fn respawn_countries(
    mut commands: Commands,
    countries: Query<Entity, With<Country>>,
    root: Query<Entity, With<GlobeRoot>>,
    mut geo_bundle: ResMut<GeoBundle>,
    settings: Res<GlobeSettings>,
    mut stats: ResMut<CountryStats>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !geo_bundle.respawn {
        return;
    }
    let Ok(root) = root.single() else {
        return;
    };
    geo_bundle.respawn = false;

    for entity in countries.iter() {
        commands.entity(entity).despawn();
    }

    let radius = settings.overlay_radius();
    let mut rng = rand::thread_rng();
    let mut batch = Vec::new();

    for feature in &geo_bundle.features {
        let color = feature_color(&mut rng);

        for polygon in &feature.polygons {
            let shape = match build_shape(polygon, radius) {
                Ok(shape) => shape,
                Err(e) => {
                    warn!("Skipping a polygon of {}: {}", feature.name, e);
                    continue;
                }
            };
            let outline = std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .map(|ring| project_ring(ring, radius + settings.overlay_offset * 0.5))
                .collect();

            batch.push((
                Mesh3d(meshes.add(shape.into_mesh())),
                // Own material per entity so a highlight only touches the hovered shape.
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: color,
                    perceptual_roughness: 0.9,
                    ..default()
                })),
                Transform::default(),
                Country {
                    name: feature.name.clone(),
                },
                CountryOutline(outline),
                ChildOf(root),
            ));
        }
    }

    *stats = CountryStats {
        countries: geo_bundle.features.len(),
        shapes: batch.len(),
    };
    info!("Spawning {} shapes for {} countries", stats.shapes, stats.countries);
    commands.spawn_batch(batch);
}

pub fn draw_borders(
    mut gizmos: Gizmos,
    settings: Res<GlobeSettings>,
    outlines: Query<(&CountryOutline, &GlobalTransform)>,
) {
    if !settings.show_borders {
        return;
    }
    let color = rgb(settings.border_color);
    for (outline, transform) in outlines.iter() {
        for ring in &outline.0 {
            gizmos.linestrip(ring.iter().map(|p| transform.transform_point(*p)), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoFeature;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn jitter_is_replicated_and_tinted() {
        assert_eq!(muted_rgb(0), BASE_TINT);
        assert_eq!(muted_rgb(0x11), 0x111111 | BASE_TINT);
        for b in 0..COLOR_JITTER {
            assert_eq!(muted_rgb(b) & BASE_TINT, BASE_TINT);
        }
    }

    #[test]
    fn colors_stay_near_the_tint() {
        let mut rng = StdRng::seed_from_u64(7);
        let max = muted_rgb(COLOR_JITTER - 1);
        for _ in 0..100 {
            let c = feature_color(&mut rng).to_srgba();
            let [r, g, b] = [c.red, c.green, c.blue].map(|v| (v * 255.0).round() as u32);
            assert!(r <= max >> 16 && g <= (max >> 8) & 0xff && b <= max & 0xff);
            assert_eq!(r & (BASE_TINT >> 16), BASE_TINT >> 16);
            assert_eq!(g & ((BASE_TINT >> 8) & 0xff), (BASE_TINT >> 8) & 0xff);
        }
    }

    fn twin_islands() -> GeoFeature {
        let ring = |x: f64| geo::LineString::from(vec![(x, 0.0), (x + 10.0, 0.0), (x, 10.0), (x, 0.0)]);
        GeoFeature {
            name: "Twin Islands".to_string(),
            polygons: vec![
                geo::Polygon::new(ring(0.0), vec![]),
                geo::Polygon::new(ring(20.0), vec![]),
                geo::Polygon::new(geo::LineString::from(vec![(50.0, 0.0), (51.0, 1.0)]), vec![]),
            ],
        }
    }

    fn respawn_app(settings: GlobeSettings) -> (App, Entity) {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<CountryStats>()
            .init_resource::<GeoBundle>()
            .insert_resource(settings)
            .add_systems(Update, respawn_countries);
        let root = app.world_mut().spawn((GlobeRoot, Transform::default())).id();
        app.world_mut().resource_mut::<GeoBundle>().replace(vec![twin_islands()]);
        (app, root)
    }

    fn spawned(app: &mut App) -> Vec<(Entity, String, Entity, Handle<Mesh>, Handle<StandardMaterial>)> {
        let mut query = app
            .world_mut()
            .query::<(Entity, &Country, &ChildOf, &Mesh3d, &MeshMaterial3d<StandardMaterial>)>();
        query
            .iter(app.world())
            .map(|(e, c, parent, mesh, material)| {
                (e, c.name.clone(), parent.parent(), mesh.0.clone(), material.0.clone())
            })
            .collect()
    }

    #[test]
    fn one_entity_per_polygon_under_the_root() {
        let settings = GlobeSettings::default();
        let radius = settings.overlay_radius();
        let (mut app, root) = respawn_app(settings);
        app.update();

        let countries = spawned(&mut app);
        assert_eq!(countries.len(), 2);

        let stats = app.world().resource::<CountryStats>();
        assert_eq!((stats.countries, stats.shapes), (1, 2));
        assert!(!app.world().resource::<GeoBundle>().respawn);

        let materials = app.world().resource::<Assets<StandardMaterial>>();
        let meshes = app.world().resource::<Assets<Mesh>>();
        let colors: Vec<Color> = countries
            .iter()
            .map(|(.., material)| materials.get(material).unwrap().base_color)
            .collect();
        assert_eq!(colors[0], colors[1]);
        assert_ne!(countries[0].4, countries[1].4);

        for (_, name, parent, mesh, _) in &countries {
            assert_eq!(name, "Twin Islands");
            assert_eq!(*parent, root);
            let positions = meshes
                .get(mesh)
                .unwrap()
                .attribute(Mesh::ATTRIBUTE_POSITION)
                .and_then(|v| v.as_float3())
                .unwrap();
            assert_eq!(positions.len(), 3);
            for p in positions {
                assert!((Vec3::from(*p).length() - radius).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn feature_lands_at_globe_radius() {
        let settings = GlobeSettings {
            globe_radius: 20.0,
            overlay_offset: 0.0,
            ..default()
        };
        let (mut app, _) = respawn_app(settings);
        app.update();

        let countries = spawned(&mut app);
        let meshes = app.world().resource::<Assets<Mesh>>();
        let mut heights: Vec<Vec<f32>> = countries
            .iter()
            .map(|(.., mesh, _)| {
                let mut ys: Vec<f32> = meshes
                    .get(mesh)
                    .unwrap()
                    .attribute(Mesh::ATTRIBUTE_POSITION)
                    .and_then(|v| v.as_float3())
                    .unwrap()
                    .iter()
                    .map(|p| p[1])
                    .collect();
                ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
                ys
            })
            .collect();
        heights.dedup_by(|a, b| a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4));

        assert_eq!(heights.len(), 1);
        let ys = &heights[0];
        assert!(ys[0].abs() < 1e-4 && ys[1].abs() < 1e-4);
        assert!((ys[2] - 20.0 * 10f32.to_radians().sin()).abs() < 1e-4);
    }

    #[test]
    fn respawn_replaces_previous_countries() {
        let (mut app, _) = respawn_app(GlobeSettings::default());
        app.update();
        let first: Vec<Entity> = spawned(&mut app).iter().map(|(e, ..)| *e).collect();

        app.world_mut().resource_mut::<GeoBundle>().replace(vec![twin_islands()]);
        app.update();
        let second: Vec<Entity> = spawned(&mut app).iter().map(|(e, ..)| *e).collect();

        assert_eq!(second.len(), 2);
        assert!(first.iter().all(|e| app.world().get_entity(*e).is_err()));
        assert_eq!(app.world().resource::<CountryStats>().shapes, 2);
    }

    #[test]
    fn nothing_spawns_without_a_globe_root() {
        let (mut app, root) = respawn_app(GlobeSettings::default());
        app.world_mut().despawn(root);
        app.update();

        assert!(spawned(&mut app).is_empty());
        assert!(app.world().resource::<GeoBundle>().respawn);
    }

    #[test]
    fn seeded_colors_repeat() {
        let a: Vec<_> = (0..5).map(|_| feature_color(&mut StdRng::seed_from_u64(1))).collect();
        assert!(a.windows(2).all(|w| w[0] == w[1]));
    }
}
