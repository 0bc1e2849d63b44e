use std::f32::consts::FRAC_PI_2;

use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll},
    prelude::*,
};

use crate::{EguiBlockInputState, settings::GlobeSettings};

pub struct CameraSystemPlugin;

impl Plugin for CameraSystemPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(Update, (handle_orbit_input, orbit_camera).chain());
    }
}

/// Orbits the origin. Drag with any mouse button to turn, scroll to zoom.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub sensitivity: f32,
    pub enabled: bool,
}

impl OrbitCamera {
    pub fn new(distance: f32, min_distance: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.3,
            distance,
            min_distance,
            max_distance: distance * 4.0,
            sensitivity: 0.005,
            enabled: true,
        }
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.yaw.sin() * self.pitch.cos(),
            self.distance * self.pitch.sin(),
            self.distance * self.yaw.cos() * self.pitch.cos(),
        )
    }

    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.sensitivity;
        let lim = FRAC_PI_2 - 0.017;
        self.pitch = (self.pitch + delta.y * self.sensitivity).clamp(-lim, lim);
    }

    pub fn zoom(&mut self, scroll: f32) {
        let factor = (-scroll * 0.1).exp();
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(Vec3::ZERO, Vec3::Y)
    }
}

fn setup_camera(mut commands: Commands, settings: Res<GlobeSettings>) {
    let orbit = OrbitCamera::new(settings.camera_distance, settings.globe_radius * 1.2);
    commands.spawn((Camera3d::default(), orbit.transform(), orbit));
}

fn handle_orbit_input(
    mut query: Query<&mut OrbitCamera>,
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    state: Res<EguiBlockInputState>,
) {
    for mut orbit in &mut query {
        if state.is_changed() {
            orbit.enabled = !state.block_input;
        }
        if !orbit.enabled {
            continue;
        }
        if buttons.get_pressed().next().is_some() && motion.delta != Vec2::ZERO {
            orbit.rotate(motion.delta);
        }
        if scroll.delta.y != 0.0 {
            orbit.zoom(scroll.delta.y);
        }
    }
}

fn orbit_camera(mut query: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (orbit, mut transform) in &mut query {
        *transform = orbit.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_stays_at_distance() {
        let mut orbit = OrbitCamera::new(60.0, 24.0);
        for step in 0..20 {
            orbit.rotate(Vec2::new(step as f32 * 13.0, -(step as f32) * 7.0));
            assert!((orbit.eye().length() - orbit.distance).abs() < 1e-3);
        }
    }

    #[test]
    fn pitch_never_flips_over_the_pole() {
        let mut orbit = OrbitCamera::new(60.0, 24.0);
        orbit.rotate(Vec2::new(0.0, 1.0e6));
        assert!(orbit.pitch < FRAC_PI_2);
        orbit.rotate(Vec2::new(0.0, -1.0e7));
        assert!(orbit.pitch > -FRAC_PI_2);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = OrbitCamera::new(60.0, 24.0);
        orbit.zoom(1000.0);
        assert_eq!(orbit.distance, 24.0);
        orbit.zoom(-1000.0);
        assert_eq!(orbit.distance, 240.0);
    }

    #[test]
    fn camera_looks_at_the_globe() {
        let transform = OrbitCamera::new(60.0, 24.0).transform();
        let forward = transform.forward();
        assert!(forward.dot(-transform.translation.normalize()) > 0.999);
    }
}
