use std::fmt;
use std::path::PathBuf;

use bevy::prelude::*;
use bevy_egui::{
    EguiContexts, EguiPreUpdateSet,
    egui::{self, Color32, RichText, color_picker::color_edit_button_srgb},
};
use serde::{Deserialize, Serialize};

use crate::{geojson::CountryStats, tools::HoverSelection};

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GlobeSettings::load())
            .add_systems(Update, settings_ui.after(EguiPreUpdateSet::InitContexts));
    }
}

/// Where the country outlines come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Path inside the asset directory, fetched relative to the page in the browser.
    Asset(String),
    /// Absolute http(s) URL.
    Url(String),
    /// Local file, native builds only.
    File(PathBuf),
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Asset("countries.geojson".to_string())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Asset(path) => write!(f, "asset {path}"),
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeSettings {
    pub data_source: DataSource,
    /// Optional global timeout for the data request, in seconds.
    pub fetch_timeout_secs: Option<u64>,
    pub globe_radius: f32,
    /// Height of the country meshes above the globe surface.
    pub overlay_offset: f32,
    pub globe_color: [u8; 3],
    pub highlight_color: [u8; 3],
    pub border_color: [u8; 3],
    pub show_borders: bool,
    pub auto_rotate: bool,
    /// Radians per rendered frame.
    pub rotation_speed: f32,
    pub camera_distance: f32,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            data_source: DataSource::default(),
            fetch_timeout_secs: None,
            globe_radius: 20.0,
            overlay_offset: 0.15,
            globe_color: [18, 42, 74],
            highlight_color: [255, 196, 0],
            border_color: [230, 230, 230],
            show_borders: false,
            auto_rotate: true,
            rotation_speed: 0.002,
            camera_distance: 60.0,
        }
    }
}

impl GlobeSettings {
    pub fn overlay_radius(&self) -> f32 {
        self.globe_radius + self.overlay_offset
    }

    pub fn highlight(&self) -> Color {
        rgb(self.highlight_color)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Reads `globe.json` from the platform config directory, falling back to the
    /// defaults when it is missing or broken.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Some(dirs) = directories::ProjectDirs::from("org", "country-globe", "country-globe") else {
            warn!("No home directory found, using default settings");
            return Self::default();
        };
        let path = dirs.config_dir().join("globe.json");

        match std::fs::read_to_string(&path) {
            Ok(data) => match Self::from_json(&data) {
                Ok(settings) => {
                    info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::default()
    }
}

pub fn rgb(c: [u8; 3]) -> Color {
    Color::srgb_u8(c[0], c[1], c[2])
}

fn settings_ui(
    mut contexts: EguiContexts,
    mut settings: ResMut<GlobeSettings>,
    stats: Res<CountryStats>,
    selection: Res<HoverSelection>,
) {
    let ctx = contexts.ctx_mut();
    let color = Color32::from_rgb(221, 221, 221);

    egui::Area::new("globe_settings".into())
        .fixed_pos(egui::pos2(10.0, 10.0))
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_premultiplied(30, 30, 30, 230))
                .corner_radius(10.0)
                .inner_margin(10.0)
                .shadow(egui::epaint::Shadow {
                    color: egui::Color32::from_black_alpha(60),
                    offset: [5, 5],
                    blur: 10,
                    spread: 5,
                })
                .show(ui, |ui| {
                    ui.set_width(190.0);
                    ui.spacing_mut().item_spacing = egui::vec2(8.0, 10.0);

                    ui.checkbox(&mut settings.auto_rotate, RichText::new("Auto rotate").color(color));
                    ui.add(
                        egui::Slider::new(&mut settings.rotation_speed, 0.0..=0.02)
                            .text(RichText::new("Speed").color(color)),
                    );
                    ui.checkbox(&mut settings.show_borders, RichText::new("Borders").color(color));

                    ui.horizontal(|ui| {
                        color_edit_button_srgb(ui, &mut settings.highlight_color);
                        ui.label(RichText::new("Highlight").color(color));
                    });
                    ui.horizontal(|ui| {
                        color_edit_button_srgb(ui, &mut settings.border_color);
                        ui.label(RichText::new("Border").color(color));
                    });

                    ui.separator();
                    ui.label(
                        RichText::new(format!("{} countries, {} shapes", stats.countries, stats.shapes))
                            .color(Color32::from_rgb(135, 135, 135)),
                    );
                    if let Some(name) = selection.selected_name() {
                        ui.label(RichText::new(name).color(Color32::WHITE));
                    }
                });
        });
}
