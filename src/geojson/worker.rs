use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use bevy_tasks::futures_lite::future;
use crossbeam_channel::{Receiver, bounded};

use crate::settings::{DataSource, GlobeSettings};
use crate::types::{GeoBundle, GeoFeature};

use super::{LoadError, parse_features};

#[cfg(not(target_arch = "wasm32"))]
const ASSET_DIR: &str = "assets";

#[derive(Resource, Deref)]
pub struct GeoDataReceiver(pub Receiver<Vec<GeoFeature>>);

#[derive(Component)]
struct FetchTask(Task<()>);

/// Kicks off the one and only data request. The result, empty on failure, comes back
/// through [`GeoDataReceiver`].
pub fn start_fetch(mut commands: Commands, settings: Res<GlobeSettings>) {
    let (tx, rx) = bounded::<Vec<GeoFeature>>(1);
    let source = settings.data_source.clone();
    let timeout = settings.fetch_timeout_secs;

    let task = AsyncComputeTaskPool::get().spawn(async move {
        let features = match fetch_features(&source, timeout).await {
            Ok(features) => {
                info!("Loaded {} countries from {}", features.len(), source);
                features
            }
            Err(e) => {
                error!("Could not load {}: {}", source, e);
                Vec::new()
            }
        };
        let _ = tx.send(features);
    });

    commands.spawn(FetchTask(task));
    commands.insert_resource(GeoDataReceiver(rx));
}

pub async fn fetch_features(source: &DataSource, timeout: Option<u64>) -> Result<Vec<GeoFeature>, LoadError> {
    let data = fetch_document(source, timeout).await?;
    parse_features(&data)
}

#[cfg(not(target_arch = "wasm32"))]
async fn fetch_document(source: &DataSource, timeout: Option<u64>) -> Result<String, LoadError> {
    use std::time::Duration;
    use ureq::Agent;

    match source {
        DataSource::Asset(path) => Ok(std::fs::read_to_string(std::path::Path::new(ASSET_DIR).join(path))?),
        DataSource::File(path) => Ok(std::fs::read_to_string(path)?),
        DataSource::Url(url) => {
            let config = Agent::config_builder()
                .timeout_global(timeout.map(Duration::from_secs))
                .build();
            let agent: Agent = config.into();
            let mut response = agent.get(url).call()?;
            Ok(response.body_mut().read_to_string()?)
        }
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_document(source: &DataSource, _timeout: Option<u64>) -> Result<String, LoadError> {
    let url = match source {
        DataSource::Asset(path) => format!("assets/{path}"),
        DataSource::Url(url) => url.clone(),
        DataSource::File(_) => return Err(LoadError::FileInBrowser),
    };

    let response = gloo_net::http::Request::get(&url).send().await?;
    if !response.ok() {
        return Err(LoadError::Status(response.status()));
    }
    Ok(response.text().await?)
}

pub fn read_geo_receiver(
    receiver: Option<Res<GeoDataReceiver>>,
    mut geo_bundle: ResMut<GeoBundle>,
    mut commands: Commands,
) {
    if let Some(receiver) = receiver {
        if let Ok(features) = receiver.try_recv() {
            geo_bundle.replace(features);
            commands.remove_resource::<GeoDataReceiver>();
        }
    }
}

fn cleanup_tasks(mut commands: Commands, mut tasks: Query<(Entity, &mut FetchTask)>) {
    for (entity, mut task) in tasks.iter_mut() {
        if future::block_on(future::poll_once(&mut task.0)).is_some() {
            commands.entity(entity).despawn();
        }
    }
}

pub struct GeoWorkerPlugin;

impl Plugin for GeoWorkerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, start_fetch)
            .add_systems(Update, (read_geo_receiver, cleanup_tasks));
    }
}
