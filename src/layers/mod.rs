//! Map layer configuration
//!
//! Elevation, WMS imagery, OGC 3D Tiles, cloud and Google 3D Tiles layers are
//! registered into slots at startup and their endpoints probed once.

use bevy::prelude::*;

pub mod probe;
pub mod registry;
pub mod systems;
pub mod types;

pub use registry::{LayerRegistry, LayerStatus, RegisteredLayer};
pub use systems::{LayerSettings, LayerSlot, TilesetAnchor, process_probe_results_system};
pub use types::{LayerError, MapLayer};

/// Plugin for the layer stack
pub struct LayersPlugin;

impl Plugin for LayersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LayerSettings>()
            .init_resource::<LayerRegistry>()
            .add_systems(
                Startup,
                (
                    systems::register_layers,
                    (systems::spawn_tileset_anchors, systems::start_layer_probes),
                )
                    .chain(),
            )
            .add_systems(Update, process_probe_results_system);
    }
}
