//! Decorative geodetic rings
//!
//! One ring of points circling the globe at fixed latitude and height, drawn
//! many times with random tilt and near-unit scale.

use bevy::prelude::*;

pub mod config;
pub mod generator;
pub mod systems;

pub use config::{RingConfig, SeamPolicy};
pub use generator::{PointSequence, RingError, RingInstance, ring_instances, ring_samples};
pub use systems::{
    RingGeometry, RingRng, rings_pending, spawn_rings, sync_ring_visibility, toggle_rings,
};

/// Plugin for the ring generator
pub struct RingsPlugin;

impl Plugin for RingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RingConfig>()
            .init_resource::<RingRng>()
            .add_systems(Startup, spawn_rings)
            .add_systems(
                Update,
                (
                    toggle_rings,
                    spawn_rings.run_if(rings_pending),
                    sync_ring_visibility,
                )
                    .chain(),
            );
    }
}
