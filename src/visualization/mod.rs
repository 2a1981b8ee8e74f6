//! Visualization module
//!
//! Globe mesh, sun light, background and debug axes.

use bevy::prelude::*;

pub mod axes;
pub mod earth;
pub mod lighting;

pub use axes::{ShowAxes, draw_axes};
pub use earth::{EarthPlugin, generate_icosphere};
pub use lighting::{SunLight, spawn_sun, update_sun_light_direction};

/// Plugin for visualization systems
pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EarthPlugin)
            .add_systems(Startup, spawn_sun)
            .add_systems(Update, (draw_axes, update_sun_light_direction));
    }
}
