//! Axes visualization systems

use bevy::prelude::*;

use crate::config::MapOptions;

/// Length of the globe's axes; anchors get a short pair.
const GLOBE_AXES_KM: f32 = 8000.0;
const ANCHOR_AXES_KM: f32 = 0.5;

/// Component marker for entities that should display axes
#[derive(Component)]
pub struct ShowAxes;

/// System to draw axes for entities with the ShowAxes component
pub fn draw_axes(
    mut gizmos: Gizmos,
    query: Query<&Transform, With<ShowAxes>>,
    options: Res<MapOptions>,
) {
    if !options.debug {
        return;
    }
    for &transform in &query {
        // Gizmo axes inherit the entity scale; the globe carries its radius there.
        let scale = transform.scale.x.abs().max(f32::EPSILON);
        let length = if scale > 1.0 {
            GLOBE_AXES_KM
        } else {
            ANCHOR_AXES_KM
        };
        gizmos.axes(transform, length / scale);
    }
}
