//! Axis conventions between standard ECEF and Bevy render space.
//!
//! Mapping: Bevy (x,y,z) = (ECEF.y, ECEF.z, ECEF.x), kilometres throughout.

use bevy::math::DVec3;

/// Standard ECEF km to Bevy render km.
pub fn ecef_to_render_km(ecef_km: DVec3) -> DVec3 {
    DVec3::new(ecef_km.y, ecef_km.z, ecef_km.x)
}

/// Inverse mapping: ECEF (x,y,z) = (Bevy.z, Bevy.x, Bevy.y)
pub fn render_to_ecef_km(render_km: DVec3) -> DVec3 {
    DVec3::new(render_km.z, render_km.x, render_km.y)
}
