//! Sun light

use bevy::light::SunDisk;
use bevy::prelude::*;

use crate::clock::SunDirection;
use crate::config::MapOptions;

/// Far enough to sit outside the globe; the distance does not change a directional light.
const SUN_DISTANCE_KM: f32 = 150_000.0;

/// Marker component for the sun directional light
#[derive(Component)]
pub struct SunLight;

pub fn spawn_sun(mut commands: Commands, options: Res<MapOptions>, sun: Res<SunDirection>) {
    if !options.sun {
        debug!("Sun disabled");
        return;
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: options.shadows,
            ..default()
        },
        SunDisk::EARTH,
        SunLight,
        Transform::from_translation(sun.0 * SUN_DISTANCE_KM).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Sun"),
    ));
}

/// Keep the light pointed along the current sun direction.
pub fn update_sun_light_direction(
    sun_direction: Res<SunDirection>,
    mut lights: Query<&mut Transform, With<SunLight>>,
) {
    if !sun_direction.is_changed() {
        return;
    }

    let dir = sun_direction.0.normalize_or_zero();
    if dir.length_squared() == 0.0 {
        return;
    }

    for mut transform in lights.iter_mut() {
        transform.translation = dir * SUN_DISTANCE_KM;
        // -Z of the light faces the globe.
        transform.look_at(Vec3::ZERO, Vec3::Y);
    }
}
