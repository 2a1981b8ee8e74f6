//! Simulation clock and sun position

use bevy::prelude::*;
use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};

use crate::config::MapOptions;
use crate::core::coordinates::{Ellipsoid, GeodeticPoint, GeodeticTransform};

/// Earth's axial tilt (degrees).
const OBLIQUITY_DEG: f64 = 23.44;

/// UTC instant the sun is computed for; runs `speed` times faster than the wall clock.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SimulationClock {
    pub utc: DateTime<Utc>,
    pub speed: f64,
}

impl SimulationClock {
    pub fn starting_now(speed: f64) -> Self {
        Self {
            utc: Utc::now(),
            speed,
        }
    }

    /// Step by `real_secs` of wall time. Negative or non-finite steps are ignored.
    pub fn advance(&mut self, real_secs: f64) {
        let step = real_secs * self.speed;
        if !step.is_finite() || step <= 0.0 {
            return;
        }
        let micros = (step * 1e6).round() as i64;
        if let Some(utc) = self.utc.checked_add_signed(TimeDelta::microseconds(micros)) {
            self.utc = utc;
        }
    }
}

impl FromWorld for SimulationClock {
    fn from_world(world: &mut World) -> Self {
        let speed = world
            .get_resource::<MapOptions>()
            .map_or(1.0, |options| options.clock_speed);
        Self::starting_now(speed)
    }
}

/// Unit vector from the globe centre towards the sun, in render space.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SunDirection(pub Vec3);

impl Default for SunDirection {
    fn default() -> Self {
        Self(Vec3::Z)
    }
}

/// Plugin for the simulation clock
pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationClock>()
            .init_resource::<SunDirection>()
            .add_systems(Update, (tick_simulation_clock, update_sun_direction).chain());
    }
}

pub fn tick_simulation_clock(time: Res<Time>, mut clock: ResMut<SimulationClock>) {
    clock.advance(time.delta_secs_f64());
}

/// Point on the ground where the sun is at the zenith.
///
/// Low-precision model: declination from the day of year, longitude from
/// the UTC hour. Good to about a degree, which is all the lighting needs.
pub fn subsolar_point(utc: DateTime<Utc>) -> GeodeticPoint {
    let day_of_year = utc.ordinal() as f64;
    let declination =
        -OBLIQUITY_DEG * (std::f64::consts::TAU * (day_of_year + 10.0) / 365.0).cos();

    let hours = utc.hour() as f64 + utc.minute() as f64 / 60.0 + utc.second() as f64 / 3600.0;
    let mut longitude = -15.0 * (hours - 12.0);
    if longitude <= -180.0 {
        longitude += 360.0;
    }

    GeodeticPoint::new(longitude, declination, 0.0)
}

/// Render-space direction to the sun for the given instant.
pub fn sun_direction_at<T: GeodeticTransform + ?Sized>(transform: &T, utc: DateTime<Utc>) -> Vec3 {
    transform
        .forward(subsolar_point(utc))
        .normalize_or_zero()
        .as_vec3()
}

/// Track the subsolar point while the clock option is on; otherwise keep +Z.
pub fn update_sun_direction(
    options: Res<MapOptions>,
    clock: Res<SimulationClock>,
    ellipsoid: Res<Ellipsoid>,
    mut sun: ResMut<SunDirection>,
) {
    let dir = if options.clock {
        sun_direction_at(&*ellipsoid, clock.utc)
    } else {
        Vec3::Z
    };
    if dir != Vec3::ZERO && dir != sun.0 {
        sun.0 = dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock_at(speed: f64) -> SimulationClock {
        SimulationClock {
            utc: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            speed,
        }
    }

    #[test]
    fn test_clock_runs_at_configured_speed() {
        let mut clock = clock_at(60.0);
        clock.advance(1.5);
        assert_eq!(clock.utc, Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 30).unwrap());
    }

    #[test]
    fn test_clock_ignores_bad_steps() {
        let mut clock = clock_at(1.0);
        let start = clock.utc;
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.utc, start);

        let mut paused = clock_at(0.0);
        paused.advance(10.0);
        assert_eq!(paused.utc, start);
    }

    #[test]
    fn test_clock_speed_from_map_options() {
        let mut world = World::new();
        world.insert_resource(MapOptions {
            clock_speed: 3600.0,
            ..default()
        });
        assert_eq!(SimulationClock::from_world(&mut world).speed, 3600.0);
        assert_eq!(SimulationClock::from_world(&mut World::new()).speed, 1.0);
    }

    #[test]
    fn test_noon_utc_sun_over_greenwich() {
        let noon = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let p = subsolar_point(noon);
        assert!(p.longitude_deg.abs() < 1e-9);
        // Near the equinox the sun sits close to the equator.
        assert!(p.latitude_deg.abs() < 2.0);
    }

    #[test]
    fn test_solstice_declinations() {
        let june = subsolar_point(Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap());
        let december = subsolar_point(Utc.with_ymd_and_hms(2024, 12, 21, 12, 0, 0).unwrap());
        assert!(june.latitude_deg > 23.0);
        assert!(december.latitude_deg < -23.0);
    }

    #[test]
    fn test_sun_moves_west_through_the_day() {
        let morning = subsolar_point(Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap());
        let evening = subsolar_point(Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap());
        assert!((morning.longitude_deg - 90.0).abs() < 1e-9);
        assert!((evening.longitude_deg + 90.0).abs() < 1e-9);

        let midnight = subsolar_point(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!((midnight.longitude_deg - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_sun_direction_is_unit() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let dir = sun_direction_at(&Ellipsoid::WGS84, utc);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        // Greenwich is on +Z in render space.
        assert!(dir.z > 0.99);
    }
}
