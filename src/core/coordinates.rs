//! Geodetic coordinates and the host geodetic transform
//!
//! - `GeodeticPoint`: longitude/latitude in degrees, height in metres above the ellipsoid
//! - `GeodeticTransform`: the llh <-> cartesian mapping every consumer goes through
//! - `Ellipsoid`: WGS84 implementation producing Bevy render space in kilometres
//!
//! Render space axes follow `crate::core::space`: Bevy (x,y,z) = (ECEF.y, ECEF.z, ECEF.x),
//! so +Y is the north pole and longitude 0 lies on +Z.

use bevy::math::DVec3;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::core::space::{ecef_to_render_km, render_to_ecef_km};

/// WGS84 semi-major axis (km).
pub const WGS84_A_KM: f64 = 6378.137;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Position on or above the reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub height_m: f64,
}

impl GeodeticPoint {
    pub const fn new(longitude_deg: f64, latitude_deg: f64, height_m: f64) -> Self {
        Self {
            longitude_deg,
            latitude_deg,
            height_m,
        }
    }
}

/// Output of a forward transform, in Bevy render space.
pub type CartesianPoint = DVec3;

/// Mapping between geodetic and render-space cartesian coordinates.
///
/// Implementations are expected to be deterministic and total over
/// longitudes in [0, 360]. Nothing here validates the output; callers
/// that need finite points check for themselves.
pub trait GeodeticTransform {
    fn forward(&self, point: GeodeticPoint) -> CartesianPoint;

    fn inverse(&self, point: CartesianPoint) -> GeodeticPoint;
}

/// Oblate reference ellipsoid, axes in kilometres.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_km: f64,
    pub flattening: f64,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major_km: WGS84_A_KM,
        flattening: WGS84_F,
    };

    pub fn semi_minor_km(&self) -> f64 {
        self.semi_major_km * (1.0 - self.flattening)
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.flattening * (2.0 - self.flattening)
    }

    /// Radius of curvature in the prime vertical at the given latitude (radians).
    fn prime_vertical_radius(&self, lat_rad: f64) -> f64 {
        let s = lat_rad.sin();
        self.semi_major_km / (1.0 - self.e2() * s * s).sqrt()
    }

    /// Geodetic -> standard ECEF (km).
    pub fn to_ecef_km(&self, point: GeodeticPoint) -> DVec3 {
        let lat = point.latitude_deg.to_radians();
        let lon = point.longitude_deg.to_radians();
        let h_km = point.height_m / 1000.0;
        let n = self.prime_vertical_radius(lat);
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        DVec3::new(
            (n + h_km) * cos_lat * cos_lon,
            (n + h_km) * cos_lat * sin_lon,
            (n * (1.0 - self.e2()) + h_km) * sin_lat,
        )
    }

    /// Standard ECEF (km) -> geodetic, fixed-point iteration on latitude.
    pub fn from_ecef_km(&self, ecef: DVec3) -> GeodeticPoint {
        let e2 = self.e2();
        let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
        let longitude_deg = ecef.y.atan2(ecef.x).to_degrees();

        // On the polar axis the iteration degenerates (cos(lat) = 0).
        if p < 1e-9 {
            let latitude_deg = if ecef.z >= 0.0 { 90.0 } else { -90.0 };
            let height_km = ecef.z.abs() - self.semi_minor_km();
            return GeodeticPoint::new(0.0, latitude_deg, height_km * 1000.0);
        }

        let mut lat = ecef.z.atan2(p * (1.0 - e2));
        let mut height_km = 0.0;
        for _ in 0..10 {
            let n = self.prime_vertical_radius(lat);
            height_km = p / lat.cos() - n;
            let next = ecef.z.atan2(p * (1.0 - e2 * n / (n + height_km)));
            let converged = (next - lat).abs() < 1e-14;
            lat = next;
            if converged {
                break;
            }
        }

        GeodeticPoint::new(longitude_deg, lat.to_degrees(), height_km * 1000.0)
    }
}

impl GeodeticTransform for Ellipsoid {
    fn forward(&self, point: GeodeticPoint) -> CartesianPoint {
        ecef_to_render_km(self.to_ecef_km(point))
    }

    fn inverse(&self, point: CartesianPoint) -> GeodeticPoint {
        self.from_ecef_km(render_to_ecef_km(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS_KM: f64 = 1e-6;

    #[test]
    fn test_equator_prime_meridian_on_plus_z() {
        let p = Ellipsoid::WGS84.forward(GeodeticPoint::new(0.0, 0.0, 0.0));
        assert!(p.x.abs() < EPS_KM);
        assert!(p.y.abs() < EPS_KM);
        assert!((p.z - WGS84_A_KM).abs() < EPS_KM);
    }

    #[test]
    fn test_north_pole_on_plus_y_at_semi_minor() {
        let e = Ellipsoid::WGS84;
        let p = e.forward(GeodeticPoint::new(0.0, 90.0, 0.0));
        assert!(p.x.abs() < EPS_KM);
        assert!(p.z.abs() < EPS_KM);
        assert!((p.y - e.semi_minor_km()).abs() < EPS_KM);
    }

    #[test]
    fn test_longitude_90_east_on_plus_x() {
        let p = Ellipsoid::WGS84.forward(GeodeticPoint::new(90.0, 0.0, 0.0));
        assert!((p.x - WGS84_A_KM).abs() < EPS_KM);
        assert!(p.z.abs() < EPS_KM);
    }

    #[test]
    fn test_height_is_metres() {
        let p = Ellipsoid::WGS84.forward(GeodeticPoint::new(0.0, 0.0, 1000.0));
        assert!((p.z - (WGS84_A_KM + 1.0)).abs() < EPS_KM);
    }

    #[test]
    fn test_zero_and_360_longitude_coincide() {
        let e = Ellipsoid::WGS84;
        let a = e.forward(GeodeticPoint::new(0.0, 23.5, 120.0));
        let b = e.forward(GeodeticPoint::new(360.0, 23.5, 120.0));
        assert!((a - b).length() < 1e-9);
    }

    #[test]
    fn test_ecef_roundtrip_berlin() {
        let e = Ellipsoid::WGS84;
        let berlin = GeodeticPoint::new(13.42, 52.4895, 170.0);
        let back = e.from_ecef_km(e.to_ecef_km(berlin));
        assert!((back.longitude_deg - berlin.longitude_deg).abs() < 1e-9);
        assert!((back.latitude_deg - berlin.latitude_deg).abs() < 1e-9);
        assert!((back.height_m - berlin.height_m).abs() < 1e-3);
    }

    #[test]
    fn test_from_ecef_pole() {
        let e = Ellipsoid::WGS84;
        let south = e.from_ecef_km(DVec3::new(0.0, 0.0, -e.semi_minor_km() - 2.0));
        assert_eq!(south.latitude_deg, -90.0);
        assert!((south.height_m - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_space_inverse() {
        let e = Ellipsoid::WGS84;
        let p = GeodeticPoint::new(-73.98, 40.75, 12.0);
        let back = e.inverse(e.forward(p));
        assert!((back.longitude_deg - p.longitude_deg).abs() < 1e-9);
        assert!((back.latitude_deg - p.latitude_deg).abs() < 1e-9);
        assert!((back.height_m - p.height_m).abs() < 1e-3);
    }
}
