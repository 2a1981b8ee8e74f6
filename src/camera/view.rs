//! Initial camera framing from geodetic positions

use bevy::math::DVec3;
use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;
use serde::{Deserialize, Serialize};

use crate::core::coordinates::{GeodeticPoint, GeodeticTransform};

/// Smallest orbit radius (km) used when camera and target coincide.
pub const MIN_ORBIT_RADIUS_KM: f32 = 0.001;

/// Where the camera starts and what it looks at.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub position: GeodeticPoint,
    pub target: GeodeticPoint,
}

impl Default for CameraView {
    fn default() -> Self {
        // Looking north over Berlin, a little above the rooftops.
        Self {
            position: GeodeticPoint::new(13.42, 52.480, 300.0),
            target: GeodeticPoint::new(13.42, 52.4895, 170.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl OrbitPose {
    /// Camera position PanOrbit derives from this pose.
    pub fn eye(&self) -> Vec3 {
        let rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(-self.pitch);
        self.focus + rotation * Vec3::new(0.0, 0.0, self.radius)
    }
}

/// Orbit pose that puts the camera at `view.position` looking at `view.target`.
pub fn orbit_pose<T: GeodeticTransform + ?Sized>(transform: &T, view: &CameraView) -> OrbitPose {
    let focus = transform.forward(view.target);
    let eye = transform.forward(view.position);
    let offset = eye - focus;
    let radius = offset.length();
    if radius < MIN_ORBIT_RADIUS_KM as f64 {
        return OrbitPose {
            focus: focus.as_vec3(),
            radius: MIN_ORBIT_RADIUS_KM,
            yaw: 0.0,
            pitch: 0.0,
        };
    }
    let dir: DVec3 = offset / radius;
    OrbitPose {
        focus: focus.as_vec3(),
        radius: radius as f32,
        yaw: dir.x.atan2(dir.z) as f32,
        pitch: dir.y.clamp(-1.0, 1.0).asin() as f32,
    }
}

/// Snap a PanOrbit camera to `view`.
pub fn move_and_look_at<T: GeodeticTransform + ?Sized>(
    camera: &mut PanOrbitCamera,
    transform: &T,
    view: &CameraView,
) -> OrbitPose {
    let pose = orbit_pose(transform, view);
    camera.focus = pose.focus;
    camera.target_focus = pose.focus;
    camera.radius = Some(pose.radius);
    camera.target_radius = pose.radius;
    camera.yaw = Some(pose.yaw);
    camera.target_yaw = pose.yaw;
    camera.pitch = Some(pose.pitch);
    camera.target_pitch = pose.pitch;
    camera.force_update = true;
    pose
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coordinates::Ellipsoid;

    #[test]
    fn test_pose_reproduces_eye_position() {
        let e = Ellipsoid::WGS84;
        let view = CameraView::default();
        let pose = orbit_pose(&e, &view);
        let expected = e.forward(view.position).as_vec3();
        // f32 around 6000 km resolves to roughly half a metre.
        assert!((pose.eye() - expected).length() < 0.002, "{:?}", pose);
    }

    #[test]
    fn test_default_view_radius() {
        let pose = orbit_pose(&Ellipsoid::WGS84, &CameraView::default());
        // ~1.06 km north and 130 m lower.
        assert!(pose.radius > 1.0 && pose.radius < 1.1, "{}", pose.radius);
    }

    #[test]
    fn test_coincident_points_use_min_radius() {
        let p = GeodeticPoint::new(0.0, 0.0, 0.0);
        let pose = orbit_pose(
            &Ellipsoid::WGS84,
            &CameraView {
                position: p,
                target: p,
            },
        );
        assert_eq!(pose.radius, MIN_ORBIT_RADIUS_KM);
        assert_eq!((pose.yaw, pose.pitch), (0.0, 0.0));
    }

    #[test]
    fn test_camera_above_north_pole_pitches_up() {
        let view = CameraView {
            position: GeodeticPoint::new(0.0, 90.0, 10_000_000.0),
            target: GeodeticPoint::new(0.0, 90.0, 0.0),
        };
        let pose = orbit_pose(&Ellipsoid::WGS84, &view);
        assert!((pose.pitch - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
        assert!((pose.radius - 10_000.0).abs() < 1e-2);
    }

    #[test]
    fn test_move_and_look_at_sets_targets() {
        let mut camera = PanOrbitCamera::default();
        let pose = move_and_look_at(&mut camera, &Ellipsoid::WGS84, &CameraView::default());
        assert_eq!(camera.focus, pose.focus);
        assert_eq!(camera.radius, Some(pose.radius));
        assert_eq!(camera.target_yaw, pose.yaw);
        assert!(camera.force_update);
    }
}
