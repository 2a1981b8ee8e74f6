//! Main camera and its controllers

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

use crate::config::MapOptions;
use crate::core::coordinates::Ellipsoid;

pub mod controllers;
pub mod view;

pub use controllers::{ControllerChain, ControllerKind, apply_controller_chain};
pub use view::{CameraView, OrbitPose, move_and_look_at, orbit_pose};

/// Marker for the camera the viewer renders through.
#[derive(Component)]
pub struct MainCamera;

/// Plugin for the orbit camera
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanOrbitCameraPlugin)
            .init_resource::<ControllerChain>()
            .init_resource::<CameraView>()
            .add_systems(Startup, spawn_main_camera)
            .add_systems(Update, apply_controller_chain);
    }
}

pub fn spawn_main_camera(
    mut commands: Commands,
    view: Res<CameraView>,
    ellipsoid: Res<Ellipsoid>,
    options: Res<MapOptions>,
) {
    let mut pan_orbit = PanOrbitCamera {
        // Close enough to walk the rooftops, far enough to see the whole globe.
        zoom_lower_limit: view::MIN_ORBIT_RADIUS_KM,
        zoom_upper_limit: Some(200_000.0),
        ..default()
    };
    let pose = move_and_look_at(&mut pan_orbit, &*ellipsoid, &view);
    info!(
        "Camera at {:?} looking at {:?} (radius {:.3} km)",
        view.position, view.target, pose.radius
    );

    let clear_color = if options.space {
        ClearColorConfig::Custom(Color::BLACK)
    } else {
        ClearColorConfig::Default
    };

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            // World units are kilometres; the near plane has to admit street-level views.
            near: 0.0005,
            far: 250_000.0,
            ..default()
        }),
        Camera {
            order: 0,
            clear_color,
            ..default()
        },
        pan_orbit,
        MainCamera,
        Tonemapping::TonyMcMapface,
        Transform::from_translation(pose.eye()).looking_at(pose.focus, Vec3::Y),
    ));
}
