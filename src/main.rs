use bevy::light::GlobalAmbientLight;
use bevy::picking::prelude::*;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};

#[cfg(feature = "dev_camera")]
use bevy_camera_controller::free_camera::{FreeCamera, FreeCameraPlugin};
#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod camera;
mod clock;
mod config;
mod core;
mod layers;
mod rings;
mod visualization;

use camera::CameraPlugin;
#[cfg(feature = "dev_camera")]
use camera::MainCamera;
use clock::ClockPlugin;
use config::ViewerConfig;
use crate::core::coordinates::Ellipsoid;
use layers::LayersPlugin;
use rings::RingsPlugin;
use visualization::VisualizationPlugin;

#[cfg(feature = "dev_camera")]
#[derive(Component)]
struct DevCamera;

#[cfg(feature = "dev_camera")]
fn setup_dev_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.0005,
            far: 250_000.0,
            ..default()
        }),
        Camera {
            order: 2,
            is_active: false,
            ..default()
        },
        FreeCamera::default(),
        DevCamera,
    ));
}

#[cfg(feature = "dev_camera")]
fn toggle_dev_camera(
    input: Res<ButtonInput<KeyCode>>,
    mut main_camera: Query<&mut Camera, (With<MainCamera>, Without<DevCamera>)>,
    mut dev_camera: Query<&mut Camera, With<DevCamera>>,
) {
    if !input.just_pressed(KeyCode::F2) {
        return;
    }

    if let Ok(mut main) = main_camera.single_mut()
        && let Ok(mut dev) = dev_camera.single_mut()
    {
        let dev_active = dev.is_active;
        dev.is_active = !dev_active;
        main.is_active = dev_active;
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Globe Rings".to_string(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    // Read after the log plugin is up so config problems are reported.
    ViewerConfig::load().insert_into(&mut app);

    // Keeps the night side readable.
    app.insert_resource(GlobalAmbientLight {
        brightness: 150.0,
        ..default()
    });
    app.init_resource::<Ellipsoid>();

    app.add_plugins(MeshPickingPlugin);
    app.add_plugins(ClockPlugin);
    app.add_plugins(CameraPlugin);
    app.add_plugins(VisualizationPlugin);
    app.add_plugins(LayersPlugin);
    app.add_plugins(RingsPlugin);

    #[cfg(feature = "dev_camera")]
    {
        app.add_plugins(FreeCameraPlugin);
        app.add_systems(Startup, setup_dev_camera);
        app.add_systems(Update, toggle_dev_camera);
    }

    app.run();
}
