//! Ring spawning systems

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::coordinates::Ellipsoid;
use crate::rings::config::RingConfig;
use crate::rings::generator::{PointSequence, RingInstance, ring_instances};

/// Random source for ring orientations and scales.
#[derive(Resource)]
pub struct RingRng(pub StdRng);

impl RingRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl FromWorld for RingRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world.get_resource::<RingConfig>().and_then(|cfg| cfg.seed);
        Self::new(seed)
    }
}

/// The one ring geometry every instance draws.
#[derive(Resource)]
pub struct RingGeometry {
    pub sequence: PointSequence,
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// Build the shared ring mesh once and spawn `instance_count` transformed copies.
pub fn spawn_rings(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<RingConfig>,
    ellipsoid: Res<Ellipsoid>,
    mut rng: ResMut<RingRng>,
) -> Result {
    if !config.enabled {
        info!("Rings disabled");
        return Ok(());
    }

    let sequence = PointSequence::generate(&*ellipsoid, &config)?;
    debug!(
        "Ring geometry: {} points, seam gap {:.3e} km",
        sequence.len(),
        sequence.seam_gap()
    );

    let mesh = meshes.add(sequence.to_line_mesh());
    let material = materials.add(StandardMaterial {
        base_color: config.line_color(),
        unlit: true,
        ..default()
    });

    let instances = ring_instances(&mut rng.0, config.instance_count, config.scale_jitter);
    for (i, instance) in instances.into_iter().enumerate() {
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            instance.transform(),
            instance,
            Name::new(format!("Ring {}", i)),
        ));
    }
    info!(
        "Spawned {} rings at lat {} deg, height {} m",
        config.instance_count, config.latitude_deg, config.height_m
    );

    commands.insert_resource(RingGeometry {
        sequence,
        mesh,
        material,
    });
    Ok(())
}

/// True when rings are enabled but were never built, e.g. switched on after startup.
pub fn rings_pending(config: Res<RingConfig>, geometry: Option<Res<RingGeometry>>) -> bool {
    config.enabled && geometry.is_none()
}

/// R toggles the rings.
pub fn toggle_rings(input: Res<ButtonInput<KeyCode>>, mut config: ResMut<RingConfig>) {
    if input.just_pressed(KeyCode::KeyR) {
        config.enabled = !config.enabled;
        info!("Rings {}", if config.enabled { "on" } else { "off" });
    }
}

/// Hide or show the spawned rings whenever `RingConfig::enabled` changes.
pub fn sync_ring_visibility(
    config: Res<RingConfig>,
    mut rings: Query<&mut Visibility, With<RingInstance>>,
) {
    if !config.is_changed() {
        return;
    }
    let target = if config.enabled {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut rings {
        visibility.set_if_neq(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use rand::Rng;

    fn ring_world(config: RingConfig) -> World {
        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.insert_resource(Ellipsoid::WGS84);
        world.insert_resource(RingRng::new(Some(42)));
        world.insert_resource(config);
        world
    }

    /// Runs `spawn_rings` and reports whether it failed.
    fn run_spawn(world: &mut World) -> bool {
        world
            .run_system_once(spawn_rings.pipe(|In(result): In<Result>| result.is_err()))
            .expect("spawn_rings runs")
    }

    fn ring_count(world: &mut World) -> usize {
        world
            .query_filtered::<Entity, With<RingInstance>>()
            .iter(world)
            .count()
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a: f32 = RingRng::new(Some(9)).0.r#gen();
        let b: f32 = RingRng::new(Some(9)).0.r#gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rng_reads_seed_from_config() {
        let mut world = World::new();
        world.insert_resource(RingConfig {
            seed: Some(3),
            ..default()
        });
        let mut from_world = RingRng::from_world(&mut world);
        let mut direct = RingRng::new(Some(3));
        assert_eq!(from_world.0.r#gen::<u64>(), direct.0.r#gen::<u64>());
    }

    #[test]
    fn test_spawn_shares_one_geometry() {
        let mut world = ring_world(RingConfig::default());
        assert!(!run_spawn(&mut world));

        assert_eq!(ring_count(&mut world), 100);
        assert_eq!(world.resource::<Assets<Mesh>>().len(), 1);
        assert_eq!(world.resource::<Assets<StandardMaterial>>().len(), 1);

        let shared = world.resource::<RingGeometry>().mesh.id();
        let mut meshes = world.query_filtered::<&Mesh3d, With<RingInstance>>();
        assert!(meshes.iter(&world).all(|m| m.0.id() == shared));
        assert_eq!(world.resource::<RingGeometry>().sequence.len(), 201);
    }

    #[test]
    fn test_spawn_applies_instance_transforms() {
        let mut world = ring_world(RingConfig::default());
        assert!(!run_spawn(&mut world));
        let mut rings = world.query::<(&RingInstance, &Transform)>();
        for (instance, transform) in rings.iter(&world) {
            assert_eq!(*transform, instance.transform());
            assert!(transform.scale.x >= 1.0 && transform.scale.x < 1.01);
        }
    }

    #[test]
    fn test_disabled_spawns_nothing() {
        let mut world = ring_world(RingConfig {
            enabled: false,
            ..default()
        });
        assert!(!run_spawn(&mut world));
        assert_eq!(ring_count(&mut world), 0);
        assert_eq!(world.resource::<Assets<Mesh>>().len(), 0);
        assert!(!world.contains_resource::<RingGeometry>());
    }

    #[test]
    fn test_too_few_samples_fails() {
        let mut world = ring_world(RingConfig {
            sample_count: 1,
            ..default()
        });
        assert!(run_spawn(&mut world));
        assert_eq!(ring_count(&mut world), 0);
        assert!(!world.contains_resource::<RingGeometry>());
    }

    #[test]
    fn test_enable_after_startup_spawns_then_hides() {
        let mut world = ring_world(RingConfig {
            enabled: false,
            ..default()
        });
        assert!(!run_spawn(&mut world));
        assert!(!world.run_system_once(rings_pending).unwrap());

        world.resource_mut::<RingConfig>().enabled = true;
        assert!(world.run_system_once(rings_pending).unwrap());
        assert!(!run_spawn(&mut world));
        assert_eq!(ring_count(&mut world), 100);
        assert!(!world.run_system_once(rings_pending).unwrap());

        world.resource_mut::<RingConfig>().enabled = false;
        world.run_system_once(sync_ring_visibility).unwrap();
        let mut visibility = world.query_filtered::<&Visibility, With<RingInstance>>();
        assert!(visibility.iter(&world).all(|v| *v == Visibility::Hidden));

        world.resource_mut::<RingConfig>().enabled = true;
        world.run_system_once(sync_ring_visibility).unwrap();
        assert!(visibility.iter(&world).all(|v| *v == Visibility::Inherited));
        // Re-enabling reuses the existing rings.
        assert!(!world.run_system_once(rings_pending).unwrap());
    }
}
