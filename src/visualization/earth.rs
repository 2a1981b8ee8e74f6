use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::MapOptions;
use crate::core::coordinates::{Ellipsoid, GeodeticTransform};
use crate::visualization::ShowAxes;

/// Plugin for the globe mesh
pub struct EarthPlugin;

impl Plugin for EarthPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_globe);
    }
}

/// Spawn the reference ellipsoid as a unit icosphere stretched to its axes.
pub fn spawn_globe(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    ellipsoid: Res<Ellipsoid>,
    options: Res<MapOptions>,
) {
    let subdivisions = options.globe_subdivisions();
    let mesh_handle = meshes.add(generate_icosphere(subdivisions));

    let material_handle = materials.add(StandardMaterial {
        base_color: Color::srgb(0.16, 0.32, 0.52),
        perceptual_roughness: 1.0,
        ..default()
    });

    let a = ellipsoid.semi_major_km as f32;
    let b = ellipsoid.semi_minor_km() as f32;
    debug!(
        "Globe: subdivision {}, axes {:.3} x {:.3} km",
        subdivisions, a, b
    );

    let mut globe = commands.spawn((
        Mesh3d(mesh_handle),
        MeshMaterial3d(material_handle),
        // Polar axis is +Y in render space.
        Transform::from_scale(Vec3::new(a, b, a)),
        Visibility::Visible,
        Name::new("Globe"),
    ));
    if options.debug {
        globe.insert(ShowAxes);
    }
    globe.observe(
        |mut event: On<Pointer<Click>>, ellipsoid: Res<Ellipsoid>| {
            if let Some(pos) = event.hit.position {
                let p = ellipsoid.inverse(pos.as_dvec3());
                info!(
                    "Picked lon {:.5}, lat {:.5}, height {:.1} m",
                    p.longitude_deg, p.latitude_deg, p.height_m
                );
            }
            event.propagate(false);
        },
    );
}

/// Unit icosphere; each subdivision level quadruples the triangle count.
pub fn generate_icosphere(subdivisions: u32) -> Mesh {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let mut positions = vec![
        Vec3::new(-1.0, phi, 0.0).normalize(),
        Vec3::new(1.0, phi, 0.0).normalize(),
        Vec3::new(-1.0, -phi, 0.0).normalize(),
        Vec3::new(1.0, -phi, 0.0).normalize(),
        Vec3::new(0.0, -1.0, phi).normalize(),
        Vec3::new(0.0, 1.0, phi).normalize(),
        Vec3::new(0.0, -1.0, -phi).normalize(),
        Vec3::new(0.0, 1.0, -phi).normalize(),
        Vec3::new(phi, 0.0, -1.0).normalize(),
        Vec3::new(phi, 0.0, 1.0).normalize(),
        Vec3::new(-phi, 0.0, -1.0).normalize(),
        Vec3::new(-phi, 0.0, 1.0).normalize(),
    ];

    let mut indices: Vec<u32> = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7,
        1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9,
        8, 1,
    ];

    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    for _ in 0..subdivisions {
        let mut next = Vec::with_capacity(indices.len() * 4);
        midpoints.clear();

        for tri in indices.chunks(3) {
            let (v1, v2, v3) = (tri[0], tri[1], tri[2]);
            let a = midpoint(&mut positions, &mut midpoints, v1, v2);
            let b = midpoint(&mut positions, &mut midpoints, v2, v3);
            let c = midpoint(&mut positions, &mut midpoints, v3, v1);

            next.extend_from_slice(&[v1, a, c]);
            next.extend_from_slice(&[v2, b, a]);
            next.extend_from_slice(&[v3, c, b]);
            next.extend_from_slice(&[a, b, c]);
        }
        indices = next;
    }

    // On a unit sphere the position is its own normal.
    let normals = positions.clone();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_indices(Indices::U32(indices));
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh
}

fn midpoint(
    positions: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    v1: u32,
    v2: u32,
) -> u32 {
    let key = if v1 < v2 { (v1, v2) } else { (v2, v1) };
    if let Some(&index) = cache.get(&key) {
        return index;
    }

    let mid = ((positions[v1 as usize] + positions[v2 as usize]) / 2.0).normalize();
    positions.push(mid);
    let index = positions.len() as u32 - 1;
    cache.insert(key, index);
    index
}
