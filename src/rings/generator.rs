//! Geodetic ring generation
//!
//! A ring is a uniform longitude sweep at constant latitude and height, pushed
//! through the host `GeodeticTransform`. The resulting point sequence is built
//! once and shared; every `RingInstance` only carries its own rotation and scale.

use std::f32::consts::PI;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;
use rand::Rng;
use thiserror::Error;

use crate::core::coordinates::{CartesianPoint, GeodeticPoint, GeodeticTransform};
use crate::rings::config::{RingConfig, SeamPolicy};

#[derive(Debug, Error, PartialEq)]
pub enum RingError {
    #[error("a ring needs at least 2 samples, got {0}")]
    TooFewSamples(usize),
    #[error("geodetic transform returned a non-finite point for sample {index} ({longitude_deg} deg)")]
    NonFinite { index: usize, longitude_deg: f64 },
}

/// Longitude sweep from 0 to 360 degrees, both ends included.
pub fn ring_samples(
    sample_count: usize,
    latitude_deg: f64,
    height_m: f64,
) -> Result<Vec<GeodeticPoint>, RingError> {
    if sample_count < 2 {
        return Err(RingError::TooFewSamples(sample_count));
    }
    let step = 360.0 / (sample_count - 1) as f64;
    Ok((0..sample_count)
        .map(|i| GeodeticPoint::new(step * i as f64, latitude_deg, height_m))
        .collect())
}

/// Geodetic samples of one ring and their cartesian images.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSequence {
    samples: Vec<GeodeticPoint>,
    points: Vec<CartesianPoint>,
}

impl PointSequence {
    pub fn generate<T: GeodeticTransform + ?Sized>(
        transform: &T,
        config: &RingConfig,
    ) -> Result<Self, RingError> {
        let samples = ring_samples(config.sample_count, config.latitude_deg, config.height_m)?;

        let mut points = Vec::with_capacity(samples.len());
        for (index, sample) in samples.iter().enumerate() {
            let last = index == samples.len() - 1;
            let point = match config.seam {
                SeamPolicy::ReuseFirst if last => points[0],
                _ => transform.forward(*sample),
            };
            if !point.is_finite() {
                return Err(RingError::NonFinite {
                    index,
                    longitude_deg: sample.longitude_deg,
                });
            }
            points.push(point);
        }

        Ok(Self { samples, points })
    }

    pub fn samples(&self) -> &[GeodeticPoint] {
        &self.samples
    }

    pub fn points(&self) -> &[CartesianPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance between the first and last point, in render units.
    pub fn seam_gap(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first.distance(*last),
            _ => 0.0,
        }
    }

    /// Line strip through every point, positions narrowed to f32.
    pub fn to_line_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self
            .points
            .iter()
            .map(|p| p.as_vec3().to_array())
            .collect();
        let mut mesh = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh
    }
}

/// Per-entity transform of the shared ring geometry.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct RingInstance {
    /// Rotation about local X, then Y, then Z (radians), each in [0, PI).
    pub angles: [f32; 3],
    /// Uniform scale in [1, 1 + jitter).
    pub scale: f32,
}

impl RingInstance {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, scale_jitter: f32) -> Self {
        let angles = [
            rng.gen_range(0.0..PI),
            rng.gen_range(0.0..PI),
            rng.gen_range(0.0..PI),
        ];
        let scale = if scale_jitter > 0.0 {
            1.0 + rng.gen_range(0.0..scale_jitter)
        } else {
            1.0
        };
        Self { angles, scale }
    }

    pub fn rotation(&self) -> Quat {
        let [x, y, z] = self.angles;
        Quat::from_rotation_x(x) * Quat::from_rotation_y(y) * Quat::from_rotation_z(z)
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translation: Vec3::ZERO,
            rotation: self.rotation(),
            scale: Vec3::splat(self.scale),
        }
    }
}

pub fn ring_instances<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    scale_jitter: f32,
) -> Vec<RingInstance> {
    (0..count)
        .map(|_| RingInstance::random(rng, scale_jitter))
        .collect()
}
