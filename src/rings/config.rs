//! Ring configuration

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// How the last point of a ring is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeamPolicy {
    /// Copy the first cartesian point into the last slot; the ring is closed
    /// whatever the transform does with 360 degrees.
    #[default]
    ReuseFirst,
    /// Transform the 360 degree sample like every other one.
    Resample,
}

/// Decorative ring settings resource
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    pub enabled: bool,
    /// Points per ring, both ends included.
    pub sample_count: usize,
    pub instance_count: usize,
    pub latitude_deg: f64,
    pub height_m: f64,
    /// Upper bound (exclusive) of the extra uniform scale, so scales land in [1, 1 + jitter).
    pub scale_jitter: f32,
    /// sRGB hex, e.g. 0xcd2235.
    pub color: u32,
    pub seam: SeamPolicy,
    /// Fixed seed for reproducible layouts; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_count: 201,
            instance_count: 100,
            latitude_deg: 0.0,
            height_m: 0.0,
            scale_jitter: 0.01,
            color: 0xcd2235,
            seam: SeamPolicy::default(),
            seed: None,
        }
    }
}

impl RingConfig {
    pub fn line_color(&self) -> Color {
        let [_, r, g, b] = self.color.to_be_bytes();
        Color::srgb_u8(r, g, b)
    }
}
