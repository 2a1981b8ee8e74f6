//! Camera controller chain
//!
//! Which interactions the main camera accepts. The orbit math itself is
//! `bevy_panorbit_camera`'s; the chain only switches its inputs on and off.

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    Pan,
    Rotate,
    Zoom,
}

/// Ordered set of active controllers
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ControllerChain {
    controllers: Vec<ControllerKind>,
}

impl Default for ControllerChain {
    fn default() -> Self {
        Self {
            controllers: vec![ControllerKind::Pan, ControllerKind::Rotate, ControllerKind::Zoom],
        }
    }
}

impl ControllerChain {
    pub fn from_kinds(kinds: &[ControllerKind]) -> Self {
        let mut chain = Self::empty();
        for kind in kinds {
            chain.append(*kind);
        }
        chain
    }

    pub fn empty() -> Self {
        Self {
            controllers: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.controllers.clear();
    }

    /// Adds `kind` at the end; returns false if it was already in the chain.
    pub fn append(&mut self, kind: ControllerKind) -> bool {
        if self.contains(kind) {
            return false;
        }
        self.controllers.push(kind);
        true
    }

    pub fn contains(&self, kind: ControllerKind) -> bool {
        self.controllers.contains(&kind)
    }

    pub fn kinds(&self) -> &[ControllerKind] {
        &self.controllers
    }

    /// (pan, orbit, zoom) sensitivities for the orbit camera.
    pub fn sensitivities(&self) -> (f32, f32, f32) {
        let on = |kind| if self.contains(kind) { 1.0 } else { 0.0 };
        (
            on(ControllerKind::Pan),
            on(ControllerKind::Rotate),
            on(ControllerKind::Zoom),
        )
    }
}

pub fn apply_controller_chain(
    chain: Res<ControllerChain>,
    mut cameras: Query<&mut PanOrbitCamera>,
) {
    if !chain.is_changed() {
        return;
    }
    let (pan, orbit, zoom) = chain.sensitivities();
    for mut camera in &mut cameras {
        camera.pan_sensitivity = pan;
        camera.orbit_sensitivity = orbit;
        camera.zoom_sensitivity = zoom;
    }
    debug!("Controller chain: {:?}", chain.kinds());
}
