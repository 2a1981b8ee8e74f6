//! Slot-indexed layer registry

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::layers::types::{LayerError, MapLayer};

/// Reachability of a layer endpoint, as last seen by the probe worker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayerStatus {
    #[default]
    Unknown,
    Reachable {
        http_status: u16,
    },
    Unreachable {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredLayer {
    pub layer: MapLayer,
    pub status: LayerStatus,
}

/// Layers keyed by slot; lower slots draw first.
#[derive(Resource, Debug, Default)]
pub struct LayerRegistry {
    slots: BTreeMap<usize, RegisteredLayer>,
}

impl LayerRegistry {
    /// Validate `layer` and put it in `index`, returning whatever occupied the slot before.
    pub fn set_layer(
        &mut self,
        layer: MapLayer,
        index: usize,
    ) -> Result<Option<MapLayer>, LayerError> {
        layer.validate()?;

        let id = layer.id();
        if let Some((&slot, _)) = self
            .slots
            .iter()
            .find(|(slot, entry)| **slot != index && entry.layer.id() == id)
        {
            return Err(LayerError::DuplicateId { id, slot });
        }

        let previous = self.slots.insert(
            index,
            RegisteredLayer {
                layer,
                status: LayerStatus::Unknown,
            },
        );
        Ok(previous.map(|entry| entry.layer))
    }

    pub fn get(&self, index: usize) -> Option<&RegisteredLayer> {
        self.slots.get(&index)
    }

    pub fn remove(&mut self, index: usize) -> Option<MapLayer> {
        self.slots.remove(&index).map(|entry| entry.layer)
    }

    pub fn set_status(&mut self, index: usize, status: LayerStatus) -> bool {
        match self.slots.get_mut(&index) {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    pub fn status(&self, index: usize) -> Option<&LayerStatus> {
        self.slots.get(&index).map(|entry| &entry.status)
    }

    /// Entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RegisteredLayer)> {
        self.slots.iter().map(|(slot, entry)| (*slot, entry))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
