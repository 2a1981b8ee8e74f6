//! Layer registration and probe systems

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::coordinates::Ellipsoid;
use crate::layers::probe::{ProbeChannels, ProbeCommand, ProbeResultMsg, start_probe_worker};
use crate::layers::registry::{LayerRegistry, LayerStatus};
use crate::layers::types::{MapLayer, default_layers};
use crate::visualization::ShowAxes;

/// One configured layer and the slot it goes into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSlot {
    pub slot: usize,
    pub layer: MapLayer,
}

/// Layer stack requested at startup
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    pub layers: Vec<LayerSlot>,
    /// Check each layer endpoint once in the background.
    pub probe: bool,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            layers: default_layers()
                .into_iter()
                .map(|(slot, layer)| LayerSlot { slot, layer })
                .collect(),
            probe: true,
        }
    }
}

/// Marks the local frame a 3D Tiles tileset is placed in.
#[derive(Component, Debug)]
pub struct TilesetAnchor {
    pub slot: usize,
}

pub fn register_layers(settings: Res<LayerSettings>, mut registry: ResMut<LayerRegistry>) {
    for LayerSlot { slot, layer } in settings.layers.iter().cloned() {
        let (id, name, kind) = (layer.id(), layer.name().to_string(), layer.kind());
        match registry.set_layer(layer, slot) {
            Ok(Some(previous)) => info!(
                "Layer slot {}: {} '{}' (id {}) replaces '{}'",
                slot,
                kind,
                name,
                id,
                previous.name()
            ),
            Ok(None) => info!("Layer slot {}: {} '{}' (id {})", slot, kind, name, id),
            Err(e) => warn!("Layer slot {} rejected: {}", slot, e),
        }
    }
}

pub fn spawn_tileset_anchors(
    mut commands: Commands,
    registry: Res<LayerRegistry>,
    ellipsoid: Res<Ellipsoid>,
) {
    for (slot, entry) in registry.iter() {
        let MapLayer::Ogc3dTiles(tiles) = &entry.layer else {
            continue;
        };
        if !tiles.visible {
            continue;
        }
        let transform = tiles.placement(&*ellipsoid);
        commands.spawn((
            transform,
            Visibility::default(),
            TilesetAnchor { slot },
            ShowAxes,
            Name::new(format!("Tileset anchor: {}", tiles.name)),
        ));
    }
}

/// Probe requests for every visible layer with an HTTP endpoint, in slot order.
pub fn probe_commands(registry: &LayerRegistry) -> Vec<ProbeCommand> {
    registry
        .iter()
        .filter(|(_, entry)| entry.layer.visible())
        .filter_map(|(slot, entry)| {
            let url = entry.layer.probe_url()?;
            let tileset = matches!(entry.layer, MapLayer::Ogc3dTiles(_));
            Some(ProbeCommand::Probe { slot, url, tileset })
        })
        .collect()
}

/// Strip credentials from a URL before it goes to the log.
pub fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let params: Vec<String> = query
        .split('&')
        .map(|param| match param.split_once('=') {
            Some((name, _)) if name.eq_ignore_ascii_case("key") => format!("{}=***", name),
            _ => param.to_string(),
        })
        .collect();
    format!("{}?{}", base, params.join("&"))
}

pub fn start_layer_probes(
    mut commands: Commands,
    settings: Res<LayerSettings>,
    registry: Res<LayerRegistry>,
) {
    if !settings.probe {
        return;
    }
    let requests = probe_commands(&registry);
    if requests.is_empty() {
        debug!("No layer endpoints to probe");
        return;
    }
    let channels = match start_probe_worker() {
        Ok(channels) => channels,
        Err(e) => {
            warn!("Layer probe worker failed to start: {}", e);
            return;
        }
    };

    let mut sent = 0;
    for request in requests {
        let ProbeCommand::Probe { slot, url, .. } = &request;
        debug!("Probing layer slot {}: {}", slot, redact_url(url));
        if channels.cmd_tx.send(request).is_ok() {
            sent += 1;
        }
    }
    info!("Layer probe worker started ({} endpoints)", sent);
    commands.insert_resource(channels);
}

/// System to drain probe results into the registry
pub fn process_probe_results_system(
    mut registry: ResMut<LayerRegistry>,
    probe: Option<Res<ProbeChannels>>,
) {
    let Some(probe) = probe else { return };
    let Ok(guard) = probe.res_rx.lock() else {
        return;
    };
    while let Ok(msg) = guard.try_recv() {
        let (slot, status) = match msg {
            ProbeResultMsg::Reachable {
                slot,
                http_status,
                tileset,
            } => {
                if let Some(summary) = tileset {
                    info!(
                        "Layer slot {}: tileset version {} geometricError {}",
                        slot, summary.version, summary.geometric_error
                    );
                }
                (slot, LayerStatus::Reachable { http_status })
            }
            ProbeResultMsg::Unreachable { slot, error } => {
                warn!("Layer slot {} unreachable: {}", slot, error);
                (slot, LayerStatus::Unreachable { error })
            }
        };
        registry.set_status(slot, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_cover_demo_stack() {
        let settings = LayerSettings::default();
        let slots: Vec<usize> = settings.layers.iter().map(|l| l.slot).collect();
        assert_eq!(slots, vec![0, 1, 2, 3]);
        assert!(settings.probe);
    }

    #[test]
    fn test_settings_json_roundtrip_keeps_layer_kind() {
        let settings = LayerSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: LayerSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
        assert_eq!(back.layers[1].layer.kind(), "wms");
    }

    fn registry_with_defaults() -> LayerRegistry {
        let mut registry = LayerRegistry::default();
        for LayerSlot { slot, layer } in LayerSettings::default().layers {
            registry.set_layer(layer, slot).unwrap();
        }
        registry
    }

    fn probed_slots(registry: &LayerRegistry) -> Vec<usize> {
        probe_commands(registry)
            .into_iter()
            .map(|ProbeCommand::Probe { slot, .. }| slot)
            .collect()
    }

    #[test]
    fn test_probe_commands_cover_http_layers() {
        let registry = registry_with_defaults();
        // Clouds have no endpoint; the elevation image is a local asset.
        let commands = probe_commands(&registry);
        let tileset_slots: Vec<usize> = commands
            .iter()
            .filter_map(|ProbeCommand::Probe { slot, tileset, .. }| tileset.then_some(*slot))
            .collect();
        assert_eq!(tileset_slots, vec![2]);
        assert!(probed_slots(&registry).contains(&1));
        assert!(!probed_slots(&registry).contains(&3));
    }

    #[test]
    fn test_hidden_layers_are_not_probed() {
        let mut registry = registry_with_defaults();
        let before = probed_slots(&registry);

        let mut wms = registry.get(1).unwrap().layer.clone();
        if let MapLayer::Wms(layer) = &mut wms {
            layer.visible = false;
        }
        registry.set_layer(wms, 1).unwrap();

        let after = probed_slots(&registry);
        assert!(before.contains(&1));
        assert!(!after.contains(&1));
        assert_eq!(after.len(), before.len() - 1);
    }

    #[test]
    fn test_redact_url_hides_api_key() {
        let google = MapLayer::GoogleMap3dTiles(crate::layers::types::GoogleMap3dTilesLayer {
            id: 9,
            name: "google".to_string(),
            api_key: "secret-123".to_string(),
            load_outside_view: false,
            display_copyright: true,
            visible: true,
        });
        let url = google.probe_url().unwrap();
        let logged = redact_url(&url);
        assert!(!logged.contains("secret-123"));
        assert!(logged.ends_with("?key=***"));
    }

    #[test]
    fn test_redact_url_keeps_other_params() {
        assert_eq!(
            redact_url("https://example.com/wms?SERVICE=WMS&key=abc&VERSION=1.3.0"),
            "https://example.com/wms?SERVICE=WMS&key=***&VERSION=1.3.0"
        );
        assert_eq!(redact_url("https://example.com/a.json"), "https://example.com/a.json");
    }
}
