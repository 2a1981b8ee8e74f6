//! Background probe of layer endpoints
//!
//! A worker thread owns a tokio runtime and a reqwest client; the Bevy side
//! sends it commands and drains results once per frame.

use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use bevy::prelude::*;
use serde::Deserialize;

/// Commands for the probe worker thread
#[derive(Debug)]
pub enum ProbeCommand {
    Probe {
        slot: usize,
        url: String,
        /// Parse the body as an OGC 3D Tiles `tileset.json`.
        tileset: bool,
    },
}

/// Root metadata of a 3D Tiles tileset.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetSummary {
    pub version: String,
    pub geometric_error: f64,
}

/// Results from the probe worker thread
#[derive(Debug)]
pub enum ProbeResultMsg {
    Reachable {
        slot: usize,
        http_status: u16,
        tileset: Option<TilesetSummary>,
    },
    Unreachable {
        slot: usize,
        error: String,
    },
}

/// Resource containing channels for communicating with the probe worker thread
#[derive(Resource)]
pub struct ProbeChannels {
    pub cmd_tx: mpsc::Sender<ProbeCommand>,
    pub res_rx: Arc<Mutex<mpsc::Receiver<ProbeResultMsg>>>,
}

#[derive(Deserialize)]
struct TilesetAsset {
    version: String,
}

#[derive(Deserialize)]
struct TilesetRoot {
    asset: TilesetAsset,
    #[serde(rename = "geometricError")]
    geometric_error: f64,
}

pub fn parse_tileset_summary(body: &str) -> anyhow::Result<TilesetSummary> {
    let root: TilesetRoot = serde_json::from_str(body)?;
    if !root.geometric_error.is_finite() || root.geometric_error < 0.0 {
        anyhow::bail!("invalid geometricError {}", root.geometric_error);
    }
    Ok(TilesetSummary {
        version: root.asset.version,
        geometric_error: root.geometric_error,
    })
}

async fn probe_once(
    client: &reqwest::Client,
    url: &str,
    tileset: bool,
) -> anyhow::Result<(u16, Option<TilesetSummary>)> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {}", status);
    }
    let summary = if tileset {
        let body = resp.text().await?;
        Some(parse_tileset_summary(&body)?)
    } else {
        None
    };
    Ok((status.as_u16(), summary))
}

/// Start the background probe worker thread
pub fn start_probe_worker() -> anyhow::Result<ProbeChannels> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<ProbeCommand>();
    let (res_tx, res_rx) = mpsc::channel::<ProbeResultMsg>();
    let rt = tokio::runtime::Runtime::new()?;

    thread::Builder::new()
        .name("layer-probe".to_string())
        .spawn(move || {
            rt.block_on(async move {
                let client = reqwest::Client::new();
                while let Ok(cmd) = cmd_rx.recv() {
                    let ProbeCommand::Probe { slot, url, tileset } = cmd;
                    let msg = match probe_once(&client, &url, tileset).await {
                        Ok((http_status, tileset)) => ProbeResultMsg::Reachable {
                            slot,
                            http_status,
                            tileset,
                        },
                        Err(e) => ProbeResultMsg::Unreachable {
                            slot,
                            error: e.to_string(),
                        },
                    };
                    if res_tx.send(msg).is_err() {
                        break;
                    }
                }
            });
        })?;

    Ok(ProbeChannels {
        cmd_tx,
        res_rx: Arc::new(Mutex::new(res_rx)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tileset_summary() {
        let body = r#"{
            "asset": { "version": "1.0", "tilesetVersion": "berlin" },
            "geometricError": 512.5,
            "root": { "boundingVolume": { "box": [] }, "geometricError": 256 }
        }"#;
        let summary = parse_tileset_summary(body).unwrap();
        assert_eq!(summary.version, "1.0");
        assert_eq!(summary.geometric_error, 512.5);
    }

    #[test]
    fn test_parse_tileset_missing_asset() {
        assert!(parse_tileset_summary(r#"{ "geometricError": 1.0 }"#).is_err());
    }

    #[test]
    fn test_parse_tileset_negative_error() {
        let body = r#"{ "asset": { "version": "1.1" }, "geometricError": -1 }"#;
        assert!(parse_tileset_summary(body).is_err());
    }
}
