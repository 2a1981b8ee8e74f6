//! Map layer records
//!
//! Layers are configuration: where the data lives and how it is placed on the
//! globe. Fetching and draping tiles belongs to the renderer, not to these types.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::coordinates::{GeodeticPoint, GeodeticTransform};

/// [west, south, east, north] in degrees.
pub type Bounds = [f64; 4];

pub const WORLD_BOUNDS: Bounds = [-180.0, -90.0, 180.0, 90.0];

#[derive(Debug, Error, PartialEq)]
pub enum LayerError {
    #[error("layer {id}: invalid bounds {bounds:?}")]
    InvalidBounds { id: u32, bounds: Bounds },
    #[error("layer {id}: {field} must not be empty")]
    Empty { id: u32, field: &'static str },
    #[error("layer {id}: elevation range min {min} must be below max {max}")]
    InvalidRange { id: u32, min: f64, max: f64 },
    #[error("layer {id}: {field} must be positive, got {value}")]
    NotPositive {
        id: u32,
        field: &'static str,
        value: f64,
    },
    #[error("layer {id}: quality must be in (0, 1], got {quality}")]
    InvalidQuality { id: u32, quality: f32 },
    #[error("layer id {id} already registered in slot {slot}")]
    DuplicateId { id: u32, slot: usize },
}

fn check_bounds(id: u32, bounds: Bounds) -> Result<(), LayerError> {
    let [west, south, east, north] = bounds;
    let in_world = west >= WORLD_BOUNDS[0]
        && south >= WORLD_BOUNDS[1]
        && east <= WORLD_BOUNDS[2]
        && north <= WORLD_BOUNDS[3];
    if !in_world || west >= east || south >= north {
        return Err(LayerError::InvalidBounds { id, bounds });
    }
    Ok(())
}

fn check_not_empty(id: u32, field: &'static str, value: &str) -> Result<(), LayerError> {
    if value.trim().is_empty() {
        return Err(LayerError::Empty { id, field });
    }
    Ok(())
}

fn check_positive(id: u32, field: &'static str, value: f64) -> Result<(), LayerError> {
    if !(value > 0.0) {
        return Err(LayerError::NotPositive { id, field, value });
    }
    Ok(())
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Elevation encoded in a single greyscale image stretched over `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleImageElevationLayer {
    pub id: u32,
    pub name: String,
    pub bounds: Bounds,
    pub url: String,
    pub visible: bool,
    /// Height (m) of a zero sample.
    pub min: f64,
    /// Height (m) of a full-scale sample.
    pub max: f64,
}

impl SingleImageElevationLayer {
    pub fn contains(&self, longitude_deg: f64, latitude_deg: f64) -> bool {
        let [west, south, east, north] = self.bounds;
        (west..=east).contains(&longitude_deg) && (south..=north).contains(&latitude_deg)
    }

    /// Height in metres for a normalised image sample, clamped to [0, 1].
    pub fn height_at(&self, sample: f64) -> f64 {
        self.min + sample.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

/// OGC Web Map Service imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmsLayer {
    pub id: u32,
    pub name: String,
    pub bounds: Bounds,
    pub url: String,
    pub layer: String,
    pub epsg: String,
    pub version: String,
    pub visible: bool,
    pub image_size: u32,
}

impl WmsLayer {
    fn is_v130(&self) -> bool {
        self.version.starts_with("1.3")
    }

    fn separator(&self) -> char {
        if self.url.contains('?') { '&' } else { '?' }
    }

    pub fn capabilities_url(&self) -> String {
        format!(
            "{}{}SERVICE=WMS&REQUEST=GetCapabilities&VERSION={}",
            self.url,
            self.separator(),
            self.version
        )
    }

    /// GetMap request for a [west, south, east, north] degree box.
    ///
    /// WMS 1.3.0 with EPSG:4326 expects latitude first in BBOX and names the
    /// projection CRS; 1.1.x uses SRS and longitude first.
    pub fn get_map_url(&self, bbox: Bounds) -> String {
        let [west, south, east, north] = bbox;
        let (crs_key, bbox) = if self.is_v130() {
            let swap = self.epsg.eq_ignore_ascii_case("EPSG:4326");
            let bbox = if swap {
                [south, west, north, east]
            } else {
                [west, south, east, north]
            };
            ("CRS", bbox)
        } else {
            ("SRS", [west, south, east, north])
        };
        format!(
            "{}{}SERVICE=WMS&REQUEST=GetMap&VERSION={}&LAYERS={}&STYLES=&{}={}&BBOX={},{},{},{}&WIDTH={}&HEIGHT={}&FORMAT=image/png",
            self.url,
            self.separator(),
            self.version,
            self.layer,
            crs_key,
            self.epsg,
            bbox[0],
            bbox[1],
            bbox[2],
            bbox[3],
            self.image_size,
            self.image_size
        )
    }
}

/// Streamed OGC 3D Tiles tileset anchored at a geodetic position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ogc3dTilesLayer {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Metres above the ellipsoid.
    pub height: f64,
    /// Radians.
    pub rotation_x: f32,
    /// Radians.
    pub rotation_y: f32,
    pub scale: f32,
    pub geometric_error_multiplier: f32,
    pub load_outside_view: bool,
    pub visible: bool,
}

impl Ogc3dTilesLayer {
    pub fn anchor(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.longitude, self.latitude, self.height)
    }

    /// Local frame of the tileset: origin at the anchor, +Y along the outward
    /// normal, then the configured X and Y rotations and uniform scale. Tileset
    /// metres become kilometres of render space.
    pub fn placement<T: GeodeticTransform + ?Sized>(&self, transform: &T) -> Transform {
        let anchor = self.anchor();
        let origin = transform.forward(anchor);
        let above = transform.forward(GeodeticPoint::new(
            anchor.longitude_deg,
            anchor.latitude_deg,
            anchor.height_m + 1000.0,
        ));
        let up = (above - origin).normalize_or_zero().as_vec3();
        let to_up = Quat::from_rotation_arc(Vec3::Y, up);
        let local = Quat::from_rotation_y(self.rotation_y) * Quat::from_rotation_x(self.rotation_x);
        Transform {
            translation: origin.as_vec3(),
            rotation: to_up * local,
            scale: Vec3::splat(self.scale / 1000.0),
        }
    }
}

/// NOAA GFS cloud cover imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoaaGfsCloudsLayer {
    pub id: u32,
    pub name: String,
    /// Render quality in (0, 1].
    pub quality: f32,
}

/// Google photorealistic 3D tiles; needs an API key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleMap3dTilesLayer {
    pub id: u32,
    pub name: String,
    pub api_key: String,
    pub load_outside_view: bool,
    pub display_copyright: bool,
    pub visible: bool,
}

impl GoogleMap3dTilesLayer {
    pub const ROOT_URL: &'static str = "https://tile.googleapis.com/v1/3dtiles/root.json";

    pub fn root_url(&self) -> String {
        format!("{}?key={}", Self::ROOT_URL, self.api_key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapLayer {
    SingleImageElevation(SingleImageElevationLayer),
    Wms(WmsLayer),
    Ogc3dTiles(Ogc3dTilesLayer),
    NoaaGfsClouds(NoaaGfsCloudsLayer),
    GoogleMap3dTiles(GoogleMap3dTilesLayer),
}

impl MapLayer {
    pub fn id(&self) -> u32 {
        match self {
            MapLayer::SingleImageElevation(l) => l.id,
            MapLayer::Wms(l) => l.id,
            MapLayer::Ogc3dTiles(l) => l.id,
            MapLayer::NoaaGfsClouds(l) => l.id,
            MapLayer::GoogleMap3dTiles(l) => l.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MapLayer::SingleImageElevation(l) => &l.name,
            MapLayer::Wms(l) => &l.name,
            MapLayer::Ogc3dTiles(l) => &l.name,
            MapLayer::NoaaGfsClouds(l) => &l.name,
            MapLayer::GoogleMap3dTiles(l) => &l.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MapLayer::SingleImageElevation(_) => "elevation",
            MapLayer::Wms(_) => "wms",
            MapLayer::Ogc3dTiles(_) => "3d-tiles",
            MapLayer::NoaaGfsClouds(_) => "clouds",
            MapLayer::GoogleMap3dTiles(_) => "google-3d-tiles",
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            MapLayer::SingleImageElevation(l) => l.visible,
            MapLayer::Wms(l) => l.visible,
            MapLayer::Ogc3dTiles(l) => l.visible,
            MapLayer::NoaaGfsClouds(_) => true,
            MapLayer::GoogleMap3dTiles(l) => l.visible,
        }
    }

    /// HTTP endpoint worth probing, if the layer has one.
    pub fn probe_url(&self) -> Option<String> {
        match self {
            MapLayer::SingleImageElevation(l) if is_http(&l.url) => Some(l.url.clone()),
            MapLayer::SingleImageElevation(_) => None,
            MapLayer::Wms(l) => Some(l.capabilities_url()),
            MapLayer::Ogc3dTiles(l) => Some(l.url.clone()),
            MapLayer::NoaaGfsClouds(_) => None,
            MapLayer::GoogleMap3dTiles(l) => Some(l.root_url()),
        }
    }

    pub fn validate(&self) -> Result<(), LayerError> {
        let id = self.id();
        match self {
            MapLayer::SingleImageElevation(l) => {
                check_bounds(id, l.bounds)?;
                check_not_empty(id, "url", &l.url)?;
                if !(l.min < l.max) {
                    return Err(LayerError::InvalidRange {
                        id,
                        min: l.min,
                        max: l.max,
                    });
                }
            }
            MapLayer::Wms(l) => {
                check_bounds(id, l.bounds)?;
                check_not_empty(id, "url", &l.url)?;
                check_not_empty(id, "layer", &l.layer)?;
                check_not_empty(id, "epsg", &l.epsg)?;
                check_positive(id, "image_size", l.image_size as f64)?;
            }
            MapLayer::Ogc3dTiles(l) => {
                check_not_empty(id, "url", &l.url)?;
                let on_globe =
                    (-180.0..=180.0).contains(&l.longitude) && (-90.0..=90.0).contains(&l.latitude);
                if !on_globe {
                    return Err(LayerError::InvalidBounds {
                        id,
                        bounds: [l.longitude, l.latitude, l.longitude, l.latitude],
                    });
                }
                check_positive(id, "scale", l.scale as f64)?;
                check_positive(
                    id,
                    "geometric_error_multiplier",
                    l.geometric_error_multiplier as f64,
                )?;
            }
            MapLayer::NoaaGfsClouds(l) => {
                if !(l.quality > 0.0 && l.quality <= 1.0) {
                    return Err(LayerError::InvalidQuality {
                        id,
                        quality: l.quality,
                    });
                }
            }
            MapLayer::GoogleMap3dTiles(l) => {
                check_not_empty(id, "api_key", &l.api_key)?;
            }
        }
        Ok(())
    }
}

/// The demo's layer stack: elevation, GEBCO bathymetry, Berlin buildings, clouds.
pub fn default_layers() -> Vec<(usize, MapLayer)> {
    vec![
        (
            0,
            MapLayer::SingleImageElevation(SingleImageElevationLayer {
                id: 0,
                name: "singleImageEarthElevation".to_string(),
                bounds: WORLD_BOUNDS,
                url: "images/earth_elevation.jpg".to_string(),
                visible: true,
                min: -100.0,
                max: 8000.0,
            }),
        ),
        (
            1,
            MapLayer::Wms(WmsLayer {
                id: 1,
                name: "BlueMarble".to_string(),
                bounds: WORLD_BOUNDS,
                url: "https://www.gebco.net/data_and_products/gebco_web_services/web_map_service/mapserv".to_string(),
                layer: "GEBCO_LATEST_SUB_ICE_TOPO".to_string(),
                epsg: "EPSG:4326".to_string(),
                version: "1.3.0".to_string(),
                visible: true,
                image_size: 512,
            }),
        ),
        (
            2,
            MapLayer::Ogc3dTiles(Ogc3dTilesLayer {
                id: 2,
                name: "OGC 3DTiles".to_string(),
                url: "https://storage.googleapis.com/ogc-3d-tiles/berlinTileset/tileset.json"
                    .to_string(),
                longitude: 13.42,
                latitude: 52.4895,
                height: 172.0,
                rotation_x: 3.1416,
                rotation_y: 0.72,
                scale: 1.0,
                geometric_error_multiplier: 0.03,
                load_outside_view: false,
                visible: true,
            }),
        ),
        (
            3,
            MapLayer::NoaaGfsClouds(NoaaGfsCloudsLayer {
                id: 84,
                name: "clouds".to_string(),
                quality: 0.5,
            }),
        ),
    ]
}
