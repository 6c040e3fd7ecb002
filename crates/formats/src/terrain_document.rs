//! Terrain map documents.
//!
//! One JSON document describes a whole map as a list of rectangular chunks,
//! each carrying a square row-major heightmap:
//!
//! ```json
//! { "terrains": [ { "x": 0, "z": 0, "y": 0, "width": 10, "depth": 10,
//!                   "resolution": 3, "heightMap": [0,0,0, 0,5,0, 0,0,0] } ] }
//! ```
//!
//! Structural problems (missing `terrains`, degenerate extents, resolution
//! outside `2..=MAX_RESOLUTION`) reject the document. A heightmap whose
//! length disagrees with `resolution²` is accepted; consumers sample it
//! defensively and [`TerrainDocument::validate`] reports it.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Largest accepted vertices-per-edge. Keeps `(resolution - 1)² · 6` mesh
/// indices within `u32`.
pub const MAX_RESOLUTION: u32 = 4097;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainChunk {
    /// World-space minimum corner.
    pub x: f64,
    pub z: f64,
    /// Vertical offset added to every sample.
    pub y: f64,
    pub width: f64,
    pub depth: f64,
    /// Vertices per edge (same on both axes).
    pub resolution: u32,
    #[serde(rename = "heightMap")]
    pub height_map: Vec<f64>,
}

impl TerrainChunk {
    pub fn expected_samples(&self) -> usize {
        let r = self.resolution as usize;
        r.saturating_mul(r)
    }

    pub fn has_complete_height_map(&self) -> bool {
        self.height_map.len() == self.expected_samples()
    }

    /// Sample at grid `(row, col)`, or `None` outside the stored heightmap.
    pub fn sample(&self, row: usize, col: usize) -> Option<f64> {
        let r = self.resolution as usize;
        if col >= r {
            return None;
        }
        let index = row.checked_mul(r)?.checked_add(col)?;
        self.height_map.get(index).copied()
    }

    pub fn center(&self) -> [f64; 3] {
        [
            self.x + self.width / 2.0,
            self.y,
            self.z + self.depth / 2.0,
        ]
    }

    fn check(&self) -> Result<(), String> {
        if self.resolution < 2 {
            return Err(format!("resolution must be >= 2 (got {})", self.resolution));
        }
        if self.resolution > MAX_RESOLUTION {
            return Err(format!(
                "resolution must be <= {MAX_RESOLUTION} (got {})",
                self.resolution
            ));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(format!("width must be positive (got {})", self.width));
        }
        if !(self.depth.is_finite() && self.depth > 0.0) {
            return Err(format!("depth must be positive (got {})", self.depth));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainDocument {
    pub terrains: Vec<TerrainChunk>,
}

/// Non-fatal issue found in an accepted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainWarning {
    pub chunk_index: usize,
    pub message: String,
}

impl fmt::Display for TerrainWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}: {}", self.chunk_index, self.message)
    }
}

#[derive(Debug)]
pub enum TerrainFormatError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotAnObject,
    MissingTerrains,
    InvalidChunk { index: usize, reason: String },
}

impl fmt::Display for TerrainFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainFormatError::Io(err) => write!(f, "I/O error: {err}"),
            TerrainFormatError::Json(err) => write!(f, "terrain JSON error: {err}"),
            TerrainFormatError::NotAnObject => write!(f, "terrain document is not a JSON object"),
            TerrainFormatError::MissingTerrains => {
                write!(f, "invalid map data: missing 'terrains' field")
            }
            TerrainFormatError::InvalidChunk { index, reason } => {
                write!(f, "invalid terrain chunk {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for TerrainFormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TerrainFormatError::Io(err) => Some(err),
            TerrainFormatError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl TerrainDocument {
    pub fn from_json_str(payload: &str) -> Result<Self, TerrainFormatError> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(TerrainFormatError::Json)?;
        Self::from_json_value(value)
    }

    pub fn from_json_slice(payload: &[u8]) -> Result<Self, TerrainFormatError> {
        let value: serde_json::Value =
            serde_json::from_slice(payload).map_err(TerrainFormatError::Json)?;
        Self::from_json_value(value)
    }

    /// Checks the `terrains` field explicitly first so a missing field gets its
    /// own error instead of a generic serde message.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, TerrainFormatError> {
        let Some(obj) = value.as_object() else {
            return Err(TerrainFormatError::NotAnObject);
        };
        if !obj.contains_key("terrains") {
            return Err(TerrainFormatError::MissingTerrains);
        }

        let doc: TerrainDocument = serde_json::from_value(value).map_err(TerrainFormatError::Json)?;
        for (index, chunk) in doc.terrains.iter().enumerate() {
            chunk
                .check()
                .map_err(|reason| TerrainFormatError::InvalidChunk { index, reason })?;
        }
        Ok(doc)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TerrainFormatError> {
        let payload = fs::read(path.as_ref()).map_err(TerrainFormatError::Io)?;
        Self::from_json_slice(&payload)
    }

    pub fn to_json_string(&self) -> Result<String, TerrainFormatError> {
        serde_json::to_string(self).map_err(TerrainFormatError::Json)
    }

    pub fn first_chunk(&self) -> Option<&TerrainChunk> {
        self.terrains.first()
    }

    pub fn validate(&self) -> Vec<TerrainWarning> {
        let mut warnings = Vec::new();
        for (chunk_index, chunk) in self.terrains.iter().enumerate() {
            if !chunk.has_complete_height_map() {
                warnings.push(TerrainWarning {
                    chunk_index,
                    message: format!(
                        "heightMap has {} samples, expected {}",
                        chunk.height_map.len(),
                        chunk.expected_samples()
                    ),
                });
            }
            if chunk.height_map.iter().any(|h| !h.is_finite()) {
                warnings.push(TerrainWarning {
                    chunk_index,
                    message: "heightMap contains non-finite samples".to_string(),
                });
            }
        }

        for i in 0..self.terrains.len() {
            for j in (i + 1)..self.terrains.len() {
                if footprints_overlap(&self.terrains[i], &self.terrains[j]) {
                    warnings.push(TerrainWarning {
                        chunk_index: j,
                        message: format!("overlaps chunk {i}; earlier chunk wins height queries"),
                    });
                }
            }
        }
        warnings
    }
}

// Shared edges are expected between neighbouring tiles, so only strict
// interior overlap counts.
fn footprints_overlap(a: &TerrainChunk, b: &TerrainChunk) -> bool {
    a.x < b.x + b.width && b.x < a.x + a.width && a.z < b.z + b.depth && b.z < a.z + a.depth
}
