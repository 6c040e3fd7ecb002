use std::fmt;

use foundation::math::Vec3;
use streaming::ConnectionState;

/// What the map slot of the HUD says.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MapStatus {
    #[default]
    NoMap,
    Loading(String),
    Loaded(String),
    Failed { id: String, reason: String },
}

impl fmt::Display for MapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapStatus::NoMap => write!(f, "Select a map"),
            MapStatus::Loading(id) => write!(f, "Loading {id}..."),
            MapStatus::Loaded(id) => write!(f, "Map: {id}"),
            MapStatus::Failed { id, reason } => write!(f, "Error loading map {id}: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub camera: Vec3,
    pub target: Vec3,
    pub hover: Option<Vec3>,
    pub markers: usize,
    pub connection: ConnectionState,
    pub status: MapStatus,
    pub notice: Option<String>,
}

impl HudSnapshot {
    pub fn lines(&self) -> Vec<String> {
        let hover = match self.hover {
            Some(p) => fmt_point(p),
            None => "none".to_string(),
        };
        let mut lines = vec![
            format!("Camera: {}", fmt_point(self.camera)),
            format!("Target: {}", fmt_point(self.target)),
            format!("Hover: {hover}"),
            format!("Markers: {}", self.markers),
            format!("Server: {}", self.connection),
            self.status.to_string(),
        ];
        if let Some(notice) = &self.notice {
            lines.push(notice.clone());
        }
        lines
    }
}

impl fmt::Display for HudSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

fn fmt_point(p: Vec3) -> String {
    format!("({:.1}, {:.1}, {:.1})", p.x, p.y, p.z)
}
