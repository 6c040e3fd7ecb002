use std::time::Duration;

use catalog::CatalogSource;
use clap::Parser;
use gpu::Viewport;

/// Headless terrain viewer: loads a map, mirrors live markers, reads
/// pointer and camera commands from stdin.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "terrain-viewer", version)]
pub struct ViewerConfig {
    /// Terrain server base URL; the marker socket is derived from it
    #[arg(long, env = "TERRAIN_VIEWER_SERVER", default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Map to load on startup
    #[arg(long, env = "TERRAIN_VIEWER_MAP")]
    pub map: Option<String>,

    /// List maps from the static maps.json instead of /api/maps
    #[arg(long, env = "TERRAIN_VIEWER_STATIC_CATALOG")]
    pub static_catalog: bool,

    /// Frame rate of the render loop
    #[arg(
        long,
        env = "TERRAIN_VIEWER_FPS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u32).range(1..=240)
    )]
    pub fps: u32,

    #[arg(long, env = "TERRAIN_VIEWER_WIDTH", default_value_t = 1280.0)]
    pub width: f64,

    #[arg(long, env = "TERRAIN_VIEWER_HEIGHT", default_value_t = 720.0)]
    pub height: f64,
}

impl ViewerConfig {
    pub fn catalog_source(&self) -> CatalogSource {
        if self.static_catalog {
            CatalogSource::StaticIndex
        } else {
            CatalogSource::Api
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}
