pub mod commands;
pub mod config;
pub mod events;
pub mod hud;
pub mod markers;
pub mod shell;
pub mod viewer;

pub use commands::*;
pub use config::*;
pub use events::*;
pub use hud::*;
pub use markers::*;
pub use shell::*;
pub use viewer::*;

use std::fmt;

use catalog::CatalogError;

#[derive(Debug)]
pub enum ViewerError {
    Endpoint(CatalogError),
    Io(std::io::Error),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::Endpoint(e) => write!(f, "bad server address: {e}"),
            ViewerError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Endpoint(e) => Some(e),
            ViewerError::Io(e) => Some(e),
        }
    }
}

impl From<CatalogError> for ViewerError {
    fn from(e: CatalogError) -> Self {
        ViewerError::Endpoint(e)
    }
}
