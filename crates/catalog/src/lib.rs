//! HTTP side of the terrain server: map catalog, map documents and marker
//! mutations. Marker updates themselves arrive over the socket in
//! `streaming`; nothing here renders.

pub mod client;
pub mod endpoints;

pub use client::*;
pub use endpoints::*;

use std::fmt;

use formats::TerrainFormatError;

#[derive(Debug)]
pub enum CatalogError {
    InvalidUrl(String),
    Http(reqwest::Error),
    Status { url: String, status: u16 },
    Format(TerrainFormatError),
    Decode(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::InvalidUrl(msg) => write!(f, "invalid server url: {msg}"),
            CatalogError::Http(e) => write!(f, "request failed: {e}"),
            CatalogError::Status { url, status } => write!(f, "{url} returned HTTP {status}"),
            CatalogError::Format(e) => write!(f, "bad terrain document: {e}"),
            CatalogError::Decode(e) => write!(f, "bad response body: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Http(e) => Some(e),
            CatalogError::Format(e) => Some(e),
            CatalogError::Decode(e) => Some(e),
            CatalogError::InvalidUrl(_) | CatalogError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Http(e)
    }
}

impl From<TerrainFormatError> for CatalogError {
    fn from(e: TerrainFormatError) -> Self {
        CatalogError::Format(e)
    }
}
