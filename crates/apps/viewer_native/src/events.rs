use catalog::CatalogError;
use formats::TerrainDocument;
use streaming::SocketEvent;

use crate::commands::Command;

/// Everything that reaches the frame loop from async tasks.
#[derive(Debug)]
pub enum ViewerEvent {
    Socket(SocketEvent),
    MapsListed(Vec<String>),
    MapLoaded {
        generation: u64,
        id: String,
        result: Result<TerrainDocument, CatalogError>,
    },
    /// A marker mutation the server refused or never saw.
    RequestFailed(String),
    Input(Command),
    InputClosed,
}

impl From<SocketEvent> for ViewerEvent {
    fn from(event: SocketEvent) -> Self {
        ViewerEvent::Socket(event)
    }
}

impl From<Command> for ViewerEvent {
    fn from(command: Command) -> Self {
        ViewerEvent::Input(command)
    }
}

/// Async work the viewer asks the shell to start.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ListMaps,
    LoadMap { generation: u64, id: String },
    CreateMarker { x: f64, z: f64 },
    ClearMarkers,
}
