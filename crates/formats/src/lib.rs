pub mod map_index;
pub mod terrain_document;

pub use map_index::*;
pub use terrain_document::*;
