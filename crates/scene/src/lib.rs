pub mod mesh;
pub mod picking;
pub mod terrain;

pub use mesh::*;
pub use picking::*;
pub use terrain::*;
