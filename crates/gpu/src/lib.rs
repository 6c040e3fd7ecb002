pub mod camera;
pub mod renderer;
pub mod resources;

pub use camera::*;
pub use renderer::*;
pub use resources::*;
