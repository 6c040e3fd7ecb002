pub mod client;
pub mod connection;
pub mod markers;
pub mod protocol;

pub use client::*;
pub use connection::*;
pub use markers::*;
pub use protocol::*;
