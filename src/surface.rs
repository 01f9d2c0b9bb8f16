//! The render surface side of the channel.
//!
//! `paint` models how the surface reacts to messages; `stdio` carries the
//! messages to a surface running in another process.

pub mod paint;
pub mod stdio;

pub use paint::{Chrome, Frame, FrameLine, SurfaceAction, SurfaceState};
pub use stdio::{spawn_reader, spawn_writer};
