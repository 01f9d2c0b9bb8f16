//! codeframe library crate.
//!
//! Turns editor selections into render-config snapshots for a render
//! surface and saves the images it sends back.

pub mod assembler;
pub mod channel;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod host;
pub mod render_config;
pub mod settings;
pub mod style;
pub mod surface;
pub mod template;
