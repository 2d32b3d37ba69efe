//! Support modules for the `flatload` binary.

pub mod config;
pub mod logging;
pub mod summary;
