//! Built-in Plugin Implementations
//!
//! Reference implementations of common Munin plugins.

pub mod load;

// Re-export built-in plugins
pub use load::{LoadPlugin, Threshold};
