//! Plugin System Module
//!
//! Provides the trait-based contract a Munin data source implements, the
//! capability registry and resolver, environment bindings, and the field name
//! sanitizer.
//!
//! # Example Usage
//!
//! ```no_run
//! use munin_plugin::plugin::{Field, Plugin, PluginResult};
//!
//! struct Users;
//!
//! impl Plugin for Users {
//!     fn fetch(&self, _script_args: &[String]) -> PluginResult<Vec<Field>> {
//!         Ok(vec![Field::new("users.value", 3)])
//!     }
//!
//!     fn config(&self, _script_args: &[String]) -> PluginResult<Vec<Field>> {
//!         Ok(vec![
//!             Field::new("graph_title", "Logged in users"),
//!             Field::new("users.label", "users"),
//!         ])
//!     }
//! }
//!
//! munin_plugin::run(Users);
//! ```

pub mod traits;
pub mod error;
pub mod capability;
pub mod environment;
pub mod fieldname;
pub mod builtin;

// Re-export core types for easier access
pub use traits::{Plugin, FromEnv, Field};
pub use error::{PluginError, PluginResult};
pub use capability::{Capability, CapabilitySet, CapabilityOutput, OutputKind, resolve};
pub use environment::{EnvBindings, EnvDefaults};
pub use fieldname::{fieldname, MAX_FIELDNAME_LEN};
