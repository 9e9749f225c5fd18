//! Core Plugin Traits
//!
//! Defines the contract a data source implements to be exposed as a Munin
//! plugin, and the value types its capabilities return.

use std::fmt;
use serde::{Serialize, Deserialize};
use super::capability::CapabilitySet;
use super::environment::{EnvBindings, EnvDefaults};
use super::error::PluginResult;
use super::fieldname;

/// A single `field value` pair of the line protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field (or graph attribute) name, e.g. `load1.value` or `graph_title`
    pub name: String,

    /// Rendered value, written verbatim
    pub value: String,
}

impl Field {
    /// Create a field, rendering `value` with its `Display` implementation
    pub fn new<N: Into<String>, V: fmt::Display>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

impl<N: Into<String>, V: fmt::Display> From<(N, V)> for Field {
    fn from((name, value): (N, V)) -> Self {
        Field::new(name, value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.value)
    }
}

/// Core plugin interface that all Munin plugins implement
///
/// Every capability receives the script arguments derived from the program
/// name (empty unless the plugin was invoked as a wildcard instance).
/// `fetch` and `config` are always available; the optional capabilities are
/// only invoked when listed in [`Plugin::capabilities`].
pub trait Plugin {
    /// Capabilities this plugin implements
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::default()
    }

    /// Produce the current values
    fn fetch(&self, script_args: &[String]) -> PluginResult<Vec<Field>>;

    /// Produce graph and field metadata
    fn config(&self, _script_args: &[String]) -> PluginResult<Vec<Field>> {
        Ok(Vec::new())
    }

    /// Report whether this plugin applies to the current host
    fn autoconf(&self, _script_args: &[String]) -> PluginResult<bool> {
        Ok(true)
    }

    /// Enumerate instance suffixes this plugin can be linked as
    fn suggest(&self, _script_args: &[String]) -> PluginResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// Check if plugin supports a specific capability
    ///
    /// `fetch` and `config` count as supported even when `capabilities`
    /// leaves them out.
    fn supports_capability(&self, capability: CapabilitySet) -> bool {
        (self.capabilities() | CapabilitySet::default()).contains(capability)
    }

    /// Returns a valid field name for `name`
    fn fieldname(&self, name: &str) -> String {
        fieldname::fieldname(name)
    }
}

/// Construction of a plugin from its environment bindings
///
/// The declared variables are resolved once, before the plugin exists, and
/// handed to [`FromEnv::from_env`].
pub trait FromEnv: Plugin + Sized {
    /// Environment variables this plugin reads, with defaults
    fn env_vars() -> EnvDefaults {
        EnvDefaults::new()
    }

    /// Build the plugin from resolved bindings
    fn from_env(env: EnvBindings) -> PluginResult<Self>;

    /// Resolve declared variables against the process environment and build
    fn construct() -> PluginResult<Self> {
        Self::from_env(EnvBindings::resolve(&Self::env_vars()))
    }
}
