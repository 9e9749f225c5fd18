//! Environment Bindings
//!
//! Munin node passes per-plugin settings (from `plugin-conf.d`) as
//! environment variables. A plugin declares the variables it reads together
//! with their defaults; the bindings are resolved once when the plugin is
//! constructed and stay fixed for the rest of the invocation.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use log::{debug, warn};
use super::error::{PluginError, PluginResult};

/// Declared environment variables and their default values, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    vars: Vec<(String, String)>,
}

impl EnvDefaults {
    /// Create an empty declaration set
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable with its default value
    pub fn var<K: Into<String>, V: Into<String>>(mut self, name: K, default: V) -> Self {
        let name = name.into();
        let default = default.into();
        match self.vars.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = default,
            None => self.vars.push((name, default)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Iterate over (name, default) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(name, default)| (name.as_str(), default.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvDefaults {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(EnvDefaults::new(), |defaults, (name, default)| defaults.var(name, default))
    }
}

/// Resolved environment values owned by a plugin instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvBindings {
    values: HashMap<String, String>,
}

impl EnvBindings {
    /// Resolve declared variables against the process environment
    pub fn resolve(defaults: &EnvDefaults) -> Self {
        Self::resolve_with(defaults, |name| match env::var(name) {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                warn!("Environment variable {} is not valid unicode, using default", name);
                None
            }
        })
    }

    /// Resolve declared variables using `lookup` as the environment source
    pub fn resolve_with<F>(defaults: &EnvDefaults, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = HashMap::with_capacity(defaults.len());
        for (name, default) in defaults.iter() {
            let value = match lookup(name) {
                Some(value) => {
                    debug!("Environment binding {}={} (from environment)", name, value);
                    value
                }
                None => {
                    debug!("Environment binding {}={} (default)", name, default);
                    default.to_string()
                }
            };
            values.insert(name.to_string(), value);
        }
        Self { values }
    }

    /// Get the bound value of a declared variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Get a bound value, treating the empty string as unset
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    /// Get a bound value with type conversion
    ///
    /// Unset and empty values yield `Ok(None)`.
    pub fn get_parsed<T>(&self, name: &str) -> PluginResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_non_empty(name) {
            Some(value) => value.trim().parse::<T>()
                .map(Some)
                .map_err(|e| PluginError::invalid_environment(name, format!("{}: {}", value, e))),
            None => Ok(None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
