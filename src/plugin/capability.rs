//! Capability Resolution
//!
//! A plugin declares which capabilities it implements through a
//! [`CapabilitySet`]. `fetch` and `config` are always invoked; an optional
//! capability is invoked only when declared, otherwise the resolver hands
//! back the caller's default.

use std::fmt;
use std::str::FromStr;
use bitflags::bitflags;
use log::debug;
use serde::{Serialize, Deserialize};
use super::error::{PluginError, PluginResult};
use super::traits::{Field, Plugin};

bitflags! {
    /// Capabilities a plugin implements, combinable with bitwise operations
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CapabilitySet: u32 {
        /// Produces current values (always required)
        const FETCH = 0x01;
        /// Produces graph and field metadata
        const CONFIG = 0x02;
        /// Answers whether the plugin applies to this host
        const AUTOCONF = 0x04;
        /// Enumerates wildcard instance suffixes
        const SUGGEST = 0x08;
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        CapabilitySet::FETCH | CapabilitySet::CONFIG
    }
}

/// A single named plugin capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Fetch,
    Config,
    Autoconf,
    Suggest,
}

impl Capability {
    /// Name used on the command line and in log output
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Fetch => "fetch",
            Capability::Config => "config",
            Capability::Autoconf => "autoconf",
            Capability::Suggest => "suggest",
        }
    }

    /// Registry flag for this capability
    pub fn flag(&self) -> CapabilitySet {
        match self {
            Capability::Fetch => CapabilitySet::FETCH,
            Capability::Config => CapabilitySet::CONFIG,
            Capability::Autoconf => CapabilitySet::AUTOCONF,
            Capability::Suggest => CapabilitySet::SUGGEST,
        }
    }

    /// Kind of output this capability produces
    pub fn output_kind(&self) -> OutputKind {
        match self {
            Capability::Fetch | Capability::Config => OutputKind::Fields,
            Capability::Autoconf => OutputKind::Answer,
            Capability::Suggest => OutputKind::Suggestions,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fetch" => Ok(Capability::Fetch),
            "config" => Ok(Capability::Config),
            "autoconf" => Ok(Capability::Autoconf),
            "suggest" => Ok(Capability::Suggest),
            _ => Err(PluginError::generic(format!("Unknown capability: {}", s))),
        }
    }
}

/// Shape of a capability's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Fields,
    Answer,
    Suggestions,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::Fields => "fields",
            OutputKind::Answer => "answer",
            OutputKind::Suggestions => "suggestions",
        };
        f.write_str(name)
    }
}

/// Result of invoking (or defaulting) a capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityOutput {
    /// Ordered `field value` pairs from `fetch` or `config`
    Fields(Vec<Field>),
    /// Applicability answer from `autoconf`
    Answer(bool),
    /// Instance suffixes from `suggest`
    Suggestions(Vec<String>),
}

impl CapabilityOutput {
    pub fn kind(&self) -> OutputKind {
        match self {
            CapabilityOutput::Fields(_) => OutputKind::Fields,
            CapabilityOutput::Answer(_) => OutputKind::Answer,
            CapabilityOutput::Suggestions(_) => OutputKind::Suggestions,
        }
    }

    fn mismatch(self, capability: Capability, expected: OutputKind) -> PluginError {
        PluginError::capability_mismatch(capability.name(), expected.to_string(), self.kind().to_string())
    }
}

/// Invoke `capability` on `plugin`, or return `default` when it is not declared
///
/// `fetch` and `config` are treated as declared whatever
/// [`Plugin::capabilities`] returns.
/// `default` must have the output kind the capability produces. Errors raised
/// by the capability are returned unchanged.
pub fn resolve<P>(
    plugin: &P,
    capability: Capability,
    script_args: &[String],
    default: CapabilityOutput,
) -> PluginResult<CapabilityOutput>
where
    P: Plugin + ?Sized,
{
    let expected = capability.output_kind();
    if default.kind() != expected {
        return Err(default.mismatch(capability, expected));
    }

    let declared = plugin.capabilities() | CapabilitySet::default();
    if !declared.contains(capability.flag()) {
        debug!("Capability '{}' not declared, using default", capability);
        return Ok(default);
    }

    debug!("Invoking capability '{}' with script args {:?}", capability, script_args);
    let output = match capability {
        Capability::Fetch => CapabilityOutput::Fields(plugin.fetch(script_args)?),
        Capability::Config => CapabilityOutput::Fields(plugin.config(script_args)?),
        Capability::Autoconf => CapabilityOutput::Answer(plugin.autoconf(script_args)?),
        Capability::Suggest => CapabilityOutput::Suggestions(plugin.suggest(script_args)?),
    };
    Ok(output)
}

/// Resolve a `fetch` or `config` style capability
pub fn resolve_fields<P>(
    plugin: &P,
    capability: Capability,
    script_args: &[String],
    default: Vec<Field>,
) -> PluginResult<Vec<Field>>
where
    P: Plugin + ?Sized,
{
    match resolve(plugin, capability, script_args, CapabilityOutput::Fields(default))? {
        CapabilityOutput::Fields(fields) => Ok(fields),
        other => Err(other.mismatch(capability, OutputKind::Fields)),
    }
}

/// Resolve the `autoconf` style capability
pub fn resolve_answer<P>(
    plugin: &P,
    capability: Capability,
    script_args: &[String],
    default: bool,
) -> PluginResult<bool>
where
    P: Plugin + ?Sized,
{
    match resolve(plugin, capability, script_args, CapabilityOutput::Answer(default))? {
        CapabilityOutput::Answer(answer) => Ok(answer),
        other => Err(other.mismatch(capability, OutputKind::Answer)),
    }
}

/// Resolve the `suggest` style capability
pub fn resolve_suggestions<P>(
    plugin: &P,
    capability: Capability,
    script_args: &[String],
    default: Vec<String>,
) -> PluginResult<Vec<String>>
where
    P: Plugin + ?Sized,
{
    match resolve(plugin, capability, script_args, CapabilityOutput::Suggestions(default))? {
        CapabilityOutput::Suggestions(suggestions) => Ok(suggestions),
        other => Err(other.mismatch(capability, OutputKind::Suggestions)),
    }
}
