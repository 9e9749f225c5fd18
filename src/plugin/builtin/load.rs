//! Load Average Plugin
//!
//! Reports the 1, 5 and 15 minute load averages from `/proc/loadavg`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use crate::plugin::capability::CapabilitySet;
use crate::plugin::environment::{EnvBindings, EnvDefaults};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::{Field, FromEnv, Plugin};

/// Variable overriding the load average source file
pub const LOADAVG_PATH_VAR: &str = "LOADAVG_PATH";
pub const WARNING_VAR: &str = "WARNING";
pub const CRITICAL_VAR: &str = "CRITICAL";

pub const DEFAULT_LOADAVG_PATH: &str = "/proc/loadavg";

/// Field name and label for each reported average, in loadavg column order
const AVERAGES: [(&str, &str); 3] = [
    ("load1", "1 min"),
    ("load5", "5 min"),
    ("load15", "15 min"),
];

/// Munin alert threshold: `max`, `min:`, `:max` or `min:max`
///
/// Bounds are validated as numbers; the text is written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    raw: String,
    min: Option<f64>,
    max: Option<f64>,
}

impl Threshold {
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

impl FromStr for Threshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn bound(value: &str) -> Result<Option<f64>, String> {
            if value.is_empty() {
                return Ok(None);
            }
            value.parse::<f64>()
                .map(Some)
                .map_err(|_| format!("invalid threshold bound '{}'", value))
        }

        let (min, max) = match s.split_once(':') {
            Some((min, max)) => (bound(min)?, bound(max)?),
            None => (None, bound(s)?),
        };
        if min.is_none() && max.is_none() {
            return Err("threshold has no bounds".to_string());
        }

        Ok(Self { raw: s.to_string(), min, max })
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Load average plugin
#[derive(Debug, Clone)]
pub struct LoadPlugin {
    loadavg_path: PathBuf,
    warning: Option<Threshold>,
    critical: Option<Threshold>,
}

impl LoadPlugin {
    pub fn new<P: Into<PathBuf>>(loadavg_path: P) -> Self {
        Self {
            loadavg_path: loadavg_path.into(),
            warning: None,
            critical: None,
        }
    }

    /// Set warning and critical thresholds applied to every average
    pub fn with_thresholds(mut self, warning: Option<Threshold>, critical: Option<Threshold>) -> Self {
        self.warning = warning;
        self.critical = critical;
        self
    }

    pub fn loadavg_path(&self) -> &Path {
        &self.loadavg_path
    }

    /// Read the three load averages, verbatim, from the source file
    fn read_averages(&self) -> PluginResult<[String; 3]> {
        let content = fs::read_to_string(&self.loadavg_path).map_err(|e| {
            PluginError::execution_failed(format!("Failed to read {}: {}", self.loadavg_path.display(), e))
        })?;

        let mut tokens = content.split_whitespace();
        let mut averages: [String; 3] = Default::default();
        for average in averages.iter_mut() {
            let token = tokens.next().ok_or_else(|| {
                PluginError::execution_failed(format!("Malformed load average data in {}", self.loadavg_path.display()))
            })?;
            token.parse::<f64>()?;
            *average = token.to_string();
        }
        Ok(averages)
    }
}

impl Default for LoadPlugin {
    fn default() -> Self {
        Self::new(DEFAULT_LOADAVG_PATH)
    }
}

impl Plugin for LoadPlugin {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::default() | CapabilitySet::AUTOCONF
    }

    fn fetch(&self, _script_args: &[String]) -> PluginResult<Vec<Field>> {
        let averages = self.read_averages()?;
        Ok(AVERAGES.iter()
            .zip(averages)
            .map(|((name, _), value)| Field::new(format!("{}.value", self.fieldname(name)), value))
            .collect())
    }

    fn config(&self, _script_args: &[String]) -> PluginResult<Vec<Field>> {
        let mut fields = vec![
            Field::new("graph_title", "Load"),
            Field::new("graph_args", "-l 0 --base 1000"),
            Field::new("graph_vlabel", "Load"),
            Field::new("graph_category", "system"),
        ];

        for (name, label) in AVERAGES {
            let name = self.fieldname(name);
            fields.push(Field::new(format!("{}.label", name), label));
            if let Some(warning) = &self.warning {
                fields.push(Field::new(format!("{}.warning", name), warning));
            }
            if let Some(critical) = &self.critical {
                fields.push(Field::new(format!("{}.critical", name), critical));
            }
        }

        Ok(fields)
    }

    fn autoconf(&self, _script_args: &[String]) -> PluginResult<bool> {
        Ok(fs::File::open(&self.loadavg_path).is_ok())
    }
}

impl FromEnv for LoadPlugin {
    fn env_vars() -> EnvDefaults {
        EnvDefaults::new()
            .var(LOADAVG_PATH_VAR, DEFAULT_LOADAVG_PATH)
            .var(WARNING_VAR, "")
            .var(CRITICAL_VAR, "")
    }

    fn from_env(env: EnvBindings) -> PluginResult<Self> {
        let path = env.get_non_empty(LOADAVG_PATH_VAR).unwrap_or(DEFAULT_LOADAVG_PATH);
        Ok(Self::new(path).with_thresholds(
            env.get_parsed(WARNING_VAR)?,
            env.get_parsed(CRITICAL_VAR)?,
        ))
    }
}
