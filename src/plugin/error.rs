//! Plugin Error Types
//!
//! Error handling for capability resolution, environment binding and output.

use thiserror::Error;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error types raised by plugins and the dispatch layer
#[derive(Error, Debug, Clone)]
pub enum PluginError {
    /// A capability failed while producing its result
    #[error("Plugin execution error: {message}")]
    ExecutionFailed { message: String },

    /// A capability was resolved against a default of the wrong kind
    #[error("Capability mismatch for '{capability}': expected {expected}, got {actual}")]
    CapabilityMismatch {
        capability: String,
        expected: String,
        actual: String,
    },

    /// Plugin configuration is unusable
    #[error("Plugin configuration error: {message}")]
    ConfigurationError { message: String },

    /// An environment binding held a value that could not be converted
    #[error("Invalid value for environment variable {variable}: {message}")]
    InvalidEnvironment { variable: String, message: String },

    /// Writing protocol output failed
    #[error("Output error: {message}")]
    OutputFailed { message: String },

    /// Generic plugin error
    #[error("Plugin error: {message}")]
    Generic { message: String },
}

impl PluginError {
    /// Create an execution error
    pub fn execution_failed<S: Into<String>>(message: S) -> Self {
        Self::ExecutionFailed { message: message.into() }
    }

    /// Create a capability mismatch error
    pub fn capability_mismatch<C, E, A>(capability: C, expected: E, actual: A) -> Self
    where
        C: Into<String>,
        E: Into<String>,
        A: Into<String>,
    {
        Self::CapabilityMismatch {
            capability: capability.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration_error<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    /// Create an invalid environment error
    pub fn invalid_environment<V: Into<String>, S: Into<String>>(variable: V, message: S) -> Self {
        Self::InvalidEnvironment {
            variable: variable.into(),
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output_failed<S: Into<String>>(message: S) -> Self {
        Self::OutputFailed { message: message.into() }
    }

    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic { message: message.into() }
    }

    /// Check if error is a configuration issue
    pub fn is_configuration_error(&self) -> bool {
        matches!(self,
            PluginError::ConfigurationError { .. } |
            PluginError::InvalidEnvironment { .. }
        )
    }

    /// Check if error comes from the dispatch layer rather than the plugin
    pub fn is_dispatch_error(&self) -> bool {
        matches!(self,
            PluginError::CapabilityMismatch { .. } |
            PluginError::OutputFailed { .. }
        )
    }
}

// Allow conversion from common error types
impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::generic(format!("IO error: {}", err))
    }
}

impl From<std::num::ParseFloatError> for PluginError {
    fn from(err: std::num::ParseFloatError) -> Self {
        PluginError::execution_failed(format!("Parse error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = PluginError::execution_failed("cannot read /proc/loadavg");
        assert!(matches!(error, PluginError::ExecutionFailed { .. }));
        assert!(error.to_string().contains("cannot read /proc/loadavg"));
    }

    #[test]
    fn test_error_classification() {
        let config_error = PluginError::configuration_error("Bad config");
        assert!(config_error.is_configuration_error());
        assert!(!config_error.is_dispatch_error());

        let env_error = PluginError::invalid_environment("WARNING", "not a number");
        assert!(env_error.is_configuration_error());

        let mismatch = PluginError::capability_mismatch("autoconf", "answer", "fields");
        assert!(mismatch.is_dispatch_error());
        assert!(!mismatch.is_configuration_error());
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let plugin_error: PluginError = io_error.into();
        assert!(matches!(plugin_error, PluginError::Generic { .. }));
        assert!(plugin_error.to_string().contains("IO error"));

        let parse_error = "x".parse::<f64>().unwrap_err();
        let plugin_error: PluginError = parse_error.into();
        assert!(matches!(plugin_error, PluginError::ExecutionFailed { .. }));
    }

    #[test]
    fn test_error_display() {
        let error = PluginError::capability_mismatch("suggest", "suggestions", "answer");
        assert_eq!(
            error.to_string(),
            "Capability mismatch for 'suggest': expected suggestions, got answer"
        );

        let error = PluginError::invalid_environment("CRITICAL", "expected a number");
        assert_eq!(
            error.to_string(),
            "Invalid value for environment variable CRITICAL: expected a number"
        );
    }
}
