//! Invocation Parsing
//!
//! Munin runs a plugin as `<program> [mode]`. The program name doubles as an
//! instance selector for wildcard plugins: `if_eth0` is the `if_` plugin
//! invoked for `eth0`.

use std::path::Path;
use log::debug;
use crate::plugin::{Capability, CapabilitySet};

/// Separator between a wildcard plugin's base name and its script arguments
pub const WILDCARD_SEPARATOR: char = '_';

/// The process invocation: program name plus mode arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    pub fn new<P, I, S>(program: P, args: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a full argument vector, program name first
    ///
    /// An empty vector yields an empty program name and no arguments.
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().unwrap_or_default();
        Self {
            program,
            args: argv.collect(),
        }
    }

    /// Build from the current process arguments
    pub fn from_env() -> Self {
        Self::from_argv(std::env::args_os().map(|arg| arg.to_string_lossy().into_owned()))
    }

    /// Program name exactly as invoked
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Final path component of the program name
    pub fn program_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.program)
    }

    /// Program name without any wildcard suffix
    pub fn plugin_name(&self) -> &str {
        let name = self.program_name();
        match name.find(WILDCARD_SEPARATOR) {
            Some(index) => &name[..index],
            None => name,
        }
    }

    /// Mode arguments following the program name
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Whether any mode argument equals `token`
    pub fn has_token(&self, token: &str) -> bool {
        self.args.iter().any(|arg| arg == token)
    }

    /// Whether the program name carries wildcard script arguments
    pub fn is_wildcard(&self) -> bool {
        self.program_name().contains(WILDCARD_SEPARATOR)
    }

    /// Segments after the first separator in the program name
    ///
    /// Every separator splits, and empty segments are kept: `if_err_eth0`
    /// gives `["err", "eth0"]` and `load_` gives `[""]`.
    pub fn script_args(&self) -> Vec<String> {
        let name = self.program_name();
        if !name.contains(WILDCARD_SEPARATOR) {
            return Vec::new();
        }
        name.split(WILDCARD_SEPARATOR)
            .skip(1)
            .map(str::to_string)
            .collect()
    }

    /// Select the dispatch mode for a plugin with the given capabilities
    pub fn mode(&self, capabilities: CapabilitySet) -> Mode {
        let mode = if self.has_token(Mode::Suggest.token()) && capabilities.contains(CapabilitySet::SUGGEST) {
            Mode::Suggest
        } else if self.has_token(Mode::Autoconf.token()) {
            Mode::Autoconf
        } else if self.has_token(Mode::Config.token()) {
            Mode::Config
        } else {
            Mode::Fetch
        };
        debug!("Selected {} mode for args {:?}", mode.token(), self.args);
        mode
    }
}

/// Dispatch mode, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Suggest,
    Autoconf,
    Config,
    Fetch,
}

impl Mode {
    /// Command line token selecting this mode
    pub fn token(&self) -> &'static str {
        self.capability().name()
    }

    /// Capability invoked in this mode
    pub fn capability(&self) -> Capability {
        match self {
            Mode::Suggest => Capability::Suggest,
            Mode::Autoconf => Capability::Autoconf,
            Mode::Config => Capability::Config,
            Mode::Fetch => Capability::Fetch,
        }
    }
}
