//! Process Entry Points
//!
//! Wires a plugin to the real process: arguments, environment, stdout and
//! the exit status.

use std::io::{self, Write};
use std::process;
use anyhow::Result;
use log::{debug, error};
use crate::config::ConfigManager;
use crate::dispatch::{dispatch, Invocation};
use crate::logging;
use crate::plugin::{FromEnv, Plugin, PluginError};

/// Exit code for a capability or construction failure
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Run an already constructed plugin and exit the process
pub fn run<P: Plugin>(plugin: P) -> ! {
    let invocation = Invocation::from_env();
    init_logging(&invocation);

    let code = execute(&plugin, &invocation, io::stdout().lock());
    process::exit(code)
}

/// Construct a plugin from its environment bindings, run it, and exit the process
pub fn run_from_env<P: FromEnv>() -> ! {
    let invocation = Invocation::from_env();
    init_logging(&invocation);

    let code = match P::construct() {
        Ok(plugin) => execute(&plugin, &invocation, io::stdout().lock()),
        Err(e) => report_failure(&invocation, &e),
    };
    process::exit(code)
}

/// Dispatch `invocation` to `plugin` and map the outcome to an exit code
///
/// Failures are reported on stderr and through the logger; `out` only ever
/// receives protocol lines.
pub fn execute<P, W>(plugin: &P, invocation: &Invocation, out: W) -> i32
where
    P: Plugin + ?Sized,
    W: Write,
{
    match dispatch(plugin, invocation, out) {
        Ok(status) => status.code(),
        Err(e) => report_failure(invocation, &e),
    }
}

/// Load framework configuration and install the logger for this invocation
pub fn configure_logging(invocation: &Invocation) -> Result<()> {
    let plugin_name = match invocation.plugin_name() {
        "" => "plugin",
        name => name,
    };

    let mut config_manager = ConfigManager::load()?;
    config_manager.select_section(plugin_name.to_string());

    let log_config = config_manager.log_config(plugin_name)?;
    logging::init_logger(log_config)?;

    if let Some(path) = config_manager.config_file_path() {
        debug!("Loaded configuration from {}", path.display());
    }
    Ok(())
}

// A broken logging setup must not stop the plugin from answering munin-node
fn init_logging(invocation: &Invocation) {
    if let Err(e) = configure_logging(invocation) {
        eprintln!("{}: logging disabled: {:#}", invocation.program_name(), e);
    }
}

fn report_failure(invocation: &Invocation, err: &PluginError) -> i32 {
    error!("Plugin failed ({}): {}", failure_kind(err), err);
    eprintln!("{}: {}", invocation.program_name(), err);
    FAILURE_EXIT_CODE
}

fn failure_kind(err: &PluginError) -> &'static str {
    if err.is_configuration_error() {
        "configuration"
    } else if err.is_dispatch_error() {
        "dispatch"
    } else {
        "capability"
    }
}
