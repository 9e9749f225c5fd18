//! Framework for writing Munin node plugins.
//!
//! A plugin implements [`plugin::Plugin`] (and usually
//! [`plugin::FromEnv`] to receive its `plugin-conf.d` settings). The
//! framework turns each munin-node invocation (`config`, `autoconf`,
//! `suggest`, or a plain fetch) into one capability call and writes the
//! result in the line protocol on stdout.
//!
//! ```no_run
//! use munin_plugin::plugin::builtin::LoadPlugin;
//!
//! fn main() {
//!     munin_plugin::run_from_env::<LoadPlugin>();
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod logging;
pub mod output;
pub mod plugin;
pub mod runner;

pub use dispatch::{dispatch, ExitStatus, Invocation, Mode};
pub use plugin::{fieldname, Field, FromEnv, Plugin, PluginError, PluginResult};
pub use runner::{execute, run, run_from_env};
