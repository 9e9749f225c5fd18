//! Command Dispatch
//!
//! Turns one invocation into exactly one capability call and writes its
//! result in line protocol form.

pub mod invocation;

use std::io::Write;
use log::{debug, info};
use crate::output::LineWriter;
use crate::plugin::capability::{resolve_answer, resolve_fields, resolve_suggestions};
use crate::plugin::{Plugin, PluginResult};

pub use invocation::{Invocation, Mode, WILDCARD_SEPARATOR};

/// Answer printed by autoconf
pub const AUTOCONF_YES: &str = "yes";
pub const AUTOCONF_NO: &str = "no";

/// Outcome of a successful dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Output written, plugin applies
    Success,
    /// Autoconf answered `no`
    NotApplicable,
}

impl ExitStatus {
    /// Process exit code
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::NotApplicable => 1,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }
}

/// Dispatch `invocation` to `plugin`, writing protocol lines to `out`
///
/// Capability errors are returned unchanged; nothing is retried.
pub fn dispatch<P, W>(plugin: &P, invocation: &Invocation, out: W) -> PluginResult<ExitStatus>
where
    P: Plugin + ?Sized,
    W: Write,
{
    let script_args = invocation.script_args();
    if !script_args.is_empty() {
        debug!("Wildcard invocation '{}' with script args {:?}", invocation.program_name(), script_args);
    }

    let mode = invocation.mode(plugin.capabilities());
    let capability = mode.capability();
    let mut writer = LineWriter::new(out);

    let status = match mode {
        Mode::Suggest => {
            let suggestions = resolve_suggestions(plugin, capability, &script_args, Vec::new())?;
            writer.write_lines(&suggestions)?;
            ExitStatus::Success
        }
        Mode::Autoconf => {
            if resolve_answer(plugin, capability, &script_args, true)? {
                writer.write_line(AUTOCONF_YES)?;
                ExitStatus::Success
            } else {
                writer.write_line(AUTOCONF_NO)?;
                ExitStatus::NotApplicable
            }
        }
        Mode::Config | Mode::Fetch => {
            let fields = resolve_fields(plugin, capability, &script_args, Vec::new())?;
            writer.write_fields(&fields)?;
            ExitStatus::Success
        }
    };

    writer.flush()?;
    info!(
        "{} mode finished: {} line(s), exit status {}",
        mode.token(),
        writer.lines_written(),
        status.code()
    );
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use crate::plugin::{CapabilitySet, Field, PluginError};

    /// Plugin whose capability results are fixed at construction
    struct Scripted {
        capabilities: CapabilitySet,
        fetch: Vec<Field>,
        config: Vec<Field>,
        autoconf: bool,
        suggest: Vec<String>,
        received: RefCell<Vec<Vec<String>>>,
    }

    impl Scripted {
        fn new() -> Self {
            Self {
                capabilities: CapabilitySet::default(),
                fetch: vec![Field::new("load1.value", "0.50")],
                config: vec![Field::new("graph_title", "Load")],
                autoconf: false,
                suggest: vec!["eth0".to_string(), "eth1".to_string()],
                received: RefCell::new(Vec::new()),
            }
        }

        fn with(mut self, capabilities: CapabilitySet) -> Self {
            self.capabilities |= capabilities;
            self
        }
    }

    impl Plugin for Scripted {
        fn capabilities(&self) -> CapabilitySet {
            self.capabilities
        }

        fn fetch(&self, script_args: &[String]) -> PluginResult<Vec<Field>> {
            self.received.borrow_mut().push(script_args.to_vec());
            Ok(self.fetch.clone())
        }

        fn config(&self, script_args: &[String]) -> PluginResult<Vec<Field>> {
            self.received.borrow_mut().push(script_args.to_vec());
            Ok(self.config.clone())
        }

        fn autoconf(&self, script_args: &[String]) -> PluginResult<bool> {
            self.received.borrow_mut().push(script_args.to_vec());
            Ok(self.autoconf)
        }

        fn suggest(&self, script_args: &[String]) -> PluginResult<Vec<String>> {
            self.received.borrow_mut().push(script_args.to_vec());
            Ok(self.suggest.clone())
        }
    }

    fn run(plugin: &Scripted, argv: &[&str]) -> (PluginResult<ExitStatus>, String) {
        let mut out = Vec::new();
        let result = dispatch(plugin, &Invocation::from_argv(argv.iter().copied()), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_config_mode() {
        let plugin = Scripted::new();
        let (status, output) = run(&plugin, &["load", "config"]);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(output, "graph_title Load\n");
    }

    #[test]
    fn test_fetch_is_default() {
        let plugin = Scripted::new();
        let (status, output) = run(&plugin, &["load"]);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(output, "load1.value 0.50\n");
    }

    #[test]
    fn test_suggest_without_capability_falls_through_to_fetch() {
        let plugin = Scripted::new();
        let (status, output) = run(&plugin, &["if_", "suggest"]);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(output, "load1.value 0.50\n");
    }

    #[test]
    fn test_suggest_mode() {
        let plugin = Scripted::new().with(CapabilitySet::SUGGEST);
        let (status, output) = run(&plugin, &["if_", "suggest"]);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(output, "eth0\neth1\n");
    }

    #[test]
    fn test_autoconf_default_is_yes() {
        let plugin = Scripted::new();
        let (status, output) = run(&plugin, &["load", "autoconf"]);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(output, "yes\n");
        assert!(plugin.received.borrow().is_empty());
    }

    #[test]
    fn test_autoconf_no() {
        let plugin = Scripted::new().with(CapabilitySet::AUTOCONF);
        let (status, output) = run(&plugin, &["load", "autoconf"]);
        let status = status.unwrap();
        assert_eq!(status, ExitStatus::NotApplicable);
        assert_eq!(status.code(), 1);
        assert_eq!(output, "no\n");
    }

    #[test]
    fn test_script_args_reach_capability() {
        let plugin = Scripted::new();
        let (status, _) = run(&plugin, &["loadwildcard_eth0", "config"]);
        assert!(status.unwrap().is_success());
        assert_eq!(*plugin.received.borrow(), vec![vec!["eth0".to_string()]]);
    }

    #[test]
    fn test_fetch_and_config_run_without_declaring_them() {
        let plugin = Scripted {
            capabilities: CapabilitySet::AUTOCONF,
            ..Scripted::new()
        };

        let (status, output) = run(&plugin, &["disk"]);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(output, "load1.value 0.50\n");

        let (status, output) = run(&plugin, &["disk", "config"]);
        assert_eq!(status.unwrap(), ExitStatus::Success);
        assert_eq!(output, "graph_title Load\n");
        assert_eq!(plugin.received.borrow().len(), 2);
    }

    #[test]
    fn test_capability_error_propagates() {
        struct Broken;

        impl Plugin for Broken {
            fn fetch(&self, _script_args: &[String]) -> PluginResult<Vec<Field>> {
                Err(PluginError::execution_failed("cannot open /proc/loadavg"))
            }
        }

        let mut out = Vec::new();
        let result = dispatch(&Broken, &Invocation::from_argv(["load"]), &mut out);
        assert!(matches!(result, Err(PluginError::ExecutionFailed { .. })));
        assert!(out.is_empty());
    }
}
