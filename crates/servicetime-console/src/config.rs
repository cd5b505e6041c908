//! Configuration loading helpers for the dispatcher.
//!
//! The logic here filters leading CLI arguments destined for `ortho-config`
//! so the loader only receives supported flags while the dispatcher operates
//! on the remaining command tokens.

use std::ffi::{OsStr, OsString};

use servicetime_config::Config;

use crate::errors::LaunchError;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of
/// [`servicetime_config::Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &["--log-filter", "--log-format"];

/// Loads configuration for a launch.
pub trait ConfigLoader {
    /// Loads configuration from the filtered configuration arguments.
    ///
    /// # Flag Ordering
    ///
    /// Configuration flags must appear before the command name. Flags that
    /// follow it are passed to the command untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::LoadConfiguration`] when a layer is malformed.
    fn load(&self, args: &[OsString]) -> Result<Config, LaunchError>;
}

/// Loads the layered configuration through `ortho-config`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, LaunchError> {
        use ortho_config::OrthoConfig;

        Config::load_from_iter(args.iter().cloned()).map_err(LaunchError::LoadConfiguration)
    }
}

/// Returns a fixed configuration; useful for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, LaunchError> {
        Ok(self.config.clone())
    }
}

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    if !argument_text.starts_with("--") {
        return FlagAction::Skip;
    }

    let (flag, has_inline_value) = match argument_text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (&*argument_text, false),
    };

    if CONFIG_CLI_FLAGS.contains(&flag) {
        return FlagAction::Include {
            needs_value: !has_inline_value,
        };
    }

    FlagAction::Skip
}

/// Argv split into configuration flags and command tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by the leading configuration flags.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by everything after the configuration flags.
    pub(crate) command_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_arguments: Vec::new(),
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut command_start = 0usize;
    let mut pending_values = 0usize;

    for argument in rest {
        if pending_values > 0 {
            config_arguments.push(argument.clone());
            pending_values -= 1;
            command_start += 1;
            continue;
        }

        match process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                command_start += 1;
                if needs_value {
                    pending_values = 1;
                }
            }
            FlagAction::Skip => break,
        }
    }

    let mut command_arguments = vec![program.clone()];
    command_arguments.extend(rest.iter().skip(command_start).cloned());
    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}
