//! Immutable name-to-command mapping.

use std::collections::BTreeMap;

use crate::command::Command;
use crate::errors::RegistryError;

/// Name and description pair used by parsers to list commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    /// Registered command name.
    pub name: String,
    /// One-line description, possibly empty.
    pub about: String,
}

/// Registered commands keyed by case-folded name.
///
/// Built once through [`CommandRegistry::builder`] and read-only afterwards.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Starts an empty registry builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Finds the command registered under `name`, ignoring case.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(&fold(name)).map(|command| &**command)
    }

    /// Lists registered commands ordered by name.
    #[must_use]
    pub fn summaries(&self) -> Vec<CommandSummary> {
        self.commands
            .values()
            .map(|command| CommandSummary {
                name: command.name().to_owned(),
                about: command.about().to_owned(),
            })
            .collect()
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Collects commands and rejects duplicate names.
#[derive(Default)]
pub struct RegistryBuilder {
    commands: BTreeMap<String, Box<dyn Command>>,
}

impl RegistryBuilder {
    /// Adds `command` to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] when the name is already
    /// taken (ignoring case) and [`RegistryError::BlankName`] for blank names.
    pub fn register<C>(mut self, command: C) -> Result<Self, RegistryError>
    where
        C: Command + 'static,
    {
        let key = fold(command.name());
        if key.is_empty() {
            return Err(RegistryError::BlankName);
        }
        if self.commands.contains_key(&key) {
            return Err(RegistryError::DuplicateCommand {
                name: command.name().to_owned(),
            });
        }
        self.commands.insert(key, Box::new(command));
        Ok(self)
    }

    /// Freezes the collected commands.
    #[must_use]
    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            commands: self.commands,
        }
    }
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}
