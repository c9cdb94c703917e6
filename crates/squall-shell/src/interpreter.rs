//! Command registry and dispatch.
//!
//! The registry is built once at startup and never mutated afterwards.
//! Canonical names are matched case-insensitively; aliases are matched
//! exactly, byte for byte. Registration rejects every name/alias collision
//! so a misconfigured build fails before the loop starts instead of
//! silently shadowing a command.

use std::collections::HashMap;

use squall_types::ShellConfig;
use squall_types::error::{Result, SquallError};

use crate::console::Console;

/// What the loop should do after a dispatched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep reading input.
    Continue,
    /// Leave the shell.
    Exit,
}

/// Session state handed to every command.
///
/// Built once at startup and passed down through dispatch; commands never
/// reach for globals.
pub struct Session<'a> {
    /// The registry itself, for commands that list or describe commands.
    pub registry: &'a Registry,
    /// Styled terminal output.
    pub console: &'a Console,
    /// User configuration.
    pub config: &'a ShellConfig,
}

/// A single executable command.
pub trait Command {
    /// Canonical name (matched case-insensitively).
    fn name(&self) -> &str;

    /// One-line description for `commands` and `info`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "greet [name] [times]").
    fn usage(&self) -> &str;

    /// Alternate names (matched case-sensitively, exact).
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Declared argument names, used only for completion hints. Dispatch
    /// never checks arity against this list.
    fn arg_names(&self) -> &[&str] {
        &[]
    }

    /// Execute the command with the given arguments and session.
    fn execute(&self, args: &[&str], session: &mut Session<'_>) -> Result<Control>;
}

/// Registry of available commands with dispatch.
///
/// Commands are kept in registration order; that order is what `commands`
/// prints and what completion suggests on an empty line.
pub struct Registry {
    commands: Vec<Box<dyn Command>>,
    /// Lowercased canonical name -> index into `commands`.
    index: HashMap<String, usize>,
    /// Exact alias string -> index into `commands`.
    alias_index: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: HashMap::new(),
            alias_index: HashMap::new(),
        }
    }

    /// Register a command, rejecting collisions.
    ///
    /// A new canonical name may not equal an existing name or alias
    /// (case-insensitively, since canonical lookup lowercases its key). A
    /// new alias may not equal an existing alias exactly nor an existing
    /// name case-insensitively. On error the registry is left unchanged.
    pub fn register(&mut self, cmd: Box<dyn Command>) -> Result<()> {
        let name_lower = cmd.name().to_ascii_lowercase();
        if self.index.contains_key(&name_lower) {
            return Err(SquallError::Startup(format!(
                "duplicate command name: {}",
                cmd.name()
            )));
        }
        if self
            .alias_index
            .keys()
            .any(|a| a.eq_ignore_ascii_case(&name_lower))
        {
            return Err(SquallError::Startup(format!(
                "command name collides with an alias: {}",
                cmd.name()
            )));
        }
        let mut seen: Vec<&str> = Vec::new();
        for &alias in cmd.aliases() {
            if seen.contains(&alias) || self.alias_index.contains_key(alias) {
                return Err(SquallError::Startup(format!("duplicate alias: {alias}")));
            }
            if self.index.contains_key(&alias.to_ascii_lowercase()) {
                return Err(SquallError::Startup(format!(
                    "alias collides with a command name: {alias}"
                )));
            }
            seen.push(alias);
        }

        let idx = self.commands.len();
        for &alias in cmd.aliases() {
            self.alias_index.insert(alias.to_string(), idx);
        }
        self.index.insert(name_lower, idx);
        log::debug!("registered command: {}", cmd.name());
        self.commands.push(cmd);
        Ok(())
    }

    /// Case-insensitive canonical-name lookup.
    pub fn resolve(&self, name: &str) -> Option<&dyn Command> {
        let key = name.to_ascii_lowercase();
        self.index.get(&key).map(|&i| self.commands[i].as_ref())
    }

    /// Exact-match alias lookup. Case variants of an alias do not resolve.
    pub fn resolve_alias(&self, token: &str) -> Option<&dyn Command> {
        self.alias_index
            .get(token)
            .map(|&i| self.commands[i].as_ref())
    }

    /// Resolution used by completion: the token must match a canonical name
    /// or an alias exactly as typed.
    pub fn resolve_exact(&self, token: &str) -> Option<&dyn Command> {
        self.resolve(token)
            .filter(|cmd| cmd.name() == token)
            .or_else(|| self.resolve_alias(token))
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name())
    }

    /// All descriptors in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.iter().map(|c| c.as_ref())
    }

    /// Parse and execute a command line.
    ///
    /// Empty and whitespace-only lines are a quiet no-op. The first token
    /// is matched case-insensitively against canonical names, then verbatim
    /// against aliases. The handler receives the remaining tokens in order,
    /// case preserved, with no arity checking; argument validation is the
    /// handler's job.
    pub fn execute(&self, line: &str, session: &mut Session<'_>) -> Result<Control> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&first) = tokens.first() else {
            return Ok(Control::Continue);
        };
        let cmd = self
            .resolve(first)
            .or_else(|| self.resolve_alias(first))
            .ok_or_else(|| SquallError::UnknownCommand(first.to_string()))?;
        cmd.execute(&tokens[1..], session)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
