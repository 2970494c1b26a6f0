//! Host command tree seam.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::script::bridge::{HostObject, HostValue};

/// Return code of a command that completed.
pub const COMMAND_SUCCESS: i32 = 1;
/// Return code of a command that failed.
pub const COMMAND_FAILURE: i32 = 0;

/// Whoever issued a command (a player, the console, a command block).
pub trait CommandSource {
    fn name(&self) -> &str;

    fn send_success(&self, message: &str);

    fn send_failure(&self, message: &str);
}

/// Context handed to a command handler.
pub struct CommandContext {
    command: String,
    source: Rc<dyn CommandSource>,
}

impl CommandContext {
    pub fn new(command: &str, source: Rc<dyn CommandSource>) -> Self {
        Self {
            command: command.to_string(),
            source,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn source(&self) -> Rc<dyn CommandSource> {
        Rc::clone(&self.source)
    }
}

impl HostObject for CommandContext {
    fn type_name(&self) -> &'static str {
        "CommandContext"
    }

    fn field(&self, name: &str) -> Option<HostValue> {
        match name {
            "command" => Some(HostValue::from(self.command.as_str())),
            "source" => Some(HostValue::from(self.source.name())),
            _ => None,
        }
    }

    fn has_method(&self, name: &str) -> bool {
        matches!(name, "reply" | "sendSuccess" | "sendFailure")
    }

    fn call_method(&self, name: &str, args: Vec<HostValue>) -> Result<HostValue, String> {
        let message = match args.first() {
            Some(HostValue::String(s)) => s.clone(),
            Some(other) => format!("{other:?}"),
            None => return Err(format!("{name} expects a message")),
        };
        match name {
            "reply" | "sendSuccess" => self.source.send_success(&message),
            "sendFailure" => self.source.send_failure(&message),
            _ => return Err(format!("CommandContext has no method '{name}'")),
        }
        Ok(HostValue::Nil)
    }
}

/// Executes a literal command; returns [`COMMAND_SUCCESS`] or [`COMMAND_FAILURE`].
pub type CommandHandler = Box<dyn Fn(Rc<CommandContext>) -> i32>;

/// The host command tree, rebuilt wholesale on every command build.
pub trait CommandDispatcher {
    /// Add a zero-argument literal command, replacing any existing node.
    fn register_literal(&mut self, name: &str, handler: CommandHandler);
}

/// In-memory command dispatcher.
#[derive(Default)]
pub struct SimpleDispatcher {
    commands: BTreeMap<String, CommandHandler>,
}

impl SimpleDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `name` on behalf of `source`; `None` if no such command exists.
    pub fn execute(&self, name: &str, source: Rc<dyn CommandSource>) -> Option<i32> {
        let handler = self.commands.get(name)?;
        Some(handler(Rc::new(CommandContext::new(name, source))))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandDispatcher for SimpleDispatcher {
    fn register_literal(&mut self, name: &str, handler: CommandHandler) {
        self.commands.insert(name.to_string(), handler);
    }
}

/// A command source that records every message it receives.
#[derive(Debug, Default)]
pub struct BufferedSource {
    name: String,
    successes: RefCell<Vec<String>>,
    failures: RefCell<Vec<String>>,
}

impl BufferedSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.borrow().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.borrow().clone()
    }
}

impl CommandSource for BufferedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_success(&self, message: &str) {
        self.successes.borrow_mut().push(message.to_string());
    }

    fn send_failure(&self, message: &str) {
        self.failures.borrow_mut().push(message.to_string());
    }
}
