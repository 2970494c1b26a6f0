//! Script-defined commands.
//!
//! Scripts register commands whenever they load, but the host only accepts
//! new nodes while it rebuilds its command tree. Registrations are kept here
//! and installed in bulk by [`CommandRegistry::register_all`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use mlua::{Function, IntoLua, Lua};
use tracing::{error, info};

use super::bridge::HostValue;
use crate::host::{CommandContext, CommandDispatcher, COMMAND_FAILURE, COMMAND_SUCCESS};

#[derive(Default)]
pub struct CommandRegistry {
    pending: RefCell<BTreeMap<String, Function>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `callback` for `name`, replacing any earlier callback.
    ///
    /// Returns `true` if a previous callback was replaced.
    pub fn register(&self, name: &str, callback: Function) -> bool {
        let replaced = self
            .pending
            .borrow_mut()
            .insert(name.to_string(), callback)
            .is_some();
        info!("Registered command '/{}'", name);
        replaced
    }

    pub fn get(&self, name: &str) -> Option<Function> {
        self.pending.borrow().get(name).cloned()
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.pending.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.pending.borrow_mut().clear();
    }

    /// Install every registered command into `dispatcher`.
    ///
    /// Called once per host command-tree build. Entries stay registered so
    /// the next build installs them again.
    pub fn register_all(&self, lua: &Lua, dispatcher: &mut dyn CommandDispatcher) -> usize {
        let entries: Vec<(String, Function)> = self
            .pending
            .borrow()
            .iter()
            .map(|(name, callback)| (name.clone(), callback.clone()))
            .collect();

        for (name, callback) in &entries {
            let lua = lua.clone();
            let command = name.clone();
            let callback = callback.clone();
            dispatcher.register_literal(
                name,
                Box::new(move |ctx| execute_script_command(&lua, &command, &callback, ctx)),
            );
        }
        entries.len()
    }
}

/// Run one script command. Any raised error is reported to the source.
fn execute_script_command(
    lua: &Lua,
    name: &str,
    callback: &Function,
    ctx: Rc<CommandContext>,
) -> i32 {
    let source = ctx.source();
    let result = HostValue::Object(ctx)
        .into_lua(lua)
        .and_then(|value| callback.call::<()>(value));

    match result {
        Ok(()) => COMMAND_SUCCESS,
        Err(e) => {
            source.send_failure(&format!("Lua Error: {}", failure_message(&e)));
            error!("Error in command '/{}': {}", name, e);
            COMMAND_FAILURE
        }
    }
}

/// The error text shown to a command source: the message without the
/// traceback mlua appends.
fn failure_message(e: &mlua::Error) -> String {
    match e {
        mlua::Error::CallbackError { cause, .. } => failure_message(cause),
        other => {
            let text = other.to_string();
            match text.find("\nstack traceback:") {
                Some(end) => text[..end].to_string(),
                None => text,
            }
        }
    }
}
