//! Event name to script callback registry.

use std::cell::RefCell;
use std::collections::HashMap;

use mlua::{Function, IntoLua, Lua};
use tracing::{debug, error};

use super::bridge::HostValue;
use super::types::FireReport;

/// Listeners per event, kept in registration order.
#[derive(Default)]
pub struct EventRegistry {
    listeners: RefCell<HashMap<String, Vec<Function>>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `callback` to the listeners of `event_name`.
    ///
    /// No deduplication: registering the same function twice makes it fire twice.
    pub fn register(&self, event_name: &str, callback: Function) {
        self.listeners
            .borrow_mut()
            .entry(event_name.to_string())
            .or_default()
            .push(callback);
        debug!(event = event_name, "registered event listener");
    }

    pub fn listener_count(&self, event_name: &str) -> usize {
        self.listeners
            .borrow()
            .get(event_name)
            .map_or(0, Vec::len)
    }

    /// Event names with at least one listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, callbacks)| !callbacks.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Drop every listener of every event.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Deliver `data` to every listener of `event_name`, in registration order.
    ///
    /// `data` is converted once and every callback sees the same Lua value.
    /// A callback that raises is logged and skipped; the rest still run.
    /// Listeners added by a callback take effect from the next fire.
    pub fn fire(&self, lua: &Lua, event_name: &str, data: HostValue) -> FireReport {
        let callbacks = match self.listeners.borrow().get(event_name) {
            Some(callbacks) if !callbacks.is_empty() => callbacks.clone(),
            _ => return FireReport::default(),
        };

        let value = match data.into_lua(lua) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to convert data for event {}: {}", event_name, e);
                return FireReport {
                    invoked: 0,
                    failed: callbacks.len(),
                };
            }
        };

        let mut report = FireReport::default();
        for callback in callbacks {
            match callback.call::<()>(value.clone()) {
                Ok(()) => report.invoked += 1,
                Err(e) => {
                    error!("Error in event handler for {}: {}", event_name, e);
                    report.failed += 1;
                }
            }
        }
        debug!(
            event = event_name,
            invoked = report.invoked,
            failed = report.failed,
            "event fired"
        );
        report
    }
}
