//! Deferred recipe registration.
//!
//! Scripts call `addShaped` while they load, at arbitrary times. The host
//! only lets recipe tables change while it rebuilds them, so each call is
//! kept as a task and run later by [`RecipeRegistry::apply`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use mlua::{Table, Value};
use tracing::{error, info, warn};

use super::bridge;
use super::install;
use super::types::ApplyReport;
use crate::config::RecipesConfig;
use crate::error::{BridgeError, RecipeError};
use crate::host::{
    Ingredient, Item, ItemRegistry, ItemStack, RecipeStorage, ResourceLocation, ShapedPattern,
};
use crate::{Result, ScriptError};

/// A validated shaped recipe, ready to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedRecipeData {
    pub output: ItemStack,
    pub pattern: ShapedPattern,
}

/// Where a pending task runs.
struct ApplyTarget<'a> {
    items: &'a dyn ItemRegistry,
    storage: &'a dyn RecipeStorage,
    namespace: &'a str,
    max_attempts: usize,
}

enum TaskOutcome {
    Installed(ResourceLocation),
    Rejected,
    Failed,
}

type RecipeTask = Box<dyn FnOnce(&ApplyTarget<'_>) -> TaskOutcome>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyState {
    Idle,
    Applying,
}

pub struct RecipeRegistry {
    pending: RefCell<Vec<RecipeTask>>,
    state: Cell<ApplyState>,
    namespace: String,
    max_attempts: usize,
}

impl RecipeRegistry {
    pub fn new(config: &RecipesConfig) -> Self {
        Self {
            pending: RefCell::new(Vec::new()),
            state: Cell::new(ApplyState::Idle),
            namespace: config.namespace.clone(),
            max_attempts: config.max_install_retries.max(1),
        }
    }

    /// Queue a shaped recipe. The definition is read and type-checked when
    /// the task runs, not now.
    pub fn add_shaped(&self, name: &str, raw: Value) {
        let name = name.to_string();
        self.pending
            .borrow_mut()
            .push(Box::new(move |target| run_shaped_task(&name, &raw, target)));
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn state(&self) -> ApplyState {
        self.state.get()
    }

    /// Drop every pending task without running it.
    pub fn clear(&self) {
        self.pending.borrow_mut().clear();
    }

    /// Run and drain every pending task against the host tables.
    ///
    /// A task that fails never stops the ones after it. Tasks queued while
    /// applying wait for the next apply.
    pub fn apply(&self, items: &dyn ItemRegistry, storage: &dyn RecipeStorage) -> ApplyReport {
        let tasks = std::mem::take(&mut *self.pending.borrow_mut());
        let mut report = ApplyReport::default();
        if tasks.is_empty() {
            return report;
        }

        self.state.set(ApplyState::Applying);
        let target = ApplyTarget {
            items,
            storage,
            namespace: &self.namespace,
            max_attempts: self.max_attempts,
        };
        for task in tasks {
            match task(&target) {
                TaskOutcome::Installed(id) => report.installed.push(id),
                TaskOutcome::Rejected => report.rejected += 1,
                TaskOutcome::Failed => report.failed += 1,
            }
        }
        self.state.set(ApplyState::Idle);

        info!(
            installed = report.installed.len(),
            rejected = report.rejected,
            failed = report.failed,
            "Applied script recipes"
        );
        report
    }
}

fn run_shaped_task(name: &str, raw: &Value, target: &ApplyTarget<'_>) -> TaskOutcome {
    let parsed = match raw {
        Value::Table(table) => parse_shaped(table, target.items),
        other => Err(BridgeError::TypeError {
            field: "definition".to_string(),
            expected: "table",
            found: other.type_name().to_string(),
        }
        .into()),
    };
    let data = match parsed {
        Ok(data) => data,
        Err(ScriptError::Recipe(e)) => {
            warn!("Error [Recipe: {}]: {}", name, e);
            return TaskOutcome::Rejected;
        }
        Err(e) => {
            error!("System Error [Recipe: {}]: {:?}", name, e);
            return TaskOutcome::Failed;
        }
    };

    match install::install_shaped(target.storage, target.namespace, name, data, target.max_attempts)
    {
        Ok(id) => {
            info!("Registered shaped recipe {}", id);
            TaskOutcome::Installed(id)
        }
        Err(e) => {
            error!("Injection failed for {}:{}: {}", target.namespace, name, e);
            TaskOutcome::Failed
        }
    }
}

/// Parse a script table of the form
///
/// ```lua
/// { output = "minecraft:torch", count = 4,
///   key = { A = "minecraft:coal", B = "minecraft:stick" },
///   pattern = { "A", "B" } }
/// ```
pub fn parse_shaped(table: &Table, items: &dyn ItemRegistry) -> Result<ShapedRecipeData> {
    // output
    if bridge::is_absent(table, "output")? {
        return Err(RecipeError::MissingField("output").into());
    }
    let output_id = bridge::required_string(table, "output")?;
    let count = bridge::optional_integer(table, "count", 1)?;
    let count = u32::try_from(count)
        .ok()
        .filter(|c| *c >= 1)
        .ok_or(RecipeError::InvalidCount(count))?;
    let output = resolve_item(items, &output_id, RecipeError::UnknownOutput)?;

    // key
    if bridge::is_absent(table, "key")? {
        return Err(RecipeError::MissingField("key").into());
    }
    let key_table = bridge::required_table(table, "key")?;
    let mut key: HashMap<char, Item> = HashMap::new();
    for k in bridge::table_keys(&key_table)? {
        let symbol_str = match k {
            Value::String(s) => s.to_str()?.to_string(),
            Value::Integer(i) => return Err(RecipeError::InvalidKey(i.to_string()).into()),
            other => return Err(RecipeError::InvalidKey(other.type_name().to_string()).into()),
        };
        let mut chars = symbol_str.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(RecipeError::InvalidKey(symbol_str).into()),
        };
        let item_id = bridge::required_string(&key_table, &symbol_str)?;
        let item = resolve_item(items, &item_id, RecipeError::UnknownIngredient)?;
        key.insert(symbol, item);
    }

    // pattern
    if bridge::is_absent(table, "pattern")? {
        return Err(RecipeError::MissingField("pattern").into());
    }
    let pattern_table = bridge::required_table(table, "pattern")?;
    let height = pattern_table.raw_len();
    if height == 0 {
        return Err(RecipeError::EmptyPattern.into());
    }

    let mut rows: Vec<Vec<char>> = Vec::with_capacity(height);
    for index in 1..=height {
        let row = bridge::required_string_at(&pattern_table, index, "pattern")?;
        rows.push(row.chars().collect());
    }
    let width = rows[0].len();
    if width == 0 {
        return Err(RecipeError::EmptyPattern.into());
    }

    let mut ingredients = Vec::with_capacity(width * height);
    for (r, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(RecipeError::RaggedPattern {
                row: r + 1,
                expected: width,
                found: row.len(),
            }
            .into());
        }
        for &symbol in row {
            if symbol == ' ' {
                ingredients.push(Ingredient::Empty);
                continue;
            }
            let item = key.get(&symbol).ok_or(RecipeError::UnknownSymbol(symbol))?;
            ingredients.push(Ingredient::Of(item.clone()));
        }
    }

    let pattern = ShapedPattern::new(width, height, ingredients)
        .ok_or(RecipeError::EmptyPattern)?;
    Ok(ShapedRecipeData {
        output: ItemStack::new(output, count),
        pattern,
    })
}

fn resolve_item(
    items: &dyn ItemRegistry,
    id: &str,
    unknown: fn(String) -> RecipeError,
) -> std::result::Result<Item, RecipeError> {
    let location =
        ResourceLocation::parse(id).ok_or_else(|| RecipeError::InvalidItemId(id.to_string()))?;
    match items.resolve(&location) {
        Some(item) if !item.is_air() => Ok(item),
        _ => Err(unknown(id.to_string())),
    }
}
