//! Host recipe storage.
//!
//! The host exposes its recipe tables only as immutable snapshots. Writers
//! build a new [`RecipeIndex`] and publish it with
//! [`RecipeStorage::compare_and_swap`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::item::{Ingredient, ItemStack, ResourceLocation};

/// Recipe families known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeType {
    Crafting,
    Smelting,
}

/// Recipe book tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CraftingCategory {
    Building,
    Redstone,
    Equipment,
    Misc,
}

/// A rectangular crafting grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedPattern {
    width: usize,
    height: usize,
    ingredients: Vec<Ingredient>,
}

impl ShapedPattern {
    /// Returns `None` unless `ingredients` holds exactly `width * height` cells.
    pub fn new(width: usize, height: usize, ingredients: Vec<Ingredient>) -> Option<Self> {
        if width == 0 || height == 0 || ingredients.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            ingredients,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at `(row, col)`; `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&Ingredient> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.ingredients.get(row * self.width + col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedRecipe {
    pub group: String,
    pub category: CraftingCategory,
    pub pattern: ShapedPattern,
    pub result: ItemStack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipe {
    Shaped(ShapedRecipe),
}

impl Recipe {
    pub fn recipe_type(&self) -> RecipeType {
        match self {
            Recipe::Shaped(_) => RecipeType::Crafting,
        }
    }
}

/// A recipe paired with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeHolder {
    id: ResourceLocation,
    recipe: Arc<Recipe>,
}

impl RecipeHolder {
    pub fn new(id: ResourceLocation, recipe: Recipe) -> Self {
        Self {
            id,
            recipe: Arc::new(recipe),
        }
    }

    pub fn id(&self) -> &ResourceLocation {
        &self.id
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }
}

pub type RecipesByName = HashMap<ResourceLocation, RecipeHolder>;
pub type RecipesByType = HashMap<RecipeType, Arc<RecipesByName>>;

/// One immutable generation of the host recipe tables.
#[derive(Debug, Clone, Default)]
pub struct RecipeIndex {
    pub by_type: Arc<RecipesByType>,
    pub by_name: Arc<RecipesByName>,
}

impl RecipeIndex {
    /// Build both indexes from a flat list; later ids replace earlier ones.
    pub fn from_holders<I: IntoIterator<Item = RecipeHolder>>(holders: I) -> Self {
        let mut by_name = RecipesByName::new();
        let mut by_type: HashMap<RecipeType, RecipesByName> = HashMap::new();
        for holder in holders {
            by_type
                .entry(holder.recipe().recipe_type())
                .or_default()
                .insert(holder.id().clone(), holder.clone());
            by_name.insert(holder.id().clone(), holder);
        }
        Self {
            by_type: Arc::new(
                by_type
                    .into_iter()
                    .map(|(t, recipes)| (t, Arc::new(recipes)))
                    .collect(),
            ),
            by_name: Arc::new(by_name),
        }
    }

    pub fn get(&self, id: &ResourceLocation) -> Option<&RecipeHolder> {
        self.by_name.get(id)
    }

    pub fn of_type(&self, recipe_type: RecipeType) -> Option<&RecipesByName> {
        self.by_type.get(&recipe_type).map(|recipes| recipes.as_ref())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Extension seam over the host recipe tables.
pub trait RecipeStorage {
    /// The current generation.
    fn snapshot(&self) -> Arc<RecipeIndex>;

    /// Publish `next` if `current` is still the live generation.
    ///
    /// Returns `false` without side effects when another writer got there
    /// first; the caller re-reads and retries.
    fn compare_and_swap(&self, current: &Arc<RecipeIndex>, next: Arc<RecipeIndex>) -> bool;
}

/// In-memory recipe manager.
#[derive(Debug, Default)]
pub struct RecipeManager {
    index: Mutex<Arc<RecipeIndex>>,
}

impl RecipeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every recipe, as the host does when data packs reload.
    pub fn replace_all<I: IntoIterator<Item = RecipeHolder>>(&self, holders: I) {
        let next = Arc::new(RecipeIndex::from_holders(holders));
        *self.lock() = next;
    }

    pub fn get(&self, id: &ResourceLocation) -> Option<RecipeHolder> {
        self.snapshot().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Arc<RecipeIndex>> {
        self.index.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecipeStorage for RecipeManager {
    fn snapshot(&self) -> Arc<RecipeIndex> {
        Arc::clone(&self.lock())
    }

    fn compare_and_swap(&self, current: &Arc<RecipeIndex>, next: Arc<RecipeIndex>) -> bool {
        let mut live = self.lock();
        if Arc::ptr_eq(&live, current) {
            *live = next;
            true
        } else {
            false
        }
    }
}
