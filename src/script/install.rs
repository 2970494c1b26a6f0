//! Recipe installation into host storage.
//!
//! This is the only module that writes to the host recipe tables. The host
//! publishes them as immutable snapshots, so every install copies the
//! affected maps, adds the new holder, and swaps the whole generation in.

use std::sync::Arc;

use tracing::debug;

use super::recipes::ShapedRecipeData;
use crate::error::InstallError;
use crate::host::{
    CraftingCategory, Recipe, RecipeHolder, RecipeIndex, RecipeStorage, RecipesByName,
    ResourceLocation, ShapedRecipe,
};

/// Install `data` as `<namespace>:<name>`, replacing a recipe with the same id.
pub fn install_shaped(
    storage: &dyn RecipeStorage,
    namespace: &str,
    name: &str,
    data: ShapedRecipeData,
    max_attempts: usize,
) -> Result<ResourceLocation, InstallError> {
    let id = ResourceLocation::new(namespace, name)
        .ok_or_else(|| InstallError::InvalidId(format!("{namespace}:{name}")))?;

    let recipe = Recipe::Shaped(ShapedRecipe {
        group: String::new(),
        category: CraftingCategory::Misc,
        pattern: data.pattern,
        result: data.output,
    });
    let holder = RecipeHolder::new(id.clone(), recipe);

    for attempt in 1..=max_attempts {
        let current = storage.snapshot();
        let next = Arc::new(merge(&current, &holder));
        if storage.compare_and_swap(&current, next) {
            return Ok(id);
        }
        debug!(recipe = %id, attempt, "recipe storage changed during install, retrying");
    }
    Err(InstallError::Contended(max_attempts))
}

/// A new generation holding everything in `index` plus `holder`.
pub fn merge(index: &RecipeIndex, holder: &RecipeHolder) -> RecipeIndex {
    let recipe_type = holder.recipe().recipe_type();

    let mut of_type: RecipesByName = index
        .by_type
        .get(&recipe_type)
        .map(|recipes| recipes.as_ref().clone())
        .unwrap_or_default();
    of_type.insert(holder.id().clone(), holder.clone());

    let mut by_type = index.by_type.as_ref().clone();
    by_type.insert(recipe_type, Arc::new(of_type));

    let mut by_name = index.by_name.as_ref().clone();
    by_name.insert(holder.id().clone(), holder.clone());

    RecipeIndex {
        by_type: Arc::new(by_type),
        by_name: Arc::new(by_name),
    }
}
