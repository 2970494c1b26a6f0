//! Host-side boundary.
//!
//! The game itself is an external collaborator. This module holds the
//! narrow traits the scripting bridge calls into, plus small in-memory
//! implementations used by the demo binary and tests.

pub mod command;
pub mod event;
pub mod item;
pub mod recipe;

pub use command::{
    BufferedSource, CommandContext, CommandDispatcher, CommandHandler, CommandSource,
    SimpleDispatcher, COMMAND_FAILURE, COMMAND_SUCCESS,
};
pub use event::{BlockBreakEvent, PlayerJoinEvent, BLOCK_BREAK, PLAYER_JOIN};
pub use item::{Ingredient, Item, ItemRegistry, ItemStack, ItemTable, ResourceLocation};
pub use recipe::{
    CraftingCategory, Recipe, RecipeHolder, RecipeIndex, RecipeManager, RecipeStorage,
    RecipeType, RecipesByName, RecipesByType, ShapedPattern, ShapedRecipe,
};
