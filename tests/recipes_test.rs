//! Shaped recipes defined by scripts and installed into host storage.

mod common;

use common::TestHost;
use luascript::host::{
    CraftingCategory, Ingredient, Item, ItemStack, Recipe, RecipeHolder, RecipeStorage,
    RecipeType, ResourceLocation, ShapedPattern, ShapedRecipe,
};
use luascript::script::ApplyState;

fn id(s: &str) -> ResourceLocation {
    ResourceLocation::parse(s).unwrap()
}

fn item(s: &str) -> Item {
    Item::new(id(s))
}

fn shaped(holder: &RecipeHolder) -> &ShapedRecipe {
    match holder.recipe() {
        Recipe::Shaped(recipe) => recipe,
    }
}

#[test]
fn test_shaped_recipe_end_to_end() {
    let host = TestHost::started();
    host.write_server_script(
        "recipes.lua",
        r#"
        recipes.addShaped("checker_torch", {
            output = "minecraft:torch",
            count = 4,
            key = { A = "minecraft:stick", B = "minecraft:coal" },
            pattern = { "AB", "BA" },
        })
    "#,
    );
    assert!(host.manager.reload_server_scripts().is_clean());
    assert_eq!(host.manager.registries().recipes.pending_count(), 1);

    let report = host.apply_recipes();

    assert_eq!(report.installed, vec![id("luascript:checker_torch")]);
    assert_eq!(report.total(), 1);

    let holder = host.recipes.get(&id("luascript:checker_torch")).unwrap();
    let recipe = shaped(&holder);
    assert_eq!(recipe.result, ItemStack::new(item("minecraft:torch"), 4));
    assert_eq!(recipe.category, CraftingCategory::Misc);

    let stick = Ingredient::Of(item("minecraft:stick"));
    let coal = Ingredient::Of(item("minecraft:coal"));
    let expected =
        ShapedPattern::new(2, 2, vec![stick.clone(), coal.clone(), coal, stick]).unwrap();
    assert_eq!(recipe.pattern, expected);

    let snapshot = host.recipes.snapshot();
    assert!(snapshot
        .of_type(RecipeType::Crafting)
        .unwrap()
        .contains_key(&id("luascript:checker_torch")));
}

#[test]
fn test_second_apply_installs_nothing() {
    let host = TestHost::started();
    host.write_server_script(
        "recipes.lua",
        r#"
        recipes.addShaped("torch", {
            output = "minecraft:torch",
            key = { C = "minecraft:coal", S = "minecraft:stick" },
            pattern = { "C", "S" },
        })
    "#,
    );
    host.manager.reload_server_scripts();

    let first = host.apply_recipes();
    let second = host.apply_recipes();

    assert_eq!(first.installed.len(), 1);
    assert_eq!(second.total(), 0);
    assert_eq!(host.recipes.len(), 1);
    assert_eq!(host.manager.registries().recipes.state(), ApplyState::Idle);
}

#[test]
fn test_invalid_recipes_do_not_block_valid_ones() {
    let host = TestHost::started();
    host.write_server_script(
        "recipes.lua",
        r#"
        recipes.addShaped("ragged", {
            output = "minecraft:torch",
            key = { A = "minecraft:coal" },
            pattern = { "AA", "A" },
        })
        recipes.addShaped("unknown_symbol", {
            output = "minecraft:torch",
            key = { A = "minecraft:coal", B = "minecraft:stick" },
            pattern = { "AB", "BC" },
        })
        recipes.addShaped("unknown_output", {
            output = "minecraft:unobtainium",
            key = { A = "minecraft:coal" },
            pattern = { "A" },
        })
        recipes.addShaped("bad_type", {
            output = 42,
            key = { A = "minecraft:coal" },
            pattern = { "A" },
        })
        recipes.addShaped("table", {
            output = "minecraft:crafting_table",
            key = { P = "minecraft:oak_planks" },
            pattern = { "PP", "PP" },
        })
    "#,
    );
    assert!(host.manager.reload_server_scripts().is_clean());

    let report = host.apply_recipes();

    assert_eq!(report.installed, vec![id("luascript:table")]);
    assert_eq!(report.rejected, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(host.recipes.len(), 1);
}

#[test]
fn test_recipe_table_is_read_at_apply_time() {
    let host = TestHost::started();
    host.write_server_script(
        "recipes.lua",
        r#"
        stick_recipe = {
            output = "minecraft:stick",
            key = { P = "minecraft:oak_planks" },
            pattern = { "P", "P" },
        }
        recipes.addShaped("sticks", stick_recipe)
        stick_recipe.count = 8
    "#,
    );
    host.manager.reload_server_scripts();

    host.apply_recipes();

    let holder = host.recipes.get(&id("luascript:sticks")).unwrap();
    assert_eq!(shaped(&holder).result.count, 8);
}

#[test]
fn test_script_recipe_replaces_same_id_and_keeps_others() {
    let host = TestHost::started();
    host.recipes.replace_all(vec![RecipeHolder::new(
        id("minecraft:stick"),
        Recipe::Shaped(ShapedRecipe {
            group: "sticks".to_string(),
            category: CraftingCategory::Misc,
            pattern: ShapedPattern::new(
                1,
                2,
                vec![
                    Ingredient::Of(item("minecraft:oak_planks")),
                    Ingredient::Of(item("minecraft:oak_planks")),
                ],
            )
            .unwrap(),
            result: ItemStack::new(item("minecraft:stick"), 4),
        }),
    )]);
    host.write_server_script(
        "recipes.lua",
        r#"
        for _, count in ipairs({ 1, 2 }) do
            recipes.addShaped("stone_pick", {
                output = "minecraft:diamond_pickaxe",
                count = count,
                key = { S = "minecraft:stone", T = "minecraft:stick" },
                pattern = { "SSS", " T ", " T " },
            })
        end
    "#,
    );
    host.manager.reload_server_scripts();

    let report = host.apply_recipes();

    assert_eq!(report.installed.len(), 2);
    assert_eq!(host.recipes.len(), 2);
    assert!(host.recipes.get(&id("minecraft:stick")).is_some());
    let holder = host.recipes.get(&id("luascript:stone_pick")).unwrap();
    assert_eq!(shaped(&holder).result.count, 2);
}

#[test]
fn test_clearing_reload_drops_unapplied_recipes() {
    let mut host = TestHost::clearing();
    host.manager.init().unwrap();
    host.write_server_script(
        "recipes.lua",
        r#"
        recipes.addShaped("torch", {
            output = "minecraft:torch",
            key = { C = "minecraft:coal", S = "minecraft:stick" },
            pattern = { "C", "S" },
        })
    "#,
    );

    host.manager.reload_server_scripts();
    host.manager.reload_server_scripts();

    assert_eq!(host.manager.registries().recipes.pending_count(), 1);
    assert_eq!(host.apply_recipes().installed.len(), 1);
}

#[test]
fn test_non_table_definition_fails_only_that_recipe() {
    let host = TestHost::started();
    host.write_server_script(
        "recipes.lua",
        r#"
        recipes.addShaped("nothing", nil)
        recipes.addShaped("torch", {
            output = "minecraft:torch",
            key = { C = "minecraft:coal", S = "minecraft:stick" },
            pattern = { "C", "S" },
        })
        commands.register("after", function(ctx) end)
    "#,
    );
    assert!(host.manager.reload_server_scripts().is_clean());
    assert_eq!(host.manager.registries().commands.names(), vec!["after"]);

    let report = host.apply_recipes();

    assert_eq!(report.installed, vec![id("luascript:torch")]);
    assert_eq!(report.failed, 1);
    assert_eq!(report.rejected, 0);
}
