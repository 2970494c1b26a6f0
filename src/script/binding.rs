//! The registry object scripts talk to, and the Lua shim built on it.

use std::rc::Rc;

use mlua::{Function, UserData, UserDataMethods, Value};

use super::commands::CommandRegistry;
use super::events::EventRegistry;
use super::recipes::RecipeRegistry;
use crate::config::RecipesConfig;
use crate::host::{BLOCK_BREAK, PLAYER_JOIN};

/// Every registry fed by scripts.
pub struct Registries {
    pub events: EventRegistry,
    pub commands: CommandRegistry,
    pub recipes: RecipeRegistry,
}

impl Registries {
    pub fn new(recipes: &RecipesConfig) -> Self {
        Self {
            events: EventRegistry::new(),
            commands: CommandRegistry::new(),
            recipes: RecipeRegistry::new(recipes),
        }
    }
}

/// Userdata exposing [`Registries`] to Lua.
pub struct RegistryBinding(Rc<Registries>);

impl RegistryBinding {
    pub fn new(registries: Rc<Registries>) -> Self {
        Self(registries)
    }
}

impl UserData for RegistryBinding {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method(
            "register",
            |_, this, (event, callback): (String, Function)| {
                this.0.events.register(&event, callback);
                Ok(())
            },
        );

        methods.add_method(
            "registerCommand",
            |_, this, (name, callback): (String, Function)| {
                this.0.commands.register(&name, callback);
                Ok(())
            },
        );

        methods.add_method("addShaped", |_, this, (name, definition): (String, Value)| {
            this.0.recipes.add_shaped(&name, definition);
            Ok(())
        });

        methods.add_method("clearEvents", |_, this, ()| {
            this.0.events.clear();
            Ok(())
        });
    }
}

/// Lua source of the API shim, written once into the script root.
///
/// The file is never overwritten afterwards, so server owners may edit it.
pub fn shim_source(global: &str) -> String {
    format!(
        r#"-- luascript API
-- Generated on first start. This file is not overwritten; edit freely.

events = events or {{}}

function events.listen(name, callback)
    {global}:register(name, callback)
end

function events.onBlockBreak(callback)
    events.listen("{block_break}", callback)
end

function events.onPlayerJoin(callback)
    events.listen("{player_join}", callback)
end

commands = commands or {{}}

function commands.register(name, callback)
    {global}:registerCommand(name, callback)
end

recipes = recipes or {{}}

function recipes.addShaped(name, definition)
    {global}:addShaped(name, definition)
end
"#,
        block_break = BLOCK_BREAK,
        player_join = PLAYER_JOIN,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlua::Lua;

    fn setup() -> (Lua, Rc<Registries>) {
        let lua = Lua::new();
        let registries = Rc::new(Registries::new(&RecipesConfig::default()));
        lua.globals()
            .set("_REGISTRY", RegistryBinding::new(Rc::clone(&registries)))
            .unwrap();
        (lua, registries)
    }

    #[test]
    fn test_binding_methods() {
        let (lua, registries) = setup();
        lua.load(
            r#"
            _REGISTRY:register("tick", function() end)
            _REGISTRY:register("tick", function() end)
            _REGISTRY:registerCommand("spawn", function(ctx) end)
            _REGISTRY:addShaped("thing", { output = "minecraft:stick" })
        "#,
        )
        .exec()
        .unwrap();

        assert_eq!(registries.events.listener_count("tick"), 2);
        assert_eq!(registries.commands.names(), vec!["spawn"]);
        assert_eq!(registries.recipes.pending_count(), 1);

        lua.load("_REGISTRY:clearEvents()").exec().unwrap();
        assert_eq!(registries.events.listener_count("tick"), 0);
        assert_eq!(registries.commands.len(), 1);
    }

    #[test]
    fn test_binding_rejects_non_function_callback() {
        let (lua, registries) = setup();
        let result = lua.load(r#"_REGISTRY:register("tick", 42)"#).exec();
        assert!(result.is_err());
        assert_eq!(registries.events.listener_count("tick"), 0);
    }

    #[test]
    fn test_add_shaped_defers_type_check() {
        let (lua, registries) = setup();
        lua.load(
            r#"
            _REGISTRY:addShaped("nothing", nil)
            _REGISTRY:addShaped("text", "not a table")
            after = true
        "#,
        )
        .exec()
        .unwrap();

        let after: bool = lua.globals().get("after").unwrap();
        assert!(after);
        assert_eq!(registries.recipes.pending_count(), 2);
    }

    #[test]
    fn test_shim_routes_through_registry() {
        let (lua, registries) = setup();
        lua.load(shim_source("_REGISTRY")).exec().unwrap();
        lua.load(
            r#"
            events.onBlockBreak(function(e) end)
            events.onPlayerJoin(function(e) end)
            events.listen("custom", function(e) end)
            commands.register("home", function(ctx) end)
            recipes.addShaped("torch", { output = "minecraft:torch" })
        "#,
        )
        .exec()
        .unwrap();

        assert_eq!(registries.events.listener_count(BLOCK_BREAK), 1);
        assert_eq!(registries.events.listener_count(PLAYER_JOIN), 1);
        assert_eq!(registries.events.listener_count("custom"), 1);
        assert_eq!(registries.commands.names(), vec!["home"]);
        assert_eq!(registries.recipes.pending_count(), 1);
    }

    #[test]
    fn test_shim_uses_configured_global() {
        let source = shim_source("HOST");
        assert!(source.contains("HOST:register(name, callback)"));
        assert!(source.contains("HOST:addShaped(name, definition)"));
        assert!(!source.contains("_REGISTRY"));
    }
}
