use std::rc::Rc;

use tracing::{info, warn};

use luascript::host::{
    BlockBreakEvent, BufferedSource, ItemTable, PlayerJoinEvent, RecipeManager, ResourceLocation,
    SimpleDispatcher, BLOCK_BREAK, PLAYER_JOIN,
};
use luascript::{Config, EngineManager, HostValue};

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = luascript::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        luascript::logging::init_console_only(&config.logging.level);
    }

    info!("luascript demo host");
    info!("Script root: {}", config.scripts.root.display());

    let items = ItemTable::vanilla();
    let recipes = RecipeManager::new();
    let mut dispatcher = SimpleDispatcher::new();

    let mut manager = EngineManager::new(&config);
    if let Err(e) = manager.init() {
        warn!("Scripting disabled: {e}");
        return;
    }

    let server = manager.reload_server_scripts();
    let client = manager.reload_client_scripts();
    info!(
        "Scripts loaded: {} ok, {} failed",
        server.loaded() + client.loaded(),
        server.failed() + client.failed()
    );

    let applied = manager.apply_recipes(&items, &recipes);
    info!(
        "Recipes: {} installed, {} rejected, {} failed",
        applied.installed.len(),
        applied.rejected,
        applied.failed
    );

    let commands = manager.register_commands(&mut dispatcher);
    info!("Commands installed: {}", commands);
    for name in dispatcher.names() {
        let source = Rc::new(BufferedSource::new("Server"));
        let code = dispatcher.execute(name, source.clone());
        info!(
            "/{} -> {:?} (replies: {:?}, errors: {:?})",
            name,
            code,
            source.successes(),
            source.failures()
        );
    }

    if let Some(stone) = ResourceLocation::parse("minecraft:stone") {
        let event = Rc::new(BlockBreakEvent::new("Steve", stone, (10, 64, -3)));
        let fired = manager.fire(BLOCK_BREAK, HostValue::Object(event.clone()));
        info!(
            "block_break: {} listeners, {} failed, canceled = {}",
            fired.invoked,
            fired.failed,
            event.is_canceled()
        );
    }

    let fired = manager.fire(
        PLAYER_JOIN,
        HostValue::object(PlayerJoinEvent::new("Steve", true)),
    );
    info!("player_join: {} listeners, {} failed", fired.invoked, fired.failed);
}
