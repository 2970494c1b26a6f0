//! Engine lifecycle tests: init, reload and per-file isolation.

mod common;

use std::fs;

use common::TestHost;
use luascript::{EngineState, ScriptError};

#[test]
fn test_init_creates_layout_and_shim() {
    let mut host = TestHost::new();
    assert_eq!(host.manager.state(), EngineState::Uninitialized);

    host.manager.init().unwrap();

    let root = host.root();
    assert!(root.join("server").is_dir());
    assert!(root.join("client").is_dir());
    let shim = fs::read_to_string(root.join("api.lua")).unwrap();
    assert!(shim.contains("function events.listen(name, callback)"));
    assert!(shim.contains("function commands.register(name, callback)"));
    assert!(shim.contains("function recipes.addShaped(name, definition)"));
}

#[test]
fn test_second_init_does_not_overwrite_modified_shim() {
    let mut host = TestHost::started();
    let shim_path = host.root().join("api.lua");
    fs::write(&shim_path, "-- customized\ncustom_shim = true\n").unwrap();

    host.manager.init().unwrap();

    let shim = fs::read_to_string(&shim_path).unwrap();
    assert_eq!(shim, "-- customized\ncustom_shim = true\n");

    host.manager.reload_server_scripts();
    let engine = host.manager.engine().unwrap();
    let custom: bool = engine.get_global("custom_shim").unwrap();
    assert!(custom);
}

#[test]
fn test_deleted_shim_is_regenerated_by_init() {
    let mut host = TestHost::started();
    let shim_path = host.root().join("api.lua");
    fs::remove_file(&shim_path).unwrap();

    host.manager.init().unwrap();

    assert!(shim_path.is_file());
}

#[test]
fn test_reload_before_init_is_empty() {
    let host = TestHost::new();
    host.write_server_script("main.lua", "loaded = true");

    let report = host.manager.reload_server_scripts();

    assert!(report.outcomes.is_empty());
    assert!(matches!(
        host.manager.engine(),
        Err(ScriptError::NotInitialized)
    ));
}

#[test]
fn test_broken_file_does_not_stop_the_rest() {
    let host = TestHost::started();
    host.write_server_script("a_ok.lua", "a_loaded = true");
    host.write_server_script("b_syntax.lua", "function (");
    host.write_server_script("c_runtime.lua", "local t = nil; t.x = 1");
    host.write_server_script("d_ok.lua", "d_loaded = true");

    let report = host.manager.reload_server_scripts();

    assert_eq!(
        report.files(),
        vec![
            "api.lua",
            "server/a_ok.lua",
            "server/b_syntax.lua",
            "server/c_runtime.lua",
            "server/d_ok.lua",
        ]
    );
    assert_eq!(report.loaded(), 3);
    assert_eq!(report.failed(), 2);
    let failed: Vec<&str> = report.failures().map(|(file, _)| file).collect();
    assert_eq!(failed, vec!["server/b_syntax.lua", "server/c_runtime.lua"]);

    let engine = host.manager.engine().unwrap();
    let a: bool = engine.get_global("a_loaded").unwrap();
    let d: bool = engine.get_global("d_loaded").unwrap();
    assert!(a && d);
}

#[test]
fn test_non_script_files_are_ignored() {
    let host = TestHost::started();
    host.write_server_script("readme.txt", "not lua at all (");
    host.write_server_script("main.lua", "main_loaded = true");

    let report = host.manager.reload_server_scripts();

    assert!(report.is_clean());
    assert_eq!(report.files(), vec!["api.lua", "server/main.lua"]);
}

#[test]
fn test_missing_server_folder_loads_only_shim() {
    let host = TestHost::started();
    fs::remove_dir(host.root().join("server")).unwrap();

    let report = host.manager.reload_server_scripts();

    assert_eq!(report.files(), vec!["api.lua"]);
    assert!(report.is_clean());
}

#[test]
fn test_client_scripts_share_globals_with_server() {
    let host = TestHost::started();
    host.write_server_script("shared.lua", "greeting = 'hello'");
    host.write_client_script("ui.lua", "ui_greeting = greeting .. ' client'");

    assert!(host.manager.reload_server_scripts().is_clean());
    let report = host.manager.reload_client_scripts();

    assert_eq!(report.files(), vec!["client/ui.lua"]);
    let engine = host.manager.engine().unwrap();
    let value: String = engine.get_global("ui_greeting").unwrap();
    assert_eq!(value, "hello client");
}
