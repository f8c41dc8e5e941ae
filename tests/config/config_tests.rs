use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use clap::Parser;
use mcpbridge::cli::Cli;
use mcpbridge::config::{Config, ConfigError, CONFIG_PATH_ENV};
use mcpbridge::core::bridge::RequestTimeouts;
use mcpbridge::handlers::Context;
use serial_test::serial;

use crate::common::{create_temp_dir, IsolatedEnv};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.bridge.url, "http://localhost:3000");
    assert_eq!(config.bridge.port, None);
    assert_eq!(config.agent.model, "gemini-2.5-pro");
    assert_eq!(config.agent.max_tool_steps, 10);
    assert!(config.agent.show_json);
    assert_eq!(config.agent.json_width, 100);
    assert_eq!(config.agent.request_timeout(), Some(Duration::from_secs(120)));
    assert_eq!(config.request_timeouts(), RequestTimeouts::default());
    assert!(config.check().is_ok());
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = create_temp_dir();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[bridge]
url = "https://bridge.example.com/"

[bridge.timeouts]
tool_secs = 0

[agent]
show_json = false
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.base_url().unwrap(), "https://bridge.example.com");
    assert!(!config.agent.show_json);
    assert_eq!(config.agent.request_secs, 120);
    assert_eq!(config.agent.json_width, 100);

    let timeouts = config.request_timeouts();
    assert_eq!(timeouts.default, Some(Duration::from_secs(30)));
    assert_eq!(timeouts.tool_execution, None);
    assert_eq!(timeouts.discovery, Some(Duration::from_secs(180)));
}

#[test]
fn test_invalid_file_is_parse_error() {
    let dir = create_temp_dir();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[bridge\nurl = ").unwrap();
    assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_env_precedence() {
    let mut config = Config::default();
    config.apply_env(lookup(&[
        ("MCP_BRIDGE_URL", "http://primary:3000"),
        ("BRIDGE_URL", "http://secondary:3000"),
    ]));
    assert_eq!(config.bridge.url, "http://primary:3000");

    let mut config = Config::default();
    config.apply_env(lookup(&[
        ("MCP_BRIDGE_URL", "   "),
        ("BRIDGE_URL", "http://secondary:3000"),
    ]));
    assert_eq!(config.bridge.url, "http://secondary:3000");

    let mut config = Config::default();
    config.apply_env(lookup(&[]));
    assert_eq!(config.bridge.url, "http://localhost:3000");
}

#[test]
fn test_cli_overrides_and_port() {
    let mut config = Config::default();
    config.bridge.port = Some(5000);
    assert_eq!(config.base_url().unwrap(), "http://localhost:5000");

    config.apply_cli(Some("http://10.0.0.5:3000/bridge/"), Some(8080));
    assert_eq!(config.base_url().unwrap(), "http://10.0.0.5:8080/bridge");

    config.apply_cli(None, None);
    assert_eq!(config.bridge.port, Some(8080));
}

#[test]
fn test_init_at_writes_defaults_once() {
    let dir = create_temp_dir();
    let path = dir.path().join("nested").join("config.toml");

    Config::init_at(&path).unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    assert!(matches!(
        Config::init_at(&path),
        Err(ConfigError::AlreadyExists(_))
    ));
}

#[test]
fn test_toml_round_trip_of_custom_values() {
    let mut config = Config::default();
    config.bridge.port = Some(4000);
    config.agent.model = "gemini-2.5-flash".into();
    config.output.collections_dir = "collections".into();

    let text = config.to_toml().unwrap();
    assert!(text.contains("port = 4000"));
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_check_rejects_bad_values() {
    let mut narrow = Config::default();
    narrow.agent.json_width = 10;
    assert!(matches!(narrow.check(), Err(ConfigError::Invalid(_))));

    let mut no_steps = Config::default();
    no_steps.agent.max_tool_steps = 0;
    assert!(no_steps.check().is_err());

    let mut bad_url = Config::default();
    bad_url.bridge.url = "localhost".into();
    assert!(bad_url.check().is_err());

    let mut no_model = Config::default();
    no_model.agent.model = " ".into();
    assert!(no_model.check().is_err());
}

#[test]
#[serial]
fn test_default_path_env_override() {
    let env = IsolatedEnv::new();
    env.set(CONFIG_PATH_ENV, "/tmp/mcpbridge-test.toml");
    assert_eq!(
        Config::default_path(),
        std::path::PathBuf::from("/tmp/mcpbridge-test.toml")
    );
}

#[test]
#[serial]
fn test_default_path_under_home() {
    let env = IsolatedEnv::new();
    let home = create_temp_dir();
    env.set_temp_home(home.path());
    assert_eq!(
        Config::default_path(),
        home.path().join(".mcp-bridge").join("config.toml")
    );
}

#[test]
#[serial]
fn test_context_layers_file_env_and_flags() {
    let env = IsolatedEnv::new();
    let dir = create_temp_dir();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[bridge]\nurl = \"http://from-file:3000\"\n\n[agent]\njson_width = 60\nshow_json = false\n",
    )
    .unwrap();

    let config_arg = path.to_str().unwrap();

    let cli = Cli::try_parse_from(["mcpbridge", "--config", config_arg, "health"]).unwrap();
    let ctx = Context::from_cli(&cli).unwrap();
    assert_eq!(ctx.base_url().unwrap(), "http://from-file:3000");
    assert_eq!(ctx.renderer.json_width, 60);
    // Only the agent session hides JSON
    assert!(!ctx.config.agent.show_json);
    assert!(ctx.renderer.show_json);
    assert!(ctx.renderer.color);

    env.set("BRIDGE_URL", "http://from-env:3000");
    let ctx = Context::from_cli(&cli).unwrap();
    assert_eq!(ctx.base_url().unwrap(), "http://from-env:3000");

    let cli = Cli::try_parse_from([
        "mcpbridge",
        "--config",
        config_arg,
        "--mcp-url",
        "http://from-flag:3000",
        "--port",
        "9000",
        "--no-color",
        "health",
    ])
    .unwrap();
    let ctx = Context::from_cli(&cli).unwrap();
    assert_eq!(ctx.base_url().unwrap(), "http://from-flag:9000");
    assert!(!ctx.renderer.color);
    assert_eq!(ctx.config_path, path);
}
