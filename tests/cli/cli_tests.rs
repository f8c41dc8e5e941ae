use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use mcpbridge::cli::{
    parse_key_value, Cli, Commands, ConfigCommand, ResourcesCommand, ServersCommand, ToolsCommand,
};

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["mcpbridge"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn parse_err(args: &[&str]) -> ErrorKind {
    let mut argv = vec!["mcpbridge"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap_err().kind()
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["health", "--url", "http://remote:3000", "--port", "4000"]);
    assert_eq!(cli.url.as_deref(), Some("http://remote:3000"));
    assert_eq!(cli.port, Some(4000));
    assert!(matches!(cli.command, Commands::Health));
}

#[test]
fn test_mcp_aliases() {
    let cli = parse(&["--mcp-url", "http://a:1", "--mcp-port", "2", "servers", "list"]);
    assert_eq!(cli.url.as_deref(), Some("http://a:1"));
    assert_eq!(cli.port, Some(2));
    assert!(matches!(cli.command, Commands::Servers(ServersCommand::List)));
}

#[test]
fn test_servers_add_from_flags() {
    let cli = parse(&[
        "servers",
        "add",
        "my-python-server",
        "--command",
        "python",
        "--arg",
        "/path/to/server.py",
        "--arg",
        "--verbose",
        "--env",
        "PYTHONPATH=/deps",
        "--risk-level",
        "3",
        "--docker-image",
        "python:3.11",
        "--docker-option",
        "--network=none",
        "--verify",
    ]);
    let Commands::Servers(ServersCommand::Add(args)) = cli.command else {
        panic!("expected servers add");
    };
    assert_eq!(args.id.as_deref(), Some("my-python-server"));
    assert_eq!(args.command.as_deref(), Some("python"));
    assert_eq!(args.args, vec!["/path/to/server.py", "--verbose"]);
    assert_eq!(args.env, vec![("PYTHONPATH".to_string(), "/deps".to_string())]);
    assert_eq!(args.risk_level, 3);
    assert_eq!(args.docker_image.as_deref(), Some("python:3.11"));
    assert_eq!(args.docker_options, vec!["--network=none"]);
    assert!(args.verify);
}

#[test]
fn test_servers_add_from_file() {
    let cli = parse(&["servers", "add", "--file", "server.toml"]);
    let Commands::Servers(ServersCommand::Add(args)) = cli.command else {
        panic!("expected servers add");
    };
    assert_eq!(args.file, Some(PathBuf::from("server.toml")));
    assert_eq!(args.risk_level, 1);
}

#[test]
fn test_servers_add_validation() {
    assert_eq!(
        parse_err(&["servers", "add", "x", "--command", "node", "--risk-level", "4"]),
        ErrorKind::ValueValidation
    );
    assert_eq!(
        parse_err(&["servers", "add", "x", "--command", "node", "--file", "s.toml"]),
        ErrorKind::ArgumentConflict
    );
    assert_eq!(
        parse_err(&["servers", "add"]),
        ErrorKind::MissingRequiredArgument
    );
    assert_eq!(
        parse_err(&["servers", "add", "x", "--command", "node", "--env", "NOVALUE"]),
        ErrorKind::ValueValidation
    );
}

#[test]
fn test_tools_call_defaults() {
    let cli = parse(&["tools", "call", "math-server", "add"]);
    match cli.command {
        Commands::Tools(ToolsCommand::Call {
            server_id,
            tool_name,
            args,
            routed,
            raw,
            yes,
        }) => {
            assert_eq!(server_id, "math-server");
            assert_eq!(tool_name, "add");
            assert_eq!(args, "{}");
            assert!(!routed && !raw && !yes);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_tools_list_optional_server() {
    assert!(matches!(
        parse(&["tools", "list"]).command,
        Commands::Tools(ToolsCommand::List { server_id: None, routed: false })
    ));
    assert!(matches!(
        parse(&["tools", "list", "math", "--routed"]).command,
        Commands::Tools(ToolsCommand::List { server_id: Some(_), routed: true })
    ));
}

#[test]
fn test_resources_read_takes_uri() {
    let cli = parse(&["resources", "read", "fs", "file:///tmp/notes.txt"]);
    match cli.command {
        Commands::Resources(ResourcesCommand::Read { server_id, uri }) => {
            assert_eq!(server_id, "fs");
            assert_eq!(uri, "file:///tmp/notes.txt");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_confirm_requires_one_decision() {
    assert!(matches!(
        parse(&["confirm", "c-1", "--approve"]).command,
        Commands::Confirm { approve: true, reject: false, .. }
    ));
    assert_eq!(
        parse_err(&["confirm", "c-1"]),
        ErrorKind::MissingRequiredArgument
    );
    assert_eq!(
        parse_err(&["confirm", "c-1", "--approve", "--reject"]),
        ErrorKind::ArgumentConflict
    );
}

#[test]
fn test_postman_targets() {
    let cli = parse(&[
        "postman",
        "--server-command",
        "python",
        "--server-arg",
        "server.py",
        "--server-env",
        "DEBUG=1",
        "--no-save",
    ]);
    let Commands::Postman(args) = cli.command else {
        panic!("expected postman");
    };
    assert_eq!(args.server_command.as_deref(), Some("python"));
    assert_eq!(args.server_args, vec!["server.py"]);
    assert_eq!(args.prefix, "mcp-server-postman-collection");
    assert_eq!(args.server_type, "http");
    assert!(args.no_save);

    assert_eq!(parse_err(&["postman"]), ErrorKind::MissingRequiredArgument);
    assert_eq!(
        parse_err(&["postman", "--server-url", "http://x/mcp", "--server-command", "py"]),
        ErrorKind::ArgumentConflict
    );
    assert_eq!(
        parse_err(&["postman", "--server-command", "py", "--auth-token", "t"]),
        ErrorKind::MissingRequiredArgument
    );
}

#[test]
fn test_agent_and_timeout_flags() {
    let Commands::Agent(args) = parse(&[
        "agent",
        "--hide-json",
        "--json-width",
        "80",
        "--max-tool-steps",
        "3",
    ])
    .command
    else {
        panic!("expected agent");
    };
    assert!(args.hide_json);
    assert_eq!(args.json_width, Some(80));
    assert_eq!(args.max_tool_steps, Some(3));
    assert_eq!(args.model, None);

    assert!(matches!(
        parse(&["timeout-test", "1.5", "--client-timeout", "120", "-y"]).command,
        Commands::TimeoutTest { minutes: Some(m), client_timeout: Some(t), yes: true } if m == 1.5 && t == 120.0
    ));
    assert!(matches!(
        parse(&["timeout-test"]).command,
        Commands::TimeoutTest { minutes: None, client_timeout: None, yes: false }
    ));
}

#[test]
fn test_config_and_demo_commands() {
    assert!(matches!(
        parse(&["config", "check"]).command,
        Commands::Config(ConfigCommand::Check)
    ));
    assert!(matches!(
        parse(&["demo", "--advanced", "--server", "calc"]).command,
        Commands::Demo { advanced: true, server: Some(_) }
    ));
}

#[test]
fn test_parse_key_value() {
    assert_eq!(
        parse_key_value("A=b=c").unwrap(),
        ("A".to_string(), "b=c".to_string())
    );
    assert_eq!(parse_key_value("EMPTY=").unwrap(), ("EMPTY".to_string(), String::new()));
    assert!(parse_key_value("=x").is_err());
    assert!(parse_key_value("novalue").is_err());
}
