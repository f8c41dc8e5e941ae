use std::time::Duration;

use clap::Parser;
use mcpbridge::cli::{Cli, Commands, ServersCommand};
use mcpbridge::core::agent::{AgentError, AgentEvent};
use mcpbridge::core::bridge::{
    BridgeError, ConfirmationRequest, HttpMethod, NewServer, PostmanTarget, ServerDescriptor,
    TransportError,
};
use mcpbridge::core::render::ConsoleRenderer;
use mcpbridge::handlers::demo::{
    advanced_operations, basic_operations, pick_demo_server, run_operations,
};
use mcpbridge::handlers::input::{is_exit_command, is_yes};
use mcpbridge::handlers::operator::TerminalOperator;
use mcpbridge::handlers::postman::target_from_args;
use mcpbridge::handlers::servers::{self, AddOutcome, RemoveOutcome, VerifyOutcome};
use mcpbridge::handlers::timeout::{
    accuracy_percent, check_minutes, client_timeout_from_secs, FailureAnalysis,
};
use mcpbridge::handlers::tools::resolve_interactively;
use mcpbridge::handlers::{dispatch, parse_json_object, HandlerError};
use serde_json::json;

use crate::common::{client, create_temp_dir, envelope, url, MockTransport};

fn descriptors(ids: &[&str]) -> Vec<ServerDescriptor> {
    ids.iter()
        .map(|id| serde_json::from_value(json!({"id": id})).unwrap())
        .collect()
}

#[test]
fn test_new_server_from_flags() {
    let cli = Cli::try_parse_from([
        "mcpbridge", "servers", "add", "calc", "--command", "node", "--arg", "calc.js", "--env",
        "MODE=fast", "--risk-level", "3", "--docker-image", "node:20",
    ])
    .unwrap();
    let Commands::Servers(ServersCommand::Add(args)) = cli.command else {
        panic!("expected servers add");
    };

    let server = servers::new_server_from_args(&args).unwrap();
    assert_eq!(server.id, "calc");
    assert_eq!(server.command_line(), "node calc.js");
    assert_eq!(server.env.get("MODE").map(String::as_str), Some("fast"));
    assert_eq!(server.risk_level, 3);
    assert_eq!(server.docker.unwrap().image, "node:20");
}

#[test]
fn test_server_definition_file() {
    let dir = create_temp_dir();
    let path = dir.path().join("server.toml");
    std::fs::write(
        &path,
        r#"
id = "my-python-server"
command = "python"
args = ["/path/to/mcp_server.py"]
riskLevel = 2

[env]
PYTHONPATH = "/path/to/dependencies"
"#,
    )
    .unwrap();

    let server = servers::load_server_file(&path).unwrap();
    let mut expected = NewServer::new("my-python-server", "python", vec!["/path/to/mcp_server.py".into()]);
    expected.risk_level = 2;
    expected
        .env
        .insert("PYTHONPATH".into(), "/path/to/dependencies".into());
    assert_eq!(server, expected);

    std::fs::write(&path, "command = \"python\"").unwrap();
    assert!(matches!(
        servers::load_server_file(&path),
        Err(HandlerError::Arguments(_))
    ));
}

#[tokio::test]
async fn test_add_maps_conflict_to_already_exists() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/servers"),
        409,
        json!({"error": "Server already exists"}),
    );
    let outcome = servers::add(
        &client(&mock),
        &ConsoleRenderer::plain(),
        &NewServer::new("calc", "node", vec![]),
    )
    .await
    .unwrap();
    assert!(matches!(outcome, AddOutcome::AlreadyExists));
}

#[tokio::test]
async fn test_add_propagates_other_failures() {
    let mock = MockTransport::new();
    mock.respond(HttpMethod::Post, &url("/servers"), 500, json!({"error": "spawn failed"}));
    let err = servers::add(
        &client(&mock),
        &ConsoleRenderer::plain(),
        &NewServer::new("calc", "node", vec![]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, HandlerError::Bridge(BridgeError::Status { status: 500, .. })));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_remove_outcomes() {
    let mock = MockTransport::new();
    mock.respond(HttpMethod::Delete, &url("/servers/calc"), 200, json!({"status": "disconnected"}));
    mock.respond_raw(HttpMethod::Delete, &url("/servers/ghost"), 404, "");

    let c = client(&mock);
    let r = ConsoleRenderer::plain();
    assert!(matches!(
        servers::remove(&c, &r, "calc").await.unwrap(),
        RemoveOutcome::Removed
    ));
    assert!(matches!(
        servers::remove(&c, &r, "ghost").await.unwrap(),
        RemoveOutcome::NotFound
    ));
}

#[tokio::test]
async fn test_verify_outcomes() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/servers"),
        200,
        json!({"servers": [{"id": "calc", "pid": 11}, {"id": "stuck", "pid": 12}]}),
    );
    let tools: Vec<_> = (0..7).map(|i| json!({"name": format!("t{}", i)})).collect();
    mock.respond(HttpMethod::Get, &url("/servers/calc/tools"), 200, json!({"tools": tools}));
    mock.fail(HttpMethod::Get, &url("/servers/stuck/tools"), TransportError::Timeout);

    let c = client(&mock);
    let r = ConsoleRenderer::plain();

    match servers::verify(&c, &r, "calc").await {
        VerifyOutcome::Responding { pid, tools } => {
            assert_eq!(pid, Some(11));
            assert_eq!(tools.len(), 7);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let stuck = servers::verify(&c, &r, "stuck").await;
    assert!(matches!(stuck, VerifyOutcome::NotResponding { pid: Some(12), .. }));
    assert!(!stuck.is_ok());

    assert!(matches!(
        servers::verify(&c, &r, "missing").await,
        VerifyOutcome::NotListed
    ));
}

#[test]
fn test_postman_target_from_args() {
    let cli = Cli::try_parse_from([
        "mcpbridge",
        "postman",
        "--server-url",
        "https://mcp.example.com/sse",
        "--server-type",
        "sse",
        "--auth-token",
        "tok",
    ])
    .unwrap();
    let Commands::Postman(args) = cli.command else {
        panic!("expected postman");
    };
    match target_from_args(&args).unwrap() {
        PostmanTarget::Remote(remote) => {
            assert_eq!(remote.server_url, "https://mcp.example.com/sse");
            assert_eq!(remote.server_type, "sse");
            assert_eq!(remote.auth_token.as_deref(), Some("tok"));
        }
        other => panic!("unexpected target: {other:?}"),
    }
}

#[test]
fn test_pick_demo_server() {
    let list = descriptors(&["files", "Math-Server", "math2"]);
    assert_eq!(pick_demo_server(&list, None).as_deref(), Some("Math-Server"));
    assert_eq!(pick_demo_server(&list, Some("files")).as_deref(), Some("files"));
    assert_eq!(
        pick_demo_server(&descriptors(&["files", "git"]), None).as_deref(),
        Some("files")
    );
    assert_eq!(pick_demo_server(&[], None), None);
}

#[test]
fn test_demo_operation_lists() {
    let basic = basic_operations();
    assert_eq!(basic.len(), 6);
    assert_eq!(basic[0].tool, "add");
    assert_eq!(basic[0].arguments, json!({"a": 15, "b": 27}));

    let advanced = advanced_operations();
    assert_eq!(advanced.len(), 14);
    assert!(advanced.iter().any(|op| op.tool == "complex_add"));
}

#[tokio::test]
async fn test_demo_operations_count_failures() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/servers/math/tools/add"),
        200,
        envelope(json!({"result": 42})),
    );
    mock.respond(
        HttpMethod::Post,
        &url("/servers/math/tools/multiply"),
        200,
        envelope(json!({"error": "bad input"})),
    );

    let ops: Vec<_> = basic_operations().into_iter().take(3).collect();
    let report = run_operations(&client(&mock), &ConsoleRenderer::plain(), "math", &ops).await;
    // add succeeds, multiply reports an error, power is unreachable
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);
}

#[tokio::test]
async fn test_resolve_interactively_auto_approves() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/confirmations/c-7"),
        200,
        envelope(json!({"result": "done"})),
    );
    let request: ConfirmationRequest = serde_json::from_value(json!({
        "requires_confirmation": true,
        "confirmation_id": "c-7",
        "tool_name": "delete_file"
    }))
    .unwrap();

    let result = resolve_interactively(&client(&mock), &ConsoleRenderer::plain(), &request, true)
        .await
        .unwrap();
    assert_eq!(result, envelope(json!({"result": "done"})));
    assert_eq!(mock.requests()[0].json_body().unwrap(), json!({"confirm": true}));
}

#[test]
fn test_failure_analysis_buckets() {
    assert_eq!(
        FailureAnalysis::classify(Duration::from_secs(120)),
        FailureAnalysis::QuickTimeout
    );
    assert_eq!(
        FailureAnalysis::classify(Duration::from_secs(150)),
        FailureAnalysis::PartialTimeout
    );
    assert_eq!(
        FailureAnalysis::classify(Duration::from_secs(1199)),
        FailureAnalysis::PartialTimeout
    );
    assert_eq!(
        FailureAnalysis::classify(Duration::from_secs(1200)),
        FailureAnalysis::Unexpected
    );
}

#[test]
fn test_accuracy_percent() {
    assert_eq!(accuracy_percent(Duration::from_secs(1200), 20.0), 100.0);
    assert_eq!(accuracy_percent(Duration::from_secs(30), 1.0), 50.0);
    assert_eq!(accuracy_percent(Duration::from_secs(30), 0.0), 0.0);
}

#[test]
fn test_timeout_test_argument_bounds() {
    assert_eq!(check_minutes(0.5).unwrap(), 0.5);
    assert!(check_minutes(f64::INFINITY).is_err());
    assert!(check_minutes(f64::NAN).is_err());
    assert!(check_minutes(-1.0).is_err());

    assert_eq!(client_timeout_from_secs(None).unwrap(), None);
    assert_eq!(
        client_timeout_from_secs(Some(1.5)).unwrap(),
        Some(Duration::from_millis(1500))
    );
    assert!(client_timeout_from_secs(Some(0.0)).is_err());
    assert!(client_timeout_from_secs(Some(1e30)).is_err());
}

#[tokio::test]
async fn test_timeout_test_rejects_bad_values_before_any_request() {
    let dir = create_temp_dir();
    let config = dir.path().join("absent.toml");
    let config = config.to_str().unwrap();

    for extra in [
        &["inf"][..],
        &["0"][..],
        &["1", "--client-timeout", "1e30"][..],
        &["1", "--client-timeout", "0"][..],
    ] {
        let mut argv = vec![
            "mcpbridge",
            "--config",
            config,
            "--url",
            "http://127.0.0.1:9",
            "timeout-test",
        ];
        argv.extend_from_slice(extra);
        let err = dispatch(Cli::try_parse_from(argv).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Arguments(_)), "{extra:?}: {err}");
        assert_eq!(err.exit_code(), 2);
    }
}

#[test]
fn test_parse_json_object() {
    assert_eq!(parse_json_object(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
    let not_object = parse_json_object("[1]").unwrap_err();
    assert!(matches!(not_object, HandlerError::Arguments(_)));
    assert_eq!(not_object.exit_code(), 2);
    assert!(parse_json_object("{oops").is_err());
}

#[test]
fn test_hints() {
    let unreachable = HandlerError::Bridge(BridgeError::Unreachable {
        url: "http://localhost:3000/health".into(),
        reason: "refused".into(),
    });
    assert_eq!(
        unreachable.hint().as_deref(),
        Some("Make sure the MCP Bridge is running (node mcp-bridge.js).")
    );

    let missing_key = HandlerError::Agent(AgentError::MissingApiKey);
    assert!(missing_key.hint().unwrap().contains("GEMINI_API_KEY"));

    let failed = HandlerError::Failed("quick test failed".into());
    assert!(failed.hint().is_none());
    assert_eq!(failed.exit_code(), 1);
}

#[test]
fn test_input_helpers() {
    assert!(is_yes("y\n"));
    assert!(is_yes(" YES "));
    assert!(!is_yes(""));
    assert!(!is_yes("nope"));
    assert!(is_exit_command("Quit"));
    assert!(is_exit_command(" exit "));
    assert!(!is_exit_command("exiting"));
}

#[test]
fn test_terminal_operator_rendering() {
    let operator = TerminalOperator::new(ConsoleRenderer {
        show_json: false,
        json_width: 100,
        color: false,
    });

    assert_eq!(
        operator.render_event(&AgentEvent::CatalogLoaded { servers: 0, tools: 0 }),
        vec!["⚠ No tools found from any server."]
    );
    assert_eq!(
        operator.render_event(&AgentEvent::ToolStarted {
            server_id: "math".into(),
            tool_name: "add".into(),
            parameters: json!({"a": 1}),
        }),
        vec!["", "Executing tool: math/add (parameters hidden)"]
    );
    assert_eq!(
        operator.render_event(&AgentEvent::ToolSucceeded {
            tool_name: "add".into(),
            result: json!({"result": 3}),
        }),
        vec!["✓ Tool execution successful", "Result:", "<JSON result hidden>"]
    );
    assert_eq!(
        operator.render_event(&AgentEvent::StepLimitReached { limit: 4 }),
        vec!["⚠ Stopped after 4 tool calls in one turn"]
    );
}
