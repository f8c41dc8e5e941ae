use std::time::Duration;

use mcpbridge::core::bridge::{
    BridgeError, HttpMethod, NewServer, PostmanTarget, RequestTimeouts, RiskLevel, ToolExecution,
    TransportError,
};
use serde_json::{json, Value};

use crate::common::{client, url, MockTransport};

#[tokio::test]
async fn test_health_decodes_status() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/health"),
        200,
        json!({"status": "ok", "uptime": 12.5, "serverCount": 2}),
    );

    let health = client(&mock).health().await.unwrap();
    assert!(health.is_ok());
    assert_eq!(health.server_count, 2);
    assert_eq!(health.uptime, 12.5);
    assert!(health.servers.is_empty());
}

#[tokio::test]
async fn test_health_without_status_field() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/health"),
        200,
        json!({"uptime": 3.0, "serverCount": 1}),
    );

    let health = client(&mock).health().await.unwrap();
    assert!(health.is_ok());
    assert_eq!(health.status_text(), "unknown");
    assert_eq!(health.server_count, 1);
}

#[tokio::test]
async fn test_list_servers_keeps_raw_risk_level() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/servers"),
        200,
        json!({"servers": [
            {"id": "math-server", "pid": 4242, "connected": true, "risk_level": 1},
            {"id": "odd", "connected": false, "risk_level": 7}
        ]}),
    );

    let servers = client(&mock).list_servers().await.unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0].pid, Some(4242));
    assert_eq!(servers[0].risk(), Some(RiskLevel::Low));
    assert_eq!(servers[1].risk_level, Some(7));
    assert_eq!(servers[1].risk(), None);
}

#[tokio::test]
async fn test_out_of_range_risk_level_does_not_drop_listing() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/servers"),
        200,
        json!({"servers": [
            {"id": "a", "risk_level": 2},
            {"id": "b", "risk_level": 300},
            {"id": "c", "risk_level": -1}
        ]}),
    );

    let servers = client(&mock).list_servers().await.unwrap();
    assert_eq!(servers.len(), 3);
    assert_eq!(servers[0].risk(), Some(RiskLevel::Medium));
    assert_eq!(servers[1].risk_level, Some(300));
    assert_eq!(servers[2].risk_level, Some(-1));
    assert_eq!(servers[2].risk(), None);
}

#[tokio::test]
async fn test_register_server_posts_camel_case_risk_level() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/servers"),
        201,
        json!({"id": "files", "status": "connected", "pid": 99, "risk_level": 2}),
    );

    let mut server = NewServer::new("files", "npx", vec!["-y".into(), "server-fs".into()]);
    server.risk_level = 2;
    let registered = client(&mock).register_server(&server).await.unwrap();
    assert_eq!(registered.id, "files");
    assert_eq!(registered.pid, Some(99));

    let sent = mock.requests_to(HttpMethod::Post, &url("/servers"));
    let body = sent[0].json_body().unwrap();
    assert_eq!(body["riskLevel"], 2);
    assert_eq!(body["args"], json!(["-y", "server-fs"]));
    assert!(body.get("env").is_none());
    assert!(body.get("docker").is_none());
}

#[tokio::test]
async fn test_register_conflict_is_status_error() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/servers"),
        409,
        json!({"error": "Server with ID files already exists"}),
    );

    let err = client(&mock)
        .register_server(&NewServer::new("files", "npx", vec![]))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(
        err.to_string(),
        "HTTP 409: Server with ID files already exists"
    );
}

#[tokio::test]
async fn test_remove_server_encodes_id_and_accepts_empty_body() {
    let mock = MockTransport::new();
    mock.respond_raw(HttpMethod::Delete, &url("/servers/my%20server"), 200, "");

    let value = client(&mock).remove_server("my server").await.unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn test_remove_missing_server_is_404() {
    let mock = MockTransport::new();
    mock.respond_raw(HttpMethod::Delete, &url("/servers/ghost"), 404, "");

    let err = client(&mock).remove_server("ghost").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, BridgeError::Status { ref message, .. } if message == "Not Found"));
}

#[tokio::test]
async fn test_execute_tool_completed_uses_tool_timeout() {
    let mock = MockTransport::new();
    let raw = json!({"content": [{"type": "text", "text": "{\"result\": 42}"}]});
    mock.respond(
        HttpMethod::Post,
        &url("/servers/math-server/tools/add"),
        200,
        raw.clone(),
    );

    let execution = client(&mock)
        .execute_tool("math-server", "add", &json!({"a": 15, "b": 27}))
        .await
        .unwrap();
    assert_eq!(execution, ToolExecution::Completed(raw));

    let sent = &mock.requests()[0];
    assert_eq!(sent.timeout, Some(Duration::from_secs(6000)));
    assert_eq!(sent.json_body().unwrap(), json!({"a": 15, "b": 27}));
}

#[tokio::test]
async fn test_execute_tool_confirmation_required() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/servers/files/tools/write_file"),
        200,
        json!({
            "requires_confirmation": true,
            "confirmation_id": "c-123",
            "method": "tools/call",
            "server_id": "files",
            "tool_name": "write_file",
            "risk_level": 2,
            "risk_description": "Medium risk - requires confirmation",
            "expires_at": "2026-10-19T10:00:00Z"
        }),
    );

    let execution = client(&mock)
        .execute_tool("files", "write_file", &json!({"path": "/tmp/x"}))
        .await
        .unwrap();
    match execution {
        ToolExecution::ConfirmationRequired(request) => {
            assert_eq!(request.confirmation_id, "c-123");
            assert_eq!(request.tool_name, "write_file");
            assert_eq!(request.risk_level, Some(2));
        }
        other => panic!("expected confirmation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_requires_confirmation_false_is_a_result() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/servers/files/tools/read_file"),
        200,
        json!({"requires_confirmation": false, "content": []}),
    );

    let execution = client(&mock)
        .execute_tool("files", "read_file", &json!({}))
        .await
        .unwrap();
    assert!(matches!(execution, ToolExecution::Completed(_)));
}

#[tokio::test]
async fn test_routed_tool_routes() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/tools?server=math-server"),
        200,
        json!({"tools": [{"name": "add", "description": "Add two numbers"}]}),
    );
    mock.respond(
        HttpMethod::Post,
        &url("/tools/add?server=math-server"),
        200,
        json!({"content": [{"type": "text", "text": "{\"result\": 3}"}]}),
    );

    let c = client(&mock);
    let tools = c.list_routed_tools(Some("math-server")).await.unwrap();
    assert_eq!(tools[0].name, "add");

    let execution = c
        .execute_routed_tool("add", &json!({"a": 1, "b": 2}), Some("math-server"))
        .await
        .unwrap();
    assert!(matches!(execution, ToolExecution::Completed(_)));
}

#[tokio::test]
async fn test_read_resource_encodes_uri() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/servers/fs/resources/file%3A%2F%2F%2Ftmp%2Fnotes.txt"),
        200,
        json!({"contents": [{"text": "hello"}]}),
    );

    let value = client(&mock)
        .read_resource("fs", "file:///tmp/notes.txt")
        .await
        .unwrap();
    assert_eq!(value["contents"][0]["text"], "hello");
}

#[tokio::test]
async fn test_resources_and_prompts_listing() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/servers/fs/resources"),
        200,
        json!({"resources": [{"uri": "file:///a", "name": "a", "mimeType": "text/plain"}]}),
    );
    mock.respond(
        HttpMethod::Get,
        &url("/servers/fs/prompts"),
        200,
        json!({"prompts": [{"name": "summarize", "arguments": [{"name": "path"}]}]}),
    );
    mock.respond(
        HttpMethod::Post,
        &url("/servers/fs/prompts/summarize"),
        200,
        json!({"messages": []}),
    );

    let c = client(&mock);
    let resources = c.list_resources("fs").await.unwrap();
    assert_eq!(resources[0].mime_type.as_deref(), Some("text/plain"));
    let prompts = c.list_prompts("fs").await.unwrap();
    assert_eq!(prompts[0].arguments.len(), 1);
    let result = c
        .execute_prompt("fs", "summarize", &json!({"path": "/a"}))
        .await
        .unwrap();
    assert_eq!(result, json!({"messages": []}));
}

#[tokio::test]
async fn test_resolve_confirmation_body() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/confirmations/c-1"),
        200,
        json!({"status": "rejected", "message": "Operation rejected"}),
    );

    let result = client(&mock).resolve_confirmation("c-1", false).await.unwrap();
    assert_eq!(result["status"], "rejected");
    assert_eq!(mock.requests()[0].json_body().unwrap(), json!({"confirm": false}));
}

#[tokio::test]
async fn test_transport_errors_are_classified() {
    let mock = MockTransport::new();
    mock.fail(
        HttpMethod::Get,
        &url("/health"),
        TransportError::Connect("connection refused".into()),
    );
    mock.fail(HttpMethod::Get, &url("/servers"), TransportError::Timeout);

    let c = client(&mock);
    let unreachable = c.health().await.unwrap_err();
    assert!(unreachable.is_unreachable());
    assert!(unreachable.to_string().contains("http://bridge.test:3000/health"));

    let timeout = c.list_servers().await.unwrap_err();
    assert!(timeout.is_timeout());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock = MockTransport::new();
    mock.respond_raw(HttpMethod::Get, &url("/health"), 200, "<html>oops</html>");

    let err = client(&mock).health().await.unwrap_err();
    assert!(matches!(err, BridgeError::Decode(_)));
}

#[tokio::test]
async fn test_fetch_tool_catalog_tolerates_failing_server() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Get,
        &url("/servers"),
        200,
        json!({"servers": [{"id": "math"}, {"id": "broken"}]}),
    );
    mock.respond(
        HttpMethod::Get,
        &url("/servers/math/tools"),
        200,
        json!({"tools": [{"name": "add"}, {"name": "multiply"}]}),
    );
    mock.respond(
        HttpMethod::Get,
        &url("/servers/broken/tools"),
        500,
        json!({"error": "Server not initialized"}),
    );

    let catalog = client(&mock).fetch_tool_catalog().await;
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].server_id, "math");
    assert_eq!(catalog[0].tools.len(), 2);
    assert_eq!(catalog[1].server_id, "broken");
    assert!(catalog[1].tools.is_empty());
}

#[tokio::test]
async fn test_fetch_tool_catalog_empty_when_bridge_down() {
    let mock = MockTransport::new();
    let catalog = client(&mock).fetch_tool_catalog().await;
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn test_timeout_probe_has_no_timeout_by_default() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/test/timeout/20"),
        200,
        json!({"message": "Completed after 20 minutes"}),
    );
    mock.respond(
        HttpMethod::Post,
        &url("/test/timeout/1"),
        200,
        json!({"message": "Completed after 1 minutes"}),
    );

    let c = client(&mock);
    c.timeout_probe(20.0, None).await.unwrap();
    c.timeout_probe(1.0, Some(Duration::from_secs(90))).await.unwrap();

    let sent = mock.requests();
    assert_eq!(sent[0].timeout, None);
    assert_eq!(sent[1].timeout, Some(Duration::from_secs(90)));
}

#[tokio::test]
async fn test_generate_postman_uses_discovery_timeout() {
    let mock = MockTransport::new();
    mock.respond(
        HttpMethod::Post,
        &url("/generate-postman"),
        200,
        json!({
            "collection": {"info": {"name": "MCP Server"}, "item": []},
            "metadata": {"toolsCount": 3, "resourcesCount": 1, "promptsCount": 0}
        }),
    );

    let c = client(&mock).with_timeouts(RequestTimeouts {
        discovery: Some(Duration::from_secs(45)),
        ..RequestTimeouts::default()
    });
    let generated = c
        .generate_postman(&PostmanTarget::remote("http://localhost:8080/mcp", None))
        .await
        .unwrap();
    assert_eq!(generated.metadata.tools_count, 3);
    assert_eq!(generated.collection["info"]["name"], "MCP Server");

    let sent = &mock.requests()[0];
    assert_eq!(sent.timeout, Some(Duration::from_secs(45)));
    assert_eq!(
        sent.json_body().unwrap(),
        json!({"serverUrl": "http://localhost:8080/mcp", "serverType": "http"})
    );
}

#[test]
fn test_client_rejects_invalid_base_url() {
    let mock = MockTransport::new();
    let result = mcpbridge::core::bridge::BridgeClient::with_transport("not a url", mock.boxed());
    assert!(matches!(result, Err(BridgeError::Url(_))));
}

#[test]
fn test_client_normalizes_base_url() {
    let mock = MockTransport::new();
    let c = mcpbridge::core::bridge::BridgeClient::with_transport(
        "http://localhost:3000///",
        mock.boxed(),
    )
    .unwrap();
    assert_eq!(c.base_url(), "http://localhost:3000");
    assert_eq!(c.timeouts(), &RequestTimeouts::default());
}
