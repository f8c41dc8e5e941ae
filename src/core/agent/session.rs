//! Agent conversation loop
//!
//! Each user message may trigger a chain of tool calls. After every call the
//! outcome is described to the model in plain text and its next reply is
//! parsed again, until the reply carries no actionable tool call or the
//! per-turn step limit is reached.

use std::time::Instant;

use serde_json::{json, Value};

use crate::core::agent::extract::{extract_reply, AgentReply, ToolCall};
use crate::core::agent::instruction::system_instruction;
use crate::core::agent::llm::{AgentError, ChatModel};
use crate::core::bridge::envelope::display_value;
use crate::core::bridge::{BridgeClient, BridgeError, ConfirmationRequest, ToolCatalog, ToolExecution};
use crate::core::debug_logger::EnhancedDebugLogger;

pub const REJECTED_MESSAGE: &str = "User rejected the operation";
pub const DEFAULT_MAX_TOOL_STEPS: usize = 10;

/// Progress notifications for the operator
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    CatalogLoaded { servers: usize, tools: usize },
    Reply(String),
    ToolStarted {
        server_id: String,
        tool_name: String,
        parameters: Value,
    },
    ConfirmationRequired(ConfirmationRequest),
    ToolSucceeded { tool_name: String, result: Value },
    ToolRejected { tool_name: String, message: String },
    ToolFailed { tool_name: String, error: String },
    StepLimitReached { limit: usize },
}

/// The human in the loop
pub trait Operator {
    /// Decide on a pending risky operation
    fn approve(&mut self, request: &ConfirmationRequest) -> std::io::Result<bool>;

    fn report(&mut self, event: AgentEvent);
}

/// What happened during one user turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnSummary {
    /// Every user-facing reply, in order
    pub replies: Vec<String>,
    pub tool_calls: usize,
    pub step_limit_reached: bool,
}

impl TurnSummary {
    pub fn final_response(&self) -> Option<&str> {
        self.replies.last().map(String::as_str)
    }
}

enum CallOutcome {
    Succeeded(Value),
    Rejected(Value),
    Failed(String),
}

pub struct AgentSession<M: ChatModel> {
    client: BridgeClient,
    model: M,
    catalog: ToolCatalog,
    max_tool_steps: usize,
    logger: EnhancedDebugLogger,
}

impl<M: ChatModel> AgentSession<M> {
    /// Load the tool catalog and prime the model with the system instruction
    pub async fn start(
        client: BridgeClient,
        mut model: M,
        max_tool_steps: usize,
        operator: &mut dyn Operator,
    ) -> Result<Self, AgentError> {
        let logger = EnhancedDebugLogger::new();
        let catalog = client.fetch_tool_catalog().await;
        let tools = catalog.iter().map(|s| s.tools.len()).sum();
        operator.report(AgentEvent::CatalogLoaded {
            servers: catalog.len(),
            tools,
        });
        logger.agent_event(
            "catalog_loaded",
            &format!("{} servers, {} tools", catalog.len(), tools),
        );

        model.send(&system_instruction(&catalog)).await?;

        Ok(Self {
            client,
            model,
            catalog,
            max_tool_steps: max_tool_steps.max(1),
            logger,
        })
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    pub async fn handle_user_message(
        &mut self,
        text: &str,
        operator: &mut dyn Operator,
    ) -> Result<TurnSummary, AgentError> {
        let started = Instant::now();
        let mut summary = TurnSummary::default();
        let mut reply = self.ask(text, operator, &mut summary).await?;

        while let Some(call) = reply.actionable_call().cloned() {
            if summary.tool_calls >= self.max_tool_steps {
                summary.step_limit_reached = true;
                operator.report(AgentEvent::StepLimitReached {
                    limit: self.max_tool_steps,
                });
                self.logger.agent_event(
                    "step_limit_reached",
                    &format!("Stopped after {} tool calls", summary.tool_calls),
                );
                break;
            }
            summary.tool_calls += 1;

            let feedback = self.run_tool(&call, summary.tool_calls, operator).await;
            reply = self.ask(&feedback, operator, &mut summary).await?;
        }

        self.logger.performance_sync(
            "AgentSession",
            "user_turn",
            started.elapsed().as_millis() as u64,
        );
        Ok(summary)
    }

    async fn ask(
        &mut self,
        text: &str,
        operator: &mut dyn Operator,
        summary: &mut TurnSummary,
    ) -> Result<AgentReply, AgentError> {
        let raw = self.model.send(text).await?;
        let reply = extract_reply(&raw);
        operator.report(AgentEvent::Reply(reply.response.clone()));
        summary.replies.push(reply.response.clone());
        Ok(reply)
    }

    /// Execute one call and return the feedback text for the model
    async fn run_tool(&self, call: &ToolCall, step: usize, operator: &mut dyn Operator) -> String {
        let Some((server_id, tool_name, parameters)) = call.parts() else {
            return "The tool execution failed with error: incomplete tool call".to_string();
        };

        operator.report(AgentEvent::ToolStarted {
            server_id: server_id.to_string(),
            tool_name: tool_name.to_string(),
            parameters: parameters.clone(),
        });
        self.logger.tool_call(server_id, tool_name, step);

        let outcome = match self.client.execute_tool(server_id, tool_name, parameters).await {
            Ok(ToolExecution::Completed(result)) => CallOutcome::Succeeded(result),
            Ok(ToolExecution::ConfirmationRequired(request)) => {
                self.confirm(request, operator).await
            }
            Err(e) => CallOutcome::Failed(describe_error("Error executing tool", &e)),
        };

        match outcome {
            CallOutcome::Failed(error) => {
                self.logger.agent_event("tool_failed", &error);
                operator.report(AgentEvent::ToolFailed {
                    tool_name: tool_name.to_string(),
                    error: error.clone(),
                });
                format!("The tool execution failed with error: {}", error)
            }
            CallOutcome::Rejected(result) => {
                let message = result
                    .get("message")
                    .map(display_value)
                    .unwrap_or_else(|| REJECTED_MESSAGE.to_string());
                operator.report(AgentEvent::ToolRejected {
                    tool_name: tool_name.to_string(),
                    message,
                });
                success_feedback(tool_name, &result)
            }
            CallOutcome::Succeeded(result) => {
                operator.report(AgentEvent::ToolSucceeded {
                    tool_name: tool_name.to_string(),
                    result: result.clone(),
                });
                success_feedback(tool_name, &result)
            }
        }
    }

    async fn confirm(&self, request: ConfirmationRequest, operator: &mut dyn Operator) -> CallOutcome {
        operator.report(AgentEvent::ConfirmationRequired(request.clone()));

        let approved = match operator.approve(&request) {
            Ok(approved) => approved,
            Err(e) => {
                self.logger
                    .error_sync("AgentSession", "confirmation_prompt_failed", &e.to_string());
                false
            }
        };

        if approved {
            return match self
                .client
                .resolve_confirmation(&request.confirmation_id, true)
                .await
            {
                Ok(result) => CallOutcome::Succeeded(result),
                Err(e) => CallOutcome::Failed(describe_error("Error confirming operation", &e)),
            };
        }

        // The rejection stands even if the bridge cannot be told
        if let Err(e) = self
            .client
            .resolve_confirmation(&request.confirmation_id, false)
            .await
        {
            self.logger
                .error_sync("AgentSession", "rejection_not_delivered", &e.to_string());
        }
        CallOutcome::Rejected(rejected_result())
    }
}

/// Synthetic result recorded when the operator declines
pub fn rejected_result() -> Value {
    json!({"status": "rejected", "message": REJECTED_MESSAGE})
}

fn describe_error(context: &str, error: &BridgeError) -> String {
    match error {
        BridgeError::Status { message, .. } => format!("Error: {}", message),
        other => format!("{}: {}", context, other),
    }
}

/// Feedback for a completed call; a `status: rejected` result reads as a cancellation
fn success_feedback(tool_name: &str, result: &Value) -> String {
    if result.get("status").and_then(Value::as_str) == Some("rejected") {
        let message = result
            .get("message")
            .map(display_value)
            .unwrap_or_else(|| "No reason provided".to_string());
        return format!("The operation was cancelled by the user: {}", message);
    }

    let rendered = if result.is_object() {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string())
    } else {
        display_value(result)
    };
    format!(
        "The tool {} was executed successfully. Result: {}",
        tool_name, rendered
    )
}
