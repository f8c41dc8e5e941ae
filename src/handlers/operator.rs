// Terminal operator for the agent loop
use crate::core::agent::{AgentEvent, Operator};
use crate::core::bridge::ConfirmationRequest;
use crate::core::render::ConsoleRenderer;
use crate::handlers::input::prompt_confirmation;

pub struct TerminalOperator {
    renderer: ConsoleRenderer,
}

impl TerminalOperator {
    pub fn new(renderer: ConsoleRenderer) -> Self {
        Self { renderer }
    }

    /// Lines printed for an event
    pub fn render_event(&self, event: &AgentEvent) -> Vec<String> {
        let r = &self.renderer;
        match event {
            AgentEvent::CatalogLoaded { servers: 0, .. } => {
                vec![r.warn("No tools found from any server.")]
            }
            AgentEvent::CatalogLoaded { servers, tools } => vec![r.success(&format!(
                "Found {} tools from {} servers",
                tools, servers
            ))],
            AgentEvent::Reply(text) => vec![String::new(), r.bold("AI:"), text.clone()],
            AgentEvent::ToolStarted {
                server_id,
                tool_name,
                parameters,
            } => {
                if r.show_json {
                    vec![
                        String::new(),
                        format!("{} {}/{}", r.bold("Executing tool:"), server_id, tool_name),
                        r.bold("Parameters:"),
                        r.format_json(parameters),
                    ]
                } else {
                    vec![
                        String::new(),
                        format!(
                            "{} {}/{} (parameters hidden)",
                            r.bold("Executing tool:"),
                            server_id,
                            tool_name
                        ),
                    ]
                }
            }
            AgentEvent::ConfirmationRequired(request) => vec![
                r.warn("Operation requires security confirmation"),
                r.confirmation_panel(request),
            ],
            AgentEvent::ToolSucceeded { result, .. } => vec![
                r.success("Tool execution successful"),
                r.bold("Result:"),
                r.format_json(result),
            ],
            AgentEvent::ToolRejected { message, .. } => {
                vec![r.warn(&format!("Operation cancelled: {}", message))]
            }
            AgentEvent::ToolFailed { error, .. } => {
                vec![r.error(&format!("Tool execution failed: {}", error))]
            }
            AgentEvent::StepLimitReached { limit } => vec![r.warn(&format!(
                "Stopped after {} tool calls in one turn",
                limit
            ))],
        }
    }
}

impl Operator for TerminalOperator {
    fn approve(&mut self, _request: &ConfirmationRequest) -> std::io::Result<bool> {
        prompt_confirmation("Do you want to proceed with this operation?")
    }

    fn report(&mut self, event: AgentEvent) {
        for line in self.render_event(&event) {
            println!("{}", line);
        }
    }
}
