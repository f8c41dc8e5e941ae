//! Gemini-driven tool agent
//!
//! The model is told (via a system instruction) to answer with a JSON object
//! `{"tool_call": {...}, "response": "..."}`. Replies are parsed with a
//! best-effort extractor, tool calls are executed against the bridge, and the
//! outcome is fed back to the model until it stops asking for tools.

pub mod extract;
pub mod instruction;
pub mod llm;
pub mod session;

pub use extract::{extract_reply, AgentReply, ToolCall};
pub use instruction::{describe_tools, system_instruction};
pub use llm::{AgentError, ChatModel, GeminiChat, DEFAULT_GEMINI_MODEL, GEMINI_API_KEY_ENV};
pub use session::{AgentEvent, AgentSession, Operator, TurnSummary, REJECTED_MESSAGE};
