// System instruction sent as the first chat message
use crate::core::bridge::ServerTools;

/// Markdown listing of every server's tools with their parameters
pub fn describe_tools(catalog: &[ServerTools]) -> String {
    let mut out = String::from("Available tools by server:\n\n");

    for server in catalog {
        out.push_str(&format!("## Server: {}\n\n", server.server_id));

        for tool in &server.tools {
            out.push_str(&format!("### {}\n", tool.name));
            out.push_str(&format!(
                "Description: {}\n",
                tool.description.as_deref().unwrap_or("No description")
            ));

            if let Some(schema) = &tool.input_schema {
                out.push_str("Parameters:\n");
                for param in schema.parameters() {
                    out.push_str(&format!(
                        "- {} ({}): {}\n",
                        param.name, param.kind, param.description
                    ));
                }
                if let Some(required) = &schema.required {
                    out.push_str(&format!("Required parameters: {}\n", required.join(", ")));
                }
            }

            out.push('\n');
        }
    }

    out
}

const REPLY_CONTRACT: &str = r#"You are an AI assistant that uses available MCP tools to help users accomplish tasks.
When responding, you must ALWAYS return answers in the following JSON format:
{
  "tool_call": {
    "server_id": "string or null",
    "tool_name": "string or null",
    "parameters": {} or null
  },
  "response": "string"
}

If you need to use a tool, fill in the server_id, tool_name, and parameters fields.
If you don't need to use a tool, set server_id, tool_name, and parameters to null.

Your response field should always contain your message to the user.

Here's information about all the tools you can use:"#;

const USAGE_RULES: &str = r#"When a user asks for something that requires using these tools:
1. Figure out which tool is most appropriate
2. Format a proper JSON response with the tool_call filled in
3. Make your response helpful and conversational

When you receive feedback about a tool execution:
1. If you need to make another tool call based on the previous result, include it in your tool_call
2. If no more calls are needed, set server_id, tool_name, and parameters to null
3. Provide a helpful message about the final result in the response field

For file operations:
1. Always check allowed directories first using list_allowed_directories
2. Create files and directories only within allowed directories
3. Provide clear feedback about what you're doing at each step

IMPORTANT: Some tool operations may require user confirmation for security reasons.
If a tool execution returns a result containing "requires_confirmation": true, you should:
1. Inform the user that confirmation is required
2. Explain the risk level and what operation needs confirmation
3. Ask them to explicitly confirm if they want to proceed"#;

/// Full instruction: reply contract, tool listing, usage rules
pub fn system_instruction(catalog: &[ServerTools]) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        REPLY_CONTRACT,
        describe_tools(catalog),
        USAGE_RULES
    )
    .trim()
    .to_string()
}
