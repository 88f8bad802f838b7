//! Tool domain traits
//!
//! Pure validation of calls against advertised schemas, no I/O.

use super::entities::{ToolCall, ToolDefinition};

/// Validator for tool calls
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String>;
}

/// Checks required parameters, and unknown parameters when the schema
/// declares its properties.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String> {
        for name in definition.required_parameters() {
            if call.get_value(name).is_none() {
                return Err(format!(
                    "Missing required parameter '{}' for tool '{}'",
                    name, definition.name
                ));
            }
        }

        let declared = definition.declared_parameters();
        if declared.is_empty() {
            return Ok(());
        }

        for arg_name in call.arguments.keys() {
            if !declared.contains(&arg_name.as_str()) {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                ));
            }
        }

        Ok(())
    }
}
