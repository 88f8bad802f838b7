use kowalski_domain::tool::value_objects::ToolError;
use thiserror::Error;

/// Errors produced by the script sandbox
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Filename must end with {0}")]
    WrongExtension(String),

    #[error("Invalid filename '{0}': must be a plain name inside the workspace")]
    InvalidFilename(String),

    #[error("{0} does not exist")]
    NotFound(String),

    #[error("Script execution timed out")]
    Timeout,

    #[error("Failed to start interpreter '{interpreter}': {source}")]
    Spawn {
        interpreter: String,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SandboxError {
    pub fn to_tool_error(&self) -> ToolError {
        let message = self.to_string();
        match self {
            SandboxError::WrongExtension(_) | SandboxError::InvalidFilename(_) => {
                ToolError::invalid_argument(message)
            }
            SandboxError::NotFound(_) => ToolError::not_found(message),
            SandboxError::Timeout => ToolError::timeout(message),
            SandboxError::Spawn { .. } | SandboxError::Io(_) => {
                ToolError::execution_failed(message)
            }
        }
    }
}
