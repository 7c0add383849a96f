//! Error types for the agent runtime.

use parlance_core::error::ParlanceError;

/// Errors from the conversational agent.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("transcript cannot be empty")]
    EmptyTranscript,
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("transcription error: {0}")]
    Transcription(String),
    #[error("synthesis error: {0}")]
    Synthesis(String),
    #[error("model error: {0}")]
    Model(String),
    #[error("store error: {0}")]
    Store(String),
}

impl From<ParlanceError> for AgentError {
    fn from(err: ParlanceError) -> Self {
        AgentError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_display() {
        assert_eq!(
            AgentError::EmptyTranscript.to_string(),
            "transcript cannot be empty"
        );
        assert_eq!(
            AgentError::UnknownTool("cancel_order".to_string()).to_string(),
            "unknown tool: cancel_order"
        );
        assert_eq!(
            AgentError::Model("no action".to_string()).to_string(),
            "model error: no action"
        );
    }

    #[test]
    fn test_agent_error_from_parlance_error() {
        let err = ParlanceError::NotFound("order 1".to_string());
        let agent_err: AgentError = err.into();
        assert!(matches!(agent_err, AgentError::Store(_)));
        assert!(agent_err.to_string().contains("order 1"));
    }
}
