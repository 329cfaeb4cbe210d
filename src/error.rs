//! Error types for support-desk.

use thiserror::Error;

use crate::chat::ChatPhase;

/// Main error type for support-desk operations.
#[derive(Error, Debug)]
pub enum SupportDeskError {
    /// No session matches the given (app, user, id) triple.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A session identifier could not be parsed.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// A state entry has an unexpected shape.
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// Invalid chat loop phase transition attempted.
    #[error("invalid phase transition from {from:?} to {to:?}")]
    InvalidPhaseTransition { from: ChatPhase, to: ChatPhase },

    /// The agent runner failed to produce a reply.
    #[error("agent invocation failed: {0}")]
    AgentInvocation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Convenience Result type for support-desk operations.
pub type Result<T> = std::result::Result<T, SupportDeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_not_found_display() {
        let err = SupportDeskError::SessionNotFound("Customer Support/aiwithsid/sess-1".into());
        assert!(err.to_string().contains("sess-1"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_agent_invocation_display() {
        let err = SupportDeskError::AgentInvocation("HTTP 429: quota exceeded".into());
        assert!(err.to_string().contains("agent invocation failed"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: SupportDeskError = io_err.into();
        assert!(matches!(err, SupportDeskError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_phase_transition_display() {
        let err = SupportDeskError::InvalidPhaseTransition {
            from: ChatPhase::Terminated,
            to: ChatPhase::Running,
        };
        assert!(err.to_string().contains("Terminated"));
        assert!(err.to_string().contains("Running"));
    }
}
