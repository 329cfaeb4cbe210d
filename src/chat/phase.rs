//! Chat loop phase machine.

/// Lifecycle phase of the chat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    /// Session not yet created.
    #[default]
    Init,
    /// Reading and forwarding user turns.
    Running,
    /// Loop finished; only the final dump remains.
    Terminated,
}

impl ChatPhase {
    /// Check if transition to target phase is valid.
    ///
    /// Valid transitions:
    /// - Init -> Running
    /// - Init -> Terminated (startup failure)
    /// - Running -> Terminated
    pub fn can_transition_to(&self, target: ChatPhase) -> bool {
        use ChatPhase::*;
        matches!(
            (*self, target),
            (Init, Running) | (Init, Terminated) | (Running, Terminated)
        )
    }

    /// Attempt to transition to a new phase.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: ChatPhase) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::SupportDeskError::InvalidPhaseTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is the terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatPhase::Terminated)
    }

    /// Check if the loop accepts user turns.
    pub fn accepts_turns(&self) -> bool {
        matches!(self, ChatPhase::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        let mut phase = ChatPhase::Init;
        assert!(phase.transition_to(ChatPhase::Running).is_ok());
        assert_eq!(phase, ChatPhase::Running);

        assert!(phase.transition_to(ChatPhase::Terminated).is_ok());
        assert_eq!(phase, ChatPhase::Terminated);
    }

    #[test]
    fn test_init_straight_to_terminated() {
        let mut phase = ChatPhase::Init;
        assert!(phase.transition_to(ChatPhase::Terminated).is_ok());
    }

    #[test]
    fn test_invalid_from_terminated() {
        let mut phase = ChatPhase::Terminated;
        assert!(phase.transition_to(ChatPhase::Running).is_err());
        assert!(phase.transition_to(ChatPhase::Init).is_err());
        assert_eq!(phase, ChatPhase::Terminated);
    }

    #[test]
    fn test_no_restart() {
        let mut phase = ChatPhase::Running;
        assert!(phase.transition_to(ChatPhase::Init).is_err());
        assert!(phase.transition_to(ChatPhase::Running).is_err());
        assert_eq!(phase, ChatPhase::Running);
    }

    #[test]
    fn test_predicates() {
        assert!(!ChatPhase::Init.accepts_turns());
        assert!(ChatPhase::Running.accepts_turns());
        assert!(!ChatPhase::Terminated.accepts_turns());

        assert!(!ChatPhase::Init.is_terminal());
        assert!(ChatPhase::Terminated.is_terminal());
        assert_eq!(ChatPhase::default(), ChatPhase::Init);
    }
}
