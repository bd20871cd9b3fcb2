//! Provisioning workflow states

use std::fmt;

/// Where a provisioning run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    Idle,
    SubscriptionRequested,
    SubscriptionActivating,
    DatabasesPending,
    Completed,
    Failed,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SubscriptionRequested => "subscription-requested",
            Self::SubscriptionActivating => "subscription-activating",
            Self::DatabasesPending => "databases-pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Can this state transition to the given state?
    pub fn can_transition_to(&self, target: WorkflowState) -> bool {
        use WorkflowState::*;
        match (self, target) {
            (Idle, SubscriptionRequested) => true,
            (SubscriptionRequested, SubscriptionActivating) => true,
            (SubscriptionActivating, DatabasesPending) => true,
            // one self-loop step per database
            (DatabasesPending, DatabasesPending | Completed) => true,
            (Completed | Failed, _) => false,
            (_, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use WorkflowState::*;

        let path = [
            Idle,
            SubscriptionRequested,
            SubscriptionActivating,
            DatabasesPending,
            DatabasesPending,
            Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_reachable_from_non_terminal_only() {
        use WorkflowState::*;

        for state in [Idle, SubscriptionRequested, SubscriptionActivating, DatabasesPending] {
            assert!(state.can_transition_to(Failed), "{} -> failed", state);
        }
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn test_no_skipping_steps() {
        use WorkflowState::*;

        assert!(!Idle.can_transition_to(DatabasesPending));
        assert!(!SubscriptionRequested.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Idle));
        assert!(Completed.is_terminal());
        assert!(!DatabasesPending.is_terminal());
    }
}
