//! State machine definition
//!
//! Address changes are never applied in place: the node keeps answering
//! under its current address until it restarts, so it cannot be mid-reply
//! under a stale address.

use super::events::NodeEvent;

/// Node states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeState {
    /// Receiving and answering requests
    Listening,
    /// New address accepted, waiting for it to be persisted
    Reconfiguring(u8),
    /// Terminal: the node must restart to re-arm under the new address
    Restart(u8),
}

impl NodeState {
    /// Check if requests are being answered
    pub fn is_listening(&self) -> bool {
        matches!(self, NodeState::Listening)
    }

    /// Check if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Restart(_))
    }

    /// Address waiting to be persisted or applied, if any
    pub fn pending_address(&self) -> Option<u8> {
        match self {
            NodeState::Listening => None,
            NodeState::Reconfiguring(address) | NodeState::Restart(address) => Some(*address),
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: NodeEvent) -> Self {
        use NodeEvent::*;
        use NodeState::*;

        match (self, event) {
            (Listening, AssignReceived(address)) => Reconfiguring(address),

            (Reconfiguring(address), Persisted) => Restart(address),
            (Reconfiguring(_), PersistFailed) => Listening,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reassign_flow() {
        let state = NodeState::Listening;

        let reconfiguring = state.transition(NodeEvent::AssignReceived(150));
        assert_eq!(reconfiguring, NodeState::Reconfiguring(150));
        assert_eq!(reconfiguring.pending_address(), Some(150));
        assert!(!reconfiguring.is_listening());

        let restart = reconfiguring.transition(NodeEvent::Persisted);
        assert_eq!(restart, NodeState::Restart(150));
        assert!(restart.is_terminal());
    }

    #[test]
    fn test_persist_failure_keeps_old_address() {
        let state = NodeState::Reconfiguring(150).transition(NodeEvent::PersistFailed);
        assert_eq!(state, NodeState::Listening);
        assert_eq!(state.pending_address(), None);
    }

    #[test]
    fn test_restart_is_terminal() {
        let events = [
            NodeEvent::AssignReceived(3),
            NodeEvent::Persisted,
            NodeEvent::PersistFailed,
        ];
        for event in events {
            assert_eq!(
                NodeState::Restart(150).transition(event),
                NodeState::Restart(150)
            );
        }
    }

    #[test]
    fn test_second_assign_ignored_while_reconfiguring() {
        let state = NodeState::Reconfiguring(150).transition(NodeEvent::AssignReceived(3));
        assert_eq!(state, NodeState::Reconfiguring(150));
    }

    #[test]
    fn test_listening_ignores_persist_events() {
        assert_eq!(
            NodeState::Listening.transition(NodeEvent::Persisted),
            NodeState::Listening
        );
    }
}
