//! Encoder node
//!
//! Sits behind the receive state machine: filters decoded frames by
//! address, dispatches the ones meant for this node and tracks the
//! address-change lifecycle.

pub mod dispatch;

pub use dispatch::{dispatch, DispatchError};

use anglebus_hal::{FlashError, FlashStorage};
use anglebus_protocol::{Command, Direction, Frame, Reply};

use crate::config::{load_address, store_address, NodeConfig};
use crate::state::{NodeEvent, NodeState};
use crate::traits::Transducer;

/// Why a decoded frame was not answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IgnoreReason {
    /// Frame addressed to another node
    AddressMismatch,
    /// Reply from another node
    NotFromMaster,
    /// Node is switching address and answers nothing until it restarts
    NotListening,
}

/// Result of handling one decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Nothing to send
    Ignored(IgnoreReason),
    /// Send this reply
    Reply(Frame),
    /// The request was for this node but cannot be answered
    Unanswered(DispatchError),
}

/// A bus node with its configured address
#[derive(Debug, Clone)]
pub struct Node {
    address: u8,
    state: NodeState,
}

impl Node {
    /// Create a node answering to `address`
    pub fn new(address: u8) -> Self {
        Self {
            address,
            state: NodeState::Listening,
        }
    }

    /// Create a node with the persisted address, or the configured fallback
    pub async fn boot<S: FlashStorage>(config: &NodeConfig, storage: &mut S) -> Self {
        Self::new(load_address(storage, config.fallback_address).await)
    }

    /// Address this node answers to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Current lifecycle state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Apply a lifecycle event
    pub fn handle_event(&mut self, event: NodeEvent) -> NodeState {
        self.state = self.state.transition(event);
        self.state
    }

    /// Address filter
    ///
    /// Frames from other nodes and frames for other addresses are dropped
    /// without affecting anything, so other listeners see the line as is.
    pub fn accepts(&self, frame: &Frame) -> Result<(), IgnoreReason> {
        if !self.state.is_listening() {
            return Err(IgnoreReason::NotListening);
        }
        if frame.direction != Direction::Master {
            return Err(IgnoreReason::NotFromMaster);
        }
        if frame.address != self.address {
            return Err(IgnoreReason::AddressMismatch);
        }
        Ok(())
    }

    /// Filter and dispatch one decoded frame
    ///
    /// An accepted address assignment moves the node to
    /// [`NodeState::Reconfiguring`]; the address is not applied here.
    pub fn handle_frame<T: Transducer>(&mut self, frame: &Frame, transducer: &mut T) -> Outcome {
        if let Err(reason) = self.accepts(frame) {
            return Outcome::Ignored(reason);
        }

        let command = Command::from_frame(frame);
        let reply = match dispatch(command, transducer) {
            Ok(reply) => reply,
            Err(e) => return Outcome::Unanswered(e),
        };

        if let Reply::Address(address) = reply {
            self.handle_event(NodeEvent::AssignReceived(address));
        }

        // Replies go out under the address the request was sent to
        match reply.to_frame(self.address) {
            Ok(frame) => Outcome::Reply(frame),
            Err(e) => Outcome::Unanswered(e.into()),
        }
    }

    /// Persist the pending address and move to [`NodeState::Restart`]
    ///
    /// On failure the node returns to listening under its old address.
    pub async fn commit_address<S: FlashStorage>(
        &mut self,
        storage: &mut S,
    ) -> Result<NodeState, FlashError> {
        let NodeState::Reconfiguring(address) = self.state else {
            return Ok(self.state);
        };

        match store_address(storage, address).await {
            Ok(()) => Ok(self.handle_event(NodeEvent::Persisted)),
            Err(e) => {
                self.handle_event(NodeEvent::PersistFailed);
                Err(e)
            }
        }
    }

    /// Handle one decoded frame end to end
    ///
    /// Like [`handle_frame`](Self::handle_frame), but a new address is
    /// persisted before its echo reply is released. If persisting fails the
    /// reply is withheld and the master has to retry.
    pub async fn respond<T: Transducer, S: FlashStorage>(
        &mut self,
        frame: &Frame,
        transducer: &mut T,
        storage: &mut S,
    ) -> Outcome {
        let outcome = self.handle_frame(frame, transducer);
        if let NodeState::Reconfiguring(_) = self.state {
            if let Err(e) = self.commit_address(storage).await {
                return Outcome::Unanswered(e.into());
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::dispatch::tests::FakeTransducer;
    use super::*;
    use crate::config::address::tests::MemFlash;
    use crate::traits::TransducerError;
    use anglebus_protocol::FrameParser;
    use embassy_futures::block_on;
    use proptest::prelude::*;

    fn read_request(address: u8) -> Frame {
        Command::ReadEncoder.to_frame(address).unwrap()
    }

    #[test]
    fn test_read_request_from_wire() {
        let mut parser = FrameParser::new();
        let frame = parser
            .feed_bytes(&[0x96, 0xA0, 0x81, 0x02, 0xDC, 0xA9])
            .unwrap()
            .unwrap();

        let mut node = Node::new(160);
        let mut sensor = FakeTransducer::returning([0x12, 0x34, 0x56]);
        let outcome = node.handle_frame(&frame, &mut sensor);

        assert_eq!(
            outcome,
            Outcome::Reply(Frame::slave(160, &[0x12, 0x34, 0x56]).unwrap())
        );
        assert_eq!(node.state(), NodeState::Listening);
    }

    #[test]
    fn test_other_address_ignored() {
        let mut node = Node::new(160);
        let mut sensor = FakeTransducer::returning([0; 3]);

        let outcome = node.handle_frame(&read_request(161), &mut sensor);
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::AddressMismatch));
        assert_eq!(sensor.reads, 0);
    }

    #[test]
    fn test_other_node_reply_ignored() {
        let mut node = Node::new(160);
        let mut sensor = FakeTransducer::returning([0; 3]);

        let reply = Reply::Reading([1, 2, 3]).to_frame(160).unwrap();
        let outcome = node.handle_frame(&reply, &mut sensor);
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NotFromMaster));
    }

    #[test]
    fn test_unsupported_command_reply() {
        let mut node = Node::new(160);
        let mut sensor = FakeTransducer::returning([0; 3]);

        let request = Frame::master(160, &[9]).unwrap();
        let Outcome::Reply(reply) = node.handle_frame(&request, &mut sensor) else {
            panic!("expected a reply");
        };

        assert_eq!(&reply.data[..], b"E");
        let encoded = reply.encode_to_vec().unwrap();
        assert_eq!(Frame::decode(&encoded), Ok(reply));
        assert_eq!(node.state(), NodeState::Listening);
    }

    #[test]
    fn test_transducer_timeout_unanswered() {
        let mut node = Node::new(160);
        let mut sensor = FakeTransducer::failing(TransducerError::Timeout);

        let outcome = node.handle_frame(&read_request(160), &mut sensor);
        assert_eq!(
            outcome,
            Outcome::Unanswered(DispatchError::Transducer(TransducerError::Timeout))
        );
    }

    #[test]
    fn test_assign_address_persists_and_restarts() {
        let config = NodeConfig::default();
        let mut flash = MemFlash::default();
        let mut node = block_on(Node::boot(&config, &mut flash));
        assert_eq!(node.address(), config.fallback_address);

        let request = Command::AssignAddress(150)
            .to_frame(node.address())
            .unwrap();
        let mut sensor = FakeTransducer::returning([0; 3]);
        let outcome = block_on(node.respond(&request, &mut sensor, &mut flash));

        let Outcome::Reply(reply) = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(&reply.data[..], &[150]);
        assert_eq!(node.state(), NodeState::Restart(150));
        // Not hot-applied
        assert_eq!(node.address(), config.fallback_address);

        // After the restart the node comes up under the new address
        let node = block_on(Node::boot(&config, &mut flash));
        assert_eq!(node.address(), 150);
    }

    #[test]
    fn test_persist_failure_withholds_reply() {
        let mut flash = MemFlash {
            fail_writes: true,
            ..MemFlash::default()
        };
        let mut node = Node::new(160);
        let mut sensor = FakeTransducer::returning([0; 3]);

        let request = Command::AssignAddress(150).to_frame(160).unwrap();
        let outcome = block_on(node.respond(&request, &mut sensor, &mut flash));

        assert_eq!(
            outcome,
            Outcome::Unanswered(DispatchError::Persist(FlashError::Storage))
        );
        assert_eq!(node.state(), NodeState::Listening);
        assert_eq!(node.address(), 160);
    }

    #[test]
    fn test_nothing_answered_while_reconfiguring() {
        let mut node = Node::new(160);
        let mut sensor = FakeTransducer::returning([0; 3]);

        let request = Command::AssignAddress(150).to_frame(160).unwrap();
        assert!(matches!(
            node.handle_frame(&request, &mut sensor),
            Outcome::Reply(_)
        ));
        assert_eq!(node.state(), NodeState::Reconfiguring(150));

        let outcome = node.handle_frame(&read_request(160), &mut sensor);
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NotListening));
        assert_eq!(sensor.reads, 0);
    }

    #[test]
    fn test_corrupted_request_never_dispatched() {
        let mut parser = FrameParser::new();
        let mut node = Node::new(160);
        let mut sensor = FakeTransducer::returning([0; 3]);

        for bit in 0..8 {
            let mut encoded = read_request(160).encode_to_vec().unwrap();
            let idx = encoded.len() - 2;
            encoded[idx] ^= 1 << bit;

            for &byte in encoded.iter() {
                if let Ok(Some(frame)) = parser.feed(byte) {
                    node.handle_frame(&frame, &mut sensor);
                }
            }
        }
        assert_eq!(sensor.reads, 0);
        assert_eq!(node.state(), NodeState::Listening);
    }

    proptest! {
        #[test]
        fn prop_other_address_never_reaches_transducer(
            address in any::<u8>().prop_filter("other node", |&a| a != 160),
            data in proptest::collection::vec(any::<u8>(), 0..=3),
        ) {
            let mut node = Node::new(160);
            let mut sensor = FakeTransducer::returning([0; 3]);

            let request = Frame::master(address, &data).unwrap();
            let outcome = node.handle_frame(&request, &mut sensor);

            prop_assert_eq!(outcome, Outcome::Ignored(IgnoreReason::AddressMismatch));
            prop_assert_eq!(sensor.reads, 0);
            prop_assert_eq!(node.state(), NodeState::Listening);
        }
    }
}
