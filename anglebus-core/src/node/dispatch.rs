//! Command dispatcher
//!
//! Maps a decoded command to its action and reply. Unsupported commands
//! get the `'E'` reply; that is an ordinary answer, not a fault.

use anglebus_hal::FlashError;
use anglebus_protocol::{Command, FrameError, Reply};

use crate::config::UNCONFIGURED_ADDRESS;
use crate::traits::{Transducer, TransducerError};

/// Errors that leave a request unanswered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The sensor read did not complete
    Transducer(TransducerError),
    /// The new address could not be persisted
    Persist(FlashError),
    /// The reply could not be framed
    Encode(FrameError),
}

impl From<TransducerError> for DispatchError {
    fn from(e: TransducerError) -> Self {
        DispatchError::Transducer(e)
    }
}

impl From<FlashError> for DispatchError {
    fn from(e: FlashError) -> Self {
        DispatchError::Persist(e)
    }
}

impl From<FrameError> for DispatchError {
    fn from(e: FrameError) -> Self {
        DispatchError::Encode(e)
    }
}

/// Execute a command and produce its reply
///
/// Address assignment only produces the echo reply here; applying the
/// address is the caller's job (see [`crate::state::NodeState`]).
/// Assigning the "not configured" sentinel is refused as unsupported,
/// since it would read back as no address at all.
pub fn dispatch<T: Transducer>(command: Command, transducer: &mut T) -> Result<Reply, DispatchError> {
    match command {
        Command::AssignAddress(UNCONFIGURED_ADDRESS) => Ok(Reply::Unsupported),
        Command::AssignAddress(address) => Ok(Reply::Address(address)),
        Command::ReadEncoder => Ok(Reply::Reading(transducer.read_raw()?)),
        Command::Unsupported(_) => Ok(Reply::Unsupported),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anglebus_protocol::RawReading;

    /// Scripted transducer that counts reads
    pub(crate) struct FakeTransducer {
        pub result: Result<RawReading, TransducerError>,
        pub reads: usize,
    }

    impl FakeTransducer {
        pub fn returning(raw: RawReading) -> Self {
            Self {
                result: Ok(raw),
                reads: 0,
            }
        }

        pub fn failing(error: TransducerError) -> Self {
            Self {
                result: Err(error),
                reads: 0,
            }
        }
    }

    impl Transducer for FakeTransducer {
        fn read_raw(&mut self) -> Result<RawReading, TransducerError> {
            self.reads += 1;
            self.result
        }
    }

    #[test]
    fn test_read_encoder_returns_bytes_verbatim() {
        let mut sensor = FakeTransducer::returning([0x96, 0xA9, 0x00]);
        let reply = dispatch(Command::ReadEncoder, &mut sensor);
        assert_eq!(reply, Ok(Reply::Reading([0x96, 0xA9, 0x00])));
        assert_eq!(sensor.reads, 1);
    }

    #[test]
    fn test_assign_echoes_address() {
        let mut sensor = FakeTransducer::returning([0; 3]);
        assert_eq!(
            dispatch(Command::AssignAddress(150), &mut sensor),
            Ok(Reply::Address(150))
        );
        assert_eq!(sensor.reads, 0);
    }

    #[test]
    fn test_assign_sentinel_refused() {
        let mut sensor = FakeTransducer::returning([0; 3]);
        assert_eq!(
            dispatch(Command::AssignAddress(UNCONFIGURED_ADDRESS), &mut sensor),
            Ok(Reply::Unsupported)
        );
    }

    #[test]
    fn test_unsupported_command() {
        let mut sensor = FakeTransducer::returning([0; 3]);
        assert_eq!(
            dispatch(Command::Unsupported(Some(9)), &mut sensor),
            Ok(Reply::Unsupported)
        );
        assert_eq!(
            dispatch(Command::Unsupported(None), &mut sensor),
            Ok(Reply::Unsupported)
        );
        assert_eq!(sensor.reads, 0);
    }

    #[test]
    fn test_transducer_timeout_propagates() {
        let mut sensor = FakeTransducer::failing(TransducerError::Timeout);
        assert_eq!(
            dispatch(Command::ReadEncoder, &mut sensor),
            Err(DispatchError::Transducer(TransducerError::Timeout))
        );
    }
}
