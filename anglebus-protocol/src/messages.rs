//! Message types carried in frame data
//!
//! A request's first data byte is the command code, any remaining bytes
//! are its arguments:
//! - Master → Node: assign address, read encoder
//! - Node → Master: new address, raw reading, or `'E'` for an unsupported
//!   command

use crate::frame::{Direction, Frame, FrameError};

// Command codes: Master → Node
pub const CMD_ASSIGN_ADDRESS: u8 = 0x01;
pub const CMD_READ_ENCODER: u8 = 0x02;

/// Reply byte for an unsupported command
pub const REPLY_UNSUPPORTED: u8 = b'E';

/// Three raw bytes clocked out of the AS5045
pub type RawReading = [u8; 3];

/// Commands parsed from master-originated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Take a new bus address, persist it and restart
    AssignAddress(u8),
    /// Read the angle sensor
    ReadEncoder,
    /// Unknown code, or a known code missing its argument.
    /// `None` when the frame carried no data at all.
    Unsupported(Option<u8>),
}

impl Command {
    /// Parse a command from a frame
    ///
    /// Never fails: anything unrecognized is [`Command::Unsupported`], which
    /// the node answers at the application level.
    pub fn from_frame(frame: &Frame) -> Self {
        match frame.data.first().copied() {
            Some(CMD_ASSIGN_ADDRESS) => match frame.data.get(1) {
                Some(&address) => Command::AssignAddress(address),
                None => Command::Unsupported(Some(CMD_ASSIGN_ADDRESS)),
            },
            Some(CMD_READ_ENCODER) => Command::ReadEncoder,
            code => Command::Unsupported(code),
        }
    }

    /// Command code byte, if any
    pub fn code(&self) -> Option<u8> {
        match self {
            Command::AssignAddress(_) => Some(CMD_ASSIGN_ADDRESS),
            Command::ReadEncoder => Some(CMD_READ_ENCODER),
            Command::Unsupported(code) => *code,
        }
    }

    /// Encode this command into a request frame for `address`
    pub fn to_frame(&self, address: u8) -> Result<Frame, FrameError> {
        match self {
            Command::AssignAddress(new_address) => {
                Frame::master(address, &[CMD_ASSIGN_ADDRESS, *new_address])
            }
            Command::ReadEncoder => Frame::master(address, &[CMD_READ_ENCODER]),
            Command::Unsupported(Some(code)) => Frame::master(address, &[*code]),
            Command::Unsupported(None) => Frame::master(address, &[]),
        }
    }
}

/// Replies sent by a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Address accepted; the node restarts under it
    Address(u8),
    /// Raw sensor bytes, verbatim
    Reading(RawReading),
    /// Command not supported
    Unsupported,
}

impl Reply {
    /// Encode this reply into a node-originated frame from `address`
    pub fn to_frame(&self, address: u8) -> Result<Frame, FrameError> {
        match self {
            Reply::Address(new_address) => Frame::slave(address, &[*new_address]),
            Reply::Reading(raw) => Frame::slave(address, raw),
            Reply::Unsupported => Frame::slave(address, &[REPLY_UNSUPPORTED]),
        }
    }

    /// Interpret a reply frame in the context of the request it answers
    ///
    /// A single `'E'` is ambiguous only for an address assignment to 0x45,
    /// in which case it is read as the echoed address.
    pub fn from_frame(frame: &Frame, request: &Command) -> Result<Self, FrameError> {
        if frame.direction != Direction::Slave {
            return Err(FrameError::InvalidPayload);
        }

        match (request, &frame.data[..]) {
            (Command::AssignAddress(expected), &[address]) if address == *expected => {
                Ok(Reply::Address(address))
            }
            (Command::ReadEncoder, &[b0, b1, b2]) => Ok(Reply::Reading([b0, b1, b2])),
            (_, &[REPLY_UNSUPPORTED]) => Ok(Reply::Unsupported),
            _ => Err(FrameError::InvalidPayload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_read_encoder() {
        let frame = Frame::decode(&[0x96, 0xA0, 0x81, 0x02, 0xDC, 0xA9]).unwrap();
        assert_eq!(Command::from_frame(&frame), Command::ReadEncoder);
        // no arguments follow the code
        assert_eq!(&frame.data[1..], &[] as &[u8]);
    }

    #[test]
    fn test_command_assign_address() {
        let frame = Frame::master(160, &[CMD_ASSIGN_ADDRESS, 150]).unwrap();
        assert_eq!(Command::from_frame(&frame), Command::AssignAddress(150));
    }

    #[test]
    fn test_command_assign_without_argument() {
        let frame = Frame::master(160, &[CMD_ASSIGN_ADDRESS]).unwrap();
        assert_eq!(
            Command::from_frame(&frame),
            Command::Unsupported(Some(CMD_ASSIGN_ADDRESS))
        );
    }

    #[test]
    fn test_command_unknown_and_empty() {
        let frame = Frame::master(160, &[9]).unwrap();
        assert_eq!(Command::from_frame(&frame), Command::Unsupported(Some(9)));

        let frame = Frame::master(160, &[]).unwrap();
        assert_eq!(Command::from_frame(&frame), Command::Unsupported(None));
    }

    #[test]
    fn test_command_roundtrip() {
        for command in [
            Command::AssignAddress(0x96),
            Command::ReadEncoder,
            Command::Unsupported(Some(9)),
            Command::Unsupported(None),
        ] {
            let frame = command.to_frame(42).unwrap();
            assert_eq!(frame.direction, Direction::Master);
            assert_eq!(Command::from_frame(&frame), command);
            assert_eq!(frame.data.first().copied(), command.code());
        }
    }

    #[test]
    fn test_reply_frames() {
        let frame = Reply::Unsupported.to_frame(160).unwrap();
        assert_eq!(frame.direction, Direction::Slave);
        assert_eq!(&frame.data[..], b"E");

        let frame = Reply::Reading([1, 2, 3]).to_frame(160).unwrap();
        assert_eq!(&frame.data[..], &[1, 2, 3]);

        let frame = Reply::Address(150).to_frame(150).unwrap();
        assert_eq!(&frame.data[..], &[150]);
    }

    #[test]
    fn test_reply_from_frame() {
        let frame = Reply::Reading([0xFF, 0xC0, 0x00]).to_frame(7).unwrap();
        assert_eq!(
            Reply::from_frame(&frame, &Command::ReadEncoder),
            Ok(Reply::Reading([0xFF, 0xC0, 0x00]))
        );

        let frame = Reply::Unsupported.to_frame(7).unwrap();
        assert_eq!(
            Reply::from_frame(&frame, &Command::Unsupported(Some(9))),
            Ok(Reply::Unsupported)
        );

        let frame = Reply::Address(b'E').to_frame(b'E').unwrap();
        assert_eq!(
            Reply::from_frame(&frame, &Command::AssignAddress(b'E')),
            Ok(Reply::Address(b'E'))
        );
    }

    #[test]
    fn test_reply_rejects_requests_and_mismatches() {
        let request = Command::ReadEncoder.to_frame(7).unwrap();
        assert_eq!(
            Reply::from_frame(&request, &Command::ReadEncoder),
            Err(FrameError::InvalidPayload)
        );

        let short = Frame::slave(7, &[1, 2]).unwrap();
        assert_eq!(
            Reply::from_frame(&short, &Command::ReadEncoder),
            Err(FrameError::InvalidPayload)
        );
    }
}
