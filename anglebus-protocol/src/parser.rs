//! Receive state machine
//!
//! Fed one byte per received character. Address and data bytes are kept
//! exactly as received; unescaping and the checksum check happen once the
//! STOP byte arrives. Nothing is surfaced until a frame validates, and every
//! failure drops the partial frame and returns to [`ParseState::WaitStart`].

use heapless::Vec;

use crate::frame::{ControlByte, Frame, FrameError, FRAME_START, FRAME_STOP, MAX_DATA_LEN};

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    address: u8,
    control: ControlByte,
    data: Vec<u8, MAX_DATA_LEN>,
    checksum: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    /// Waiting for START byte
    WaitStart,
    /// Got START, waiting for ADDRESS
    ReadAddress,
    /// Got ADDRESS, waiting for CONTROL
    ReadControl,
    /// Reading data bytes
    ReadData,
    /// Waiting for CHECKSUM
    ReadChecksum,
    /// Waiting for STOP
    ExpectStop,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitStart,
            address: 0,
            control: ControlByte::default(),
            data: Vec::new(),
            checksum: 0,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitStart;
        self.address = 0;
        self.control = ControlByte::default();
        self.data.clear();
        self.checksum = 0;
    }

    /// Current state
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// True when no partial frame is held
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitStart
    }

    /// Drop any partial frame after a UART overrun or framing fault
    ///
    /// Returns true if a partial frame was discarded.
    pub fn line_fault(&mut self) -> bool {
        let discarded = !self.is_idle();
        self.reset();
        discarded
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when a partial frame
    /// was discarded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        if self.state == ParseState::WaitStart {
            if byte == FRAME_START {
                self.state = ParseState::ReadAddress;
            }
            // Noise or the tail of a frame we joined late
            return Ok(None);
        }

        // START never occurs inside a frame: a new frame begins here
        if byte == FRAME_START {
            self.reset();
            self.state = ParseState::ReadAddress;
            return Err(FrameError::Framing);
        }

        match self.state {
            ParseState::WaitStart => Ok(None),
            ParseState::ExpectStop => {
                let (address, control, checksum) = (self.address, self.control, self.checksum);
                let result = if byte == FRAME_STOP {
                    Frame::from_wire(address, control, &self.data, checksum).map(Some)
                } else {
                    Err(FrameError::Framing)
                };
                self.reset();
                result
            }
            // STOP anywhere before the checksum has been read cuts the frame short
            _ if byte == FRAME_STOP => {
                self.reset();
                Err(FrameError::Framing)
            }
            ParseState::ReadAddress => {
                self.address = byte;
                self.state = ParseState::ReadControl;
                Ok(None)
            }
            ParseState::ReadControl => match ControlByte::from_byte(byte) {
                Ok(control) => {
                    self.control = control;
                    self.data.clear();
                    self.state = if control.data_len() == 0 {
                        ParseState::ReadChecksum
                    } else {
                        ParseState::ReadData
                    };
                    Ok(None)
                }
                Err(e) => {
                    self.reset();
                    Err(e)
                }
            },
            ParseState::ReadData => {
                // Cannot overflow: data_len() <= MAX_DATA_LEN
                let _ = self.data.push(byte);
                if self.data.len() == self.control.data_len() {
                    self.state = ParseState::ReadChecksum;
                }
                Ok(None)
            }
            ParseState::ReadChecksum => {
                self.checksum = byte;
                self.state = ParseState::ExpectStop;
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
