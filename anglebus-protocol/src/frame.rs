//! Frame encoding and decoding.
//!
//! Frame format:
//! - START (1 byte): 0x96
//! - ADDRESS (1 byte): node address, escaped per control bit 6
//! - CONTROL (1 byte):
//!   - bit 7: 1 if master-originated, 0 if node-originated
//!   - bit 6: address byte escaped
//!   - bit 5: reserved, always 0
//!   - bit 4..2: data byte 3..1 escaped
//!   - bit 1..0: number of data bytes (0-3)
//! - DATA (0-3 bytes): escaped per control bits 2..4
//! - CHECKSUM (1 byte): `!(CONTROL ^ ADDRESS ^ DATA...)` over the wire
//!   values, plus one if that lands on START or STOP
//! - STOP (1 byte): 0xA9
//!
//! Escaping XORs a byte with 1. START and STOP differ from their escaped
//! forms (0x97, 0xA8) only in the low bit, and neither escaped form is a
//! delimiter itself.

use heapless::Vec;

/// Frame start delimiter
pub const FRAME_START: u8 = 0x96;

/// Frame stop delimiter
pub const FRAME_STOP: u8 = 0xA9;

/// Maximum number of data bytes in a frame
pub const MAX_DATA_LEN: usize = 3;

/// Maximum complete frame size (START + ADDRESS + CONTROL + DATA + CHECKSUM + STOP)
pub const MAX_FRAME_SIZE: usize = 1 + 1 + 1 + MAX_DATA_LEN + 1 + 1;

const DIRECTION_BIT: u8 = 0x80;
const ADDRESS_ESCAPED_BIT: u8 = 0x40;
const RESERVED_BIT: u8 = 0x20;
const DATA_ESCAPED_SHIFT: u8 = 2;
const DATA_ESCAPED_MASK: u8 = 0x1C;
const COUNT_MASK: u8 = 0x03;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Byte stream does not match the START…STOP structure
    Framing,
    /// Structurally valid frame with a checksum mismatch
    Checksum,
    /// More than [`MAX_DATA_LEN`] data bytes
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Well-formed frame whose payload does not fit the expected message
    InvalidPayload,
}

/// Which side of the bus produced a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Request from the bus master
    Master,
    /// Reply from an encoder node
    Slave,
}

/// Returns true if `byte` is one of the frame delimiters
#[inline]
pub fn is_delimiter(byte: u8) -> bool {
    byte == FRAME_START || byte == FRAME_STOP
}

/// Escape a logical byte for the wire
///
/// Returns the wire value and whether it was escaped.
#[inline]
pub fn escape(value: u8) -> (u8, bool) {
    if is_delimiter(value) {
        (value ^ 1, true)
    } else {
        (value, false)
    }
}

/// Undo [`escape`] for a received wire byte
///
/// Rejects combinations `escape` never produces: a flagged byte that does
/// not unescape to a delimiter, or an unflagged delimiter.
#[inline]
pub fn unescape(wire: u8, escaped: bool) -> Result<u8, FrameError> {
    let value = if escaped { wire ^ 1 } else { wire };
    if escaped != is_delimiter(value) {
        return Err(FrameError::Framing);
    }
    Ok(value)
}

/// Calculate the frame checksum over wire (escaped) values
///
/// Never returns [`FRAME_START`] or [`FRAME_STOP`].
pub fn checksum(control: u8, address: u8, data: &[u8]) -> u8 {
    let mut sum = control ^ address;
    for &byte in data {
        sum ^= byte;
    }
    let sum = !sum;
    if is_delimiter(sum) {
        sum.wrapping_add(1)
    } else {
        sum
    }
}

/// The control byte of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlByte(u8);

impl ControlByte {
    /// Build a control byte
    ///
    /// `data_escaped` holds one flag per data byte, `data_escaped.len()`
    /// is the data byte count.
    pub fn new(
        direction: Direction,
        address_escaped: bool,
        data_escaped: &[bool],
    ) -> Result<Self, FrameError> {
        if data_escaped.len() > MAX_DATA_LEN {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut byte = data_escaped.len() as u8;
        if direction == Direction::Master {
            byte |= DIRECTION_BIT;
        }
        if address_escaped {
            byte |= ADDRESS_ESCAPED_BIT;
        }
        for (i, &escaped) in data_escaped.iter().enumerate() {
            if escaped {
                byte |= 1 << (DATA_ESCAPED_SHIFT + i as u8);
            }
        }
        Ok(Self(byte))
    }

    /// Validate a received control byte
    ///
    /// The reserved bit must be clear and no escape flag may refer to a
    /// data byte beyond the declared count. This also rules out the
    /// delimiter values.
    pub fn from_byte(byte: u8) -> Result<Self, FrameError> {
        let control = Self(byte);
        if byte & RESERVED_BIT != 0 {
            return Err(FrameError::Framing);
        }
        let flags = (byte & DATA_ESCAPED_MASK) >> DATA_ESCAPED_SHIFT;
        if flags >> control.data_len() != 0 {
            return Err(FrameError::Framing);
        }
        Ok(control)
    }

    /// Raw byte value
    pub fn byte(self) -> u8 {
        self.0
    }

    /// Originating side
    pub fn direction(self) -> Direction {
        if self.0 & DIRECTION_BIT != 0 {
            Direction::Master
        } else {
            Direction::Slave
        }
    }

    /// Whether the address byte is escaped
    pub fn address_escaped(self) -> bool {
        self.0 & ADDRESS_ESCAPED_BIT != 0
    }

    /// Whether data byte `index` is escaped
    pub fn data_escaped(self, index: usize) -> bool {
        index < MAX_DATA_LEN && self.0 & (1 << (DATA_ESCAPED_SHIFT + index as u8)) != 0
    }

    /// Number of data bytes that follow
    pub fn data_len(self) -> usize {
        (self.0 & COUNT_MASK) as usize
    }
}

/// A parsed or constructed frame, holding logical (unescaped) values
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Originating side
    pub direction: Direction,
    /// Recipient (requests) or sender (replies)
    pub address: u8,
    /// Data bytes
    pub data: Vec<u8, MAX_DATA_LEN>,
}

impl Frame {
    /// Create a new frame
    pub fn new(direction: Direction, address: u8, data: &[u8]) -> Result<Self, FrameError> {
        let mut vec = Vec::new();
        vec.extend_from_slice(data)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            direction,
            address,
            data: vec,
        })
    }

    /// Create a master-originated frame
    pub fn master(address: u8, data: &[u8]) -> Result<Self, FrameError> {
        Self::new(Direction::Master, address, data)
    }

    /// Create a node-originated frame
    pub fn slave(address: u8, data: &[u8]) -> Result<Self, FrameError> {
        Self::new(Direction::Slave, address, data)
    }

    /// Escape the address and data bytes
    ///
    /// Returns the control byte together with the wire values.
    fn escaped(&self) -> (ControlByte, u8, Vec<u8, MAX_DATA_LEN>) {
        let (address, address_escaped) = escape(self.address);

        let mut flags = [false; MAX_DATA_LEN];
        let mut wire = Vec::new();
        for (i, &value) in self.data.iter().enumerate() {
            let (byte, escaped) = escape(value);
            flags[i] = escaped;
            // Capacity matches self.data
            let _ = wire.push(byte);
        }

        // data.len() <= MAX_DATA_LEN by construction, so this cannot fail
        let control = ControlByte::new(self.direction, address_escaped, &flags[..self.data.len()])
            .unwrap_or(ControlByte(0));

        (control, address, wire)
    }

    /// The control byte this frame is sent with
    pub fn control_byte(&self) -> ControlByte {
        self.escaped().0
    }

    /// Number of bytes this frame occupies on the wire
    pub fn wire_len(&self) -> usize {
        5 + self.data.len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.wire_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let (control, address, data) = self.escaped();
        let n = data.len();

        buffer[0] = FRAME_START;
        buffer[1] = address;
        buffer[2] = control.byte();
        buffer[3..3 + n].copy_from_slice(&data);
        buffer[3 + n] = checksum(control.byte(), address, &data);
        buffer[4 + n] = FRAME_STOP;

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }

    /// Decode one complete frame, delimiters included
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        // START ADDRESS CONTROL CHECKSUM STOP at minimum
        if bytes.len() < 5 || bytes[0] != FRAME_START || bytes[bytes.len() - 1] != FRAME_STOP {
            return Err(FrameError::Framing);
        }

        let control = ControlByte::from_byte(bytes[2])?;
        let n = control.data_len();
        if bytes.len() != 5 + n {
            return Err(FrameError::Framing);
        }

        Self::from_wire(bytes[1], control, &bytes[3..3 + n], bytes[3 + n])
    }

    /// Validate the fields of a received frame and unescape them
    ///
    /// `address` and `data` are the wire values as received.
    pub(crate) fn from_wire(
        address: u8,
        control: ControlByte,
        data: &[u8],
        received_checksum: u8,
    ) -> Result<Self, FrameError> {
        if data.len() != control.data_len() {
            return Err(FrameError::Framing);
        }
        if checksum(control.byte(), address, data) != received_checksum {
            return Err(FrameError::Checksum);
        }

        let mut values = Vec::new();
        for (i, &wire) in data.iter().enumerate() {
            let value = unescape(wire, control.data_escaped(i))?;
            values.push(value).map_err(|_| FrameError::PayloadTooLarge)?;
        }

        Ok(Self {
            direction: control.direction(),
            address: unescape(address, control.address_escaped())?,
            data: values,
        })
    }
}
