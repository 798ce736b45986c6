//! Frame layout and encoding
//!
//! Frame format:
//! - MARKER (2 bytes): 0x0A 0x55 synchronization sequence
//! - TYPE (1 byte): message type tag, see [`DataType`]
//! - LENGTH (1 byte): payload length (0-128)
//! - PAYLOAD (0-128 bytes): type-specific data
//! - CRC (2 bytes): little-endian CRC-16 of TYPE, LENGTH and PAYLOAD

use heapless::Vec;

use crate::crc;
use crate::data_type::DataType;

/// Frame synchronization sequence
pub const FRAME_MARKER: [u8; 2] = [0x0A, 0x55];

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 128;

/// Header size (TYPE + LENGTH)
pub const HEADER_SIZE: usize = 2;

/// Trailer size (CRC low + CRC high)
pub const TRAILER_SIZE: usize = 2;

/// Maximum complete frame size (MARKER + HEADER + MAX_PAYLOAD + CRC)
pub const MAX_FRAME_SIZE: usize = FRAME_MARKER.len() + HEADER_SIZE + MAX_PAYLOAD_SIZE + TRAILER_SIZE;

/// Errors that can occur while building or encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::PayloadTooLarge => {
                write!(f, "payload exceeds {} bytes", MAX_PAYLOAD_SIZE)
            }
            FrameError::BufferTooSmall => f.write_str("buffer too small for frame"),
        }
    }
}

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    /// Message type tag
    pub data_type: DataType,
    /// Payload length in bytes
    pub length: u8,
}

impl Header {
    /// Wire representation: `[type, length]`
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        [self.data_type.to_byte(), self.length]
    }
}

/// A received or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Message type tag
    pub data_type: DataType,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given message type and payload
    pub fn new(data_type: DataType, payload: &[u8]) -> Result<Self, FrameError> {
        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            data_type,
            payload: payload_vec,
        })
    }

    /// Create a frame with no payload
    pub fn empty(data_type: DataType) -> Self {
        Self {
            data_type,
            payload: Vec::new(),
        }
    }

    /// Header describing this frame
    pub fn header(&self) -> Header {
        Header {
            data_type: self.data_type,
            // Bounded by the payload capacity
            length: self.payload.len() as u8,
        }
    }

    /// Checksum carried in the trailer
    pub fn checksum(&self) -> u16 {
        crc::checksum(self.header().to_bytes().iter().chain(self.payload.iter()))
    }

    /// Number of bytes this frame occupies on the wire
    pub fn encoded_len(&self) -> usize {
        FRAME_MARKER.len() + HEADER_SIZE + self.payload.len() + TRAILER_SIZE
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let payload_start = FRAME_MARKER.len() + HEADER_SIZE;
        let payload_end = payload_start + self.payload.len();

        buffer[..FRAME_MARKER.len()].copy_from_slice(&FRAME_MARKER);
        buffer[FRAME_MARKER.len()..payload_start].copy_from_slice(&self.header().to_bytes());
        buffer[payload_start..payload_end].copy_from_slice(&self.payload);
        buffer[payload_end..frame_len].copy_from_slice(&self.checksum().to_le_bytes());

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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::empty(DataType::Ping);
        let mut buffer = [0u8; 10];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 6);
        assert_eq!(&buffer[..2], &FRAME_MARKER);
        assert_eq!(buffer[2], 0x01); // type
        assert_eq!(buffer[3], 0); // length
        assert_eq!(&buffer[4..6], &[0x31, 0x33]); // crc 0x3331, little-endian
    }

    #[test]
    fn test_frame_encode_with_payload() {
        let frame = Frame::new(DataType::State, &[1, 2, 3]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(encoded.len(), 9);
        assert_eq!(encoded[2], 0x31); // type
        assert_eq!(encoded[3], 3); // length
        assert_eq!(&encoded[4..7], &[1, 2, 3]);
        assert_eq!(&encoded[7..9], &[0x52, 0x5C]);
    }

    #[test]
    fn test_checksum_covers_header_and_payload() {
        let frame = Frame::new(DataType::State, &[1, 2, 3]).unwrap();
        assert_eq!(frame.checksum(), crc::checksum(&[0x31, 3, 1, 2, 3]));
    }

    #[test]
    fn test_trailer_is_checksum_of_covered_bytes() {
        let frame = Frame::new(DataType::Motor, &[0x10, 0x00, 0x20, 0x00]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        let (covered, trailer) = encoded[2..].split_at(encoded.len() - 4);

        assert_eq!(covered, &[0x55, 4, 0x10, 0x00, 0x20, 0x00]);
        assert_eq!(trailer, &crc::checksum(covered).to_le_bytes());
    }

    #[test]
    fn test_max_payload_fits() {
        let frame = Frame::new(DataType::Message, &[0x42; MAX_PAYLOAD_SIZE]).unwrap();
        assert_eq!(frame.header().length, 128);
        assert_eq!(frame.encode_to_vec().unwrap().len(), MAX_FRAME_SIZE);
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        let result = Frame::new(DataType::Message, &large_payload);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_buffer_too_small() {
        let frame = Frame::new(DataType::Control, &[0; 4]).unwrap();
        let mut buffer = [0u8; 9];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }
}
