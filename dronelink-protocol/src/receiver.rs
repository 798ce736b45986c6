//! Byte-at-a-time frame receiver
//!
//! The receiver consumes one byte per [`Receiver::advance`] call and walks the
//! frame positions strictly in order:
//!
//! ```text
//! Marker (0x0A 0x55) → Header (type, length) → Payload (length bytes) → Trailer (crc lo, crc hi)
//! ```
//!
//! A frame that fails validation leaves the receiver in [`Status::Failure`]
//! for exactly one call; the next byte is treated as a candidate first
//! marker byte. A completed frame holds the receiver in
//! [`Status::Complete`] until the consumer calls [`Receiver::acknowledge`].

use core::fmt::Write;

use heapless::{String, Vec};

use crate::clock::Clock;
use crate::config::ReceiverConfig;
use crate::crc;
use crate::data_type::DataType;
use crate::frame::{Frame, Header, FRAME_MARKER, MAX_PAYLOAD_SIZE};

/// Capacity of the diagnostic text
pub const DIAGNOSTIC_CAPACITY: usize = 128;

/// Overall receiver status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Waiting for the first marker byte of a new frame
    Idle,
    /// A frame is partially received
    InProgress,
    /// A checksum-valid frame is ready; input is ignored until acknowledged
    Complete,
    /// The last frame was rejected; the next byte starts over
    Failure,
}

/// Position inside a frame in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Position {
    Marker,
    Header,
    Payload,
    Trailer,
}

/// Reasons a frame is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveError {
    /// A marker byte did not match `0x0A 0x55`
    BadMarker { index: u8, byte: u8 },
    /// The type tag is not in the catalog
    UnknownType(u8),
    /// Declared payload length exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLong(u8),
    /// Trailer does not match the running checksum
    ChecksumMismatch {
        data_type: DataType,
        received: u16,
        computed: u16,
    },
    /// The frame did not complete in time
    Timeout { position: Position, elapsed_ms: u64 },
    /// A position was handed more bytes than it holds
    IndexOverflow(Position),
}

impl core::fmt::Display for ReceiveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReceiveError::BadMarker { index, byte } => {
                write!(f, "bad marker byte {}: 0x{:02X}", index, byte)
            }
            ReceiveError::UnknownType(byte) => write!(f, "unknown type tag 0x{:02X}", byte),
            ReceiveError::PayloadTooLong(length) => write!(
                f,
                "payload length {} exceeds {}",
                length, MAX_PAYLOAD_SIZE
            ),
            ReceiveError::ChecksumMismatch {
                data_type,
                received,
                computed,
            } => write!(
                f,
                "checksum mismatch for {:?}: received 0x{:04X}, computed 0x{:04X}",
                data_type, received, computed
            ),
            ReceiveError::Timeout {
                position,
                elapsed_ms,
            } => write!(f, "timed out in {:?} after {} ms", position, elapsed_ms),
            ReceiveError::IndexOverflow(position) => {
                write!(f, "index overflow in {:?}", position)
            }
        }
    }
}

/// Frame counters since the receiver was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiverStats {
    /// Frames that reached [`Status::Complete`]
    pub completed: u32,
    /// Frames rejected for any reason
    pub failed: u32,
}

/// Outcome of processing one byte at the current position
enum Step {
    /// Stay at the current position
    Next,
    /// Move to another position, resetting the byte index
    Enter(Position),
    /// Trailer matched
    Complete,
    Fail(ReceiveError),
}

/// Frame receiver for one link
#[derive(Debug)]
pub struct Receiver<C> {
    clock: C,
    config: ReceiverConfig,
    status: Status,
    position: Position,
    /// Bytes accepted at the current position
    index: usize,
    header: Header,
    crc_computed: u16,
    crc_received: u16,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
    started_at_ms: u64,
    completed_at_ms: u64,
    last_error: Option<ReceiveError>,
    diagnostic: String<DIAGNOSTIC_CAPACITY>,
    stats: ReceiverStats,
}

impl<C: Clock> Receiver<C> {
    /// Create a receiver with the default 600 ms frame timeout
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, ReceiverConfig::default())
    }

    /// Create a receiver with explicit tuning
    pub fn with_config(clock: C, config: ReceiverConfig) -> Self {
        Self {
            clock,
            config,
            status: Status::Idle,
            position: Position::Marker,
            index: 0,
            header: Header {
                data_type: DataType::None,
                length: 0,
            },
            crc_computed: 0,
            crc_received: 0,
            buffer: Vec::new(),
            started_at_ms: 0,
            completed_at_ms: 0,
            last_error: None,
            diagnostic: String::new(),
            stats: ReceiverStats::default(),
        }
    }

    /// Feed the next raw byte and return the resulting status
    pub fn advance(&mut self, byte: u8) -> Status {
        let now = self.clock.now_ms();

        match self.status {
            Status::Complete => return Status::Complete,
            Status::Idle | Status::Failure => self.begin(),
            Status::InProgress => {
                let elapsed_ms = now.saturating_sub(self.started_at_ms);
                if elapsed_ms > self.config.timeout_ms {
                    return self.fail(ReceiveError::Timeout {
                        position: self.position,
                        elapsed_ms,
                    });
                }
            }
        }

        let step = match self.position {
            Position::Marker => self.on_marker(byte, now),
            Position::Header => self.on_header(byte),
            Position::Payload => self.on_payload(byte),
            Position::Trailer => self.on_trailer(byte),
        };

        match step {
            Step::Next => {
                if self.status == Status::InProgress {
                    self.index += 1;
                }
            }
            Step::Enter(position) => self.enter(position),
            Step::Complete => self.complete(now),
            Step::Fail(error) => {
                self.fail(error);
            }
        }

        self.status
    }

    /// Feed bytes until the buffer is drained or a frame completes
    ///
    /// Returns how many bytes were consumed and the status after the last
    /// one. Bytes after a completed frame are left for the caller to feed
    /// again once the frame has been acknowledged.
    pub fn feed(&mut self, bytes: &[u8]) -> (usize, Status) {
        if self.status == Status::Complete {
            return (0, Status::Complete);
        }

        for (i, &byte) in bytes.iter().enumerate() {
            if self.advance(byte) == Status::Complete {
                return (i + 1, Status::Complete);
            }
        }

        (bytes.len(), self.status)
    }

    /// Release a completed frame so the next one can be received
    pub fn acknowledge(&mut self) {
        self.status = Status::Idle;
    }

    /// Current overall status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Current position inside the frame
    pub fn position(&self) -> Position {
        self.position
    }

    /// Human-readable description of the most recent transition
    ///
    /// Empty while a frame is being received normally.
    pub fn diagnostic(&self) -> &str {
        self.diagnostic.as_str()
    }

    /// Why the most recent frame was rejected, if it was
    pub fn last_error(&self) -> Option<ReceiveError> {
        self.last_error
    }

    /// Header of the completed frame
    pub fn header(&self) -> Option<Header> {
        (self.status == Status::Complete).then_some(self.header)
    }

    /// Payload of the completed frame
    pub fn payload(&self) -> Option<&[u8]> {
        (self.status == Status::Complete).then_some(&self.buffer[..])
    }

    /// Owned copy of the completed frame
    pub fn frame(&self) -> Option<Frame> {
        (self.status == Status::Complete).then(|| Frame {
            data_type: self.header.data_type,
            payload: self.buffer.clone(),
        })
    }

    /// Clock reading when the completed frame's trailer validated
    pub fn completed_at(&self) -> Option<u64> {
        (self.status == Status::Complete).then_some(self.completed_at_ms)
    }

    /// Frame counters
    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Active tuning
    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    fn begin(&mut self) {
        self.status = Status::Idle;
        self.last_error = None;
        self.diagnostic.clear();
        self.position = Position::Marker;
        self.index = 0;
    }

    fn enter(&mut self, position: Position) {
        trace!("receiver: {:?} -> {:?}", self.position, position);
        self.position = position;
        self.index = 0;
    }

    fn on_marker(&mut self, byte: u8, now: u64) -> Step {
        match self.index {
            0 if byte == FRAME_MARKER[0] => {
                self.status = Status::InProgress;
                self.started_at_ms = now;
                Step::Next
            }
            1 if byte == FRAME_MARKER[1] => Step::Enter(Position::Header),
            0 | 1 => Step::Fail(ReceiveError::BadMarker {
                index: self.index as u8,
                byte,
            }),
            _ => Step::Fail(ReceiveError::IndexOverflow(Position::Marker)),
        }
    }

    fn on_header(&mut self, byte: u8) -> Step {
        match self.index {
            0 => match DataType::from_byte(byte) {
                Some(data_type) => {
                    self.header.data_type = data_type;
                    self.crc_computed = crc::combine(byte, 0);
                    Step::Next
                }
                None => Step::Fail(ReceiveError::UnknownType(byte)),
            },
            1 => {
                self.header.length = byte;
                self.crc_computed = crc::combine(byte, self.crc_computed);

                if usize::from(byte) > MAX_PAYLOAD_SIZE {
                    return Step::Fail(ReceiveError::PayloadTooLong(byte));
                }

                self.buffer.clear();
                if byte == 0 {
                    Step::Enter(Position::Trailer)
                } else {
                    Step::Enter(Position::Payload)
                }
            }
            _ => Step::Fail(ReceiveError::IndexOverflow(Position::Header)),
        }
    }

    fn on_payload(&mut self, byte: u8) -> Step {
        let length = usize::from(self.header.length);
        if self.index >= length || self.buffer.push(byte).is_err() {
            return Step::Fail(ReceiveError::IndexOverflow(Position::Payload));
        }

        self.crc_computed = crc::combine(byte, self.crc_computed);

        if self.index + 1 == length {
            Step::Enter(Position::Trailer)
        } else {
            Step::Next
        }
    }

    fn on_trailer(&mut self, byte: u8) -> Step {
        match self.index {
            0 => {
                self.crc_received = u16::from(byte);
                Step::Next
            }
            1 => {
                self.crc_received |= u16::from(byte) << 8;

                if self.crc_received == self.crc_computed {
                    Step::Complete
                } else {
                    Step::Fail(ReceiveError::ChecksumMismatch {
                        data_type: self.header.data_type,
                        received: self.crc_received,
                        computed: self.crc_computed,
                    })
                }
            }
            _ => Step::Fail(ReceiveError::IndexOverflow(Position::Trailer)),
        }
    }

    fn complete(&mut self, now: u64) {
        self.status = Status::Complete;
        self.completed_at_ms = now;
        self.stats.completed = self.stats.completed.wrapping_add(1);

        self.diagnostic.clear();
        let _ = write!(
            self.diagnostic,
            "received {:?}, {} bytes, crc 0x{:04X}",
            self.header.data_type, self.header.length, self.crc_received
        );

        debug!(
            "receiver: {:?} complete, {} bytes",
            self.header.data_type,
            self.header.length
        );
    }

    fn fail(&mut self, error: ReceiveError) -> Status {
        self.status = Status::Failure;
        self.last_error = Some(error);
        self.stats.failed = self.stats.failed.wrapping_add(1);

        self.diagnostic.clear();
        // Truncation on overflow is acceptable for diagnostics
        let _ = write!(self.diagnostic, "{}", error);

        warn!("receiver: frame rejected: {:?}", error);

        Status::Failure
    }
}
