//! CoDrone Link Protocol
//!
//! This crate parses the framed serial/radio protocol spoken between a host
//! and a CoDrone flight controller (directly over UART or through the link
//! board). Bytes are fed one at a time; the receiver tolerates noise,
//! partial frames and stalled transfers.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌─────────────┬──────┬────────┬─────────────┬──────────────┐
//! │ MARKER      │ TYPE │ LENGTH │ PAYLOAD     │ CRC16 (LE)   │
//! │ 0x0A 0x55   │ 1B   │ 1B     │ 0–128B      │ 2B           │
//! └─────────────┴──────┴────────┴─────────────┴──────────────┘
//! ```
//!
//! The checksum covers TYPE, LENGTH and PAYLOAD only.
//!
//! # Usage
//!
//! ```
//! use dronelink_protocol::{DataType, Frame, ManualClock, Receiver, Status};
//!
//! let bytes = Frame::new(DataType::Battery, &[87]).unwrap().encode_to_vec().unwrap();
//!
//! let clock = ManualClock::new(0);
//! let mut receiver = Receiver::new(&clock);
//! for &byte in bytes.iter() {
//!     if receiver.advance(byte) == Status::Complete {
//!         assert_eq!(receiver.payload(), Some(&[87][..]));
//!         receiver.acknowledge();
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod crc;
pub mod data_type;
pub mod frame;
pub mod link;
pub mod receiver;

#[cfg(feature = "embassy-time")]
pub use clock::EmbassyClock;
pub use clock::{Clock, ManualClock};
pub use config::ReceiverConfig;
pub use data_type::DataType;
pub use frame::{Frame, FrameError, Header, FRAME_MARKER, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use link::{Link, LinkError};
pub use receiver::{Position, ReceiveError, Receiver, ReceiverStats, Status};
