//! Receiver configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default limit between the first marker byte and frame completion
pub const DEFAULT_TIMEOUT_MS: u64 = 600;

/// Receiver tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReceiverConfig {
    /// A frame still in progress this long after its first marker byte is dropped
    pub timeout_ms: u64,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}
