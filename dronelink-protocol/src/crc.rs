//! Frame checksum
//!
//! CRC-16/XMODEM (polynomial 0x1021, MSB first, initial value 0x0000),
//! computed with a 256-entry lookup table built at compile time.
//!
//! The checksum covers the type tag, the length and the payload. It never
//! covers the marker or the trailer itself.

/// CRC-16 generator polynomial
const POLYNOMIAL: u16 = 0x1021;

/// Lookup table indexed by the top byte of the running value XORed with the input byte
static TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Fold one byte into a running checksum
///
/// Pure and order-dependent. The receiver seeds a fresh accumulator by
/// calling this with `running = 0` on the type-tag byte.
#[inline]
pub fn combine(byte: u8, running: u16) -> u16 {
    TABLE[usize::from((running >> 8) as u8 ^ byte)] ^ (running << 8)
}

/// Checksum of a byte sequence, seeded with zero
///
/// Accepts any iterator of bytes so header and payload can be chained
/// without copying them into one buffer.
pub fn checksum<'a>(bytes: impl IntoIterator<Item = &'a u8>) -> u16 {
    bytes.into_iter().fold(0, |crc, &byte| combine(byte, crc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        // Standard CRC-16/XMODEM check string
        assert_eq!(checksum(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_seeded_at_type_tag() {
        // Ping header with zero length
        let crc = combine(0x00, combine(0x01, 0));
        assert_eq!(crc, 0x3331);
        assert_eq!(crc, checksum(&[0x01, 0x00]));
    }

    #[test]
    fn test_chained_slices_match_contiguous() {
        let header = [0x31, 3];
        let payload = [1, 2, 3];
        assert_eq!(checksum(header.iter().chain(payload.iter())), 0x5C52);
        assert_eq!(checksum(&[0x31, 3, 1, 2, 3]), 0x5C52);
    }

    #[test]
    fn test_order_dependent() {
        assert_ne!(checksum(&[0x01, 0x02]), checksum(&[0x02, 0x01]));
    }

    #[test]
    fn test_table_edges() {
        assert_eq!(TABLE[0], 0x0000);
        assert_eq!(TABLE[1], 0x1021);
        assert_eq!(TABLE[255], 0x1EF0);
    }
}
