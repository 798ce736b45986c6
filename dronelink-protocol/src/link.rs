//! Blocking link driver
//!
//! Pulls raw bytes from any [`embedded_io::Read`] source (UART, USB CDC,
//! a host serial port adapter) and drains them through a [`Receiver`],
//! handing completed frames to the caller.

use embedded_io::Read;

use crate::clock::Clock;
use crate::frame::Frame;
use crate::receiver::{Receiver, Status};

/// Buffer size for each read from the byte source
pub const RX_BUF_SIZE: usize = 64;

/// Errors surfaced by the link driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The byte source failed
    Read(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkError::Read(e) => write!(f, "read error: {:?}", e),
        }
    }
}

/// Receiver bound to a byte source
pub struct Link<R, C> {
    rx: R,
    receiver: Receiver<C>,
    buf: [u8; RX_BUF_SIZE],
    /// Unconsumed bytes are `buf[start..end]`
    start: usize,
    end: usize,
}

impl<R: Read, C: Clock> Link<R, C> {
    /// Bind a receiver to a byte source
    pub fn new(rx: R, receiver: Receiver<C>) -> Self {
        Self {
            rx,
            receiver,
            buf: [0; RX_BUF_SIZE],
            start: 0,
            end: 0,
        }
    }

    /// Block until the next valid frame arrives
    ///
    /// Rejected frames are skipped. Returns `Ok(None)` once the source
    /// reports end of stream. Bytes already read past a completed frame are
    /// kept for the next call.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, LinkError<R::Error>> {
        loop {
            if self.start == self.end {
                let n = self.rx.read(&mut self.buf).map_err(LinkError::Read)?;
                if n == 0 {
                    debug!("link: end of stream");
                    return Ok(None);
                }
                trace!("link: rx {} bytes", n);
                self.start = 0;
                self.end = n;
            }

            let (consumed, status) = self.receiver.feed(&self.buf[self.start..self.end]);
            self.start += consumed;

            if status == Status::Complete {
                let frame = self.receiver.frame();
                self.receiver.acknowledge();
                if let Some(frame) = frame {
                    return Ok(Some(frame));
                }
            }
        }
    }

    /// The underlying receiver, for diagnostics and counters
    pub fn receiver(&self) -> &Receiver<C> {
        &self.receiver
    }

    /// Release the byte source and receiver
    ///
    /// Bytes read but not yet fed to the receiver are dropped.
    pub fn into_inner(self) -> (R, Receiver<C>) {
        (self.rx, self.receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::data_type::DataType;
    use embedded_io::{ErrorKind, ErrorType};

    /// Byte source handing out fixed-size chunks, then an optional error
    struct ChunkedSource<'a> {
        data: &'a [u8],
        chunk: usize,
        fail_at_end: bool,
    }

    impl ErrorType for ChunkedSource<'_> {
        type Error = ErrorKind;
    }

    impl Read for ChunkedSource<'_> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if self.data.is_empty() {
                return if self.fail_at_end {
                    Err(ErrorKind::BrokenPipe)
                } else {
                    Ok(0)
                };
            }
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn stream() -> heapless::Vec<u8, 256> {
        let mut bytes = heapless::Vec::new();
        for frame in [
            Frame::new(DataType::Attitude, &[1, 2, 3, 4, 5, 6]).unwrap(),
            Frame::empty(DataType::Ping),
            Frame::new(DataType::Battery, &[0x64; 16]).unwrap(),
        ] {
            bytes.extend_from_slice(&frame.encode_to_vec().unwrap()).unwrap();
        }
        bytes
    }

    #[test]
    fn test_reads_consecutive_frames_from_one_buffer() {
        let data = stream();
        let clock = ManualClock::new(0);
        let mut link = Link::new(&data[..], Receiver::new(&clock));

        let first = link.read_frame().unwrap().unwrap();
        assert_eq!(first.data_type, DataType::Attitude);
        assert_eq!(&first.payload[..], &[1, 2, 3, 4, 5, 6]);

        let second = link.read_frame().unwrap().unwrap();
        assert_eq!(second.data_type, DataType::Ping);
        assert!(second.payload.is_empty());

        let third = link.read_frame().unwrap().unwrap();
        assert_eq!(third.data_type, DataType::Battery);
        assert_eq!(third.payload.len(), 16);

        assert_eq!(link.read_frame().unwrap(), None);
        assert_eq!(link.receiver().stats().completed, 3);
    }

    #[test]
    fn test_frames_split_across_reads() {
        let data = stream();
        let clock = ManualClock::new(0);
        let source = ChunkedSource {
            data: &data,
            chunk: 3,
            fail_at_end: false,
        };
        let mut link = Link::new(source, Receiver::new(&clock));

        let mut types = heapless::Vec::<DataType, 4>::new();
        while let Some(frame) = link.read_frame().unwrap() {
            types.push(frame.data_type).unwrap();
        }
        assert_eq!(&types[..], &[DataType::Attitude, DataType::Ping, DataType::Battery]);
    }

    #[test]
    fn test_corrupt_frame_is_skipped() {
        let mut data = stream();
        // Corrupt the first frame's payload
        data[5] ^= 0x01;

        let clock = ManualClock::new(0);
        let mut link = Link::new(&data[..], Receiver::new(&clock));

        let frame = link.read_frame().unwrap().unwrap();
        assert_eq!(frame.data_type, DataType::Ping);
        assert_eq!(link.receiver().stats().failed, 1);
        assert_eq!(link.receiver().stats().completed, 1);
    }

    #[test]
    fn test_source_error_is_surfaced() {
        let data = Frame::empty(DataType::Ping).encode_to_vec().unwrap();
        let clock = ManualClock::new(0);
        let source = ChunkedSource {
            data: &data,
            chunk: 4,
            fail_at_end: true,
        };
        let mut link = Link::new(source, Receiver::new(&clock));

        assert!(link.read_frame().unwrap().is_some());
        assert_eq!(link.read_frame(), Err(LinkError::Read(ErrorKind::BrokenPipe)));
    }

    #[test]
    fn test_into_inner_returns_receiver() {
        let data = Frame::empty(DataType::Ping).encode_to_vec().unwrap();
        let clock = ManualClock::new(0);
        let mut link = Link::new(&data[..], Receiver::new(&clock));

        link.read_frame().unwrap();
        let (rest, receiver) = link.into_inner();
        assert!(rest.is_empty());
        assert_eq!(receiver.status(), Status::Idle);
    }
}
