use heapless::Vec;

use super::register_set::REGISTER_SET_LEN;

/// Longest read response: status byte plus one register set.
pub const RESPONSE_LEN: usize = 1 + REGISTER_SET_LEN;

/// Byte-level access to the I2C responder hardware.
///
/// The transport owns the electrical side and framing. Its receive and
/// request interrupt handlers call
/// [`BusRegisterPeer::on_data_received`](super::BusRegisterPeer::on_data_received)
/// and
/// [`BusRegisterPeer::on_read_requested`](super::BusRegisterPeer::on_read_requested),
/// handing themselves in so the peer can pull and push bytes.
///
/// A transport must deliver each controller write byte-exact; the peer does
/// not validate framing.
pub trait BusTransport {
    /// Join the bus as a responder at `address`.
    fn begin(&mut self, address: u8);

    /// Request a bus clock rate. Responders that follow the controller's
    /// clock may ignore this.
    fn set_clock(&mut self, hz: u32);

    /// Bytes of the current controller write not yet read.
    fn available(&self) -> usize;

    /// Read the next byte of the current controller write.
    fn read(&mut self) -> Option<u8>;

    /// Read up to `buffer.len()` bytes, returning how many were read.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buffer.iter_mut() {
            match self.read() {
                Some(byte) => *slot = byte,
                None => break,
            }
            count += 1;
        }
        count
    }

    /// Queue `data` as (part of) the response to the controller's read,
    /// returning how many bytes were accepted.
    fn write(&mut self, data: &[u8]) -> usize;
}

/// Buffer-backed transport for one bus transaction.
///
/// Wraps the bytes of a controller write that the I2C driver already
/// received, and collects the response to a controller read so the driver
/// can send it. This adapts listen/respond style responder drivers (such as
/// `embassy_rp::i2c_slave`) to the peer's callback interface.
///
/// # Example
///
/// ```
/// use kosmo_comm::comm_peer::{BusRegisterPeer, FrameTransport};
///
/// let peer = BusRegisterPeer::new();
///
/// let mut write = FrameTransport::received(b"get");
/// peer.on_data_received(&mut write, 3);
///
/// let mut read = FrameTransport::default();
/// peer.on_read_requested(&mut read);
/// assert_eq!(read.response()[0], 1);
/// ```
#[derive(Debug, Default)]
pub struct FrameTransport<'a> {
    rx: &'a [u8],
    cursor: usize,
    tx: Vec<u8, RESPONSE_LEN>,
    address: Option<u8>,
    clock_hz: Option<u32>,
}

impl<'a> FrameTransport<'a> {
    /// A transport whose pending controller write is `rx`.
    pub fn received(rx: &'a [u8]) -> Self {
        Self {
            rx,
            ..Self::default()
        }
    }

    /// Bytes queued for the controller's read.
    pub fn response(&self) -> &[u8] {
        &self.tx
    }

    /// Address passed to [`begin`](BusTransport::begin), if called.
    pub fn address(&self) -> Option<u8> {
        self.address
    }

    /// Clock passed to [`set_clock`](BusTransport::set_clock), if called.
    pub fn clock_hz(&self) -> Option<u32> {
        self.clock_hz
    }
}

impl BusTransport for FrameTransport<'_> {
    fn begin(&mut self, address: u8) {
        self.address = Some(address);
    }

    fn set_clock(&mut self, hz: u32) {
        self.clock_hz = Some(hz);
    }

    fn available(&self) -> usize {
        self.rx.len() - self.cursor
    }

    fn read(&mut self) -> Option<u8> {
        let byte = *self.rx.get(self.cursor)?;
        self.cursor += 1;
        Some(byte)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> usize {
        let count = buffer.len().min(self.available());
        buffer[..count].copy_from_slice(&self.rx[self.cursor..self.cursor + count]);
        self.cursor += count;
        count
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let count = data.len().min(self.tx.capacity() - self.tx.len());
        // Cannot fail: `count` fits the remaining capacity.
        let _ = self.tx.extend_from_slice(&data[..count]);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_drain_the_frame() {
        let mut transport = FrameTransport::received(b"abcd");
        assert_eq!(transport.available(), 4);

        let mut buf = [0u8; 3];
        assert_eq!(transport.read_bytes(&mut buf), 3);
        assert_eq!(&buf, b"abc");
        assert_eq!(transport.available(), 1);

        assert_eq!(transport.read(), Some(b'd'));
        assert_eq!(transport.read(), None);
        assert_eq!(transport.read_bytes(&mut buf), 0);
    }

    #[test]
    fn short_frame_reads_partially() {
        let mut transport = FrameTransport::received(b"ab");
        let mut buf = [0u8; 5];
        assert_eq!(transport.read_bytes(&mut buf), 2);
        assert_eq!(&buf[..2], b"ab");
    }

    #[test]
    fn writes_are_bounded_by_response_len() {
        let mut transport = FrameTransport::default();
        assert_eq!(transport.write(&[1; RESPONSE_LEN - 2]), RESPONSE_LEN - 2);
        assert_eq!(transport.write(&[2; 5]), 2);
        assert_eq!(transport.response().len(), RESPONSE_LEN);
        assert_eq!(transport.write(&[3]), 0);
    }

    #[test]
    fn begin_and_clock_are_recorded() {
        let mut transport = FrameTransport::default();
        assert_eq!(transport.address(), None);

        transport.begin(0x2A);
        transport.set_clock(100_000);

        assert_eq!(transport.address(), Some(0x2A));
        assert_eq!(transport.clock_hz(), Some(100_000));
    }

    /// Exercises the provided `read_bytes` on a transport that only
    /// implements `read`.
    struct ByteAtATime<'a>(&'a [u8]);

    impl BusTransport for ByteAtATime<'_> {
        fn begin(&mut self, _address: u8) {}
        fn set_clock(&mut self, _hz: u32) {}

        fn available(&self) -> usize {
            self.0.len()
        }

        fn read(&mut self) -> Option<u8> {
            let (&first, rest) = self.0.split_first()?;
            self.0 = rest;
            Some(first)
        }

        fn write(&mut self, data: &[u8]) -> usize {
            data.len()
        }
    }

    #[test]
    fn provided_read_bytes_stops_at_end_of_frame() {
        let mut transport = ByteAtATime(b"xyz");
        let mut buf = [0u8; 8];
        assert_eq!(transport.read_bytes(&mut buf), 3);
        assert_eq!(&buf[..3], b"xyz");
        assert_eq!(transport.available(), 0);
    }
}
