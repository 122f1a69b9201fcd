//! Transport boundary: the byte interfaces the framing core consumes.
//!
//! The core never touches a socket. The decoder pulls bytes from a
//! [`ByteSource`], the encoder can push finished frames into a
//! [`ByteSink`], and anything implementing `std::io::Read`/`Write`
//! (TCP streams, TLS sessions, in-memory cursors) slots in directly.

use std::io;

/// A source of bytes feeding the decoder.
pub trait ByteSource {
    /// Fill up to `buf.len()` bytes, returning how many were read.
    /// A return of 0 means end-of-stream.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: io::Read> ByteSource for R {
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// A sink accepting encoded frame bytes.
pub trait ByteSink {
    /// Write all of `bytes` or fail.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<W: io::Write> ByteSink for W {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_adapter() {
        let mut source = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 2];
        assert_eq!(source.read_into(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(source.read_into(&mut buf).unwrap(), 1);
        assert_eq!(source.read_into(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_write_adapter() {
        let mut sink = Vec::new();
        ByteSink::write(&mut sink, &[0x81, 0x00]).unwrap();
        assert_eq!(sink, vec![0x81, 0x00]);
    }
}
