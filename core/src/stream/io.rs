//! stream/io.rs
//! Block-sized reads.

use std::io::{ErrorKind, Read};

use bytes::BytesMut;

/// Read up to `len` bytes, looping over short reads until the buffer is full
/// or the reader hits EOF. Returns an empty buffer at EOF.
///
/// Interior blocks must be exactly `len` bytes: a short OS read in the middle
/// of a file must not turn into a short block.
pub fn read_exact_or_eof<R: Read>(r: &mut R, len: usize) -> std::io::Result<BytesMut> {
    let mut buf = BytesMut::zeroed(len);
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(off);
    Ok(buf)
}
