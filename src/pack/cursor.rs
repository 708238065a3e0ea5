//! Big-endian fixed-width access at an explicit offset.
//!
//! Writes trust the caller: the emit pass fills a buffer whose length was
//! computed by the measure pass. Reads validate the span and return
//! [`Error::OutOfRange`] instead of panicking.

use super::{Error, Result};

/// Write one byte, returning the new offset.
#[inline]
pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) -> usize {
    buf[offset] = value;
    offset + 1
}

/// Write a big-endian `u16`, returning the new offset.
#[inline]
pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) -> usize {
    write_bytes(buf, offset, &value.to_be_bytes())
}

/// Write a big-endian `u32`, returning the new offset.
#[inline]
pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) -> usize {
    write_bytes(buf, offset, &value.to_be_bytes())
}

/// Write a big-endian `u64`, returning the new offset.
#[inline]
pub fn write_u64(buf: &mut [u8], offset: usize, value: u64) -> usize {
    write_bytes(buf, offset, &value.to_be_bytes())
}

/// Copy raw bytes, returning the new offset.
#[inline]
pub fn write_bytes(buf: &mut [u8], offset: usize, bytes: &[u8]) -> usize {
    let end = offset + bytes.len();
    buf[offset..end].copy_from_slice(bytes);
    end
}

/// Borrow `n` bytes starting at `offset`.
#[inline]
pub fn read_bytes(buf: &[u8], offset: usize, n: usize) -> Result<(&[u8], usize)> {
    let end = offset
        .checked_add(n)
        .filter(|end| *end <= buf.len())
        .ok_or(Error::OutOfRange {
            offset,
            needed: n,
            available: buf.len(),
        })?;
    Ok((&buf[offset..end], end))
}

#[inline]
fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<([u8; N], usize)> {
    let (bytes, next) = read_bytes(buf, offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok((out, next))
}

/// Read one byte.
#[inline]
pub fn read_u8(buf: &[u8], offset: usize) -> Result<(u8, usize)> {
    match buf.get(offset) {
        Some(byte) => Ok((*byte, offset + 1)),
        None => Err(Error::OutOfRange {
            offset,
            needed: 1,
            available: buf.len(),
        }),
    }
}

/// Read a big-endian `u16`.
#[inline]
pub fn read_u16(buf: &[u8], offset: usize) -> Result<(u16, usize)> {
    let (raw, next) = read_array::<2>(buf, offset)?;
    Ok((u16::from_be_bytes(raw), next))
}

/// Read a big-endian `u32`.
#[inline]
pub fn read_u32(buf: &[u8], offset: usize) -> Result<(u32, usize)> {
    let (raw, next) = read_array::<4>(buf, offset)?;
    Ok((u32::from_be_bytes(raw), next))
}

/// Read a big-endian `u64`.
#[inline]
pub fn read_u64(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
    let (raw, next) = read_array::<8>(buf, offset)?;
    Ok((u64::from_be_bytes(raw), next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_are_big_endian() {
        let mut buf = [0u8; 15];
        let mut offset = write_u8(&mut buf, 0, 0xcc);
        offset = write_u16(&mut buf, offset, 0x0102);
        offset = write_u32(&mut buf, offset, 0x0304_0506);
        offset = write_u64(&mut buf, offset, 0x0708_090a_0b0c_0d0e);
        assert_eq!(offset, 15);
        assert_eq!(
            buf,
            [0xcc, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]
        );
    }

    #[test]
    fn test_reads_thread_offset() {
        let buf = [0x12, 0x34, 0x56, 0x78, 0x9a];
        let (a, offset) = read_u8(&buf, 0).unwrap();
        let (b, offset) = read_u16(&buf, offset).unwrap();
        let (rest, offset) = read_bytes(&buf, offset, 2).unwrap();
        assert_eq!(a, 0x12);
        assert_eq!(b, 0x3456);
        assert_eq!(rest, &[0x78, 0x9a]);
        assert_eq!(offset, 5);
    }

    #[test]
    fn test_read_past_end_is_out_of_range() {
        let buf = [0u8; 3];
        assert!(matches!(
            read_u32(&buf, 0),
            Err(Error::OutOfRange {
                offset: 0,
                needed: 4,
                available: 3
            })
        ));
        assert!(matches!(read_u8(&buf, 3), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            read_bytes(&buf, 1, usize::MAX),
            Err(Error::OutOfRange { .. })
        ));
    }
}
