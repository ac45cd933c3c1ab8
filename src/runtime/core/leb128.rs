//! LEB128 codec (§4.1).
//!
//! Unsigned and signed variable-length integer decoding from a byte buffer
//! with an explicit cursor. Both are infallible on well-formed input; the
//! caller is expected to guarantee the cursor stays inside a valid region,
//! but we still bounds-check so malformed modules trip a decode error
//! instead of panicking on an out-of-range index.

use crate::error::CoreError;

/// Maximum bytes a u32 uLEB128 can legally spend (ceil(32 / 7)).
const MAX_ULEB_BYTES: usize = 5;
/// Maximum bytes an i32 sLEB128 can legally spend.
const MAX_SLEB_BYTES: usize = 5;

pub fn read_u8(bytes: &[u8], pos: &mut usize) -> Result<u8, CoreError> {
    let byte = *bytes
        .get(*pos)
        .ok_or_else(|| CoreError::decode("unexpected end of buffer"))?;
    *pos += 1;
    Ok(byte)
}

/// Read an unsigned LEB128-encoded u32, advancing `pos` past it.
pub fn read_uleb128_u32(bytes: &[u8], pos: &mut usize) -> Result<u32, CoreError> {
    let mut result: u32 = 0;
    for i in 0..MAX_ULEB_BYTES {
        let byte = read_u8(bytes, pos)?;
        result |= ((byte & 0x7F) as u32) << (i * 7);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(CoreError::decode("uLEB128 exceeds 5 bytes for a u32"))
}

/// Read a signed LEB128-encoded i32, advancing `pos` past it.
///
/// Sign-extends from bit 6 of the terminating byte when the encoded value's
/// shift hasn't already covered all 32 bits.
pub fn read_sleb128_i32(bytes: &[u8], pos: &mut usize) -> Result<i32, CoreError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;
    for _ in 0..MAX_SLEB_BYTES {
        let byte = read_u8(bytes, pos)?;
        result |= ((byte & 0x7F) as i64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            if shift < 32 && (byte & 0x40) != 0 {
                result |= -(1i64 << shift);
            }
            return Ok(result as i32);
        }
    }
    Err(CoreError::decode("sLEB128 exceeds 5 bytes for an i32"))
}

/// Read a length-prefixed UTF-8 string (used for import/export names).
pub fn read_string(bytes: &[u8], pos: &mut usize) -> Result<String, CoreError> {
    let len = read_uleb128_u32(bytes, pos)? as usize;
    let end = pos
        .checked_add(len)
        .filter(|&e| e <= bytes.len())
        .ok_or_else(|| CoreError::decode("string length runs past buffer end"))?;
    let s = String::from_utf8(bytes[*pos..end].to_vec())
        .map_err(|_| CoreError::decode("invalid UTF-8 in name"))?;
    *pos = end;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uleb128_single_byte() {
        let mut pos = 0;
        assert_eq!(read_uleb128_u32(&[0x05], &mut pos).unwrap(), 5);
        assert_eq!(pos, 1);
    }

    #[test]
    fn uleb128_multi_byte() {
        let mut pos = 0;
        // 300 = 0b100101100 -> 0xAC 0x02
        assert_eq!(read_uleb128_u32(&[0xAC, 0x02], &mut pos).unwrap(), 300);
        assert_eq!(pos, 2);
    }

    #[test]
    fn sleb128_negative_one() {
        let mut pos = 0;
        assert_eq!(read_sleb128_i32(&[0x7F], &mut pos).unwrap(), -1);
    }

    #[test]
    fn sleb128_positive_127() {
        let mut pos = 0;
        assert_eq!(read_sleb128_i32(&[0xFF, 0x00], &mut pos).unwrap(), 127);
    }

    #[test]
    fn sleb128_large_positive() {
        let mut pos = 0;
        assert_eq!(
            read_sleb128_i32(&[0x80, 0x80, 0x80, 0x04], &mut pos).unwrap(),
            8_388_608
        );
    }

    #[test]
    fn uleb128_truncated_is_decode_error() {
        let mut pos = 0;
        assert!(read_uleb128_u32(&[0x80], &mut pos).is_err());
    }

    #[test]
    fn read_string_roundtrip() {
        let mut bytes = vec![5u8];
        bytes.extend_from_slice(b"hello");
        let mut pos = 0;
        assert_eq!(read_string(&bytes, &mut pos).unwrap(), "hello");
        assert_eq!(pos, bytes.len());
    }
}
