//! Wire primitives: variable-length integers, bytes and strings.
//!
//! Integers `0..=254` encode as a single byte; larger values as the marker
//! byte `0xFF` followed by 4 big-endian bytes. Strings are a varint byte
//! length followed by UTF-8 bytes.

use std::io::{Read, Write};

use crate::error::{WireError, WireResult};

const ESCAPE: u8 = 0xFF;

pub(crate) fn write_varint<W: Write>(out: &mut W, value: usize) -> WireResult<()> {
    if value < ESCAPE as usize {
        out.write_all(&[value as u8])?;
        return Ok(());
    }
    let wide = u32::try_from(value).map_err(|_| WireError::LengthOverflow)?;
    out.write_all(&[ESCAPE])?;
    out.write_all(&wide.to_be_bytes())?;
    Ok(())
}

pub(crate) fn read_varint<R: Read>(input: &mut R) -> WireResult<usize> {
    let first = read_u8(input)?;
    if first != ESCAPE {
        return Ok(first as usize);
    }
    let mut wide = [0u8; 4];
    input.read_exact(&mut wide)?;
    Ok(u32::from_be_bytes(wide) as usize)
}

pub(crate) fn write_u8<W: Write>(out: &mut W, value: u8) -> WireResult<()> {
    out.write_all(&[value])?;
    Ok(())
}

pub(crate) fn read_u8<R: Read>(input: &mut R) -> WireResult<u8> {
    let mut byte = [0u8; 1];
    input.read_exact(&mut byte)?;
    Ok(byte[0])
}

pub(crate) fn write_string<W: Write>(out: &mut W, text: &str) -> WireResult<()> {
    write_varint(out, text.len())?;
    out.write_all(text.as_bytes())?;
    Ok(())
}

pub(crate) fn read_string<R: Read>(input: &mut R) -> WireResult<String> {
    let length = read_varint(input)?;
    let mut bytes = vec![0u8; length];
    input.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| WireError::InvalidString)
}

pub(crate) fn write_bytes<W: Write>(out: &mut W, bytes: &[u8]) -> WireResult<()> {
    write_varint(out, bytes.len())?;
    out.write_all(bytes)?;
    Ok(())
}

pub(crate) fn read_bytes<R: Read>(input: &mut R) -> WireResult<Vec<u8>> {
    let length = read_varint(input)?;
    let mut bytes = vec![0u8; length];
    input.read_exact(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: usize) -> (Vec<u8>, usize) {
        let mut buffer = Vec::new();
        write_varint(&mut buffer, value).unwrap();
        let decoded = read_varint(&mut buffer.as_slice()).unwrap();
        (buffer, decoded)
    }

    #[test]
    fn small_values_take_one_byte() {
        for value in [0usize, 1, 100, 254] {
            let (buffer, decoded) = roundtrip(value);
            assert_eq!(buffer.len(), 1, "value {value} should be one byte");
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn large_values_escape_to_four_bytes() {
        for value in [255usize, 256, 65_536, u32::MAX as usize] {
            let (buffer, decoded) = roundtrip(value);
            assert_eq!(buffer.len(), 5, "value {value} should escape");
            assert_eq!(buffer[0], 0xFF);
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn escape_boundary_bytes_are_exact() {
        let mut buffer = Vec::new();
        write_varint(&mut buffer, 254).unwrap();
        assert_eq!(buffer, vec![0xFE]);

        buffer.clear();
        write_varint(&mut buffer, 255).unwrap();
        assert_eq!(buffer, vec![0xFF, 0x00, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn string_roundtrip() {
        let mut buffer = Vec::new();
        write_string(&mut buffer, "héllo").unwrap();
        let decoded = read_string(&mut buffer.as_slice()).unwrap();
        assert_eq!(decoded, "héllo");
    }

    #[test]
    fn empty_string_is_single_zero_byte() {
        let mut buffer = Vec::new();
        write_string(&mut buffer, "").unwrap();
        assert_eq!(buffer, vec![0x00]);
    }

    #[test]
    fn invalid_utf8_rejected() {
        let raw = vec![0x02, 0xC0, 0x80];
        let err = read_string(&mut raw.as_slice()).unwrap_err();
        assert!(matches!(err, WireError::InvalidString));
    }

    #[test]
    fn truncated_input_is_io_error() {
        let raw = vec![0xFF, 0x00];
        let err = read_varint(&mut raw.as_slice()).unwrap_err();
        assert!(matches!(err, WireError::Io(_)));
    }
}
