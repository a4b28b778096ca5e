//! VR-specific value coding rules: padding, numeric reinterpretation, and
//! multi-valued string splitting/joining.

use crate::cursor::Cursor;
use crate::header::VR;
use byteordered::Endianness;

/// Bring `bytes` to even length by appending `pad` once, if needed (I1).
pub fn pad_to_even(bytes: &mut Vec<u8>, pad: u8) {
    if bytes.len() % 2 != 0 {
        bytes.push(pad);
    }
}

/// Decode a text value's bytes as UTF-8, with trailing pad bytes (space or
/// NUL) stripped. Per spec.md §9, bytes are never transcoded: a stream
/// under a non-default Specific Character Set is decoded lossily via
/// [`String::from_utf8_lossy`] rather than rejected.
pub fn decode_text(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    let trimmed = trim_pad(bytes);
    String::from_utf8_lossy(trimmed)
}

fn trim_pad(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && (bytes[end - 1] == b' ' || bytes[end - 1] == 0x00) {
        end -= 1;
    }
    &bytes[..end]
}

/// Split a multi-valued text value on the DICOM value delimiter `\`.
pub fn split_multi(s: &str) -> Vec<&str> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split('\\').collect()
}

/// Join multiple values with the DICOM value delimiter `\`, producing the
/// raw (unpadded) byte encoding of a multi-valued text element.
pub fn join_multi<I, S>(values: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = values
        .into_iter()
        .map(|s| s.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join("\\");
    joined.into_bytes()
}

/// Build the padded byte encoding of a text value for the given VR.
pub fn encode_text(value: &str, vr: VR) -> Vec<u8> {
    let mut bytes = value.as_bytes().to_vec();
    pad_to_even(&mut bytes, vr.pad_byte());
    bytes
}

/// Reinterpret `bytes` as a little/big-endian `u16`, per `endianness`.
pub fn decode_u16(bytes: &[u8], endianness: Endianness) -> Option<u16> {
    if bytes.len() < 2 {
        return None;
    }
    let mut c = Cursor::new(&bytes[0..2], endianness);
    c.read_u16().ok()
}

/// Reinterpret `bytes` as a little/big-endian `i16`, per `endianness`.
pub fn decode_i16(bytes: &[u8], endianness: Endianness) -> Option<i16> {
    decode_u16(bytes, endianness).map(|v| v as i16)
}

/// Reinterpret `bytes` as a little/big-endian `u32`, per `endianness`.
pub fn decode_u32(bytes: &[u8], endianness: Endianness) -> Option<u32> {
    if bytes.len() < 4 {
        return None;
    }
    let mut c = Cursor::new(&bytes[0..4], endianness);
    c.read_u32().ok()
}

/// Reinterpret `bytes` as a little/big-endian `i32`, per `endianness`.
pub fn decode_i32(bytes: &[u8], endianness: Endianness) -> Option<i32> {
    decode_u32(bytes, endianness).map(|v| v as i32)
}

/// Reinterpret `bytes` as a little/big-endian `f32`, per `endianness`.
pub fn decode_f32(bytes: &[u8], endianness: Endianness) -> Option<f32> {
    decode_u32(bytes, endianness).map(f32::from_bits)
}

/// Reinterpret `bytes` as a little/big-endian `f64`, per `endianness`.
pub fn decode_f64(bytes: &[u8], endianness: Endianness) -> Option<f64> {
    if bytes.len() < 8 {
        return None;
    }
    let mut c = Cursor::new(&bytes[0..8], endianness);
    c.read_f64().ok()
}

/// Encode a `u16` under the given endianness.
pub fn encode_u16(value: u16, endianness: Endianness) -> Vec<u8> {
    let mut w = crate::cursor::ByteWriter::new(endianness);
    w.write_u16(value);
    w.into_vec()
}

/// Encode a `u32` under the given endianness.
pub fn encode_u32(value: u32, endianness: Endianness) -> Vec<u8> {
    let mut w = crate::cursor::ByteWriter::new(endianness);
    w.write_u32(value);
    w.into_vec()
}

/// Encode an `i16` under the given endianness.
pub fn encode_i16(value: i16, endianness: Endianness) -> Vec<u8> {
    let mut w = crate::cursor::ByteWriter::new(endianness);
    w.write_i16(value);
    w.into_vec()
}

/// Encode an `i32` under the given endianness.
pub fn encode_i32(value: i32, endianness: Endianness) -> Vec<u8> {
    let mut w = crate::cursor::ByteWriter::new(endianness);
    w.write_i32(value);
    w.into_vec()
}

/// Encode an `f32` under the given endianness.
pub fn encode_f32(value: f32, endianness: Endianness) -> Vec<u8> {
    let mut w = crate::cursor::ByteWriter::new(endianness);
    w.write_f32(value);
    w.into_vec()
}

/// Encode an `f64` under the given endianness.
pub fn encode_f64(value: f64, endianness: Endianness) -> Vec<u8> {
    let mut w = crate::cursor::ByteWriter::new(endianness);
    w.write_f64(value);
    w.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_space_and_nul_padding() {
        assert_eq!(decode_text(b"Doe^John "), "Doe^John");
        assert_eq!(decode_text(b"1.2.3\0"), "1.2.3");
    }

    #[test]
    fn splits_and_joins_multi_values() {
        assert_eq!(split_multi("1\\2\\3"), vec!["1", "2", "3"]);
        assert_eq!(join_multi(["1", "2", "3"]), b"1\\2\\3".to_vec());
    }

    #[test]
    fn pads_odd_length_text() {
        let bytes = encode_text("Doe^John", VR::PN);
        assert_eq!(bytes.len() % 2, 0);
        assert_eq!(bytes, b"Doe^John".to_vec());

        let bytes = encode_text("ID123456789", VR::LO);
        assert_eq!(bytes.len() % 2, 0);
        assert_eq!(bytes.last(), Some(&b' '));
    }

    #[test]
    fn ui_pads_with_nul() {
        let bytes = encode_text("1.2.3", VR::UI);
        assert_eq!(bytes.last(), Some(&0u8));
    }

    #[test]
    fn numeric_round_trip_both_endiannesses() {
        for e in [Endianness::Little, Endianness::Big] {
            let bytes = encode_u32(0x1234_5678, e);
            assert_eq!(decode_u32(&bytes, e), Some(0x1234_5678));
        }
    }
}
