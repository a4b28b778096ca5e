//! The DICOM stream parser: bytes in, a [`ParsedFile`] out.
//!
//! This module implements one generic element reader parameterized by
//! `(Endianness, VrMode)`, used for both the file meta group (always
//! Explicit VR Little Endian) and the body (whichever transfer syntax was
//! declared), per the "implicit/explicit duality" design note.

use crate::cursor::Cursor;
use crate::dataset::{DataElement, DataSet, SequenceItem};
use crate::dictionary;
use crate::error::{
    Error, Result, TruncatedInputSnafu, UnbalancedSequenceSnafu, UnknownTransferSyntaxSnafu,
};
use crate::header::{Length, Tag, VR};
use crate::transfer_syntax::{self, TransferSyntax, VrMode};
use byteordered::Endianness;
use snafu::ensure;
use std::io::Read;

const MAGIC: &[u8; 4] = b"DICM";
const PREAMBLE_LEN: usize = 128;

/// Options controlling how tolerant the parser is of non-conformant input.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// When `true`, an unrecognized transfer syntax UID is a hard error
    /// instead of a silent downgrade to Explicit VR Little Endian.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { strict: false }
    }
}

/// The result of parsing a complete DICOM stream.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// The 128-byte preamble, preserved verbatim (all zero if the stream
    /// was parsed via the headerless fallback).
    pub preamble: [u8; PREAMBLE_LEN],
    /// The file meta group (group 0002), always Explicit VR Little Endian.
    pub file_meta: DataSet,
    /// The transfer syntax UID that governed the body, as found in
    /// `(0002,0010)` (or the Explicit VR Little Endian default).
    pub transfer_syntax_uid: String,
    /// The body data set.
    pub data_set: DataSet,
    /// Non-fatal oddities encountered while parsing.
    pub warnings: Vec<crate::error::Warning>,
}

/// Parse a complete DICOM stream per [`ParseOptions::default`].
pub fn parse(bytes: &[u8]) -> Result<ParsedFile> {
    parse_with_options(bytes, ParseOptions::default())
}

/// Parse a complete DICOM stream.
pub fn parse_with_options(bytes: &[u8], options: ParseOptions) -> Result<ParsedFile> {
    let mut warnings = Vec::new();

    let has_magic = bytes.len() >= PREAMBLE_LEN + 4 && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + 4] == MAGIC;

    if !has_magic {
        return parse_headerless(bytes, &mut warnings);
    }

    let mut preamble = [0u8; PREAMBLE_LEN];
    preamble.copy_from_slice(&bytes[..PREAMBLE_LEN]);

    let mut cursor = Cursor::new(&bytes[PREAMBLE_LEN + 4..], Endianness::Little);
    let file_meta = parse_file_meta(&mut cursor)?;

    let transfer_syntax_uid = file_meta
        .string(crate::header::Tag(0x0002, 0x0010))
        .map(|s| s.into_owned())
        .unwrap_or_else(|| TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN.uid.to_owned());

    let ts = match transfer_syntax::by_uid(&transfer_syntax_uid) {
        Some(ts) => *ts,
        None => {
            ensure!(
                !options.strict,
                UnknownTransferSyntaxSnafu {
                    uid: transfer_syntax_uid.clone(),
                }
            );
            warnings.push(crate::error::Warning::UnknownTransferSyntax {
                uid: transfer_syntax_uid.clone(),
            });
            tracing::warn!(uid = %transfer_syntax_uid, "unknown transfer syntax, defaulting to Explicit VR LE");
            TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN
        }
    };
    tracing::debug!(uid = ts.uid, "resolved body transfer syntax");

    let remaining = &bytes[PREAMBLE_LEN + 4 + cursor.position()..];
    let inflated;
    let body_bytes: &[u8] = if ts.deflated {
        inflated = inflate(remaining)?;
        &inflated
    } else {
        remaining
    };

    let mut body_cursor = Cursor::new(body_bytes, ts.endianness);
    let data_set = parse_dataset_body(&mut body_cursor, ts.vr_mode, ts.endianness, &mut warnings)?;

    Ok(ParsedFile {
        preamble,
        file_meta,
        transfer_syntax_uid,
        data_set,
        warnings,
    })
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::DeflateDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

fn parse_headerless(bytes: &[u8], warnings: &mut Vec<crate::error::Warning>) -> Result<ParsedFile> {
    let mut cursor = Cursor::new(bytes, Endianness::Little);
    let data_set = parse_dataset_body(&mut cursor, VrMode::Implicit, Endianness::Little, warnings)
        .map_err(|_| Error::InvalidPreamble { backtrace: None })?;
    warnings.push(crate::error::Warning::HeaderlessFallback);
    tracing::warn!("no DICM magic code found, parsed as headerless implicit VR LE");
    Ok(ParsedFile {
        preamble: [0u8; PREAMBLE_LEN],
        file_meta: DataSet::new(),
        transfer_syntax_uid: TransferSyntax::IMPLICIT_VR_LITTLE_ENDIAN.uid.to_owned(),
        data_set,
        warnings: std::mem::take(warnings),
    })
}

fn parse_file_meta(cursor: &mut Cursor<'_>) -> Result<DataSet> {
    let mut ds = DataSet::with_endianness(Endianness::Little);
    while cursor.remaining() >= 4 {
        let group = u16::from_le_bytes(cursor.peek(2)?.try_into().unwrap());
        if group != 0x0002 {
            break;
        }
        let tag = read_tag(cursor)?;
        let element = parse_element_after_tag(tag, cursor, VrMode::Explicit, &mut Vec::new())?;
        ds.insert(element);
    }
    Ok(ds)
}

pub(crate) fn parse_dataset_body(
    cursor: &mut Cursor<'_>,
    vr_mode: VrMode,
    endianness: Endianness,
    warnings: &mut Vec<crate::error::Warning>,
) -> Result<DataSet> {
    let mut ds = DataSet::with_endianness(endianness);
    while cursor.remaining() > 0 {
        let tag = read_tag(cursor)?;
        let element = parse_element_after_tag(tag, cursor, vr_mode, warnings)?;
        ds.insert(element);
    }
    Ok(ds)
}

fn read_tag(cursor: &mut Cursor<'_>) -> Result<Tag> {
    let group = cursor.read_u16()?;
    let element = cursor.read_u16()?;
    Ok(Tag(group, element))
}

/// Parse one element's VR/length/value, given its tag has already been
/// consumed. Framing markers (`Item`, `ItemDelimitationItem`,
/// `SequenceDelimitationItem`) are never passed here — the sequence/item
/// framing loops below intercept them directly after reading the tag.
fn parse_element_after_tag(
    tag: Tag,
    cursor: &mut Cursor<'_>,
    vr_mode: VrMode,
    warnings: &mut Vec<crate::error::Warning>,
) -> Result<DataElement> {
    let (vr, length) = match vr_mode {
        VrMode::Explicit => {
            let vr_bytes = cursor.read(2)?;
            let raw = [vr_bytes[0], vr_bytes[1]];
            let vr = match VR::from_binary(raw) {
                Some(vr) => vr,
                None => {
                    warnings.push(crate::error::Warning::UnknownVr { tag, bytes: raw });
                    tracing::warn!(%tag, "unrecognized VR, demoted to UN");
                    VR::UN
                }
            };
            let length = match vr.header_class() {
                crate::header::HeaderClass::Long => {
                    cursor.read(2)?; // reserved
                    Length(cursor.read_u32()?)
                }
                crate::header::HeaderClass::Short => Length(cursor.read_u16()? as u32),
            };
            (vr, length)
        }
        VrMode::Implicit => {
            let length = Length(cursor.read_u32()?);
            let vr = dictionary::by_tag(tag)
                .map(|e| e.implicit_vr())
                .unwrap_or(VR::UN);
            (vr, length)
        }
    };

    if vr == VR::SQ {
        let items = parse_sequence_value(tag, cursor, vr_mode, length, warnings)?;
        return Ok(DataElement::sequence_with_vr(tag, vr, length, items));
    }

    if length.is_undefined() {
        // Undefined length on a non-SQ element is encapsulated pixel data
        // (§4.3): its items are opaque fragments, never nested elements.
        let fragments = parse_fragments(tag, cursor)?;
        return Ok(DataElement::fragments_with_vr(tag, vr, fragments));
    }

    let bytes = cursor.read(length.0 as usize)?;
    Ok(DataElement::primitive(tag, vr, bytes.to_vec()))
}

/// Parse the items of encapsulated pixel data: each item is a flat `Item`
/// tag + defined-length raw byte run, with no element structure inside.
/// `fragments[0]` is the Basic Offset Table.
fn parse_fragments(tag: Tag, cursor: &mut Cursor<'_>) -> Result<Vec<Vec<u8>>> {
    let mut fragments = Vec::new();
    loop {
        ensure!(
            cursor.remaining() >= 8,
            TruncatedInputSnafu {
                need: 8usize,
                have: cursor.remaining(),
                at_offset: cursor.position(),
            }
        );
        let marker = read_tag(cursor)?;
        if marker == Tag::SEQUENCE_DELIMITATION {
            let len = cursor.read_u32()?;
            ensure!(
                len == 0,
                UnbalancedSequenceSnafu {
                    tag,
                    reason: "sequence delimitation item carried a non-zero length",
                }
            );
            break;
        }
        ensure!(
            marker == Tag::ITEM,
            UnbalancedSequenceSnafu {
                tag,
                reason: format!("expected Item or SequenceDelimitationItem, found {marker}"),
            }
        );
        let item_len = cursor.read_u32()?;
        ensure!(
            item_len != Length::UNDEFINED.0,
            UnbalancedSequenceSnafu {
                tag,
                reason: "a pixel data fragment cannot itself have undefined length",
            }
        );
        let bytes = cursor.read(item_len as usize)?;
        fragments.push(bytes.to_vec());
    }
    Ok(fragments)
}

fn parse_sequence_value(
    tag: Tag,
    cursor: &mut Cursor<'_>,
    vr_mode: VrMode,
    length: Length,
    warnings: &mut Vec<crate::error::Warning>,
) -> Result<Vec<SequenceItem>> {
    match length.defined() {
        Some(len) => {
            let mut inner = cursor.bounded(len as usize)?;
            let mut items = Vec::new();
            while inner.remaining() > 0 {
                items.push(parse_one_item(&mut inner, vr_mode, warnings)?);
            }
            Ok(items)
        }
        None => {
            let mut items = Vec::new();
            loop {
                ensure!(
                    cursor.remaining() >= 8,
                    TruncatedInputSnafu {
                        need: 8usize,
                        have: cursor.remaining(),
                        at_offset: cursor.position(),
                    }
                );
                let marker = read_tag(cursor)?;
                if marker == Tag::SEQUENCE_DELIMITATION {
                    let len = cursor.read_u32()?;
                    ensure!(
                        len == 0,
                        UnbalancedSequenceSnafu {
                            tag,
                            reason: "sequence delimitation item carried a non-zero length",
                        }
                    );
                    break;
                }
                ensure!(
                    marker == Tag::ITEM,
                    UnbalancedSequenceSnafu {
                        tag,
                        reason: format!("expected Item or SequenceDelimitationItem, found {marker}"),
                    }
                );
                let item_len = Length(cursor.read_u32()?);
                items.push(parse_item_body(tag, cursor, vr_mode, item_len, warnings)?);
            }
            Ok(items)
        }
    }
}

fn parse_one_item(
    cursor: &mut Cursor<'_>,
    vr_mode: VrMode,
    warnings: &mut Vec<crate::error::Warning>,
) -> Result<SequenceItem> {
    let item_tag = read_tag(cursor)?;
    ensure!(
        item_tag == Tag::ITEM,
        UnbalancedSequenceSnafu {
            tag: item_tag,
            reason: "expected an Item tag to start a sequence entry",
        }
    );
    let item_len = Length(cursor.read_u32()?);
    parse_item_body(item_tag, cursor, vr_mode, item_len, warnings)
}

fn parse_item_body(
    owner_tag: Tag,
    cursor: &mut Cursor<'_>,
    vr_mode: VrMode,
    item_len: Length,
    warnings: &mut Vec<crate::error::Warning>,
) -> Result<SequenceItem> {
    match item_len.defined() {
        Some(len) => {
            let mut inner = cursor.bounded(len as usize)?;
            let mut ds = DataSet::with_endianness(cursor.endianness());
            while inner.remaining() > 0 {
                let tag = read_tag(&mut inner)?;
                let element = parse_element_after_tag(tag, &mut inner, vr_mode, warnings)?;
                ds.insert(element);
            }
            Ok(ds)
        }
        None => {
            let mut ds = DataSet::with_endianness(cursor.endianness());
            loop {
                ensure!(
                    cursor.remaining() >= 8,
                    TruncatedInputSnafu {
                        need: 8usize,
                        have: cursor.remaining(),
                        at_offset: cursor.position(),
                    }
                );
                let tag = read_tag(cursor)?;
                if tag == Tag::ITEM_DELIMITATION {
                    let len = cursor.read_u32()?;
                    ensure!(
                        len == 0,
                        UnbalancedSequenceSnafu {
                            tag: owner_tag,
                            reason: "item delimitation item carried a non-zero length",
                        }
                    );
                    break;
                }
                let element = parse_element_after_tag(tag, cursor, vr_mode, warnings)?;
                ds.insert(element);
            }
            Ok(ds)
        }
    }
}
