//! The DICOM stream serializer: the inverse of [`crate::parser`].

use crate::cursor::ByteWriter;
use crate::dataset::{DataElement, DataSet, SequenceItem};
use crate::error::{Result, ValueTooLongSnafu};
use crate::header::{HeaderClass, Length, Tag, VR};
use crate::transfer_syntax::{TransferSyntax, VrMode};
use byteordered::Endianness;
use snafu::ensure;
use std::io::Write;

/// Serialize a complete DICOM stream: preamble, magic, file meta group
/// (always Explicit VR Little Endian), then the body under `transfer_syntax`.
pub fn write(preamble: &[u8; 128], file_meta: &DataSet, data_set: &DataSet, transfer_syntax: &TransferSyntax) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4096);
    out.extend_from_slice(preamble);
    out.extend_from_slice(b"DICM");

    tracing::debug!("serializing file meta group");
    write_dataset(&mut out, file_meta, VrMode::Explicit, Endianness::Little)?;

    tracing::debug!(uid = transfer_syntax.uid, "serializing body");
    let mut body = ByteWriter::new(transfer_syntax.endianness);
    write_elements(&mut body, data_set, transfer_syntax.vr_mode)?;
    let body_bytes = body.into_vec();

    if transfer_syntax.deflated {
        let mut encoder = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&body_bytes)?;
        out.extend_from_slice(&encoder.finish()?);
    } else {
        out.extend_from_slice(&body_bytes);
    }

    Ok(out)
}

fn write_dataset(out: &mut Vec<u8>, ds: &DataSet, vr_mode: VrMode, endianness: Endianness) -> Result<()> {
    let mut w = ByteWriter::new(endianness);
    write_elements(&mut w, ds, vr_mode)?;
    out.extend_from_slice(&w.into_vec());
    Ok(())
}

/// Write every element of `ds` in ascending tag order (P2), as guaranteed
/// by [`DataSet`]'s iteration order.
pub(crate) fn write_elements(w: &mut ByteWriter, ds: &DataSet, vr_mode: VrMode) -> Result<()> {
    for element in ds.iter() {
        write_element(w, element, vr_mode)?;
    }
    Ok(())
}

fn write_element(w: &mut ByteWriter, element: &DataElement, vr_mode: VrMode) -> Result<()> {
    write_tag(w, element.tag());

    if let Some(items) = element.items() {
        write_sequence(w, element.vr(), items, vr_mode)?;
        return Ok(());
    }

    if let Some(fragments) = element.fragments() {
        write_fragments(w, element.vr(), fragments, vr_mode)?;
        return Ok(());
    }

    validate_length(element)?;

    match vr_mode {
        VrMode::Explicit => {
            w.write_bytes(&element.vr().to_bytes());
            match element.vr().header_class() {
                HeaderClass::Long => {
                    w.write_bytes(&[0, 0]);
                    w.write_u32(element.value_bytes().len() as u32);
                }
                HeaderClass::Short => {
                    w.write_u16(element.value_bytes().len() as u16);
                }
            }
        }
        VrMode::Implicit => {
            w.write_u32(element.value_bytes().len() as u32);
        }
    }
    w.write_bytes(element.value_bytes());
    Ok(())
}

fn validate_length(element: &DataElement) -> Result<()> {
    if let Some(limit) = element.vr().max_length() {
        ensure!(
            element.value_bytes().len() as u32 <= limit,
            ValueTooLongSnafu {
                tag: element.tag(),
                vr: element.vr(),
                limit,
            }
        );
    }
    Ok(())
}

/// Write a sequence element's items.
///
/// Per §4.4: the serializer chooses defined-length framing whenever every
/// item's serialized byte length is known up front, which is always true
/// here since items are in-memory data sets. Each item is serialized first
/// so the total byte count can be declared in the SQ element's own length,
/// and no `SequenceDelimitationItem` is emitted (it is only needed to
/// terminate undefined-length framing, which this function never produces).
fn write_sequence(w: &mut ByteWriter, vr: VR, items: &[SequenceItem], vr_mode: VrMode) -> Result<()> {
    let mut item_byte_runs = Vec::with_capacity(items.len());
    for item in items {
        let mut item_writer = ByteWriter::new(w.endianness());
        write_elements(&mut item_writer, item, vr_mode)?;
        item_byte_runs.push(item_writer.into_vec());
    }
    let total_len: u32 = item_byte_runs.iter().map(|bytes| 8 + bytes.len() as u32).sum();

    if vr_mode == VrMode::Explicit {
        w.write_bytes(&vr.to_bytes());
        w.write_bytes(&[0, 0]);
        w.write_u32(total_len);
    } else {
        w.write_u32(total_len);
    }

    for item_bytes in &item_byte_runs {
        write_tag(w, Tag::ITEM);
        w.write_u32(item_bytes.len() as u32);
        w.write_bytes(item_bytes);
    }

    Ok(())
}

/// Write encapsulated pixel data's fragments (§4.3): always undefined
/// length, each fragment framed by a flat `Item` tag + defined 4-byte
/// length with no element structure inside. `fragments[0]` is the Basic
/// Offset Table.
fn write_fragments(w: &mut ByteWriter, vr: VR, fragments: &[Vec<u8>], vr_mode: VrMode) -> Result<()> {
    if vr_mode == VrMode::Explicit {
        w.write_bytes(&vr.to_bytes());
        w.write_bytes(&[0, 0]);
        w.write_u32(Length::UNDEFINED.0);
    } else {
        w.write_u32(Length::UNDEFINED.0);
    }

    for fragment in fragments {
        write_tag(w, Tag::ITEM);
        w.write_u32(fragment.len() as u32);
        w.write_bytes(fragment);
    }

    write_tag(w, Tag::SEQUENCE_DELIMITATION);
    w.write_u32(0);
    Ok(())
}

fn write_tag(w: &mut ByteWriter, tag: Tag) {
    w.write_u16(tag.group());
    w.write_u16(tag.element());
}
