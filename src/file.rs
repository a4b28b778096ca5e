//! The top-level façade: [`File`] ties together the parser, serializer, and
//! file-meta synthesis behind the narrow surface external callers use.

use crate::cursor::ByteWriter;
use crate::dataset::DataSet;
use crate::error::Result;
use crate::header::{Tag, VR};
use crate::parser::{self, ParseOptions, ParsedFile};
use crate::transfer_syntax::{TransferSyntax, VrMode};
use crate::uid::UidGenerator;
use byteordered::Endianness;

/// This implementation's class UID, reported in `(0002,0012)` for files this
/// crate creates.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.1";
/// This implementation's version name, reported in `(0002,0013)`.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DICOM-CODEC-1.0";

/// A complete DICOM file: preamble, file meta group, governing transfer
/// syntax, body data set, and any warnings raised while reading it.
#[derive(Debug, Clone)]
pub struct File {
    preamble: [u8; 128],
    file_meta: DataSet,
    transfer_syntax_uid: String,
    data_set: DataSet,
    warnings: Vec<crate::error::Warning>,
}

impl File {
    /// Parse a complete DICOM stream, per [`ParseOptions::default`].
    pub fn read(bytes: &[u8]) -> Result<File> {
        File::read_with_options(bytes, ParseOptions::default())
    }

    /// Parse a complete DICOM stream under explicit [`ParseOptions`].
    pub fn read_with_options(bytes: &[u8], options: ParseOptions) -> Result<File> {
        let ParsedFile {
            preamble,
            file_meta,
            transfer_syntax_uid,
            data_set,
            warnings,
        } = parser::parse_with_options(bytes, options)?;
        Ok(File {
            preamble,
            file_meta,
            transfer_syntax_uid,
            data_set,
            warnings,
        })
    }

    /// Build a new file around `data_set`, synthesizing a file meta group.
    ///
    /// Any of `sop_class_uid`, `sop_instance_uid`, `transfer_syntax_uid` left
    /// unset are filled in: the SOP Instance UID from
    /// [`UidGenerator::shared`], and the transfer syntax from
    /// [`TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN`]. `sop_class_uid` has no
    /// safe default and is left empty (`""`) if not supplied — callers that
    /// need a conformant SOP Class UID must provide one.
    pub fn create(
        data_set: DataSet,
        sop_class_uid: Option<&str>,
        sop_instance_uid: Option<&str>,
        transfer_syntax_uid: Option<&str>,
    ) -> File {
        let sop_class_uid = sop_class_uid.unwrap_or("").to_owned();
        let sop_instance_uid = sop_instance_uid
            .map(str::to_owned)
            .unwrap_or_else(|| UidGenerator::shared().generate_sop_instance_uid());
        let transfer_syntax_uid = transfer_syntax_uid
            .unwrap_or(TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN.uid)
            .to_owned();

        let file_meta = build_file_meta(&sop_class_uid, &sop_instance_uid, &transfer_syntax_uid);

        File {
            preamble: [0u8; 128],
            file_meta,
            transfer_syntax_uid,
            data_set,
            warnings: Vec::new(),
        }
    }

    /// The file meta group (group 0002), always Explicit VR Little Endian.
    pub fn file_meta(&self) -> &DataSet {
        &self.file_meta
    }

    /// The transfer syntax UID governing the body.
    pub fn transfer_syntax_uid(&self) -> &str {
        &self.transfer_syntax_uid
    }

    /// The body data set.
    pub fn data_set(&self) -> &DataSet {
        &self.data_set
    }

    /// Mutable access to the body data set.
    pub fn data_set_mut(&mut self) -> &mut DataSet {
        &mut self.data_set
    }

    /// Non-fatal oddities encountered while reading this file.
    pub fn warnings(&self) -> &[crate::error::Warning] {
        &self.warnings
    }

    /// Serialize this file back to bytes under its recorded transfer
    /// syntax.
    pub fn write(&self) -> Result<Vec<u8>> {
        let ts = crate::transfer_syntax::by_uid(&self.transfer_syntax_uid)
            .copied()
            .unwrap_or(TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN);
        crate::encode::write(&self.preamble, &self.file_meta, &self.data_set, &ts)
    }
}

/// Build a file meta group with `(0002,0000)` computed to match the bytes
/// that follow it (I3).
fn build_file_meta(sop_class_uid: &str, sop_instance_uid: &str, transfer_syntax_uid: &str) -> DataSet {
    let mut meta = DataSet::with_endianness(Endianness::Little);
    meta.insert(crate::dataset::DataElement::primitive(
        Tag(0x0002, 0x0001),
        VR::OB,
        vec![0x00, 0x01],
    ));
    meta.set_string(Tag(0x0002, 0x0002), VR::UI, sop_class_uid);
    meta.set_string(Tag(0x0002, 0x0003), VR::UI, sop_instance_uid);
    meta.set_string(Tag(0x0002, 0x0010), VR::UI, transfer_syntax_uid);
    meta.set_string(Tag(0x0002, 0x0012), VR::UI, IMPLEMENTATION_CLASS_UID);
    meta.set_string(Tag(0x0002, 0x0013), VR::SH, IMPLEMENTATION_VERSION_NAME);

    let group_length = file_meta_byte_length(&meta);
    meta.set_uint32(Tag(0x0002, 0x0000), group_length);
    meta
}

/// The serialized byte length of every element of `meta` (all of group
/// 0002 except the group-length element itself, which has not been
/// inserted yet when this is called).
fn file_meta_byte_length(meta: &DataSet) -> u32 {
    let mut w = ByteWriter::new(Endianness::Little);
    crate::encode::write_elements(&mut w, meta, VrMode::Explicit).expect("file meta values are always well-formed");
    w.into_vec().len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_synthesizes_a_consistent_file_meta_group() {
        let ds = DataSet::new();
        let file = File::create(ds, Some("1.2.840.10008.5.1.4.1.1.7"), None, None);
        assert_eq!(
            file.file_meta().string(Tag(0x0002, 0x0002)).unwrap(),
            "1.2.840.10008.5.1.4.1.1.7"
        );
        assert!(file.file_meta().uint32(Tag(0x0002, 0x0000)).unwrap() > 0);
        assert_eq!(file.transfer_syntax_uid(), TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN.uid);
    }

    #[test]
    fn round_trips_through_write_then_read() {
        let mut ds = DataSet::new();
        ds.set_string(Tag(0x0010, 0x0010), VR::PN, "Doe^John");
        ds.set_string(Tag(0x0010, 0x0020), VR::LO, "ID1");
        ds.set_string(Tag(0x0008, 0x0020), VR::DA, "20250131");
        ds.set_uint16(Tag(0x0028, 0x0010), 512);
        ds.set_uint16(Tag(0x0028, 0x0011), 512);

        let file = File::create(ds, Some("1.2.840.10008.5.1.4.1.1.7"), None, None);
        let bytes = file.write().unwrap();

        let parsed = File::read(&bytes).unwrap();
        assert_eq!(parsed.transfer_syntax_uid(), TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN.uid);
        assert_eq!(parsed.data_set().string(Tag(0x0010, 0x0010)).unwrap(), "Doe^John");
        assert_eq!(parsed.data_set().string(Tag(0x0010, 0x0020)).unwrap(), "ID1");
        assert_eq!(parsed.data_set().uint16(Tag(0x0028, 0x0010)), Some(512));
    }
}
