//! The static DICOM attribute and UID dictionaries.
//!
//! These are built once, behind a [`once_cell::sync::Lazy`], exactly as the
//! standard dictionary crate this module is derived from does — a flat
//! `&'static [Entry]` array indexed into a couple of `HashMap`s on first use.

use crate::header::{Tag, VR};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One row of the attribute dictionary: a standard tag's name, keyword, and
/// the VR(s) it is allowed to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// The attribute's tag.
    pub tag: Tag,
    /// Human-readable name, e.g. `"Patient's Name"`.
    pub name: &'static str,
    /// Programmatic keyword, e.g. `"PatientName"`.
    pub keyword: &'static str,
    /// Allowed value representations, in preference order. The first is
    /// used to resolve implicit-VR elements.
    pub vrs: &'static [VR],
}

impl Entry {
    /// The VR to use when decoding this tag in implicit-VR mode.
    pub fn implicit_vr(&self) -> VR {
        self.vrs[0]
    }
}

macro_rules! entry {
    ($group:expr, $elem:expr, $name:expr, $keyword:expr, [$($vr:ident),+]) => {
        Entry {
            tag: Tag($group, $elem),
            name: $name,
            keyword: $keyword,
            vrs: &[$(VR::$vr),+],
        }
    };
}

/// The full set of built-in standard attribute entries.
///
/// This is a representative subset of PS3.6 covering the attributes this
/// codec's tests and typed accessors depend on, rather than an exhaustive
/// transcription of the standard (which runs to several thousand rows in
/// the upstream dictionary).
pub static ENTRIES: &[Entry] = &[
    entry!(0x0000, 0x0000, "Group Length", "GenericGroupLength", [UL]),
    entry!(0x0002, 0x0000, "File Meta Information Group Length", "FileMetaInformationGroupLength", [UL]),
    entry!(0x0002, 0x0001, "File Meta Information Version", "FileMetaInformationVersion", [OB]),
    entry!(0x0002, 0x0002, "Media Storage SOP Class UID", "MediaStorageSOPClassUID", [UI]),
    entry!(0x0002, 0x0003, "Media Storage SOP Instance UID", "MediaStorageSOPInstanceUID", [UI]),
    entry!(0x0002, 0x0010, "Transfer Syntax UID", "TransferSyntaxUID", [UI]),
    entry!(0x0002, 0x0012, "Implementation Class UID", "ImplementationClassUID", [UI]),
    entry!(0x0002, 0x0013, "Implementation Version Name", "ImplementationVersionName", [SH]),
    entry!(0x0002, 0x0016, "Source Application Entity Title", "SourceApplicationEntityTitle", [AE]),
    entry!(0x0008, 0x0005, "Specific Character Set", "SpecificCharacterSet", [CS]),
    entry!(0x0008, 0x0008, "Image Type", "ImageType", [CS]),
    entry!(0x0008, 0x0016, "SOP Class UID", "SOPClassUID", [UI]),
    entry!(0x0008, 0x0018, "SOP Instance UID", "SOPInstanceUID", [UI]),
    entry!(0x0008, 0x0020, "Study Date", "StudyDate", [DA]),
    entry!(0x0008, 0x0021, "Series Date", "SeriesDate", [DA]),
    entry!(0x0008, 0x0023, "Content Date", "ContentDate", [DA]),
    entry!(0x0008, 0x0030, "Study Time", "StudyTime", [TM]),
    entry!(0x0008, 0x0050, "Accession Number", "AccessionNumber", [SH]),
    entry!(0x0008, 0x0060, "Modality", "Modality", [CS]),
    entry!(0x0008, 0x0070, "Manufacturer", "Manufacturer", [LO]),
    entry!(0x0008, 0x0080, "Institution Name", "InstitutionName", [LO]),
    entry!(0x0008, 0x0090, "Referring Physician's Name", "ReferringPhysicianName", [PN]),
    entry!(0x0008, 0x1030, "Study Description", "StudyDescription", [LO]),
    entry!(0x0008, 0x103E, "Series Description", "SeriesDescription", [LO]),
    entry!(0x0008, 0x1032, "Procedure Code Sequence", "ProcedureCodeSequence", [SQ]),
    entry!(0x0008, 0x1115, "Referenced Series Sequence", "ReferencedSeriesSequence", [SQ]),
    entry!(0x0008, 0x1140, "Referenced Image Sequence", "ReferencedImageSequence", [SQ]),
    entry!(0x0010, 0x0010, "Patient's Name", "PatientName", [PN]),
    entry!(0x0010, 0x0020, "Patient ID", "PatientID", [LO]),
    entry!(0x0010, 0x0030, "Patient's Birth Date", "PatientBirthDate", [DA]),
    entry!(0x0010, 0x0040, "Patient's Sex", "PatientSex", [CS]),
    entry!(0x0010, 0x1010, "Patient's Age", "PatientAge", [AS]),
    entry!(0x0010, 0x1030, "Patient's Weight", "PatientWeight", [DS]),
    entry!(0x0018, 0x0050, "Slice Thickness", "SliceThickness", [DS]),
    entry!(0x0018, 0x0060, "KVP", "KVP", [DS]),
    entry!(0x0018, 0x1020, "Software Versions", "SoftwareVersions", [LO]),
    entry!(0x0018, 0x1151, "X-Ray Tube Current", "XRayTubeCurrent", [IS]),
    entry!(0x0020, 0x000D, "Study Instance UID", "StudyInstanceUID", [UI]),
    entry!(0x0020, 0x000E, "Series Instance UID", "SeriesInstanceUID", [UI]),
    entry!(0x0020, 0x0010, "Study ID", "StudyID", [SH]),
    entry!(0x0020, 0x0011, "Series Number", "SeriesNumber", [IS]),
    entry!(0x0020, 0x0013, "Instance Number", "InstanceNumber", [IS]),
    entry!(0x0020, 0x0032, "Image Position (Patient)", "ImagePositionPatient", [DS]),
    entry!(0x0020, 0x0037, "Image Orientation (Patient)", "ImageOrientationPatient", [DS]),
    entry!(0x0020, 0x0052, "Frame of Reference UID", "FrameOfReferenceUID", [UI]),
    entry!(0x0028, 0x0002, "Samples per Pixel", "SamplesPerPixel", [US]),
    entry!(0x0028, 0x0004, "Photometric Interpretation", "PhotometricInterpretation", [CS]),
    entry!(0x0028, 0x0010, "Rows", "Rows", [US]),
    entry!(0x0028, 0x0011, "Columns", "Columns", [US]),
    entry!(0x0028, 0x0030, "Pixel Spacing", "PixelSpacing", [DS]),
    entry!(0x0028, 0x0100, "Bits Allocated", "BitsAllocated", [US]),
    entry!(0x0028, 0x0101, "Bits Stored", "BitsStored", [US]),
    entry!(0x0028, 0x0102, "High Bit", "HighBit", [US]),
    entry!(0x0028, 0x0103, "Pixel Representation", "PixelRepresentation", [US, SS]),
    entry!(0x0028, 0x1050, "Window Center", "WindowCenter", [DS]),
    entry!(0x0028, 0x1051, "Window Width", "WindowWidth", [DS]),
    entry!(0x0028, 0x1052, "Rescale Intercept", "RescaleIntercept", [DS]),
    entry!(0x0028, 0x1053, "Rescale Slope", "RescaleSlope", [DS]),
    entry!(0x0040, 0xA030, "Verifying Observer Sequence", "VerifyingObserverSequence", [SQ]),
    entry!(0x7FE0, 0x0010, "Pixel Data", "PixelData", [OW, OB]),
];

struct Registry {
    by_tag: HashMap<Tag, &'static Entry>,
    by_keyword: HashMap<&'static str, &'static Entry>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut by_tag = HashMap::with_capacity(ENTRIES.len());
    let mut by_keyword = HashMap::with_capacity(ENTRIES.len());
    for entry in ENTRIES {
        by_tag.insert(entry.tag, entry);
        by_keyword.insert(entry.keyword, entry);
    }
    Registry { by_tag, by_keyword }
});

/// Look up a standard attribute by tag.
pub fn by_tag(tag: Tag) -> Option<&'static Entry> {
    REGISTRY.by_tag.get(&tag).copied()
}

/// Look up a standard attribute by its keyword (e.g. `"PatientName"`).
pub fn by_keyword(keyword: &str) -> Option<&'static Entry> {
    REGISTRY.by_keyword.get(keyword).copied()
}

/// What category a UID dictionary entry falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidCategory {
    /// A transfer syntax, usable in `(0002,0010)`.
    TransferSyntax,
    /// A SOP Class, usable in `(0008,0016)`.
    SopClass,
    /// A SOP Class specific to the file meta group, e.g. Media Storage
    /// Directory Storage.
    MetaSopClass,
    /// Any other well-known UID (e.g. the Verification SOP Class, coding
    /// schemes).
    Other,
}

/// One row of the UID dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UidEntry {
    /// The UID string itself.
    pub uid: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Programmatic keyword.
    pub keyword: &'static str,
    /// The UID's category.
    pub category: UidCategory,
}

macro_rules! uid_entry {
    ($uid:expr, $name:expr, $keyword:expr, $category:ident) => {
        UidEntry {
            uid: $uid,
            name: $name,
            keyword: $keyword,
            category: UidCategory::$category,
        }
    };
}

/// The built-in set of well-known UIDs.
pub static UID_ENTRIES: &[UidEntry] = &[
    uid_entry!("1.2.840.10008.1.1", "Verification SOP Class", "Verification", Other),
    uid_entry!("1.2.840.10008.1.2", "Implicit VR Little Endian", "ImplicitVRLittleEndian", TransferSyntax),
    uid_entry!("1.2.840.10008.1.2.1", "Explicit VR Little Endian", "ExplicitVRLittleEndian", TransferSyntax),
    uid_entry!("1.2.840.10008.1.2.1.99", "Deflated Explicit VR Little Endian", "DeflatedExplicitVRLittleEndian", TransferSyntax),
    uid_entry!("1.2.840.10008.1.2.2", "Explicit VR Big Endian", "ExplicitVRBigEndian", TransferSyntax),
    uid_entry!("1.2.840.10008.1.3.10", "Media Storage Directory Storage", "MediaStorageDirectoryStorage", MetaSopClass),
    uid_entry!("1.2.840.10008.5.1.4.1.1.1", "Computed Radiography Image Storage", "ComputedRadiographyImageStorage", SopClass),
    uid_entry!("1.2.840.10008.5.1.4.1.1.2", "CT Image Storage", "CTImageStorage", SopClass),
    uid_entry!("1.2.840.10008.5.1.4.1.1.4", "MR Image Storage", "MRImageStorage", SopClass),
    uid_entry!("1.2.840.10008.5.1.4.1.1.6.1", "Ultrasound Image Storage", "UltrasoundImageStorage", SopClass),
    uid_entry!("1.2.840.10008.5.1.4.1.1.7", "Secondary Capture Image Storage", "SecondaryCaptureImageStorage", SopClass),
    uid_entry!("1.2.840.10008.5.1.4.1.1.20", "Nuclear Medicine Image Storage", "NuclearMedicineImageStorage", SopClass),
    uid_entry!("1.2.840.10008.5.1.4.1.1.128", "Positron Emission Tomography Image Storage", "PositronEmissionTomographyImageStorage", SopClass),
];

static UID_REGISTRY: Lazy<HashMap<&'static str, &'static UidEntry>> = Lazy::new(|| {
    UID_ENTRIES.iter().map(|e| (e.uid, e)).collect()
});

/// Look up a well-known UID.
pub fn by_uid(uid: &str) -> Option<&'static UidEntry> {
    UID_REGISTRY.get(uid).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_patient_name_both_ways() {
        let by_tag = by_tag(Tag(0x0010, 0x0010)).expect("PatientName is standard");
        assert_eq!(by_tag.keyword, "PatientName");
        assert_eq!(by_tag.implicit_vr(), VR::PN);

        let by_kw = by_keyword("PatientName").expect("PatientName is standard");
        assert_eq!(by_kw.tag, Tag(0x0010, 0x0010));
    }

    #[test]
    fn multi_vr_entry_prefers_first() {
        let e = by_tag(Tag(0x0028, 0x0103)).unwrap();
        assert_eq!(e.vrs, &[VR::US, VR::SS]);
        assert_eq!(e.implicit_vr(), VR::US);
    }

    #[test]
    fn unknown_tag_is_absent() {
        assert!(by_tag(Tag(0x9999, 0x9999)).is_none());
    }

    #[test]
    fn transfer_syntax_uids_are_categorized() {
        let e = by_uid("1.2.840.10008.1.2.1").unwrap();
        assert_eq!(e.category, UidCategory::TransferSyntax);
        assert_eq!(e.keyword, "ExplicitVRLittleEndian");
    }
}
