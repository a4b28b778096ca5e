//! Transfer syntax descriptors: the `(endianness, VR mode)` pair a UID in
//! `(0002,0010)` resolves to, used by both the parser and the serializer so
//! the element dispatch logic in each is written once.

use byteordered::Endianness;

/// Whether elements in a stream carry their VR explicitly or must have it
/// resolved from the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VrMode {
    /// The VR is read from the stream.
    Explicit,
    /// The VR must be looked up in the dictionary.
    Implicit,
}

/// The codec parameters selected by a transfer syntax UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSyntax {
    /// The transfer syntax UID.
    pub uid: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Byte order used by the body data set.
    pub endianness: Endianness,
    /// Explicit or implicit VR.
    pub vr_mode: VrMode,
    /// Whether the body octet stream is deflate-compressed after the file
    /// meta group.
    pub deflated: bool,
}

impl TransferSyntax {
    /// Implicit VR Little Endian (`1.2.840.10008.1.2`), the default
    /// transfer syntax of the DICOM standard.
    pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2",
        name: "Implicit VR Little Endian",
        endianness: Endianness::Little,
        vr_mode: VrMode::Implicit,
        deflated: false,
    };

    /// Explicit VR Little Endian (`1.2.840.10008.1.2.1`).
    pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2.1",
        name: "Explicit VR Little Endian",
        endianness: Endianness::Little,
        vr_mode: VrMode::Explicit,
        deflated: false,
    };

    /// Deflated Explicit VR Little Endian (`1.2.840.10008.1.2.1.99`).
    pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2.1.99",
        name: "Deflated Explicit VR Little Endian",
        endianness: Endianness::Little,
        vr_mode: VrMode::Explicit,
        deflated: true,
    };

    /// Explicit VR Big Endian (`1.2.840.10008.1.2.2`, retired but still
    /// required reading).
    pub const EXPLICIT_VR_BIG_ENDIAN: TransferSyntax = TransferSyntax {
        uid: "1.2.840.10008.1.2.2",
        name: "Explicit VR Big Endian",
        endianness: Endianness::Big,
        vr_mode: VrMode::Explicit,
        deflated: false,
    };

    /// All transfer syntaxes this codec knows how to read and write.
    pub const ALL: &'static [TransferSyntax] = &[
        TransferSyntax::IMPLICIT_VR_LITTLE_ENDIAN,
        TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN,
        TransferSyntax::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
        TransferSyntax::EXPLICIT_VR_BIG_ENDIAN,
    ];
}

/// Resolve a transfer syntax UID to its codec parameters.
///
/// The UID may or may not carry the trailing NUL padding byte used on the
/// wire; both forms resolve identically.
pub fn by_uid(uid: &str) -> Option<&'static TransferSyntax> {
    let trimmed = uid.trim_end_matches('\0').trim_end();
    TransferSyntax::ALL.iter().find(|ts| ts.uid == trimmed)
}
