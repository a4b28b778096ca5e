//! The single tagged error type returned by the codec's fallible operations.

use crate::header::Tag;
use snafu::{Backtrace, Snafu};

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All ways in which reading or writing a DICOM stream can fail.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Neither the `DICM` magic code nor a headerless implicit-VR data set
    /// could be recognized at the start of the stream.
    #[snafu(display("Not a recognizable DICOM stream (bad preamble)"))]
    InvalidPreamble { backtrace: Option<Backtrace> },

    /// The cursor ran out of bytes before satisfying a read.
    #[snafu(display(
        "Truncated input: needed {need} bytes, only {have} available at offset {at_offset}"
    ))]
    TruncatedInput {
        need: usize,
        have: usize,
        at_offset: usize,
        backtrace: Option<Backtrace>,
    },

    /// Two bytes which do not form a recognized VR code in strict mode.
    #[snafu(display("Invalid value representation {bytes:?} at offset {at_offset}"))]
    InvalidVr {
        bytes: [u8; 2],
        at_offset: usize,
        backtrace: Option<Backtrace>,
    },

    /// A sequence or item was not framed the way its header promised.
    #[snafu(display("Unbalanced sequence at {tag}: {reason}"))]
    UnbalancedSequence {
        tag: Tag,
        reason: String,
        backtrace: Option<Backtrace>,
    },

    /// An unrecognized transfer syntax UID, only raised in strict mode.
    #[snafu(display("Unknown transfer syntax {uid}"))]
    UnknownTransferSyntax {
        uid: String,
        backtrace: Option<Backtrace>,
    },

    /// A value exceeded the maximum length permitted by its VR on write.
    #[snafu(display("Value for {tag} (VR {vr}) exceeds the maximum length of {limit} bytes"))]
    ValueTooLong {
        tag: Tag,
        vr: crate::header::VR,
        limit: u32,
        backtrace: Option<Backtrace>,
    },

    /// Façade convenience wrapper around I/O, reserved for callers that
    /// perform their own file access around `File::read`/`write`.
    #[snafu(display("I/O error: {source}"))]
    Io {
        source: std::io::Error,
        backtrace: Option<Backtrace>,
    },
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            source,
            backtrace: None,
        }
    }
}

/// A non-fatal oddity encountered while parsing, surfaced on `File::warnings`
/// instead of aborting the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// `DICM` magic code was absent; the stream was parsed as a headerless
    /// implicit-VR little-endian data set instead.
    HeaderlessFallback,
    /// A VR code in the stream was not recognized and was demoted to `UN`.
    UnknownVr { tag: Tag, bytes: [u8; 2] },
    /// The transfer syntax UID in the file meta group was not recognized;
    /// Explicit VR Little Endian was assumed instead.
    UnknownTransferSyntax { uid: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::HeaderlessFallback => {
                write!(f, "no DICM magic code found, parsed as headerless implicit VR LE")
            }
            Warning::UnknownVr { tag, bytes } => {
                write!(f, "unrecognized VR {bytes:?} at {tag}, demoted to UN")
            }
            Warning::UnknownTransferSyntax { uid } => {
                write!(f, "unknown transfer syntax {uid}, defaulting to Explicit VR Little Endian")
            }
        }
    }
}
