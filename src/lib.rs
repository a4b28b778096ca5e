//! A DICOM file-format codec: parses and serializes the tagged binary
//! container used for medical imaging, independent of any particular
//! network transport or pixel codec.
//!
//! The entry point is [`File`]: [`File::read`] parses a complete stream,
//! [`File::create`] builds one around a [`DataSet`] you populate yourself,
//! and [`File::write`] serializes it back to bytes.
//!
//! ```no_run
//! use dicom::{DataSet, File};
//! use dicom::header::{Tag, VR};
//!
//! # fn main() -> dicom::Result<()> {
//! let bytes = std::fs::read("scan.dcm")?;
//! let file = File::read(&bytes)?;
//! let patient_name = file.data_set().string(Tag(0x0010, 0x0010));
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod dataset;
pub mod dictionary;
pub mod encode;
pub mod error;
pub mod file;
pub mod header;
pub mod parser;
pub mod transfer_syntax;
pub mod uid;
pub mod value;

pub use dataset::{DataElement, DataSet, SequenceItem};
pub use error::{Error, Result, Warning};
pub use file::File;
pub use header::{Length, Tag, VR};
pub use parser::ParseOptions;
pub use transfer_syntax::{TransferSyntax, VrMode};
pub use uid::UidGenerator;
