//! End-to-end tests against the public façade, covering the literal
//! round-trip and transfer-syntax scenarios the codec must support.

use dicom::{DataSet, File, ParseOptions, Tag, TransferSyntax, VR};

fn preamble_and_magic() -> Vec<u8> {
    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");
    bytes
}

fn minimal_file_meta(transfer_syntax_uid: &str) -> Vec<u8> {
    // (0002,0010) UI TransferSyntaxUID, explicit VR LE, no group length
    // element needed since the reader does not require one to stop parsing
    // the meta group (it stops at the first non-0002 group).
    let mut uid = transfer_syntax_uid.as_bytes().to_vec();
    if uid.len() % 2 != 0 {
        uid.push(0);
    }
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x0002u16.to_le_bytes());
    bytes.extend_from_slice(&0x0010u16.to_le_bytes());
    bytes.extend_from_slice(b"UI");
    bytes.extend_from_slice(&(uid.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&uid);
    bytes
}

#[test]
fn scenario_5_full_round_trip_preserves_every_value_and_transfer_syntax() {
    let mut ds = DataSet::new();
    ds.set_string(Tag(0x0010, 0x0010), VR::PN, "Doe^John");
    ds.set_string(Tag(0x0010, 0x0020), VR::LO, "ID123456");
    ds.set_string(Tag(0x0008, 0x0020), VR::DA, "20250131");
    ds.set_uint16(Tag(0x0028, 0x0010), 512);
    ds.set_uint16(Tag(0x0028, 0x0011), 512);

    let file = File::create(
        ds,
        Some("1.2.840.10008.5.1.4.1.1.7"),
        None,
        Some(TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN.uid),
    );
    let bytes = file.write().expect("well-formed file must serialize");

    let read_back = File::read(&bytes).expect("a file this crate wrote must parse");
    assert_eq!(read_back.transfer_syntax_uid(), TransferSyntax::EXPLICIT_VR_LITTLE_ENDIAN.uid);
    assert_eq!(read_back.data_set().string(Tag(0x0010, 0x0010)).unwrap(), "Doe^John");
    assert_eq!(read_back.data_set().string(Tag(0x0010, 0x0020)).unwrap(), "ID123456");
    assert_eq!(read_back.data_set().string(Tag(0x0008, 0x0020)).unwrap(), "20250131");
    assert_eq!(read_back.data_set().uint16(Tag(0x0028, 0x0010)), Some(512));
    assert_eq!(read_back.data_set().uint16(Tag(0x0028, 0x0011)), Some(512));
}

#[test]
fn round_trip_preserves_a_sequence_and_encapsulated_pixel_data() {
    let mut item = dicom::SequenceItem::new();
    item.set_string(Tag(0x0008, 0x0100), VR::SH, "121322");
    let mut ds = DataSet::new();
    ds.set_sequence(Tag(0x0040, 0xA030), vec![item]);
    ds.set_encapsulated_pixel_data(vec![Vec::new(), vec![0xDE, 0xAD, 0xBE, 0xEF]]);

    let file = File::create(ds, Some("1.2.840.10008.5.1.4.1.1.7"), None, None);
    let bytes = file.write().unwrap();
    let read_back = File::read(&bytes).unwrap();

    let item = read_back.data_set().first_sequence_item(Tag(0x0040, 0xA030)).unwrap();
    assert_eq!(item.string(Tag(0x0008, 0x0100)).unwrap(), "121322");

    let fragments = read_back.data_set().pixel_data_fragments().unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[1], vec![0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn deflated_explicit_vr_little_endian_round_trips() {
    let mut ds = DataSet::new();
    ds.set_string(Tag(0x0010, 0x0010), VR::PN, "Doe^John");

    let file = File::create(
        ds,
        Some("1.2.840.10008.5.1.4.1.1.7"),
        None,
        Some(TransferSyntax::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN.uid),
    );
    let bytes = file.write().unwrap();
    let read_back = File::read(&bytes).unwrap();

    assert_eq!(
        read_back.transfer_syntax_uid(),
        TransferSyntax::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN.uid
    );
    assert_eq!(read_back.data_set().string(Tag(0x0010, 0x0010)).unwrap(), "Doe^John");
}

#[test]
fn unknown_transfer_syntax_downgrades_with_a_warning_by_default() {
    let mut bytes = preamble_and_magic();
    bytes.extend_from_slice(&minimal_file_meta("1.2.9999.not.a.real.uid"));

    let file = File::read(&bytes).expect("default options tolerate an unknown transfer syntax");
    assert_eq!(file.transfer_syntax_uid(), "1.2.9999.not.a.real.uid");
    assert!(!file.warnings().is_empty());
}

#[test]
fn unknown_transfer_syntax_is_a_hard_error_in_strict_mode() {
    let mut bytes = preamble_and_magic();
    bytes.extend_from_slice(&minimal_file_meta("1.2.9999.not.a.real.uid"));

    let result = File::read_with_options(&bytes, ParseOptions { strict: true });
    assert!(result.is_err());
}

#[test]
fn explicit_vr_big_endian_round_trips() {
    let mut ds = DataSet::new();
    ds.set_uint16(Tag(0x0028, 0x0010), 512);

    let file = File::create(
        ds,
        Some("1.2.840.10008.5.1.4.1.1.7"),
        None,
        Some(TransferSyntax::EXPLICIT_VR_BIG_ENDIAN.uid),
    );
    let bytes = file.write().unwrap();
    let read_back = File::read(&bytes).unwrap();

    assert_eq!(read_back.transfer_syntax_uid(), TransferSyntax::EXPLICIT_VR_BIG_ENDIAN.uid);
    assert_eq!(read_back.data_set().uint16(Tag(0x0028, 0x0010)), Some(512));
}

#[test]
fn headerless_stream_falls_back_to_implicit_vr_little_endian() {
    // (0010,0010) PN-dictionary tag, 4-byte length, no VR bytes, no preamble.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0x0010u16.to_le_bytes());
    bytes.extend_from_slice(&0x0010u16.to_le_bytes());
    bytes.extend_from_slice(&8u32.to_le_bytes());
    bytes.extend_from_slice(b"Doe^John");

    let file = File::read(&bytes).expect("a headerless stream still parses");
    assert_eq!(file.transfer_syntax_uid(), TransferSyntax::IMPLICIT_VR_LITTLE_ENDIAN.uid);
    assert_eq!(file.data_set().string(Tag(0x0010, 0x0010)).unwrap(), "Doe^John");
    assert!(!file.warnings().is_empty());
}
