//! The in-memory element tree: [`DataElement`], [`DataSet`], and
//! [`SequenceItem`].

use crate::header::{Length, Tag, VR};
use crate::value::{self, decode_f32, decode_f64, decode_i16, decode_i32, decode_u16, decode_u32};
use byteordered::Endianness;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// A nested data set carried by a sequence item. Items have no tag of their
/// own — their position in the enclosing sequence is what identifies them.
pub type SequenceItem = DataSet;

/// What an element's value actually holds, beyond its raw bytes.
///
/// Sequence items are nested data sets; encapsulated pixel data fragments
/// are opaque byte buffers (the first of which is the Basic Offset Table) —
/// the two must not be conflated, since a fragment is not itself a tagged
/// data set.
#[derive(Debug, Clone, PartialEq)]
enum ElementValue {
    Primitive(SmallVec<[u8; 16]>),
    Sequence(Vec<SequenceItem>),
    Fragments(Vec<Vec<u8>>),
}

/// A single tagged DICOM value.
#[derive(Debug, Clone, PartialEq)]
pub struct DataElement {
    tag: Tag,
    vr: VR,
    length: Length,
    value: ElementValue,
}

impl DataElement {
    /// Build a primitive (non-sequence) element from already-encoded value
    /// bytes. The caller is responsible for even-length padding (I1); use
    /// [`crate::value::encode_text`] or the `DataSet` typed setters to get
    /// it for free.
    pub fn primitive(tag: Tag, vr: VR, value_bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = value_bytes.into();
        let length = Length(bytes.len() as u32);
        DataElement {
            tag,
            vr,
            length,
            value: ElementValue::Primitive(SmallVec::from_vec(bytes)),
        }
    }

    /// Build a sequence element from a list of items (an empty list is a
    /// legal, zero-item sequence).
    pub fn sequence(tag: Tag, items: Vec<SequenceItem>) -> Self {
        DataElement {
            tag,
            vr: VR::SQ,
            length: Length::UNDEFINED,
            value: ElementValue::Sequence(items),
        }
    }

    /// Build an encapsulated pixel data element: `fragments[0]` is the
    /// Basic Offset Table, `fragments[1..]` are the compressed fragments,
    /// stored without further decoding.
    pub fn encapsulated_pixel_data(fragments: Vec<Vec<u8>>) -> Self {
        DataElement {
            tag: Tag(0x7FE0, 0x0010),
            vr: VR::OB,
            length: Length::UNDEFINED,
            value: ElementValue::Fragments(fragments),
        }
    }

    pub(crate) fn sequence_with_vr(tag: Tag, vr: VR, length: Length, items: Vec<SequenceItem>) -> Self {
        DataElement {
            tag,
            vr,
            length,
            value: ElementValue::Sequence(items),
        }
    }

    pub(crate) fn fragments_with_vr(tag: Tag, vr: VR, fragments: Vec<Vec<u8>>) -> Self {
        DataElement {
            tag,
            vr,
            length: Length::UNDEFINED,
            value: ElementValue::Fragments(fragments),
        }
    }

    /// This element's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// This element's value representation.
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// This element's declared length (may be [`Length::UNDEFINED`] for
    /// sequences and encapsulated pixel data).
    pub fn length(&self) -> Length {
        self.length
    }

    /// The raw value bytes, for a primitive element. Empty for sequences
    /// and encapsulated pixel data.
    pub fn value_bytes(&self) -> &[u8] {
        match &self.value {
            ElementValue::Primitive(bytes) => bytes,
            _ => &[],
        }
    }

    /// Whether this element is a sequence (`VR::SQ`).
    pub fn is_sequence(&self) -> bool {
        matches!(self.value, ElementValue::Sequence(_))
    }

    /// Whether this element is encapsulated pixel data.
    pub fn is_encapsulated_pixel_data(&self) -> bool {
        matches!(self.value, ElementValue::Fragments(_))
    }

    /// This element's items, if it is a sequence.
    pub fn items(&self) -> Option<&[SequenceItem]> {
        match &self.value {
            ElementValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// This element's compressed fragments, if it is encapsulated pixel
    /// data. `fragments()[0]` is the Basic Offset Table.
    pub fn fragments(&self) -> Option<&[Vec<u8>]> {
        match &self.value {
            ElementValue::Fragments(fragments) => Some(fragments),
            _ => None,
        }
    }
}

/// An ordered collection of DICOM elements, always iterated and serialized
/// in ascending tag order regardless of insertion order (DICOM data sets
/// have no other intrinsic ordering).
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    elements: BTreeMap<Tag, DataElement>,
    endianness: Endianness,
}

impl Default for DataSet {
    fn default() -> Self {
        DataSet::new()
    }
}

impl DataSet {
    /// An empty data set. Numeric accessors assume little-endian value
    /// bytes until the set is produced by the parser under a different
    /// transfer syntax.
    pub fn new() -> Self {
        DataSet {
            elements: BTreeMap::new(),
            endianness: Endianness::Little,
        }
    }

    pub(crate) fn with_endianness(endianness: Endianness) -> Self {
        DataSet {
            elements: BTreeMap::new(),
            endianness,
        }
    }

    /// The endianness under which this data set's numeric values are
    /// encoded (recorded from the transfer syntax it was parsed under).
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Insert or replace an element. A duplicate tag replaces the previous
    /// element, matching DICOM's "last write wins" semantics.
    pub fn insert(&mut self, element: DataElement) {
        self.elements.insert(element.tag, element);
    }

    /// Fetch an element by tag.
    pub fn get(&self, tag: Tag) -> Option<&DataElement> {
        self.elements.get(&tag)
    }

    /// Remove an element by tag, returning it if present.
    pub fn remove(&mut self, tag: Tag) -> Option<DataElement> {
        self.elements.remove(&tag)
    }

    /// The number of elements in this data set.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether this data set has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over elements in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = &DataElement> {
        self.elements.values()
    }

    // --- typed accessors (§4.5/§4.6) -------------------------------------

    /// Decode a text value, stripped of its trailing pad byte.
    pub fn string(&self, tag: Tag) -> Option<std::borrow::Cow<'_, str>> {
        self.get(tag).map(|e| value::decode_text(e.value_bytes()))
    }

    /// Decode a multi-valued text value, split on `\`.
    pub fn strings(&self, tag: Tag) -> Option<Vec<String>> {
        self.get(tag).map(|e| {
            let text = value::decode_text(e.value_bytes());
            value::split_multi(&text)
                .into_iter()
                .map(str::to_owned)
                .collect()
        })
    }

    /// Decode a `US` (unsigned short) value.
    pub fn uint16(&self, tag: Tag) -> Option<u16> {
        self.get(tag)
            .and_then(|e| decode_u16(e.value_bytes(), self.endianness))
    }

    /// Decode an `SS` (signed short) value.
    pub fn int16(&self, tag: Tag) -> Option<i16> {
        self.get(tag)
            .and_then(|e| decode_i16(e.value_bytes(), self.endianness))
    }

    /// Decode a `UL` (unsigned long) value.
    pub fn uint32(&self, tag: Tag) -> Option<u32> {
        self.get(tag)
            .and_then(|e| decode_u32(e.value_bytes(), self.endianness))
    }

    /// Decode an `SL` (signed long) value.
    pub fn int32(&self, tag: Tag) -> Option<i32> {
        self.get(tag)
            .and_then(|e| decode_i32(e.value_bytes(), self.endianness))
    }

    /// Decode an `FL` (single-precision float) value.
    pub fn float32(&self, tag: Tag) -> Option<f32> {
        self.get(tag)
            .and_then(|e| decode_f32(e.value_bytes(), self.endianness))
    }

    /// Decode an `FD` (double-precision float) value.
    pub fn float64(&self, tag: Tag) -> Option<f64> {
        self.get(tag)
            .and_then(|e| decode_f64(e.value_bytes(), self.endianness))
    }

    /// Whether `tag` names a sequence element in this data set.
    pub fn is_sequence(&self, tag: Tag) -> bool {
        self.get(tag).map(|e| e.vr() == VR::SQ).unwrap_or(false)
    }

    /// The items of a sequence element.
    pub fn sequence(&self, tag: Tag) -> Option<&[SequenceItem]> {
        self.get(tag).and_then(|e| e.items())
    }

    /// The first item of a sequence element, if any.
    pub fn first_sequence_item(&self, tag: Tag) -> Option<&SequenceItem> {
        self.sequence(tag).and_then(|items| items.first())
    }

    /// The number of items in a sequence element (`0` if absent or not a
    /// sequence).
    pub fn sequence_item_count(&self, tag: Tag) -> usize {
        self.sequence(tag).map(|items| items.len()).unwrap_or(0)
    }

    /// The compressed fragments of `(7FE0,0010)`, if present and
    /// encapsulated (`fragments()[0]` is the Basic Offset Table).
    pub fn pixel_data_fragments(&self) -> Option<&[Vec<u8>]> {
        self.get(Tag(0x7FE0, 0x0010)).and_then(|e| e.fragments())
    }

    // --- typed setters ----------------------------------------------------

    /// Set a single text value under `vr`, padding as needed (I1).
    pub fn set_string(&mut self, tag: Tag, vr: VR, value: &str) {
        self.insert(DataElement::primitive(tag, vr, value::encode_text(value, vr)));
    }

    /// Set a multi-valued text value under `vr`, joining with `\` and
    /// padding the result (I1).
    pub fn set_strings<I, S>(&mut self, tag: Tag, vr: VR, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bytes = value::join_multi(values);
        value::pad_to_even(&mut bytes, vr.pad_byte());
        self.insert(DataElement::primitive(tag, vr, bytes));
    }

    /// Set a `US` value.
    pub fn set_uint16(&mut self, tag: Tag, value: u16) {
        self.insert(DataElement::primitive(
            tag,
            VR::US,
            value::encode_u16(value, self.endianness),
        ));
    }

    /// Set an `SS` value.
    pub fn set_int16(&mut self, tag: Tag, value: i16) {
        self.insert(DataElement::primitive(
            tag,
            VR::SS,
            value::encode_i16(value, self.endianness),
        ));
    }

    /// Set a `UL` value.
    pub fn set_uint32(&mut self, tag: Tag, value: u32) {
        self.insert(DataElement::primitive(
            tag,
            VR::UL,
            value::encode_u32(value, self.endianness),
        ));
    }

    /// Set an `SL` value.
    pub fn set_int32(&mut self, tag: Tag, value: i32) {
        self.insert(DataElement::primitive(
            tag,
            VR::SL,
            value::encode_i32(value, self.endianness),
        ));
    }

    /// Set an `FL` value.
    pub fn set_float32(&mut self, tag: Tag, value: f32) {
        self.insert(DataElement::primitive(
            tag,
            VR::FL,
            value::encode_f32(value, self.endianness),
        ));
    }

    /// Set an `FD` value.
    pub fn set_float64(&mut self, tag: Tag, value: f64) {
        self.insert(DataElement::primitive(
            tag,
            VR::FD,
            value::encode_f64(value, self.endianness),
        ));
    }

    /// Set a sequence value.
    pub fn set_sequence(&mut self, tag: Tag, items: Vec<SequenceItem>) {
        self.insert(DataElement::sequence(tag, items));
    }

    /// Set encapsulated pixel data. `fragments[0]` must be the Basic Offset
    /// Table (possibly empty).
    pub fn set_encapsulated_pixel_data(&mut self, fragments: Vec<Vec<u8>>) {
        self.insert(DataElement::encapsulated_pixel_data(fragments));
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a DataElement;
    type IntoIter = std::collections::btree_map::Values<'a, Tag, DataElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_replaces() {
        let mut ds = DataSet::new();
        ds.set_string(Tag(0x0010, 0x0010), VR::PN, "Doe^John");
        ds.set_string(Tag(0x0010, 0x0010), VR::PN, "Roe^Jane");
        assert_eq!(ds.string(Tag(0x0010, 0x0010)).unwrap(), "Roe^Jane");
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn iterates_in_ascending_tag_order() {
        let mut ds = DataSet::new();
        ds.set_string(Tag(0x0010, 0x0020), VR::LO, "ID1");
        ds.set_string(Tag(0x0008, 0x0020), VR::DA, "20250131");
        let tags: Vec<_> = ds.iter().map(|e| e.tag()).collect();
        assert_eq!(tags, vec![Tag(0x0008, 0x0020), Tag(0x0010, 0x0020)]);
    }

    #[test]
    fn multi_valued_strings_round_trip() {
        let mut ds = DataSet::new();
        ds.set_strings(Tag(0x0028, 0x0030), VR::DS, ["1.0", "1.0"]);
        assert_eq!(ds.strings(Tag(0x0028, 0x0030)).unwrap(), vec!["1.0", "1.0"]);
    }

    #[test]
    fn numeric_setters_round_trip() {
        let mut ds = DataSet::new();
        ds.set_uint16(Tag(0x0028, 0x0010), 512);
        assert_eq!(ds.uint16(Tag(0x0028, 0x0010)), Some(512));
    }

    #[test]
    fn sequence_accessors() {
        let mut item = SequenceItem::new();
        item.set_string(Tag(0x0010, 0x0010), VR::PN, "Doe^John");
        let mut ds = DataSet::new();
        ds.set_sequence(Tag(0x0008, 0x1115), vec![item]);
        assert!(ds.is_sequence(Tag(0x0008, 0x1115)));
        assert_eq!(ds.sequence_item_count(Tag(0x0008, 0x1115)), 1);
        assert_eq!(
            ds.first_sequence_item(Tag(0x0008, 0x1115))
                .unwrap()
                .string(Tag(0x0010, 0x0010))
                .unwrap(),
            "Doe^John"
        );
    }
}
