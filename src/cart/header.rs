// table-driven header decoding
use std::fmt;

use super::error::Result;
use super::image::RomImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Lossy UTF-8 text
    Text,
    /// Big-endian unsigned integer, 1 to 4 bytes wide
    Uint,
    /// Bytes returned verbatim
    Raw,
}

/// One entry of a console's header layout. Offsets are absolute ROM offsets.
#[derive(Debug, Clone, Copy)]
pub struct HeaderField {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
    pub kind: FieldKind,
}

impl HeaderField {
    pub const fn new(name: &'static str, offset: usize, width: usize, kind: FieldKind) -> Self {
        Self {
            name,
            offset,
            width,
            kind,
        }
    }

    fn decode(&self, bytes: &[u8]) -> FieldValue {
        match self.kind {
            FieldKind::Text => FieldValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            FieldKind::Uint => FieldValue::Uint(
                bytes
                    .iter()
                    .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)),
            ),
            FieldKind::Raw => FieldValue::Raw(bytes.to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Uint(u32),
    Raw(Vec<u8>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s:?}"),
            FieldValue::Uint(v) => write!(f, "{v} (0x{v:x})"),
            FieldValue::Raw(bytes) => {
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
        }
    }
}

/// Decoded header fields, kept in layout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Header {
    /// Decodes every field of `layout` from `image`. Fails without a partial
    /// result if any field lies outside the buffer.
    pub fn parse(image: &RomImage, layout: &[HeaderField]) -> Result<Self> {
        let fields = layout
            .iter()
            .map(|field| {
                let bytes = image.slice(field.offset, field.width)?;
                Ok((field.name, field.decode(bytes)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn uint(&self, name: &str) -> Option<u32> {
        match self.get(name)? {
            FieldValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn raw(&self, name: &str) -> Option<&[u8]> {
        match self.get(name)? {
            FieldValue::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::error::Error;

    const LAYOUT: [HeaderField; 3] = [
        HeaderField::new("Name", 0, 4, FieldKind::Text),
        HeaderField::new("Size", 4, 2, FieldKind::Uint),
        HeaderField::new("Flags", 6, 2, FieldKind::Raw),
    ];

    #[test]
    fn test_parse_in_layout_order() {
        let image = RomImage::from_bytes(b"ABCD\x12\x34\x00\xFF");
        let header = Header::parse(&image, &LAYOUT).unwrap();

        assert_eq!(header.len(), 3);
        assert_eq!(header.text("Name"), Some("ABCD"));
        assert_eq!(header.uint("Size"), Some(0x1234));
        assert_eq!(header.raw("Flags"), Some(&[0x00, 0xFF][..]));

        let names: Vec<_> = header.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Name", "Size", "Flags"]);
    }

    #[test]
    fn test_text_is_lossy() {
        let image = RomImage::from_bytes(b"A\xFFBC\x00\x00\x00\x00");
        let header = Header::parse(&image, &LAYOUT).unwrap();
        assert_eq!(header.text("Name"), Some("A\u{FFFD}BC"));
    }

    #[test]
    fn test_wrong_kind_accessors() {
        let image = RomImage::from_bytes(b"ABCD\x00\x01\x00\x00");
        let header = Header::parse(&image, &LAYOUT).unwrap();
        assert_eq!(header.uint("Name"), None);
        assert_eq!(header.text("Size"), None);
        assert!(header.get("Missing").is_none());
    }

    #[test]
    fn test_truncated_image_fails() {
        let image = RomImage::from_bytes(b"ABCD\x00");
        assert!(matches!(
            Header::parse(&image, &LAYOUT),
            Err(Error::OutOfBounds { offset: 4, .. })
        ));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FieldValue::Uint(0x100000).to_string(), "1048576 (0x100000)");
        assert_eq!(FieldValue::Text("JUE".into()).to_string(), "\"JUE\"");
        assert_eq!(FieldValue::Raw(vec![0x20, 0x00]).to_string(), "20 00");
    }
}
