//! Decoder and encoder for the compiled binary catalog format (`.mo`).
//!
//! Layout: a 28 byte header (magic, revision, entry count, original table
//! offset, translated table offset, hash table size, hash table offset), two
//! parallel tables of `(length, offset)` pairs and the string data.

use crate::error::DecodeError;
use crate::header::Header;
use crate::model::{Catalog, MessageEntry, MessageKey};

pub const MAGIC: u32 = 0x9504_12de;

const HEADER_LEN: usize = 28;
const CONTEXT_SEPARATOR: u8 = 0x04;

/// Byte order of a binary catalog, identified by how its magic number reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    fn read(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }

    fn write(self, value: u32) -> [u8; 4] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let magic: [u8; 4] = bytes
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or(DecodeError::Truncated("magic number"))?;

        let order = if u32::from_le_bytes(magic) == MAGIC {
            ByteOrder::Little
        } else if u32::from_be_bytes(magic) == MAGIC {
            ByteOrder::Big
        } else {
            return Err(DecodeError::BadMagic(u32::from_le_bytes(magic)));
        };
        Ok(Self { bytes, order })
    }

    fn u32_at(&self, offset: usize, what: &'static str) -> Result<u32, DecodeError> {
        let end = offset.checked_add(4).ok_or(DecodeError::Truncated(what))?;
        let raw: [u8; 4] = self
            .bytes
            .get(offset..end)
            .and_then(|b| b.try_into().ok())
            .ok_or(DecodeError::Truncated(what))?;
        Ok(self.order.read(raw))
    }

    /// Reads the string described by entry `index` of the table at `table`.
    fn string(&self, table: usize, index: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
        let descriptor = index
            .checked_mul(8)
            .and_then(|d| d.checked_add(table))
            .ok_or(DecodeError::Truncated(what))?;
        let len = self.u32_at(descriptor, what)? as usize;
        let offset = self.u32_at(descriptor + 4, what)? as usize;
        let end = offset.checked_add(len).ok_or(DecodeError::Truncated(what))?;
        self.bytes.get(offset..end).ok_or(DecodeError::Truncated(what))
    }
}

/// Decodes raw `.mo` bytes in either byte order.
pub fn decode(bytes: &[u8]) -> Result<Catalog, DecodeError> {
    let reader = Reader::new(bytes)?;

    let revision = reader.u32_at(4, "revision")?;
    if revision >> 16 > 1 {
        return Err(DecodeError::UnsupportedRevision(revision));
    }
    let count = reader.u32_at(8, "entry count")? as usize;
    let originals = reader.u32_at(12, "original table offset")? as usize;
    let translations = reader.u32_at(16, "translated table offset")? as usize;

    let mut catalog = Catalog::new();
    for index in 0..count {
        let original = reader.string(originals, index, "original strings")?;
        let translated = reader.string(translations, index, "translated strings")?;

        if original.is_empty() {
            catalog.set_header(Header::parse(std::str::from_utf8(translated)?));
            continue;
        }

        let (context, rest) = match original.iter().position(|&b| b == CONTEXT_SEPARATOR) {
            Some(at) => (&original[..at], &original[at + 1..]),
            None => (&original[..0], original),
        };
        let (msgid, msgid_plural) = match rest.iter().position(|&b| b == 0) {
            Some(at) => (&rest[..at], &rest[at + 1..]),
            None => (rest, &rest[..0]),
        };

        let key = MessageKey::new(
            std::str::from_utf8(context)?,
            std::str::from_utf8(msgid)?,
            std::str::from_utf8(msgid_plural)?,
        );
        let translated = std::str::from_utf8(translated)?;
        let entry = if key.msgid_plural.is_empty() {
            MessageEntry::singular(translated)
        } else {
            MessageEntry::plural(translated.split('\0'))
        };

        if catalog.insert(key.clone(), entry).is_some() {
            tracing::debug!("Duplicate catalog entry {:?}, keeping the last one", key);
        }
    }

    Ok(catalog)
}

/// Compiles a catalog into `.mo` bytes.
///
/// Entries are sorted by original string, the header entry (if any) comes
/// first, and no hash table is emitted.
pub fn encode(catalog: &Catalog, order: ByteOrder) -> Vec<u8> {
    let mut pairs: Vec<(Vec<u8>, Vec<u8>)> = Vec::with_capacity(catalog.len() + 1);
    if !catalog.header().is_empty() {
        pairs.push((Vec::new(), catalog.header().to_text().into_bytes()));
    }
    for (key, entry) in catalog.iter() {
        pairs.push((original_bytes(key), entry.plural_forms.join("\0").into_bytes()));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let count = pairs.len();
    let originals = HEADER_LEN;
    let translations = originals + count * 8;
    let strings_start = translations + count * 8;
    let mut data_offset = strings_start;

    let mut table = Vec::with_capacity(count * 16);
    let mut data = Vec::new();
    for strings in [0, 1] {
        for pair in &pairs {
            let string = if strings == 0 { &pair.0 } else { &pair.1 };
            table.extend_from_slice(&order.write(string.len() as u32));
            table.extend_from_slice(&order.write(data_offset as u32));
            data.extend_from_slice(string);
            data.push(0);
            data_offset += string.len() + 1;
        }
    }

    let mut out = Vec::with_capacity(HEADER_LEN + table.len() + data.len());
    for field in [
        MAGIC,
        0,
        count as u32,
        originals as u32,
        translations as u32,
        0,
        strings_start as u32,
    ] {
        out.extend_from_slice(&order.write(field));
    }
    out.extend_from_slice(&table);
    out.extend_from_slice(&data);
    out
}

fn original_bytes(key: &MessageKey) -> Vec<u8> {
    let mut bytes = Vec::new();
    if !key.context.is_empty() {
        bytes.extend_from_slice(key.context.as_bytes());
        bytes.push(CONTEXT_SEPARATOR);
    }
    bytes.extend_from_slice(key.msgid.as_bytes());
    if !key.msgid_plural.is_empty() {
        bytes.push(0);
        bytes.extend_from_slice(key.msgid_plural.as_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a little-endian catalog by hand: one header and one entry.
    fn handmade() -> Vec<u8> {
        let originals: [&[u8]; 2] = [b"", b"Hello"];
        let translations: [&[u8]; 2] = [b"Language: fr\n", b"Bonjour"];

        let mut out = Vec::new();
        for field in [MAGIC, 0, 2, 28, 44, 0, 0] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        let mut offset = 60u32;
        let mut data = Vec::new();
        for s in originals.iter().chain(translations.iter()) {
            out.extend_from_slice(&(s.len() as u32).to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
            data.extend_from_slice(s);
            data.push(0);
            offset += s.len() as u32 + 1;
        }
        out.extend_from_slice(&data);
        out
    }

    #[test]
    fn decodes_handmade_catalog() {
        let catalog = decode(&handmade()).unwrap();
        assert_eq!(catalog.header().language(), Some("fr"));
        assert_eq!(
            catalog.get(&MessageKey::singular("", "Hello")),
            Some(&MessageEntry::singular("Bonjour"))
        );
    }

    #[test]
    fn big_endian_magic_is_accepted() {
        let mut catalog = Catalog::new();
        catalog.insert(MessageKey::singular("", "a"), MessageEntry::singular("b"));
        let bytes = encode(&catalog, ByteOrder::Big);

        assert_eq!(&bytes[..4], &[0x95, 0x04, 0x12, 0xde]);
        assert_eq!(decode(&bytes).unwrap().entries(), catalog.entries());
    }

    #[test]
    fn splits_context_and_plural() {
        let mut catalog = Catalog::new();
        catalog.insert(
            MessageKey::new("menu", "%d item", "%d items"),
            MessageEntry::plural(["%d élément", "%d éléments"]),
        );
        let decoded = decode(&encode(&catalog, ByteOrder::Little)).unwrap();
        let entry = decoded
            .get(&MessageKey::new("menu", "%d item", "%d items"))
            .unwrap();
        assert_eq!(entry.plural_forms, vec!["%d élément", "%d éléments"]);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = handmade();
        bytes[0] = 0;
        assert!(matches!(decode(&bytes), Err(DecodeError::BadMagic(_))));
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(decode(&[0xde, 0x12]), Err(DecodeError::Truncated(_))));
    }

    #[test]
    fn rejects_truncated_tables() {
        let bytes = handmade();
        assert!(matches!(decode(&bytes[..40]), Err(DecodeError::Truncated(_))));
    }

    #[test]
    fn rejects_string_past_end() {
        let mut bytes = handmade();
        // Length of the second original string.
        bytes[36..40].copy_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(DecodeError::Truncated(_))));
    }

    #[test]
    fn rejects_unknown_major_revision() {
        let mut bytes = handmade();
        bytes[4..8].copy_from_slice(&0x0002_0000u32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(DecodeError::UnsupportedRevision(_))));
    }
}
