#![doc = include_str!("../README.md")]

pub mod error;
pub mod header;
pub mod mo;
pub mod model;
pub mod po;

pub use error::{DecodeError, SyntaxError};
pub use header::Header;
pub use model::{Catalog, Comments, MessageEntry, MessageKey};

/// The two on-disk catalog encodings, in the order they are tried when loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatalogFormat {
    /// `.po`
    Text,
    /// `.mo`
    Binary,
}

impl CatalogFormat {
    pub const ALL: [CatalogFormat; 2] = [CatalogFormat::Text, CatalogFormat::Binary];

    /// File extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => ".po",
            Self::Binary => ".mo",
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<Catalog, DecodeError> {
        match self {
            Self::Text => po::decode(bytes),
            Self::Binary => mo::decode(bytes),
        }
    }
}
