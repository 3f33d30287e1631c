use thiserror::Error;

/// Failures of a [`CatalogSource`](crate::source::CatalogSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The requested file does not exist in this source.
    #[error("'{0}' not found")]
    NotFound(String),
    /// Reading the underlying storage failed.
    #[error("Failed to read catalog source: {0}")]
    Io(#[from] std::io::Error),
    /// The archive could not be opened or one of its entries could not be read.
    #[cfg(feature = "zip")]
    #[error("Invalid catalog archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// An archive entry expands past the extraction limit.
    #[cfg(feature = "zip")]
    #[error("Archive entry '{name}' is larger than {limit} bytes")]
    EntryTooLarge { name: String, limit: u64 },
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            #[cfg(feature = "zip")]
            Self::Archive(zip::result::ZipError::FileNotFound) => true,
            #[cfg(feature = "zip")]
            Self::Archive(_) | Self::EntryTooLarge { .. } => false,
        }
    }
}

/// Configuration mistakes reported by the registry's mutating operations.
///
/// Queries never return errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid domain name '{0}'")]
    InvalidDomain(String),
    #[error("Invalid locale identifier '{0}'")]
    InvalidLocale(String),
}
