#![doc = include_str!("../README.md")]

pub mod error;
pub mod registry;
pub mod source;
pub mod translator;

pub use error::{RegistryError, SourceError};
pub use registry::{DEFAULT_LOCALE, Registry, TranslatorTable};
#[cfg(feature = "zip")]
pub use source::ArchiveSource;
pub use source::{CatalogSource, DirectorySource, MemorySource, NullSource};
pub use translator::Translator;

pub use es_gettext_catalog::CatalogFormat;
pub use es_gettext_plural::PluralRule;
