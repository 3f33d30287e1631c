#![doc = include_str!("../README.md")]

mod error;
mod format;
mod global;
mod locale;

pub use error::GettextError;
pub use format::format_placeholders;
pub use global::*;
pub use locale::{LOCALE_ENV_VARS, default_locale, simplified_locale};

pub use es_gettext_manager_core::{
    CatalogFormat, CatalogSource, DEFAULT_LOCALE, DirectorySource, MemorySource, NullSource,
    PluralRule, Registry, RegistryError, SourceError, Translator, TranslatorTable,
};

#[cfg(feature = "zip")]
pub use es_gettext_manager_core::ArchiveSource;

#[doc(hidden)]
pub use es_gettext_catalog as __catalog;

#[doc(hidden)]
pub use es_gettext_plural as __plural;

#[cfg(feature = "toml")]
pub use es_gettext_toml::{I18nConfig, I18nConfigError};

/// Translates with [`gettext`], then fills `{%N=description}` placeholders.
///
/// ```no_run
/// let greeting = es_gettext::tr!("Hello, {%1=name}!", "Ana");
/// ```
#[macro_export]
macro_rules! tr {
    ($msgid:expr $(,)?) => {
        $crate::gettext($msgid)
    };
    ($msgid:expr, $($arg:expr),+ $(,)?) => {
        $crate::format_placeholders(&$crate::gettext($msgid), &[$(&$arg),+])
    };
}

/// Translates with [`ngettext`], then fills `{%N=description}` placeholders.
///
/// ```no_run
/// let n = 3;
/// let files = es_gettext::ntr!("{%1=count} file", "{%1=count} files", n, n);
/// ```
#[macro_export]
macro_rules! ntr {
    ($msgid:expr, $msgid_plural:expr, $n:expr $(,)?) => {
        $crate::ngettext($msgid, $msgid_plural, $n)
    };
    ($msgid:expr, $msgid_plural:expr, $n:expr, $($arg:expr),+ $(,)?) => {
        $crate::format_placeholders(&$crate::ngettext($msgid, $msgid_plural, $n), &[$(&$arg),+])
    };
}
