#![doc = include_str!("../README.md")]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// Locale directory name that is accepted without being a language identifier.
pub const DEFAULT_LOCALE: &str = "default";

#[derive(Debug, Error)]
pub enum I18nConfigError {
    /// Configuration file not found.
    #[error("i18n.toml configuration file not found")]
    NotFound,
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A locale in the configuration or the assets directory is not a valid
    /// language identifier.
    #[error("Invalid locale identifier '{name}'")]
    InvalidLocale {
        /// The invalid identifier.
        name: String,
        /// The parsing error produced by `unic-langid`.
        #[source]
        source: LanguageIdentifierError,
    },
}

/// The configuration for `es-gettext`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct I18nConfig {
    /// The text domain to bind, e.g. `hello` for `hello.po`.
    pub domain: String,
    /// Path to the catalog tree or `.zip` archive.
    /// Expected structure: {assets_dir}/{locale}/LC_MESSAGES/{domain}.po
    pub assets_dir: PathBuf,
    /// Locale to activate. When absent the locale comes from the environment.
    #[serde(default)]
    pub locale: Option<String>,
}

impl I18nConfig {
    /// Reads the configuration from a path.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, I18nConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(I18nConfigError::NotFound);
        }

        let content = fs_err::read_to_string(path)?;

        let config: I18nConfig = toml::from_str(&content)?;

        Ok(config)
    }

    /// Reads `i18n.toml` from `manifest_dir`.
    pub fn from_manifest_dir(manifest_dir: &Path) -> Result<Self, I18nConfigError> {
        Self::read_from_path(manifest_dir.join("i18n.toml"))
    }

    /// Resolves `assets_dir` against the directory holding `i18n.toml`.
    pub fn assets_dir_from_base(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.assets_dir)
    }

    /// Returns the configured locale, validated.
    pub fn locale_identifier(&self) -> Result<Option<&str>, I18nConfigError> {
        match self.locale.as_deref() {
            Some(locale) => {
                validate_locale(locale)?;
                Ok(Some(locale))
            },
            None => Ok(None),
        }
    }
}

/// Accepts `"default"` and anything `unic-langid` parses, with `_` or `-`
/// separators.
pub fn validate_locale(name: &str) -> Result<(), I18nConfigError> {
    if name == DEFAULT_LOCALE {
        return Ok(());
    }
    name.parse::<LanguageIdentifier>()
        .map(|_| ())
        .map_err(|source| I18nConfigError::InvalidLocale {
            name: name.to_string(),
            source,
        })
}
