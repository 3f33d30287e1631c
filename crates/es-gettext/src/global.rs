//! One [`Registry`] for the whole process.

use crate::error::GettextError;
use crate::locale::default_locale;
use es_gettext_manager_core::{CatalogSource, Registry, RegistryError};
use std::path::Path;
use std::sync::{Arc, OnceLock};

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry. On first use its locale is taken from the
/// environment.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let registry = Registry::new();
        let locale = default_locale();
        if let Err(err) = registry.set_locale(&locale) {
            tracing::warn!("Ignoring environment locale '{}': {}", locale, err);
        }
        registry
    })
}

/// Binds `domain` to the catalogs under `path` and makes it the active domain.
pub fn init(domain: &str, path: impl AsRef<Path>) -> Result<(), GettextError> {
    bind_textdomain(domain, path)?;
    textdomain(domain)?;
    Ok(())
}

/// Binds a domain and activates the locale and domain named in `i18n.toml`.
///
/// Relative `assets_dir` values are resolved against `base_dir`.
#[cfg(feature = "toml")]
pub fn init_from_config(
    config: &es_gettext_toml::I18nConfig,
    base_dir: &Path,
) -> Result<(), GettextError> {
    let assets = config.assets_dir_from_base(base_dir);
    init(&config.domain, assets)?;
    if let Some(locale) = config.locale_identifier()? {
        set_locale(locale)?;
    }
    Ok(())
}

/// Reads `i18n.toml` from `manifest_dir` and calls [`init_from_config`].
#[cfg(feature = "toml")]
pub fn init_from_manifest_dir(manifest_dir: &Path) -> Result<(), GettextError> {
    let config = es_gettext_toml::I18nConfig::from_manifest_dir(manifest_dir)?;
    init_from_config(&config, manifest_dir)
}

/// Binds `domain` to a catalog directory or `.zip` archive.
pub fn bind_textdomain(
    domain: &str,
    path: impl AsRef<Path>,
) -> Result<Vec<(String, String)>, RegistryError> {
    registry().bind_path(domain, path)
}

/// Binds `domain` to an arbitrary catalog source.
pub fn bind_textdomain_source(
    domain: &str,
    source_id: impl Into<String>,
    source: Arc<dyn CatalogSource>,
) -> Result<Vec<(String, String)>, RegistryError> {
    registry().bind(domain, source_id, source)
}

pub fn unbind_textdomain(domain: &str) -> Vec<(String, String)> {
    registry().unbind(domain)
}

pub fn bound_textdomains() -> Vec<(String, String)> {
    registry().bound_domains()
}

/// Sets the active domain; an empty name returns the current one.
pub fn textdomain(domain: &str) -> Result<String, RegistryError> {
    registry().set_domain(domain)
}

/// Sets the active locale; an empty value returns the current one.
pub fn set_locale(locale: &str) -> Result<String, RegistryError> {
    registry().set_locale(locale)
}

pub fn locale() -> String {
    registry().locale()
}

pub fn available_locales(domain: &str) -> Vec<String> {
    registry().available_locales(domain)
}

pub fn gettext(msgid: &str) -> String {
    registry().gettext(msgid)
}

pub fn pgettext(context: &str, msgid: &str) -> String {
    registry().pgettext(context, msgid)
}

pub fn ngettext(msgid: &str, msgid_plural: &str, n: u64) -> String {
    registry().ngettext(msgid, msgid_plural, n)
}

pub fn pngettext(context: &str, msgid: &str, msgid_plural: &str, n: u64) -> String {
    registry().pngettext(context, msgid, msgid_plural, n)
}

pub fn dgettext(domain: &str, msgid: &str) -> String {
    registry().dgettext(domain, msgid)
}

pub fn dpgettext(domain: &str, context: &str, msgid: &str) -> String {
    registry().dpgettext(domain, context, msgid)
}

pub fn dngettext(domain: &str, msgid: &str, msgid_plural: &str, n: u64) -> String {
    registry().dngettext(domain, msgid, msgid_plural, n)
}

pub fn dpngettext(
    domain: &str,
    context: &str,
    msgid: &str,
    msgid_plural: &str,
    n: u64,
) -> String {
    registry().dpngettext(domain, context, msgid, msgid_plural, n)
}

/// Resource bytes of the active domain, falling back to the `default` locale.
pub fn getdata(name: &str) -> Option<Vec<u8>> {
    registry().getdata(name)
}

pub fn dgetdata(domain: &str, name: &str) -> Option<Vec<u8>> {
    registry().dgetdata(domain, name)
}
