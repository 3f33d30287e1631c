use es_gettext_manager_core::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GettextError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[cfg(feature = "toml")]
    #[error("Configuration error: {0}")]
    Config(#[from] es_gettext_toml::I18nConfigError),
}
