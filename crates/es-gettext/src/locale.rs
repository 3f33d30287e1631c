use es_gettext_manager_core::DEFAULT_LOCALE;
use es_gettext_manager_core::registry::is_valid_locale;

/// Environment variables consulted by [`default_locale`], in order.
pub const LOCALE_ENV_VARS: [&str; 2] = ["LC_MESSAGES", "LANG"];

/// The locale requested by the environment: `LC_MESSAGES`, then `LANG`, else
/// `"default"`. Values are reduced with [`simplified_locale`].
pub fn default_locale() -> String {
    for var in LOCALE_ENV_VARS {
        let Ok(value) = std::env::var(var) else {
            continue;
        };
        let locale = simplified_locale(&value);
        if locale != DEFAULT_LOCALE {
            tracing::debug!("Locale '{}' from {}={}", locale, var, value);
            return locale;
        }
    }
    DEFAULT_LOCALE.to_string()
}

/// Reduces a POSIX locale value to its language and territory:
/// `en_US.UTF-8@euro` becomes `en_US`, `de_DE:de` becomes `de_DE`.
///
/// Empty values, `C`, `POSIX` and values that are not locale identifiers
/// become `"default"`.
pub fn simplified_locale(value: &str) -> String {
    let value = value.trim();
    let end = value.find([':', '@', '.']).unwrap_or(value.len());
    let locale = value[..end].trim();

    if locale.is_empty() || locale == "C" || locale == "POSIX" || !is_valid_locale(locale) {
        return DEFAULT_LOCALE.to_string();
    }
    locale.to_string()
}
