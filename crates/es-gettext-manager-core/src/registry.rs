use crate::error::RegistryError;
use crate::source::{self, CatalogSource};
use crate::translator::Translator;
use es_gettext_catalog::CatalogFormat;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// The terminal fallback locale for resource lookups.
pub const DEFAULT_LOCALE: &str = "default";

/// Every translator of every bound domain.
///
/// Tables are never mutated: binding or unbinding builds a new table and swaps
/// it in whole, so a table obtained from [`Registry::snapshot`] stays consistent.
#[derive(Debug, Default)]
pub struct TranslatorTable {
    translators: Vec<Arc<Translator>>,
    index: HashMap<String, HashMap<String, usize>>,
}

impl TranslatorTable {
    pub fn get(&self, domain: &str, locale: &str) -> Option<&Arc<Translator>> {
        let slot = *self.index.get(domain)?.get(locale)?;
        self.translators.get(slot)
    }

    /// Sorted locales bound for `domain`.
    pub fn locales(&self, domain: &str) -> Vec<String> {
        let mut locales: Vec<String> = self
            .index
            .get(domain)
            .map(|by_locale| by_locale.keys().cloned().collect())
            .unwrap_or_default();
        locales.sort();
        locales
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.index.contains_key(domain)
    }

    /// `(domain, locale, translator)` triples in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Arc<Translator>)> {
        self.index.iter().flat_map(move |(domain, by_locale)| {
            by_locale.iter().filter_map(move |(locale, slot)| {
                self.translators
                    .get(*slot)
                    .map(|translator| (domain.as_str(), locale.as_str(), translator))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    fn rebuild<'a>(
        entries: impl Iterator<Item = (&'a str, &'a str, &'a Arc<Translator>)>,
    ) -> Self {
        let mut table = Self::default();
        for (domain, locale, translator) in entries {
            table.push(domain, locale, Arc::clone(translator));
        }
        table
    }

    fn push(&mut self, domain: &str, locale: &str, translator: Arc<Translator>) {
        let slot = self.translators.len();
        self.translators.push(translator);
        self.index
            .entry(domain.to_string())
            .or_default()
            .insert(locale.to_string(), slot);
    }

    fn with_domain(&self, domain: &str, loaded: Vec<(String, Arc<Translator>)>) -> Self {
        let mut table = Self::rebuild(self.iter().filter(|(bound, _, _)| *bound != domain));
        // An empty inner map keeps the domain visible even without locales.
        table.index.entry(domain.to_string()).or_default();
        for (locale, translator) in loaded {
            table.push(domain, &locale, translator);
        }
        table
    }

    fn without_domain(&self, domain: &str) -> Self {
        let mut table = Self::rebuild(self.iter().filter(|(bound, _, _)| *bound != domain));
        for bound in self.index.keys().filter(|bound| bound.as_str() != domain) {
            table.index.entry(bound.clone()).or_default();
        }
        table
    }
}

#[derive(Clone)]
struct Binding {
    source_id: String,
    source: Arc<dyn CatalogSource>,
}

struct RegistryState {
    domain: String,
    locale: String,
    bindings: BTreeMap<String, Binding>,
    table: Arc<TranslatorTable>,
    active: Option<Arc<Translator>>,
}

impl RegistryState {
    fn resolve_active(&mut self) {
        self.active = self.table.get(&self.domain, &self.locale).cloned();
    }

    fn bound_domains(&self) -> Vec<(String, String)> {
        self.bindings
            .iter()
            .map(|(domain, binding)| (domain.clone(), binding.source_id.clone()))
            .collect()
    }
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            domain: String::new(),
            locale: DEFAULT_LOCALE.to_string(),
            bindings: BTreeMap::new(),
            table: Arc::default(),
            active: None,
        }
    }
}

/// Binds domains to catalog sources and routes queries through the active
/// domain and locale.
///
/// All methods take `&self`; the registry can be shared between threads.
/// Lookups never fail: anything unresolved echoes the input text.
#[derive(Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Registry")
            .field("domain", &state.domain)
            .field("locale", &state.locale)
            .field("bindings", &state.bound_domains())
            .field("translators", &state.table.len())
            .finish()
    }
}

pub fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && domain != "."
        && domain != ".."
        && !domain.contains(['/', '\\', '\0'])
}

/// `"default"` or anything `unic-langid` accepts (`zh_CN`, `pt-BR`, `sr_Latn`...).
pub fn is_valid_locale(locale: &str) -> bool {
    locale == DEFAULT_LOCALE || locale.parse::<LanguageIdentifier>().is_ok()
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `domain` to `source`, loading a translator for every locale the
    /// source lists. Replaces any previous binding of the same domain.
    ///
    /// Returns the sorted `(domain, source_id)` list of all bound domains.
    pub fn bind(
        &self,
        domain: &str,
        source_id: impl Into<String>,
        source: Arc<dyn CatalogSource>,
    ) -> Result<Vec<(String, String)>, RegistryError> {
        if !is_valid_domain(domain) {
            return Err(RegistryError::InvalidDomain(domain.to_string()));
        }
        let source_id = source_id.into();
        let loaded = load_domain(domain, source.as_ref());

        tracing::info!(
            "Bound domain '{}' to {} with {} locale(s)",
            domain,
            source.describe(),
            loaded.len()
        );

        let mut state = self.state.lock();
        let table = state.table.with_domain(domain, loaded);
        state.table = Arc::new(table);
        state
            .bindings
            .insert(domain.to_string(), Binding { source_id, source });
        state.resolve_active();
        Ok(state.bound_domains())
    }

    /// Binds `domain` to a directory, or to a zip archive when `path` names a
    /// `.zip` file.
    pub fn bind_path(
        &self,
        domain: &str,
        path: impl AsRef<Path>,
    ) -> Result<Vec<(String, String)>, RegistryError> {
        let path = path.as_ref();
        if !is_valid_domain(domain) {
            return Err(RegistryError::InvalidDomain(domain.to_string()));
        }
        self.bind(domain, path.display().to_string(), source::open_path(path))
    }

    pub fn unbind(&self, domain: &str) -> Vec<(String, String)> {
        let mut state = self.state.lock();
        if state.bindings.remove(domain).is_some() {
            let table = state.table.without_domain(domain);
            state.table = Arc::new(table);
            state.resolve_active();
            tracing::info!("Unbound domain '{}'", domain);
        }
        state.bound_domains()
    }

    pub fn bound_domains(&self) -> Vec<(String, String)> {
        self.state.lock().bound_domains()
    }

    /// Selects the active locale. An empty `locale` only queries it.
    pub fn set_locale(&self, locale: &str) -> Result<String, RegistryError> {
        let mut state = self.state.lock();
        if locale.is_empty() {
            return Ok(state.locale.clone());
        }
        if !is_valid_locale(locale) {
            return Err(RegistryError::InvalidLocale(locale.to_string()));
        }
        if state.locale != locale {
            tracing::debug!("Active locale '{}' -> '{}'", state.locale, locale);
            state.locale = locale.to_string();
            state.resolve_active();
        }
        Ok(state.locale.clone())
    }

    /// Selects the active domain. An empty `domain` only queries it.
    pub fn set_domain(&self, domain: &str) -> Result<String, RegistryError> {
        let mut state = self.state.lock();
        if domain.is_empty() {
            return Ok(state.domain.clone());
        }
        if !is_valid_domain(domain) {
            return Err(RegistryError::InvalidDomain(domain.to_string()));
        }
        if state.domain != domain {
            tracing::debug!("Active domain '{}' -> '{}'", state.domain, domain);
            state.domain = domain.to_string();
            state.resolve_active();
        }
        Ok(state.domain.clone())
    }

    pub fn locale(&self) -> String {
        self.state.lock().locale.clone()
    }

    pub fn domain(&self) -> String {
        self.state.lock().domain.clone()
    }

    /// The translator of the active domain and locale, if both resolve.
    pub fn active(&self) -> Option<Arc<Translator>> {
        self.state.lock().active.clone()
    }

    pub fn translator(&self, domain: &str, locale: &str) -> Option<Arc<Translator>> {
        self.state.lock().table.get(domain, locale).cloned()
    }

    pub fn available_locales(&self, domain: &str) -> Vec<String> {
        self.snapshot().locales(domain)
    }

    /// The current translator table.
    pub fn snapshot(&self) -> Arc<TranslatorTable> {
        Arc::clone(&self.state.lock().table)
    }

    fn in_active_locale(&self, domain: &str) -> Option<Arc<Translator>> {
        let state = self.state.lock();
        state.table.get(domain, &state.locale).cloned()
    }

    pub fn gettext(&self, msgid: &str) -> String {
        match self.active() {
            Some(t) => t.gettext(msgid).to_string(),
            None => msgid.to_string(),
        }
    }

    pub fn pgettext(&self, context: &str, msgid: &str) -> String {
        match self.active() {
            Some(t) => t.pgettext(context, msgid).to_string(),
            None => msgid.to_string(),
        }
    }

    pub fn ngettext(&self, msgid: &str, msgid_plural: &str, n: u64) -> String {
        match self.active() {
            Some(t) => t.ngettext(msgid, msgid_plural, n).to_string(),
            None => msgid.to_string(),
        }
    }

    pub fn pngettext(&self, context: &str, msgid: &str, msgid_plural: &str, n: u64) -> String {
        match self.active() {
            Some(t) => t.pngettext(context, msgid, msgid_plural, n).to_string(),
            None => msgid.to_string(),
        }
    }

    pub fn dgettext(&self, domain: &str, msgid: &str) -> String {
        match self.in_active_locale(domain) {
            Some(t) => t.gettext(msgid).to_string(),
            None => msgid.to_string(),
        }
    }

    pub fn dpgettext(&self, domain: &str, context: &str, msgid: &str) -> String {
        match self.in_active_locale(domain) {
            Some(t) => t.pgettext(context, msgid).to_string(),
            None => msgid.to_string(),
        }
    }

    pub fn dngettext(&self, domain: &str, msgid: &str, msgid_plural: &str, n: u64) -> String {
        match self.in_active_locale(domain) {
            Some(t) => t.ngettext(msgid, msgid_plural, n).to_string(),
            None => msgid.to_string(),
        }
    }

    pub fn dpngettext(
        &self,
        domain: &str,
        context: &str,
        msgid: &str,
        msgid_plural: &str,
        n: u64,
    ) -> String {
        match self.in_active_locale(domain) {
            Some(t) => t.pngettext(context, msgid, msgid_plural, n).to_string(),
            None => msgid.to_string(),
        }
    }

    /// Reads resource `name` of the active domain.
    pub fn getdata(&self, name: &str) -> Option<Vec<u8>> {
        let domain = self.domain();
        self.dgetdata(&domain, name)
    }

    /// Reads `<locale>/LC_RESOURCE/<domain>/<name>` at the active locale, then
    /// once more at `"default"`. `None` when neither exists.
    pub fn dgetdata(&self, domain: &str, name: &str) -> Option<Vec<u8>> {
        let (binding, locale) = {
            let state = self.state.lock();
            (state.bindings.get(domain).cloned()?, state.locale.clone())
        };

        let mut attempts = vec![locale.as_str()];
        if locale != DEFAULT_LOCALE {
            attempts.push(DEFAULT_LOCALE);
        }
        for locale in attempts {
            match binding.source.load_resource(domain, locale, name) {
                Ok(bytes) => return Some(bytes),
                Err(err) if err.is_not_found() => {
                    tracing::debug!("Resource '{}' missing for {}/{}", name, domain, locale);
                },
                Err(err) => {
                    tracing::warn!(
                        "Failed to read resource '{}' for {}/{}: {}",
                        name,
                        domain,
                        locale,
                        err
                    );
                },
            }
        }
        None
    }
}

fn load_domain(domain: &str, source: &dyn CatalogSource) -> Vec<(String, Arc<Translator>)> {
    let locales = match source.locales() {
        Ok(locales) => locales,
        Err(err) => {
            tracing::warn!(
                "Failed to list locales of {} for domain '{}': {}",
                source.describe(),
                domain,
                err
            );
            return Vec::new();
        },
    };

    locales
        .into_iter()
        .map(|locale| {
            let translator = load_translator(domain, &locale, source);
            (locale, Arc::new(translator))
        })
        .collect()
}

/// Text catalog first, then binary; the null translator when neither decodes.
fn load_translator(domain: &str, locale: &str, source: &dyn CatalogSource) -> Translator {
    let label = format!("{}/{}", domain, locale);
    for format in CatalogFormat::ALL {
        match source.load_messages(domain, locale, format) {
            Ok(bytes) => match Translator::decode(label.as_str(), format, &bytes) {
                Ok(translator) => {
                    tracing::debug!(
                        "Loaded {}{} with {} message(s)",
                        label,
                        format.extension(),
                        translator.catalog().len()
                    );
                    return translator;
                },
                Err(err) => {
                    tracing::warn!("Failed to decode {}{}: {}", label, format.extension(), err);
                },
            },
            Err(err) if err.is_not_found() => {},
            Err(err) => {
                tracing::warn!("Failed to read {}{}: {}", label, format.extension(), err);
            },
        }
    }
    tracing::debug!("No catalog for {}, using null translator", label);
    Translator::null(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, NullSource};

    const HELLO_ZH: &str = r#"
msgid ""
msgstr "Plural-Forms: nplurals=1; plural=0;\n"

msgid "Hello"
msgstr "你好"
"#;

    const HELLO_FR: &str = r#"
msgid ""
msgstr "Plural-Forms: nplurals=2; plural=(n > 1);\n"

msgid "Hello"
msgstr "Bonjour"

msgctxt "greeting"
msgid "Hello"
msgstr "Salut"

msgid "file"
msgid_plural "files"
msgstr[0] "fichier"
msgstr[1] "fichiers"
"#;

    fn hello_source() -> Arc<dyn CatalogSource> {
        Arc::new(
            MemorySource::new("hello")
                .with_messages("hello", "zh_CN", CatalogFormat::Text, HELLO_ZH)
                .with_messages("hello", "fr", CatalogFormat::Text, HELLO_FR)
                .with_resource("hello", "default", "poem.txt", "roses")
                .with_resource("hello", "fr", "poem.txt", "roses rouges"),
        )
    }

    #[test]
    fn fresh_registry_echoes() {
        let registry = Registry::new();
        assert_eq!(registry.locale(), DEFAULT_LOCALE);
        assert_eq!(registry.domain(), "");
        assert_eq!(registry.gettext("Hello"), "Hello");
        assert_eq!(registry.ngettext("file", "files", 3), "file");
        assert!(registry.getdata("poem.txt").is_none());
    }

    #[test]
    fn bind_rejects_invalid_domain() {
        let registry = Registry::new();
        assert_eq!(
            registry.bind("", "x", hello_source()),
            Err(RegistryError::InvalidDomain(String::new()))
        );
        assert_eq!(
            registry.bind("../up", "x", hello_source()),
            Err(RegistryError::InvalidDomain("../up".to_string()))
        );
        assert!(registry.bound_domains().is_empty());
    }

    #[test]
    fn bind_returns_sorted_domains() {
        let registry = Registry::new();
        registry.bind("zeta", "z", hello_source()).unwrap();
        let bound = registry.bind("alpha", "a", hello_source()).unwrap();
        assert_eq!(
            bound,
            vec![
                ("alpha".to_string(), "a".to_string()),
                ("zeta".to_string(), "z".to_string())
            ]
        );
    }

    #[test]
    fn routes_through_active_domain_and_locale() {
        let registry = Registry::new();
        registry.bind("hello", "mem", hello_source()).unwrap();
        assert_eq!(registry.set_domain("hello").unwrap(), "hello");
        assert_eq!(registry.gettext("Hello"), "Hello");

        assert_eq!(registry.set_locale("zh_CN").unwrap(), "zh_CN");
        assert_eq!(registry.gettext("Hello"), "你好");

        registry.set_locale("fr").unwrap();
        assert_eq!(registry.gettext("Hello"), "Bonjour");
        assert_eq!(registry.pgettext("greeting", "Hello"), "Salut");
        assert_eq!(registry.ngettext("file", "files", 1), "fichier");
        assert_eq!(registry.ngettext("file", "files", 2), "fichiers");
        assert_eq!(registry.pngettext("x", "file", "files", 2), "files");
    }

    #[test]
    fn empty_selection_is_a_query() {
        let registry = Registry::new();
        registry.set_domain("hello").unwrap();
        registry.set_locale("fr").unwrap();
        assert_eq!(registry.set_domain("").unwrap(), "hello");
        assert_eq!(registry.set_locale("").unwrap(), "fr");
    }

    #[test]
    fn invalid_locale_keeps_selection() {
        let registry = Registry::new();
        registry.set_locale("fr").unwrap();
        assert_eq!(
            registry.set_locale("not a locale!"),
            Err(RegistryError::InvalidLocale("not a locale!".to_string()))
        );
        assert_eq!(registry.locale(), "fr");
    }

    #[test]
    fn domain_qualified_queries_ignore_active_domain() {
        let registry = Registry::new();
        registry.bind("hello", "mem", hello_source()).unwrap();
        registry.set_domain("other").unwrap();
        registry.set_locale("fr").unwrap();

        assert_eq!(registry.gettext("Hello"), "Hello");
        assert_eq!(registry.dgettext("hello", "Hello"), "Bonjour");
        assert_eq!(registry.dpgettext("hello", "greeting", "Hello"), "Salut");
        assert_eq!(registry.dngettext("hello", "file", "files", 5), "fichiers");
        assert_eq!(
            registry.dpngettext("hello", "x", "file", "files", 5),
            "files"
        );
        assert_eq!(registry.dgettext("missing", "Hello"), "Hello");
    }

    #[test]
    fn unbind_clears_active_translator() {
        let registry = Registry::new();
        registry.bind("hello", "mem", hello_source()).unwrap();
        registry.set_domain("hello").unwrap();
        registry.set_locale("fr").unwrap();
        assert!(registry.active().is_some());

        assert!(registry.unbind("hello").is_empty());
        assert!(registry.active().is_none());
        assert_eq!(registry.gettext("Hello"), "Hello");
        assert!(registry.available_locales("hello").is_empty());
    }

    #[test]
    fn rebinding_re_resolves_active_translator() {
        let registry = Registry::new();
        registry.set_domain("hello").unwrap();
        registry.set_locale("fr").unwrap();
        assert!(registry.active().is_none());

        registry.bind("hello", "mem", hello_source()).unwrap();
        assert_eq!(registry.gettext("Hello"), "Bonjour");
    }

    #[test]
    fn locales_without_catalog_get_null_translator() {
        let registry = Registry::new();
        let source = MemorySource::new("partial")
            .with_messages("hello", "fr", CatalogFormat::Text, HELLO_FR)
            .with_resource("hello", "default", "poem.txt", "roses")
            .with_messages("hello", "de", CatalogFormat::Binary, "not a mo file");
        registry.bind("hello", "mem", Arc::new(source)).unwrap();

        assert_eq!(
            registry.available_locales("hello"),
            vec!["de", "default", "fr"]
        );
        assert!(registry.translator("hello", "default").unwrap().is_null());
        assert!(registry.translator("hello", "de").unwrap().is_null());
        assert!(!registry.translator("hello", "fr").unwrap().is_null());
    }

    #[test]
    fn text_catalog_wins_over_binary() {
        let binary = es_gettext_catalog::mo::encode(
            Translator::from_text("x", HELLO_ZH.as_bytes())
                .unwrap()
                .catalog(),
            Default::default(),
        );
        let source = MemorySource::new("both")
            .with_messages("hello", "fr", CatalogFormat::Text, HELLO_FR)
            .with_messages("hello", "fr", CatalogFormat::Binary, binary);

        let registry = Registry::new();
        registry.bind("hello", "mem", Arc::new(source)).unwrap();
        let fr = registry.translator("hello", "fr").unwrap();
        assert_eq!(fr.gettext("Hello"), "Bonjour");
    }

    #[test]
    fn unreadable_source_binds_without_locales() {
        let registry = Registry::new();
        let bound = registry
            .bind("hello", "gone", Arc::new(NullSource::new("gone")))
            .unwrap();
        assert_eq!(bound, vec![("hello".to_string(), "gone".to_string())]);
        assert!(registry.available_locales("hello").is_empty());
        assert!(registry.snapshot().contains_domain("hello"));
    }

    #[test]
    fn resource_falls_back_to_default_locale() {
        let registry = Registry::new();
        registry.bind("hello", "mem", hello_source()).unwrap();
        registry.set_domain("hello").unwrap();

        registry.set_locale("fr").unwrap();
        assert_eq!(registry.getdata("poem.txt").unwrap(), b"roses rouges");

        registry.set_locale("zh_CN").unwrap();
        assert_eq!(registry.getdata("poem.txt").unwrap(), b"roses");
        assert!(registry.getdata("missing.txt").is_none());
        assert!(registry.dgetdata("unbound", "poem.txt").is_none());
    }

    #[test]
    fn bind_unbind_bind_is_idempotent() {
        let registry = Registry::new();
        registry.bind("hello", "mem", hello_source()).unwrap();
        let first = registry.snapshot();
        registry.unbind("hello");
        registry.bind("hello", "mem", hello_source()).unwrap();
        let second = registry.snapshot();

        assert_eq!(first.len(), second.len());
        for (domain, locale, translator) in first.iter() {
            assert_eq!(second.get(domain, locale).unwrap(), translator);
        }
    }

    #[test]
    fn snapshot_survives_rebinding() {
        let registry = Registry::new();
        registry.bind("hello", "mem", hello_source()).unwrap();
        let before = registry.snapshot();
        registry
            .bind("hello", "empty", Arc::new(NullSource::new("empty")))
            .unwrap();

        assert_eq!(
            before.get("hello", "fr").unwrap().gettext("Hello"),
            "Bonjour"
        );
        assert!(registry.translator("hello", "fr").is_none());
    }

    #[test]
    fn locale_validation() {
        assert!(is_valid_locale("default"));
        assert!(is_valid_locale("zh_CN"));
        assert!(is_valid_locale("pt-BR"));
        assert!(is_valid_locale("sr_Latn_RS"));
        assert!(!is_valid_locale(""));
        assert!(!is_valid_locale("C"));
        assert!(!is_valid_locale("en US"));
    }
}
