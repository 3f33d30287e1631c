use es_gettext_catalog::{Catalog, CatalogFormat, DecodeError, MessageKey};
use es_gettext_plural::PluralRule;

/// Answers lookups against one decoded catalog.
///
/// Translators are immutable once built; share them through `Arc`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Translator {
    label: String,
    catalog: Catalog,
    rule: PluralRule,
}

impl Translator {
    /// Wraps a catalog, deriving the plural rule from its `Plural-Forms` header.
    pub fn new(label: impl Into<String>, catalog: Catalog) -> Self {
        let rule = PluralRule::from_header(catalog.header().plural_forms());
        Self::with_rule(label, catalog, rule)
    }

    pub fn with_rule(label: impl Into<String>, catalog: Catalog, rule: PluralRule) -> Self {
        Self {
            label: label.into(),
            catalog,
            rule,
        }
    }

    /// Decodes a `.po` file.
    pub fn from_text(label: impl Into<String>, bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode(label, CatalogFormat::Text, bytes)
    }

    /// Decodes a `.mo` file.
    pub fn from_binary(label: impl Into<String>, bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode(label, CatalogFormat::Binary, bytes)
    }

    pub fn decode(
        label: impl Into<String>,
        format: CatalogFormat,
        bytes: &[u8],
    ) -> Result<Self, DecodeError> {
        let catalog = format.decode(bytes)?;
        Ok(Self::new(label, catalog))
    }

    /// Empty catalog, singular rule: every lookup echoes its input.
    pub fn null(label: impl Into<String>) -> Self {
        Self::with_rule(label, Catalog::new(), PluralRule::singular())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rule(&self) -> &PluralRule {
        &self.rule
    }

    pub fn is_null(&self) -> bool {
        self.catalog.is_empty() && self.catalog.header().is_empty()
    }

    pub fn lookup<'a>(&'a self, context: &str, msgid: &'a str) -> &'a str {
        if msgid.is_empty() {
            return msgid;
        }
        let key = MessageKey::singular(context, msgid);
        self.catalog
            .get(&key)
            .map(|entry| entry.singular.as_str())
            .filter(|text| !text.is_empty())
            .unwrap_or(msgid)
    }

    pub fn lookup_plural<'a>(
        &'a self,
        context: &str,
        msgid: &'a str,
        msgid_plural: &'a str,
        n: u64,
    ) -> &'a str {
        let index = self.rule.index(n);
        let key = MessageKey::new(context, msgid, msgid_plural);
        let translated = if msgid.is_empty() {
            None
        } else {
            self.catalog
                .get(&key)
                .and_then(|entry| entry.form(index))
                .filter(|text| !text.is_empty())
        };
        match translated {
            Some(text) => text,
            None if index != 0 => msgid_plural,
            None => msgid,
        }
    }

    pub fn gettext<'a>(&'a self, msgid: &'a str) -> &'a str {
        self.lookup("", msgid)
    }

    pub fn pgettext<'a>(&'a self, context: &str, msgid: &'a str) -> &'a str {
        self.lookup(context, msgid)
    }

    pub fn ngettext<'a>(&'a self, msgid: &'a str, msgid_plural: &'a str, n: u64) -> &'a str {
        self.lookup_plural("", msgid, msgid_plural, n)
    }

    pub fn pngettext<'a>(
        &'a self,
        context: &str,
        msgid: &'a str,
        msgid_plural: &'a str,
        n: u64,
    ) -> &'a str {
        self.lookup_plural(context, msgid, msgid_plural, n)
    }
}
