//! The uniform in-memory representation produced by both decoders.

use crate::header::Header;
use std::collections::HashMap;

/// Identifies one translatable entry of a catalog.
///
/// Empty `context` and `msgid_plural` are valid values, distinct from non-empty ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub context: String,
    pub msgid: String,
    pub msgid_plural: String,
}

impl MessageKey {
    pub fn new(
        context: impl Into<String>,
        msgid: impl Into<String>,
        msgid_plural: impl Into<String>,
    ) -> Self {
        Self {
            context: context.into(),
            msgid: msgid.into(),
            msgid_plural: msgid_plural.into(),
        }
    }

    /// A key without plural form.
    pub fn singular(context: impl Into<String>, msgid: impl Into<String>) -> Self {
        Self::new(context, msgid, "")
    }

    /// The key of the metadata entry.
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.context.is_empty()
    }
}

/// The translations stored for one key.
///
/// `plural_forms[i]` is selected when the plural rule yields `i`. Singular-only
/// entries hold exactly one form, equal to `singular`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageEntry {
    pub singular: String,
    pub plural_forms: Vec<String>,
}

impl MessageEntry {
    pub fn singular(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            plural_forms: vec![text.clone()],
            singular: text,
        }
    }

    /// Builds a plural entry; the first form doubles as the singular.
    pub fn plural<I, S>(forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let plural_forms: Vec<String> = forms.into_iter().map(Into::into).collect();
        Self {
            singular: plural_forms.first().cloned().unwrap_or_default(),
            plural_forms,
        }
    }

    /// The form at `index`, clamped to the last available form.
    pub fn form(&self, index: usize) -> Option<&str> {
        let last = self.plural_forms.len().checked_sub(1)?;
        self.plural_forms.get(index.min(last)).map(String::as_str)
    }

    /// `true` when no form carries any text.
    pub fn is_untranslated(&self) -> bool {
        self.singular.is_empty() && self.plural_forms.iter().all(String::is_empty)
    }
}

/// Comment lines attached to a text catalog entry.
///
/// Kept for tooling; lookups never read them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comments {
    pub translator: Vec<String>,
    pub extracted: Vec<String>,
    pub references: Vec<String>,
    pub flags: Vec<String>,
    pub previous: Vec<String>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.translator.is_empty()
            && self.extracted.is_empty()
            && self.references.is_empty()
            && self.flags.is_empty()
            && self.previous.is_empty()
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|flag| flag == "fuzzy")
    }
}

/// All entries of one domain + locale, plus the metadata header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    header: Header,
    entries: HashMap<MessageKey, MessageEntry>,
    comments: HashMap<MessageKey, Comments>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn set_header(&mut self, header: Header) {
        self.header = header;
    }

    /// Adds an entry, returning the one it replaced.
    ///
    /// The metadata key (empty `msgid`) is never stored as an entry: its singular
    /// text is parsed into the header instead.
    pub fn insert(&mut self, key: MessageKey, entry: MessageEntry) -> Option<MessageEntry> {
        if key.is_header() {
            self.header = Header::parse(&entry.singular);
            return None;
        }
        self.entries.insert(key, entry)
    }

    pub(crate) fn insert_comments(&mut self, key: MessageKey, comments: Comments) {
        if !comments.is_empty() {
            self.comments.insert(key, comments);
        }
    }

    pub fn get(&self, key: &MessageKey) -> Option<&MessageEntry> {
        self.entries.get(key)
    }

    pub fn comments(&self, key: &MessageKey) -> Option<&Comments> {
        self.comments.get(key)
    }

    pub fn entries(&self) -> &HashMap<MessageKey, MessageEntry> {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MessageKey, &MessageEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_entry_has_one_form() {
        let entry = MessageEntry::singular("Bonjour");
        assert_eq!(entry.plural_forms, vec!["Bonjour".to_string()]);
        assert_eq!(entry.form(0), Some("Bonjour"));
        assert_eq!(entry.form(3), Some("Bonjour"));
    }

    #[test]
    fn plural_form_index_is_clamped() {
        let entry = MessageEntry::plural(["un fichier", "des fichiers"]);
        assert_eq!(entry.singular, "un fichier");
        assert_eq!(entry.form(1), Some("des fichiers"));
        assert_eq!(entry.form(42), Some("des fichiers"));
    }

    #[test]
    fn empty_entry_has_no_form() {
        let entry = MessageEntry::plural(Vec::<String>::new());
        assert_eq!(entry.form(0), None);
        assert!(entry.is_untranslated());
    }

    #[test]
    fn header_key_is_routed_to_header() {
        let mut catalog = Catalog::new();
        catalog.insert(
            MessageKey::singular("", ""),
            MessageEntry::singular("Language: de\n"),
        );

        assert!(catalog.is_empty());
        assert_eq!(catalog.header().language(), Some("de"));
    }

    #[test]
    fn context_only_key_is_a_regular_entry() {
        let mut catalog = Catalog::new();
        let key = MessageKey::singular("menu", "");
        catalog.insert(key.clone(), MessageEntry::singular("x"));

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(&key).is_some());
    }

    #[test]
    fn keys_differ_by_context_and_plural() {
        let mut catalog = Catalog::new();
        catalog.insert(MessageKey::singular("", "Open"), MessageEntry::singular("Ouvrir"));
        catalog.insert(
            MessageKey::singular("door", "Open"),
            MessageEntry::singular("Ouverte"),
        );
        catalog.insert(
            MessageKey::new("", "Open", "Opens"),
            MessageEntry::plural(["Ouvre", "Ouvrent"]),
        );

        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get(&MessageKey::singular("door", "Open")).map(|e| e.singular.as_str()),
            Some("Ouverte")
        );
    }
}
