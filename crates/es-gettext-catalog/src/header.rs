//! The metadata record stored under the empty `msgid`.

use indexmap::IndexMap;

pub const PLURAL_FORMS: &str = "Plural-Forms";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const LANGUAGE: &str = "Language";

/// Ordered `Key: value` pairs taken from a catalog's metadata entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    fields: IndexMap<String, String>,
}

impl Header {
    /// Parses the translated text of the metadata entry.
    ///
    /// Every line holding a colon becomes one field; other lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut fields = IndexMap::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            fields.insert(key.to_string(), value.trim().to_string());
        }
        Self { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Looks a field up by name, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The raw `Plural-Forms` value, e.g. `nplurals=2; plural=n != 1;`.
    pub fn plural_forms(&self) -> Option<&str> {
        self.get(PLURAL_FORMS).filter(|v| !v.is_empty())
    }

    pub fn language(&self) -> Option<&str> {
        self.get(LANGUAGE).filter(|v| !v.is_empty())
    }

    /// The `charset` parameter of `Content-Type`.
    pub fn charset(&self) -> Option<&str> {
        self.get(CONTENT_TYPE)?
            .split(';')
            .filter_map(|param| param.trim().split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Serializes back to the metadata entry text, one `Key: value\n` line per field.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (key, value) in &self.fields {
            text.push_str(key);
            text.push_str(": ");
            text.push_str(value);
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Project-Id-Version: hello 1.0\n\
        Report-Msgid-Bugs-To: \n\
        Language: zh_CN\n\
        Content-Type: text/plain; charset=UTF-8\n\
        Plural-Forms: nplurals=1; plural=0;\n";

    #[test]
    fn parses_known_fields() {
        let header = Header::parse(SAMPLE);

        assert_eq!(header.len(), 5);
        assert_eq!(header.get("Project-Id-Version"), Some("hello 1.0"));
        assert_eq!(header.get("Report-Msgid-Bugs-To"), Some(""));
        assert_eq!(header.language(), Some("zh_CN"));
        assert_eq!(header.charset(), Some("UTF-8"));
        assert_eq!(header.plural_forms(), Some("nplurals=1; plural=0;"));
    }

    #[test]
    fn lookup_ignores_case() {
        let header = Header::parse("plural-forms: nplurals=2; plural=n>1;\n");
        assert_eq!(header.plural_forms(), Some("nplurals=2; plural=n>1;"));
    }

    #[test]
    fn lines_without_colon_are_skipped() {
        let header = Header::parse("\njust text\nLanguage: fr\n");
        assert_eq!(header.len(), 1);
        assert_eq!(header.language(), Some("fr"));
    }

    #[test]
    fn to_text_reparses_to_same_header() {
        let header = Header::parse(SAMPLE);
        assert_eq!(Header::parse(&header.to_text()), header);
    }

    #[test]
    fn missing_charset_is_none() {
        let header = Header::parse("Content-Type: text/plain\n");
        assert_eq!(header.charset(), None);
    }
}
