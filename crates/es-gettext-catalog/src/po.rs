//! Decoder for the line-oriented text catalog format (`.po`).

use crate::error::{DecodeError, SyntaxError};
use crate::model::{Catalog, Comments, MessageEntry, MessageKey};
use std::collections::BTreeMap;

/// Highest accepted `msgstr[N]` index, exclusive.
pub const MAX_PLURAL_FORMS: usize = 64;

/// Decodes raw `.po` bytes.
pub fn decode(bytes: &[u8]) -> Result<Catalog, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    decode_str(text)
}

/// Decodes `.po` text.
pub fn decode_str(text: &str) -> Result<Catalog, DecodeError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut parser = Parser::default();
    for (index, line) in text.lines().enumerate() {
        parser.line = index + 1;
        parser.feed(line)?;
    }
    parser.finish()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str,
    StrPlural(usize),
}

#[derive(Debug, Default)]
struct Pending {
    comments: Comments,
    context: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: Option<String>,
    msgstr_plural: BTreeMap<usize, String>,
    obsolete: bool,
}

impl Pending {
    fn has_msgstr(&self) -> bool {
        self.msgstr.is_some() || !self.msgstr_plural.is_empty()
    }

    fn has_keywords(&self) -> bool {
        self.context.is_some() || self.msgid.is_some()
    }
}

#[derive(Debug, Default)]
struct Parser {
    catalog: Catalog,
    pending: Pending,
    field: Option<Field>,
    line: usize,
}

impl Parser {
    fn error(&self, kind: SyntaxError) -> DecodeError {
        DecodeError::syntax(self.line, kind)
    }

    fn feed(&mut self, raw: &str) -> Result<(), DecodeError> {
        let line = raw.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(comment) = line.strip_prefix('#') {
            return self.comment(comment);
        }

        if line.starts_with('"') {
            let value = parse_quoted(line).map_err(|kind| self.error(kind))?;
            return self.continuation(value);
        }

        self.keyword(line)
    }

    fn comment(&mut self, comment: &str) -> Result<(), DecodeError> {
        if comment.starts_with('~') {
            if self.pending.has_msgstr() {
                self.flush()?;
            }
            self.pending.obsolete = true;
            self.field = None;
            return Ok(());
        }

        // A comment opens the next record.
        if self.pending.has_msgstr() || self.pending.obsolete {
            self.flush()?;
        } else if self.pending.has_keywords() {
            return Err(self.error(SyntaxError::MissingMsgstr));
        }
        self.field = None;

        let comments = &mut self.pending.comments;
        match comment.chars().next() {
            Some('.') => comments.extracted.push(comment[1..].trim().to_string()),
            Some(':') => comments
                .references
                .extend(comment[1..].split_whitespace().map(str::to_string)),
            Some(',') => comments.flags.extend(
                comment[1..]
                    .split(',')
                    .map(str::trim)
                    .filter(|flag| !flag.is_empty())
                    .map(str::to_string),
            ),
            Some('|') => comments.previous.push(comment[1..].trim().to_string()),
            _ => comments
                .translator
                .push(comment.strip_prefix(' ').unwrap_or(comment).to_string()),
        }
        Ok(())
    }

    fn keyword(&mut self, line: &str) -> Result<(), DecodeError> {
        let name_len = line
            .find(|c: char| !(c.is_ascii_alphabetic() || c == '_'))
            .unwrap_or(line.len());
        let (name, rest) = line.split_at(name_len);

        match name {
            "msgctxt" => {
                self.open_record()?;
                if self.pending.context.is_some() {
                    return Err(self.error(SyntaxError::DuplicateKeyword("msgctxt")));
                }
                let value = self.quoted(rest)?;
                self.pending.context = Some(value);
                self.field = Some(Field::Context);
            },
            "msgid" => {
                self.open_record()?;
                let value = self.quoted(rest)?;
                self.pending.msgid = Some(value);
                self.field = Some(Field::Id);
            },
            "msgid_plural" => {
                if self.pending.msgid.is_none() || self.pending.has_msgstr() {
                    return Err(self.error(SyntaxError::OrphanedMsgidPlural));
                }
                if self.pending.msgid_plural.is_some() {
                    return Err(self.error(SyntaxError::DuplicateKeyword("msgid_plural")));
                }
                let value = self.quoted(rest)?;
                self.pending.msgid_plural = Some(value);
                self.field = Some(Field::IdPlural);
            },
            "msgstr" => {
                if self.pending.msgid.is_none() {
                    return Err(self.error(SyntaxError::OrphanedMsgstr));
                }
                let rest = rest.trim_start();
                if let Some(indexed) = rest.strip_prefix('[') {
                    let (index, value) = self.plural_index(indexed)?;
                    let value = self.quoted(value)?;
                    if self.pending.msgstr_plural.insert(index, value).is_some() {
                        return Err(self.error(SyntaxError::DuplicateKeyword("msgstr[]")));
                    }
                    self.field = Some(Field::StrPlural(index));
                } else {
                    if self.pending.msgstr.is_some() {
                        return Err(self.error(SyntaxError::DuplicateKeyword("msgstr")));
                    }
                    let value = self.quoted(rest)?;
                    self.pending.msgstr = Some(value);
                    self.field = Some(Field::Str);
                }
            },
            _ => {
                let token = line.split_whitespace().next().unwrap_or(line);
                return Err(self.error(SyntaxError::UnknownKeyword(token.to_string())));
            },
        }
        Ok(())
    }

    /// Reads `<digits>]` right after the `msgstr[` marker.
    ///
    /// Only the first `]` following the marker closes the index, so brackets
    /// inside the translated text cannot leak into it.
    fn plural_index<'a>(&self, after_marker: &'a str) -> Result<(usize, &'a str), DecodeError> {
        let close = after_marker
            .find(']')
            .ok_or_else(|| self.error(SyntaxError::BadPluralIndex))?;
        let index = after_marker[..close]
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&index| index < MAX_PLURAL_FORMS)
            .ok_or_else(|| self.error(SyntaxError::BadPluralIndex))?;
        Ok((index, &after_marker[close + 1..]))
    }

    fn quoted(&self, rest: &str) -> Result<String, DecodeError> {
        parse_quoted(rest.trim()).map_err(|kind| self.error(kind))
    }

    /// Called before `msgctxt`/`msgid`: closes a finished record.
    fn open_record(&mut self) -> Result<(), DecodeError> {
        if self.pending.has_msgstr() {
            self.flush()?;
        } else if self.pending.msgid.is_some() {
            return Err(self.error(SyntaxError::MissingMsgstr));
        } else if self.pending.obsolete {
            self.pending = Pending::default();
        }
        Ok(())
    }

    fn continuation(&mut self, value: String) -> Result<(), DecodeError> {
        if self.pending.obsolete {
            return Ok(());
        }
        let line = self.line;
        let target = match self.field {
            Some(Field::Context) => self.pending.context.as_mut(),
            Some(Field::Id) => self.pending.msgid.as_mut(),
            Some(Field::IdPlural) => self.pending.msgid_plural.as_mut(),
            Some(Field::Str) => self.pending.msgstr.as_mut(),
            Some(Field::StrPlural(index)) => self.pending.msgstr_plural.get_mut(&index),
            None => None,
        };
        match target {
            Some(field) => {
                field.push_str(&value);
                Ok(())
            },
            None => Err(DecodeError::syntax(line, SyntaxError::DanglingContinuation)),
        }
    }

    fn flush(&mut self) -> Result<(), DecodeError> {
        let pending = std::mem::take(&mut self.pending);
        self.field = None;
        if pending.obsolete {
            return Ok(());
        }

        let Some(msgid) = pending.msgid else {
            return Ok(());
        };

        let entry = if pending.msgid_plural.is_some() || !pending.msgstr_plural.is_empty() {
            let len = pending
                .msgstr_plural
                .keys()
                .next_back()
                .map_or(0, |last| last.saturating_add(1));
            let mut forms = vec![String::new(); len.min(MAX_PLURAL_FORMS)];
            for (index, form) in pending.msgstr_plural {
                if let Some(slot) = forms.get_mut(index) {
                    *slot = form;
                }
            }
            if forms.is_empty() {
                forms.push(pending.msgstr.unwrap_or_default());
            }
            MessageEntry::plural(forms)
        } else {
            MessageEntry::singular(pending.msgstr.unwrap_or_default())
        };

        let key = MessageKey::new(
            pending.context.unwrap_or_default(),
            msgid,
            pending.msgid_plural.unwrap_or_default(),
        );
        if !key.is_header() {
            self.catalog.insert_comments(key.clone(), pending.comments);
        }
        if self.catalog.insert(key.clone(), entry).is_some() {
            tracing::debug!("Duplicate catalog entry {:?}, keeping the last one", key);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Catalog, DecodeError> {
        if self.pending.has_keywords() && !self.pending.has_msgstr() && !self.pending.obsolete {
            return Err(self.error(SyntaxError::MissingMsgstr));
        }
        self.flush()?;
        Ok(self.catalog)
    }
}

/// Parses one double-quoted segment, decoding C-style escapes.
fn parse_quoted(segment: &str) -> Result<String, SyntaxError> {
    let body = segment
        .strip_prefix('"')
        .ok_or(SyntaxError::ExpectedString)?;

    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.char_indices();
    loop {
        let Some((at, c)) = chars.next() else {
            return Err(SyntaxError::UnterminatedString);
        };
        match c {
            '"' => {
                let trailing = body[at + 1..].trim();
                if !trailing.is_empty() {
                    return Err(SyntaxError::TrailingContent(trailing.to_string()));
                }
                break;
            },
            '\\' => {
                let (_, escape) = chars.next().ok_or(SyntaxError::UnterminatedString)?;
                match escape {
                    'n' => bytes.push(b'\n'),
                    't' => bytes.push(b'\t'),
                    'r' => bytes.push(b'\r'),
                    'a' => bytes.push(0x07),
                    'b' => bytes.push(0x08),
                    'f' => bytes.push(0x0c),
                    'v' => bytes.push(0x0b),
                    '"' | '\\' | '\'' | '?' => bytes.push(escape as u8),
                    '0'..='7' => {
                        let mut value = escape as u32 - '0' as u32;
                        for _ in 0..2 {
                            match chars.clone().next() {
                                Some((_, d @ '0'..='7')) => {
                                    value = value * 8 + (d as u32 - '0' as u32);
                                    chars.next();
                                },
                                _ => break,
                            }
                        }
                        bytes.push((value & 0xff) as u8);
                    },
                    'x' => {
                        let mut value = 0u32;
                        let mut digits = 0;
                        while digits < 2 {
                            match chars.clone().next().and_then(|(_, d)| d.to_digit(16)) {
                                Some(d) => {
                                    value = value * 16 + d;
                                    chars.next();
                                    digits += 1;
                                },
                                None => break,
                            }
                        }
                        if digits == 0 {
                            return Err(SyntaxError::InvalidEscape('x'));
                        }
                        bytes.push(value as u8);
                    },
                    other => return Err(SyntaxError::InvalidEscape(other)),
                }
            },
            other => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            },
        }
    }

    // Octal and hex escapes may spell out multi-byte sequences.
    String::from_utf8(bytes).map_err(|_| SyntaxError::InvalidEscape('x'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key(context: &str, msgid: &str, plural: &str) -> MessageKey {
        MessageKey::new(context, msgid, plural)
    }

    #[test]
    fn decodes_singular_entry() {
        let catalog = decode_str("msgid \"Hello\"\nmsgstr \"Bonjour\"\n").unwrap();
        assert_eq!(
            catalog.get(&key("", "Hello", "")),
            Some(&MessageEntry::singular("Bonjour"))
        );
    }

    #[test]
    fn decodes_context_and_plural() {
        let text = r#"
msgctxt "files"
msgid "%d file"
msgid_plural "%d files"
msgstr[0] "%d fichier"
msgstr[1] "%d fichiers"
"#;
        let catalog = decode_str(text).unwrap();
        let entry = catalog.get(&key("files", "%d file", "%d files")).unwrap();
        assert_eq!(entry.plural_forms, vec!["%d fichier", "%d fichiers"]);
        assert_eq!(entry.singular, "%d fichier");
    }

    #[test]
    fn concatenates_continuation_lines() {
        let text = "msgid \"\"\n\"Hello, \"\n\"world\"\nmsgstr \"\"\n\"Bonjour, \"\n\"monde\"\n";
        let catalog = decode_str(text).unwrap();
        assert_eq!(
            catalog.get(&key("", "Hello, world", "")).map(|e| e.singular.as_str()),
            Some("Bonjour, monde")
        );
    }

    #[test]
    fn decodes_escapes() {
        let text = r#"msgid "a\tb\n\"q\"\\ \101\x42"
msgstr "ok"
"#;
        let catalog = decode_str(text).unwrap();
        assert!(catalog.get(&key("", "a\tb\n\"q\"\\ AB", "")).is_some());
    }

    #[test]
    fn octal_escapes_can_spell_utf8() {
        let text = "msgid \"caf\\303\\251\"\nmsgstr \"x\"\n";
        let catalog = decode_str(text).unwrap();
        assert!(catalog.get(&key("", "café", "")).is_some());
    }

    #[test]
    fn header_is_parsed_not_stored() {
        let text = r#"
# SOME DESCRIPTIVE TITLE.
msgid ""
msgstr ""
"Language: pt_BR\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Plural-Forms: nplurals=2; plural=n > 1;\n"

msgid "Yes"
msgstr "Sim"
"#;
        let catalog = decode_str(text).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.header().language(), Some("pt_BR"));
        assert_eq!(catalog.header().plural_forms(), Some("nplurals=2; plural=n > 1;"));
        assert!(catalog.get(&key("", "", "")).is_none());
    }

    #[test]
    fn bracketed_translation_does_not_confuse_index() {
        let text = "msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[0] \"x [9] y]\"\nmsgstr[1] \"[z]\"\n";
        let catalog = decode_str(text).unwrap();
        assert_eq!(
            catalog.get(&key("", "a", "b")).unwrap().plural_forms,
            vec!["x [9] y]", "[z]"]
        );
    }

    #[test]
    fn collects_comments() {
        let text = r#"
# translator note
#. extracted note
#: src/main.rs:10 src/lib.rs:3
#, fuzzy, c-format
#| msgid "Old"
msgid "New"
msgstr "Neu"
"#;
        let catalog = decode_str(text).unwrap();
        let comments = catalog.comments(&key("", "New", "")).unwrap();
        assert_eq!(comments.translator, vec!["translator note"]);
        assert_eq!(comments.extracted, vec!["extracted note"]);
        assert_eq!(comments.references, vec!["src/main.rs:10", "src/lib.rs:3"]);
        assert_eq!(comments.flags, vec!["fuzzy", "c-format"]);
        assert_eq!(comments.previous, vec!["msgid \"Old\""]);
        assert!(comments.is_fuzzy());
    }

    #[test]
    fn obsolete_entries_are_skipped() {
        let text = r#"
msgid "Kept"
msgstr "Behalten"

#~ msgid "Gone"
#~ msgstr "Weg"

msgid "Also kept"
msgstr "Auch behalten"
"#;
        let catalog = decode_str(text).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(&key("", "Gone", "")).is_none());
    }

    #[test]
    fn orphaned_msgstr_is_an_error() {
        let err = decode_str("msgstr \"lonely\"\n").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Syntax {
                line: 1,
                kind: SyntaxError::OrphanedMsgstr
            }
        ));
    }

    #[test]
    fn msgid_without_msgstr_is_an_error() {
        let err = decode_str("msgid \"a\"\nmsgid \"b\"\nmsgstr \"c\"\n").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Syntax {
                line: 2,
                kind: SyntaxError::MissingMsgstr
            }
        ));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = decode_str("msgid \"open\nmsgstr \"x\"\n").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Syntax {
                kind: SyntaxError::UnterminatedString,
                ..
            }
        ));
    }

    #[test]
    fn bad_plural_index_is_an_error() {
        let err = decode_str("msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[x] \"c\"\n").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Syntax {
                line: 3,
                kind: SyntaxError::BadPluralIndex
            }
        ));
    }

    #[rstest]
    #[case::max_usize("18446744073709551615")]
    #[case::huge("400000000")]
    #[case::just_past_limit("64")]
    fn out_of_range_plural_index_is_an_error(#[case] index: &str) {
        let text = format!("msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[{index}] \"c\"\n");
        assert!(matches!(
            decode_str(&text),
            Err(DecodeError::Syntax {
                line: 3,
                kind: SyntaxError::BadPluralIndex
            })
        ));
    }

    #[test]
    fn sparse_plural_indices_leave_gaps_empty() {
        let catalog = decode_str(
            "msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[0] \"x\"\nmsgstr[63] \"y\"\n",
        )
        .unwrap();
        let entry = catalog.get(&MessageKey::new("", "a", "b")).unwrap();
        assert_eq!(entry.plural_forms.len(), MAX_PLURAL_FORMS);
        assert_eq!(entry.plural_forms[0], "x");
        assert_eq!(entry.plural_forms[1], "");
        assert_eq!(entry.plural_forms[63], "y");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(matches!(
            decode(b"msgid \"\xff\"\nmsgstr \"\"\n"),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn untranslated_entries_are_kept_empty() {
        let catalog = decode_str("msgid \"Todo\"\nmsgstr \"\"\n").unwrap();
        assert!(catalog.get(&key("", "Todo", "")).unwrap().is_untranslated());
    }
}
