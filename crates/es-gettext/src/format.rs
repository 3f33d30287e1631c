use std::fmt::{self, Write as _};

/// Replaces `{%N=description}` placeholders with the `N`th argument (1-based).
///
/// The description documents the value for translators and is dropped.
/// Placeholders whose index has no argument, and anything that is not a
/// well-formed placeholder, are kept verbatim.
pub fn format_placeholders(text: &str, args: &[&dyn fmt::Display]) -> String {
    if args.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{%") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match parse_placeholder(candidate) {
            Some((index, len)) => {
                match index.checked_sub(1).and_then(|slot| args.get(slot)) {
                    Some(arg) => {
                        let _ = write!(out, "{}", arg);
                    },
                    None => out.push_str(&candidate[..len]),
                }
                rest = &candidate[len..];
            },
            None => {
                out.push_str("{%");
                rest = &candidate[2..];
            },
        }
    }
    out.push_str(rest);
    out
}

/// Parses `{%<digits>=<description>}` at the start of `text`, returning the
/// index and the placeholder's byte length. The description is non-empty and
/// holds no braces.
fn parse_placeholder(text: &str) -> Option<(usize, usize)> {
    let body = text.strip_prefix("{%")?;
    let digits = body.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let index: usize = body[..digits].parse().ok()?;

    let after = body[digits..].strip_prefix('=')?;
    let description = after.find(['{', '}']).filter(|&end| end > 0)?;
    if !after[description..].starts_with('}') {
        return None;
    }

    let len = 2 + digits + 1 + description + 1;
    Some((index, len))
}
