#![doc = include_str!("../README.md")]

pub mod error;
mod expr;
mod languages;

pub use error::PluralRuleError;

use expr::Expr;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Selector {
    Expression(Arc<Expr>),
    Identity,
    Singular,
}

/// A compiled plural rule: maps a count to a zero-based plural-form index.
///
/// The index is always below [`PluralRule::nplurals`]. Rules are cheap to clone
/// and safe to share between threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluralRule {
    nplurals: usize,
    selector: Selector,
    source: Arc<str>,
}

impl PluralRule {
    /// Compiles a `Plural-Forms` header value such as
    /// `nplurals=2; plural=(n != 1);`.
    pub fn parse(header: &str) -> Result<Self, PluralRuleError> {
        let header = header.trim();
        if header.is_empty() {
            return Err(PluralRuleError::Empty);
        }

        let nplurals = parse_nplurals(header)?;
        let expression = field(header, "plural").ok_or(PluralRuleError::MissingExpression)?;
        let expr = expr::parse(expression)?;

        Ok(Self {
            nplurals,
            selector: Selector::Expression(Arc::new(expr)),
            source: Arc::from(header),
        })
    }

    /// Builds the rule for a catalog header, never failing.
    ///
    /// No header gives [`PluralRule::singular`]. A header whose `nplurals` is
    /// readable but whose expression is not gives [`PluralRule::identity`].
    /// Anything else malformed falls back to the singular rule.
    pub fn from_header(header: Option<&str>) -> Self {
        let Some(header) = header else {
            return Self::singular();
        };
        match Self::parse(header) {
            Ok(rule) => rule,
            Err(err) => match parse_nplurals(header.trim()) {
                Ok(nplurals) => {
                    tracing::warn!(
                        "Invalid plural expression in '{}': {}; using identity rule with {} forms",
                        header,
                        err,
                        nplurals
                    );
                    Self::identity(nplurals)
                },
                Err(_) => {
                    tracing::warn!("Invalid Plural-Forms header '{}': {}", header, err);
                    Self::singular()
                },
            },
        }
    }

    /// `index = min(n, nplurals - 1)`.
    pub fn identity(nplurals: usize) -> Self {
        let nplurals = nplurals.max(1);
        Self {
            nplurals,
            selector: Selector::Identity,
            source: Arc::from(format!("nplurals={}; plural=n;", nplurals)),
        }
    }

    /// Always selects index 0.
    pub fn singular() -> Self {
        Self {
            nplurals: 1,
            selector: Selector::Singular,
            source: Arc::from("nplurals=1; plural=0;"),
        }
    }

    /// The standard rule of a language, looked up by code prefix (`pt_BR`,
    /// `en_US.UTF-8`, `ru`...). Unknown languages get the singular rule.
    pub fn for_language(lang: &str) -> Self {
        languages::plural_forms_for(lang)
            .and_then(|header| Self::parse(header).ok())
            .unwrap_or_else(Self::singular)
    }

    /// The declared number of plural forms.
    pub fn nplurals(&self) -> usize {
        self.nplurals
    }

    /// The plural-form index for count `n`, clamped to `nplurals - 1`.
    pub fn index(&self, n: u64) -> usize {
        let raw = match &self.selector {
            Selector::Expression(expr) => expr.eval(n),
            Selector::Identity => n,
            Selector::Singular => 0,
        };
        let last = self.nplurals.saturating_sub(1);
        usize::try_from(raw).map_or(last, |index| index.min(last))
    }
}

impl Default for PluralRule {
    fn default() -> Self {
        Self::singular()
    }
}

impl fmt::Display for PluralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn field<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_nplurals(header: &str) -> Result<usize, PluralRuleError> {
    let raw = field(header, "nplurals").ok_or(PluralRuleError::MissingNplurals)?;
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PluralRuleError::InvalidNplurals(raw.to_string())),
    }
}
