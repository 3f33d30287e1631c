//! Lexer, recursive-descent parser and evaluator for plural expressions.

use crate::error::PluralRuleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Expr {
    Literal(u64),
    N,
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub(crate) fn eval(&self, n: u64) -> u64 {
        match self {
            Self::Literal(value) => *value,
            Self::N => n,
            Self::Not(inner) => u64::from(inner.eval(n) == 0),
            Self::Binary(BinaryOp::And, lhs, rhs) => {
                u64::from(lhs.eval(n) != 0 && rhs.eval(n) != 0)
            },
            Self::Binary(BinaryOp::Or, lhs, rhs) => {
                u64::from(lhs.eval(n) != 0 || rhs.eval(n) != 0)
            },
            Self::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(n), rhs.eval(n));
                match op {
                    BinaryOp::Rem => a.checked_rem(b).unwrap_or(0),
                    BinaryOp::Eq => u64::from(a == b),
                    BinaryOp::Ne => u64::from(a != b),
                    BinaryOp::Lt => u64::from(a < b),
                    BinaryOp::Gt => u64::from(a > b),
                    BinaryOp::Le => u64::from(a <= b),
                    BinaryOp::Ge => u64::from(a >= b),
                    BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit operators handled above"),
                }
            },
            Self::Ternary(cond, then, otherwise) => {
                if cond.eval(n) != 0 {
                    then.eval(n)
                } else {
                    otherwise.eval(n)
                }
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Number(u64),
    N,
    Op(BinaryOp),
    Not,
    LParen,
    RParen,
    Question,
    Colon,
}

fn tokenize(source: &str) -> Result<Vec<(usize, Token)>, PluralRuleError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let next = bytes.get(pos + 1).copied();
        let (token, width) = match bytes[pos] {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
                continue;
            },
            b'0'..=b'9' => {
                let end = bytes[pos..]
                    .iter()
                    .position(|b| !b.is_ascii_digit())
                    .map_or(bytes.len(), |len| pos + len);
                let value = source[pos..end]
                    .parse::<u64>()
                    .map_err(|_| PluralRuleError::LiteralOutOfRange { offset: pos })?;
                (Token::Number(value), end - pos)
            },
            b'n' => (Token::N, 1),
            b'%' => (Token::Op(BinaryOp::Rem), 1),
            b'=' if next == Some(b'=') => (Token::Op(BinaryOp::Eq), 2),
            b'!' if next == Some(b'=') => (Token::Op(BinaryOp::Ne), 2),
            b'!' => (Token::Not, 1),
            b'<' if next == Some(b'=') => (Token::Op(BinaryOp::Le), 2),
            b'<' => (Token::Op(BinaryOp::Lt), 1),
            b'>' if next == Some(b'=') => (Token::Op(BinaryOp::Ge), 2),
            b'>' => (Token::Op(BinaryOp::Gt), 1),
            b'&' if next == Some(b'&') => (Token::Op(BinaryOp::And), 2),
            b'|' if next == Some(b'|') => (Token::Op(BinaryOp::Or), 2),
            b'(' => (Token::LParen, 1),
            b')' => (Token::RParen, 1),
            b'?' => (Token::Question, 1),
            b':' => (Token::Colon, 1),
            _ => {
                let found = source[pos..].chars().next().unwrap_or('\u{fffd}');
                return Err(PluralRuleError::UnexpectedChar { offset: pos, found });
            },
        };
        tokens.push((start, token));
        pos += width;
    }
    Ok(tokens)
}

/// Deepest expression tree, and deepest parser recursion, accepted.
///
/// The standard formulas stay below 16.
pub(crate) const MAX_DEPTH: usize = 64;

/// Parses a plural expression into an evaluable tree.
pub(crate) fn parse(source: &str) -> Result<Expr, PluralRuleError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(PluralRuleError::MissingExpression);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        nesting: 0,
    };
    let (expr, _) = parser.ternary()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(expr),
        Some(&(offset, _)) => Err(PluralRuleError::UnexpectedToken { offset }),
    }
}

/// A parsed subexpression and the height of its tree.
type Parsed = (Expr, usize);

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|&(_, token)| token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |&(offset, _)| offset)
    }

    fn expect(&mut self, wanted: Token) -> Result<(), PluralRuleError> {
        match self.tokens.get(self.pos) {
            Some(&(_, token)) if token == wanted => {
                self.pos += 1;
                Ok(())
            },
            Some(&(offset, _)) => Err(PluralRuleError::UnexpectedToken { offset }),
            None => Err(PluralRuleError::UnexpectedEnd),
        }
    }

    fn enter(&mut self) -> Result<(), PluralRuleError> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(PluralRuleError::TooDeep {
                offset: self.offset(),
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    /// Height of a node over children of the given heights.
    fn node_height(&self, children: &[usize]) -> Result<usize, PluralRuleError> {
        let height = children.iter().copied().max().unwrap_or(0) + 1;
        if height > MAX_DEPTH {
            return Err(PluralRuleError::TooDeep {
                offset: self.offset(),
            });
        }
        Ok(height)
    }

    /// Consumes the next token when it is one of `ops`.
    fn binary_op(&mut self, ops: &[BinaryOp]) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(&op) => {
                self.pos += 1;
                Some(op)
            },
            _ => None,
        }
    }

    fn ternary(&mut self) -> Result<Parsed, PluralRuleError> {
        self.enter()?;
        let (cond, cond_height) = self.or()?;
        if self.peek() != Some(Token::Question) {
            self.leave();
            return Ok((cond, cond_height));
        }
        self.pos += 1;
        let (then, then_height) = self.ternary()?;
        self.expect(Token::Colon)?;
        let (otherwise, otherwise_height) = self.ternary()?;
        let height = self.node_height(&[cond_height, then_height, otherwise_height])?;
        self.leave();
        Ok((
            Expr::Ternary(Box::new(cond), Box::new(then), Box::new(otherwise)),
            height,
        ))
    }

    fn left_assoc(
        &mut self,
        ops: &[BinaryOp],
        next: fn(&mut Self) -> Result<Parsed, PluralRuleError>,
    ) -> Result<Parsed, PluralRuleError> {
        let (mut lhs, mut height) = next(self)?;
        while let Some(op) = self.binary_op(ops) {
            let (rhs, rhs_height) = next(self)?;
            height = self.node_height(&[height, rhs_height])?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok((lhs, height))
    }

    fn or(&mut self) -> Result<Parsed, PluralRuleError> {
        self.left_assoc(&[BinaryOp::Or], Self::and)
    }

    fn and(&mut self) -> Result<Parsed, PluralRuleError> {
        self.left_assoc(&[BinaryOp::And], Self::equality)
    }

    fn equality(&mut self) -> Result<Parsed, PluralRuleError> {
        self.left_assoc(&[BinaryOp::Eq, BinaryOp::Ne], Self::relational)
    }

    fn relational(&mut self) -> Result<Parsed, PluralRuleError> {
        self.left_assoc(
            &[BinaryOp::Lt, BinaryOp::Gt, BinaryOp::Le, BinaryOp::Ge],
            Self::remainder,
        )
    }

    fn remainder(&mut self) -> Result<Parsed, PluralRuleError> {
        self.left_assoc(&[BinaryOp::Rem], Self::unary)
    }

    fn unary(&mut self) -> Result<Parsed, PluralRuleError> {
        if self.peek() != Some(Token::Not) {
            return self.primary();
        }
        self.pos += 1;
        self.enter()?;
        let (inner, inner_height) = self.unary()?;
        let height = self.node_height(&[inner_height])?;
        self.leave();
        Ok((Expr::Not(Box::new(inner)), height))
    }

    fn primary(&mut self) -> Result<Parsed, PluralRuleError> {
        let Some(&(offset, token)) = self.tokens.get(self.pos) else {
            return Err(PluralRuleError::UnexpectedEnd);
        };
        self.pos += 1;
        match token {
            Token::Number(value) => Ok((Expr::Literal(value), 0)),
            Token::N => Ok((Expr::N, 0)),
            Token::LParen => {
                let inner = self.ternary()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            },
            _ => Err(PluralRuleError::UnexpectedToken { offset }),
        }
    }
}
