//! Formula parsing and validation.
//!
//! A [`Formula`] is an infix arithmetic expression over numeric literals and
//! variable names, e.g. `(A1 + 2.5) * B2`. Construction lexes the text into
//! tokens, normalizes every variable, and validates the token stream:
//!
//! - only `(`, `)`, `+`, `-`, `*`, `/`, variables and numbers are legal tokens
//! - parentheses must balance, and never close more than they opened
//! - the expression must start with a number, variable or `(`
//! - the expression must end with a number, variable or `)`
//! - operands and operators must alternate
//!
//! Once built, a formula is immutable. Its canonical form (normalized tokens
//! joined without whitespace) is what equality, hashing and `Display` use.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use super::name::{accept_all, identity, is_valid_name};

/// Reasons a formula can be rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("Formula must contain at least one token")]
    Empty,

    #[error("Invalid token: {0:?}")]
    InvalidToken(String),

    #[error("Numeric literal out of range: {0}")]
    NumberOutOfRange(String),

    #[error("Unmatched ')'")]
    UnmatchedClose,

    #[error("Unbalanced parentheses: {open} opened, {close} closed")]
    UnbalancedParens { open: usize, close: usize },

    #[error("Formula cannot start with {0:?}")]
    InvalidStart(String),

    #[error("Formula cannot end with {0:?}")]
    InvalidEnd(String),

    #[error("Expected a number, variable or '(' after {after:?}, found {found:?}")]
    ExpectedOperand { after: String, found: String },

    #[error("Expected an operator or ')' after {after:?}, found {found:?}")]
    ExpectedOperator { after: String, found: String },

    #[error("Invalid variable: {0}")]
    InvalidVariable(String),
}

/// Binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Op::Mul | Op::Div)
    }

    fn from_symbol(s: &str) -> Option<Op> {
        match s {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            "/" => Some(Op::Div),
            _ => None,
        }
    }
}

/// A validated formula token. Variables are already normalized.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Variable(String),
    Op(Op),
    LParen,
    RParen,
}

impl Token {
    /// Tokens that may begin an operand: a number, a variable or `(`.
    fn opens_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_) | Token::LParen)
    }

    /// Tokens that may end an operand: a number, a variable or `)`.
    fn closes_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_) | Token::RParen)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Variable(v) => f.write_str(v),
            Token::Op(op) => write!(f, "{}", op.symbol()),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?P<lparen>\()
            | (?P<rparen>\))
            | (?P<op>[-+*/])
            | (?P<var>[A-Za-z_][A-Za-z0-9_]*)
            | (?P<num>(?:[0-9]+\.[0-9]*|[0-9]*\.[0-9]+|[0-9]+)(?:[eE][-+]?[0-9]+)?)
            | (?P<ws>\s+)",
        )
        .unwrap()
    })
}

/// Split `input` into raw lexemes. Any text the lexer cannot match is
/// reported as an invalid token.
fn lex(input: &str) -> Result<Vec<(&'static str, &str)>, FormulaError> {
    let mut lexemes = Vec::new();
    let mut last = 0;

    for caps in token_re().captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            return Err(FormulaError::InvalidToken(
                input[last..whole.start()].to_string(),
            ));
        }
        last = whole.end();

        let kind = ["lparen", "rparen", "op", "var", "num"]
            .into_iter()
            .find(|group| caps.name(group).is_some());
        if let Some(kind) = kind {
            lexemes.push((kind, whole.as_str()));
        }
    }

    if last < input.len() {
        return Err(FormulaError::InvalidToken(input[last..].to_string()));
    }
    Ok(lexemes)
}

/// An immutable, validated arithmetic formula.
#[derive(Clone, Debug)]
pub struct Formula {
    tokens: Vec<Token>,
    variables: Vec<String>,
    canonical: String,
}

impl Formula {
    /// Parse a formula with identity normalization and no extra validation.
    pub fn new(input: &str) -> Result<Formula, FormulaError> {
        Self::with_rules(input, identity, accept_all)
    }

    /// Parse a formula, normalizing every variable with `normalize` and
    /// rejecting any normalized variable for which `is_valid` returns false.
    pub fn with_rules<N, V>(input: &str, normalize: N, is_valid: V) -> Result<Formula, FormulaError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let mut tokens = Vec::new();
        for (kind, text) in lex(input)? {
            let token = match kind {
                "lparen" => Token::LParen,
                "rparen" => Token::RParen,
                "num" => Token::Number(parse_number(text)?),
                "var" => {
                    let normalized = normalize(text);
                    if !is_valid_name(&normalized) || !is_valid(&normalized) {
                        return Err(FormulaError::InvalidVariable(normalized));
                    }
                    Token::Variable(normalized)
                }
                _ => match Op::from_symbol(text) {
                    Some(op) => Token::Op(op),
                    None => return Err(FormulaError::InvalidToken(text.to_string())),
                },
            };
            tokens.push(token);
        }

        validate(&tokens)?;

        let mut variables: Vec<String> = Vec::new();
        for token in &tokens {
            if let Token::Variable(v) = token
                && !variables.contains(v)
            {
                variables.push(v.clone());
            }
        }

        let canonical = tokens.iter().map(Token::to_string).collect();

        Ok(Formula {
            tokens,
            variables,
            canonical,
        })
    }

    /// Distinct normalized variables, in order of first occurrence.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The canonical, whitespace-free form of this formula.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

fn parse_number(text: &str) -> Result<f64, FormulaError> {
    let n: f64 = text
        .parse()
        .map_err(|_| FormulaError::InvalidToken(text.to_string()))?;
    if n.is_finite() {
        Ok(n)
    } else {
        Err(FormulaError::NumberOutOfRange(text.to_string()))
    }
}

/// Check token adjacency, start/end legality and parenthesis balance.
fn validate(tokens: &[Token]) -> Result<(), FormulaError> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(FormulaError::Empty);
    };

    if !first.opens_operand() {
        return Err(FormulaError::InvalidStart(first.to_string()));
    }
    if !last.closes_operand() {
        return Err(FormulaError::InvalidEnd(last.to_string()));
    }

    let mut open = 0usize;
    let mut close = 0usize;
    let mut prev: Option<&Token> = None;

    for token in tokens {
        if let Some(prev) = prev {
            if prev.closes_operand() {
                if token.opens_operand() {
                    return Err(FormulaError::ExpectedOperator {
                        after: prev.to_string(),
                        found: token.to_string(),
                    });
                }
            } else if !token.opens_operand() {
                return Err(FormulaError::ExpectedOperand {
                    after: prev.to_string(),
                    found: token.to_string(),
                });
            }
        }

        match token {
            Token::LParen => open += 1,
            Token::RParen => {
                close += 1;
                if close > open {
                    return Err(FormulaError::UnmatchedClose);
                }
            }
            _ => {}
        }
        prev = Some(token);
    }

    if open != close {
        return Err(FormulaError::UnbalancedParens { open, close });
    }
    Ok(())
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::new(s)
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Formula::new(&text).map_err(serde::de::Error::custom)
    }
}
