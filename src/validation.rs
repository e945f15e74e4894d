//! Declarative request validation.
//!
//! Each request type lists its rules as `(field, rule, message)` entries. Every rule is
//! evaluated and all failures are returned together, so the client sees the complete list.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-empty after trimming.
    Required,
    Email,
    MinChars(usize),
    HasDigit,
    HasUppercase,
    HasLowercase,
}

impl Rule {
    pub fn check(self, value: &str) -> bool {
        match self {
            Rule::Required => !value.trim().is_empty(),
            Rule::Email => is_valid_email(value.trim()),
            Rule::MinChars(min) => value.chars().count() >= min,
            Rule::HasDigit => value.chars().any(|c| c.is_ascii_digit()),
            Rule::HasUppercase => value.chars().any(|c| c.is_ascii_uppercase()),
            Rule::HasLowercase => value.chars().any(|c| c.is_ascii_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

impl FieldRule {
    pub const fn new(field: &'static str, rule: Rule, message: &'static str) -> Self {
        Self { field, rule, message }
    }
}

/// Request bodies expose their raw string fields by name.
pub trait Fields {
    fn field(&self, name: &str) -> &str;
}

pub fn validate<T: Fields>(input: &T, rules: &[FieldRule]) -> Vec<FieldError> {
    rules
        .iter()
        .filter(|r| !r.rule.check(input.field(r.field)))
        .map(|r| FieldError {
            field: r.field,
            message: r.message,
        })
        .collect()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

/// HTML-escapes a value before it is stored or compared.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            c => out.push(c),
        }
    }
    out
}
