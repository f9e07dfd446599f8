use convert_case::{Case, Casing};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NON_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static identifier pattern"));

/// Whole-token symbols and the words they are named by. Longer symbols first.
const SYMBOL_NAMES: &[(&str, &str)] = &[
    ("<=", "LessOrEqual"),
    (">=", "GreaterOrEqual"),
    ("!=", "NotEqual"),
    ("<", "LessThan"),
    (">", "GreaterThan"),
    ("=", "Equal"),
    ("*", "Asterisk"),
    ("+", "Plus"),
    ("-", "Minus"),
    ("/", "Slash"),
    ("%", "Percent"),
    ("~", "Approximately"),
    ("&", "And"),
    ("|", "Or"),
];

/// Word-boundary recasing applied to a sanitized raw name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingConvention {
    PascalCase,
    CamelCase,
    SnakeCase,
    UpperSnakeCase,
    /// Word separators removed, casing untouched.
    AsIs,
}

impl NamingConvention {
    /// Recase already-sanitized text.
    pub fn apply(&self, input: &str) -> String {
        match self {
            NamingConvention::PascalCase => input.to_case(Case::Pascal),
            NamingConvention::CamelCase => input.to_case(Case::Camel),
            NamingConvention::SnakeCase => input.to_case(Case::Snake),
            NamingConvention::UpperSnakeCase => input.to_case(Case::Snake).to_uppercase(),
            NamingConvention::AsIs => input.split_whitespace().collect(),
        }
    }

    /// Sanitize then recase.
    pub fn convert(&self, raw: &str) -> String {
        self.apply(&sanitize(raw))
    }
}

/// How a reserved word is made safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EscapeStrategy {
    Prefix(String),
    Suffix(String),
}

impl EscapeStrategy {
    pub fn apply(&self, name: &str) -> String {
        match self {
            EscapeStrategy::Prefix(prefix) => format!("{prefix}{name}"),
            EscapeStrategy::Suffix(suffix) => format!("{name}{suffix}"),
        }
    }
}

/// Name a symbol-only token, if it is one.
pub fn symbol_name(token: &str) -> Option<&'static str> {
    SYMBOL_NAMES
        .iter()
        .find(|(symbol, _)| *symbol == token)
        .map(|(_, word)| *word)
}

/// Reduce raw schema text to space-separated ASCII words.
///
/// Choice markers (`[x]`) are dropped and whole-token symbols are replaced by
/// their names. The result may be empty.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix("[x]").unwrap_or(trimmed);

    if let Some(word) = symbol_name(trimmed) {
        return word.to_string();
    }

    NON_IDENTIFIER.replace_all(trimmed, " ").trim().to_string()
}

/// Uppercase the first character and leave the rest untouched.
pub fn upper_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
