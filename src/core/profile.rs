//! Target profiles: the naming rules a renderer family expects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::FhirGenError;
use crate::naming::{EscapeStrategy, NamingConvention, NamingPolicy};

/// Output type system a run is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    CSharp,
    TypeScript,
    Rust,
    Python,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::CSharp => write!(f, "csharp"),
            TargetKind::TypeScript => write!(f, "typescript"),
            TargetKind::Rust => write!(f, "rust"),
            TargetKind::Python => write!(f, "python"),
        }
    }
}

impl std::str::FromStr for TargetKind {
    type Err = FhirGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" | "cs" | "c#" => Ok(TargetKind::CSharp),
            "typescript" | "ts" => Ok(TargetKind::TypeScript),
            "rust" | "rs" => Ok(TargetKind::Rust),
            "python" | "py" => Ok(TargetKind::Python),
            _ => Err(FhirGenError::configuration_error(format!(
                "Unknown target: {s}"
            ))),
        }
    }
}

const CSHARP_RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

const TYPESCRIPT_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "implements", "interface", "let",
    "package", "private", "protected", "public", "static", "yield", "any", "boolean", "number",
    "string", "symbol", "type", "Array", "Date", "Error", "Function", "Object", "Promise",
];

const RUST_RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "Option",
    "Result", "String", "Vec", "Box",
];

const PYTHON_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "id", "type", "property",
];

/// Naming conventions and reserved words for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub kind: TargetKind,
    pub type_convention: NamingConvention,
    pub field_convention: NamingConvention,
    pub member_convention: NamingConvention,
    pub reserved_words: BTreeSet<String>,
    pub escape: EscapeStrategy,
    /// Prepended to identifiers that would start with a digit.
    pub digit_prefix: String,
}

impl TargetProfile {
    pub fn for_target(kind: TargetKind) -> Self {
        match kind {
            TargetKind::CSharp => Self::csharp(),
            TargetKind::TypeScript => Self::typescript(),
            TargetKind::Rust => Self::rust(),
            TargetKind::Python => Self::python(),
        }
    }

    pub fn csharp() -> Self {
        Self {
            kind: TargetKind::CSharp,
            type_convention: NamingConvention::PascalCase,
            field_convention: NamingConvention::PascalCase,
            member_convention: NamingConvention::PascalCase,
            reserved_words: words(CSHARP_RESERVED),
            escape: EscapeStrategy::Prefix("@".to_string()),
            digit_prefix: "_".to_string(),
        }
    }

    pub fn typescript() -> Self {
        Self {
            kind: TargetKind::TypeScript,
            type_convention: NamingConvention::PascalCase,
            field_convention: NamingConvention::CamelCase,
            member_convention: NamingConvention::PascalCase,
            reserved_words: words(TYPESCRIPT_RESERVED),
            escape: EscapeStrategy::Suffix("_".to_string()),
            digit_prefix: "_".to_string(),
        }
    }

    pub fn rust() -> Self {
        Self {
            kind: TargetKind::Rust,
            type_convention: NamingConvention::PascalCase,
            field_convention: NamingConvention::SnakeCase,
            member_convention: NamingConvention::PascalCase,
            reserved_words: words(RUST_RESERVED),
            escape: EscapeStrategy::Suffix("_".to_string()),
            digit_prefix: "N".to_string(),
        }
    }

    pub fn python() -> Self {
        Self {
            kind: TargetKind::Python,
            type_convention: NamingConvention::PascalCase,
            field_convention: NamingConvention::SnakeCase,
            member_convention: NamingConvention::UpperSnakeCase,
            reserved_words: words(PYTHON_RESERVED),
            escape: EscapeStrategy::Suffix("_".to_string()),
            digit_prefix: "_".to_string(),
        }
    }

    pub fn with_reserved_word(mut self, word: impl Into<String>) -> Self {
        self.reserved_words.insert(word.into());
        self
    }

    /// The convention-agnostic policy handed to the naming resolver.
    pub fn naming_policy(&self, max_suffix_attempts: u32) -> NamingPolicy {
        NamingPolicy {
            reserved_words: self.reserved_words.clone(),
            escape: self.escape.clone(),
            digit_prefix: self.digit_prefix.clone(),
            max_suffix_attempts,
        }
    }
}

fn words(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_str() {
        assert_eq!("ts".parse::<TargetKind>().unwrap(), TargetKind::TypeScript);
        assert_eq!("C#".parse::<TargetKind>().unwrap(), TargetKind::CSharp);
        assert_eq!("python".parse::<TargetKind>().unwrap(), TargetKind::Python);
        assert!("cobol".parse::<TargetKind>().is_err());
    }

    #[test]
    fn test_profiles_carry_their_reserved_words() {
        assert!(TargetProfile::csharp().reserved_words.contains("class"));
        assert!(TargetProfile::rust().reserved_words.contains("type"));
        assert!(TargetProfile::python().reserved_words.contains("None"));
        assert!(!TargetProfile::typescript().reserved_words.contains("Patient"));
    }

    #[test]
    fn test_extra_reserved_word_reaches_naming_policy() {
        let profile = TargetProfile::typescript().with_reserved_word("Patient");
        let policy = profile.naming_policy(10);
        assert!(policy.reserved_words.contains("Patient"));
        assert!(policy.reserved_words.contains("class"));
        assert_eq!(policy.max_suffix_attempts, 10);
    }

    #[test]
    fn test_target_kind_serde_names() {
        assert_eq!(serde_json::to_string(&TargetKind::CSharp).unwrap(), "\"csharp\"");
        let kind: TargetKind = serde_json::from_str("\"rust\"").unwrap();
        assert_eq!(kind, TargetKind::Rust);
    }
}
