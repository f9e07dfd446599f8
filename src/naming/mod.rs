//! Naming resolver: raw schema identifiers to target-safe identifiers.
//!
//! Names are issued per scope. The first request for a base name gets it
//! unsuffixed; later requests colliding with an issued name get the smallest
//! free integer suffix starting at 2 (`Status`, `Status_2`, `Status_3`).
//! Results depend only on the order of requests, so callers must issue them
//! in declaration order.

pub mod convention;

pub use convention::{EscapeStrategy, NamingConvention, sanitize, symbol_name, upper_first};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::{FhirGenError, Result};

/// Used when a raw name sanitizes to nothing.
const FALLBACK_WORD: &str = "value";

/// A convention-cased identifier plus the suffix that disambiguated it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedName {
    /// Final identifier, suffix included.
    pub name: String,
    /// Identifier before suffixing.
    pub base: String,
    /// 0 when unsuffixed, otherwise >= 2.
    pub suffix: u32,
}

impl ResolvedName {
    pub fn unsuffixed(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            base: name.clone(),
            name,
            suffix: 0,
        }
    }

    fn suffixed(base: &str, suffix: u32) -> Self {
        Self {
            name: format!("{base}_{suffix}"),
            base: base.to_string(),
            suffix,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_suffixed(&self) -> bool {
        self.suffix != 0
    }
}

impl std::fmt::Display for ResolvedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Target-specific inputs the resolver applies without knowing the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingPolicy {
    pub reserved_words: BTreeSet<String>,
    pub escape: EscapeStrategy,
    pub digit_prefix: String,
    pub max_suffix_attempts: u32,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            reserved_words: BTreeSet::new(),
            escape: EscapeStrategy::Suffix("_".to_string()),
            digit_prefix: "_".to_string(),
            max_suffix_attempts: 1000,
        }
    }
}

#[derive(Debug, Default)]
struct NameScope {
    issued: HashSet<String>,
    by_entity: HashMap<String, ResolvedName>,
}

#[derive(Debug, Default)]
pub struct NamingResolver {
    policy: NamingPolicy,
    scopes: HashMap<String, NameScope>,
}

impl NamingResolver {
    pub fn new(policy: NamingPolicy) -> Self {
        Self {
            policy,
            scopes: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &NamingPolicy {
        &self.policy
    }

    /// Convention transform plus digit and reserved-word escaping. Touches no
    /// scope.
    pub fn transform(&self, raw: &str, convention: NamingConvention) -> String {
        let sanitized = sanitize(raw);
        let words = if sanitized.is_empty() {
            FALLBACK_WORD
        } else {
            sanitized.as_str()
        };

        self.escape(convention.apply(words))
    }

    /// Like [`transform`](Self::transform) for top-level type names. A name
    /// that is already a plain identifier keeps its inner casing under
    /// PascalCase, so `CDSHooksRequest` is not rewritten to `CdsHooksRequest`.
    pub fn transform_type_name(&self, raw: &str, convention: NamingConvention) -> String {
        let is_identifier = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric());
        if convention == NamingConvention::PascalCase && is_identifier {
            return self.escape(upper_first(raw));
        }
        self.transform(raw, convention)
    }

    fn escape(&self, mut name: String) -> String {
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name = format!("{}{}", self.policy.digit_prefix, name);
        }

        if self.policy.reserved_words.contains(&name) {
            name = self.policy.escape.apply(&name);
        }

        name
    }

    /// Issue a fresh name in `scope`.
    pub fn resolve(
        &mut self,
        raw: &str,
        scope: &str,
        convention: NamingConvention,
    ) -> Result<ResolvedName> {
        let base = self.transform(raw, convention);
        self.issue(base, scope)
    }

    /// Like [`resolve`](Self::resolve), but a repeated request for the same
    /// entity returns the name issued the first time.
    pub fn resolve_entity(
        &mut self,
        entity: &str,
        raw: &str,
        scope: &str,
        convention: NamingConvention,
    ) -> Result<ResolvedName> {
        if let Some(existing) = self
            .scopes
            .get(scope)
            .and_then(|s| s.by_entity.get(entity))
        {
            return Ok(existing.clone());
        }

        let name = self.resolve(raw, scope, convention)?;
        self.scopes
            .entry(scope.to_string())
            .or_default()
            .by_entity
            .insert(entity.to_string(), name.clone());
        Ok(name)
    }

    pub fn is_issued(&self, scope: &str, name: &str) -> bool {
        self.scopes
            .get(scope)
            .is_some_and(|s| s.issued.contains(name))
    }

    pub fn issued_count(&self, scope: &str) -> usize {
        self.scopes.get(scope).map_or(0, |s| s.issued.len())
    }

    fn issue(&mut self, base: String, scope: &str) -> Result<ResolvedName> {
        let max_attempts = self.policy.max_suffix_attempts;
        let names = self.scopes.entry(scope.to_string()).or_default();

        if names.issued.insert(base.clone()) {
            return Ok(ResolvedName::unsuffixed(base));
        }

        for attempt in 0..max_attempts {
            let candidate = ResolvedName::suffixed(&base, attempt + 2);
            if names.issued.insert(candidate.name.clone()) {
                tracing::debug!(
                    "Suffixed '{}' to '{}' in scope '{}'",
                    base,
                    candidate.name,
                    scope
                );
                return Ok(candidate);
            }
        }

        Err(FhirGenError::ambiguous_name(
            base,
            scope,
            format!("no free suffix after {max_attempts} attempts"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> NamingResolver {
        NamingResolver::new(NamingPolicy {
            reserved_words: ["class".to_string(), "Type".to_string()].into(),
            ..NamingPolicy::default()
        })
    }

    #[test]
    fn test_collisions_get_increasing_suffixes() {
        let mut naming = resolver();
        let scope = "fields:Observation";

        let first = naming.resolve("status", scope, NamingConvention::PascalCase).unwrap();
        let second = naming.resolve("Status", scope, NamingConvention::PascalCase).unwrap();
        let third = naming.resolve("STATUS", scope, NamingConvention::AsIs).unwrap();
        let fourth = naming.resolve("status", scope, NamingConvention::PascalCase).unwrap();

        assert_eq!(first.name, "Status");
        assert!(!first.is_suffixed());
        assert_eq!(second.name, "Status_2");
        assert_eq!(second.suffix, 2);
        assert!(second.is_suffixed());
        assert_eq!(third.name, "STATUS");
        assert_eq!(fourth.name, "Status_3");
    }

    #[test]
    fn test_scopes_are_independent() {
        let mut naming = resolver();
        let a = naming.resolve("code", "fields:A", NamingConvention::CamelCase).unwrap();
        let b = naming.resolve("code", "fields:B", NamingConvention::CamelCase).unwrap();
        assert_eq!(a.name, "code");
        assert_eq!(b.name, "code");
        assert_eq!(naming.issued_count("fields:A"), 1);
        assert!(naming.is_issued("fields:B", "code"));
        assert!(!naming.is_issued("fields:C", "code"));
    }

    #[test]
    fn test_suffix_skips_names_taken_literally() {
        let mut naming = resolver();
        let scope = "members";
        naming.resolve("Status_2", scope, NamingConvention::AsIs).unwrap();
        naming.resolve("Status", scope, NamingConvention::AsIs).unwrap();
        let third = naming.resolve("Status", scope, NamingConvention::AsIs).unwrap();
        assert_eq!(third.name, "Status_3");
    }

    #[test]
    fn test_reserved_words_are_escaped() {
        let naming = resolver();
        assert_eq!(naming.transform("class", NamingConvention::CamelCase), "class_");
        assert_eq!(naming.transform("type", NamingConvention::PascalCase), "Type_");
        assert_eq!(naming.transform("classes", NamingConvention::CamelCase), "classes");
    }

    #[test]
    fn test_type_names_keep_acronyms() {
        let naming = resolver();
        let pascal = NamingConvention::PascalCase;
        assert_eq!(naming.transform_type_name("CDSHooksRequest", pascal), "CDSHooksRequest");
        assert_eq!(naming.transform_type_name("ADXPStreetName", pascal), "ADXPStreetName");
        assert_eq!(naming.transform_type_name("base64Binary", pascal), "Base64Binary");
        assert_eq!(naming.transform_type_name("type", pascal), "Type_");
        assert_eq!(naming.transform_type_name("4Thing", pascal), "_4Thing");
        assert_eq!(naming.transform_type_name("my-type", pascal), "MyType");
        assert_eq!(
            naming.transform_type_name("CDSHooksRequest", NamingConvention::SnakeCase),
            naming.transform("CDSHooksRequest", NamingConvention::SnakeCase)
        );
    }

    #[test]
    fn test_leading_digit_gets_prefix() {
        let naming = resolver();
        assert_eq!(naming.transform("1", NamingConvention::PascalCase), "_1");
    }

    #[test]
    fn test_empty_text_falls_back() {
        let naming = resolver();
        assert_eq!(naming.transform("...", NamingConvention::PascalCase), "Value");
    }

    #[test]
    fn test_suffix_exhaustion_is_fatal() {
        let mut naming = NamingResolver::new(NamingPolicy {
            max_suffix_attempts: 2,
            ..NamingPolicy::default()
        });
        for _ in 0..3 {
            naming.resolve("dup", "s", NamingConvention::AsIs).unwrap();
        }
        let result = naming.resolve("dup", "s", NamingConvention::AsIs);
        assert!(matches!(result, Err(FhirGenError::AmbiguousName { .. })));
    }

    #[test]
    fn test_entity_requests_are_idempotent() {
        let mut naming = resolver();
        let first = naming
            .resolve_entity("vs-a", "gender", "enums", NamingConvention::PascalCase)
            .unwrap();
        let again = naming
            .resolve_entity("vs-a", "gender", "enums", NamingConvention::PascalCase)
            .unwrap();
        let other = naming
            .resolve_entity("vs-b", "gender", "enums", NamingConvention::PascalCase)
            .unwrap();
        assert_eq!(first, again);
        assert_eq!(other.name, "Gender_2");
    }
}
