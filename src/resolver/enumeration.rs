//! Enumeration deduplication for required code bindings.
//!
//! One record per canonical value-set URL. A value set bound by two or more
//! distinct owning types is declared globally; one bound by a single owner is
//! declared local to it. Whether a binding becomes an enumeration at all is
//! decided by [`EnumerationDeduplicator::bind_code`].

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::{ResolverConfig, TargetProfile};
use crate::error::Result;
use crate::naming::{NamingConvention, NamingResolver, ResolvedName, sanitize};
use crate::types::canonical::strip_version;
use crate::types::{BindingStrength, ElementDefinition, SchemaGraph, SchemaNode, ValueSetCode};

/// Value sets too large or too open to enumerate.
const DEFAULT_EXCLUDED_VALUE_SETS: &[&str] = &[
    "http://hl7.org/fhir/ValueSet/mimetypes",
    "http://hl7.org/fhir/ValueSet/all-languages",
    "http://hl7.org/fhir/ValueSet/languages",
    "http://hl7.org/fhir/ValueSet/ucum-units",
];

/// Longest display text still usable as a member name.
const MAX_DISPLAY_LENGTH: usize = 64;

/// How a code system URL is matched by a member-naming rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemMatcher {
    Exact(String),
    Prefix(String),
}

impl SystemMatcher {
    pub fn matches(&self, system: &str) -> bool {
        match self {
            SystemMatcher::Exact(url) => system == url,
            SystemMatcher::Prefix(prefix) => system.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberSource {
    Display,
    Code,
}

/// Systems whose displays are sentences or translations rather than names.
fn default_member_rules() -> Vec<(SystemMatcher, MemberSource)> {
    vec![
        (SystemMatcher::Exact("urn:ietf:bcp:13".into()), MemberSource::Code),
        (SystemMatcher::Exact("urn:ietf:bcp:47".into()), MemberSource::Code),
        (SystemMatcher::Exact("http://unitsofmeasure.org".into()), MemberSource::Code),
        (SystemMatcher::Exact("http://hl7.org/fhir/fhir-types".into()), MemberSource::Code),
        (SystemMatcher::Prefix("urn:iso:std:iso:".into()), MemberSource::Code),
        (
            SystemMatcher::Prefix("http://terminology.hl7.org/CodeSystem/v3-".into()),
            MemberSource::Code,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerationMember {
    pub code: String,
    pub system: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    pub name: ResolvedName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerationRecord {
    /// Canonical value-set URL, version stripped.
    pub url: String,
    pub value_set_name: String,
    /// Canonical name of the declaring type; empty when global.
    pub declaring_scope: String,
    pub name: ResolvedName,
    pub members: Vec<EnumerationMember>,
}

impl EnumerationRecord {
    pub fn is_global(&self) -> bool {
        self.declaring_scope.is_empty()
    }

    pub fn member(&self, code: &str) -> Option<&EnumerationMember> {
        self.members.iter().find(|m| m.code == code)
    }
}

/// Enumerations split by where they are declared, each list in minting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumerationSet {
    pub global: Vec<Arc<EnumerationRecord>>,
    /// Declaring type -> enumerations local to it.
    pub local: IndexMap<String, Vec<Arc<EnumerationRecord>>>,
}

impl EnumerationSet {
    pub fn len(&self) -> usize {
        self.global.len() + self.local.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, url: &str) -> Option<&Arc<EnumerationRecord>> {
        self.global
            .iter()
            .chain(self.local.values().flatten())
            .find(|r| r.url == url)
    }
}

/// Which owning types bind each value set. Computed over the nodes of a run
/// before any enumeration is minted.
#[derive(Debug, Clone, Default)]
pub struct BindingUsage {
    owners: IndexMap<String, BTreeSet<String>>,
}

impl BindingUsage {
    pub fn scan<'a>(nodes: impl IntoIterator<Item = &'a SchemaNode>) -> Self {
        let mut usage = Self::default();
        for node in nodes {
            usage.scan_node(node, &node.name);
        }
        usage
    }

    fn scan_node(&mut self, node: &SchemaNode, owner: &str) {
        for element in node.elements.values() {
            if element.inherited
                || element.cardinality.is_prohibited()
                || !element.is_binding_eligible()
            {
                continue;
            }
            if let Some(url) = required_value_set(element) {
                self.owners
                    .entry(strip_version(url).to_string())
                    .or_default()
                    .insert(owner.to_string());
            }
        }
        for nested in node.nested.values() {
            self.scan_node(nested, owner);
        }
    }

    pub fn owner_count(&self, url: &str) -> usize {
        self.owners.get(url).map_or(0, BTreeSet::len)
    }

    pub fn owners(&self, url: &str) -> impl Iterator<Item = &str> {
        self.owners.get(url).into_iter().flatten().map(String::as_str)
    }
}

fn required_value_set(element: &ElementDefinition) -> Option<&str> {
    element
        .binding
        .as_ref()
        .filter(|b| b.strength == BindingStrength::Required)
        .and_then(|b| b.value_set.as_deref())
}

#[derive(Debug)]
pub struct EnumerationDeduplicator {
    usage: BindingUsage,
    excluded: BTreeSet<String>,
    member_rules: Vec<(SystemMatcher, MemberSource)>,
    type_convention: NamingConvention,
    member_convention: NamingConvention,
    records: IndexMap<String, Arc<EnumerationRecord>>,
}

impl EnumerationDeduplicator {
    pub fn new(config: &ResolverConfig, profile: &TargetProfile, usage: BindingUsage) -> Self {
        let excluded = DEFAULT_EXCLUDED_VALUE_SETS
            .iter()
            .map(|s| s.to_string())
            .chain(
                config
                    .excluded_value_sets
                    .iter()
                    .map(|s| strip_version(s).to_string()),
            )
            .collect();

        let mut member_rules: Vec<_> = config
            .code_named_systems
            .iter()
            .map(|s| (SystemMatcher::Exact(s.clone()), MemberSource::Code))
            .collect();
        member_rules.extend(default_member_rules());

        Self {
            usage,
            excluded,
            member_rules,
            type_convention: profile.type_convention,
            member_convention: profile.member_convention,
            records: IndexMap::new(),
        }
    }

    pub fn is_excluded(&self, url: &str) -> bool {
        self.excluded.contains(strip_version(url))
    }

    /// The enumeration a `code` element binds to, or `None` when it stays a
    /// plain coded string.
    pub fn bind_code(
        &mut self,
        naming: &mut NamingResolver,
        graph: &SchemaGraph,
        element: &ElementDefinition,
        owner: &str,
    ) -> Result<Option<Arc<EnumerationRecord>>> {
        let Some(reference) = required_value_set(element) else {
            return Ok(None);
        };
        let url = strip_version(reference);

        if self.excluded.contains(url) {
            return Ok(None);
        }

        if let Some(existing) = self.records.get(url) {
            return Ok(Some(Arc::clone(existing)));
        }

        let Some(value_set) = graph.value_set(url) else {
            tracing::warn!(
                "Value set '{}' bound by '{}' is not in the schema, falling back to code",
                url,
                element.path
            );
            return Ok(None);
        };

        if value_set.is_empty() {
            tracing::warn!("Value set '{}' has no codes, falling back to code", url);
            return Ok(None);
        }

        let declaring_scope = if self.usage.owner_count(url) >= 2 {
            String::new()
        } else {
            owner.to_string()
        };

        let enum_scope = if declaring_scope.is_empty() {
            "enums".to_string()
        } else {
            format!("enums:{declaring_scope}")
        };
        let name = naming.resolve_entity(url, &value_set.name, &enum_scope, self.type_convention)?;

        let member_scope = format!("members:{url}");
        let mut members = Vec::with_capacity(value_set.codes.len());
        for code in &value_set.codes {
            let raw = self.member_text(code);
            members.push(EnumerationMember {
                code: code.code.clone(),
                system: code.system.clone(),
                display: code.display.clone(),
                name: naming.resolve(raw, &member_scope, self.member_convention)?,
            });
        }

        tracing::debug!(
            "Minted enumeration '{}' for '{}' with {} members ({})",
            name,
            url,
            members.len(),
            if declaring_scope.is_empty() {
                "global"
            } else {
                declaring_scope.as_str()
            }
        );

        let record = Arc::new(EnumerationRecord {
            url: url.to_string(),
            value_set_name: value_set.name.clone(),
            declaring_scope,
            name,
            members,
        });
        self.records.insert(url.to_string(), Arc::clone(&record));
        Ok(Some(record))
    }

    pub fn get(&self, url: &str) -> Option<&Arc<EnumerationRecord>> {
        self.records.get(strip_version(url))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn partition(&self) -> EnumerationSet {
        let mut set = EnumerationSet::default();
        for record in self.records.values() {
            if record.is_global() {
                set.global.push(Arc::clone(record));
            } else {
                set.local
                    .entry(record.declaring_scope.clone())
                    .or_default()
                    .push(Arc::clone(record));
            }
        }
        set
    }

    fn member_text<'c>(&self, code: &'c ValueSetCode) -> &'c str {
        let source = self
            .member_rules
            .iter()
            .find(|(matcher, _)| matcher.matches(&code.system))
            .map_or(MemberSource::Display, |(_, source)| *source);

        match (source, code.display.as_deref()) {
            (MemberSource::Display, Some(display)) if is_usable_display(display) => display,
            _ => &code.code,
        }
    }
}

/// Displays that would make poor identifiers fall back to the code.
fn is_usable_display(display: &str) -> bool {
    display.is_ascii()
        && display.len() <= MAX_DISPLAY_LENGTH
        && !sanitize(display).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FhirVersion;
    use crate::naming::NamingPolicy;
    use crate::types::ValueSet;

    const GENDER: &str = "http://hl7.org/fhir/ValueSet/administrative-gender";

    fn graph() -> SchemaGraph {
        SchemaGraph::new(FhirVersion::R4).with_value_set(
            ValueSet::new(GENDER, "AdministrativeGender")
                .with_code(
                    ValueSetCode::new("http://hl7.org/fhir/administrative-gender", "male")
                        .with_display("Male"),
                )
                .with_code(
                    ValueSetCode::new("http://hl7.org/fhir/administrative-gender", "other")
                        .with_display("Other"),
                )
                .with_code(ValueSetCode::new("http://hl7.org/fhir/administrative-gender", "unknown")),
        )
    }

    fn gender_element(owner: &str, strength: BindingStrength) -> ElementDefinition {
        ElementDefinition::new(format!("{owner}.gender"))
            .with_type("code")
            .with_binding(strength, format!("{GENDER}|4.0.1"))
    }

    fn deduplicator(owners: &[&str]) -> EnumerationDeduplicator {
        let nodes: Vec<_> = owners
            .iter()
            .map(|o| SchemaNode::resource(*o).with_element(gender_element(o, BindingStrength::Required)))
            .collect();
        EnumerationDeduplicator::new(
            &ResolverConfig::default(),
            &TargetProfile::csharp(),
            BindingUsage::scan(&nodes),
        )
    }

    #[test]
    fn test_single_owner_is_local() {
        let mut dedup = deduplicator(&["Patient"]);
        let mut naming = NamingResolver::new(NamingPolicy::default());
        let record = dedup
            .bind_code(&mut naming, &graph(), &gender_element("Patient", BindingStrength::Required), "Patient")
            .unwrap()
            .unwrap();

        assert_eq!(record.declaring_scope, "Patient");
        assert_eq!(record.name.as_str(), "AdministrativeGender");
        let names: Vec<_> = record.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Male", "Other", "Unknown"]);
    }

    #[test]
    fn test_shared_binding_returns_same_record() {
        let mut dedup = deduplicator(&["Patient", "Person"]);
        let mut naming = NamingResolver::new(NamingPolicy::default());
        let graph = graph();
        let a = dedup
            .bind_code(&mut naming, &graph, &gender_element("Patient", BindingStrength::Required), "Patient")
            .unwrap()
            .unwrap();
        let b = dedup
            .bind_code(&mut naming, &graph, &gender_element("Person", BindingStrength::Required), "Person")
            .unwrap()
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_global());
        assert!(Arc::ptr_eq(dedup.get(&format!("{GENDER}|4.0.1")).unwrap(), &a));
        assert_eq!(dedup.partition().global.len(), 1);
        assert_eq!(naming.issued_count(&format!("members:{GENDER}")), 3);
    }

    #[test]
    fn test_prohibited_binding_does_not_count_as_owner() {
        let nodes = [
            SchemaNode::resource("Patient")
                .with_element(gender_element("Patient", BindingStrength::Required)),
            SchemaNode::resource("Person").with_element(
                gender_element("Person", BindingStrength::Required).with_cardinality(0, "0"),
            ),
        ];
        let usage = BindingUsage::scan(&nodes);

        assert_eq!(usage.owner_count(GENDER), 1);
        assert_eq!(usage.owners(GENDER).collect::<Vec<_>>(), ["Patient"]);
    }

    #[test]
    fn test_non_required_binding_is_none() {
        let mut dedup = deduplicator(&["Patient"]);
        let mut naming = NamingResolver::new(NamingPolicy::default());
        let result = dedup
            .bind_code(&mut naming, &graph(), &gender_element("Patient", BindingStrength::Extensible), "Patient")
            .unwrap();
        assert!(result.is_none());
        assert!(dedup.is_empty());
    }

    #[test]
    fn test_missing_value_set_is_none() {
        let mut dedup = deduplicator(&["Patient"]);
        let mut naming = NamingResolver::new(NamingPolicy::default());
        let element = ElementDefinition::new("Patient.status")
            .with_type("code")
            .with_binding(BindingStrength::Required, "http://example.org/ValueSet/missing");
        let result = dedup
            .bind_code(&mut naming, &graph(), &element, "Patient")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_excluded_value_sets() {
        let config = ResolverConfig::default().exclude_value_set(format!("{GENDER}|4.0.1"));
        let dedup = EnumerationDeduplicator::new(
            &config,
            &TargetProfile::csharp(),
            BindingUsage::default(),
        );
        assert!(dedup.is_excluded(GENDER));
        assert!(dedup.is_excluded("http://hl7.org/fhir/ValueSet/mimetypes|4.0.1"));
    }

    #[test]
    fn test_code_named_systems_and_unusable_displays() {
        let dedup = deduplicator(&[]);
        let ucum = ValueSetCode::new("http://unitsofmeasure.org", "mg").with_display("milligram");
        let long = ValueSetCode::new("http://example.org", "x").with_display("x".repeat(80));
        let symbol = ValueSetCode::new("http://example.org", "<").with_display("<");
        assert_eq!(dedup.member_text(&ucum), "mg");
        assert_eq!(dedup.member_text(&long), "x");
        assert_eq!(dedup.member_text(&symbol), "<");
    }
}
