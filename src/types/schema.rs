// Schema graph handed over by the ingestion layer

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::canonical::strip_version;
use super::element::ElementDefinition;
use super::value_set::ValueSet;
use crate::core::{FhirVersion, GenerationSubset};

const STRUCTURE_DEFINITION_BASE: &str = "http://hl7.org/fhir/StructureDefinition/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    PrimitiveType,
    ComplexType,
    Resource,
    Logical,
    /// Anonymous nested element group.
    Backbone,
}

impl NodeKind {
    /// Kinds that get an entry in the export manifest.
    pub fn is_exported(self) -> bool {
        matches!(
            self,
            NodeKind::PrimitiveType | NodeKind::ComplexType | NodeKind::Resource
        )
    }
}

/// A named complex type, resource, or nested element group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Canonical name; the element path for nested groups.
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
    /// Schema-supplied name for a nested group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_type_name: Option<String>,
    #[serde(default)]
    pub elements: IndexMap<String, ElementDefinition>,
    /// Nested groups keyed by the path of the element that owns them.
    #[serde(default)]
    pub nested: IndexMap<String, SchemaNode>,
}

impl SchemaNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let name = name.into();
        Self {
            url: format!("{STRUCTURE_DEFINITION_BASE}{name}"),
            name,
            kind,
            base: None,
            is_abstract: false,
            explicit_type_name: None,
            elements: IndexMap::new(),
            nested: IndexMap::new(),
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::PrimitiveType)
    }

    pub fn complex_type(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::ComplexType)
    }

    pub fn resource(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Resource)
    }

    /// A nested group rooted at `path`.
    pub fn backbone(path: impl Into<String>) -> Self {
        Self {
            url: String::new(),
            ..Self::new(path, NodeKind::Backbone)
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_explicit_type_name(mut self, name: impl Into<String>) -> Self {
        self.explicit_type_name = Some(name.into());
        self
    }

    pub fn with_element(mut self, element: ElementDefinition) -> Self {
        self.elements.insert(element.path.clone(), element);
        self
    }

    pub fn with_nested(mut self, nested: SchemaNode) -> Self {
        self.nested.insert(nested.name.clone(), nested);
        self
    }

    /// Find a nested group at any depth by its path.
    pub fn find_nested(&self, path: &str) -> Option<&SchemaNode> {
        if let Some(found) = self.nested.get(path) {
            return Some(found);
        }
        self.nested.values().find_map(|n| n.find_nested(path))
    }

    /// Path segment naming this group in its parent.
    pub fn short_path(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// The immutable input of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraph {
    pub version: FhirVersion,
    #[serde(default)]
    pub subset: GenerationSubset,
    #[serde(default)]
    pub nodes: IndexMap<String, SchemaNode>,
    /// Keyed by canonical URL without version.
    #[serde(default)]
    pub value_sets: IndexMap<String, ValueSet>,
}

impl SchemaGraph {
    pub fn new(version: FhirVersion) -> Self {
        Self {
            version,
            subset: GenerationSubset::Full,
            nodes: IndexMap::new(),
            value_sets: IndexMap::new(),
        }
    }

    pub fn with_subset(mut self, subset: GenerationSubset) -> Self {
        self.subset = subset;
        self
    }

    pub fn with_node(mut self, node: SchemaNode) -> Self {
        self.add_node(node);
        self
    }

    pub fn with_value_set(mut self, value_set: ValueSet) -> Self {
        self.add_value_set(value_set);
        self
    }

    pub fn add_node(&mut self, node: SchemaNode) {
        self.nodes.insert(node.name.clone(), node);
    }

    pub fn add_value_set(&mut self, value_set: ValueSet) {
        self.value_sets
            .insert(strip_version(&value_set.url).to_string(), value_set);
    }

    pub fn node(&self, name: &str) -> Option<&SchemaNode> {
        self.nodes.get(name)
    }

    /// Look up a value set; a `|version` suffix on the reference is ignored.
    pub fn value_set(&self, url: &str) -> Option<&ValueSet> {
        self.value_sets.get(strip_version(url))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueSetCode;

    #[test]
    fn test_find_nested_searches_depth_first() {
        let claim = SchemaNode::resource("Claim").with_nested(
            SchemaNode::backbone("Claim.item")
                .with_nested(SchemaNode::backbone("Claim.item.detail")),
        );
        assert!(claim.find_nested("Claim.item").is_some());
        assert_eq!(
            claim.find_nested("Claim.item.detail").map(|n| n.short_path()),
            Some("detail")
        );
        assert!(claim.find_nested("Claim.total").is_none());
    }

    #[test]
    fn test_value_set_lookup_ignores_version() {
        let graph = SchemaGraph::new(FhirVersion::R4).with_value_set(
            ValueSet::new("http://hl7.org/fhir/ValueSet/gender|4.0.1", "Gender")
                .with_code(ValueSetCode::new("http://hl7.org/fhir/gender", "male")),
        );
        assert!(graph.value_set("http://hl7.org/fhir/ValueSet/gender").is_some());
        assert!(graph.value_set("http://hl7.org/fhir/ValueSet/gender|4.0.1").is_some());
    }

    #[test]
    fn test_default_url() {
        let node = SchemaNode::resource("Patient");
        assert_eq!(node.url, "http://hl7.org/fhir/StructureDefinition/Patient");
        assert!(SchemaNode::backbone("Patient.contact").url.is_empty());
    }
}
