//! Resolution results handed to renderers.

use serde::Serialize;
use std::sync::Arc;

use super::backbone::NestedRecordIdentity;
use super::enumeration::EnumerationRecord;
use crate::naming::ResolvedName;
use crate::types::{NodeKind, PrimitiveKind};

/// Identity of a top-level node. Shared by every reference to the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeIdentity {
    pub canonical_name: String,
    pub url: String,
    pub kind: NodeKind,
    pub name: ResolvedName,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChoiceTarget {
    Scalar { primitive: PrimitiveKind },
    Named { identity: Arc<NodeIdentity> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceAlternative {
    pub type_code: String,
    pub slot_name: ResolvedName,
    pub target: ChoiceTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceType {
    /// Slot naming pattern, `{Type}` standing for each alternative's short name.
    pub discriminator_pattern: String,
    pub alternatives: Vec<ChoiceAlternative>,
    /// Every alternative is in the cross-version common subset.
    pub within_common_subset: bool,
}

/// What an element becomes in the output type system.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ResolvedType {
    Scalar {
        primitive: PrimitiveKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        enumeration: Option<Arc<EnumerationRecord>>,
    },
    NamedReference {
        target: Arc<NodeIdentity>,
    },
    Choice(ChoiceType),
    NestedRecord {
        record: Arc<NestedRecordIdentity>,
        owning_path: String,
    },
    GenericContainer {
        alias: String,
        default_binding: Arc<NodeIdentity>,
    },
}

impl ResolvedType {
    pub fn is_scalar(&self) -> bool {
        matches!(self, ResolvedType::Scalar { .. })
    }

    pub fn enumeration(&self) -> Option<&Arc<EnumerationRecord>> {
        match self {
            ResolvedType::Scalar { enumeration, .. } => enumeration.as_ref(),
            _ => None,
        }
    }

    pub fn named_target(&self) -> Option<&Arc<NodeIdentity>> {
        match self {
            ResolvedType::NamedReference { target } => Some(target),
            _ => None,
        }
    }

    pub fn choice(&self) -> Option<&ChoiceType> {
        match self {
            ResolvedType::Choice(choice) => Some(choice),
            _ => None,
        }
    }

    pub fn nested_record(&self) -> Option<&Arc<NestedRecordIdentity>> {
        match self {
            ResolvedType::NestedRecord { record, .. } => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedElement {
    pub path: String,
    pub field_name: ResolvedName,
    pub resolved: ResolvedType,
    pub repeated: bool,
    pub required: bool,
    pub order: u32,
    /// Canonical names of allowed reference targets, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNested {
    pub identity: Arc<NestedRecordIdentity>,
    pub elements: Vec<ResolvedElement>,
}

/// A top-level node with its own elements and every nested group it owns,
/// flattened depth-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNode {
    pub identity: Arc<NodeIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<Arc<NodeIdentity>>,
    pub elements: Vec<ResolvedElement>,
    pub nested: Vec<ResolvedNested>,
}

impl ResolvedNode {
    pub fn element(&self, path: &str) -> Option<&ResolvedElement> {
        self.elements
            .iter()
            .chain(self.nested.iter().flat_map(|n| n.elements.iter()))
            .find(|e| e.path == path)
    }

    pub fn nested_record(&self, path: &str) -> Option<&ResolvedNested> {
        self.nested.iter().find(|n| n.identity.path == path)
    }
}
