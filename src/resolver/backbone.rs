//! Backbone flattening: anonymous nested element groups become named types.
//!
//! A group at `Claim.item.detail` owned by `Claim` is named by concatenating
//! its ancestors' short names with its own and the component suffix:
//! `ClaimItemDetailComponent`. The short name is the schema's explicit type
//! name when present, otherwise the field name recased by the first matching
//! capitalization repair, otherwise PascalCase.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{FhirGenError, Result};
use crate::naming::{NamingConvention, ResolvedName, upper_first};
use crate::types::SchemaNode;

/// Naming scope shared by top-level and flattened type names.
pub const TYPE_SCOPE: &str = "types";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capitalization {
    /// `roc` -> `ROC`
    Upper,
    /// `roc` -> `Roc`, rest untouched.
    FirstLetterOnly,
    Verbatim,
}

impl Capitalization {
    pub fn apply(&self, segment: &str) -> String {
        match self {
            Capitalization::Upper => segment.to_uppercase(),
            Capitalization::FirstLetterOnly => upper_first(segment),
            Capitalization::Verbatim => segment.to_string(),
        }
    }
}

/// A nested-group path prefix whose short name uses a fixed capitalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalizationRepair {
    pub path_prefix: String,
    pub rule: Capitalization,
}

impl CapitalizationRepair {
    pub fn new(path_prefix: impl Into<String>, rule: Capitalization) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            rule,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path == self.path_prefix
            || path
                .strip_prefix(self.path_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Built-in repairs. The receiver-operating-characteristic group has been
/// emitted as `ROC` since the type was introduced.
pub fn default_repairs() -> Vec<CapitalizationRepair> {
    vec![
        CapitalizationRepair::new("MolecularSequence.quality.roc", Capitalization::Upper),
        CapitalizationRepair::new("Sequence.quality.roc", Capitalization::Upper),
    ]
}

/// The synthesized identity of a flattened nested group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedRecordIdentity {
    /// Schema path of the group.
    pub path: String,
    /// Canonical name of the top-level owner.
    pub owner: String,
    /// Name of the group without qualifier or suffix (`Detail`).
    pub short_name: String,
    /// Short name plus suffix, for targets that nest the type in its owner.
    pub local_name: String,
    /// Concatenated ancestor names (`ClaimItem`).
    pub qualifier: String,
    /// Globally unique type name (`ClaimItemDetailComponent`).
    pub name: ResolvedName,
}

impl NestedRecordIdentity {
    /// Qualifier for groups nested inside this one.
    pub fn child_qualifier(&self) -> String {
        format!("{}{}", self.qualifier, self.short_name)
    }
}

#[derive(Debug)]
pub struct BackboneFlattener {
    suffix: String,
    repairs: Vec<CapitalizationRepair>,
    /// Issued type name -> path or canonical name holding it.
    taken: HashMap<String, String>,
    /// Canonical names whose reservation also claims a manifest slot.
    exported: HashSet<String>,
    by_path: HashMap<String, Arc<NestedRecordIdentity>>,
}

impl BackboneFlattener {
    /// `extra_repairs` are consulted before the built-in table.
    pub fn new(suffix: impl Into<String>, extra_repairs: Vec<CapitalizationRepair>) -> Self {
        let mut repairs = extra_repairs;
        repairs.extend(default_repairs());
        Self {
            suffix: suffix.into(),
            repairs,
            taken: HashMap::new(),
            exported: HashSet::new(),
            by_path: HashMap::new(),
        }
    }

    /// Record a top-level type name so no flattened group can take it.
    ///
    /// Two exported types (`exported = true`) resolving to one name is a
    /// duplicate manifest name, reported with the canonical names in sorted
    /// order. Otherwise the first holder keeps the name.
    pub fn reserve_type_name(&mut self, name: &str, canonical: &str, exported: bool) -> Result<()> {
        if let Some(holder) = self.taken.get(name) {
            if exported && holder != canonical && self.exported.contains(holder) {
                let (first, second) = if holder.as_str() <= canonical {
                    (holder.as_str(), canonical)
                } else {
                    (canonical, holder.as_str())
                };
                return Err(FhirGenError::duplicate_manifest_name(name, first, second));
            }
            return Ok(());
        }

        self.taken.insert(name.to_string(), canonical.to_string());
        if exported {
            self.exported.insert(canonical.to_string());
        }
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&Arc<NestedRecordIdentity>> {
        self.by_path.get(path)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Flatten one group. Asking again for the same path returns the identity
    /// issued the first time.
    pub fn flatten(
        &mut self,
        nested: &SchemaNode,
        owner: &str,
        qualifier: &str,
    ) -> Result<Arc<NestedRecordIdentity>> {
        if let Some(existing) = self.by_path.get(&nested.name) {
            return Ok(Arc::clone(existing));
        }

        let short_name = self.short_name(nested);
        let local_name = format!("{}{}", short_name, self.suffix);
        let qualified = format!("{qualifier}{local_name}");

        if let Some(holder) = self.taken.get(&qualified) {
            return Err(FhirGenError::ambiguous_name(
                qualified.clone(),
                TYPE_SCOPE,
                format!("'{}' and '{}' flatten to the same name", holder, nested.name),
            ));
        }

        tracing::debug!("Flattened '{}' to '{}'", nested.name, qualified);

        self.taken.insert(qualified.clone(), nested.name.clone());
        let identity = Arc::new(NestedRecordIdentity {
            path: nested.name.clone(),
            owner: owner.to_string(),
            short_name,
            local_name,
            qualifier: qualifier.to_string(),
            name: ResolvedName::unsuffixed(qualified),
        });
        self.by_path
            .insert(nested.name.clone(), Arc::clone(&identity));
        Ok(identity)
    }

    /// Flatten every group under `node`, depth-first in declaration order.
    pub fn flatten_tree(
        &mut self,
        node: &SchemaNode,
        owner: &str,
        qualifier: &str,
    ) -> Result<Vec<Arc<NestedRecordIdentity>>> {
        let mut flattened = Vec::new();
        self.flatten_into(node, owner, qualifier, &mut flattened)?;
        Ok(flattened)
    }

    fn flatten_into(
        &mut self,
        node: &SchemaNode,
        owner: &str,
        qualifier: &str,
        out: &mut Vec<Arc<NestedRecordIdentity>>,
    ) -> Result<()> {
        for nested in node.nested.values() {
            let identity = self.flatten(nested, owner, qualifier)?;
            let child_qualifier = identity.child_qualifier();
            out.push(identity);
            self.flatten_into(nested, owner, &child_qualifier, out)?;
        }
        Ok(())
    }

    fn short_name(&self, nested: &SchemaNode) -> String {
        if let Some(explicit) = &nested.explicit_type_name {
            return explicit.clone();
        }

        let segment = nested.short_path();
        match self.repairs.iter().find(|r| r.matches(&nested.name)) {
            Some(repair) => repair.rule.apply(segment),
            None => NamingConvention::PascalCase.convert(segment),
        }
    }
}
