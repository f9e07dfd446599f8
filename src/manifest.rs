//! Export manifest: the canonical index renderers work from.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::core::{FhirVersion, TargetKind};
use crate::error::{FhirGenError, Result};
use crate::naming::ResolvedName;
use crate::resolver::NodeIdentity;
use crate::types::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub canonical_name: String,
    pub url: String,
    pub name: ResolvedName,
    pub is_abstract: bool,
}

impl From<&NodeIdentity> for ManifestEntry {
    fn from(identity: &NodeIdentity) -> Self {
        Self {
            canonical_name: identity.canonical_name.clone(),
            url: identity.url.clone(),
            name: identity.name.clone(),
            is_abstract: identity.is_abstract,
        }
    }
}

/// Immutable once built. Maps are keyed by canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub version: FhirVersion,
    pub target: TargetKind,
    pub primitives: BTreeMap<String, ManifestEntry>,
    pub complex_types: BTreeMap<String, ManifestEntry>,
    pub resources: BTreeMap<String, ManifestEntry>,
    /// Concrete resources in canonical-name order.
    pub supported_resources: Vec<String>,
}

impl ExportManifest {
    pub fn get(&self, canonical: &str) -> Option<&ManifestEntry> {
        self.primitives
            .get(canonical)
            .or_else(|| self.complex_types.get(canonical))
            .or_else(|| self.resources.get(canonical))
    }

    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.primitives
            .values()
            .chain(self.complex_types.values())
            .chain(self.resources.values())
    }

    pub fn len(&self) -> usize {
        self.primitives.len() + self.complex_types.len() + self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn supports(&self, resource: &str) -> bool {
        self.supported_resources.iter().any(|r| r == resource)
    }
}

pub struct ManifestBuilder {
    version: FhirVersion,
    target: TargetKind,
}

impl ManifestBuilder {
    pub fn new(version: FhirVersion, target: TargetKind) -> Self {
        Self { version, target }
    }

    /// Index every primitive, complex type and resource exactly once. Two
    /// canonical names sharing a resolved name abort the build.
    pub fn build<'a>(
        &self,
        identities: impl IntoIterator<Item = &'a Arc<NodeIdentity>>,
    ) -> Result<ExportManifest> {
        let mut ordered: Vec<&NodeIdentity> = identities
            .into_iter()
            .map(Arc::as_ref)
            .filter(|i| i.kind.is_exported())
            .collect();
        ordered.sort_by(|a, b| a.canonical_name.cmp(&b.canonical_name));
        ordered.dedup_by(|a, b| a.canonical_name == b.canonical_name);

        let mut manifest = ExportManifest {
            version: self.version,
            target: self.target,
            primitives: BTreeMap::new(),
            complex_types: BTreeMap::new(),
            resources: BTreeMap::new(),
            supported_resources: Vec::new(),
        };
        let mut holders: HashMap<&str, &str> = HashMap::new();

        for identity in ordered {
            if let Some(first) = holders.insert(identity.name.as_str(), &identity.canonical_name) {
                return Err(FhirGenError::duplicate_manifest_name(
                    identity.name.as_str(),
                    first,
                    identity.canonical_name.as_str(),
                ));
            }

            let entry = ManifestEntry::from(identity);
            match identity.kind {
                NodeKind::PrimitiveType => {
                    manifest.primitives.insert(entry.canonical_name.clone(), entry);
                }
                NodeKind::ComplexType => {
                    manifest.complex_types.insert(entry.canonical_name.clone(), entry);
                }
                _ => {
                    if !identity.is_abstract {
                        manifest
                            .supported_resources
                            .push(identity.canonical_name.clone());
                    }
                    manifest.resources.insert(entry.canonical_name.clone(), entry);
                }
            }
        }

        tracing::debug!(
            "Built manifest with {} primitives, {} complex types, {} resources ({} supported)",
            manifest.primitives.len(),
            manifest.complex_types.len(),
            manifest.resources.len(),
            manifest.supported_resources.len()
        );

        Ok(manifest)
    }
}
