use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::backbone::{BackboneFlattener, NestedRecordIdentity};
use super::base_remap::effective_base;
use super::enumeration::{BindingUsage, EnumerationDeduplicator};
use super::resolved::NodeIdentity;
use crate::core::{ResolverConfig, TargetProfile};
use crate::error::{FhirGenError, Result};
use crate::naming::{NamingResolver, ResolvedName};
use crate::types::{SchemaGraph, SchemaNode};

/// Per-run state threaded through every resolution call. Nothing here
/// outlives the run.
pub struct ResolutionContext<'g> {
    pub graph: &'g SchemaGraph,
    pub profile: TargetProfile,
    pub naming: NamingResolver,
    pub flattener: BackboneFlattener,
    pub enumerations: EnumerationDeduplicator,
    pub stats: ResolutionStats,
    identities: IndexMap<String, Arc<NodeIdentity>>,
    bases: HashMap<String, Option<Arc<NodeIdentity>>>,
    start_time: Option<Instant>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionStats {
    pub nodes_resolved: usize,
    pub elements_resolved: usize,
    pub inherited_skipped: usize,
    pub choices_expanded: usize,
    pub nested_records: usize,
    pub generic_containers: usize,
    pub enumerations_minted: usize,
    pub resolution_duration: Option<Duration>,
}

impl<'g> ResolutionContext<'g> {
    pub fn new(graph: &'g SchemaGraph, config: &ResolverConfig, usage: BindingUsage) -> Self {
        let profile = config.profile();
        Self {
            graph,
            naming: NamingResolver::new(profile.naming_policy(config.max_suffix_attempts)),
            flattener: BackboneFlattener::new(
                config.component_suffix.clone(),
                config.capitalization_repairs.clone(),
            ),
            enumerations: EnumerationDeduplicator::new(config, &profile, usage),
            profile,
            stats: ResolutionStats::default(),
            identities: IndexMap::new(),
            bases: HashMap::new(),
            start_time: None,
        }
    }

    pub fn begin_run(&mut self) {
        self.start_time = Some(Instant::now());
        tracing::info!(
            "Resolving FHIR {} schema for {} ({} nodes, {} value sets)",
            self.graph.version,
            self.profile.kind,
            self.graph.len(),
            self.graph.value_sets.len()
        );
    }

    pub fn end_run(&mut self) {
        if let Some(start_time) = self.start_time {
            self.stats.resolution_duration = Some(start_time.elapsed());
        }
        self.stats.nested_records = self.flattener.len();
        self.stats.enumerations_minted = self.enumerations.len();

        tracing::info!(
            "Resolution completed. Resolved {} nodes, {} elements, {} nested records, {} enumerations",
            self.stats.nodes_resolved,
            self.stats.elements_resolved,
            self.stats.nested_records,
            self.stats.enumerations_minted
        );
    }

    /// The shared identity of a top-level node, created on first request.
    /// `entity` names the requester for error reporting.
    pub fn identity(&mut self, canonical: &str, entity: &str) -> Result<Arc<NodeIdentity>> {
        if let Some(identity) = self.identities.get(canonical) {
            return Ok(Arc::clone(identity));
        }

        let graph = self.graph;
        let node = graph
            .node(canonical)
            .ok_or_else(|| FhirGenError::unresolved_reference(canonical, entity))?;

        let name = self
            .naming
            .transform_type_name(&node.name, self.profile.type_convention);
        self.flattener
            .reserve_type_name(&name, &node.name, node.kind.is_exported())?;

        let identity = Arc::new(NodeIdentity {
            canonical_name: node.name.clone(),
            url: node.url.clone(),
            kind: node.kind,
            name: ResolvedName::unsuffixed(name),
            is_abstract: node.is_abstract,
        });
        self.identities
            .insert(node.name.clone(), Arc::clone(&identity));
        Ok(identity)
    }

    /// Effective base of `node` after version remapping, memoized per node.
    pub fn base_of(&mut self, node: &SchemaNode) -> Result<Option<Arc<NodeIdentity>>> {
        if let Some(cached) = self.bases.get(&node.name) {
            return Ok(cached.clone());
        }

        let base = match &node.base {
            Some(raw) => {
                let name = effective_base(raw, self.graph.version);
                Some(self.identity(&name, &node.name)?)
            }
            None => None,
        };

        self.bases.insert(node.name.clone(), base.clone());
        Ok(base)
    }

    /// Identity of the nested group at `path`, flattening its owner's groups
    /// first when the owner has not been resolved yet.
    pub fn nested_identity(
        &mut self,
        path: &str,
        entity: &str,
    ) -> Result<Arc<NestedRecordIdentity>> {
        if let Some(identity) = self.flattener.get(path) {
            return Ok(Arc::clone(identity));
        }

        let owner_name = path.split('.').next().unwrap_or(path);
        let graph = self.graph;
        let owner = graph
            .node(owner_name)
            .filter(|owner| owner.find_nested(path).is_some())
            .ok_or_else(|| FhirGenError::unresolved_reference(path, entity))?;

        let identity = self.identity(&owner.name, entity)?;
        self.flattener
            .flatten_tree(owner, &owner.name, identity.name.as_str())?;

        self.flattener
            .get(path)
            .cloned()
            .ok_or_else(|| FhirGenError::unresolved_reference(path, entity))
    }
}
