//! The resolution engine: one single-threaded pass from schema graph to
//! manifest, resolved nodes and enumerations.

use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use crate::core::{GenerationSubset, ResolverConfig};
use crate::error::{FhirGenError, Result};
use crate::manifest::{ExportManifest, ManifestBuilder};
use crate::resolver::{
    BindingUsage, EnumerationSet, ResolutionContext, ResolutionStats, ResolvedNode, TypeResolver,
    cycles, effective_base,
};
use crate::types::canonical::tail_name;
use crate::types::{PrimitiveKind, SchemaGraph, SchemaNode};
use crate::utils::{OutputFingerprint, json_hash};

/// Everything a run hands to renderers. Read-only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    pub manifest: ExportManifest,
    /// Resolved top-level nodes in declaration order.
    pub nodes: Vec<ResolvedNode>,
    pub enumerations: EnumerationSet,
    #[serde(skip)]
    pub stats: ResolutionStats,
}

impl GenerationOutput {
    pub fn node(&self, canonical: &str) -> Option<&ResolvedNode> {
        self.nodes
            .iter()
            .find(|n| n.identity.canonical_name == canonical)
    }

    /// SHA-256 hex digest of the serialized output. Equal for equal runs.
    pub fn fingerprint(&self) -> Result<String> {
        json_hash(self)
    }

    pub fn output_fingerprint(&self) -> Result<OutputFingerprint> {
        Ok(OutputFingerprint::new(
            self.manifest.version.to_string(),
            self.manifest.target.to_string(),
            self.fingerprint()?,
        ))
    }
}

pub struct ResolutionEngine {
    config: ResolverConfig,
    type_resolver: TypeResolver,
}

impl ResolutionEngine {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        let type_resolver = TypeResolver::new(&config);
        Ok(Self {
            config,
            type_resolver,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `graph`. Any fatal condition aborts the whole run.
    pub fn run(&self, graph: &SchemaGraph) -> Result<GenerationOutput> {
        let nodes = nodes_in_scope(graph)?;
        let usage = BindingUsage::scan(nodes.iter().copied());

        let mut ctx = ResolutionContext::new(graph, &self.config, usage);
        ctx.begin_run();

        // Claim every top-level name before flattening anything. Nested groups
        // cannot take a type name declared later, and two exported types with
        // one name fail here rather than as a nested-group clash.
        for node in &nodes {
            ctx.identity(&node.name, &node.name)?;
        }

        let mut resolved = Vec::with_capacity(nodes.len());
        for node in &nodes {
            resolved.push(self.type_resolver.resolve_node(&mut ctx, node)?);
        }

        cycles::check(&resolved)?;

        let manifest = ManifestBuilder::new(graph.version, self.config.target)
            .build(resolved.iter().map(|n| &n.identity))?;

        ctx.end_run();

        Ok(GenerationOutput {
            manifest,
            nodes: resolved,
            enumerations: ctx.enumerations.partition(),
            stats: ctx.stats.clone(),
        })
    }
}

/// Nodes a run resolves, in declaration order.
fn nodes_in_scope(graph: &SchemaGraph) -> Result<Vec<&SchemaNode>> {
    let roots = match &graph.subset {
        GenerationSubset::Full => return Ok(graph.nodes.values().collect()),
        GenerationSubset::Selected(roots) => roots,
    };

    let mut included: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&SchemaNode> = VecDeque::new();

    for root in roots {
        let node = graph
            .node(root)
            .ok_or_else(|| FhirGenError::unresolved_reference(root, "generation subset"))?;
        if included.insert(node.name.as_str()) {
            queue.push_back(node);
        }
    }

    while let Some(node) = queue.pop_front() {
        let mut dependencies = Vec::new();
        if let Some(base) = &node.base {
            dependencies.push(effective_base(base, graph.version));
        }
        collect_dependencies(node, &mut dependencies);

        for name in dependencies {
            if let Some(dependency) = graph.node(&name) {
                if included.insert(dependency.name.as_str()) {
                    queue.push_back(dependency);
                }
            }
        }
    }

    tracing::debug!(
        "Selected {} of {} nodes from {} roots",
        included.len(),
        graph.len(),
        roots.len()
    );

    Ok(graph
        .nodes
        .values()
        .filter(|n| included.contains(n.name.as_str()))
        .collect())
}

/// Types an element tree needs by name. Reference targets do not pull types
/// into the run.
fn collect_dependencies(node: &SchemaNode, out: &mut Vec<String>) {
    for element in node.elements.values() {
        if element.inherited || element.cardinality.is_prohibited() {
            continue;
        }
        for option in &element.types {
            if !PrimitiveKind::is_primitive_code(&option.code) {
                out.push(tail_name(&option.code));
            }
        }
        if let Some(reference) = &element.content_reference {
            let path = reference
                .rsplit_once('#')
                .map_or(reference.as_str(), |(_, path)| path);
            if let Some(owner) = path.split('.').next() {
                out.push(owner.to_string());
            }
        }
    }
    for nested in node.nested.values() {
        collect_dependencies(nested, out);
    }
}
