//! Element type resolution.

use std::collections::BTreeSet;

use super::context::ResolutionContext;
use super::resolved::{
    ChoiceAlternative, ChoiceTarget, ChoiceType, ResolvedElement, ResolvedNested, ResolvedNode,
    ResolvedType,
};
use crate::core::ResolverConfig;
use crate::error::{FhirGenError, Result};
use crate::naming::upper_first;
use crate::types::canonical::tail_name;
use crate::types::{CODE_TYPE, ElementDefinition, ElementTypeOption, PrimitiveKind, SchemaGraph, SchemaNode};

/// The polymorphic placeholder type.
pub const RESOURCE_TYPE: &str = "Resource";

/// Type parameter name used for generic containers.
pub const GENERIC_ALIAS: &str = "TResource";

const DEFAULT_GENERIC_POINTS: &[&str] = &[
    "Bundle.entry.resource",
    "Bundle.entry.response.outcome",
    "Parameters.parameter.resource",
];

/// Types with the same shape in every supported release.
const DEFAULT_COMMON_SUBSET: &[&str] = &[
    "base64Binary", "boolean", "canonical", "code", "date", "dateTime", "decimal", "id",
    "instant", "integer", "markdown", "oid", "positiveInt", "string", "time", "unsignedInt",
    "uri", "url", "uuid", "Address", "Age", "Annotation", "Attachment", "CodeableConcept",
    "Coding", "ContactPoint", "Count", "Distance", "Duration", "HumanName", "Identifier",
    "Money", "Period", "Quantity", "Range", "Ratio", "Reference", "SampledData", "Signature",
    "Timing",
];

pub struct TypeResolver {
    generic_points: BTreeSet<String>,
    common_subset: BTreeSet<String>,
}

impl TypeResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        let generic_points = DEFAULT_GENERIC_POINTS
            .iter()
            .map(|p| p.to_string())
            .chain(config.generic_injection_points.iter().cloned())
            .collect();

        let common_subset = match &config.common_subset {
            Some(types) => types.iter().cloned().collect(),
            None => DEFAULT_COMMON_SUBSET.iter().map(|t| t.to_string()).collect(),
        };

        Self {
            generic_points,
            common_subset,
        }
    }

    pub fn is_generic_point(&self, path: &str) -> bool {
        self.generic_points.contains(path)
    }

    pub fn is_in_common_subset(&self, type_code: &str) -> bool {
        self.common_subset.contains(type_short_name(type_code))
    }

    /// Resolve a top-level node: its identity, effective base, every nested
    /// group it owns and all of their elements.
    pub fn resolve_node(
        &self,
        ctx: &mut ResolutionContext<'_>,
        node: &SchemaNode,
    ) -> Result<ResolvedNode> {
        let identity = ctx.identity(&node.name, &node.name)?;
        let base = ctx.base_of(node)?;

        // Every group is named before any element so content references to
        // later siblings resolve.
        let flattened = ctx
            .flattener
            .flatten_tree(node, &node.name, identity.name.as_str())?;

        let elements = self.resolve_elements(ctx, node, &node.name, identity.name.as_str())?;

        let mut nested = Vec::with_capacity(flattened.len());
        for record in flattened {
            let group = node
                .find_nested(&record.path)
                .ok_or_else(|| FhirGenError::unresolved_reference(&record.path, &node.name))?;
            let elements = self.resolve_elements(ctx, group, &node.name, record.name.as_str())?;
            nested.push(ResolvedNested {
                identity: record,
                elements,
            });
        }

        ctx.stats.nodes_resolved += 1;
        tracing::debug!(
            "Resolved '{}' as '{}' with {} elements and {} nested records",
            node.name,
            identity.name,
            elements.len(),
            nested.len()
        );

        Ok(ResolvedNode {
            identity,
            base,
            elements,
            nested,
        })
    }

    /// Resolve the elements a container declares itself, in field order.
    fn resolve_elements(
        &self,
        ctx: &mut ResolutionContext<'_>,
        container: &SchemaNode,
        owner: &str,
        container_name: &str,
    ) -> Result<Vec<ResolvedElement>> {
        let field_scope = format!("fields:{container_name}");

        let mut ordered: Vec<&ElementDefinition> = container.elements.values().collect();
        ordered.sort_by_key(|e| e.order);

        let mut resolved = Vec::with_capacity(ordered.len());
        for element in ordered {
            if let Some(element) = self.resolve_element(ctx, element, container, owner, &field_scope)? {
                resolved.push(element);
            }
        }
        Ok(resolved)
    }

    /// Resolve one element. Inherited and prohibited elements yield `None`.
    pub fn resolve_element(
        &self,
        ctx: &mut ResolutionContext<'_>,
        element: &ElementDefinition,
        container: &SchemaNode,
        owner: &str,
        field_scope: &str,
    ) -> Result<Option<ResolvedElement>> {
        if element.inherited {
            ctx.stats.inherited_skipped += 1;
            return Ok(None);
        }
        if element.cardinality.is_prohibited() {
            return Ok(None);
        }

        let field_name =
            ctx.naming
                .resolve(element.base_name(), field_scope, ctx.profile.field_convention)?;
        let resolved = self.resolve_type(ctx, element, container, owner, field_scope)?;
        let reference_targets = reference_targets(ctx.graph, element)?;

        ctx.stats.elements_resolved += 1;

        Ok(Some(ResolvedElement {
            path: element.path.clone(),
            field_name,
            resolved,
            repeated: element.cardinality.is_repeated(),
            required: element.cardinality.is_required(),
            order: element.order,
            reference_targets,
        }))
    }

    /// What `element` becomes. Choice slots are named in `field_scope`.
    pub fn resolve_type(
        &self,
        ctx: &mut ResolutionContext<'_>,
        element: &ElementDefinition,
        container: &SchemaNode,
        owner: &str,
        field_scope: &str,
    ) -> Result<ResolvedType> {
        if let Some(reference) = &element.content_reference {
            let path = reference
                .rsplit_once('#')
                .map_or(reference.as_str(), |(_, path)| path);
            let record = ctx.nested_identity(path, &element.path)?;
            return Ok(ResolvedType::NestedRecord {
                record,
                owning_path: element.path.clone(),
            });
        }

        if container.nested.contains_key(&element.path) {
            let record = ctx.nested_identity(&element.path, &element.path)?;
            return Ok(ResolvedType::NestedRecord {
                record,
                owning_path: element.path.clone(),
            });
        }

        match element.types.as_slice() {
            [] => Err(FhirGenError::unresolved_reference("(no type)", &element.path)),
            [single] => self.resolve_single(ctx, element, single, owner),
            options => self.resolve_choice(ctx, element, options, field_scope),
        }
    }

    fn resolve_single(
        &self,
        ctx: &mut ResolutionContext<'_>,
        element: &ElementDefinition,
        option: &ElementTypeOption,
        owner: &str,
    ) -> Result<ResolvedType> {
        if option.code == CODE_TYPE {
            let enumeration =
                ctx.enumerations
                    .bind_code(&mut ctx.naming, ctx.graph, element, owner)?;
            return Ok(ResolvedType::Scalar {
                primitive: PrimitiveKind::Code,
                enumeration,
            });
        }

        if let Some(primitive) = PrimitiveKind::from_code(&option.code) {
            return Ok(ResolvedType::Scalar {
                primitive,
                enumeration: None,
            });
        }

        let name = tail_name(&option.code);
        if name == RESOURCE_TYPE && self.is_generic_point(&element.path) {
            let default_binding = ctx.identity(RESOURCE_TYPE, &element.path)?;
            ctx.stats.generic_containers += 1;
            return Ok(ResolvedType::GenericContainer {
                alias: GENERIC_ALIAS.to_string(),
                default_binding,
            });
        }

        let target = ctx.identity(&name, &element.path)?;
        Ok(ResolvedType::NamedReference { target })
    }

    fn resolve_choice(
        &self,
        ctx: &mut ResolutionContext<'_>,
        element: &ElementDefinition,
        options: &[ElementTypeOption],
        field_scope: &str,
    ) -> Result<ResolvedType> {
        let base = element.base_name();

        let mut alternatives = Vec::with_capacity(options.len());
        for option in options {
            let short = type_short_name(&option.code);
            let slot_name = ctx.naming.resolve(
                &format!("{base}{}", upper_first(short)),
                field_scope,
                ctx.profile.field_convention,
            )?;

            let target = match PrimitiveKind::from_code(&option.code) {
                Some(primitive) => ChoiceTarget::Scalar { primitive },
                None => ChoiceTarget::Named {
                    identity: ctx.identity(&tail_name(&option.code), &element.path)?,
                },
            };

            alternatives.push(ChoiceAlternative {
                type_code: option.code.clone(),
                slot_name,
                target,
            });
        }

        ctx.stats.choices_expanded += 1;

        Ok(ResolvedType::Choice(ChoiceType {
            discriminator_pattern: format!("{base}{{Type}}"),
            within_common_subset: options.iter().all(|o| self.is_in_common_subset(&o.code)),
            alternatives,
        }))
    }
}

/// Short type name used in slot names: `Quantity`, `dateTime`, `String` for
/// `http://hl7.org/fhirpath/System.String`.
fn type_short_name(code: &str) -> &str {
    let tail = code.rsplit('/').next().unwrap_or(code);
    tail.rsplit('.').next().unwrap_or(tail)
}

/// Allowed reference target names in declaration order. Each must name a
/// known node unless it is the universal `Resource`.
fn reference_targets(graph: &SchemaGraph, element: &ElementDefinition) -> Result<Vec<String>> {
    let mut targets: Vec<String> = Vec::new();
    for profile in element.types.iter().flat_map(|t| t.target_profiles.iter()) {
        let name = tail_name(profile);
        if name != RESOURCE_TYPE && graph.node(&name).is_none() {
            return Err(FhirGenError::unresolved_reference(profile, &element.path));
        }
        if !targets.contains(&name) {
            targets.push(name);
        }
    }
    Ok(targets)
}
