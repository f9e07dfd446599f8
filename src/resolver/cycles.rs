//! Structural recursion check over the resolved output.
//!
//! A value of type A that must contain a value of type B which must contain
//! an A can never be constructed. Only required, single-valued, by-value
//! edges count: named complex types and nested records. Base-type edges are
//! included so a cyclic inheritance chain is caught too. Repeated, optional,
//! scalar and generic edges all break recursion.

use indexmap::IndexMap;
use std::collections::HashMap;

use super::resolved::{ResolvedElement, ResolvedNode, ResolvedType};
use crate::error::{FhirGenError, Result};
use crate::types::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Containment edges between top-level names and nested-group paths.
#[derive(Debug, Default)]
pub struct RecursionGraph {
    edges: IndexMap<String, Vec<String>>,
}

impl RecursionGraph {
    pub fn build(nodes: &[ResolvedNode]) -> Self {
        let mut graph = Self::default();
        for node in nodes {
            let name = &node.identity.canonical_name;
            graph.add_vertex(name);
            if let Some(base) = &node.base {
                graph.add_edge(name, &base.canonical_name);
            }
            graph.add_element_edges(name, &node.elements);

            for nested in &node.nested {
                graph.add_vertex(&nested.identity.path);
                graph.add_element_edges(&nested.identity.path, &nested.elements);
            }
        }
        graph
    }

    pub fn add_vertex(&mut self, vertex: &str) {
        self.edges.entry(vertex.to_string()).or_default();
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
    }

    fn add_element_edges(&mut self, container: &str, elements: &[ResolvedElement]) {
        for element in elements {
            if element.repeated || !element.required {
                continue;
            }
            match &element.resolved {
                ResolvedType::NamedReference { target }
                    if matches!(target.kind, NodeKind::ComplexType | NodeKind::Resource) =>
                {
                    self.add_edge(container, &target.canonical_name);
                }
                ResolvedType::NestedRecord { record, .. } => {
                    self.add_edge(container, &record.path);
                }
                _ => {}
            }
        }
    }

    /// The first cycle found, visiting vertices in insertion order. The chain
    /// starts and ends with the same vertex.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut states = HashMap::new();
        let mut stack = Vec::new();
        self.edges
            .keys()
            .find_map(|vertex| self.visit(vertex, &mut states, &mut stack))
    }

    fn visit<'a>(
        &'a self,
        vertex: &'a str,
        states: &mut HashMap<&'a str, Visit>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match states.get(vertex) {
            Some(Visit::Done) => return None,
            Some(Visit::InProgress) => {
                let start = stack.iter().position(|v| *v == vertex).unwrap_or(0);
                let mut chain: Vec<String> = stack[start..].iter().map(|v| v.to_string()).collect();
                chain.push(vertex.to_string());
                return Some(chain);
            }
            None => {}
        }

        states.insert(vertex, Visit::InProgress);
        stack.push(vertex);
        for next in self.edges.get(vertex).into_iter().flatten() {
            if let Some(chain) = self.visit(next, states, stack) {
                return Some(chain);
            }
        }
        stack.pop();
        states.insert(vertex, Visit::Done);
        None
    }
}

/// Fail with the offending chain if the resolved nodes recurse structurally.
pub fn check(nodes: &[ResolvedNode]) -> Result<()> {
    match RecursionGraph::build(nodes).find_cycle() {
        Some(chain) => {
            let entity = chain.first().cloned().unwrap_or_default();
            Err(FhirGenError::cyclic_recursion(entity, chain))
        }
        None => Ok(()),
    }
}
