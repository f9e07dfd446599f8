//! # OctoFHIR FHIRGen
//!
//! The resolution engine of a FHIR code generator. Given an in-memory schema
//! graph for one FHIR release, it decides once and deterministically what
//! every element becomes in a target type system, names everything it emits
//! and hands renderers a read-only result.
//!
//! ## Features
//!
//! - **Naming**: convention recasing, reserved-word escaping and stable
//!   `Status`, `Status_2`, `Status_3` collision suffixes per scope
//! - **Backbone flattening**: nested element groups become named types such
//!   as `ClaimItemDetailComponent`
//! - **Enumerations**: one record per required value set, shared globally or
//!   declared local to its only owner
//! - **Type resolution**: scalars, named references, choices, nested records
//!   and generic containers
//! - **Export manifest**: canonical index of primitives, complex types and
//!   resources
//!
//! ## Quick Start
//!
//! ```rust
//! use octofhir_fhirgen::*;
//!
//! # fn example() -> Result<()> {
//! let graph = SchemaGraph::new(FhirVersion::R4)
//!     .with_node(SchemaNode::resource("Patient")
//!         .with_element(ElementDefinition::new("Patient.active").with_type("boolean")));
//!
//! let engine = ResolutionEngine::new(ResolverConfig::for_target(TargetKind::TypeScript))?;
//! let output = engine.run(&graph)?;
//! assert!(output.manifest.supports("Patient"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod naming;
pub mod resolver;
pub mod types;
pub mod utils;

pub use crate::core::{FhirVersion, GenerationSubset, ResolverConfig, TargetKind, TargetProfile};
pub use engine::{GenerationOutput, ResolutionEngine};
pub use error::Result; // Our Result type takes precedence
pub use error::FhirGenError;
pub use manifest::{ExportManifest, ManifestBuilder, ManifestEntry};
pub use naming::{NamingConvention, NamingPolicy, NamingResolver, ResolvedName};
pub use resolver::*;
pub use types::*;
