pub mod config;
pub mod profile;

pub use config::{FhirVersion, GenerationSubset, ResolverConfig};
pub use profile::{TargetKind, TargetProfile};
