pub mod backbone;
pub mod base_remap;
pub mod context;
pub mod cycles;
pub mod enumeration;
pub mod resolved;
pub mod type_resolver;

pub use backbone::{
    BackboneFlattener, Capitalization, CapitalizationRepair, NestedRecordIdentity,
};
pub use base_remap::effective_base;
pub use context::{ResolutionContext, ResolutionStats};
pub use enumeration::{
    BindingUsage, EnumerationDeduplicator, EnumerationMember, EnumerationRecord, EnumerationSet,
};
pub use resolved::{
    ChoiceAlternative, ChoiceTarget, ChoiceType, NodeIdentity, ResolvedElement, ResolvedNested,
    ResolvedNode, ResolvedType,
};
pub use type_resolver::{GENERIC_ALIAS, RESOURCE_TYPE, TypeResolver};
