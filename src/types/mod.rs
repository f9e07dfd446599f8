pub mod canonical;
pub mod element;
pub mod primitive;
pub mod schema;
pub mod value_set;

pub use element::{
    BindingStrength, CODE_TYPE, Cardinality, ElementBinding, ElementDefinition,
    ElementTypeOption, MaxCardinality,
};
pub use primitive::PrimitiveKind;
pub use schema::{NodeKind, SchemaGraph, SchemaNode};
pub use value_set::{ValueSet, ValueSetCode};
