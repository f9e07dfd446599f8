//! Version-dependent base-type substitution.
//!
//! Later releases introduced abstract interface types between a resource and
//! `DomainResource` (and between datatypes and `DataType`). Generated code
//! derives from the concrete base instead.

use crate::core::FhirVersion::{self, R4B, R5, R6};
use crate::types::canonical::tail_name;

/// (raw base, versions the substitution applies to, effective base)
const BASE_REMAPS: &[(&str, &[FhirVersion], &str)] = &[
    ("CanonicalResource", &[R5, R6], "DomainResource"),
    ("MetadataResource", &[R4B, R5, R6], "DomainResource"),
    ("BackboneType", &[R5, R6], "DataType"),
    ("PrimitiveType", &[R5, R6], "DataType"),
];

/// Effective base name for a raw base reference (a name or a canonical URL).
pub fn effective_base(raw: &str, version: FhirVersion) -> String {
    let name = tail_name(raw);
    BASE_REMAPS
        .iter()
        .find(|(from, versions, _)| *from == name && versions.contains(&version))
        .map_or(name, |(_, _, to)| to.to_string())
}
