use serde::{Deserialize, Serialize};

const FHIRPATH_SYSTEM_PREFIX: &str = "http://hl7.org/fhirpath/System.";

/// Scalar kinds an element can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Integer64,
    Decimal,
    String,
    Uri,
    Url,
    Canonical,
    Base64Binary,
    Instant,
    Date,
    DateTime,
    Time,
    Code,
    Oid,
    Id,
    Markdown,
    UnsignedInt,
    PositiveInt,
    Uuid,
    Xhtml,
}

impl PrimitiveKind {
    /// Map a type code to its primitive kind. Accepts FHIR primitive codes and
    /// FHIRPath system types.
    pub fn from_code(code: &str) -> Option<Self> {
        if let Some(system) = code.strip_prefix(FHIRPATH_SYSTEM_PREFIX) {
            return match system {
                "String" => Some(PrimitiveKind::String),
                "Boolean" => Some(PrimitiveKind::Boolean),
                "Integer" => Some(PrimitiveKind::Integer),
                "Decimal" => Some(PrimitiveKind::Decimal),
                "Date" => Some(PrimitiveKind::Date),
                "DateTime" => Some(PrimitiveKind::DateTime),
                "Time" => Some(PrimitiveKind::Time),
                _ => None,
            };
        }

        let kind = match code {
            "boolean" => PrimitiveKind::Boolean,
            "integer" => PrimitiveKind::Integer,
            "integer64" => PrimitiveKind::Integer64,
            "decimal" => PrimitiveKind::Decimal,
            "string" => PrimitiveKind::String,
            "uri" => PrimitiveKind::Uri,
            "url" => PrimitiveKind::Url,
            "canonical" => PrimitiveKind::Canonical,
            "base64Binary" => PrimitiveKind::Base64Binary,
            "instant" => PrimitiveKind::Instant,
            "date" => PrimitiveKind::Date,
            "dateTime" => PrimitiveKind::DateTime,
            "time" => PrimitiveKind::Time,
            "code" => PrimitiveKind::Code,
            "oid" => PrimitiveKind::Oid,
            "id" => PrimitiveKind::Id,
            "markdown" => PrimitiveKind::Markdown,
            "unsignedInt" => PrimitiveKind::UnsignedInt,
            "positiveInt" => PrimitiveKind::PositiveInt,
            "uuid" => PrimitiveKind::Uuid,
            "xhtml" => PrimitiveKind::Xhtml,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Integer64 => "integer64",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::String => "string",
            PrimitiveKind::Uri => "uri",
            PrimitiveKind::Url => "url",
            PrimitiveKind::Canonical => "canonical",
            PrimitiveKind::Base64Binary => "base64Binary",
            PrimitiveKind::Instant => "instant",
            PrimitiveKind::Date => "date",
            PrimitiveKind::DateTime => "dateTime",
            PrimitiveKind::Time => "time",
            PrimitiveKind::Code => "code",
            PrimitiveKind::Oid => "oid",
            PrimitiveKind::Id => "id",
            PrimitiveKind::Markdown => "markdown",
            PrimitiveKind::UnsignedInt => "unsignedInt",
            PrimitiveKind::PositiveInt => "positiveInt",
            PrimitiveKind::Uuid => "uuid",
            PrimitiveKind::Xhtml => "xhtml",
        }
    }

    pub fn is_primitive_code(code: &str) -> bool {
        Self::from_code(code).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fhir_primitive_codes() {
        assert_eq!(PrimitiveKind::from_code("dateTime"), Some(PrimitiveKind::DateTime));
        assert_eq!(PrimitiveKind::from_code("code"), Some(PrimitiveKind::Code));
        assert_eq!(PrimitiveKind::from_code("CodeableConcept"), None);
    }

    #[test]
    fn test_fhirpath_system_types() {
        assert_eq!(
            PrimitiveKind::from_code("http://hl7.org/fhirpath/System.String"),
            Some(PrimitiveKind::String)
        );
        assert_eq!(PrimitiveKind::from_code("http://hl7.org/fhirpath/System.Quantity"), None);
    }

    #[test]
    fn test_code_round_trips_through_table() {
        for kind in [PrimitiveKind::Base64Binary, PrimitiveKind::PositiveInt, PrimitiveKind::Xhtml] {
            assert_eq!(PrimitiveKind::from_code(kind.code()), Some(kind));
        }
    }
}
