use thiserror::Error;

#[derive(Error, Debug)]
pub enum FhirGenError {
    #[error("Ambiguous name '{name}' in scope '{scope}': {message}")]
    AmbiguousName {
        name: String,
        scope: String,
        message: String,
    },

    #[error("Unresolved reference '{reference}' from '{entity}'")]
    UnresolvedReference { reference: String, entity: String },

    #[error("Cyclic recursion at '{entity}': {}", .chain.join(" -> "))]
    CyclicRecursion { entity: String, chain: Vec<String> },

    #[error("Duplicate manifest name '{name}' for '{first}' and '{second}'")]
    DuplicateManifestName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FhirGenError {
    pub fn ambiguous_name(
        name: impl Into<String>,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::AmbiguousName {
            name: name.into(),
            scope: scope.into(),
            message: message.into(),
        }
    }

    pub fn unresolved_reference(reference: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            entity: entity.into(),
        }
    }

    pub fn cyclic_recursion(entity: impl Into<String>, chain: Vec<String>) -> Self {
        Self::CyclicRecursion {
            entity: entity.into(),
            chain,
        }
    }

    pub fn duplicate_manifest_name(
        name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateManifestName {
            name: name.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FhirGenError>;
