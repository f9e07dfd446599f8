use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::profile::{TargetKind, TargetProfile};
use crate::error::{FhirGenError, Result};
use crate::resolver::backbone::CapitalizationRepair;

/// Release of the schema being resolved. Drives version-dependent tables such
/// as base-type remapping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FhirVersion {
    #[serde(rename = "1.0.2")]
    R2,
    #[serde(rename = "3.0.2")]
    R3,
    #[serde(rename = "4.0.1")]
    R4,
    #[serde(rename = "4.3.0")]
    R4B,
    #[serde(rename = "5.0.0")]
    R5,
    #[serde(rename = "6.0.0-ballot3")]
    R6,
}

impl std::fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.package_version())
    }
}

impl FhirVersion {
    /// Get all supported FHIR versions
    pub fn all() -> &'static [FhirVersion] {
        &[
            FhirVersion::R2,
            FhirVersion::R3,
            FhirVersion::R4,
            FhirVersion::R4B,
            FhirVersion::R5,
            FhirVersion::R6,
        ]
    }

    /// Get the package version for this FHIR version
    pub fn package_version(&self) -> &'static str {
        match self {
            FhirVersion::R2 => "1.0.2",
            FhirVersion::R3 => "3.0.2",
            FhirVersion::R4 => "4.0.1",
            FhirVersion::R4B => "4.3.0",
            FhirVersion::R5 => "5.0.0",
            FhirVersion::R6 => "6.0.0-ballot3",
        }
    }

    /// Get a short identifier for this version (e.g., "r4", "r4b")
    pub fn short_name(&self) -> &'static str {
        match self {
            FhirVersion::R2 => "r2",
            FhirVersion::R3 => "r3",
            FhirVersion::R4 => "r4",
            FhirVersion::R4B => "r4b",
            FhirVersion::R5 => "r5",
            FhirVersion::R6 => "r6",
        }
    }
}

impl std::str::FromStr for FhirVersion {
    type Err = FhirGenError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        FhirVersion::all()
            .iter()
            .copied()
            .find(|v| v.short_name() == normalized || v.package_version() == normalized)
            .ok_or_else(|| FhirGenError::configuration_error(format!("Unknown FHIR version: {s}")))
    }
}

/// Which part of the schema graph a run resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationSubset {
    /// Every node in the graph.
    #[default]
    Full,
    /// The named top-level types plus everything they structurally depend on.
    Selected(Vec<String>),
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub target: TargetKind,
    /// Suffix appended to every flattened backbone name.
    pub component_suffix: String,
    /// Upper bound for the collision-suffix search in a single scope.
    pub max_suffix_attempts: u32,
    /// Value sets never turned into enumerations, on top of the built-in list.
    pub excluded_value_sets: Vec<String>,
    /// Code systems whose members are named from the code instead of the display.
    pub code_named_systems: Vec<String>,
    /// Extra element paths where `Resource` becomes a generic parameter.
    pub generic_injection_points: Vec<String>,
    /// Replaces the built-in cross-version common subset when set.
    pub common_subset: Option<Vec<String>>,
    /// Extra backbone capitalization repairs, checked before the built-in table.
    pub capitalization_repairs: Vec<CapitalizationRepair>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            target: TargetKind::CSharp,
            component_suffix: "Component".to_string(),
            max_suffix_attempts: 1000,
            excluded_value_sets: Vec::new(),
            code_named_systems: Vec::new(),
            generic_injection_points: Vec::new(),
            common_subset: None,
            capitalization_repairs: Vec::new(),
        }
    }
}

impl ResolverConfig {
    pub fn for_target(target: TargetKind) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn with_component_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.component_suffix = suffix.into();
        self
    }

    pub fn with_max_suffix_attempts(mut self, attempts: u32) -> Self {
        self.max_suffix_attempts = attempts;
        self
    }

    pub fn exclude_value_set(mut self, url: impl Into<String>) -> Self {
        self.excluded_value_sets.push(url.into());
        self
    }

    pub fn with_code_named_system(mut self, system: impl Into<String>) -> Self {
        self.code_named_systems.push(system.into());
        self
    }

    pub fn with_generic_injection_point(mut self, path: impl Into<String>) -> Self {
        self.generic_injection_points.push(path.into());
        self
    }

    pub fn with_common_subset(mut self, types: Vec<String>) -> Self {
        self.common_subset = Some(types);
        self
    }

    pub fn with_capitalization_repair(mut self, repair: CapitalizationRepair) -> Self {
        self.capitalization_repairs.push(repair);
        self
    }

    /// The naming conventions and reserved words for the configured target.
    pub fn profile(&self) -> TargetProfile {
        TargetProfile::for_target(self.target)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ResolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.component_suffix.is_empty()
            || !self
                .component_suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(FhirGenError::configuration_error(format!(
                "component suffix must be a non-empty alphanumeric identifier, got '{}'",
                self.component_suffix
            )));
        }

        if self.max_suffix_attempts == 0 {
            return Err(FhirGenError::configuration_error(
                "max suffix attempts must be at least 1",
            ));
        }

        if self.generic_injection_points.iter().any(|p| p.trim().is_empty()) {
            return Err(FhirGenError::configuration_error(
                "generic injection points must be element paths",
            ));
        }

        if let Some(subset) = &self.common_subset {
            if subset.is_empty() {
                return Err(FhirGenError::configuration_error(
                    "common subset override must name at least one type",
                ));
            }
        }

        Ok(())
    }
}
