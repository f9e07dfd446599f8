// Element definitions of the input schema graph

use serde::{Deserialize, Serialize};

/// Type code that marks a coded primitive eligible for enumeration binding.
pub const CODE_TYPE: &str = "code";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaxCardinality {
    Bounded(u32),
    Unbounded,
}

impl MaxCardinality {
    /// Parse the schema notation: `*` or a non-negative integer.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "*" => Some(MaxCardinality::Unbounded),
            digits => digits.parse().ok().map(MaxCardinality::Bounded),
        }
    }
}

impl std::fmt::Display for MaxCardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaxCardinality::Bounded(n) => write!(f, "{n}"),
            MaxCardinality::Unbounded => write!(f, "*"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cardinality {
    pub min: u32,
    pub max: MaxCardinality,
}

impl Cardinality {
    pub fn new(min: u32, max: MaxCardinality) -> Self {
        Self { min, max }
    }

    pub fn optional() -> Self {
        Self::new(0, MaxCardinality::Bounded(1))
    }

    pub fn is_repeated(&self) -> bool {
        match self.max {
            MaxCardinality::Unbounded => true,
            MaxCardinality::Bounded(n) => n > 1,
        }
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    /// Profiles can remove an element by constraining max to 0.
    pub fn is_prohibited(&self) -> bool {
        self.max == MaxCardinality::Bounded(0)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::optional()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingStrength {
    Required,
    Extensible,
    Preferred,
    Example,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBinding {
    pub strength: BindingStrength,
    pub value_set: Option<String>,
}

impl ElementBinding {
    pub fn new(strength: BindingStrength, value_set: impl Into<String>) -> Self {
        Self {
            strength,
            value_set: Some(value_set.into()),
        }
    }
}

/// One candidate type of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTypeOption {
    pub code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_profiles: Vec<String>,
}

impl ElementTypeOption {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            target_profiles: Vec::new(),
        }
    }

    pub fn with_target_profile(mut self, profile: impl Into<String>) -> Self {
        self.target_profiles.push(profile.into());
        self
    }
}

/// One field of a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    pub path: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub types: Vec<ElementTypeOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementBinding>,
    /// Declared by a base type rather than the owner itself.
    #[serde(default)]
    pub inherited: bool,
    /// Field ordering key.
    #[serde(default)]
    pub order: u32,
    /// Path of a nested group this element reuses (`#Questionnaire.item`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,
}

impl ElementDefinition {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            cardinality: Cardinality::default(),
            types: Vec::new(),
            binding: None,
            inherited: false,
            order: 0,
            content_reference: None,
        }
    }

    pub fn with_type(mut self, code: impl Into<String>) -> Self {
        self.types.push(ElementTypeOption::new(code));
        self
    }

    pub fn with_type_option(mut self, option: ElementTypeOption) -> Self {
        self.types.push(option);
        self
    }

    /// Builder shorthand taking `max` in schema notation. An unparsable
    /// `max` keeps a single-valued bound of 1; callers holding untrusted
    /// input parse with [`MaxCardinality::parse`] and set `cardinality`.
    pub fn with_cardinality(mut self, min: u32, max: &str) -> Self {
        self.cardinality = Cardinality::new(
            min,
            MaxCardinality::parse(max).unwrap_or(MaxCardinality::Bounded(1)),
        );
        self
    }

    pub fn with_binding(mut self, strength: BindingStrength, value_set: impl Into<String>) -> Self {
        self.binding = Some(ElementBinding::new(strength, value_set));
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_content_reference(mut self, path: impl Into<String>) -> Self {
        self.content_reference = Some(path.into());
        self
    }

    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    /// Last path segment, choice marker included (`deceased[x]`).
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Last path segment without the choice marker (`deceased`).
    pub fn base_name(&self) -> &str {
        let name = self.name();
        name.strip_suffix("[x]").unwrap_or(name)
    }

    pub fn is_choice(&self) -> bool {
        self.types.len() > 1
    }

    pub fn is_binding_eligible(&self) -> bool {
        self.types.len() == 1 && self.types[0].code == CODE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_cardinality_parsing() {
        assert_eq!(MaxCardinality::parse("*"), Some(MaxCardinality::Unbounded));
        assert_eq!(MaxCardinality::parse("1"), Some(MaxCardinality::Bounded(1)));
        assert_eq!(MaxCardinality::parse("many"), None);
    }

    #[test]
    fn test_repetition() {
        assert!(Cardinality::new(0, MaxCardinality::Unbounded).is_repeated());
        assert!(Cardinality::new(1, MaxCardinality::Bounded(3)).is_repeated());
        assert!(!Cardinality::new(1, MaxCardinality::Bounded(1)).is_repeated());
        assert!(Cardinality::new(0, MaxCardinality::Bounded(0)).is_prohibited());
    }

    #[test]
    fn test_unparsable_max_is_single_valued() {
        let element = ElementDefinition::new("Patient.active").with_cardinality(1, "many");
        assert_eq!(element.cardinality, Cardinality::new(1, MaxCardinality::Bounded(1)));
        assert!(!element.cardinality.is_repeated());

        let element = ElementDefinition::new("Patient.name").with_cardinality(0, " * ");
        assert!(element.cardinality.is_repeated());
    }

    #[test]
    fn test_element_names() {
        let element = ElementDefinition::new("Patient.deceased[x]")
            .with_type("boolean")
            .with_type("dateTime");
        assert_eq!(element.name(), "deceased[x]");
        assert_eq!(element.base_name(), "deceased");
        assert!(element.is_choice());
    }

    #[test]
    fn test_binding_eligibility() {
        let coded = ElementDefinition::new("Patient.gender").with_type("code");
        let concept = ElementDefinition::new("Patient.maritalStatus").with_type("CodeableConcept");
        assert!(coded.is_binding_eligible());
        assert!(!concept.is_binding_eligible());
    }
}
