use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSetCode {
    pub system: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl ValueSetCode {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// An expanded value set: the codes a required binding may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub codes: Vec<ValueSetCode>,
}

impl ValueSet {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            codes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: ValueSetCode) -> Self {
        self.codes.push(code);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
