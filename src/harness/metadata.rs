use serde::{Deserialize, Serialize};

/// The YAML frontmatter of a test file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, alias = "es6id", alias = "es5id")]
    pub esid: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Engine features the test depends on, in declaration order.
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub negative: Option<Negative>,
}

/// Declares that the test is expected to throw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Negative {
    pub phase: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

impl Metadata {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().map(str::trim).unwrap_or("")
    }
}
