use serde::{Deserialize, Serialize};

/// A tag applied to nodes matching a hardware definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDefinition {
    pub tag: String,
    #[serde(rename = "type")]
    pub definition_type: String,
    pub definition: String,
}

/// Top-level namespace for a design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    #[serde(default)]
    pub tag_definitions: Vec<TagDefinition>,
    #[serde(default)]
    pub authorized_keys: Vec<String>,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag_definitions: Vec::new(),
            authorized_keys: Vec::new(),
        }
    }
}
