//! Built-in defaults (layer 1)
//!
//! The base layer every toolchain config is merged onto.

use serde::{Deserialize, Serialize};

use ccbridge_vars::DEFAULT_HEADER;

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// First line of the generated Starlark file
    pub header: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging. Variable tables start empty.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "output": {
                "header": self.header
            },
            "strings": {},
            "string_lists": {},
            "string_list_dicts": {}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::default();
        assert_eq!(defaults.header, "# GENERATED BY ccbridge. DO NOT EDIT.");
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::default().to_value();

        assert_eq!(value["output"]["header"], DEFAULT_HEADER);
        assert!(value["strings"].as_object().unwrap().is_empty());
        assert!(value["string_lists"].as_object().unwrap().is_empty());
        assert!(value["string_list_dicts"].as_object().unwrap().is_empty());
    }
}
