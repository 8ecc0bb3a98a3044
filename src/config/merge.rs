//! Layer merge for toolchain configs
//!
//! - Tables: merged by key, so a later layer can add or override single
//!   variables without restating the rest
//! - Lists: replaced wholesale (a list variable is one value)
//! - Scalars: later layer wins
//! - Variable names: a name lives in one variable table. When a later layer
//!   defines it in another table, the earlier definition is dropped.

use serde_json::Value;

/// Tables holding toolchain variables, keyed by variable name.
pub const VARIABLE_TABLES: &[&str] = &["strings", "string_lists", "string_list_dicts"];

/// Merge `overlay` onto `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Merge one config layer onto the layers below it.
pub fn merge_layer(base: Value, overlay: Value) -> Value {
    deep_merge(drop_redefined(base, &overlay), overlay)
}

/// Remove variables from `base` that `overlay` defines in a different table.
fn drop_redefined(mut base: Value, overlay: &Value) -> Value {
    for table in VARIABLE_TABLES {
        let Some(names) = overlay.get(*table).and_then(Value::as_object) else {
            continue;
        };
        for other in VARIABLE_TABLES.iter().filter(|other| *other != table) {
            let Some(existing) = base.get_mut(*other).and_then(Value::as_object_mut) else {
                continue;
            };
            for name in names.keys() {
                if existing.remove(name).is_some() {
                    tracing::debug!(name = %name, from = %other, to = %table, "variable changed table");
                }
            }
        }
    }
    base
}

/// Merge layers in precedence order (first is base, last wins).
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, merge_layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_variable_override() {
        let base = json!({"strings": {"ClangVersion": "r416183b"}});
        let overlay = json!({"strings": {"ClangVersion": "r450784"}});
        let result = deep_merge(base, overlay);
        assert_eq!(result["strings"]["ClangVersion"], "r450784");
    }

    #[test]
    fn test_tables_merge_by_key() {
        let base = json!({
            "strings": {"ClangVersion": "r416183b", "ArmArch": "armv7-a"}
        });
        let overlay = json!({
            "strings": {"ArmArch": "armv8-a"},
            "string_lists": {"CommonGlobalCflags": ["-Wall"]}
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["strings"]["ClangVersion"], "r416183b");
        assert_eq!(result["strings"]["ArmArch"], "armv8-a");
        assert_eq!(result["string_lists"]["CommonGlobalCflags"][0], "-Wall");
    }

    #[test]
    fn test_list_variable_replaced() {
        let base = json!({"string_lists": {"Cflags": ["-O2", "-g", "-Wall"]}});
        let overlay = json!({"string_lists": {"Cflags": ["-O3"]}});
        let result = deep_merge(base, overlay);

        let flags = result["string_lists"]["Cflags"].as_array().unwrap();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0], "-O3");
    }

    #[test]
    fn test_dict_entries_merge() {
        let base = json!({
            "string_list_dicts": {"ArchVariantCflags": {"armv7-a": ["-march=armv7-a"]}}
        });
        let overlay = json!({
            "string_list_dicts": {"ArchVariantCflags": {"armv8-a": ["-march=armv8-a"]}}
        });
        let result = deep_merge(base, overlay);
        let dict = &result["string_list_dicts"]["ArchVariantCflags"];

        assert_eq!(dict["armv7-a"][0], "-march=armv7-a");
        assert_eq!(dict["armv8-a"][0], "-march=armv8-a");
    }

    #[test]
    fn test_later_layer_moves_variable_between_tables() {
        let host = json!({
            "strings": {"Cflags": "-O2", "Keep": "yes"},
            "string_lists": {"Other": ["-g"]}
        });
        let repo = json!({"string_lists": {"Cflags": ["-O2", "-g"]}});

        let result = merge_layer(host, repo);

        assert!(result["strings"].get("Cflags").is_none());
        assert_eq!(result["strings"]["Keep"], "yes");
        assert_eq!(result["string_lists"]["Cflags"], json!(["-O2", "-g"]));
        assert_eq!(result["string_lists"]["Other"], json!(["-g"]));
    }

    #[test]
    fn test_same_layer_duplicates_are_kept() {
        let layer = json!({
            "strings": {"Dup": "a"},
            "string_lists": {"Dup": ["b"]}
        });

        let result = merge_layers(vec![json!({}), layer]);

        assert_eq!(result["strings"]["Dup"], "a");
        assert_eq!(result["string_lists"]["Dup"], json!(["b"]));
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({"output": {"header": "# builtin"}, "strings": {}});
        let host = json!({"strings": {"A": "host"}});
        let repo = json!({"strings": {"A": "repo", "B": "repo"}});
        let cli = json!({"strings": {"B": "cli"}});

        let result = merge_layers(vec![builtin, host, repo, cli]);

        assert_eq!(result["output"]["header"], "# builtin");
        assert_eq!(result["strings"]["A"], "repo");
        assert_eq!(result["strings"]["B"], "cli");
    }
}
