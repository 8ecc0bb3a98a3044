//! Starlark export of toolchain variables.
//!
//! Every registered variable becomes a private `_<name>` definition and a
//! field of a public `constants` struct. Output is sorted by name, so the
//! same registry always yields the same bytes.

use crate::error::VarsError;
use crate::expand::Expander;
use crate::registry::{Registry, StringListDict};

/// First line of generated files.
pub const DEFAULT_HEADER: &str = "# GENERATED BY ccbridge. DO NOT EDIT.";

const INDENT_WIDTH: usize = 4;

/// Characters that cannot appear in an emitted string.
const ILLEGAL_CHARACTERS: &[char] = &['\n', '"', '\\'];

/// A resolved name and its Starlark definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BazelConstant {
    pub name: String,
    pub definition: String,
}

/// Reject `s` if it contains a character that would need escaping.
pub fn validate_characters(s: &str) -> Result<&str, VarsError> {
    match s.chars().find(|c| ILLEGAL_CHARACTERS.contains(c)) {
        Some(character) => Err(VarsError::IllegalCharacter {
            value: s.to_string(),
            character,
        }),
        None => Ok(s),
    }
}

fn indentation(level: usize) -> String {
    " ".repeat(level * INDENT_WIDTH)
}

fn print_list(items: &[String], level: usize) -> Result<String, VarsError> {
    let inner = indentation(level + 1);
    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push("[".to_string());
    for item in items {
        lines.push(format!("{}\"{}\",", inner, validate_characters(item)?));
    }
    lines.push(format!("{}]", indentation(level)));
    Ok(lines.join("\n"))
}

fn print_string_list_dict(dict: &StringListDict) -> Result<String, VarsError> {
    let mut lines = Vec::with_capacity(dict.len() + 2);
    lines.push("{".to_string());
    for (key, items) in dict {
        lines.push(format!(
            "{}\"{}\": {},",
            indentation(1),
            validate_characters(key)?,
            print_list(items, 1)?
        ));
    }
    lines.push("}".to_string());
    Ok(lines.join("\n"))
}

/// String variables, each expanded to a single quoted value.
pub fn string_constants(expander: &Expander<'_>) -> Result<Vec<BazelConstant>, VarsError> {
    let mut out = Vec::new();
    for name in expander.registry().strings().keys() {
        let value = expander.expand_string(name)?;
        out.push(BazelConstant {
            name: name.clone(),
            definition: format!("\"{}\"", validate_characters(&value)?),
        });
    }
    Ok(out)
}

/// String list variables, each element expanded and concatenated.
pub fn string_list_constants(expander: &Expander<'_>) -> Result<Vec<BazelConstant>, VarsError> {
    let mut out = Vec::new();
    for name in expander.registry().string_lists().keys() {
        let expanded = expander.expand_string_list(name)?;
        out.push(BazelConstant {
            name: name.clone(),
            definition: print_list(&expanded, 0)?,
        });
    }
    Ok(out)
}

/// Dictionary variables, exported verbatim. Placeholders inside
/// dictionaries are not expanded.
pub fn string_list_dict_constants(registry: &Registry) -> Result<Vec<BazelConstant>, VarsError> {
    registry
        .string_list_dicts()
        .iter()
        .map(|(name, dict)| -> Result<BazelConstant, VarsError> {
            Ok(BazelConstant {
                name: name.clone(),
                definition: print_string_list_dict(dict)?,
            })
        })
        .collect()
}

/// All constants of `registry`, sorted by name.
pub fn collect_constants(registry: &Registry) -> Result<Vec<BazelConstant>, VarsError> {
    let expander = Expander::new(registry);
    let mut constants = string_list_dict_constants(registry)?;
    constants.extend(string_list_constants(&expander)?);
    constants.extend(string_constants(&expander)?);

    constants.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(dup) = constants.windows(2).find(|w| w[0].name == w[1].name) {
        return Err(VarsError::DuplicateConstant(dup[0].name.clone()));
    }
    Ok(constants)
}

/// Render `registry` as a Starlark file headed by [`DEFAULT_HEADER`].
pub fn toolchain_vars(registry: &Registry) -> Result<String, VarsError> {
    toolchain_vars_with_header(registry, DEFAULT_HEADER)
}

/// Render `registry` as a Starlark file headed by `header`.
pub fn toolchain_vars_with_header(registry: &Registry, header: &str) -> Result<String, VarsError> {
    let constants = collect_constants(registry)?;

    let definitions: Vec<String> = constants
        .iter()
        .map(|c| format!("_{} = {}", c.name, c.definition))
        .collect();
    let fields: Vec<String> = constants
        .iter()
        .map(|c| format!("{}{} = _{},", indentation(1), c.name, c.name))
        .collect();

    let mut out = String::new();
    out.push_str(header);
    out.push_str("\n\n");
    out.push_str(&definitions.join("\n\n"));
    out.push_str("\n\nconstants = struct(\n");
    out.push_str(&fields.join("\n"));
    out.push_str("\n)");

    tracing::debug!(constants = constants.len(), bytes = out.len(), "rendered toolchain vars");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;

    #[test]
    fn test_full_output() {
        let mut dict = StringListDict::new();
        dict.insert("arm".to_string(), vec!["-march=armv7-a".to_string()]);
        dict.insert("arm64".to_string(), vec![]);

        let mut builder = RegistryBuilder::new();
        builder
            .export_string("Ver", "${Major}")
            .export_string("Major", "12")
            .export_string_list("Cflags", ["-Wall", "${Extra}"])
            .export_string_list("Extra", ["-O2"])
            .export_string_list_dict("ArchFlags", dict);
        let registry = builder.freeze().unwrap();

        let expected = r#"# GENERATED BY ccbridge. DO NOT EDIT.

_ArchFlags = {
    "arm": [
        "-march=armv7-a",
    ],
    "arm64": [
    ],
}

_Cflags = [
    "-Wall",
    "-O2",
]

_Extra = [
    "-O2",
]

_Major = "12"

_Ver = "12"

constants = struct(
    ArchFlags = _ArchFlags,
    Cflags = _Cflags,
    Extra = _Extra,
    Major = _Major,
    Ver = _Ver,
)"#;
        assert_eq!(toolchain_vars(&registry).unwrap(), expected);
    }

    #[test]
    fn test_dicts_are_not_expanded() {
        let mut dict = StringListDict::new();
        dict.insert("k".to_string(), vec!["${Flags}".to_string()]);
        let mut builder = RegistryBuilder::new();
        builder
            .export_string_list("Flags", ["-x"])
            .export_string_list_dict("D", dict);
        let registry = builder.freeze().unwrap();

        let constants = string_list_dict_constants(&registry).unwrap();
        assert!(constants[0].definition.contains("\"${Flags}\""));
    }

    #[test]
    fn test_illegal_characters() {
        for bad in ["\"hi\"", "a\\b"] {
            let mut builder = RegistryBuilder::new();
            builder.export_string("S", bad);
            let registry = builder.freeze().unwrap();
            let err = toolchain_vars(&registry).unwrap_err();
            assert!(matches!(err, VarsError::IllegalCharacter { .. }), "{bad:?}");
        }
    }

    #[test]
    fn test_validate_characters() {
        assert_eq!(validate_characters("-O2"), Ok("-O2"));
        assert_eq!(
            validate_characters("line\nbreak"),
            Err(VarsError::IllegalCharacter {
                value: "line\nbreak".to_string(),
                character: '\n',
            })
        );
    }

    #[test]
    fn test_list_items_are_validated() {
        let mut builder = RegistryBuilder::new();
        builder.export_string_list("L", ["-DX=\"1\""]);
        let registry = builder.freeze().unwrap();
        assert!(matches!(
            toolchain_vars(&registry),
            Err(VarsError::IllegalCharacter { character: '"', .. })
        ));
    }

    #[test]
    fn test_duplicate_names_across_tables() {
        let mut builder = RegistryBuilder::new();
        builder
            .export_string("Same", "a")
            .export_string_list("Same", ["b"]);
        let registry = builder.freeze().unwrap();
        assert_eq!(
            toolchain_vars(&registry).unwrap_err(),
            VarsError::DuplicateConstant("Same".to_string())
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = RegistryBuilder::new().freeze().unwrap();
        assert_eq!(
            toolchain_vars_with_header(&registry, "# x").unwrap(),
            "# x\n\n\n\nconstants = struct(\n\n)"
        );
    }
}
