//! Module property conversion
//!
//! Turns a cc module's per-axis properties into selectable Bazel
//! attributes: compiler flags and sources, linker deps and options,
//! static/shared variant attributes, prebuilt sources and exported
//! includes.

mod compiler;
mod context;
mod library;
mod linker;
mod paths;
mod product_variables;
mod props;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use ccbridge_attrs::{AttrError, SelectableAttribute, StringListAttribute};

pub use compiler::{convert_compiler_props, CompilerAttributes};
pub use context::{
    label_for_dep, label_for_src, label_list_for_deps, label_list_for_srcs, ConversionContext,
    SimpleContext,
};
pub use library::{
    convert_exported_includes, convert_prebuilt_library_props, convert_static_or_shared_props,
    PrebuiltAttributes, StaticOrSharedAttributes,
};
pub use linker::{convert_linker_props, LinkerAttributes, NO_PACK_RELOCATIONS_FLAG};
pub use paths::{clean_path, join_path, make_paths_relative_to_module, relative_path};
pub use product_variables::{try_variable_substitution, try_variable_substitutions};
pub use props::{
    ArchVariantProperties, AxisKind, BaseCompilerProperties, BaseLinkerProperties,
    FlagExporterProperties, ModuleProperties, PrebuiltLinkerProperties, ProductVariableProperty,
    StaticOrSharedProperties, StripProperties, VariantEntry,
};

/// Conversion errors
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Attr(#[from] AttrError),

    #[error("expected at most one prebuilt source for {axis} {config}, got {count}")]
    TooManyPrebuiltSrcs {
        axis: String,
        config: String,
        count: usize,
    },

    #[error("cannot express {path} relative to {base}")]
    RelativePath { base: String, path: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A module plus what is known about the rest of the module graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionInput {
    pub module: ModuleProperties,

    /// Names of file group modules.
    #[serde(default)]
    pub file_groups: BTreeSet<String>,

    /// Known modules and their directories.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

impl ConversionInput {
    /// Context resolving labels from this module's directory.
    pub fn context(&self) -> SimpleContext {
        SimpleContext {
            module_dir: self.module.dir.clone(),
            file_groups: self.file_groups.clone(),
            modules: self.modules.clone(),
        }
    }
}

/// Every attribute derived from one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleAttributes {
    pub name: String,
    pub compiler: CompilerAttributes,
    pub linker: LinkerAttributes,
    #[serde(rename = "static")]
    pub static_attrs: StaticOrSharedAttributes,
    pub shared: StaticOrSharedAttributes,
    pub prebuilt: PrebuiltAttributes,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub export_includes: StringListAttribute,
}

impl ModuleAttributes {
    /// Canonical JSON (RFC 8785) bytes.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, ConvertError> {
        serde_json_canonicalizer::to_vec(self)
            .map_err(|e| ConvertError::Serialization(e.to_string()))
    }
}

/// Convert every property group of `input.module`.
pub fn convert_module(input: &ConversionInput) -> Result<ModuleAttributes, ConvertError> {
    let module = &input.module;
    module.validate()?;
    let ctx = input.context();

    tracing::info!(module = %module.name, dir = %module.dir, "converting module");
    Ok(ModuleAttributes {
        name: module.name.clone(),
        compiler: convert_compiler_props(&ctx, module)?,
        linker: convert_linker_props(&ctx, module)?,
        static_attrs: convert_static_or_shared_props(&ctx, module, true)?,
        shared: convert_static_or_shared_props(&ctx, module, false)?,
        prebuilt: convert_prebuilt_library_props(&ctx, module)?,
        export_includes: convert_exported_includes(module),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_module_serializes_selects() {
        let input: ConversionInput = serde_json::from_value(serde_json::json!({
            "module": {
                "name": "libfoo",
                "dir": "external/foo",
                "variants": [
                    {"properties": {"kind": "compiler", "srcs": ["a.c"],
                                    "include_build_directory": false}},
                    {"axis": "arch", "config": "arm",
                     "properties": {"kind": "compiler", "cflags": ["-marm"]}}
                ]
            }
        }))
        .unwrap();

        let attrs = convert_module(&input).unwrap();
        let json = serde_json::to_value(&attrs).unwrap();

        assert_eq!(json["name"], "libfoo");
        assert_eq!(json["compiler"]["c_srcs"]["value"]["includes"][0]["label"], "a.c");
        assert_eq!(
            json["compiler"]["copts"]["select"]["arch"]["//build/bazel/platforms/arch:arm"],
            serde_json::json!(["-marm"])
        );
        assert!(json["compiler"].get("srcs").is_none());
    }

    #[test]
    fn test_convert_module_rejects_unknown_os() {
        let input: ConversionInput = serde_json::from_value(serde_json::json!({
            "module": {
                "name": "m",
                "variants": [{"axis": "os", "config": "plan9",
                              "properties": {"kind": "compiler"}}]
            }
        }))
        .unwrap();

        assert!(matches!(
            convert_module(&input),
            Err(ConvertError::Attr(AttrError::UnknownConfig { .. }))
        ));
    }

    #[test]
    fn test_canonical_json_is_stable() {
        let input = ConversionInput {
            module: ModuleProperties {
                name: "m".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let first = convert_module(&input).unwrap().to_canonical_json().unwrap();
        let second = convert_module(&input).unwrap().to_canonical_json().unwrap();
        assert_eq!(first, second);
    }
}
