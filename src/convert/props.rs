//! Module property model
//!
//! A module is described by property structs, each recorded per
//! (axis, config), plus product-variable properties. Input is JSON:
//!
//! ```json
//! {
//!   "name": "libfoo",
//!   "dir": "external/foo",
//!   "variants": [
//!     {"axis": "arch", "config": "arm",
//!      "properties": {"kind": "compiler", "srcs": ["arm.S"]}}
//!   ],
//!   "product_variables": [
//!     {"variable": "platform_sdk_version", "full_config": "platform_sdk_version",
//!      "property": "cflags", "values": ["-DSDK=%d"]}
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ccbridge_attrs::ConfigurationAxis;

use super::ConvertError;

/// Compiler properties of a cc module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseCompilerProperties {
    pub srcs: Vec<String>,
    pub exclude_srcs: Vec<String>,
    pub cflags: Vec<String>,
    pub cppflags: Vec<String>,
    pub conlyflags: Vec<String>,
    pub asflags: Vec<String>,
    /// Root-relative include directories.
    pub include_dirs: Vec<String>,
    /// Module-relative include directories.
    pub local_include_dirs: Vec<String>,
    pub include_build_directory: Option<bool>,
    pub generated_headers: Vec<String>,
    pub generated_sources: Vec<String>,
    pub rtti: Option<bool>,
}

/// Linker properties of a cc module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseLinkerProperties {
    pub static_libs: Vec<String>,
    pub whole_static_libs: Vec<String>,
    pub shared_libs: Vec<String>,
    pub header_libs: Vec<String>,
    pub export_header_lib_headers: Vec<String>,
    pub exclude_static_libs: Vec<String>,
    pub exclude_shared_libs: Vec<String>,
    /// `None` means "use the platform default", `Some([])` means "none".
    pub system_shared_libs: Option<Vec<String>>,
    pub ldflags: Vec<String>,
    pub pack_relocations: Option<bool>,
    pub version_script: Option<String>,
    pub no_libcrt: Option<bool>,
}

impl BaseLinkerProperties {
    /// Whether the compiler runtime library is linked.
    pub fn use_libcrt(&self) -> bool {
        !self.no_libcrt.unwrap_or(false)
    }
}

/// Properties that apply to only the static or only the shared variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticOrSharedProperties {
    pub srcs: Vec<String>,
    pub cflags: Vec<String>,
    pub static_libs: Vec<String>,
    pub shared_libs: Vec<String>,
    pub whole_static_libs: Vec<String>,
    pub system_shared_libs: Option<Vec<String>>,
}

/// Symbol stripping properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripProperties {
    pub keep_symbols: Option<bool>,
    pub keep_symbols_and_debug_frame: Option<bool>,
    pub keep_symbols_list: Vec<String>,
    pub all: Option<bool>,
    pub none: Option<bool>,
}

/// Include directories exported to dependents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagExporterProperties {
    pub export_include_dirs: Vec<String>,
    pub export_system_include_dirs: Vec<String>,
}

impl FlagExporterProperties {
    /// System include dirs followed by regular ones.
    pub fn include_dirs(&self) -> Vec<String> {
        let mut dirs = self.export_system_include_dirs.clone();
        dirs.extend(self.export_include_dirs.iter().cloned());
        dirs
    }
}

/// Prebuilt library sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrebuiltLinkerProperties {
    pub srcs: Vec<String>,
}

/// One property struct recorded for an (axis, config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArchVariantProperties {
    Compiler(BaseCompilerProperties),
    Linker(BaseLinkerProperties),
    Static(StaticOrSharedProperties),
    Shared(StaticOrSharedProperties),
    Strip(StripProperties),
    FlagExporter(FlagExporterProperties),
    PrebuiltLinker(PrebuiltLinkerProperties),
}

/// Axis as written in module input. Product variables have their own list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    #[default]
    NoConfig,
    Arch,
    Os,
}

impl AxisKind {
    pub fn axis(self) -> ConfigurationAxis {
        match self {
            Self::NoConfig => ConfigurationAxis::NoConfig,
            Self::Arch => ConfigurationAxis::Arch,
            Self::Os => ConfigurationAxis::Os,
        }
    }
}

/// Properties recorded for one (axis, config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantEntry {
    #[serde(default)]
    pub axis: AxisKind,
    #[serde(default)]
    pub config: String,
    pub properties: ArchVariantProperties,
}

/// A list property set under a product-configuration switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariableProperty {
    /// The switch name, used for `%s`/`%d` substitution.
    pub variable: String,
    /// The full config name, used as both axis and config key.
    pub full_config: String,
    /// Property name, e.g. `cflags` or `static_libs`.
    pub property: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Product-variable properties by property name, then full config.
pub type ProductVariableProperties<'a> =
    BTreeMap<&'a str, BTreeMap<&'a str, &'a ProductVariableProperty>>;

/// All properties of one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleProperties {
    pub name: String,
    /// Module directory relative to the source root.
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub variants: Vec<VariantEntry>,
    #[serde(default)]
    pub product_variables: Vec<ProductVariableProperty>,
}

impl ModuleProperties {
    /// Reject configs that are not meaningful on their axis.
    pub fn validate(&self) -> Result<(), ConvertError> {
        for entry in &self.variants {
            entry.axis.axis().validate_config(&entry.config)?;
        }
        Ok(())
    }

    /// Entries whose properties `pick` accepts, as (axis, config, props).
    pub fn arch_variant_properties<'a, T: 'a>(
        &'a self,
        pick: impl Fn(&'a ArchVariantProperties) -> Option<&'a T> + 'a,
    ) -> impl Iterator<Item = (ConfigurationAxis, &'a str, &'a T)> + 'a {
        self.variants.iter().filter_map(move |entry| {
            pick(&entry.properties).map(|props| (entry.axis.axis(), entry.config.as_str(), props))
        })
    }

    /// Properties of kind `pick` on the no-config axis, if recorded.
    pub fn base_properties<'a, T: 'a>(
        &'a self,
        pick: impl Fn(&'a ArchVariantProperties) -> Option<&'a T> + 'a,
    ) -> Option<&'a T> {
        self.arch_variant_properties(pick)
            .find(|(axis, _, _)| *axis == ConfigurationAxis::NoConfig)
            .map(|(_, _, props)| props)
    }

    /// Product-variable properties grouped by property name and config.
    /// A later entry for the same pair replaces an earlier one.
    pub fn product_variable_properties(&self) -> ProductVariableProperties<'_> {
        let mut out: ProductVariableProperties<'_> = BTreeMap::new();
        for prop in &self.product_variables {
            out.entry(prop.property.as_str())
                .or_default()
                .insert(prop.full_config.as_str(), prop);
        }
        out
    }
}

impl ArchVariantProperties {
    pub fn compiler(&self) -> Option<&BaseCompilerProperties> {
        match self {
            Self::Compiler(props) => Some(props),
            _ => None,
        }
    }

    pub fn linker(&self) -> Option<&BaseLinkerProperties> {
        match self {
            Self::Linker(props) => Some(props),
            _ => None,
        }
    }

    pub fn static_props(&self) -> Option<&StaticOrSharedProperties> {
        match self {
            Self::Static(props) => Some(props),
            _ => None,
        }
    }

    pub fn shared_props(&self) -> Option<&StaticOrSharedProperties> {
        match self {
            Self::Shared(props) => Some(props),
            _ => None,
        }
    }

    pub fn strip(&self) -> Option<&StripProperties> {
        match self {
            Self::Strip(props) => Some(props),
            _ => None,
        }
    }

    pub fn flag_exporter(&self) -> Option<&FlagExporterProperties> {
        match self {
            Self::FlagExporter(props) => Some(props),
            _ => None,
        }
    }

    pub fn prebuilt_linker(&self) -> Option<&PrebuiltLinkerProperties> {
        match self {
            Self::PrebuiltLinker(props) => Some(props),
            _ => None,
        }
    }
}
