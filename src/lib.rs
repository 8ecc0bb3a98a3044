//! ccbridge - configurable attribute resolution for cc modules
//!
//! Converts per-architecture, per-OS and per-product-variable module
//! properties into selectable Bazel attributes, and exports toolchain
//! variables as a deterministic Starlark constants file.

pub mod config;
pub mod convert;

pub use ccbridge_attrs::{
    group_srcs_by_extension, AttrError, ConfigurationAxis, GroupLookup, GroupedSrcs, Label,
    LabelList, LabelListAttribute, SelectableAttribute, StringListAttribute,
};
pub use ccbridge_vars::{
    toolchain_vars, toolchain_vars_with_header, Expander, Registry, RegistryBuilder, VarsError,
    DEFAULT_HEADER,
};
pub use config::{ConfigError, EffectiveConfig};
pub use convert::{convert_module, ConversionInput, ConvertError, ModuleAttributes};
