//! Toolchain variables: registration, `${Name}` expansion and Starlark
//! export.
//!
//! ```
//! use ccbridge_vars::{toolchain_vars, RegistryBuilder};
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .export_string_list("CommonFlags", ["-Wall", "${ExtraFlags}"])
//!     .export_string_list("ExtraFlags", ["-Werror"]);
//! let registry = builder.freeze().unwrap();
//!
//! let text = toolchain_vars(&registry).unwrap();
//! assert!(text.contains("CommonFlags = _CommonFlags,"));
//! ```

mod emit;
mod error;
mod expand;
mod registry;

pub use emit::{
    collect_constants, string_constants, string_list_constants, string_list_dict_constants,
    toolchain_vars, toolchain_vars_with_header, validate_characters, BazelConstant,
    DEFAULT_HEADER,
};
pub use error::VarsError;
pub use expand::Expander;
pub use registry::{Registry, RegistryBuilder, StringListDict};
