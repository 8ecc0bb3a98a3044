//! Selectable per-axis attribute values for cc modules.
//!
//! Property values that vary by architecture, OS or product variable are
//! collected into [`SelectableAttribute`]s, which can be merged, filtered,
//! excluded and finally split by source language.

mod attribute;
mod axis;
mod error;
mod label;
mod srcs;

pub use attribute::{
    AttributeValue, BoolAttribute, LabelAttribute, LabelListAttribute, ListValue,
    SelectableAttribute, StringListAttribute,
};
pub use axis::{
    ConfigurationAxis, CONDITIONS_DEFAULT, CONDITIONS_DEFAULT_SELECT_KEY, KNOWN_ARCHES,
    KNOWN_OSES,
};
pub use error::AttrError;
pub use label::{first_unique, subtract, Label, LabelList};
pub use srcs::{
    group_srcs_by_extension, is_asm_src_or_group, is_c_src_or_group, GroupLookup, GroupedSrcs,
    NoGroups, AS_SRCS_SUFFIX, CPP_SRCS_SUFFIX, C_SRCS_SUFFIX,
};
