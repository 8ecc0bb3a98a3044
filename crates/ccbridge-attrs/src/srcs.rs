//! Source grouping by language.
//!
//! Splits a label list into C, assembler and catch-all sources. The
//! catch-all group also takes generated sources, since their language is
//! unknown until they are built.

use crate::attribute::LabelListAttribute;
use crate::error::AttrError;

/// Suffix of the C view of a file group.
pub const C_SRCS_SUFFIX: &str = "_c_srcs";

/// Suffix of the assembler view of a file group.
pub const AS_SRCS_SUFFIX: &str = "_as_srcs";

/// Suffix of the catch-all view of a file group.
pub const CPP_SRCS_SUFFIX: &str = "_cpp_srcs";

/// Looks up externally registered file groups by module name.
pub trait GroupLookup {
    /// True when `name` is a file group module.
    fn is_file_group(&self, name: &str) -> bool;
}

impl GroupLookup for std::collections::BTreeSet<String> {
    fn is_file_group(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// A lookup that knows no file groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGroups;

impl GroupLookup for NoGroups {
    fn is_file_group(&self, _name: &str) -> bool {
        false
    }
}

/// Sources split by language.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct GroupedSrcs {
    /// Everything not recognized as C or assembler.
    pub srcs: LabelListAttribute,
    /// C sources.
    pub c_srcs: LabelListAttribute,
    /// Assembler sources.
    pub as_srcs: LabelListAttribute,
}

/// True for C sources and C views of file groups.
pub fn is_c_src_or_group(s: &str) -> bool {
    s.ends_with(".c") || s.ends_with(C_SRCS_SUFFIX)
}

/// True for assembler sources and assembler views of file groups.
pub fn is_asm_src_or_group(s: &str) -> bool {
    s.ends_with(".S") || s.ends_with(".s") || s.ends_with(AS_SRCS_SUFFIX)
}

/// Check whether `label` names a file group known to `lookup`.
///
/// Accepts `name`, `:name` and `//pkg:name`. A label whose last segment
/// names a file group but carries more than one `:` is rejected.
fn names_file_group(label: &str, lookup: &impl GroupLookup) -> Result<bool, AttrError> {
    let name = label.rsplit(':').next().unwrap_or(label);
    if name.is_empty() || !lookup.is_file_group(name) {
        return Ok(false);
    }
    if label.matches(':').count() > 1 {
        return Err(AttrError::InvalidGroupLabel(label.to_string()));
    }
    Ok(true)
}

/// Collect every label in `srcs` that references a file group.
fn file_group_labels(
    srcs: &LabelListAttribute,
    lookup: &impl GroupLookup,
) -> Result<Vec<String>, AttrError> {
    let mut labels = srcs.value().labels();
    for axis in srcs.sorted_configuration_axes() {
        if let Some(configs) = srcs.configurable_values(axis) {
            for list in configs.values() {
                labels.extend(list.labels());
            }
        }
    }

    let mut groups: Vec<String> = Vec::new();
    for label in labels {
        if names_file_group(label, lookup)? && !groups.iter().any(|g| g == label) {
            groups.push(label.to_string());
        }
    }
    Ok(groups)
}

/// Rewrite file group references to the view named by `suffix`.
fn group_view<'a>(groups: &'a [String], suffix: &'static str) -> impl Fn(&str) -> String + 'a {
    move |label: &str| {
        if groups.iter().any(|g| g == label) {
            format!("{}{}", label, suffix)
        } else {
            label.to_string()
        }
    }
}

/// Split `srcs` into catch-all, C and assembler groups.
///
/// File group references are rewritten to their language-specific views
/// (`<label>_c_srcs`, `<label>_as_srcs`, `<label>_cpp_srcs`). For each
/// (axis, config) the three results are disjoint.
pub fn group_srcs_by_extension(
    srcs: &LabelListAttribute,
    lookup: &impl GroupLookup,
) -> Result<GroupedSrcs, AttrError> {
    let groups = file_group_labels(srcs, lookup)?;
    if !groups.is_empty() {
        tracing::debug!(groups = ?groups, "rewriting file group references");
    }

    let c_srcs = srcs
        .map(group_view(&groups, C_SRCS_SUFFIX))
        .filter(is_c_src_or_group);
    let as_srcs = srcs
        .map(group_view(&groups, AS_SRCS_SUFFIX))
        .filter(is_asm_src_or_group);
    let cpp_srcs = srcs
        .map(group_view(&groups, CPP_SRCS_SUFFIX))
        .subtract(&c_srcs)
        .subtract(&as_srcs);

    Ok(GroupedSrcs {
        srcs: cpp_srcs,
        c_srcs,
        as_srcs,
    })
}
