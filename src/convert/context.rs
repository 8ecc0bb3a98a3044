//! Label resolution for a module being converted

use std::collections::{BTreeMap, BTreeSet};

use ccbridge_attrs::{first_unique, GroupLookup, Label, LabelList};
use serde::{Deserialize, Serialize};

/// What the converter needs to know about the module graph.
pub trait ConversionContext: GroupLookup {
    /// Directory of the module being converted, relative to the source root.
    fn module_dir(&self) -> &str;

    /// Directory of another module, if it is known.
    fn other_module_dir(&self, name: &str) -> Option<&str>;

    /// Label of the module `name` as seen from the current module.
    fn module_label(&self, name: &str) -> String {
        match self.other_module_dir(name) {
            Some(dir) if dir != self.module_dir() => format!("//{}:{}", dir, name),
            _ => format!(":{}", name),
        }
    }
}

/// A context backed by in-memory tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleContext {
    pub module_dir: String,

    /// Names of file group modules.
    #[serde(default)]
    pub file_groups: BTreeSet<String>,

    /// Known modules and their directories.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

impl SimpleContext {
    pub fn new(module_dir: impl Into<String>) -> Self {
        Self {
            module_dir: module_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_file_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn with_module(mut self, name: impl Into<String>, dir: impl Into<String>) -> Self {
        self.modules.insert(name.into(), dir.into());
        self
    }
}

impl GroupLookup for SimpleContext {
    fn is_file_group(&self, name: &str) -> bool {
        self.file_groups.contains(name)
    }
}

impl ConversionContext for SimpleContext {
    fn module_dir(&self) -> &str {
        &self.module_dir
    }

    fn other_module_dir(&self, name: &str) -> Option<&str> {
        self.modules.get(name).map(String::as_str)
    }
}

/// Label for a source entry. `:name` references resolve to the module's
/// label; anything else is a module-relative path.
pub fn label_for_src(ctx: &impl ConversionContext, src: &str) -> Label {
    match src.strip_prefix(':') {
        Some(name) => Label::for_module(ctx.module_label(name), name),
        None => Label::new(src),
    }
}

/// Labels for `srcs` with `excludes` recorded for later resolution.
pub fn label_list_for_srcs(
    ctx: &impl ConversionContext,
    srcs: &[String],
    excludes: &[String],
) -> LabelList {
    LabelList::with_excludes(
        srcs.iter().map(|s| label_for_src(ctx, s)).collect(),
        excludes.iter().map(|s| label_for_src(ctx, s)).collect(),
    )
}

/// Label for a dependency on the module `name`.
pub fn label_for_dep(ctx: &impl ConversionContext, name: &str) -> Label {
    Label::for_module(ctx.module_label(name), name)
}

/// Labels for `deps` with `excludes` recorded for later resolution.
pub fn label_list_for_deps(
    ctx: &impl ConversionContext,
    deps: &[String],
    excludes: &[String],
) -> LabelList {
    LabelList::with_excludes(
        deps.iter().map(|d| label_for_dep(ctx, d)).collect(),
        excludes.iter().map(|d| label_for_dep(ctx, d)).collect(),
    )
}

/// Like [`label_list_for_deps`] but with repeated names collapsed first.
pub fn unique_label_list_for_deps(
    ctx: &impl ConversionContext,
    deps: &[String],
    excludes: &[String],
) -> LabelList {
    label_list_for_deps(ctx, &first_unique(deps), excludes)
}
