//! Labels and label lists.

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeValue, ListValue};

/// A reference to a target or source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    /// The label text as it should be emitted.
    pub label: String,

    /// Name of the module the label was derived from, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub original_module_name: String,
}

impl Label {
    /// A label with no originating module.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original_module_name: String::new(),
        }
    }

    /// A label that was resolved from a module name.
    pub fn for_module(label: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original_module_name: module.into(),
        }
    }
}

/// An includes list paired with the labels to exclude from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelList {
    #[serde(default)]
    pub includes: Vec<Label>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<Label>,
}

impl LabelList {
    /// A list with only includes.
    pub fn new(includes: Vec<Label>) -> Self {
        Self {
            includes,
            excludes: Vec::new(),
        }
    }

    /// A list with includes and excludes.
    pub fn with_excludes(includes: Vec<Label>, excludes: Vec<Label>) -> Self {
        Self { includes, excludes }
    }

    /// Convenience constructor from plain label strings.
    pub fn from_strs<S: AsRef<str>>(includes: &[S]) -> Self {
        Self::new(includes.iter().map(|s| Label::new(s.as_ref())).collect())
    }

    /// The emitted label strings, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.includes.iter().map(|l| l.label.as_str()).collect()
    }

    /// `includes - excludes`, keeping the first occurrence of each label.
    pub fn resolved(&self) -> LabelList {
        let unique = first_unique(&self.includes);
        LabelList::new(subtract(&unique, &self.excludes))
    }
}

impl AttributeValue for LabelList {
    fn is_unset(&self) -> bool {
        self.includes.is_empty()
    }
}

impl ListValue for LabelList {
    fn append(&mut self, other: &Self) {
        self.includes.extend(other.includes.iter().cloned());
        self.excludes.extend(other.excludes.iter().cloned());
    }

    fn subtract(&self, other: &Self) -> Self {
        LabelList::new(subtract(&self.includes, &other.includes))
    }

    fn map_items<F: Fn(&str) -> String>(&self, f: F) -> Self {
        let includes = self
            .includes
            .iter()
            .map(|l| Label {
                label: f(&l.label),
                original_module_name: l.original_module_name.clone(),
            })
            .collect();
        LabelList {
            includes,
            excludes: self.excludes.clone(),
        }
    }

    fn filter_items<P: Fn(&str) -> bool>(&self, pred: P) -> Self {
        LabelList {
            includes: self
                .includes
                .iter()
                .filter(|l| pred(&l.label))
                .cloned()
                .collect(),
            excludes: self.excludes.clone(),
        }
    }
}

/// Remove every element of `needle` from `haystack`, preserving order.
pub fn subtract<T: PartialEq + Clone>(haystack: &[T], needle: &[T]) -> Vec<T> {
    haystack
        .iter()
        .filter(|item| !needle.contains(item))
        .cloned()
        .collect()
}

/// Drop repeated elements, keeping the first occurrence.
pub fn first_unique<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_preserves_order() {
        let list = LabelList::with_excludes(
            vec![Label::new("a"), Label::new("b"), Label::new("c")],
            vec![Label::new("b")],
        );
        assert_eq!(list.resolved().labels(), vec!["a", "c"]);
    }

    #[test]
    fn test_resolved_collapses_duplicates() {
        let list = LabelList::from_strs(&["b", "a", "b", "c", "a"]);
        assert_eq!(list.resolved().labels(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_resolved_excludes_only() {
        let list = LabelList::with_excludes(vec![], vec![Label::new("x")]);
        let resolved = list.resolved();
        assert!(resolved.includes.is_empty());
        assert!(resolved.excludes.is_empty());
    }

    #[test]
    fn test_subtract_compares_whole_label() {
        let haystack = vec![Label::for_module(":fg", "fg"), Label::new(":fg")];
        let needle = vec![Label::new(":fg")];
        assert_eq!(subtract(&haystack, &needle), vec![Label::for_module(":fg", "fg")]);
    }

    #[test]
    fn test_map_keeps_module_name() {
        let list = LabelList::new(vec![Label::for_module(":fg", "fg")]);
        let mapped = list.map_items(|s| format!("{}_c_srcs", s));
        assert_eq!(mapped.includes[0].label, ":fg_c_srcs");
        assert_eq!(mapped.includes[0].original_module_name, "fg");
    }
}
