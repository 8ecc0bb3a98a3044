//! Source partition invariants
//!
//! For every (axis, config) the C, assembler and catch-all groups are
//! disjoint and together cover the input, modulo file group renaming.

use std::collections::BTreeSet;

use ccbridge::{group_srcs_by_extension, ConfigurationAxis, LabelList, LabelListAttribute};

fn groups(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Undo the language-view suffix a file group reference picked up.
fn base_label<'a>(label: &'a str, lookup: &BTreeSet<String>) -> &'a str {
    for suffix in ["_c_srcs", "_as_srcs", "_cpp_srcs"] {
        if let Some(stripped) = label.strip_suffix(suffix) {
            let name = stripped.rsplit(':').next().unwrap_or(stripped);
            if lookup.contains(name) {
                return stripped;
            }
        }
    }
    label
}

fn assert_partition(input: &LabelList, parts: [&LabelList; 3], lookup: &BTreeSet<String>) {
    let mut seen: Vec<&str> = Vec::new();
    for part in parts {
        for label in part.labels() {
            assert!(!seen.contains(&label), "{label} appears in two groups");
            seen.push(label);
        }
    }

    let covered: BTreeSet<&str> = seen.iter().map(|l| base_label(l, lookup)).collect();
    let expected: BTreeSet<&str> = input.labels().into_iter().collect();
    assert_eq!(covered, expected);
}

fn corpus() -> Vec<Vec<&'static str>> {
    vec![
        vec![],
        vec!["a.c"],
        vec!["a.c", "b.cpp", "c.S", "d.s", "e.cc"],
        vec![":lib_srcs", "x.c", "y.S"],
        vec![":gen_sources", "weird.C", "upper.CPP", "asm.sx"],
        vec!["//other/pkg:lib_srcs", "main.cpp"],
        vec!["already_c_srcs", "already_as_srcs", "plain"],
    ]
}

#[test]
fn test_default_bucket_partition() {
    let lookup = groups(&["lib_srcs"]);
    for srcs in corpus() {
        let input = LabelList::from_strs(&srcs);
        let attr = LabelListAttribute::new(input.clone());
        let grouped = group_srcs_by_extension(&attr, &lookup).unwrap();

        assert_partition(
            &input,
            [
                grouped.srcs.value(),
                grouped.c_srcs.value(),
                grouped.as_srcs.value(),
            ],
            &lookup,
        );
    }
}

#[test]
fn test_configured_bucket_partition() {
    let lookup = groups(&["lib_srcs"]);
    let axes = [
        (ConfigurationAxis::Arch, "arm64"),
        (ConfigurationAxis::Os, "android"),
        (ConfigurationAxis::product_variable("eng"), "eng"),
    ];

    for srcs in corpus() {
        let input = LabelList::from_strs(&srcs);
        let mut attr = LabelListAttribute::default();
        for (axis, config) in &axes {
            attr.set_select_value(axis.clone(), *config, input.clone());
        }
        let grouped = group_srcs_by_extension(&attr, &lookup).unwrap();

        for (axis, config) in &axes {
            let pick = |a: &LabelListAttribute| a.select_value(axis, config).cloned().unwrap();
            let (srcs, c_srcs, as_srcs) = (
                pick(&grouped.srcs),
                pick(&grouped.c_srcs),
                pick(&grouped.as_srcs),
            );
            assert_partition(&input, [&srcs, &c_srcs, &as_srcs], &lookup);
        }
    }
}

#[test]
fn test_file_group_views() {
    let lookup = groups(&["lib_srcs"]);
    let attr = LabelListAttribute::new(LabelList::from_strs(&[":lib_srcs"]));
    let grouped = group_srcs_by_extension(&attr, &lookup).unwrap();

    assert_eq!(grouped.c_srcs.value().labels(), vec![":lib_srcs_c_srcs"]);
    assert_eq!(grouped.as_srcs.value().labels(), vec![":lib_srcs_as_srcs"]);
    assert_eq!(grouped.srcs.value().labels(), vec![":lib_srcs_cpp_srcs"]);
}

#[test]
fn test_group_label_with_two_colons_is_rejected() {
    let attr = LabelListAttribute::new(LabelList::from_strs(&["//a:b:lib_srcs"]));
    assert!(group_srcs_by_extension(&attr, &groups(&["lib_srcs"])).is_err());

    let attr = LabelListAttribute::new(LabelList::from_strs(&["//a:b:other"]));
    assert!(group_srcs_by_extension(&attr, &groups(&["lib_srcs"])).is_ok());
}
