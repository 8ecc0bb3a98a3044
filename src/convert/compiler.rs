//! Compiler property conversion

use serde::Serialize;

use ccbridge_attrs::{
    group_srcs_by_extension, BoolAttribute, ConfigurationAxis, LabelList, LabelListAttribute,
    SelectableAttribute, StringListAttribute,
};

use super::context::{label_list_for_deps, label_list_for_srcs, ConversionContext};
use super::paths::{join_path, make_paths_relative_to_module};
use super::product_variables::try_variable_substitutions;
use super::props::{ArchVariantProperties, BaseCompilerProperties, ModuleProperties};
use super::ConvertError;

/// Compiler attributes of a converted module.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompilerAttributes {
    /// Options for all languages.
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub copts: StringListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub as_flags: StringListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub conly_flags: StringListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub cpp_flags: StringListAttribute,
    /// Catch-all (C++ and generated) sources.
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub srcs: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub c_srcs: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub as_srcs: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub rtti: BoolAttribute,
}

/// Split flags on spaces, so `-include foo.h` becomes two options.
pub(crate) fn parse_command_line_flags(flags: &[String]) -> Vec<String> {
    flags
        .iter()
        .flat_map(|flag| flag.split(' '))
        .map(str::to_string)
        .collect()
}

/// `-I` flags for `dir`, rooted at the module directory and at the bin dir.
fn include_flags(module_dir: &str, dir: &str) -> Vec<String> {
    let rooted = join_path(module_dir, dir);
    vec![format!("-I{}", rooted), format!("-I$(BINDIR)/{}", rooted)]
}

fn local_include_dirs(
    module_dir: &str,
    props: &BaseCompilerProperties,
) -> Result<Vec<String>, ConvertError> {
    let mut dirs = make_paths_relative_to_module(module_dir, &props.include_dirs)?;
    dirs.extend(props.local_include_dirs.iter().cloned());
    Ok(dirs)
}

/// Declared sources minus excludes, followed by generated headers and
/// sources as dependencies.
fn parse_srcs(ctx: &impl ConversionContext, props: &BaseCompilerProperties) -> LabelList {
    let mut generated = props.generated_headers.clone();
    generated.extend(props.generated_sources.iter().cloned());

    let mut srcs = label_list_for_srcs(ctx, &props.srcs, &props.exclude_srcs);
    srcs.includes.extend(label_list_for_deps(ctx, &generated, &[]).includes);
    srcs
}

/// Convert compiler properties into per-axis attributes.
pub fn convert_compiler_props(
    ctx: &impl ConversionContext,
    module: &ModuleProperties,
) -> Result<CompilerAttributes, ConvertError> {
    let module_dir = ctx.module_dir();
    let mut attrs = CompilerAttributes::default();
    let mut srcs = LabelListAttribute::default();

    for (axis, config, props) in module.arch_variant_properties(ArchVariantProperties::compiler) {
        if !props.srcs.is_empty() || !props.exclude_srcs.is_empty() {
            srcs.set_select_value(axis.clone(), config, parse_srcs(ctx, props));
        }

        let mut copts = parse_command_line_flags(&props.cflags);
        let mut as_flags = parse_command_line_flags(&props.asflags);
        for dir in local_include_dirs(module_dir, props)? {
            copts.extend(include_flags(module_dir, &dir));
            as_flags.extend(include_flags(module_dir, &dir));
        }
        if axis == ConfigurationAxis::NoConfig && props.include_build_directory.unwrap_or(true) {
            copts.extend(include_flags(module_dir, "."));
            as_flags.extend(include_flags(module_dir, "."));
        }

        attrs.copts.set_select_value(axis.clone(), config, copts);
        attrs.as_flags.set_select_value(axis.clone(), config, as_flags);
        attrs.conly_flags.set_select_value(
            axis.clone(),
            config,
            parse_command_line_flags(&props.conlyflags),
        );
        attrs.cpp_flags.set_select_value(
            axis.clone(),
            config,
            parse_command_line_flags(&props.cppflags),
        );
        attrs.rtti.set_select_value(axis, config, props.rtti);
    }

    srcs.resolve_excludes();

    let product_variables = module.product_variable_properties();
    let targets = [
        ("cflags", &mut attrs.copts),
        ("asflags", &mut attrs.as_flags),
        ("cppflags", &mut attrs.cpp_flags),
    ];
    for (property, attr) in targets {
        let Some(configs) = product_variables.get(property) else {
            continue;
        };
        for (config, prop) in configs {
            let (flags, _) = try_variable_substitutions(&prop.values, &prop.variable);
            attr.set_select_value(ConfigurationAxis::product_variable(*config), *config, flags);
        }
    }

    let grouped = group_srcs_by_extension(&srcs, ctx)?;
    attrs.srcs = grouped.srcs;
    attrs.c_srcs = grouped.c_srcs;
    attrs.as_srcs = grouped.as_srcs;

    tracing::debug!(module = %module.name, "converted compiler properties");
    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::context::SimpleContext;
    use ccbridge_attrs::ConfigurationAxis as Axis;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn module(value: serde_json::Value) -> ModuleProperties {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_command_line_flags_splits_on_space() {
        assert_eq!(
            parse_command_line_flags(&strings(&["-include foo.h", "-Wall"])),
            strings(&["-include", "foo.h", "-Wall"])
        );
    }

    #[test]
    fn test_include_flags() {
        let ctx = SimpleContext::new("external/foo");
        let module = module(serde_json::json!({
            "name": "libfoo",
            "dir": "external/foo",
            "variants": [{"properties": {
                "kind": "compiler",
                "cflags": ["-O2"],
                "include_dirs": ["external/foo/include"],
                "local_include_dirs": ["src"]
            }}]
        }));
        let attrs = convert_compiler_props(&ctx, &module).unwrap();

        assert_eq!(
            attrs.copts.value(),
            &strings(&[
                "-O2",
                "-Iexternal/foo/include",
                "-I$(BINDIR)/external/foo/include",
                "-Iexternal/foo/src",
                "-I$(BINDIR)/external/foo/src",
                "-Iexternal/foo",
                "-I$(BINDIR)/external/foo",
            ])
        );
        assert_eq!(attrs.as_flags.value().len(), 6);
    }

    #[test]
    fn test_include_build_directory_disabled() {
        let ctx = SimpleContext::new("external/foo");
        let module = module(serde_json::json!({
            "name": "libfoo",
            "variants": [{"properties": {"kind": "compiler", "include_build_directory": false}}]
        }));
        let attrs = convert_compiler_props(&ctx, &module).unwrap();
        assert!(attrs.copts.value().is_empty());
    }

    #[test]
    fn test_build_directory_only_on_no_config_axis() {
        let ctx = SimpleContext::new("d");
        let module = module(serde_json::json!({
            "name": "m",
            "variants": [{"axis": "arch", "config": "arm",
                          "properties": {"kind": "compiler", "cflags": ["-marm"]}}]
        }));
        let attrs = convert_compiler_props(&ctx, &module).unwrap();
        assert_eq!(
            attrs.copts.select_value(&Axis::Arch, "arm"),
            Some(&strings(&["-marm"]))
        );
    }

    #[test]
    fn test_srcs_grouped_and_excluded() {
        let ctx = SimpleContext::new("d").with_file_groups(["common_srcs"]);
        let module = module(serde_json::json!({
            "name": "m",
            "variants": [
                {"properties": {
                    "kind": "compiler",
                    "srcs": ["a.c", "b.cpp", "c.S", ":common_srcs"],
                    "exclude_srcs": ["b.cpp"],
                    "generated_headers": ["gen_hdrs"]
                }},
                {"axis": "arch", "config": "arm64",
                 "properties": {"kind": "compiler", "srcs": ["arm64.S"]}},
                {"axis": "arch", "config": "x86",
                 "properties": {"kind": "compiler", "cflags": ["-msse"]}}
            ]
        }));
        let attrs = convert_compiler_props(&ctx, &module).unwrap();

        assert_eq!(attrs.c_srcs.value().labels(), vec!["a.c", ":common_srcs_c_srcs"]);
        assert_eq!(attrs.as_srcs.value().labels(), vec!["c.S", ":common_srcs_as_srcs"]);
        assert_eq!(
            attrs.srcs.value().labels(),
            vec![":common_srcs_cpp_srcs", ":gen_hdrs"]
        );
        assert_eq!(
            attrs.as_srcs.select_value(&Axis::Arch, "arm64").unwrap().labels(),
            vec!["arm64.S"]
        );
        // No srcs on x86, so no bucket.
        assert!(attrs.as_srcs.select_value(&Axis::Arch, "x86").is_none());
    }

    #[test]
    fn test_arch_exclude_srcs_removes_default_src() {
        let ctx = SimpleContext::new("d");
        let module = module(serde_json::json!({
            "name": "m",
            "variants": [
                {"properties": {"kind": "compiler", "srcs": ["a.cpp", "generic.cpp"]}},
                {"axis": "arch", "config": "arm",
                 "properties": {"kind": "compiler", "exclude_srcs": ["generic.cpp"]}},
                {"axis": "arch", "config": "x86",
                 "properties": {"kind": "compiler", "srcs": ["x86.cpp"]}}
            ]
        }));
        let attrs = convert_compiler_props(&ctx, &module).unwrap();

        assert_eq!(attrs.srcs.value().labels(), vec!["a.cpp"]);
        assert!(attrs
            .srcs
            .select_value(&Axis::Arch, "arm")
            .unwrap()
            .includes
            .is_empty());
        assert_eq!(
            attrs.srcs.select_value(&Axis::Arch, "x86").unwrap().labels(),
            vec!["generic.cpp", "x86.cpp"]
        );
        assert_eq!(
            attrs
                .srcs
                .select_value(&Axis::Arch, ccbridge_attrs::CONDITIONS_DEFAULT)
                .unwrap()
                .labels(),
            vec!["generic.cpp"]
        );

        let json = serde_json::to_value(&attrs.srcs).unwrap();
        assert_eq!(
            json["select"]["arch"]["//build/bazel/platforms/arch:arm"],
            serde_json::json!({"includes": []})
        );
        // No C sources anywhere, so the C view has nothing to select.
        assert!(attrs.c_srcs.is_empty());
    }

    #[test]
    fn test_product_variable_cflags_substituted() {
        let ctx = SimpleContext::new("d");
        let module = module(serde_json::json!({
            "name": "m",
            "product_variables": [{
                "variable": "platform_sdk_version",
                "full_config": "platform_sdk_version",
                "property": "cflags",
                "values": ["-DSDK=%d"]
            }]
        }));
        let attrs = convert_compiler_props(&ctx, &module).unwrap();
        let axis = Axis::product_variable("platform_sdk_version");

        assert_eq!(
            attrs.copts.select_value(&axis, "platform_sdk_version"),
            Some(&strings(&["-DSDK=$(platform_sdk_version)"]))
        );
    }

    #[test]
    fn test_rtti() {
        let ctx = SimpleContext::new("d");
        let module = module(serde_json::json!({
            "name": "m",
            "variants": [{"axis": "os", "config": "android",
                          "properties": {"kind": "compiler", "rtti": true}}]
        }));
        let attrs = convert_compiler_props(&ctx, &module).unwrap();
        assert_eq!(attrs.rtti.select_value(&Axis::Os, "android"), Some(&Some(true)));
    }
}
