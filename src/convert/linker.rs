//! Linker property conversion

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use ccbridge_attrs::{
    first_unique, BoolAttribute, ConfigurationAxis, LabelAttribute, LabelListAttribute,
    SelectableAttribute, StringListAttribute,
};

use super::context::{
    label_for_src, label_list_for_deps, unique_label_list_for_deps, ConversionContext,
};
use super::props::{
    ArchVariantProperties, BaseLinkerProperties, ModuleProperties, ProductVariableProperty,
};
use super::ConvertError;

/// Linker flag disabling packed relocations.
pub const NO_PACK_RELOCATIONS_FLAG: &str = "-Wl,--pack-dyn-relocs=none";

/// Linker attributes of a converted module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkerAttributes {
    /// Header library deps followed by static library deps.
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub deps: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub dynamic_deps: LabelListAttribute,
    /// Always emitted when set, so an explicit empty list survives.
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub system_dynamic_deps: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub whole_archive_deps: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub exported_deps: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub linkopts: StringListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub use_libcrt: BoolAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub version_script: LabelAttribute,

    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub strip_keep_symbols: BoolAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub strip_keep_symbols_and_debug_frame: BoolAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub strip_keep_symbols_list: StringListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub strip_all: BoolAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub strip_none: BoolAttribute,
}

impl Default for LinkerAttributes {
    fn default() -> Self {
        Self {
            deps: LabelListAttribute::default(),
            dynamic_deps: LabelListAttribute::default(),
            system_dynamic_deps: LabelListAttribute::force_empty(),
            whole_archive_deps: LabelListAttribute::default(),
            exported_deps: LabelListAttribute::default(),
            linkopts: StringListAttribute::default(),
            use_libcrt: BoolAttribute::default(),
            version_script: LabelAttribute::default(),
            strip_keep_symbols: BoolAttribute::default(),
            strip_keep_symbols_and_debug_frame: BoolAttribute::default(),
            strip_keep_symbols_list: StringListAttribute::default(),
            strip_all: BoolAttribute::default(),
            strip_none: BoolAttribute::default(),
        }
    }
}

fn linker_flags(props: &BaseLinkerProperties) -> Vec<String> {
    let mut flags = props.ldflags.clone();
    if !props.pack_relocations.unwrap_or(true) {
        flags.push(NO_PACK_RELOCATIONS_FLAG.to_string());
    }
    flags
}

fn config_values(
    props: Option<&BTreeMap<&str, &ProductVariableProperty>>,
    config: &str,
) -> Vec<String> {
    props
        .and_then(|configs| configs.get(config))
        .map(|prop| prop.values.clone())
        .unwrap_or_default()
}

/// Product-variable list properties feeding a dependency attribute.
struct ProductVariableDeps<'a> {
    property: &'static str,
    excludes: Option<&'static str>,
    attribute: &'a mut LabelListAttribute,
}

/// Convert linker and strip properties into per-axis attributes.
pub fn convert_linker_props(
    ctx: &impl ConversionContext,
    module: &ModuleProperties,
) -> Result<LinkerAttributes, ConvertError> {
    let mut attrs = LinkerAttributes::default();
    let mut header_deps = LabelListAttribute::default();
    let mut static_deps = LabelListAttribute::default();

    for (axis, config, props) in module.arch_variant_properties(ArchVariantProperties::strip) {
        attrs
            .strip_keep_symbols
            .set_select_value(axis.clone(), config, props.keep_symbols);
        attrs.strip_keep_symbols_list.set_select_value(
            axis.clone(),
            config,
            props.keep_symbols_list.clone(),
        );
        attrs.strip_keep_symbols_and_debug_frame.set_select_value(
            axis.clone(),
            config,
            props.keep_symbols_and_debug_frame,
        );
        attrs.strip_all.set_select_value(axis.clone(), config, props.all);
        attrs.strip_none.set_select_value(axis, config, props.none);
    }

    for (axis, config, props) in module.arch_variant_properties(ArchVariantProperties::linker) {
        static_deps.set_select_value(
            axis.clone(),
            config,
            unique_label_list_for_deps(ctx, &props.static_libs, &props.exclude_static_libs),
        );
        attrs.whole_archive_deps.set_select_value(
            axis.clone(),
            config,
            unique_label_list_for_deps(ctx, &props.whole_static_libs, &props.exclude_static_libs),
        );
        if let Some(system_shared_libs) = &props.system_shared_libs {
            attrs.system_dynamic_deps.set_select_value(
                axis.clone(),
                config,
                unique_label_list_for_deps(ctx, system_shared_libs, &[]),
            );
        }
        attrs.dynamic_deps.set_select_value(
            axis.clone(),
            config,
            unique_label_list_for_deps(ctx, &props.shared_libs, &props.exclude_shared_libs),
        );
        header_deps.set_select_value(
            axis.clone(),
            config,
            unique_label_list_for_deps(ctx, &props.header_libs, &[]),
        );
        attrs.exported_deps.set_select_value(
            axis.clone(),
            config,
            unique_label_list_for_deps(ctx, &props.export_header_lib_headers, &[]),
        );

        attrs
            .linkopts
            .set_select_value(axis.clone(), config, linker_flags(props));
        if let Some(script) = &props.version_script {
            attrs
                .version_script
                .set_select_value(axis.clone(), config, Some(label_for_src(ctx, script)));
        }
        attrs
            .use_libcrt
            .set_select_value(axis, config, Some(props.use_libcrt()));
    }

    let product_variables = module.product_variable_properties();
    let targets = [
        ProductVariableDeps {
            property: "shared_libs",
            excludes: None,
            attribute: &mut attrs.dynamic_deps,
        },
        ProductVariableDeps {
            property: "static_libs",
            excludes: Some("exclude_static_libs"),
            attribute: &mut static_deps,
        },
        ProductVariableDeps {
            property: "whole_static_libs",
            excludes: Some("exclude_static_libs"),
            attribute: &mut attrs.whole_archive_deps,
        },
    ];
    for target in targets {
        let includes = product_variables.get(target.property);
        let excludes = target.excludes.and_then(|name| product_variables.get(name));

        // A config may carry only includes or only excludes.
        let configs: BTreeSet<&str> = includes
            .into_iter()
            .chain(excludes)
            .flat_map(|configs| configs.keys().copied())
            .collect();

        for config in configs {
            let include_values = first_unique(&config_values(includes, config));
            let exclude_values = config_values(excludes, config);
            target.attribute.set_select_value(
                ConfigurationAxis::product_variable(config),
                config,
                label_list_for_deps(ctx, &include_values, &exclude_values),
            );
        }
    }

    static_deps.resolve_excludes();
    attrs.dynamic_deps.resolve_excludes();
    attrs.whole_archive_deps.resolve_excludes();

    header_deps.append(&static_deps);
    attrs.deps = header_deps;

    tracing::debug!(module = %module.name, "converted linker properties");
    Ok(attrs)
}
