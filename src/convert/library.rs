//! Library-variant conversion: static/shared, prebuilt and exported includes

use serde::Serialize;

use ccbridge_attrs::{
    group_srcs_by_extension, subtract, ConfigurationAxis, LabelAttribute, LabelListAttribute,
    SelectableAttribute, StringListAttribute,
};

use super::context::{label_for_src, label_list_for_deps, label_list_for_srcs, ConversionContext};
use super::props::{
    ArchVariantProperties, FlagExporterProperties, ModuleProperties, StaticOrSharedProperties,
};
use super::ConvertError;

/// Attributes that apply only to the static or only to the shared variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticOrSharedAttributes {
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub srcs: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub c_srcs: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub as_srcs: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub copts: StringListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub static_deps: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub dynamic_deps: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub whole_archive_deps: LabelListAttribute,
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub system_dynamic_deps: LabelListAttribute,
}

impl Default for StaticOrSharedAttributes {
    fn default() -> Self {
        Self {
            srcs: LabelListAttribute::default(),
            c_srcs: LabelListAttribute::default(),
            as_srcs: LabelListAttribute::default(),
            copts: StringListAttribute::default(),
            static_deps: LabelListAttribute::default(),
            dynamic_deps: LabelListAttribute::default(),
            whole_archive_deps: LabelListAttribute::default(),
            system_dynamic_deps: LabelListAttribute::force_empty(),
        }
    }
}

/// Convert the static (`is_static`) or shared variant properties.
pub fn convert_static_or_shared_props(
    ctx: &impl ConversionContext,
    module: &ModuleProperties,
    is_static: bool,
) -> Result<StaticOrSharedAttributes, ConvertError> {
    let mut attrs = StaticOrSharedAttributes::default();
    let mut srcs = LabelListAttribute::default();

    let pick = if is_static {
        ArchVariantProperties::static_props
    } else {
        ArchVariantProperties::shared_props
    };
    for (axis, config, props) in module.arch_variant_properties(pick) {
        set_static_or_shared(ctx, &mut attrs, &mut srcs, axis, config, props);
    }

    let grouped = group_srcs_by_extension(&srcs, ctx)?;
    attrs.srcs = grouped.srcs;
    attrs.c_srcs = grouped.c_srcs;
    attrs.as_srcs = grouped.as_srcs;
    Ok(attrs)
}

fn set_static_or_shared(
    ctx: &impl ConversionContext,
    attrs: &mut StaticOrSharedAttributes,
    srcs: &mut LabelListAttribute,
    axis: ConfigurationAxis,
    config: &str,
    props: &StaticOrSharedProperties,
) {
    attrs
        .copts
        .set_select_value(axis.clone(), config, props.cflags.clone());
    srcs.set_select_value(
        axis.clone(),
        config,
        label_list_for_srcs(ctx, &props.srcs, &[]),
    );
    attrs.static_deps.set_select_value(
        axis.clone(),
        config,
        label_list_for_deps(ctx, &props.static_libs, &[]),
    );
    attrs.dynamic_deps.set_select_value(
        axis.clone(),
        config,
        label_list_for_deps(ctx, &props.shared_libs, &[]),
    );
    attrs.whole_archive_deps.set_select_value(
        axis.clone(),
        config,
        label_list_for_deps(ctx, &props.whole_static_libs, &[]),
    );
    if let Some(system_shared_libs) = &props.system_shared_libs {
        attrs.system_dynamic_deps.set_select_value(
            axis,
            config,
            label_list_for_deps(ctx, system_shared_libs, &[]),
        );
    }
}

/// Attributes of a prebuilt library.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrebuiltAttributes {
    #[serde(skip_serializing_if = "SelectableAttribute::is_empty")]
    pub src: LabelAttribute,
}

/// Convert prebuilt sources. Each (axis, config) may name at most one.
pub fn convert_prebuilt_library_props(
    ctx: &impl ConversionContext,
    module: &ModuleProperties,
) -> Result<PrebuiltAttributes, ConvertError> {
    let mut src = LabelAttribute::default();

    for (axis, config, props) in
        module.arch_variant_properties(ArchVariantProperties::prebuilt_linker)
    {
        match props.srcs.as_slice() {
            [] => {}
            [single] => src.set_select_value(axis, config, Some(label_for_src(ctx, single))),
            many => {
                return Err(ConvertError::TooManyPrebuiltSrcs {
                    axis: axis.to_string(),
                    config: config.to_string(),
                    count: many.len(),
                })
            }
        }
    }

    Ok(PrebuiltAttributes { src })
}

/// Convert exported include directories.
///
/// Configured buckets drop the directories already exported by the
/// no-config bucket, so combining base and variant never duplicates.
pub fn convert_exported_includes(module: &ModuleProperties) -> StringListAttribute {
    let base = module
        .base_properties(ArchVariantProperties::flag_exporter)
        .map(FlagExporterProperties::include_dirs)
        .unwrap_or_default();

    let mut includes = StringListAttribute::default();
    for (axis, config, props) in
        module.arch_variant_properties(ArchVariantProperties::flag_exporter)
    {
        let mut dirs = props.include_dirs();
        if axis != ConfigurationAxis::NoConfig {
            dirs = subtract(&dirs, &base);
        }
        if !dirs.is_empty() {
            includes.set_select_value(axis, config, dirs);
        }
    }
    includes
}
