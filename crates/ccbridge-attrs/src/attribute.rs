//! Selectable attribute container.
//!
//! A [`SelectableAttribute`] holds a default value plus overrides keyed by
//! (axis, config). Setting the same key twice keeps the last value; keys on
//! different axes never interact.

use std::collections::BTreeMap;

use serde::ser::{Serialize, Serializer};

use crate::axis::{ConfigurationAxis, CONDITIONS_DEFAULT};
use crate::label::{Label, LabelList};

/// A value that can live in a [`SelectableAttribute`] bucket.
pub trait AttributeValue: Clone + Default + PartialEq {
    /// True when the value carries nothing to emit.
    fn is_unset(&self) -> bool;
}

/// List-shaped attribute values.
pub trait ListValue: AttributeValue {
    /// Concatenate `other` after `self`.
    fn append(&mut self, other: &Self);

    /// Elements of `self` not present in `other`, in order.
    fn subtract(&self, other: &Self) -> Self;

    /// Apply `f` to every element.
    fn map_items<F: Fn(&str) -> String>(&self, f: F) -> Self;

    /// Keep the elements satisfying `pred`.
    fn filter_items<P: Fn(&str) -> bool>(&self, pred: P) -> Self;
}

impl AttributeValue for Vec<String> {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl ListValue for Vec<String> {
    fn append(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }

    fn subtract(&self, other: &Self) -> Self {
        crate::label::subtract(self, other)
    }

    fn map_items<F: Fn(&str) -> String>(&self, f: F) -> Self {
        self.iter().map(|s| f(s.as_str())).collect()
    }

    fn filter_items<P: Fn(&str) -> bool>(&self, pred: P) -> Self {
        self.iter().filter(|s| pred(s.as_str())).cloned().collect()
    }
}

impl<T: Clone + PartialEq> AttributeValue for Option<T> {
    fn is_unset(&self) -> bool {
        self.is_none()
    }
}

/// A value that may differ per (axis, config), with a default for
/// unmatched cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectableAttribute<T> {
    value: T,
    value_set: bool,
    configurable_values: BTreeMap<ConfigurationAxis, BTreeMap<String, T>>,

    /// Emit empty buckets instead of omitting them, so "explicitly empty"
    /// stays distinct from "inherit the default".
    pub force_specify_empty_list: bool,
}

/// `[]string`-like attribute.
pub type StringListAttribute = SelectableAttribute<Vec<String>>;

/// Label list attribute with per-bucket excludes.
pub type LabelListAttribute = SelectableAttribute<LabelList>;

/// Optional boolean attribute.
pub type BoolAttribute = SelectableAttribute<Option<bool>>;

/// Optional single-label attribute.
pub type LabelAttribute = SelectableAttribute<Option<Label>>;

impl<T: AttributeValue> SelectableAttribute<T> {
    /// An attribute with only a default value.
    pub fn new(value: T) -> Self {
        Self {
            value,
            value_set: true,
            configurable_values: BTreeMap::new(),
            force_specify_empty_list: false,
        }
    }

    /// An empty attribute that emits explicitly-set empty buckets.
    pub fn force_empty() -> Self {
        Self {
            force_specify_empty_list: true,
            ..Self::default()
        }
    }

    /// Store `value` for (axis, config). The no-config axis sets the default.
    pub fn set_select_value(
        &mut self,
        axis: ConfigurationAxis,
        config: impl Into<String>,
        value: T,
    ) {
        match axis {
            ConfigurationAxis::NoConfig => {
                self.value = value;
                self.value_set = true;
            }
            axis => {
                self.configurable_values
                    .entry(axis)
                    .or_default()
                    .insert(config.into(), value);
            }
        }
    }

    /// The value stored for (axis, config), if any.
    pub fn select_value(&self, axis: &ConfigurationAxis, config: &str) -> Option<&T> {
        match axis {
            ConfigurationAxis::NoConfig => Some(&self.value),
            axis => self.configurable_values.get(axis)?.get(config),
        }
    }

    /// The default value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Overrides recorded on `axis`, keyed by config.
    pub fn configurable_values(&self, axis: &ConfigurationAxis) -> Option<&BTreeMap<String, T>> {
        self.configurable_values.get(axis)
    }

    /// Axes carrying at least one override, in axis order.
    pub fn sorted_configuration_axes(&self) -> Vec<&ConfigurationAxis> {
        self.configurable_values.keys().collect()
    }

    /// Whether any override would be emitted.
    pub fn has_configurable_values(&self) -> bool {
        self.configurable_values
            .values()
            .any(|configs| configs.values().any(|v| self.should_emit(configs, v)))
    }

    /// The default value if an emitter should write it.
    pub fn emitted_value(&self) -> Option<&T> {
        let emit = !self.value.is_unset() || (self.force_specify_empty_list && self.value_set);
        emit.then_some(&self.value)
    }

    /// Overrides an emitter should write, grouped by axis and keyed by
    /// select label.
    pub fn emitted_selects(&self) -> Vec<(&ConfigurationAxis, BTreeMap<String, &T>)> {
        self.configurable_values
            .iter()
            .filter_map(|(axis, configs)| {
                let selects: BTreeMap<String, &T> = configs
                    .iter()
                    .filter(|(_, v)| self.should_emit(configs, v))
                    .map(|(config, v)| (axis.select_key(config), v))
                    .collect();
                (!selects.is_empty()).then_some((axis, selects))
            })
            .collect()
    }

    /// True when nothing would be emitted for this attribute.
    pub fn is_empty(&self) -> bool {
        self.emitted_value().is_none() && !self.has_configurable_values()
    }

    /// An empty bucket is written when forced, or when its axis has a
    /// non-empty fallback it would otherwise inherit.
    fn should_emit(&self, configs: &BTreeMap<String, T>, v: &T) -> bool {
        !v.is_unset() || self.force_specify_empty_list || has_fallback(configs)
    }

    fn map_buckets<F: Fn(&T) -> T>(&self, f: F) -> Self {
        Self {
            value: f(&self.value),
            value_set: self.value_set,
            configurable_values: self
                .configurable_values
                .iter()
                .map(|(axis, configs)| {
                    let configs = configs.iter().map(|(c, v)| (c.clone(), f(v))).collect();
                    (axis.clone(), configs)
                })
                .collect(),
            force_specify_empty_list: self.force_specify_empty_list,
        }
    }
}

impl<T: ListValue> SelectableAttribute<T> {
    /// Concatenate `other` onto `self`, bucket by bucket.
    pub fn append(&mut self, other: &Self) {
        self.value.append(&other.value);
        self.value_set |= other.value_set;
        self.force_specify_empty_list |= other.force_specify_empty_list;
        for (axis, configs) in &other.configurable_values {
            let ours = self.configurable_values.entry(axis.clone()).or_default();
            for (config, v) in configs {
                ours.entry(config.clone()).or_default().append(v);
            }
        }
    }

    /// Remove from each bucket of `self` the elements of the matching bucket
    /// in `other`.
    pub fn subtract(&self, other: &Self) -> Self {
        let empty = T::default();
        let mut out = Self {
            value: self.value.subtract(&other.value),
            value_set: self.value_set,
            configurable_values: BTreeMap::new(),
            force_specify_empty_list: self.force_specify_empty_list,
        };
        for (axis, configs) in &self.configurable_values {
            let theirs = other.configurable_values.get(axis);
            let subtracted = configs
                .iter()
                .map(|(config, v)| {
                    let needle = theirs.and_then(|c| c.get(config)).unwrap_or(&empty);
                    (config.clone(), v.subtract(needle))
                })
                .collect();
            out.configurable_values.insert(axis.clone(), subtracted);
        }
        out
    }

    /// Apply `f` to every element of every bucket.
    pub fn map<F: Fn(&str) -> String>(&self, f: F) -> Self {
        self.map_buckets(|v| v.map_items(&f))
    }

    /// Keep only elements satisfying `pred` in every bucket.
    pub fn filter<P: Fn(&str) -> bool>(&self, pred: P) -> Self {
        self.map_buckets(|v| v.filter_items(&pred))
    }
}

impl SelectableAttribute<LabelList> {
    /// Replace every bucket with its `includes - excludes`.
    ///
    /// Excludes recorded on a config also remove base entries from the
    /// default. Those entries move to the axis's `conditions_default` bucket
    /// and to every other config on the axis that does not exclude them, so
    /// each config still sees `default + own includes - own excludes`.
    ///
    /// Empty buckets are dropped unless `force_specify_empty_list` is set or
    /// the axis has a non-empty fallback.
    pub fn resolve_excludes(&mut self) {
        self.value = self.value.resolved();
        let force = self.force_specify_empty_list;
        for configs in self.configurable_values.values_mut() {
            let base = self.value.clone();
            let existing_fallback = configs.remove(CONDITIONS_DEFAULT);

            for v in configs.values() {
                self.value = LabelList::new(crate::label::subtract(
                    &self.value.includes,
                    &v.excludes,
                ));
            }
            for v in configs.values_mut() {
                let mut all = base.clone();
                all.append(v);
                *v = all.resolved().subtract(&self.value);
            }

            let mut fallback = base.subtract(&self.value);
            if let Some(existing) = &existing_fallback {
                fallback.append(&existing.resolved());
            }
            let fallback = fallback.resolved();
            if !fallback.includes.is_empty() || (force && existing_fallback.is_some()) {
                configs.insert(CONDITIONS_DEFAULT.to_string(), fallback);
            }

            let keep_empty = force || has_fallback(configs);
            configs.retain(|_, v| keep_empty || !v.includes.is_empty());
        }
        self.configurable_values.retain(|_, configs| !configs.is_empty());
    }
}

/// True when `configs` carries a non-empty `conditions_default` bucket.
fn has_fallback<T: AttributeValue>(configs: &BTreeMap<String, T>) -> bool {
    configs
        .get(CONDITIONS_DEFAULT)
        .is_some_and(|fallback| !fallback.is_unset())
}

impl<T: AttributeValue + serde::Serialize> Serialize for SelectableAttribute<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct View<'a, T> {
            #[serde(skip_serializing_if = "Option::is_none")]
            value: Option<&'a T>,
            #[serde(skip_serializing_if = "BTreeMap::is_empty")]
            select: BTreeMap<String, BTreeMap<String, &'a T>>,
        }

        let select = self
            .emitted_selects()
            .into_iter()
            .map(|(axis, selects)| (axis.to_string(), selects))
            .collect();
        View {
            value: self.emitted_value(),
            select,
        }
        .serialize(serializer)
    }
}
