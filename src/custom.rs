//! User customizations merged onto resolved properties and Apis.
//!
//! One rule for every overlay: a set, non-empty override value wins, anything unset
//! leaves the resolved value untouched.

use crate::config::{ApiCustom, ExtractorConfig, PropertyCustom};
use crate::descriptor::{Annotated, Annotation};
use crate::generics;
use crate::model::{Api, Property};
use crate::source::TypeSource;

/// Date types without a time part, by full or unambiguous short name.
const DATE_ONLY_TYPES: &[&str] = &[
    "java.time.LocalDate",
    "java.sql.Date",
    "chrono::NaiveDate",
    "time::Date",
    "LocalDate",
    "NaiveDate",
];
/// Time types without a date part.
const TIME_ONLY_TYPES: &[&str] = &[
    "java.time.LocalTime",
    "chrono::NaiveTime",
    "time::Time",
    "LocalTime",
    "NaiveTime",
];

/// Merge of a customization record onto a resolved value.
pub trait Overlay<C> {
    fn overlay(&mut self, custom: &C);
}

fn overlay_text(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        *target = Some(value.to_string());
    }
}

fn overlay_flag(target: &mut bool, value: Option<bool>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl Overlay<PropertyCustom> for Property {
    fn overlay(&mut self, custom: &PropertyCustom) {
        if let Some(name) = custom.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(data_type) = custom.data_type {
            self.set_type(data_type);
        }
        overlay_text(&mut self.description, &custom.description);
        overlay_flag(&mut self.required, custom.required);
        overlay_flag(&mut self.deprecated, custom.deprecated);
        overlay_text(&mut self.default_value, &custom.default_value);
        overlay_text(&mut self.example, &custom.example);
        overlay_text(&mut self.mock, &custom.mock);
        overlay_text(&mut self.date_format, &custom.date_format);
    }
}

impl Overlay<ApiCustom> for Api {
    fn overlay(&mut self, custom: &ApiCustom) {
        overlay_text(&mut self.category, &custom.category);
        overlay_text(&mut self.summary, &custom.summary);
        overlay_text(&mut self.description, &custom.description);
        overlay_flag(&mut self.deprecated, custom.deprecated);
        let tags: Vec<&str> = custom
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            self.tags = tags.into_iter().map(str::to_string).collect();
        }
    }
}

/// Applies the configured `apis` entry for this Api, if any.
pub fn apply_api_custom(api: &mut Api, config: &ExtractorConfig) {
    if let Some(custom) = config.api(api.method, &api.path) {
        api.overlay(custom);
    }
}

/// Where a date value travels; picks the configured default pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateContext {
    /// JSON bodies and responses.
    Json,
    /// Query, path, header and form values.
    Mvc,
}

pub fn is_date_type(source: &dyn TypeSource, config: &ExtractorConfig, type_text: &str) -> bool {
    source.matches_any(&config.date_types, type_text)
}

/// Date pattern for a value of `type_text` carrying `annotations`.
///
/// `JsonFormat(pattern)` wins over `DateTimeFormat(pattern)`, which wins over the
/// type's natural pattern or the configured default for the context.
pub fn date_format<A: Annotated + ?Sized>(
    source: &dyn TypeSource,
    config: &ExtractorConfig,
    type_text: &str,
    annotated: &A,
    context: DateContext,
) -> Option<String> {
    if !is_date_type(source, config, type_text) {
        return None;
    }
    let pattern = |annotation: Option<&Annotation>| {
        annotation.and_then(|a| a.first_value(&["pattern", "value"]).map(str::to_string))
    };
    if let Some(pattern) = pattern(annotated.find_annotation("JsonFormat")) {
        return Some(pattern);
    }
    if let Some(pattern) = pattern(annotated.find_annotation("DateTimeFormat")) {
        return Some(pattern);
    }

    let raw = generics::raw_name(type_text);
    let short = generics::short_name(&raw);
    if DATE_ONLY_TYPES.contains(&raw.as_str()) || DATE_ONLY_TYPES.contains(&short) {
        return Some("yyyy-MM-dd".to_string());
    }
    if TIME_ONLY_TYPES.contains(&raw.as_str()) || TIME_ONLY_TYPES.contains(&short) {
        return Some("HH:mm:ss".to_string());
    }
    match context {
        DateContext::Json => config.date_time_format_json.clone(),
        DateContext::Mvc => config.date_time_format_mvc.clone(),
    }
}

/// Stamps `date_format` on a scalar property when its type is a date type.
pub fn stamp_date<A: Annotated + ?Sized>(
    property: &mut Property,
    source: &dyn TypeSource,
    config: &ExtractorConfig,
    type_text: &str,
    annotated: &A,
    context: DateContext,
) {
    if property.date_format.is_some() || !property.data_type.is_scalar() {
        return;
    }
    property.date_format = date_format(source, config, type_text, annotated, context);
}
