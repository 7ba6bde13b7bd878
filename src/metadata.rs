//! Documentation metadata read off annotations and doc comments.

use crate::config::ExtractorConfig;
use crate::descriptor::{Annotated, DocComment};
use crate::model::Value;

/// `A: in use, B` style rendering of enum values.
pub fn values_text(values: &[Value]) -> String {
    values.iter().map(Value::text).collect::<Vec<_>>().join(", ")
}

/// Appends `(values)` to a description, or uses the values alone.
pub fn describe_with_values(description: Option<&str>, values: Option<&[Value]>) -> Option<String> {
    let description = description.map(str::trim).filter(|d| !d.is_empty());
    let values = values.filter(|v| !v.is_empty()).map(values_text);
    match (description, values) {
        (Some(description), Some(values)) => Some(format!("{} ({})", description, values)),
        (Some(description), None) => Some(description.to_string()),
        (None, Some(values)) => Some(values),
        (None, None) => None,
    }
}

/// `ApiModelProperty` value, then the doc title.
pub fn member_description<A: Annotated + ?Sized>(annotated: &A, doc: &DocComment) -> Option<String> {
    annotated
        .find_annotation("ApiModelProperty")
        .and_then(|a| a.value("value"))
        .or_else(|| doc.title())
        .map(str::to_string)
}

/// `ApiParam` value, then `@param name text` on the method.
pub fn parameter_description<A: Annotated + ?Sized>(
    annotated: &A,
    param_name: &str,
    method_doc: &DocComment,
) -> Option<String> {
    annotated
        .find_annotation("ApiParam")
        .and_then(|a| a.value("value"))
        .or_else(|| method_doc.param(param_name).filter(|text| !text.is_empty()))
        .map(str::to_string)
}

/// Output name: `JsonProperty` value when present.
pub fn member_name<A: Annotated + ?Sized>(annotated: &A, declared: &str) -> String {
    annotated
        .find_annotation("JsonProperty")
        .and_then(|a| a.value("value"))
        .unwrap_or(declared)
        .to_string()
}

/// Carries any of the configured not-null style annotations.
pub fn is_required<A: Annotated + ?Sized>(annotated: &A, config: &ExtractorConfig) -> bool {
    config
        .required_annotations
        .iter()
        .any(|name| annotated.has_annotation(name))
}

pub fn is_deprecated<A: Annotated + ?Sized>(annotated: &A, doc: &DocComment) -> bool {
    annotated.has_annotation("Deprecated") || doc.has_tag("deprecated")
}

/// Hidden swagger property, `@ignore` tag or `JsonIgnore` (unless `JsonIgnore(false)`).
pub fn is_ignored<A: Annotated + ?Sized>(annotated: &A, doc: &DocComment) -> bool {
    let hidden = annotated
        .find_annotation("ApiModelProperty")
        .and_then(|a| a.bool_value("hidden"))
        .unwrap_or(false);
    let json_ignore = annotated
        .find_annotation("JsonIgnore")
        .map(|a| a.bool_value("value").unwrap_or(true))
        .unwrap_or(false);
    hidden || json_ignore || doc.has_tag("ignore")
}

/// Default value: a declared initializer, else the `@default` doc tag.
pub fn default_value(declared: Option<&str>, doc: &DocComment) -> Option<String> {
    declared
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| doc.tag("default"))
        .map(|v| v.trim_matches('"').to_string())
}

/// Words of a type name joined with `_`: `UserController` becomes `user_controller`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}
