//! Request mappings, path composition and Api-level documentation.

use crate::descriptor::{Annotated, Annotation, MethodDescriptor, TypeDescriptor};
use crate::discovery::MAPPING_ANNOTATIONS;
use crate::metadata;
use crate::model::HttpMethod;
use crate::source::TypeSource;

/// HTTP method and the (unprefixed) paths of one mapping annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub method: HttpMethod,
    pub paths: Vec<String>,
}

/// Reads the first mapping annotation on `method`.
///
/// Several paths may be declared. A mapping without any path maps the class path
/// itself, represented by a single empty path.
pub fn method_mapping(method: &MethodDescriptor) -> Option<Mapping> {
    let annotation = method.find_any_annotation(MAPPING_ANNOTATIONS)?;
    let http_method = mapping_method(annotation);
    let mut paths = annotation_paths(annotation);
    if paths.is_empty() {
        paths.push(String::new());
    }
    Some(Mapping {
        method: http_method,
        paths,
    })
}

fn mapping_method(annotation: &Annotation) -> HttpMethod {
    match annotation.short_name() {
        "GetMapping" => HttpMethod::Get,
        "PostMapping" => HttpMethod::Post,
        "PutMapping" => HttpMethod::Put,
        "DeleteMapping" => HttpMethod::Delete,
        "PatchMapping" => HttpMethod::Patch,
        _ => annotation
            .value("method")
            .and_then(HttpMethod::parse)
            .unwrap_or_default(),
    }
}

fn annotation_paths(annotation: &Annotation) -> Vec<String> {
    annotation
        .values("value")
        .iter()
        .chain(annotation.values("path"))
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Base path of a controller: its own `RequestMapping`, else the nearest ancestor's.
pub fn class_path(source: &dyn TypeSource, descriptor: &TypeDescriptor) -> String {
    let own = descriptor.find_annotation("RequestMapping");
    let annotation = own.or_else(|| {
        source
            .ancestors(descriptor)
            .into_iter()
            .find_map(|(ancestor, _)| ancestor.find_annotation("RequestMapping"))
    });
    annotation
        .and_then(|a| annotation_paths(a).into_iter().next())
        .unwrap_or_default()
}

/// Joins path segments into a normalized path.
///
/// The result starts with `/`, contains no empty segment and only ends with `/`
/// when it is the root.
pub fn compose_path(base: &str, path: &str) -> String {
    let segments: Vec<&str> = base
        .split('/')
        .chain(path.split('/'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Explicit category, then `@menu`, then the class doc title, then the type name.
pub fn category(method: &MethodDescriptor, class: &TypeDescriptor) -> String {
    declared_category(method)
        .or_else(|| declared_category(class))
        .or_else(|| method.doc.tag("menu"))
        .or_else(|| class.doc.tag("menu"))
        .or_else(|| class.doc.title())
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| metadata::snake_case(&class.short_name))
}

fn declared_category<A: Annotated + ?Sized>(annotated: &A) -> Option<&str> {
    annotated
        .find_annotation("Api")
        .and_then(|a| a.first_value(&["tags", "value"]))
}

pub fn summary(method: &MethodDescriptor) -> Option<String> {
    method
        .find_annotation("ApiOperation")
        .and_then(|a| a.value("value"))
        .or_else(|| method.doc.tag("description"))
        .or_else(|| method.doc.tag("Description"))
        .or_else(|| method.doc.title())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The declaration signature, HTML-escaped, as a code block.
pub fn description(method: &MethodDescriptor) -> Option<String> {
    let signature = method.signature.trim();
    if signature.is_empty() {
        return None;
    }
    let escaped = signature
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    Some(format!("<pre><code>{}</code></pre>", escaped))
}

pub fn deprecated(method: &MethodDescriptor, class: &TypeDescriptor) -> bool {
    metadata::is_deprecated(method, &method.doc) || metadata::is_deprecated(class, &class.doc)
}

/// `@tags a, b` on the method.
pub fn tags(method: &MethodDescriptor) -> Vec<String> {
    method
        .doc
        .tag("tags")
        .map(|text| {
            text.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
