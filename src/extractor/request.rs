//! Request parameters and bodies of an endpoint method.

use indexmap::IndexMap;
use log::debug;

use crate::custom::{stamp_date, DateContext};
use crate::descriptor::{Annotated, Annotation, MethodDescriptor, ParameterDescriptor};
use crate::metadata;
use crate::model::{DataType, HttpMethod, ParameterIn, Property, RequestBodyType};
use crate::resolver::{Context, SchemaResolver};

/// Parameter annotations in precedence order, with the location each one implies.
const LOCATION_ANNOTATIONS: &[(&str, ParameterIn)] = &[
    ("PathVariable", ParameterIn::Path),
    ("RequestParam", ParameterIn::Query),
    ("RequestHeader", ParameterIn::Header),
    ("RequestBody", ParameterIn::Body),
    ("RequestPart", ParameterIn::Form),
    ("ModelAttribute", ParameterIn::Form),
];

/// Everything a method takes from the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInfo {
    /// Path, query and header parameters.
    pub parameters: Vec<Property>,
    pub request_body_type: Option<RequestBodyType>,
    /// JSON body, or the aggregate of the form fields.
    pub request_body: Option<Property>,
    pub request_body_form: Vec<Property>,
}

pub struct RequestExtractor<'a> {
    ctx: &'a Context<'a>,
}

impl<'a> RequestExtractor<'a> {
    pub fn new(ctx: &'a Context<'a>) -> Self {
        Self { ctx }
    }

    pub fn extract(&self, method: &MethodDescriptor, http_method: HttpMethod) -> RequestInfo {
        let mut info = RequestInfo::default();
        let mut body: Option<Property> = None;

        for param in &method.parameters {
            let annotated = annotated_location(param);
            if annotated.is_none()
                && self
                    .ctx
                    .source
                    .matches_any(&self.ctx.config.parameter_ignore_types, &param.type_name)
            {
                debug!("Skipping framework parameter {}: {}", param.name, param.type_name);
                continue;
            }
            if let Some((ParameterIn::Body, _)) = annotated {
                if body.is_some() {
                    debug!("Ignoring extra body parameter {} of {}", param.name, method.name);
                } else {
                    body = self.body(param, method);
                }
                continue;
            }

            for property in self.parameter(param, annotated, method, http_method) {
                if property.location == Some(ParameterIn::Form) {
                    info.request_body_form.push(property);
                } else {
                    info.parameters.push(property);
                }
            }
        }

        let has_file = info.request_body_form.iter().any(is_file);
        info.request_body_type = Some(if body.is_some() {
            RequestBodyType::Json
        } else if has_file {
            RequestBodyType::FormData
        } else if !info.request_body_form.is_empty() || http_method.allows_body() {
            RequestBodyType::Form
        } else {
            RequestBodyType::Raw
        });
        info.request_body = body.or_else(|| form_aggregate(&info.request_body_form));
        info
    }

    fn body(&self, param: &ParameterDescriptor, method: &MethodDescriptor) -> Option<Property> {
        let mut property = SchemaResolver::request(self.ctx).resolve_root(&param.type_name)?;
        let description = metadata::parameter_description(param, &param.name, &method.doc);
        property.description = metadata::describe_with_values(description.as_deref(), property.values.as_deref());
        stamp_date(&mut property, self.ctx.source, self.ctx.config, &param.type_name, param, DateContext::Json);
        Some(property)
    }

    /// One parameter, or the children of an object parameter sent as query or form fields.
    fn parameter(
        &self,
        param: &ParameterDescriptor,
        annotated: Option<(ParameterIn, &Annotation)>,
        method: &MethodDescriptor,
        http_method: HttpMethod,
    ) -> Vec<Property> {
        let resolver = SchemaResolver::request(self.ctx).with_date_context(DateContext::Mvc);
        let Some(mut property) = resolver.resolve_root(&param.type_name) else {
            return Vec::new();
        };

        let location = match annotated.map(|(location, _)| location) {
            Some(location) => location,
            None if property.is_object_type() || property.data_type == DataType::File => {
                ParameterIn::Form
            }
            None => ParameterIn::Query,
        };
        let location = if location == ParameterIn::Form && !http_method.allows_body() {
            ParameterIn::Query
        } else {
            location
        };

        if property.is_object_type() && matches!(location, ParameterIn::Query | ParameterIn::Form) {
            let children = property.properties.take().unwrap_or_default();
            return children
                .into_values()
                .map(|mut child| {
                    child.location = Some(location);
                    child
                })
                .collect();
        }

        let annotation = annotated.map(|(_, annotation)| annotation);
        self.describe(&mut property, param, annotation, method, location);
        vec![property]
    }

    fn describe(
        &self,
        property: &mut Property,
        param: &ParameterDescriptor,
        annotation: Option<&Annotation>,
        method: &MethodDescriptor,
        location: ParameterIn,
    ) {
        property.name = annotation
            .and_then(|a| a.first_value(&["value", "name"]))
            .unwrap_or(param.name.as_str())
            .to_string();
        property.location = Some(location);
        property.required = location == ParameterIn::Path
            || annotation.and_then(|a| a.bool_value("required")).unwrap_or(false)
            || metadata::is_required(param, self.ctx.config);
        property.default_value = annotation
            .and_then(|a| a.first_value(&["defaultValue", "default_value"]))
            .map(str::to_string);

        let values = property
            .values
            .clone()
            .or_else(|| property.items.as_ref().and_then(|items| items.values.clone()));
        let description = metadata::parameter_description(param, &param.name, &method.doc);
        property.description = metadata::describe_with_values(description.as_deref(), values.as_deref());

        stamp_date(property, self.ctx.source, self.ctx.config, &param.type_name, param, DateContext::Mvc);
        self.ctx.mocks.apply(property, None);
    }
}

fn annotated_location(param: &ParameterDescriptor) -> Option<(ParameterIn, &Annotation)> {
    LOCATION_ANNOTATIONS.iter().find_map(|(name, location)| {
        param
            .find_annotation(name)
            .map(|annotation| (*location, annotation))
    })
}

fn is_file(property: &Property) -> bool {
    property.data_type == DataType::File
        || property
            .items
            .as_ref()
            .map_or(false, |items| items.data_type == DataType::File)
}

fn form_aggregate(fields: &[Property]) -> Option<Property> {
    if fields.is_empty() {
        return None;
    }
    let mut aggregate = Property::object();
    let properties: IndexMap<String, Property> = fields
        .iter()
        .map(|field| (field.name.clone(), field.clone()))
        .collect();
    aggregate.properties = Some(properties);
    Some(aggregate)
}
