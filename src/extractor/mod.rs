//! Api extraction from controller types.
//!
//! [`ApiExtractor`] turns every endpoint method of a controller into one [`Api`] per
//! mapped path. Request and response schemas come from the [`SchemaResolver`]; the
//! class and method documentation supply category, summary and the other Api-level
//! metadata, and the configured `apis` overrides are merged last.
//!
//! # Example
//!
//! ```no_run
//! use apidoc_from_source::config::ExtractorConfig;
//! use apidoc_from_source::extractor::ApiExtractor;
//! use apidoc_from_source::notify::LogNotifier;
//! use apidoc_from_source::resolver::Context;
//! use apidoc_from_source::source::loader::load_project;
//! use std::path::Path;
//!
//! let project = load_project(Path::new("src")).unwrap();
//! let config = ExtractorConfig::default();
//! let ctx = Context::new(&project.catalog, &config, &LogNotifier);
//! let extraction = ApiExtractor::new(&ctx).extract_all();
//! println!("Found {} apis", extraction.apis.len());
//! ```
//!
//! [`SchemaResolver`]: crate::resolver::SchemaResolver

pub mod mapping;
pub mod request;
pub mod response;

use indexmap::IndexSet;
use log::{debug, info};

use crate::custom::apply_api_custom;
use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::discovery::ControllerDetector;
use crate::model::Api;
use crate::resolver::Context;
use request::RequestExtractor;
use response::ResponseExtractor;

/// Apis of one batch together with the number of controllers they came from.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub controllers: usize,
    pub apis: Vec<Api>,
}

pub struct ApiExtractor<'a> {
    ctx: &'a Context<'a>,
    request: RequestExtractor<'a>,
    response: ResponseExtractor<'a>,
}

impl<'a> ApiExtractor<'a> {
    pub fn new(ctx: &'a Context<'a>) -> Self {
        Self {
            ctx,
            request: RequestExtractor::new(ctx),
            response: ResponseExtractor::new(ctx),
        }
    }

    /// Extracts every controller known to the source.
    ///
    /// Classes are processed before interfaces, and an Api whose method and path were
    /// already produced is dropped.
    pub fn extract_all(&self) -> Extraction {
        let detection = ControllerDetector::detect(self.ctx.source, self.ctx.config);
        let mut seen: IndexSet<String> = IndexSet::new();
        let mut apis = Vec::new();

        for controller in &detection.controllers {
            let base = mapping::class_path(self.ctx.source, controller.descriptor);
            for method in &controller.methods {
                for api in self.extract_method(controller.descriptor, method, &base) {
                    if seen.insert(api.key()) {
                        apis.push(api);
                    } else {
                        debug!("Dropping duplicate {} from {}", api.key(), controller.descriptor.name);
                    }
                }
            }
        }

        info!(
            "Extracted {} api(s) from {} controller(s)",
            apis.len(),
            detection.controllers.len()
        );
        Extraction {
            controllers: detection.controllers.len(),
            apis,
        }
    }

    /// Apis of one type; empty when it is not a controller.
    pub fn extract_type(&self, descriptor: &TypeDescriptor) -> Vec<Api> {
        if !ControllerDetector::is_controller(descriptor, self.ctx.config) {
            debug!("{} is not a controller", descriptor.name);
            return Vec::new();
        }
        let base = mapping::class_path(self.ctx.source, descriptor);
        ControllerDetector::endpoint_methods(self.ctx.source, descriptor)
            .iter()
            .flat_map(|method| self.extract_method(descriptor, method, &base))
            .collect()
    }

    /// One Api per mapped path, each an independent copy.
    pub fn extract_method(&self, class: &TypeDescriptor, method: &MethodDescriptor, base_path: &str) -> Vec<Api> {
        let Some(mapping) = mapping::method_mapping(method) else {
            return Vec::new();
        };
        debug!("Extracting {}::{}", class.short_name, method.name);

        let request = self.request.extract(method, mapping.method);
        let template = Api {
            method: mapping.method,
            path: String::new(),
            category: Some(mapping::category(method, class)),
            summary: mapping::summary(method),
            description: mapping::description(method),
            deprecated: mapping::deprecated(method, class),
            tags: mapping::tags(method).into_iter().collect(),
            parameters: request.parameters,
            request_body_type: request.request_body_type,
            request_body: request.request_body,
            request_body_form: request.request_body_form,
            responses: self.response.extract(method),
        };

        mapping
            .paths
            .iter()
            .map(|path| {
                let mut api = template.clone();
                api.path = mapping::compose_path(base_path, path);
                apply_api_custom(&mut api, self.ctx.config);
                api
            })
            .collect()
    }
}
