//! Controller and endpoint discovery.
//!
//! A type is a controller when it is an interface (so that mappings declared on a
//! contract are picked up) or carries one of the configured controller annotations.
//! Its endpoints are the visible instance methods, own or inherited, that carry a
//! request mapping annotation.

use log::debug;

use crate::config::ExtractorConfig;
use crate::descriptor::{Annotated, MethodDescriptor, TypeDescriptor};
use crate::source::TypeSource;

/// Annotations that map a method to an HTTP endpoint.
pub const MAPPING_ANNOTATIONS: &[&str] = &[
    "RequestMapping",
    "GetMapping",
    "PostMapping",
    "PutMapping",
    "DeleteMapping",
    "PatchMapping",
];

/// An eligible type together with its endpoint methods.
#[derive(Debug, Clone)]
pub struct Controller<'a> {
    pub descriptor: &'a TypeDescriptor,
    pub methods: Vec<MethodDescriptor>,
}

/// Result of controller discovery.
///
/// Concrete controllers come before interfaces so that an implementation's
/// endpoints win over the contract it implements.
pub struct DetectionResult<'a> {
    pub controllers: Vec<Controller<'a>>,
}

impl DetectionResult<'_> {
    pub fn endpoint_count(&self) -> usize {
        self.controllers.iter().map(|c| c.methods.len()).sum()
    }
}

pub struct ControllerDetector;

impl ControllerDetector {
    /// Scans every type of `source` for controllers with at least one endpoint.
    pub fn detect<'a>(source: &'a dyn TypeSource, config: &ExtractorConfig) -> DetectionResult<'a> {
        let mut classes = Vec::new();
        let mut interfaces = Vec::new();

        for descriptor in source.types() {
            if !Self::is_controller(descriptor, config) {
                continue;
            }
            let methods = Self::endpoint_methods(source, descriptor);
            if methods.is_empty() {
                continue;
            }
            debug!("Controller {} with {} endpoint(s)", descriptor.name, methods.len());
            let controller = Controller { descriptor, methods };
            if descriptor.is_interface() {
                interfaces.push(controller);
            } else {
                classes.push(controller);
            }
        }

        classes.extend(interfaces);
        DetectionResult { controllers: classes }
    }

    pub fn is_controller(descriptor: &TypeDescriptor, config: &ExtractorConfig) -> bool {
        if descriptor.doc.has_tag("ignore") {
            return false;
        }
        descriptor.is_interface()
            || config
                .controller_annotations
                .iter()
                .any(|name| descriptor.has_annotation(name))
    }

    /// Own and inherited methods that map to an endpoint, inherited annotations merged.
    pub fn endpoint_methods(source: &dyn TypeSource, descriptor: &TypeDescriptor) -> Vec<MethodDescriptor> {
        source
            .all_methods(descriptor)
            .into_iter()
            .filter(Self::is_endpoint)
            .collect()
    }

    pub fn is_endpoint(method: &MethodDescriptor) -> bool {
        !method.modifiers.private
            && !method.modifiers.is_static
            && !method.doc.has_tag("ignore")
            && method.find_any_annotation(MAPPING_ANNOTATIONS).is_some()
    }
}
