//! Source introspection.
//!
//! The resolver only ever talks to a [`TypeSource`]. Two backends implement it:
//! [`catalog::TypeCatalog`], an in-memory descriptor index that can be loaded from a
//! JSON/YAML dump, and [`rust`], which fills a catalog from parsed Rust files.

pub mod catalog;
pub mod loader;
pub mod rust;

use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};

use crate::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use crate::generics;

/// Read-only query interface over the types of a project.
pub trait TypeSource {
    /// Lookup by fully qualified name.
    fn resolve_type(&self, name: &str) -> Option<&TypeDescriptor>;

    /// Lookup by simple name.
    fn resolve_type_by_short_name(&self, name: &str) -> Option<&TypeDescriptor>;

    /// All known types, in registration order.
    fn types(&self) -> Box<dyn Iterator<Item = &TypeDescriptor> + '_>;

    /// Full name first, then short name. Generic arguments are ignored.
    fn find_type(&self, name: &str) -> Option<&TypeDescriptor> {
        let raw = generics::raw_name(name);
        if raw.is_empty() {
            return None;
        }
        self.resolve_type(&raw)
            .or_else(|| self.resolve_type_by_short_name(generics::short_name(&raw)))
    }

    /// Whether `type_text` names one of `entries`.
    ///
    /// A type this source knows matches only through its full name. Any other type
    /// matches an entry it spells out, or a trailing part of one (`State` for
    /// `axum::extract::State`).
    fn matches_any(&self, entries: &[String], type_text: &str) -> bool {
        let raw = generics::raw_name(type_text);
        if raw.is_empty() {
            return false;
        }
        let unqualified = generics::short_name(&raw) == raw;
        let known = self.resolve_type(&raw).or_else(|| {
            if unqualified {
                self.resolve_type_by_short_name(&raw)
            } else {
                None
            }
        });
        match known {
            Some(known) => entries
                .iter()
                .any(|entry| generics::raw_name(entry) == known.name),
            None => entries
                .iter()
                .any(|entry| generics::is_path_suffix(&generics::raw_name(entry), &raw)),
        }
    }

    /// Whether `descriptor` is `base` or transitively extends/implements it.
    ///
    /// Supertypes that cannot be resolved still count by their written name.
    fn is_inheritor(&self, descriptor: &TypeDescriptor, base: &str) -> bool {
        let base = generics::raw_name(base);
        if descriptor.is_named(&base) {
            return true;
        }
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(descriptor.name.clone());
        let mut queue: VecDeque<String> = descriptor.supertypes.iter().cloned().collect();

        while let Some(supertype) = queue.pop_front() {
            let raw = generics::raw_name(&supertype);
            if !visited.insert(raw.clone()) {
                continue;
            }
            if raw == base || generics::short_name(&raw) == base {
                return true;
            }
            if let Some(parent) = self.find_type(&raw) {
                if parent.is_named(&base) {
                    return true;
                }
                visited.insert(parent.name.clone());
                queue.extend(parent.supertypes.iter().cloned());
            }
        }
        false
    }

    /// Ancestors in breadth-first order, each with the generic bindings implied by the
    /// path from `descriptor`.
    fn ancestors<'a>(
        &'a self,
        descriptor: &TypeDescriptor,
    ) -> Vec<(&'a TypeDescriptor, IndexMap<String, String>)> {
        let mut found = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(descriptor.name.clone());
        let mut queue: VecDeque<(String, IndexMap<String, String>)> = descriptor
            .supertypes
            .iter()
            .map(|s| (s.clone(), IndexMap::new()))
            .collect();

        while let Some((supertype, outer)) = queue.pop_front() {
            let written = generics::substitute_generics(&supertype, &outer);
            let (raw, args) = generics::split_type_and_generics(&written);
            let Some(parent) = self.find_type(&raw) else {
                continue;
            };
            if !visited.insert(parent.name.clone()) {
                continue;
            }
            let bindings = generics::bind(&parent.generic_params, args.as_deref());
            for next in &parent.supertypes {
                queue.push_back((next.clone(), bindings.clone()));
            }
            found.push((parent, bindings));
        }
        found
    }

    /// Own methods plus inherited ones that are not overridden.
    ///
    /// An overriding method picks up annotations and documentation it does not
    /// declare itself from the methods it overrides. Inherited signatures have the
    /// ancestor's type parameters replaced by the arguments used in the hierarchy.
    fn all_methods(&self, descriptor: &TypeDescriptor) -> Vec<MethodDescriptor> {
        let mut methods: Vec<MethodDescriptor> = descriptor.methods.clone();

        for (ancestor, bindings) in self.ancestors(descriptor) {
            for inherited in &ancestor.methods {
                let inherited = bind_method(inherited, &bindings);
                match methods.iter_mut().find(|m| m.overrides(&inherited)) {
                    Some(own) => merge_inherited(own, &inherited),
                    None => methods.push(inherited),
                }
            }
        }
        methods
    }

    /// Declared fields, own first, then inherited ones not shadowed by name.
    fn all_fields(&self, descriptor: &TypeDescriptor) -> Vec<FieldDescriptor> {
        let mut fields = descriptor.fields.clone();
        for (ancestor, bindings) in self.ancestors(descriptor) {
            for field in &ancestor.fields {
                if fields.iter().any(|f| f.name == field.name) {
                    continue;
                }
                let mut field = field.clone();
                field.type_name = generics::substitute_generics(&field.type_name, &bindings);
                fields.push(field);
            }
        }
        fields
    }
}

fn bind_method(method: &MethodDescriptor, bindings: &IndexMap<String, String>) -> MethodDescriptor {
    let mut method = method.clone();
    if bindings.is_empty() {
        return method;
    }
    method.return_type = generics::substitute_generics(&method.return_type, bindings);
    for param in &mut method.parameters {
        param.type_name = generics::substitute_generics(&param.type_name, bindings);
    }
    method
}

fn merge_inherited(own: &mut MethodDescriptor, inherited: &MethodDescriptor) {
    for annotation in &inherited.annotations {
        if !own.annotations.iter().any(|a| a.is(&annotation.name)) {
            own.annotations.push(annotation.clone());
        }
    }
    for (param, parent) in own.parameters.iter_mut().zip(&inherited.parameters) {
        for annotation in &parent.annotations {
            if !param.annotations.iter().any(|a| a.is(&annotation.name)) {
                param.annotations.push(annotation.clone());
            }
        }
    }
    own.doc.merge_missing(&inherited.doc);
}
