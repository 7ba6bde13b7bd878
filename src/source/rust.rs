//! Rust source backend: turns parsed `.rs` files into [`TypeDescriptor`]s.
//!
//! Mapping rules:
//! - traits are contract types, structs data holders, enums enum types
//! - inline `mod` blocks qualify names with `::`
//! - `impl Trait for S` makes `Trait` a supertype of `S`, supertraits are supertypes
//! - inherent and trait impl methods become methods of the implementing type
//! - attributes become annotations with PascalCase names (`get_mapping` -> `GetMapping`),
//!   `serde(rename)` becomes `JsonProperty` and `serde(skip)` becomes `JsonIgnore`
//! - `///` comments become documentation, `@tag` lines included

use indexmap::IndexMap;
use log::debug;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Attribute, Expr, Lit, Meta, Token};

use super::catalog::TypeCatalog;
use super::loader::ParsedFile;
use crate::descriptor::{
    Annotation, ConstantDescriptor, DocComment, FieldDescriptor, MethodDescriptor, Modifiers,
    ParameterDescriptor, TypeDescriptor, TypeKind,
};
use crate::generics;

/// Wrapper types that are transparent for documentation purposes.
const TRANSPARENT_WRAPPERS: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow", "RefCell", "Cell"];

/// Path prefixes dropped from canonical type text.
const RELATIVE_PREFIXES: &[&str] = &["crate", "self", "super"];

/// Builds a catalog (builtins included) from parsed files.
pub fn build_catalog(files: &[ParsedFile]) -> TypeCatalog {
    let mut collector = RustTypeCollector::default();
    for file in files {
        debug!("Collecting types from {}", file.path.display());
        collector.visit_file(&file.syntax_tree);
    }
    TypeCatalog::from_descriptors(collector.finish())
}

/// Convenience for a single in-memory file.
pub fn catalog_from_syntax(file: &syn::File) -> TypeCatalog {
    let mut collector = RustTypeCollector::default();
    collector.visit_file(file);
    TypeCatalog::from_descriptors(collector.finish())
}

struct PendingImpl {
    module: Vec<String>,
    self_type: String,
    trait_name: Option<String>,
    methods: Vec<MethodDescriptor>,
}

#[derive(Default)]
struct RustTypeCollector {
    module_path: Vec<String>,
    types: IndexMap<String, TypeDescriptor>,
    impls: Vec<PendingImpl>,
}

impl RustTypeCollector {
    fn qualify(&self, ident: &syn::Ident) -> String {
        let mut segments = self.module_path.clone();
        segments.push(ident.to_string());
        segments.join("::")
    }

    fn register(&mut self, descriptor: TypeDescriptor) {
        debug!("Found {:?} {}", descriptor.kind, descriptor.name);
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Attaches impl blocks to their types once every file has been visited.
    fn finish(mut self) -> Vec<TypeDescriptor> {
        let impls = std::mem::take(&mut self.impls);
        for pending in impls {
            let Some(key) = self.impl_target(&pending) else {
                debug!("No type found for impl block on {}", pending.self_type);
                continue;
            };
            if let Some(descriptor) = self.types.get_mut(&key) {
                if let Some(trait_name) = pending.trait_name {
                    if !descriptor.supertypes.contains(&trait_name) {
                        descriptor.supertypes.push(trait_name);
                    }
                }
                descriptor.methods.extend(pending.methods);
            }
        }
        self.types.into_values().collect()
    }

    fn impl_target(&self, pending: &PendingImpl) -> Option<String> {
        if self.types.contains_key(&pending.self_type) {
            return Some(pending.self_type.clone());
        }
        let mut qualified = pending.module.clone();
        qualified.push(pending.self_type.clone());
        let qualified = qualified.join("::");
        if self.types.contains_key(&qualified) {
            return Some(qualified);
        }
        let short = generics::short_name(&pending.self_type);
        self.types
            .values()
            .find(|d| d.short_name == short)
            .map(|d| d.name.clone())
    }
}

impl<'ast> Visit<'ast> for RustTypeCollector {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.module_path.push(node.ident.to_string());
        visit::visit_item_mod(self, node);
        self.module_path.pop();
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        let mut descriptor = TypeDescriptor::new(self.qualify(&node.ident), TypeKind::Class);
        descriptor.short_name = node.ident.to_string();
        descriptor.generic_params = type_params(&node.generics);
        descriptor.annotations = annotations(&node.attrs);
        descriptor.doc = doc_comment(&node.attrs);

        if let syn::Fields::Named(named) = &node.fields {
            for field in &named.named {
                let Some(ident) = &field.ident else { continue };
                let mut descriptor_field = FieldDescriptor::new(ident.to_string(), type_text(&field.ty));
                descriptor_field.modifiers = Modifiers {
                    private: !matches!(field.vis, syn::Visibility::Public(_)),
                    is_static: false,
                };
                descriptor_field.annotations = annotations(&field.attrs);
                descriptor_field.doc = doc_comment(&field.attrs);
                descriptor.fields.push(descriptor_field);
            }
        }
        self.register(descriptor);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        let mut descriptor = TypeDescriptor::new(self.qualify(&node.ident), TypeKind::Enum);
        descriptor.short_name = node.ident.to_string();
        descriptor.annotations = annotations(&node.attrs);
        descriptor.doc = doc_comment(&node.attrs);
        descriptor.constants = node
            .variants
            .iter()
            .map(|variant| {
                let renamed = annotations(&variant.attrs)
                    .into_iter()
                    .find(|a| a.is("JsonProperty"))
                    .and_then(|a| a.value("value").map(str::to_string));
                ConstantDescriptor {
                    name: renamed.unwrap_or_else(|| variant.ident.to_string()),
                    description: doc_comment(&variant.attrs).title().map(str::to_string),
                }
            })
            .collect();
        self.register(descriptor);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let mut descriptor = TypeDescriptor::new(self.qualify(&node.ident), TypeKind::Interface);
        descriptor.short_name = node.ident.to_string();
        descriptor.generic_params = type_params(&node.generics);
        descriptor.annotations = annotations(&node.attrs);
        descriptor.doc = doc_comment(&node.attrs);
        descriptor.supertypes = node
            .supertraits
            .iter()
            .filter_map(|bound| match bound {
                syn::TypeParamBound::Trait(trait_bound) => Some(path_text(&trait_bound.path)),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .collect();

        for item in &node.items {
            if let syn::TraitItem::Fn(method) = item {
                descriptor.methods.push(method_descriptor(&method.sig, &method.attrs, false));
            }
        }
        self.register(descriptor);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let self_type = generics::raw_name(&type_text(&node.self_ty));
        if self_type.is_empty() {
            return;
        }
        let trait_name = node.trait_.as_ref().map(|(_, path, _)| path_text(path));
        let is_trait_impl = trait_name.is_some();

        let methods = node
            .items
            .iter()
            .filter_map(|item| match item {
                syn::ImplItem::Fn(method) => {
                    let private = !is_trait_impl && !matches!(method.vis, syn::Visibility::Public(_));
                    Some(method_descriptor(&method.sig, &method.attrs, private))
                }
                _ => None,
            })
            .collect();

        self.impls.push(PendingImpl {
            module: self.module_path.clone(),
            self_type,
            trait_name,
            methods,
        });
    }
}

fn type_params(generics: &syn::Generics) -> Vec<String> {
    generics
        .type_params()
        .map(|param| param.ident.to_string())
        .collect()
}

fn method_descriptor(sig: &syn::Signature, attrs: &[Attribute], private: bool) -> MethodDescriptor {
    let return_type = match &sig.output {
        syn::ReturnType::Default => "void".to_string(),
        syn::ReturnType::Type(_, ty) => type_text(ty),
    };
    let mut method = MethodDescriptor::new(sig.ident.to_string(), return_type);
    method.annotations = annotations(attrs);
    method.doc = doc_comment(attrs);

    let mut has_receiver = false;
    for (index, input) in sig.inputs.iter().enumerate() {
        match input {
            syn::FnArg::Receiver(_) => has_receiver = true,
            syn::FnArg::Typed(pat_type) => {
                let name = pattern_name(&pat_type.pat).unwrap_or_else(|| format!("arg{}", index));
                let mut param = ParameterDescriptor::new(name, type_text(&pat_type.ty));
                param.annotations = annotations(&pat_type.attrs);
                method.parameters.push(param);
            }
        }
    }
    method.modifiers = Modifiers {
        private,
        is_static: !has_receiver,
    };
    method.signature = signature_text(&method);
    method
}

fn signature_text(method: &MethodDescriptor) -> String {
    let params: Vec<String> = method
        .parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.type_name))
        .collect();
    if method.returns_void() {
        format!("fn {}({})", method.name, params.join(", "))
    } else {
        format!("fn {}({}) -> {}", method.name, params.join(", "), method.return_type)
    }
}

/// First binding in a parameter pattern, so `Path(id): Path<u64>` yields `id`.
fn pattern_name(pat: &syn::Pat) -> Option<String> {
    match pat {
        syn::Pat::Ident(ident) => Some(ident.ident.to_string()),
        syn::Pat::TupleStruct(tuple) => tuple.elems.iter().find_map(pattern_name),
        syn::Pat::Tuple(tuple) => tuple.elems.iter().find_map(pattern_name),
        syn::Pat::Struct(pat_struct) => pat_struct.fields.iter().find_map(|f| pattern_name(&f.pat)),
        syn::Pat::Reference(reference) => pattern_name(&reference.pat),
        syn::Pat::Type(pat_type) => pattern_name(&pat_type.pat),
        _ => None,
    }
}

/// Canonical text of a type reference.
///
/// Transparent wrappers and references are unwrapped, slices and arrays become `T[]`,
/// the unit type becomes `void`. Anything without a usable name becomes empty text.
pub fn type_text(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(type_path) => {
            if let Some(last) = type_path.path.segments.last() {
                if TRANSPARENT_WRAPPERS.contains(&last.ident.to_string().as_str()) {
                    if let Some(inner) = first_type_argument(&last.arguments) {
                        return type_text(inner);
                    }
                }
            }
            path_text(&type_path.path)
        }
        syn::Type::Reference(reference) => type_text(&reference.elem),
        syn::Type::Slice(slice) => array_text(&slice.elem),
        syn::Type::Array(array) => array_text(&array.elem),
        syn::Type::Tuple(tuple) if tuple.elems.is_empty() => "void".to_string(),
        syn::Type::Paren(paren) => type_text(&paren.elem),
        syn::Type::Group(group) => type_text(&group.elem),
        syn::Type::ImplTrait(impl_trait) => first_bound_text(&impl_trait.bounds),
        syn::Type::TraitObject(object) => first_bound_text(&object.bounds),
        _ => String::new(),
    }
}

fn array_text(elem: &syn::Type) -> String {
    let component = type_text(elem);
    if component.is_empty() {
        String::new()
    } else {
        format!("{}[]", component)
    }
}

fn first_bound_text(bounds: &Punctuated<syn::TypeParamBound, Token![+]>) -> String {
    bounds
        .iter()
        .find_map(|bound| match bound {
            syn::TypeParamBound::Trait(trait_bound) => Some(path_text(&trait_bound.path)),
            _ => None,
        })
        .unwrap_or_default()
}

fn first_type_argument(arguments: &syn::PathArguments) -> Option<&syn::Type> {
    match arguments {
        syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

/// `crate::model::Page<User>` becomes `model::Page<User>`.
pub fn path_text(path: &syn::Path) -> String {
    let segments: Vec<&syn::PathSegment> = path
        .segments
        .iter()
        .skip_while(|segment| RELATIVE_PREFIXES.contains(&segment.ident.to_string().as_str()))
        .collect();
    let Some((last, init)) = segments.split_last() else {
        return String::new();
    };

    let mut text: Vec<String> = init.iter().map(|s| s.ident.to_string()).collect();
    let mut last_text = last.ident.to_string();
    if let syn::PathArguments::AngleBracketed(args) = &last.arguments {
        let type_args: Vec<String> = args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(type_text(ty)),
                _ => None,
            })
            .collect();
        if !type_args.is_empty() {
            last_text = format!("{}<{}>", last_text, type_args.join(", "));
        }
    }
    text.push(last_text);
    text.join("::")
}

/// `get_mapping` becomes `GetMapping`.
fn pascal_case(ident: &str) -> String {
    ident
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn doc_comment(attrs: &[Attribute]) -> DocComment {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(text) => Some(text.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect();
    DocComment::parse(&lines.join("\n"))
}

/// Attributes other than docs, derives and lint/cfg controls, as annotations.
fn annotations(attrs: &[Attribute]) -> Vec<Annotation> {
    let mut result = Vec::new();
    for attr in attrs {
        let Some(ident) = attr.path().segments.last().map(|s| s.ident.to_string()) else {
            continue;
        };
        match ident.as_str() {
            "doc" | "derive" | "cfg" | "cfg_attr" | "allow" | "warn" | "deny" | "must_use" => {}
            "serde" => result.extend(serde_annotations(attr)),
            _ => {
                let mut annotation = Annotation::new(pascal_case(&ident));
                read_arguments(attr, &mut annotation);
                result.push(annotation);
            }
        }
    }
    result
}

fn read_arguments(attr: &Attribute, annotation: &mut Annotation) {
    match &attr.meta {
        Meta::Path(_) => {}
        Meta::NameValue(name_value) => {
            for value in expr_values(&name_value.value) {
                annotation.push("value", value);
            }
        }
        Meta::List(_) => {
            let parsed = attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated);
            match parsed {
                Ok(args) => {
                    for arg in args {
                        match arg {
                            Expr::Assign(assign) => {
                                let key = expr_key(&assign.left);
                                for value in expr_values(&assign.right) {
                                    annotation.push(&key, value);
                                }
                            }
                            other => {
                                for value in expr_values(&other) {
                                    annotation.push("value", value);
                                }
                            }
                        }
                    }
                }
                Err(e) => debug!("Unparsed arguments on #[{}]: {}", annotation.name, e),
            }
        }
    }
}

fn expr_key(expr: &Expr) -> String {
    match expr {
        Expr::Path(path) => path
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn expr_values(expr: &Expr) -> Vec<String> {
    match expr {
        Expr::Lit(lit) => lit_text(&lit.lit).into_iter().collect(),
        Expr::Array(array) => array.elems.iter().flat_map(expr_values).collect(),
        Expr::Path(path) => path
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .into_iter()
            .collect(),
        Expr::Reference(reference) => expr_values(&reference.expr),
        Expr::Group(group) => expr_values(&group.expr),
        _ => Vec::new(),
    }
}

fn lit_text(lit: &Lit) -> Option<String> {
    match lit {
        Lit::Str(text) => Some(text.value()),
        Lit::Bool(flag) => Some(flag.value.to_string()),
        Lit::Int(int) => Some(int.base10_digits().to_string()),
        Lit::Float(float) => Some(float.base10_digits().to_string()),
        Lit::Char(ch) => Some(ch.value().to_string()),
        _ => None,
    }
}

/// `#[serde(rename = "x")]` and `#[serde(skip)]` in annotation form.
fn serde_annotations(attr: &Attribute) -> Vec<Annotation> {
    let mut result = Vec::new();
    let parsed = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("rename") {
            let value: syn::LitStr = meta.value()?.parse()?;
            result.push(Annotation::new("JsonProperty").with("value", &value.value()));
        } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
            result.push(Annotation::new("JsonIgnore"));
        } else if meta.input.peek(Token![=]) {
            let _: Expr = meta.value()?.parse()?;
        } else if meta.input.peek(syn::token::Paren) {
            let _content;
            syn::parenthesized!(_content in meta.input);
        }
        Ok(())
    });
    if let Err(e) = parsed {
        debug!("Unparsed arguments on #[serde]: {}", e);
    }
    result
}
