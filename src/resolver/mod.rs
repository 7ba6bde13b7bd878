//! Recursive type-to-schema resolution.
//!
//! [`SchemaResolver::resolve`] turns canonical type text such as
//! `Page<Map<String, User>>` into a [`Property`] tree. Object types are expanded at most
//! once per root-to-node path: the [`Chain`] records the types being expanded and a type
//! already on it becomes an object leaf with no properties. Sibling branches each get
//! their own chain, so a type reachable along two paths is expanded on both.

mod bean;

use log::debug;
use std::rc::Rc;

use crate::classifier::{ScalarTable, TypeClassifier};
use crate::config::ExtractorConfig;
use crate::custom::DateContext;
use crate::descriptor::TypeDescriptor;
use crate::generics;
use crate::mock::MockGenerator;
use crate::model::{DataType, Property, Value};
use crate::notify::Notifier;
use crate::source::TypeSource;

/// Map entries are documented as one synthetic child under this key.
pub const MAP_KEY: &str = "KEY";

/// Shared, read-only state for one extraction run.
pub struct Context<'a> {
    pub source: &'a dyn TypeSource,
    pub config: &'a ExtractorConfig,
    pub notifier: &'a dyn Notifier,
    pub scalars: ScalarTable,
    pub mocks: MockGenerator,
}

impl<'a> Context<'a> {
    pub fn new(source: &'a dyn TypeSource, config: &'a ExtractorConfig, notifier: &'a dyn Notifier) -> Self {
        Self {
            source,
            config,
            notifier,
            scalars: ScalarTable::from_config(config),
            mocks: MockGenerator::new(config, notifier),
        }
    }

    pub fn classifier(&self) -> TypeClassifier<'_> {
        TypeClassifier::new(self.source, self.config, &self.scalars)
    }
}

/// Whether a schema documents input or output. Defaults only appear in requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Request,
    Response,
}

/// Persistent list of type names being expanded on the current path.
///
/// Extending a chain never affects the chain it was built from.
#[derive(Debug, Clone, Default)]
pub struct Chain(Option<Rc<ChainNode>>);

#[derive(Debug)]
struct ChainNode {
    name: String,
    parent: Chain,
}

impl Chain {
    pub fn new() -> Self {
        Self(None)
    }

    pub fn with(&self, name: &str) -> Chain {
        Chain(Some(Rc::new(ChainNode {
            name: name.to_string(),
            parent: self.clone(),
        })))
    }

    pub fn contains(&self, name: &str) -> bool {
        let mut current = &self.0;
        while let Some(node) = current {
            if node.name == name {
                return true;
            }
            current = &node.parent.0;
        }
        false
    }

    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut current = &self.0;
        while let Some(node) = current {
            count += 1;
            current = &node.parent.0;
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

pub struct SchemaResolver<'a> {
    ctx: &'a Context<'a>,
    mode: ResolveMode,
    date_context: DateContext,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(ctx: &'a Context<'a>, mode: ResolveMode) -> Self {
        Self {
            ctx,
            mode,
            date_context: DateContext::Json,
        }
    }

    pub fn request(ctx: &'a Context<'a>) -> Self {
        Self::new(ctx, ResolveMode::Request)
    }

    pub fn response(ctx: &'a Context<'a>) -> Self {
        Self::new(ctx, ResolveMode::Response)
    }

    /// Date defaults for values that travel outside a JSON body.
    pub fn with_date_context(mut self, date_context: DateContext) -> Self {
        self.date_context = date_context;
        self
    }

    pub fn context(&self) -> &'a Context<'a> {
        self.ctx
    }

    /// Resolves from an empty chain.
    pub fn resolve_root(&self, type_text: &str) -> Option<Property> {
        self.resolve(type_text, &Chain::new())
    }

    /// `None` only for void types; anything unknown becomes an object leaf.
    pub fn resolve(&self, type_text: &str, chain: &Chain) -> Option<Property> {
        let text = type_text.trim();
        if text.is_empty() {
            return Some(Property::object());
        }
        if let Some(component) = generics::array_component(text) {
            let items = self.resolve(component, chain).unwrap_or_else(Property::object);
            return Some(Property::array(items));
        }

        let (raw, generic_args) = generics::split_type_and_generics(text);
        if generics::is_void(&raw) {
            return None;
        }
        if let Some(scalar) = self.ctx.scalars.lookup_exact(&raw) {
            return Some(Property::of_type(scalar));
        }

        let Some(descriptor) = self.ctx.source.find_type(&raw) else {
            if let Some(scalar) = self.ctx.scalars.lookup(&raw) {
                return Some(Property::of_type(scalar));
            }
            debug!("Unresolved type {}, documenting as object", raw);
            return Some(Property::object());
        };
        Some(self.resolve_descriptor(&raw, generic_args.as_deref(), descriptor, chain))
    }

    fn resolve_descriptor(
        &self,
        raw: &str,
        generic_args: Option<&str>,
        descriptor: &TypeDescriptor,
        chain: &Chain,
    ) -> Property {
        let classifier = self.ctx.classifier();
        let data_type = classifier.classify(descriptor);
        let values = enum_values(descriptor);

        if data_type == DataType::File {
            return Property::scalar(DataType::File);
        }

        if classifier.is_map(descriptor) || classifier.is_top(descriptor) {
            let mut property = Property::object();
            let params = generic_args
                .map(generics::split_generic_parameters)
                .unwrap_or_default();
            if let Some(value_type) = params.get(1) {
                if let Some(mut value) = self.resolve(value_type, chain) {
                    value.name = MAP_KEY.to_string();
                    if let Some(properties) = property.properties.as_mut() {
                        properties.insert(MAP_KEY.to_string(), value);
                    }
                }
            }
            return property;
        }

        match data_type {
            DataType::Array => {
                let element = match descriptor.component_type.as_deref() {
                    Some(component) => component.to_string(),
                    None => self.collection_element(descriptor, generic_args),
                };
                let items = self.resolve(&element, chain).unwrap_or_else(Property::object);
                Property::array(items)
            }
            DataType::Object => {
                if chain.contains(&descriptor.name) {
                    debug!("{} is already being expanded, leaving it as a leaf", descriptor.name);
                    return Property::object();
                }
                let bindings = generics::bind(&descriptor.generic_params, generic_args);
                let mut property = Property::object();
                property.properties = Some(self.expand_bean(raw, descriptor, &bindings, chain));
                property
            }
            scalar => {
                let mut property = Property::scalar(scalar);
                property.values = values;
                property
            }
        }
    }

    /// Element type of a collection: its first generic argument, or the argument a
    /// subclass binds in its hierarchy (`UserList extends ArrayList<User>`).
    fn collection_element(&self, descriptor: &TypeDescriptor, generic_args: Option<&str>) -> String {
        if let Some(first) = generic_args
            .map(generics::split_generic_parameters)
            .and_then(|params| params.into_iter().next())
        {
            return first;
        }
        self.ctx
            .source
            .ancestors(descriptor)
            .into_iter()
            .find_map(|(_, bindings)| bindings.into_values().next())
            .filter(|element| !descriptor.generic_params.contains(element))
            .unwrap_or_default()
    }
}

fn enum_values(descriptor: &TypeDescriptor) -> Option<Vec<Value>> {
    if !descriptor.is_enum() || descriptor.constants.is_empty() {
        return None;
    }
    Some(
        descriptor
            .constants
            .iter()
            .map(|c| Value::new(c.name.clone(), c.description.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BeanCustom, PropertyCustom};
    use crate::notify::CollectingNotifier;
    use crate::source::catalog::TypeCatalog;
    use crate::source::rust::catalog_from_syntax;

    fn catalog(code: &str) -> TypeCatalog {
        catalog_from_syntax(&syn::parse_file(code).unwrap())
    }

    fn no_mocks() -> ExtractorConfig {
        ExtractorConfig {
            mock_enabled: false,
            ..Default::default()
        }
    }

    fn resolve(catalog: &TypeCatalog, config: &ExtractorConfig, text: &str) -> Option<Property> {
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(catalog, config, &notifier);
        SchemaResolver::response(&ctx).resolve_root(text)
    }

    fn props(property: &Property) -> Vec<&str> {
        property
            .properties
            .as_ref()
            .map(|p| p.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_chain_is_persistent() {
        let root = Chain::new();
        let a = root.with("A");
        let ab = a.with("B");
        let ac = a.with("C");
        assert!(ab.contains("A") && ab.contains("B"));
        assert!(!ab.contains("C"));
        assert!(ac.contains("C") && !ac.contains("B"));
        assert_eq!(ab.len(), 2);
        assert!(root.is_empty());
    }

    #[test]
    fn test_empty_void_and_unknown() {
        let catalog = TypeCatalog::with_builtins();
        let config = no_mocks();
        let empty = resolve(&catalog, &config, "").unwrap();
        assert_eq!(empty.data_type, DataType::Object);
        assert!(!empty.required);
        assert_eq!(props(&empty).len(), 0);

        assert!(resolve(&catalog, &config, "void").is_none());
        assert!(resolve(&catalog, &config, "java.lang.Void").is_none());

        let unknown = resolve(&catalog, &config, "com.missing.Thing").unwrap();
        assert!(unknown.is_object_type());
        assert!(unknown.is_well_formed());
    }

    #[test]
    fn test_project_types_shadow_builtin_scalar_short_names() {
        let catalog = catalog(
            "pub struct File { pub name: String, pub size: u64 }
             pub struct Upload { pub file: File, pub raw: MultipartFile, pub at: Instant }",
        );
        let config = no_mocks();

        let file = resolve(&catalog, &config, "File").unwrap();
        assert_eq!(file.data_type, DataType::Object);
        assert_eq!(props(&file), vec!["name", "size"]);

        // Names no project type claims still reach the scalar table
        let upload = resolve(&catalog, &config, "Upload").unwrap();
        let properties = upload.properties.as_ref().unwrap();
        assert_eq!(properties["file"].data_type, DataType::Object);
        assert_eq!(properties["raw"].data_type, DataType::File);
        assert_eq!(properties["at"].data_type, DataType::String);
        assert_eq!(
            resolve(&catalog, &config, "java.io.File").unwrap().data_type,
            DataType::File
        );
    }

    #[test]
    fn test_self_reference_terminates() {
        let catalog = catalog("pub struct Node { pub value: i32, pub next: Option<Box<Node>>, pub children: Vec<Node> }");
        let node = resolve(&catalog, &no_mocks(), "Node").unwrap();
        assert_eq!(props(&node), vec!["value", "next", "children"]);

        let next = &node.properties.as_ref().unwrap()["next"];
        assert!(next.is_object_type());
        assert_eq!(props(next).len(), 0);

        let children = &node.properties.as_ref().unwrap()["children"];
        assert!(children.is_array_type());
        assert_eq!(props(children.items.as_ref().unwrap()).len(), 0);
        assert!(node.is_well_formed());
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let catalog = catalog(
            "pub struct Author { pub name: String, pub books: Vec<Book> }
             pub struct Book { pub title: String, pub author: Author }",
        );
        let author = resolve(&catalog, &no_mocks(), "Author").unwrap();
        let books = &author.properties.as_ref().unwrap()["books"];
        let book = books.items.as_ref().unwrap();
        assert_eq!(props(book), vec!["title", "author"]);
        let nested_author = &book.properties.as_ref().unwrap()["author"];
        assert_eq!(props(nested_author).len(), 0);
    }

    #[test]
    fn test_diamond_expands_on_both_paths() {
        let catalog = catalog(
            "pub struct Root { pub left: Left, pub right: Right }
             pub struct Left { pub shared: Shared }
             pub struct Right { pub shared: Shared }
             pub struct Shared { pub id: u64 }",
        );
        let root = resolve(&catalog, &no_mocks(), "Root").unwrap();
        let fields = root.properties.as_ref().unwrap();
        for side in ["left", "right"] {
            let shared = &fields[side].properties.as_ref().unwrap()["shared"];
            assert_eq!(props(shared), vec!["id"]);
        }
    }

    #[test]
    fn test_generics_collections_and_maps() {
        let catalog = catalog(
            "pub struct Page<T> { pub items: Vec<T>, pub total: u64, pub index: HashMap<String, T> }
             pub struct User { pub id: u64 }",
        );
        let page = resolve(&catalog, &no_mocks(), "Page<User>").unwrap();
        let fields = page.properties.as_ref().unwrap();

        let items = &fields["items"];
        assert!(items.is_array_type());
        assert_eq!(props(items.items.as_ref().unwrap()), vec!["id"]);
        assert_eq!(fields["total"].data_type, DataType::Integer);

        let index = &fields["index"];
        assert!(index.is_object_type());
        assert_eq!(props(index), vec![MAP_KEY]);
        assert_eq!(props(&index.properties.as_ref().unwrap()[MAP_KEY]), vec!["id"]);
    }

    #[test]
    fn test_arrays_and_top_types() {
        let catalog = TypeCatalog::with_builtins();
        let config = no_mocks();

        let bytes = resolve(&catalog, &config, "u8[]").unwrap();
        assert!(bytes.is_array_type());
        assert_eq!(bytes.items.as_ref().unwrap().data_type, DataType::Integer);

        let list = resolve(&catalog, &config, "java.util.List").unwrap();
        assert!(list.items.as_ref().unwrap().is_object_type());

        let object = resolve(&catalog, &config, "java.lang.Object").unwrap();
        assert!(object.is_object_type());
        assert_eq!(props(&object).len(), 0);

        let map = resolve(&catalog, &config, "java.util.Map<String, List<Long>>").unwrap();
        let value = &map.properties.as_ref().unwrap()[MAP_KEY];
        assert!(value.is_array_type());
        assert_eq!(value.items.as_ref().unwrap().data_type, DataType::Integer);
    }

    #[test]
    fn test_collection_subclass_element() {
        let mut catalog = catalog("pub struct User { pub id: u64 }");
        catalog.insert(
            TypeDescriptor::new("demo.UserList", crate::descriptor::TypeKind::Class)
                .with_supertype("java.util.ArrayList<User>"),
        );
        let list = resolve(&catalog, &no_mocks(), "demo.UserList").unwrap();
        assert!(list.is_array_type());
        assert_eq!(props(list.items.as_ref().unwrap()), vec!["id"]);
    }

    #[test]
    fn test_enum_values_and_description() {
        let catalog = catalog(
            "pub enum Status {
                 /// Usable
                 Active,
                 Locked,
             }
             pub struct Account {
                 /// Current state
                 pub status: Status,
             }",
        );
        let account = resolve(&catalog, &no_mocks(), "Account").unwrap();
        let status = &account.properties.as_ref().unwrap()["status"];
        assert_eq!(status.data_type, DataType::String);
        assert_eq!(status.values.as_ref().map(Vec::len), Some(2));
        assert_eq!(status.description.as_deref(), Some("Current state (Active: Usable, Locked)"));
    }

    #[test]
    fn test_customization_precedence() {
        let catalog = catalog(
            "pub struct User {
                 /// From source
                 pub name: String,
                 pub password: String,
                 pub email: String,
             }",
        );
        let mut config = no_mocks();
        let mut bean = BeanCustom::default();
        bean.excludes.insert("password".to_string());
        bean.fields.insert(
            "name".to_string(),
            PropertyCustom {
                description: Some("From config".to_string()),
                required: Some(true),
                ..Default::default()
            },
        );
        bean.fields.insert(
            "email".to_string(),
            PropertyCustom {
                description: Some(String::new()),
                mock: Some("@email".to_string()),
                ..Default::default()
            },
        );
        config.beans.insert("User".to_string(), bean);

        let user = resolve(&catalog, &config, "User").unwrap();
        let fields = user.properties.as_ref().unwrap();
        assert_eq!(props(&user), vec!["name", "email"]);
        assert_eq!(fields["name"].description.as_deref(), Some("From config"));
        assert!(fields["name"].required);
        assert_eq!(fields["email"].description, None);
        assert_eq!(fields["email"].mock.as_deref(), Some("@email"));
    }

    #[test]
    fn test_well_formed_for_every_catalog_type() {
        let catalog = catalog(
            "pub struct A { pub b: Vec<B>, pub m: HashMap<String, A> }
             pub struct B { pub a: Option<A>, pub tags: Vec<String> }
             pub enum E { X, Y }
             pub trait Shape { fn get_area(&self) -> f64; }",
        );
        let config = ExtractorConfig::default();
        let names: Vec<String> = catalog.types().map(|d| d.name.clone()).collect();
        for name in names {
            if let Some(property) = resolve(&catalog, &config, &name) {
                assert!(property.is_well_formed(), "{} is not well formed", name);
            }
        }
    }
}
