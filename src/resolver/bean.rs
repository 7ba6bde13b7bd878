//! Field expansion of object types.

use indexmap::IndexMap;
use log::debug;

use super::{Chain, ResolveMode, SchemaResolver};
use crate::config::BeanCustom;
use crate::custom::{self, Overlay};
use crate::descriptor::{Annotated, Annotation, DocComment, TypeDescriptor};
use crate::generics;
use crate::metadata;
use crate::model::Property;

/// How members of a type are discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldStrategy {
    /// `get*`/`is*` accessor methods, for contract types and configured bases.
    Accessors,
    /// Declared non-static fields.
    DeclaredFields,
}

/// A field or an accessor, seen the same way.
struct Member {
    declared_name: String,
    type_text: String,
    annotations: Vec<Annotation>,
    doc: DocComment,
    default_value: Option<String>,
}

impl Annotated for Member {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl SchemaResolver<'_> {
    pub(crate) fn field_strategy(&self, descriptor: &TypeDescriptor) -> FieldStrategy {
        let source = self.ctx.source;
        let accessor_base = self
            .ctx
            .config
            .accessor_base_types
            .iter()
            .any(|base| source.is_inheritor(descriptor, base));
        if descriptor.is_interface() || accessor_base {
            FieldStrategy::Accessors
        } else {
            FieldStrategy::DeclaredFields
        }
    }

    /// Properties of an object type, `@see` references merged first.
    pub(super) fn expand_bean(
        &self,
        raw: &str,
        descriptor: &TypeDescriptor,
        bindings: &IndexMap<String, String>,
        chain: &Chain,
    ) -> IndexMap<String, Property> {
        let inner = chain.with(&descriptor.name);
        let mut properties = IndexMap::new();
        self.merge_see_references(raw, descriptor, &inner, &mut properties);

        let bean = self.ctx.config.bean(raw, Some(descriptor));
        let strategy = self.field_strategy(descriptor);
        debug!("Expanding {} with {:?}", descriptor.name, strategy);

        for member in self.members(descriptor, strategy) {
            if let Some(bean) = bean {
                if !bean.is_need_handle_field(&member.declared_name) {
                    continue;
                }
            }
            if metadata::is_ignored(&member, &member.doc) {
                continue;
            }
            let type_text = generics::substitute_generics(&member.type_text, bindings);
            let Some(mut property) = self.resolve(&type_text, &inner) else {
                continue;
            };
            self.describe_member(&mut property, &member, &type_text);
            if let Some(bean) = bean {
                apply_field_custom(&mut property, &member.declared_name, bean);
            }
            properties.insert(property.name.clone(), property);
        }
        properties
    }

    fn members(&self, descriptor: &TypeDescriptor, strategy: FieldStrategy) -> Vec<Member> {
        let source = self.ctx.source;
        match strategy {
            FieldStrategy::DeclaredFields => source
                .all_fields(descriptor)
                .into_iter()
                .filter(|field| !field.modifiers.is_static)
                .map(|field| Member {
                    declared_name: field.name,
                    type_text: field.type_name,
                    annotations: field.annotations,
                    doc: field.doc,
                    default_value: field.default_value,
                })
                .collect(),
            FieldStrategy::Accessors => source
                .all_methods(descriptor)
                .into_iter()
                .filter(|method| {
                    method.parameters.is_empty() && !method.modifiers.is_static && !method.returns_void()
                })
                .filter_map(|method| {
                    let declared_name = accessor_property_name(&method.name)?;
                    Some(Member {
                        declared_name,
                        type_text: method.return_type,
                        annotations: method.annotations,
                        doc: method.doc,
                        default_value: None,
                    })
                })
                .collect(),
        }
    }

    fn describe_member(&self, property: &mut Property, member: &Member, type_text: &str) {
        let config = self.ctx.config;
        property.name = metadata::member_name(member, &member.declared_name);

        let values = property
            .values
            .clone()
            .or_else(|| property.items.as_ref().and_then(|items| items.values.clone()));
        let description = metadata::member_description(member, &member.doc);
        property.description = metadata::describe_with_values(description.as_deref(), values.as_deref());
        property.values = values;
        property.required = metadata::is_required(member, config);
        property.deprecated = metadata::is_deprecated(member, &member.doc);
        if self.mode == ResolveMode::Request {
            property.default_value = metadata::default_value(member.default_value.as_deref(), &member.doc);
        }
        custom::stamp_date(property, self.ctx.source, config, type_text, member, self.date_context);
        self.ctx.mocks.apply(property, member.doc.tag("mock"));
    }

    /// Each `@see X` on the type contributes the properties of `X` when `X` is the type
    /// itself, an ancestor or a descendant. Anything else is reported and skipped.
    fn merge_see_references(
        &self,
        raw: &str,
        descriptor: &TypeDescriptor,
        inner: &Chain,
        properties: &mut IndexMap<String, Property>,
    ) {
        let source = self.ctx.source;
        for tag in descriptor.doc.tags_named("see") {
            let reference = tag.value.trim();
            if reference.is_empty() {
                continue;
            }
            let related = source.find_type(reference).filter(|target| {
                source.is_inheritor(target, &descriptor.name) || source.is_inheritor(descriptor, &target.name)
            });
            let Some(target) = related else {
                self.ctx
                    .notifier
                    .warn("Parse skipped", &format!("{} @see {}", raw, reference));
                continue;
            };
            if let Some(resolved) = self.resolve(&target.name, inner) {
                if let Some(referenced) = resolved.properties {
                    properties.extend(referenced);
                }
            }
        }
    }
}

/// `getUserName` gives `userName`, `is_active` gives `active`.
fn accessor_property_name(method_name: &str) -> Option<String> {
    let rest = ["get", "is"]
        .iter()
        .find_map(|prefix| method_name.strip_prefix(prefix))?;
    let rest = match rest.strip_prefix('_') {
        Some(snake) => snake,
        None if rest.starts_with(char::is_uppercase) => rest,
        None => return None,
    };
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

fn apply_field_custom(property: &mut Property, declared_name: &str, bean: &BeanCustom) {
    let custom = bean
        .fields
        .get(declared_name)
        .or_else(|| bean.fields.get(&property.name));
    if let Some(custom) = custom {
        property.overlay(custom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::model::DataType;
    use crate::notify::CollectingNotifier;
    use crate::resolver::Context;
    use crate::source::catalog::TypeCatalog;
    use crate::source::rust::catalog_from_syntax;
    use crate::source::TypeSource;

    fn catalog(code: &str) -> TypeCatalog {
        catalog_from_syntax(&syn::parse_file(code).unwrap())
    }

    fn keys(property: &Property) -> Vec<String> {
        property
            .properties
            .as_ref()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_accessor_property_name() {
        assert_eq!(accessor_property_name("getUserName").as_deref(), Some("userName"));
        assert_eq!(accessor_property_name("isActive").as_deref(), Some("active"));
        assert_eq!(accessor_property_name("get_name").as_deref(), Some("name"));
        assert_eq!(accessor_property_name("is_active").as_deref(), Some("active"));
        assert_eq!(accessor_property_name("get").as_deref(), None);
        assert_eq!(accessor_property_name("issue").as_deref(), None);
        assert_eq!(accessor_property_name("getter").as_deref(), None);
        assert_eq!(accessor_property_name("name").as_deref(), None);
    }

    #[test]
    fn test_interfaces_use_accessors() {
        let catalog = catalog(
            "pub trait Profile {
                 /// Shown name
                 fn get_name(&self) -> String;
                 fn is_active(&self) -> bool;
                 fn get_by_id(&self, id: u64) -> String;
                 fn reset(&self);
                 fn get_default() -> String;
             }",
        );
        let config = ExtractorConfig {
            mock_enabled: false,
            ..Default::default()
        };
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);
        let resolver = SchemaResolver::response(&ctx);

        let profile = catalog.find_type("Profile").unwrap();
        assert_eq!(resolver.field_strategy(profile), FieldStrategy::Accessors);
        let property = resolver.resolve_root("Profile").unwrap();
        assert_eq!(keys(&property), vec!["name", "active"]);
        let fields = property.properties.as_ref().unwrap();
        assert_eq!(fields["name"].description.as_deref(), Some("Shown name"));
        assert_eq!(fields["active"].data_type, DataType::Boolean);
    }

    #[test]
    fn test_accessor_base_types_switch_strategy() {
        let catalog = catalog(
            "pub trait Orm {}
             pub struct Record { pub hidden: u64 }
             impl Record { pub fn get_title(&self) -> String { String::new() } }
             impl Orm for Record {}",
        );
        let config = ExtractorConfig {
            accessor_base_types: vec!["Orm".to_string()],
            mock_enabled: false,
            ..Default::default()
        };
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);
        let property = SchemaResolver::response(&ctx).resolve_root("Record").unwrap();
        assert_eq!(keys(&property), vec!["title"]);
    }

    #[test]
    fn test_field_metadata_and_modes() {
        let catalog = catalog(
            r#"
            pub struct Query {
                /// Page size
                /// @default 20
                /// @mock @natural(1, 100)
                #[not_null]
                pub size: u32,
                #[serde(rename = "createdAt")]
                #[json_format(pattern = "yyyy-MM-dd")]
                pub created: chrono::NaiveDateTime,
                #[deprecated]
                pub legacy: String,
                #[serde(skip)]
                pub internal: String,
            }
            "#,
        );
        let config = ExtractorConfig::default();
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);

        let request = SchemaResolver::request(&ctx).resolve_root("Query").unwrap();
        assert_eq!(keys(&request), vec!["size", "createdAt", "legacy"]);
        let fields = request.properties.as_ref().unwrap();
        let size = &fields["size"];
        assert!(size.required);
        assert_eq!(size.default_value.as_deref(), Some("20"));
        assert_eq!(size.mock.as_deref(), Some("@natural(1, 100)"));
        assert_eq!(size.description.as_deref(), Some("Page size"));
        assert_eq!(fields["createdAt"].date_format.as_deref(), Some("yyyy-MM-dd"));
        assert_eq!(fields["createdAt"].mock.as_deref(), Some("@datetime"));
        assert!(fields["legacy"].deprecated);

        let response = SchemaResolver::response(&ctx).resolve_root("Query").unwrap();
        assert_eq!(response.properties.as_ref().unwrap()["size"].default_value, None);
    }

    #[test]
    fn test_see_reference_merges_related_types() {
        let catalog = catalog(
            "/// Base view
             /// @see Detail
             pub trait Summary { fn get_id(&self) -> u64; }

             pub struct Detail { pub id: u64, pub body: String }
             impl Summary for Detail { fn get_id(&self) -> u64 { self.id } }",
        );
        let config = ExtractorConfig {
            mock_enabled: false,
            ..Default::default()
        };
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);
        let summary = SchemaResolver::response(&ctx).resolve_root("Summary").unwrap();
        assert_eq!(keys(&summary), vec!["id", "body"]);
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_see_ancestor_merges_first_and_own_fields_win() {
        let catalog = catalog(
            "pub trait Summary {
                 /// Summary id
                 fn get_id(&self) -> u64;
                 /// Short code
                 fn get_code(&self) -> String;
             }

             /// @see Summary
             pub struct Detail {
                 /// Detail id
                 pub id: u64,
                 pub body: String,
             }
             impl Summary for Detail {
                 fn get_id(&self) -> u64 { self.id }
                 fn get_code(&self) -> String { String::new() }
             }",
        );
        let config = ExtractorConfig {
            mock_enabled: false,
            ..Default::default()
        };
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);
        let detail = SchemaResolver::response(&ctx).resolve_root("Detail").unwrap();

        assert_eq!(keys(&detail), vec!["id", "code", "body"]);
        let properties = detail.properties.as_ref().unwrap();
        assert_eq!(properties["id"].description.as_deref(), Some("Detail id"));
        assert_eq!(properties["code"].description.as_deref(), Some("Short code"));
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_unrelated_see_reference_is_reported() {
        let catalog = catalog(
            "/// @see Other
             /// @see Missing
             /// @see Looped
             pub struct Looped { pub id: u64 }
             pub struct Other { pub name: String }",
        );
        let config = ExtractorConfig::default();
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);
        let looped = SchemaResolver::response(&ctx).resolve_root("Looped").unwrap();
        assert_eq!(keys(&looped), vec!["id"]);

        let warnings = notifier.warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0], ("Parse skipped".to_string(), "Looped @see Other".to_string()));
        assert_eq!(warnings[1].1, "Looped @see Missing");
    }
}
