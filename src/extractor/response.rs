//! Response schema of an endpoint method.

use log::debug;

use crate::custom::{stamp_date, DateContext};
use crate::descriptor::{DocComment, MethodDescriptor};
use crate::generics;
use crate::metadata;
use crate::model::Property;
use crate::resolver::{Context, SchemaResolver};

/// Binary payloads are never wrapped.
const BYTE_TYPES: &[&str] = &["byte[]", "Byte[]", "u8[]", "Vec<u8>", "Bytes", "bytes::Bytes"];

pub struct ResponseExtractor<'a> {
    ctx: &'a Context<'a>,
}

impl<'a> ResponseExtractor<'a> {
    pub fn new(ctx: &'a Context<'a>) -> Self {
        Self { ctx }
    }

    /// `None` when the method returns nothing.
    pub fn extract(&self, method: &MethodDescriptor) -> Option<Property> {
        let declared = linked_return_type(&method.doc).unwrap_or_else(|| method.return_type.clone());
        let type_text = self.response_type(&declared)?;

        let mut property = SchemaResolver::response(self.ctx).resolve_root(&type_text)?;
        property.description = Some(match property.values.as_deref() {
            Some(values) if !values.is_empty() => metadata::values_text(values),
            _ => generics::short_name(&type_text).to_string(),
        });
        stamp_date(&mut property, self.ctx.source, self.ctx.config, &type_text, method, DateContext::Json);
        self.ctx.mocks.apply(&mut property, None);
        Some(property)
    }

    /// Type text to document: unwrapped through the configured unwrap types, or
    /// wrapped in the configured wrapper type.
    pub fn response_type(&self, declared: &str) -> Option<String> {
        let declared = declared.trim();
        if generics::is_void(declared) {
            return None;
        }

        let mut text = declared.to_string();
        let mut unwrapped = false;
        loop {
            let (raw, args) = generics::split_type_and_generics(&text);
            if !self.ctx.source.matches_any(&self.ctx.config.return_unwrap_types, &raw) {
                break;
            }
            let Some(inner) = args
                .as_deref()
                .map(generics::split_generic_parameters)
                .and_then(|params| params.into_iter().next())
            else {
                break;
            };
            debug!("Unwrapping {} to {}", raw, inner);
            text = inner;
            unwrapped = true;
        }
        if generics::is_void(&text) {
            return None;
        }

        if !unwrapped {
            if let Some(wrapper) = self.wrapper_for(&text) {
                text = format!("{}<{}>", wrapper, text);
            }
        }
        Some(text)
    }

    fn wrapper_for(&self, text: &str) -> Option<String> {
        let wrapper = self
            .ctx
            .config
            .return_wrap_type
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())?;
        if BYTE_TYPES.contains(&text) {
            return None;
        }
        let raw = generics::raw_name(text);
        if raw == wrapper || generics::short_name(&raw) == generics::short_name(wrapper) {
            return None;
        }
        Some(wrapper.to_string())
    }
}

/// Target of `@return {@link X}`.
fn linked_return_type(doc: &DocComment) -> Option<String> {
    let text = doc.tag("return")?;
    let start = text.find("{@link")? + "{@link".len();
    let rest = &text[start..];
    let end = rest.find('}')?;
    rest[..end]
        .split_whitespace()
        .next()
        .map(|target| target.trim_end_matches('#').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::model::DataType;
    use crate::notify::CollectingNotifier;
    use crate::source::catalog::TypeCatalog;
    use crate::source::rust::catalog_from_syntax;

    fn catalog() -> TypeCatalog {
        catalog_from_syntax(
            &syn::parse_file(
                r#"
                pub struct User { pub id: u64 }
                pub struct ApiResult<T> { pub code: i32, pub data: T }
                pub enum Level { Low, High }
                "#,
            )
            .unwrap(),
        )
    }

    fn config(wrap: Option<&str>) -> ExtractorConfig {
        ExtractorConfig {
            mock_enabled: false,
            return_wrap_type: wrap.map(str::to_string),
            ..Default::default()
        }
    }

    fn response_type(config: &ExtractorConfig, declared: &str) -> Option<String> {
        let catalog = catalog();
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, config, &notifier);
        ResponseExtractor::new(&ctx).response_type(declared)
    }

    #[test]
    fn test_unwrap_is_repeated() {
        let config = config(None);
        assert_eq!(
            response_type(&config, "Result<Json<User>, AppError>").as_deref(),
            Some("User")
        );
        assert_eq!(
            response_type(&config, "org.springframework.http.ResponseEntity<java.util.List<User>>").as_deref(),
            Some("java.util.List<User>")
        );
        assert_eq!(response_type(&config, "ResponseEntity<Void>"), None);
        assert_eq!(response_type(&config, "void"), None);
    }

    #[test]
    fn test_wrap_rules() {
        let config = config(Some("ApiResult"));
        assert_eq!(response_type(&config, "User").as_deref(), Some("ApiResult<User>"));
        assert_eq!(response_type(&config, "ApiResult<User>").as_deref(), Some("ApiResult<User>"));
        assert_eq!(response_type(&config, "u8[]").as_deref(), Some("u8[]"));
        assert_eq!(response_type(&config, "Json<User>").as_deref(), Some("User"));
        assert_eq!(response_type(&config, "()"), None);
    }

    #[test]
    fn test_project_wrapper_named_like_an_unwrap_type_is_documented() {
        let catalog = catalog_from_syntax(
            &syn::parse_file("pub struct Json<T> { pub data: T }").unwrap(),
        );
        let config = config(None);
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);
        let extractor = ResponseExtractor::new(&ctx);
        assert_eq!(extractor.response_type("Json<String>").as_deref(), Some("Json<String>"));
        assert_eq!(extractor.response_type("axum::Json<String>").as_deref(), Some("String"));
    }

    #[test]
    fn test_extract_resolves_and_describes() {
        let catalog = catalog();
        let config = config(Some("ApiResult"));
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);
        let extractor = ResponseExtractor::new(&ctx);

        let method = MethodDescriptor::new("get", "User");
        let response = extractor.extract(&method).unwrap();
        assert_eq!(response.description.as_deref(), Some("ApiResult"));
        let data = &response.properties.as_ref().unwrap()["data"];
        assert!(data.properties.as_ref().unwrap().contains_key("id"));

        let level = extractor.extract(&MethodDescriptor::new("level", "Json<Level>")).unwrap();
        assert_eq!(level.data_type, DataType::String);
        assert_eq!(level.description.as_deref(), Some("Low, High"));

        assert!(extractor.extract(&MethodDescriptor::new("delete", "void")).is_none());
    }

    #[test]
    fn test_return_link_overrides_declared_type() {
        let catalog = catalog();
        let config = config(None);
        let notifier = CollectingNotifier::new();
        let ctx = Context::new(&catalog, &config, &notifier);

        let mut method = MethodDescriptor::new("raw", "serde_json::Value");
        method.doc = DocComment::parse("@return the user {@link User}");
        assert_eq!(linked_return_type(&method.doc).as_deref(), Some("User"));
        let response = ResponseExtractor::new(&ctx).extract(&method).unwrap();
        assert!(response.properties.unwrap().contains_key("id"));
    }
}
