//! Extraction settings and user customizations.
//!
//! Loaded from a YAML or JSON file; every field has a default so an empty file is a
//! valid configuration.

use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::model::{DataType, HttpMethod};

/// Per-field override. Unset (or empty) parts leave the resolved value alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyCustom {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub data_type: Option<DataType>,
    pub required: Option<bool>,
    pub deprecated: Option<bool>,
    pub default_value: Option<String>,
    pub example: Option<String>,
    pub mock: Option<String>,
    pub date_format: Option<String>,
}

/// Per-type customization, keyed by qualified type name in [`ExtractorConfig::beans`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeanCustom {
    pub includes: IndexSet<String>,
    pub excludes: IndexSet<String>,
    pub fields: IndexMap<String, PropertyCustom>,
}

impl BeanCustom {
    /// With `includes` set only listed fields are kept, otherwise `excludes` drop fields.
    pub fn is_need_handle_field(&self, field: &str) -> bool {
        if !self.includes.is_empty() {
            return self.includes.contains(field);
        }
        !self.excludes.contains(field)
    }
}

/// Api-level override, keyed `"METHOD /path"` or `"/path"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCustom {
    pub category: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<bool>,
    pub tags: Vec<String>,
}

/// Mock expression chosen by property type and name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MockRule {
    /// Schema type label (`string`, `integer`, ...); absent matches any type.
    #[serde(rename = "type")]
    pub data_type: Option<String>,
    /// Regular expression matched against the property name.
    pub pattern: String,
    pub mock: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub beans: IndexMap<String, BeanCustom>,
    pub apis: IndexMap<String, ApiCustom>,
    /// Extra scalar mappings: type name to schema type label.
    pub types: IndexMap<String, String>,
    pub date_time_format_mvc: Option<String>,
    pub date_time_format_json: Option<String>,
    pub date_types: Vec<String>,
    pub parameter_ignore_types: Vec<String>,
    pub return_unwrap_types: Vec<String>,
    pub return_wrap_type: Option<String>,
    pub mock_rules: Vec<MockRule>,
    pub mock_enabled: bool,
    pub controller_annotations: Vec<String>,
    pub collection_types: Vec<String>,
    pub map_types: Vec<String>,
    pub top_types: Vec<String>,
    pub accessor_base_types: Vec<String>,
    pub required_annotations: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            beans: IndexMap::new(),
            apis: IndexMap::new(),
            types: IndexMap::new(),
            date_time_format_mvc: Some("yyyy-MM-dd HH:mm:ss".to_string()),
            date_time_format_json: Some("yyyy-MM-dd HH:mm:ss".to_string()),
            date_types: strings(&[
                "java.util.Date",
                "java.sql.Date",
                "java.sql.Timestamp",
                "java.time.LocalDate",
                "java.time.LocalDateTime",
                "java.time.LocalTime",
                "java.time.ZonedDateTime",
                "java.time.OffsetDateTime",
                "java.time.Instant",
                "chrono::NaiveDate",
                "chrono::NaiveDateTime",
                "chrono::NaiveTime",
                "chrono::DateTime",
                "time::OffsetDateTime",
                "time::PrimitiveDateTime",
            ]),
            parameter_ignore_types: strings(&[
                "javax.servlet.http.HttpServletRequest",
                "javax.servlet.http.HttpServletResponse",
                "javax.servlet.http.HttpSession",
                "jakarta.servlet.http.HttpServletRequest",
                "jakarta.servlet.http.HttpServletResponse",
                "org.springframework.ui.Model",
                "org.springframework.ui.ModelMap",
                "org.springframework.validation.BindingResult",
                "org.springframework.web.context.request.WebRequest",
                "java.security.Principal",
                "java.util.Locale",
                "axum::extract::State",
                "axum::Extension",
                "actix_web::HttpRequest",
                "actix_web::web::Data",
            ]),
            return_unwrap_types: strings(&[
                "org.springframework.http.ResponseEntity",
                "org.springframework.web.context.request.async.DeferredResult",
                "java.util.concurrent.Callable",
                "java.util.concurrent.CompletableFuture",
                "reactor.core.publisher.Mono",
                "Result",
                "axum::Json",
                "actix_web::web::Json",
            ]),
            return_wrap_type: None,
            mock_rules: Vec::new(),
            mock_enabled: true,
            controller_annotations: strings(&["RestController", "Controller"]),
            collection_types: strings(&["java.util.Collection", "java.lang.Iterable", "Collection"]),
            map_types: strings(&["java.util.Map", "Map"]),
            top_types: strings(&["java.lang.Object", "serde_json::Value"]),
            accessor_base_types: Vec::new(),
            required_annotations: strings(&["NotNull", "NotBlank", "NotEmpty"]),
        }
    }
}

impl ExtractorConfig {
    /// Loads a configuration file, YAML unless the extension is `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Bean customization for a type, tried by the text as written, then the
    /// descriptor's full and short names.
    pub fn bean(&self, type_text: &str, descriptor: Option<&TypeDescriptor>) -> Option<&BeanCustom> {
        if let Some(bean) = self.beans.get(type_text) {
            return Some(bean);
        }
        let descriptor = descriptor?;
        self.beans
            .get(&descriptor.name)
            .or_else(|| self.beans.get(&descriptor.short_name))
    }

    /// Api customization for `"METHOD /path"`, falling back to `"/path"`.
    pub fn api(&self, method: HttpMethod, path: &str) -> Option<&ApiCustom> {
        self.apis
            .get(&format!("{} {}", method, path))
            .or_else(|| self.apis.get(path))
    }
}
