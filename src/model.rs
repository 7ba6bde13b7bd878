//! Output model: [`Api`] records and the [`Property`] schema tree they carry.
//!
//! These are the documents handed to a [`crate::publisher::Publisher`]. They serialize
//! to camelCase JSON/YAML and omit empty optional parts.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    #[default]
    Object,
    File,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Array => "array",
            DataType::Object => "object",
            DataType::File => "file",
        }
    }

    /// Parse a type label as written in configuration files.
    pub fn parse(text: &str) -> Option<DataType> {
        match text.trim().to_lowercase().as_str() {
            "string" => Some(DataType::String),
            "integer" => Some(DataType::Integer),
            "number" => Some(DataType::Number),
            "boolean" => Some(DataType::Boolean),
            "array" => Some(DataType::Array),
            "object" => Some(DataType::Object),
            "file" => Some(DataType::File),
            _ => None,
        }
    }

    /// Scalars carry neither `items` nor `properties`.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, DataType::Array | DataType::Object)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    Query,
    Path,
    Header,
    Body,
    Form,
}

/// Encoding of the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestBodyType {
    #[serde(rename = "form")]
    Form,
    #[serde(rename = "form-data")]
    FormData,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "raw")]
    Raw,
}

/// HTTP methods an endpoint may be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Accepts `GET`, `get`, `RequestMethod.GET` and `Method::GET`.
    pub fn parse(text: &str) -> Option<HttpMethod> {
        let last = text.rsplit(['.', ':']).next().unwrap_or(text);
        match last.trim().to_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    /// Whether requests with this method carry a body.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One statically known value of a property, e.g. an enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Value {
    pub fn new(value: impl Into<String>, description: Option<String>) -> Self {
        Self {
            value: value.into(),
            description,
        }
    }

    pub fn text(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => {
                format!("{}: {}", self.value, description)
            }
            _ => self.value.clone(),
        }
    }
}

/// A node in a schema tree.
///
/// `items` is present iff the type is `array`, `properties` iff it is `object`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterIn>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Property>>,
}

impl Property {
    /// An object node with no known fields.
    pub fn object() -> Self {
        Self {
            data_type: DataType::Object,
            properties: Some(IndexMap::new()),
            ..Default::default()
        }
    }

    pub fn scalar(data_type: DataType) -> Self {
        Self {
            data_type,
            ..Default::default()
        }
    }

    pub fn array(items: Property) -> Self {
        Self {
            data_type: DataType::Array,
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// A node of the given type with the minimal children its type demands.
    pub fn of_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Object => Self::object(),
            DataType::Array => Self::array(Self::object()),
            other => Self::scalar(other),
        }
    }

    pub fn is_object_type(&self) -> bool {
        self.data_type == DataType::Object
    }

    pub fn is_array_type(&self) -> bool {
        self.data_type == DataType::Array
    }

    /// Change the type, keeping `items`/`properties` consistent with it.
    pub fn set_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
        match data_type {
            DataType::Object => {
                self.items = None;
                self.properties.get_or_insert_with(IndexMap::new);
            }
            DataType::Array => {
                self.properties = None;
                if self.items.is_none() {
                    self.items = Some(Box::new(Self::object()));
                }
            }
            _ => {
                self.items = None;
                self.properties = None;
            }
        }
    }

    /// Child fields of an object node, empty for anything else.
    pub fn children(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().flat_map(|map| map.values())
    }

    /// Checks the exactly-one-child invariant over the whole tree.
    pub fn is_well_formed(&self) -> bool {
        let own = match self.data_type {
            DataType::Array => self.items.is_some() && self.properties.is_none(),
            DataType::Object => self.items.is_none() && self.properties.is_some(),
            _ => self.items.is_none() && self.properties.is_none(),
        };
        own && self.items.as_ref().map_or(true, |items| items.is_well_formed())
            && self.children().all(Property::is_well_formed)
    }
}

/// One logical endpoint at one path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Api {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub tags: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body_type: Option<RequestBodyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_body_form: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Property>,
}

impl Api {
    /// `"GET /users/{id}"`, used for logging and de-duplication.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_parse_variants() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("RequestMethod.POST"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("Method::DELETE"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("connect"), None);
        assert!(HttpMethod::Post.allows_body());
        assert!(!HttpMethod::Get.allows_body());
    }

    #[test]
    fn test_set_type_keeps_shape() {
        let mut property = Property::scalar(DataType::String);
        property.set_type(DataType::Array);
        assert!(property.items.is_some());
        assert!(property.is_well_formed());

        property.set_type(DataType::Object);
        assert!(property.items.is_none());
        assert_eq!(property.properties.as_ref().map(|p| p.len()), Some(0));
        assert!(property.is_well_formed());

        property.set_type(DataType::Integer);
        assert!(property.properties.is_none());
        assert!(property.is_well_formed());
    }

    #[test]
    fn test_property_serializes_camel_case_and_skips_empty() {
        let mut property = Property::scalar(DataType::String);
        property.name = "createdAt".to_string();
        property.date_format = Some("yyyy-MM-dd".to_string());
        property.location = Some(ParameterIn::Query);

        let json = serde_json::to_value(&property).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["dateFormat"], "yyyy-MM-dd");
        assert_eq!(json["in"], "query");
        assert!(json.get("items").is_none());
        assert!(json.get("mock").is_none());
    }

    #[test]
    fn test_request_body_type_labels() {
        let json = serde_json::to_string(&RequestBodyType::FormData).unwrap();
        assert_eq!(json, "\"form-data\"");
        let json = serde_json::to_string(&RequestBodyType::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }

    #[test]
    fn test_value_text() {
        assert_eq!(Value::new("ACTIVE", Some("in use".to_string())).text(), "ACTIVE: in use");
        assert_eq!(Value::new("ACTIVE", None).text(), "ACTIVE");
    }
}
