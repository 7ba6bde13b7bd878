//! YAML and JSON rendering of extracted Apis, and file output.

use crate::error::Result;
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Document format for rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }

    pub fn render<T: Serialize + ?Sized>(&self, doc: &T) -> Result<String> {
        match self {
            Format::Yaml => serialize_yaml(doc),
            Format::Json => serialize_json(doc),
        }
    }
}

/// Serializes any document (a single [`Api`](crate::model::Api), a batch, a catalog
/// dump) to YAML.
pub fn serialize_yaml<T: Serialize + ?Sized>(doc: &T) -> Result<String> {
    debug!("Serializing document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes a document to pretty-printed JSON.
pub fn serialize_json<T: Serialize + ?Sized>(doc: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Writes `content` to `path`, creating parent directories and replacing any
/// existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Api, DataType, HttpMethod, Property};
    use tempfile::TempDir;

    fn sample_api() -> Api {
        let mut id = Property::scalar(DataType::Integer);
        id.name = "id".to_string();
        id.required = true;
        Api {
            method: HttpMethod::Get,
            path: "/users/{id}".to_string(),
            category: Some("users".to_string()),
            parameters: vec![id],
            responses: Some(Property::object()),
            ..Default::default()
        }
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&vec![sample_api()]).unwrap();
        assert!(yaml.contains("method: GET"));
        assert!(yaml.contains("path: /users/{id}"));
        assert!(yaml.contains("type: integer"));
        assert!(!yaml.contains("requestBody:"));
    }

    #[test]
    fn test_serialize_json_shape() {
        let json = serialize_json(&sample_api()).unwrap();
        assert!(json.lines().count() > 5);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["method"], "GET");
        assert_eq!(parsed["parameters"][0]["name"], "id");
        assert_eq!(parsed["parameters"][0]["type"], "integer");
        assert_eq!(parsed["parameters"][0]["required"], true);
        assert_eq!(parsed["responses"]["type"], "object");
    }

    #[test]
    fn test_write_to_file_creates_directories_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("apis.yaml");

        write_to_file("first", &file_path).unwrap();
        write_to_file("second", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "second");
    }

    #[test]
    fn test_yaml_parses_back_into_apis() {
        let apis = vec![sample_api()];
        let yaml = serialize_yaml(&apis).unwrap();
        let parsed: Vec<Api> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, apis);
    }
}
