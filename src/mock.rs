//! Mock expressions for documentation platforms that render sample data.

use regex::Regex;

use crate::config::ExtractorConfig;
use crate::model::{DataType, Property};
use crate::notify::Notifier;

struct CompiledRule {
    data_type: Option<DataType>,
    pattern: Regex,
    mock: String,
}

/// Picks a mock for a property: explicit `@mock` doc tag, then the first matching
/// user rule, then a default for the property type.
pub struct MockGenerator {
    enabled: bool,
    rules: Vec<CompiledRule>,
}

impl MockGenerator {
    /// Rules with an invalid regex or type label are reported and dropped.
    pub fn new(config: &ExtractorConfig, notifier: &dyn Notifier) -> Self {
        let mut rules = Vec::new();
        for rule in &config.mock_rules {
            let data_type = match rule.data_type.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(label) => match DataType::parse(label) {
                    Some(data_type) => Some(data_type),
                    None => {
                        notifier.warn("Invalid mock rule", &format!("unknown type '{}'", label));
                        continue;
                    }
                },
            };
            match Regex::new(&rule.pattern) {
                Ok(pattern) => rules.push(CompiledRule {
                    data_type,
                    pattern,
                    mock: rule.mock.clone(),
                }),
                Err(e) => notifier.warn("Invalid mock rule", &format!("{}: {}", rule.pattern, e)),
            }
        }
        Self {
            enabled: config.mock_enabled,
            rules,
        }
    }

    pub fn mock_for(&self, property: &Property, doc_mock: Option<&str>) -> Option<String> {
        if let Some(mock) = doc_mock.map(str::trim).filter(|m| !m.is_empty()) {
            return Some(mock.to_string());
        }
        if !self.enabled {
            return None;
        }
        let rule = self.rules.iter().find(|rule| {
            rule.data_type.map_or(true, |t| t == property.data_type)
                && rule.pattern.is_match(&property.name)
        });
        if let Some(rule) = rule {
            return Some(rule.mock.clone());
        }
        default_mock(property)
    }

    /// Sets `mock` unless it is already set.
    pub fn apply(&self, property: &mut Property, doc_mock: Option<&str>) {
        if property.mock.is_none() {
            property.mock = self.mock_for(property, doc_mock);
        }
    }
}

fn default_mock(property: &Property) -> Option<String> {
    match property.data_type {
        DataType::Boolean => Some("@boolean".to_string()),
        DataType::Integer => Some("@integer".to_string()),
        DataType::Number => Some("@float".to_string()),
        DataType::String => {
            if property.date_format.is_some() {
                return Some("@datetime".to_string());
            }
            match &property.values {
                Some(values) if !values.is_empty() => {
                    let quoted: Vec<String> = values.iter().map(|v| format!("\"{}\"", v.value)).collect();
                    Some(format!("@pick([{}])", quoted.join(",")))
                }
                _ => Some("@string".to_string()),
            }
        }
        DataType::File | DataType::Array | DataType::Object => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockRule;
    use crate::model::Value;
    use crate::notify::CollectingNotifier;

    fn named(name: &str, data_type: DataType) -> Property {
        let mut property = Property::of_type(data_type);
        property.name = name.to_string();
        property
    }

    #[test]
    fn test_doc_tag_beats_rule_beats_default() {
        let mut config = ExtractorConfig::default();
        config.mock_rules.push(MockRule {
            data_type: Some("string".to_string()),
            pattern: "(?i)email".to_string(),
            mock: "@email".to_string(),
        });
        let generator = MockGenerator::new(&config, &CollectingNotifier::new());

        let email = named("userEmail", DataType::String);
        assert_eq!(generator.mock_for(&email, Some("@custom")).as_deref(), Some("@custom"));
        assert_eq!(generator.mock_for(&email, None).as_deref(), Some("@email"));
        assert_eq!(generator.mock_for(&named("name", DataType::String), None).as_deref(), Some("@string"));
        assert_eq!(generator.mock_for(&named("email", DataType::Integer), None).as_deref(), Some("@integer"));
    }

    #[test]
    fn test_type_defaults() {
        let generator = MockGenerator::new(&ExtractorConfig::default(), &CollectingNotifier::new());
        let mut date = named("at", DataType::String);
        date.date_format = Some("yyyy-MM-dd".to_string());
        assert_eq!(generator.mock_for(&date, None).as_deref(), Some("@datetime"));

        let mut status = named("status", DataType::String);
        status.values = Some(vec![Value::new("A", None), Value::new("B", None)]);
        assert_eq!(generator.mock_for(&status, None).as_deref(), Some("@pick([\"A\",\"B\"])"));

        assert_eq!(generator.mock_for(&named("ok", DataType::Boolean), None).as_deref(), Some("@boolean"));
        assert_eq!(generator.mock_for(&named("x", DataType::Number), None).as_deref(), Some("@float"));
        assert_eq!(generator.mock_for(&named("items", DataType::Array), None), None);
    }

    #[test]
    fn test_disabled_keeps_only_doc_tags() {
        let config = ExtractorConfig {
            mock_enabled: false,
            ..Default::default()
        };
        let generator = MockGenerator::new(&config, &CollectingNotifier::new());
        assert_eq!(generator.mock_for(&named("id", DataType::Integer), None), None);
        assert_eq!(generator.mock_for(&named("id", DataType::Integer), Some("@id")).as_deref(), Some("@id"));
    }

    #[test]
    fn test_bad_rules_are_reported() {
        let mut config = ExtractorConfig::default();
        config.mock_rules.push(MockRule {
            data_type: None,
            pattern: "(".to_string(),
            mock: "@x".to_string(),
        });
        config.mock_rules.push(MockRule {
            data_type: Some("decimal".to_string()),
            pattern: "x".to_string(),
            mock: "@x".to_string(),
        });
        let notifier = CollectingNotifier::new();
        let generator = MockGenerator::new(&config, &notifier);
        assert_eq!(notifier.len(), 2);
        assert_eq!(generator.mock_for(&named("x", DataType::Integer), None).as_deref(), Some("@integer"));
    }
}
