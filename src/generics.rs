//! Text helpers for type references such as `Map<String, List<User>>`.
//!
//! Type references travel through the resolver as canonical text. Generic binding is
//! textual: a parameter name occurring as a whole identifier is replaced by its argument.

use indexmap::IndexMap;

/// Names that mean "no value".
const VOID_NAMES: &[&str] = &["void", "java.lang.Void", "Void", "()", "unit"];

/// `List<Foo>` becomes `("List", Some("Foo"))`; `Foo` becomes `("Foo", None)`.
pub fn split_type_and_generics(text: &str) -> (String, Option<String>) {
    let text = text.trim();
    match (text.find('<'), text.rfind('>')) {
        (Some(open), Some(close)) if close > open => {
            let raw = text[..open].trim().to_string();
            let args = text[open + 1..close].trim();
            if args.is_empty() {
                (raw, None)
            } else {
                (raw, Some(args.to_string()))
            }
        }
        _ => (text.to_string(), None),
    }
}

/// Type name without generic arguments.
pub fn raw_name(text: &str) -> String {
    split_type_and_generics(text).0
}

/// Splits `String, List<Map<K, V>>` on top-level commas only.
pub fn split_generic_parameters(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for ch in args.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                let part = current.trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
    parts
}

/// Replaces whole identifiers found in `bindings`.
///
/// Identifiers may contain `.` and `:` so `T` never matches inside `com.T.Bar` or `a::T`.
pub fn substitute_generics(text: &str, bindings: &IndexMap<String, String>) -> String {
    if bindings.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut token = String::new();

    let flush = |token: &mut String, out: &mut String| {
        if !token.is_empty() {
            match bindings.get(token.as_str()) {
                Some(bound) => out.push_str(bound),
                None => out.push_str(token),
            }
            token.clear();
        }
    };

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == ':' || ch == '$' {
            token.push(ch);
        } else {
            flush(&mut token, &mut out);
            out.push(ch);
        }
    }
    flush(&mut token, &mut out);
    out
}

/// Binds declared parameter names to the arguments in `args` by position.
pub fn bind(params: &[String], args: Option<&str>) -> IndexMap<String, String> {
    let args = args.map(split_generic_parameters).unwrap_or_default();
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| (param.clone(), arg))
        .collect()
}

/// Last path segment: `java.util.List<E>` gives `List`, `std::vec::Vec` gives `Vec`.
pub fn short_name(text: &str) -> &str {
    let text = text.trim();
    let text = match text.find('<') {
        Some(open) => &text[..open],
        None => text,
    };
    let after_colons = text.rsplit("::").next().unwrap_or(text);
    after_colons.rsplit('.').next().unwrap_or(after_colons)
}

/// `State` and `extract::State` both name a trailing part of `axum::extract::State`.
pub fn is_path_suffix(full: &str, tail: &str) -> bool {
    if tail.is_empty() {
        return false;
    }
    if full == tail {
        return true;
    }
    full.strip_suffix(tail)
        .map_or(false, |head| head.ends_with("::") || head.ends_with('.'))
}

pub fn is_void(text: &str) -> bool {
    let raw = raw_name(text);
    raw.is_empty() || VOID_NAMES.contains(&raw.as_str())
}

/// Component of `X[]`, if the text is an array reference.
pub fn array_component(text: &str) -> Option<&str> {
    text.trim()
        .strip_suffix("[]")
        .map(str::trim)
        .filter(|component| !component.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_type_and_generics() {
        assert_eq!(
            split_type_and_generics("java.util.Map<String, List<User>>"),
            ("java.util.Map".to_string(), Some("String, List<User>".to_string()))
        );
        assert_eq!(split_type_and_generics("User"), ("User".to_string(), None));
        assert_eq!(split_type_and_generics("Foo<>"), ("Foo".to_string(), None));
    }

    #[test]
    fn test_split_generic_parameters_respects_nesting() {
        assert_eq!(
            split_generic_parameters("String, Map<K, List<V>>, Long"),
            vec!["String", "Map<K, List<V>>", "Long"]
        );
        assert!(split_generic_parameters("").is_empty());
    }

    #[test]
    fn test_substitute_whole_identifiers_only() {
        let bindings = bind(&["T".to_string(), "E".to_string()], Some("User, Item"));
        assert_eq!(substitute_generics("List<T>", &bindings), "List<User>");
        assert_eq!(substitute_generics("Map<E, T>", &bindings), "Map<Item, User>");
        assert_eq!(substitute_generics("com.T.Type", &bindings), "com.T.Type");
        assert_eq!(substitute_generics("Test", &bindings), "Test");
        assert_eq!(substitute_generics("T[]", &bindings), "User[]");
    }

    #[test]
    fn test_short_name_and_void() {
        assert_eq!(short_name("java.util.List<E>"), "List");
        assert_eq!(short_name("std::collections::HashMap"), "HashMap");
        assert_eq!(short_name("User"), "User");
        assert!(is_void("void"));
        assert!(is_void("java.lang.Void"));
        assert!(is_void(""));
        assert!(!is_void("User"));
        assert_eq!(array_component("User[]"), Some("User"));
        assert_eq!(array_component("[]"), None);
    }

    #[test]
    fn test_path_suffix_stops_at_separators() {
        assert!(is_path_suffix("axum::extract::State", "State"));
        assert!(is_path_suffix("axum::extract::State", "extract::State"));
        assert!(is_path_suffix("org.springframework.ui.Model", "Model"));
        assert!(is_path_suffix("java.util.Locale", "java.util.Locale"));
        assert!(!is_path_suffix("axum::extract::State", "tate"));
        assert!(!is_path_suffix("org.springframework.ui.ModelMap", "Model"));
        assert!(!is_path_suffix("axum::Json", ""));
    }
}
