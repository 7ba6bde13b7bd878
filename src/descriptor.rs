//! Structural descriptions of source types.
//!
//! A [`TypeDescriptor`] is what an introspection backend hands to the resolver: names,
//! members, supertypes, annotations and documentation. Nothing here knows how the
//! descriptor was produced, so a catalog dumped by another tool and one built from
//! Rust sources look the same to the rest of the crate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::generics;

/// Shape of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A contract type (Java interface, Rust trait).
    Interface,
    /// A data holder (Java class, Rust struct).
    #[default]
    Class,
    Enum,
    Array,
}

/// An annotation/attribute attached to a type, member or parameter.
///
/// Attribute values are kept as text. A positional argument is stored under `value`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Vec<String>>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute insertion, used mostly by tests and builtins.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.attributes
            .entry(key.to_string())
            .or_default()
            .push(value.into());
    }

    /// Name without package or module path.
    pub fn short_name(&self) -> &str {
        generics::short_name(&self.name)
    }

    /// Compares on short names so `org.x.GetMapping` matches `GetMapping`.
    pub fn is(&self, name: &str) -> bool {
        self.short_name() == generics::short_name(name)
    }

    pub fn values(&self, key: &str) -> &[String] {
        self.attributes.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First non-empty value of `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values(key)
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    /// First non-empty value among several keys, e.g. `value` then `name`.
    pub fn first_value(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.value(key))
    }

    pub fn bool_value(&self, key: &str) -> Option<bool> {
        self.value(key).map(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Anything carrying annotations.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];

    fn find_annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations().iter().find(|a| a.is(name))
    }

    fn has_annotation(&self, name: &str) -> bool {
        self.find_annotation(name).is_some()
    }

    /// First annotation among `names`, in the order given.
    fn find_any_annotation(&self, names: &[&str]) -> Option<&Annotation> {
        names.iter().find_map(|name| self.find_annotation(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Documentation comment split into free text and `@tag value` lines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocComment {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<DocTag>,
}

impl DocComment {
    /// Parses javadoc or rustdoc text.
    ///
    /// Leading `/**`, `*` and `*/` decorations are dropped. A line starting with `@name`
    /// opens a tag, following lines continue it until the next tag.
    pub fn parse(raw: &str) -> Self {
        let mut text_lines: Vec<&str> = Vec::new();
        let mut tags: Vec<DocTag> = Vec::new();

        for line in raw.lines() {
            let line = clean_doc_line(line);
            if let Some(rest) = line.strip_prefix('@') {
                let (name, value) = match rest.find(char::is_whitespace) {
                    Some(at) => (&rest[..at], rest[at..].trim()),
                    None => (rest, ""),
                };
                if !name.is_empty() {
                    tags.push(DocTag {
                        name: name.to_string(),
                        value: value.to_string(),
                    });
                    continue;
                }
            }
            match tags.last_mut() {
                Some(tag) if !line.is_empty() => {
                    if !tag.value.is_empty() {
                        tag.value.push(' ');
                    }
                    tag.value.push_str(line);
                }
                Some(_) => {}
                None => text_lines.push(line),
            }
        }

        let text = text_lines.join("\n").trim().to_string();
        Self { text, tags }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tags.is_empty()
    }

    /// First non-empty line of the description.
    pub fn title(&self) -> Option<&str> {
        self.text.lines().map(str::trim).find(|l| !l.is_empty())
    }

    pub fn tags_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a DocTag> + 'n
    where
        'a: 'n,
    {
        self.tags.iter().filter(move |t| t.name == name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags_named(name).next().is_some()
    }

    /// Value of the first `@name` tag, `None` when absent or empty.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .filter(|t| t.name == name)
            .map(|t| t.value.trim())
            .find(|v| !v.is_empty())
    }

    /// Text of `@param <name> text`.
    pub fn param(&self, param_name: &str) -> Option<&str> {
        self.tags_named("param").find_map(|tag| {
            let mut parts = tag.value.splitn(2, char::is_whitespace);
            match (parts.next(), parts.next()) {
                (Some(name), rest) if name == param_name => {
                    Some(rest.map(str::trim).unwrap_or(""))
                }
                _ => None,
            }
        })
    }

    /// Fills empty text and missing tags from `other`.
    pub fn merge_missing(&mut self, other: &DocComment) {
        if self.text.is_empty() {
            self.text = other.text.clone();
        }
        for tag in &other.tags {
            if !self.has_tag(&tag.name) {
                self.tags.push(tag.clone());
            }
        }
    }
}

fn clean_doc_line(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix("/**").unwrap_or(line);
    let line = line.strip_suffix("*/").unwrap_or(line);
    let line = line.trim_start();
    let line = line.strip_prefix('*').unwrap_or(line);
    line.trim()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub private: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "DocComment::is_empty")]
    pub doc: DocComment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }
}

impl Annotated for FieldDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            annotations: Vec::new(),
        }
    }
}

impl Annotated for ParameterDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// `void` or empty when nothing is returned.
    #[serde(default)]
    pub return_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "DocComment::is_empty")]
    pub doc: DocComment,
    /// Declaration text shown in Api descriptions.
    #[serde(default)]
    pub signature: String,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            ..Default::default()
        }
    }

    pub fn returns_void(&self) -> bool {
        generics::is_void(&self.return_type)
    }

    /// Same name and arity.
    pub fn overrides(&self, other: &MethodDescriptor) -> bool {
        self.name == other.name && self.parameters.len() == other.parameters.len()
    }
}

impl Annotated for MethodDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// An enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstantDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully qualified name, e.g. `com.demo.User` or `api::model::User`.
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_params: Vec<String>,
    /// Element type of an array descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<ConstantDescriptor>,
    /// Direct supertypes as written, generic arguments included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "DocComment::is_empty")]
    pub doc: DocComment,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        let short_name = generics::short_name(&name).to_string();
        Self {
            name,
            short_name,
            kind,
            ..Default::default()
        }
    }

    /// Synthesized descriptor for `component[]`.
    pub fn array_of(component: &str) -> Self {
        let mut descriptor = Self::new(format!("{}[]", component), TypeKind::Array);
        descriptor.short_name = format!("{}[]", generics::short_name(component));
        descriptor.component_type = Some(component.to_string());
        descriptor
    }

    /// Fills `short_name` when a catalog dump left it out.
    pub fn normalized(mut self) -> Self {
        if self.short_name.is_empty() {
            self.short_name = generics::short_name(&self.name).to_string();
        }
        self
    }

    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn with_generics(mut self, params: &[&str]) -> Self {
        self.generic_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_array(&self) -> bool {
        self.kind == TypeKind::Array
    }

    /// Whether `name` designates this type, by full or short name.
    pub fn is_named(&self, name: &str) -> bool {
        let raw = generics::raw_name(name);
        self.name == raw || self.short_name == raw
    }
}

impl Annotated for TypeDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}
