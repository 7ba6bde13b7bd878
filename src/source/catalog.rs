//! In-memory descriptor index.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::TypeSource;
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::{Error, Result};

/// On-disk shape of a catalog dump.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDump {
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

/// Descriptors indexed by full name and by short name.
///
/// When two types share a short name the first registered one wins, except that
/// project types displace builtin library types.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: IndexMap<String, TypeDescriptor>,
    short_names: IndexMap<String, String>,
    builtin: HashSet<String>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog pre-filled with well-known library containers.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for descriptor in builtin_descriptors() {
            catalog.builtin.insert(descriptor.name.clone());
            catalog.insert(descriptor);
        }
        catalog
    }

    pub fn from_descriptors(descriptors: Vec<TypeDescriptor>) -> Self {
        let mut catalog = Self::with_builtins();
        catalog.extend(descriptors);
        catalog
    }

    /// Registers a descriptor, replacing any previous one with the same full name.
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        let descriptor = descriptor.normalized();
        let name = descriptor.name.clone();
        let short = descriptor.short_name.clone();
        let is_builtin = self.builtin.contains(&name);

        match self.short_names.get(&short) {
            Some(existing) if !self.builtin.contains(existing) || is_builtin => {}
            _ => {
                self.short_names.insert(short, name.clone());
            }
        }
        self.types.insert(name, descriptor);
    }

    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = TypeDescriptor>) {
        for descriptor in descriptors {
            self.insert(descriptor);
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Loads a JSON or YAML dump (by extension) on top of the builtins.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading type catalog from {}", path.display());
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let dump: CatalogDump = if is_json {
            serde_json::from_str(&content).map_err(|e| Error::Parse {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| Error::Parse {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        };
        debug!("Catalog dump holds {} types", dump.types.len());
        Ok(Self::from_descriptors(dump.types))
    }

    /// Project types only, builtins left out.
    pub fn dump(&self) -> CatalogDump {
        CatalogDump {
            types: self
                .types
                .values()
                .filter(|d| !self.builtin.contains(&d.name))
                .cloned()
                .collect(),
        }
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin.contains(name)
    }
}

impl TypeSource for TypeCatalog {
    fn resolve_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    fn resolve_type_by_short_name(&self, name: &str) -> Option<&TypeDescriptor> {
        self.short_names
            .get(name)
            .and_then(|full| self.types.get(full))
    }

    fn types(&self) -> Box<dyn Iterator<Item = &TypeDescriptor> + '_> {
        Box::new(self.types.values())
    }
}

fn container(name: &str, kind: TypeKind, params: &[&str], supertypes: &[&str]) -> TypeDescriptor {
    let mut descriptor = TypeDescriptor::new(name, kind).with_generics(params);
    descriptor.supertypes = supertypes.iter().map(|s| s.to_string()).collect();
    descriptor
}

fn builtin_descriptors() -> Vec<TypeDescriptor> {
    use TypeKind::{Class, Interface};
    vec![
        container("java.lang.Object", Class, &[], &[]),
        container("java.lang.Iterable", Interface, &["T"], &[]),
        container("java.util.Collection", Interface, &["E"], &["java.lang.Iterable<E>"]),
        container("java.util.List", Interface, &["E"], &["java.util.Collection<E>"]),
        container("java.util.Set", Interface, &["E"], &["java.util.Collection<E>"]),
        container("java.util.ArrayList", Class, &["E"], &["java.util.List<E>"]),
        container("java.util.LinkedList", Class, &["E"], &["java.util.List<E>"]),
        container("java.util.HashSet", Class, &["E"], &["java.util.Set<E>"]),
        container("java.util.Map", Interface, &["K", "V"], &[]),
        container("java.util.HashMap", Class, &["K", "V"], &["java.util.Map<K, V>"]),
        container("java.util.LinkedHashMap", Class, &["K", "V"], &["java.util.HashMap<K, V>"]),
        container("java.util.TreeMap", Class, &["K", "V"], &["java.util.Map<K, V>"]),
        container("Collection", Interface, &["T"], &[]),
        container("Map", Interface, &["K", "V"], &[]),
        container("Vec", Class, &["T"], &["Collection<T>"]),
        container("VecDeque", Class, &["T"], &["Collection<T>"]),
        container("HashSet", Class, &["T"], &["Collection<T>"]),
        container("BTreeSet", Class, &["T"], &["Collection<T>"]),
        container("LinkedList", Class, &["T"], &["Collection<T>"]),
        container("HashMap", Class, &["K", "V"], &["Map<K, V>"]),
        container("BTreeMap", Class, &["K", "V"], &["Map<K, V>"]),
        container("serde_json::Value", Class, &[], &[]),
    ]
}
