//! Type classification: which schema type a descriptor maps to.

use log::warn;
use std::collections::HashMap;

use crate::config::ExtractorConfig;
use crate::descriptor::TypeDescriptor;
use crate::generics;
use crate::model::DataType;
use crate::source::TypeSource;

const BUILTIN_SCALARS: &[(&str, DataType)] = &[
    // shorthand labels
    ("string", DataType::String),
    ("date", DataType::String),
    ("integer", DataType::Integer),
    ("number", DataType::Number),
    ("boolean", DataType::Boolean),
    ("file", DataType::File),
    // java
    ("java.lang.String", DataType::String),
    ("java.lang.CharSequence", DataType::String),
    ("java.lang.Character", DataType::String),
    ("char", DataType::String),
    ("java.util.UUID", DataType::String),
    ("java.util.Date", DataType::String),
    ("java.sql.Date", DataType::String),
    ("java.sql.Timestamp", DataType::String),
    ("java.time.LocalDate", DataType::String),
    ("java.time.LocalDateTime", DataType::String),
    ("java.time.LocalTime", DataType::String),
    ("java.time.ZonedDateTime", DataType::String),
    ("java.time.OffsetDateTime", DataType::String),
    ("java.time.Instant", DataType::String),
    ("byte", DataType::Integer),
    ("short", DataType::Integer),
    ("int", DataType::Integer),
    ("long", DataType::Integer),
    ("java.lang.Byte", DataType::Integer),
    ("java.lang.Short", DataType::Integer),
    ("java.lang.Integer", DataType::Integer),
    ("java.lang.Long", DataType::Integer),
    ("java.math.BigInteger", DataType::Integer),
    ("float", DataType::Number),
    ("double", DataType::Number),
    ("java.lang.Float", DataType::Number),
    ("java.lang.Double", DataType::Number),
    ("java.math.BigDecimal", DataType::Number),
    ("boolean", DataType::Boolean),
    ("java.lang.Boolean", DataType::Boolean),
    ("org.springframework.web.multipart.MultipartFile", DataType::File),
    ("java.io.File", DataType::File),
    // rust
    ("String", DataType::String),
    ("str", DataType::String),
    ("uuid::Uuid", DataType::String),
    ("chrono::NaiveDate", DataType::String),
    ("chrono::NaiveDateTime", DataType::String),
    ("chrono::NaiveTime", DataType::String),
    ("chrono::DateTime", DataType::String),
    ("time::OffsetDateTime", DataType::String),
    ("time::PrimitiveDateTime", DataType::String),
    ("i8", DataType::Integer),
    ("i16", DataType::Integer),
    ("i32", DataType::Integer),
    ("i64", DataType::Integer),
    ("i128", DataType::Integer),
    ("isize", DataType::Integer),
    ("u8", DataType::Integer),
    ("u16", DataType::Integer),
    ("u32", DataType::Integer),
    ("u64", DataType::Integer),
    ("u128", DataType::Integer),
    ("usize", DataType::Integer),
    ("f32", DataType::Number),
    ("f64", DataType::Number),
    ("bool", DataType::Boolean),
    ("axum::extract::Multipart", DataType::File),
    ("actix_multipart::Multipart", DataType::File),
];

/// Type name to scalar schema type.
#[derive(Debug, Clone)]
pub struct ScalarTable {
    entries: HashMap<String, DataType>,
    short_names: HashMap<String, DataType>,
}

impl ScalarTable {
    pub fn builtin() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
            short_names: HashMap::new(),
        };
        for (name, data_type) in BUILTIN_SCALARS {
            table.insert(name, *data_type);
        }
        table
    }

    /// Builtins extended (and overridden) by the configured `types`.
    pub fn from_config(config: &ExtractorConfig) -> Self {
        let mut table = Self::builtin();
        for (name, label) in &config.types {
            match DataType::parse(label) {
                Some(data_type) => table.insert(name, data_type),
                None => warn!("Ignoring unknown type label '{}' for {}", label, name),
            }
        }
        table
    }

    pub fn insert(&mut self, name: &str, data_type: DataType) {
        self.entries.insert(name.to_string(), data_type);
        self.short_names
            .insert(generics::short_name(name).to_string(), data_type);
    }

    /// Full name only.
    pub fn lookup_exact(&self, name: &str) -> Option<DataType> {
        self.entries.get(&generics::raw_name(name)).copied()
    }

    /// Full name first, then short name. The short name is only trustworthy for
    /// names no source type claims.
    pub fn lookup(&self, name: &str) -> Option<DataType> {
        let raw = generics::raw_name(name);
        self.entries
            .get(&raw)
            .or_else(|| self.short_names.get(generics::short_name(&raw)))
            .copied()
    }
}

/// Decides array / collection / map / enum / scalar / object for descriptors.
pub struct TypeClassifier<'a> {
    source: &'a dyn TypeSource,
    config: &'a ExtractorConfig,
    scalars: &'a ScalarTable,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(source: &'a dyn TypeSource, config: &'a ExtractorConfig, scalars: &'a ScalarTable) -> Self {
        Self {
            source,
            config,
            scalars,
        }
    }

    /// Total: every descriptor gets exactly one type.
    pub fn classify(&self, descriptor: &TypeDescriptor) -> DataType {
        if descriptor.is_array() || self.is_collection(descriptor) {
            return DataType::Array;
        }
        if descriptor.is_enum() {
            return DataType::String;
        }
        if let Some(scalar) = self.scalars.lookup_exact(&descriptor.name) {
            return scalar;
        }
        DataType::Object
    }

    pub fn is_collection(&self, descriptor: &TypeDescriptor) -> bool {
        self.inherits_any(descriptor, &self.config.collection_types)
    }

    pub fn is_map(&self, descriptor: &TypeDescriptor) -> bool {
        self.inherits_any(descriptor, &self.config.map_types)
    }

    /// The universal supertype (e.g. `java.lang.Object`); only an exact match counts.
    pub fn is_top(&self, descriptor: &TypeDescriptor) -> bool {
        self.config
            .top_types
            .iter()
            .any(|top| descriptor.name == *top)
    }

    fn inherits_any(&self, descriptor: &TypeDescriptor, bases: &[String]) -> bool {
        bases
            .iter()
            .any(|base| self.source.is_inheritor(descriptor, base))
    }
}
