//! apidoc-from-source - API descriptions extracted from annotated controller source code.
//!
//! The crate statically analyses web controllers and produces one [`model::Api`] per
//! endpoint and path: HTTP method, path, category, request parameters and bodies, and
//! a response schema. Nothing in the analysed program is compiled or executed.
//!
//! # Architecture
//!
//! 1. [`source`] - type introspection behind the [`source::TypeSource`] trait, backed
//!    by a descriptor catalog that is filled from Rust sources or loaded from a dump
//! 2. [`classifier`] - scalar, array, collection, map and object classification
//! 3. [`resolver`] - recursive type-to-schema resolution with cycle cutting
//! 4. [`custom`] and [`mock`] - configured overrides, date formats and mock values
//! 5. [`discovery`] - controllers and their endpoint methods
//! 6. [`extractor`] - mappings, parameters, bodies and responses
//! 7. [`serializer`] and [`publisher`] - YAML/JSON output and per-api publishing
//!
//! # Example Usage
//!
//! ```no_run
//! use apidoc_from_source::{
//!     config::ExtractorConfig,
//!     extractor::ApiExtractor,
//!     notify::LogNotifier,
//!     resolver::Context,
//!     serializer::serialize_yaml,
//!     source::loader::load_project,
//! };
//! use std::path::Path;
//!
//! let project = load_project(Path::new("./my-service")).unwrap();
//! let config = ExtractorConfig::default();
//! let ctx = Context::new(&project.catalog, &config, &LogNotifier);
//!
//! let extraction = ApiExtractor::new(&ctx).extract_all();
//! println!("{}", serialize_yaml(&extraction.apis).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod custom;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod generics;
pub mod metadata;
pub mod mock;
pub mod model;
pub mod notify;
pub mod publisher;
pub mod resolver;
pub mod serializer;
pub mod source;
