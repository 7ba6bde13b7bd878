//! Project loading: find `.rs` files, parse them with `syn`, build a catalog.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::catalog::TypeCatalog;
use super::rust::build_catalog;

/// A successfully parsed Rust file.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub syntax_tree: syn::File,
}

/// Result of scanning a directory tree.
pub struct ScanResult {
    pub rust_files: Vec<PathBuf>,
    /// Paths that could not be accessed; scanning carried on past them.
    pub warnings: Vec<String>,
}

/// Everything the CLI needs to report after loading a project.
pub struct LoadedProject {
    pub catalog: TypeCatalog,
    pub files_scanned: usize,
    pub files_parsed: usize,
    pub warnings: Vec<String>,
}

/// Recursively lists Rust sources, skipping `target` and hidden directories.
pub struct FileScanner {
    root_path: PathBuf,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            anyhow::bail!("Not a directory: {}", self.root_path.display());
        }
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!("Scanned {}: {} Rust files", self.root_path.display(), rust_files.len());
        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}

pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    debug!("Parsing file: {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let syntax_tree = syn::parse_file(&content)
        .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;
    Ok(ParsedFile {
        path: path.to_path_buf(),
        syntax_tree,
    })
}

/// Parses every path; failures are logged and returned in place.
pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
    let results: Vec<Result<ParsedFile>> = paths
        .iter()
        .map(|path| {
            parse_file(path).map_err(|e| {
                warn!("Failed to parse {}: {:#}", path.display(), e);
                e
            })
        })
        .collect();

    let success_count = results.iter().filter(|r| r.is_ok()).count();
    debug!(
        "Parsing complete: {} succeeded, {} failed",
        success_count,
        results.len() - success_count
    );
    results
}

/// Scans `root`, parses what it can and builds a catalog from it.
pub fn load_project(root: &Path) -> Result<LoadedProject> {
    info!("Scanning project directory {}", root.display());
    let scan = FileScanner::new(root.to_path_buf()).scan()?;
    if scan.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in {}", root.display());
    }

    let mut warnings = scan.warnings;
    let mut parsed = Vec::new();
    for result in parse_files(&scan.rust_files) {
        match result {
            Ok(file) => parsed.push(file),
            Err(e) => warnings.push(format!("{:#}", e)),
        }
    }
    if parsed.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    let catalog = build_catalog(&parsed);
    info!("Parsed {} files into {} types", parsed.len(), catalog.len());
    Ok(LoadedProject {
        catalog,
        files_scanned: scan.rust_files.len(),
        files_parsed: parsed.len(),
        warnings,
    })
}
