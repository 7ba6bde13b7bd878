use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::config::ExtractorConfig;
use crate::extractor::ApiExtractor;
use crate::notify::CollectingNotifier;
use crate::publisher::{spawn_batch, DirectoryPublisher};
use crate::resolver::Context;
use crate::serializer::{write_to_file, Format};
use crate::source::catalog::TypeCatalog;
use crate::source::loader::load_project;

/// Extract API descriptions from annotated controller source code
#[derive(Parser, Debug)]
#[command(name = "apidoc-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the project directory
    #[arg(value_name = "PROJECT_PATH", required_unless_present = "catalog")]
    pub project_path: Option<PathBuf>,

    /// Read types from a descriptor dump (JSON or YAML) instead of Rust sources
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Extraction configuration (JSON or YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Also publish one document per api into this directory
    #[arg(long = "publish-dir", value_name = "DIR")]
    pub publish_dir: Option<PathBuf>,

    /// Write the project types as a descriptor dump
    #[arg(long = "dump-catalog", value_name = "FILE")]
    pub dump_catalog: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => Format::Yaml,
            OutputFormat::Json => Format::Json,
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(catalog) = &args.catalog {
        if !catalog.is_file() {
            anyhow::bail!("Catalog file does not exist: {}", catalog.display());
        }
        info!("Catalog: {}", catalog.display());
    } else if let Some(project_path) = &args.project_path {
        if !project_path.exists() {
            anyhow::bail!("Project path does not exist: {}", project_path.display());
        }
        if !project_path.is_dir() {
            anyhow::bail!("Project path is not a directory: {}", project_path.display());
        }
        info!("Project path: {}", project_path.display());
    }

    if let Some(config) = &args.config {
        if !config.is_file() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
        info!("Config: {}", config.display());
    }

    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let format = Format::from(args.output_format);

    // Step 1: configuration
    let config = match &args.config {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ExtractorConfig::default(),
    };

    // Step 2: types, from a dump or from the project sources
    let mut warnings: Vec<String> = Vec::new();
    let mut files_scanned = 0;
    let mut files_parsed = 0;
    let catalog = if let Some(path) = &args.catalog {
        TypeCatalog::load(path)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))?
    } else {
        let project_path = args
            .project_path
            .as_deref()
            .context("A project path or --catalog is required")?;
        let project = load_project(project_path)?;
        files_scanned = project.files_scanned;
        files_parsed = project.files_parsed;
        warnings.extend(project.warnings);
        project.catalog
    };
    let project_types = catalog.dump();
    info!("Loaded {} project types", project_types.types.len());

    if let Some(path) = &args.dump_catalog {
        write_to_file(&format.render(&project_types)?, path)?;
        info!("Wrote catalog dump to {}", path.display());
    }

    // Step 3: extraction
    let notifier = CollectingNotifier::new();
    let ctx = Context::new(&catalog, &config, &notifier);
    let extraction = ApiExtractor::new(&ctx).extract_all();
    if extraction.apis.is_empty() {
        warn!("No apis found");
    }
    warnings.extend(
        notifier
            .warnings()
            .into_iter()
            .map(|(title, message)| format!("{}: {}", title, message)),
    );

    // Step 4: output
    let content = format.render(&extraction.apis)?;
    match &args.output_path {
        Some(output_path) => {
            write_to_file(&content, output_path)?;
            info!("Wrote {} api(s) to {}", extraction.apis.len(), output_path.display());
        }
        None => println!("{}", content),
    }

    // Step 5: optional publishing
    let mut publish_failures = 0;
    if let Some(dir) = &args.publish_dir {
        info!("Publishing to {}", dir.display());
        let publisher = DirectoryPublisher::new(dir.clone(), format);
        let report = spawn_batch(publisher, extraction.apis.clone())
            .join()
            .map_err(|_| anyhow::anyhow!("Publisher thread panicked"))?;
        for (api, message) in &report.failures {
            warn!("{}: {}", api, message);
        }
        publish_failures = report.failures.len();
    }

    info!("Summary:");
    if args.catalog.is_none() {
        info!("  - Files scanned: {}", files_scanned);
        info!("  - Files parsed: {}", files_parsed);
    }
    info!("  - Types: {}", project_types.types.len());
    info!("  - Controllers: {}", extraction.controllers);
    info!("  - Apis: {}", extraction.apis.len());
    info!("  - Warnings: {}", warnings.len());
    if args.publish_dir.is_some() {
        info!("  - Publish failures: {}", publish_failures);
    }

    if publish_failures > 0 {
        anyhow::bail!("{} api(s) could not be published", publish_failures);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(project_path: PathBuf) -> CliArgs {
        CliArgs {
            project_path: Some(project_path),
            catalog: None,
            config: None,
            output_format: OutputFormat::Json,
            output_path: None,
            publish_dir: None,
            dump_catalog: None,
            verbose: false,
        }
    }

    #[test]
    fn test_validation_rejects_missing_paths() {
        assert!(parse_args_from_parsed(args(PathBuf::from("/nonexistent/project"))).is_err());

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("lib.rs");
        fs::write(&file, "").unwrap();
        assert!(parse_args_from_parsed(args(file)).is_err());

        let mut with_config = args(temp_dir.path().to_path_buf());
        with_config.config = Some(temp_dir.path().join("missing.yaml"));
        assert!(parse_args_from_parsed(with_config).is_err());
    }

    #[test]
    fn test_clap_requires_project_or_catalog() {
        assert!(CliArgs::try_parse_from(["apidoc-from-source"]).is_err());
        let parsed = CliArgs::try_parse_from(["apidoc-from-source", "--catalog", "types.yaml", "-f", "json"]).unwrap();
        assert!(parsed.project_path.is_none());
        assert!(matches!(parsed.output_format, OutputFormat::Json));
    }

    #[test]
    fn test_run_writes_output_publishes_and_dumps() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(
            project.join("lib.rs"),
            r#"
            pub struct User { pub id: u64 }

            #[rest_controller]
            #[request_mapping("/users")]
            pub struct UserController;
            impl UserController {
                #[get_mapping("/{id}")]
                pub fn get(&self, #[path_variable] id: u64) -> User { todo!() }
            }
            "#,
        )
        .unwrap();

        let mut cli = args(project);
        cli.output_path = Some(temp_dir.path().join("apis.json"));
        cli.publish_dir = Some(temp_dir.path().join("published"));
        cli.dump_catalog = Some(temp_dir.path().join("types.json"));
        run(cli).unwrap();

        let written = fs::read_to_string(temp_dir.path().join("apis.json")).unwrap();
        let apis: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(apis[0]["path"], "/users/{id}");
        assert!(temp_dir
            .path()
            .join("published")
            .join("user_controller")
            .join("GET_users_id.json")
            .exists());

        let dumped = TypeCatalog::load(&temp_dir.path().join("types.json")).unwrap();
        assert_eq!(dumped.dump().types.len(), 2);
    }
}
