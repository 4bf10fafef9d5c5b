//! sbom-manifest: SPDX manifest generation and consolidation

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_manifest::{
    adapters::{ConversionOptions, ScanResult},
    config::{load_config_file, load_or_default, AppConfig, Validatable},
    model::{ArtifactInfo, ManifestInfo, SbomInput},
    pipeline::exit_codes,
    workflows::{
        ChecksumSidecarValidator, GenerationWorkflow, SbomConsolidationWorkflow,
        SbomGenerationWorkflow,
    },
    GeneratorRegistry,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nManifest formats:",
        "\n  SPDX:2.2  (JSON)",
        "\n  SPDX:3.0  (JSON-LD)",
        "\n\nInputs:",
        "\n  record files (files, packages, relationships, externalDocumentReferences)",
        "\n  component-detection scan results"
    )
}

#[derive(Parser)]
#[command(name = "sbom-manifest")]
#[command(version, long_version = build_long_version())]
#[command(about = "SPDX manifest generation and consolidation", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Workflow reported failure (per-item errors, nothing to consolidate)
    2  Error occurred

EXAMPLES:
    # Generate SPDX 2.2 and 3.0 manifests for a build drop
    sbom-manifest generate --build-drop out --manifest-dir out/_manifest -m SPDX:2.2,SPDX:3.0

    # Add packages from a component-detection scan
    sbom-manifest generate --input scan.json --build-drop out --manifest-dir out/_manifest

    # Consolidate the manifests of several artifacts
    sbom-manifest consolidate --artifact app=drops/app --artifact lib=drops/lib --output-dir merged")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `generate` subcommand
#[derive(Parser)]
struct GenerateArgs {
    /// Records file or component-detection scan result
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the manifest layout is written into
    #[arg(long)]
    manifest_dir: Option<PathBuf>,

    /// Build drop whose files are hashed into the manifest
    #[arg(long)]
    build_drop: Option<PathBuf>,

    /// Formats to generate, comma-separated `Name:Version`
    #[arg(short = 'm', long)]
    manifest_info: Option<String>,

    /// Root package name
    #[arg(long)]
    package_name: Option<String>,

    /// Root package version
    #[arg(long)]
    package_version: Option<String>,

    /// Root package supplier
    #[arg(long)]
    package_supplier: Option<String>,

    /// Keep development dependencies from scan results
    #[arg(long)]
    include_dev_dependencies: bool,
}

/// Arguments for the `consolidate` subcommand
#[derive(Parser)]
struct ConsolidateArgs {
    /// Artifact to consolidate as `name=path`; added to the configured map
    #[arg(short, long = "artifact", value_parser = parse_artifact)]
    artifacts: Vec<(String, PathBuf)>,

    /// Directory the consolidated manifest is written into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Check each manifest's `.sha256` sidecar before merging it
    #[arg(long)]
    verify_sidecars: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate manifests from records, a scan result, or a build drop
    Generate(GenerateArgs),

    /// Merge the manifests of several artifacts into one
    Consolidate(ConsolidateArgs),

    /// Generate JSON Schema for the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_artifact(value: &str) -> std::result::Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected name=path, got '{value}'")),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let (config, loaded_from) = load_or_default(None);
            if let Some(path) = loaded_from {
                tracing::debug!("Loaded config from {}", path.display());
            }
            Ok(config)
        }
    }
}

fn ensure_valid(config: &AppConfig) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        tracing::error!("{error}");
    }
    bail!("configuration has {} error(s)", errors.len())
}

/// Read a records file, or a scan result when it looks like one.
fn read_input(path: &Path, options: ConversionOptions) -> Result<SbomInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if content.contains("\"componentsFound\"") {
        let scan: ScanResult = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scan result {}", path.display()))?;
        return Ok(SbomInput {
            packages: scan.to_packages(options),
            ..SbomInput::default()
        });
    }
    serde_json::from_str(&content).with_context(|| format!("Failed to parse records {}", path.display()))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn run_generate(mut config: AppConfig, args: GenerateArgs) -> Result<bool> {
    let generation = &mut config.generation;
    if let Some(infos) = &args.manifest_info {
        generation.manifest_infos = ManifestInfo::parse_list(infos)?;
    }
    if let Some(dir) = args.manifest_dir {
        generation.manifest_dir = Some(dir);
    }
    if let Some(drop) = args.build_drop {
        generation.build_drop_path = Some(drop);
    }
    if let Some(name) = args.package_name {
        generation.package_name = name;
    }
    if let Some(version) = args.package_version {
        generation.package_version = version;
    }
    if let Some(supplier) = args.package_supplier {
        generation.package_supplier = supplier;
    }
    ensure_valid(&config)?;

    let input = match &args.input {
        Some(path) => read_input(
            path,
            ConversionOptions {
                include_development_dependencies: args.include_dev_dependencies,
            },
        )?,
        None => SbomInput::default(),
    };

    let registry = Arc::new(GeneratorRegistry::standard(config.generation.conformance));
    let workflow = SbomGenerationWorkflow::new(registry, &config);
    Ok(runtime()?.block_on(workflow.run(input))?)
}

fn run_consolidate(mut config: AppConfig, args: ConsolidateArgs) -> Result<bool> {
    for (name, path) in args.artifacts {
        config.consolidation.artifact_info_map.insert(
            name,
            ArtifactInfo {
                artifact_path: Some(path),
                ..ArtifactInfo::default()
            },
        );
    }
    if let Some(dir) = args.output_dir {
        config.consolidation.output_dir = Some(dir);
    }
    ensure_valid(&config)?;

    let registry = Arc::new(GeneratorRegistry::standard(config.generation.conformance));
    let generation = SbomGenerationWorkflow::for_consolidation(Arc::clone(&registry), &config);
    let mut workflow = SbomConsolidationWorkflow::new(registry, generation, &config)?;
    if args.verify_sidecars {
        workflow = workflow.with_sign_validator(Arc::new(ChecksumSidecarValidator));
    }
    Ok(runtime()?.block_on(workflow.run())?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let outcome = match cli.command {
        Commands::Generate(args) => {
            load_config(cli.config.as_deref()).and_then(|config| run_generate(config, args))
        }
        Commands::Consolidate(args) => {
            load_config(cli.config.as_deref()).and_then(|config| run_consolidate(config, args))
        }
        Commands::Schema { output } => {
            let schema = sbom_manifest::config::generate_json_schema()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            return Ok(());
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbom-manifest", &mut io::stdout());
            return Ok(());
        }
    };

    let exit_code = match outcome {
        Ok(true) => exit_codes::SUCCESS,
        Ok(false) => exit_codes::WORKFLOW_FAILED,
        Err(e) => {
            tracing::error!("{e:#}");
            exit_codes::ERROR
        }
    };
    if exit_code != exit_codes::SUCCESS {
        std::process::exit(exit_code);
    }
    Ok(())
}
