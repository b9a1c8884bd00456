use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use ranforge::{config_loader, topology};

/// Topology compiler for srsLTE controlled-RF testbed deployments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the deployment configuration YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory for the topology document and device registry
    #[arg(short, long, default_value = "topology_output")]
    output: PathBuf,

    /// Serialization format for the topology document
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting RanForge topology compiler");
    info!("Configuration file: {:?}", args.config);
    info!("Output directory: {:?}", args.output);

    // Load and validate the deployment configuration
    let config = config_loader::load_config(&args.config)?;

    // Compile the topology document
    let compilation = topology::compile(&config)?;

    fs::create_dir_all(&args.output)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", args.output.display()))?;

    let document_path = match args.format {
        OutputFormat::Yaml => args.output.join("topology.yaml"),
        OutputFormat::Json => args.output.join("topology.json"),
    };
    let document = match args.format {
        OutputFormat::Yaml => serde_yaml::to_string(&compilation.graph)?,
        OutputFormat::Json => serde_json::to_string_pretty(&compilation.graph)?,
    };
    fs::write(&document_path, document)
        .wrap_err_with(|| format!("Failed to write topology document '{}'", document_path.display()))?;
    info!("Generated topology document: {:?}", document_path);

    let registry_path = args.output.join("device_registry.json");
    let registry = serde_json::to_string_pretty(&compilation.registry)?;
    fs::write(&registry_path, registry)
        .wrap_err_with(|| format!("Failed to write device registry '{}'", registry_path.display()))?;
    info!("Generated device registry: {:?}", registry_path);

    info!("Topology compilation completed successfully");
    Ok(())
}
