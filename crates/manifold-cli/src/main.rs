use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use manifold_catalog::{
    CsvFileIndexSource, CsvReleaseIndexSource, CsvSchemaSource, FileIndexSource, JsonLoader,
    ReleaseIndexSource, SchemaSource, TableIdentifier, TableLoader,
};
use manifold_core::{Config, FileRecord, ReleaseRecord, RunReport, Severity};
use manifold_engine::Consolidator;
use manifold_manifest::discover;
use manifold_model::{resolve, DataModelIndex};

/// Manifold - cross-manifest metadata consolidation
#[derive(Parser)]
#[command(name = "manifold")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: manifold.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate manifests into per-component tables
    Run {
        /// Directory of submitted manifests (one subdirectory per center)
        manifests: PathBuf,

        /// Data model: a CSV export, or a BigQuery table as project.dataset.table
        #[arg(short, long)]
        data_model: String,

        /// Fileview snapshot CSV for file enrichment
        #[arg(long)]
        file_index: Option<PathBuf>,

        /// Release indicator snapshot CSV
        #[arg(long)]
        release_index: Option<PathBuf>,

        /// Directory for finalized table and schema JSON
        #[arg(short, long, default_value = "out")]
        out: PathBuf,

        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        report: PathBuf,

        /// Also load the finalized tables into the configured destination
        #[arg(long)]
        load: bool,
    },

    /// Resolve the attribute closure for one component
    Resolve {
        /// Component name (as it appears in the Component column)
        component: String,

        /// Data model: a CSV export, or a BigQuery table as project.dataset.table
        #[arg(short, long)]
        data_model: String,
    },

    /// Write a default config file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "manifold.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("manifold.toml").exists() {
        Config::from_file(Path::new("manifold.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Run {
            manifests,
            data_model,
            file_index,
            release_index,
            out,
            report,
            load,
        } => {
            run_command(
                &config,
                &manifests,
                &data_model,
                file_index.as_deref(),
                release_index.as_deref(),
                &out,
                &report,
                load,
                cli.verbose,
            )
            .await
        }
        Commands::Resolve {
            component,
            data_model,
        } => resolve_command(&config, &component, &data_model, cli.verbose).await,
        Commands::InitConfig { output } => init_config_command(&config, &output),
    }
}

/// Pick a schema source from the data model argument.
///
/// A path to an existing file (or anything ending in .csv) is read as a
/// CSV export; a project.dataset.table name goes to BigQuery.
async fn schema_source(data_model: &str) -> Result<Box<dyn SchemaSource>> {
    if Path::new(data_model).exists() || data_model.ends_with(".csv") {
        return Ok(Box::new(CsvSchemaSource::new(data_model)));
    }

    let parts: Vec<&str> = data_model.split('.').collect();
    if parts.len() == 3 {
        let source =
            manifold_catalog::BigQuerySchemaSource::with_adc(parts[0], parts[1], parts[2])
                .await
                .map_err(|e| anyhow::anyhow!("Failed to open BigQuery data model: {}", e))?;
        return Ok(Box::new(source));
    }

    Err(anyhow::anyhow!(
        "Data model '{}' is neither a CSV file nor a project.dataset.table name",
        data_model
    ))
}

/// Run command - discover, consolidate, finalize and write out
#[allow(clippy::too_many_arguments)]
async fn run_command(
    config: &Config,
    manifests: &Path,
    data_model: &str,
    file_index: Option<&Path>,
    release_index: Option<&Path>,
    out: &Path,
    report_path: &Path,
    load: bool,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading data model from:".cyan(), data_model);
    }

    let source = schema_source(data_model).await?;
    let rows = source
        .fetch_data_model()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch data model: {}", e))?;
    let index = DataModelIndex::from_rows(rows);

    if verbose {
        eprintln!("{} {} data model rows", "Indexed".cyan(), index.len());
        eprintln!("{} {}", "Discovering manifests under:".cyan(), manifests.display());
    }

    let submissions = discover(manifests)?;
    if submissions.is_empty() {
        eprintln!(
            "{} no manifests found under {}",
            "Warning:".yellow(),
            manifests.display()
        );
    }

    let file_index = match file_index {
        Some(path) => CsvFileIndexSource::new(path)
            .fetch_file_index()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read file index: {}", e))?,
        None => HashMap::<String, FileRecord>::new(),
    };
    let release_index = match release_index {
        Some(path) => CsvReleaseIndexSource::new(path)
            .fetch_release_index()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read release index: {}", e))?,
        None => HashMap::<String, ReleaseRecord>::new(),
    };

    let mut consolidator = Consolidator::new(index, config.clone());
    for submission in &submissions {
        let manifest = match submission.load() {
            Ok(manifest) => manifest,
            Err(e) => {
                eprintln!(
                    "{} {}: {}",
                    "Warning:".yellow(),
                    submission.path.display(),
                    e
                );
                continue;
            }
        };

        match consolidator.ingest(&manifest) {
            Some(component) => {
                if verbose {
                    eprintln!(
                        "  {} {} ({}, v{})",
                        "✓".green(),
                        component,
                        submission.manifest_id,
                        submission.version
                    );
                }
            }
            None => {
                if verbose {
                    eprintln!("  {} {}", "skipped".yellow(), submission.path.display());
                }
            }
        }
    }

    let output = consolidator.finish(&file_index, &release_index)?;

    // Write finalized tables and schemas as JSON
    let json_loader = JsonLoader::new(out);
    for finalized in &output.tables {
        let destination = TableIdentifier::new(
            &config.destination.project,
            &config.destination.dataset,
            &finalized.component,
        );
        json_loader
            .load(&finalized.table, &finalized.schema, &destination)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", finalized.component, e))?;
    }

    if verbose {
        eprintln!(
            "{} {} tables to {}",
            "Wrote".green(),
            output.tables.len(),
            out.display()
        );
    }

    if load {
        load_tables(config, &output.tables, verbose).await?;
    }

    output.report.save_to_file(report_path)?;
    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), report_path.display());
    }

    print_report_summary(&output.report);

    if output.report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Load finalized tables into the configured destination
async fn load_tables(
    config: &Config,
    tables: &[manifold_engine::FinalizedTable],
    verbose: bool,
) -> Result<()> {
    let loader = manifold_catalog::BigQueryLoader::with_adc()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create loader: {}", e))?;

    for finalized in tables {
        let destination = TableIdentifier::new(
            &config.destination.project,
            &config.destination.dataset,
            &finalized.component,
        );

        if verbose {
            eprintln!("{} {}...", "Loading".cyan(), destination);
        }

        loader
            .load(&finalized.table, &finalized.schema, &destination)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", destination, e))?;
    }

    Ok(())
}

/// Resolve command - print the attribute closure for a component
async fn resolve_command(
    config: &Config,
    component: &str,
    data_model: &str,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading data model from:".cyan(), data_model);
    }

    let source = schema_source(data_model).await?;
    let rows = source
        .fetch_data_model()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch data model: {}", e))?;
    let index = DataModelIndex::from_rows(rows);

    let resolution = resolve(&index, component, &config.augmentations)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{} {}", "Component:".bold(), resolution.component.green());
    println!(
        "{} {}",
        "Attributes:".bold(),
        resolution.attributes.to_columns().len()
    );
    println!();
    for attribute in resolution.attributes.iter() {
        println!("  {}", attribute);
    }

    if !resolution.diagnostics.is_empty() {
        println!();
        println!("{}", "Diagnostics:".bold());
        for diag in &resolution.diagnostics {
            println!("  [{}] {}: {}", diag.severity, diag.code, diag.message);
        }
    }

    Ok(())
}

/// Init-config command - write the default config for editing
fn init_config_command(config: &Config, output: &Path) -> Result<()> {
    if output.exists() {
        return Err(anyhow::anyhow!(
            "{} already exists; remove it first",
            output.display()
        ));
    }

    config.save_to_file(output)?;
    println!("{} {}", "Wrote".green(), output.display());
    Ok(())
}

/// Print report summary to stdout
fn print_report_summary(report: &RunReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Consolidation Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Manifests processed: {}", report.summary.manifests_processed);
    println!("  Manifests skipped:   {}", report.summary.manifests_skipped);
    println!("  Components:          {}", report.summary.components);
    println!("  Total diagnostics:   {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Diagnostics:".bold());
        for diag in &report.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

            if let Some(component) = &diag.component {
                println!("    Component: {}", component);
            }
            if let Some(attribute) = &diag.attribute {
                println!("    Attribute: {}", attribute);
            }
            if let Some(manifest_id) = &diag.manifest_id {
                println!("    Manifest:  {}", manifest_id);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
