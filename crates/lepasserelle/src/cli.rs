// CLI Interface
//
// This module provides the `lesuivi` command-line interface.

use crate::config::AppConfig;
use crate::sample::seed_sample_data;
use anyhow::{Context, Result as AnyhowResult};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use lemodele::dates::utc_now;
use lerecit::ProjectSummarizer;
use leserve::LeServeServer;
use lestockage::{Analytics, Portfolio, Storage};
use lexport::{FlatCsvExporter, JiraExporter, PowerBiExporter, PowerBiTable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// LeSuivi - Project Tracking and Status Narratives
#[derive(Parser, Debug)]
#[command(name = "lesuivi")]
#[command(author = "LeSuivi Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track projects, milestones and risks, and write plain-language status summaries", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./lesuivi.toml when present)
    #[arg(global = true, long = "config", short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(global = true, long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Host address to bind to
        #[arg(long = "host")]
        host: Option<String>,

        /// Port to listen on
        #[arg(long = "port")]
        port: Option<u16>,
    },

    /// Create the database schema
    InitDb,

    /// Insert the sample portfolio
    Seed {
        /// RNG seed for a reproducible portfolio
        #[arg(long = "seed")]
        seed: Option<u64>,
    },

    /// Print the narrative summary of one project
    Summarize {
        /// Project ID
        #[arg(value_name = "PROJECT_ID")]
        project_id: i64,
    },

    /// Print portfolio KPIs
    Kpi,

    /// Write export files
    Export {
        /// Export format
        #[arg(value_enum)]
        format: ExportFormat,

        /// Output directory
        #[arg(long = "out", value_name = "DIR")]
        out: Option<PathBuf>,

        /// Jira project key
        #[arg(long = "project-key")]
        project_key: Option<String>,

        /// Jira assignee
        #[arg(long = "assignee")]
        assignee: Option<String>,
    },
}

/// Export file families
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// One flat CSV of projects, milestones and risks
    Csv,
    /// Jira issue import CSV
    Jira,
    /// Power BI tables, one CSV per table
    Powerbi,
}

/// A file written by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// Where it was written
    pub path: PathBuf,
    /// Data rows, header excluded
    pub rows: usize,
}

impl Cli {
    /// Run the CLI
    pub async fn run(self) -> AnyhowResult<()> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        config.apply_env();

        if let Commands::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
        if let Commands::Export {
            out,
            project_key,
            assignee,
            ..
        } = &self.command
        {
            if let Some(out) = out {
                config.export.out_dir = out.clone();
            }
            if let Some(key) = project_key {
                config.export.jira_project_key = key.clone();
            }
            if assignee.is_some() {
                config.export.jira_assignee = assignee.clone();
            }
        }
        config.validate()?;

        init_logging_impl(self.verbose, &config.server.log_level);

        match self.command {
            Commands::Serve { .. } => cmd_serve_impl(config).await,
            Commands::InitDb => cmd_init_db_impl(&config),
            Commands::Seed { seed } => cmd_seed_impl(&config, seed),
            Commands::Summarize { project_id } => cmd_summarize_impl(&config, project_id).await,
            Commands::Kpi => cmd_kpi_impl(&config),
            Commands::Export { format, .. } => cmd_export_impl(&config, format),
        }
    }
}

/// Initialize logging implementation
fn init_logging_impl(verbose: bool, configured_level: &str) {
    let level = if verbose { "debug" } else { configured_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn open_storage(config: &AppConfig) -> AnyhowResult<Storage> {
    Storage::from_config(&config.storage)
        .with_context(|| format!("Failed to open database: {}", config.storage.db_path))
}

/// Serve command implementation
async fn cmd_serve_impl(config: AppConfig) -> AnyhowResult<()> {
    let model_config = config.summarizer.clone();
    let summarizer = tokio::task::spawn_blocking(move || ProjectSummarizer::from_config(&model_config))
        .await
        .context("Summarizer initialization task failed")?;

    let server = LeServeServer::new(config.server.clone(), &config.storage, summarizer)
        .context("Failed to create server")?;

    println!("\nLeSuivi API\n");
    println!("Server starting on {}", server.server_url());
    println!("Database: {}", config.storage.db_path);
    println!("\nPress Ctrl+C to stop the server\n");

    let result = server.start().await.context("Server error");

    // The model client owns a blocking runtime and must be dropped off the async one.
    tokio::task::spawn_blocking(move || drop(server))
        .await
        .context("Server shutdown task failed")?;
    result
}

/// Init-db command implementation
fn cmd_init_db_impl(config: &AppConfig) -> AnyhowResult<()> {
    open_storage(config)?;
    info!(db_path = %config.storage.db_path, "Database initialized");
    println!("Database initialized at {}", config.storage.db_path);
    Ok(())
}

/// Seed command implementation
fn cmd_seed_impl(config: &AppConfig, seed: Option<u64>) -> AnyhowResult<()> {
    let mut storage = open_storage(config)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = seed_sample_data(&mut storage, &mut rng, utc_now()).context("Failed to create sample data")?;
    println!("Created {report}");
    Ok(())
}

/// Summarize command implementation
async fn cmd_summarize_impl(config: &AppConfig, project_id: i64) -> AnyhowResult<()> {
    let bundle = {
        let storage = open_storage(config)?;
        Portfolio::load_project(&storage, project_id)
            .with_context(|| format!("Failed to load project {project_id}"))?
    };

    let model_config = config.summarizer.clone();
    let summary = tokio::task::spawn_blocking(move || {
        ProjectSummarizer::from_config(&model_config).summarize_bundle(&bundle, utc_now())
    })
    .await
    .context("Summary task failed")?;

    info!(project_id, source = ?summary.source, "Summary generated");
    println!("{}", summary.text);
    Ok(())
}

/// Kpi command implementation
fn cmd_kpi_impl(config: &AppConfig) -> AnyhowResult<()> {
    let storage = open_storage(config)?;
    print!("{}", kpi_report(&storage, utc_now())?);
    Ok(())
}

/// Export command implementation
fn cmd_export_impl(config: &AppConfig, format: ExportFormat) -> AnyhowResult<()> {
    let storage = open_storage(config)?;
    let files = write_export(&storage, config, format, utc_now())?;
    for file in &files {
        println!("{} ({} rows)", file.path.display(), file.rows);
    }
    Ok(())
}

/// Text KPI report: headline numbers, dashboard KPIs and breakdowns.
pub fn kpi_report(storage: &Storage, now: NaiveDateTime) -> AnyhowResult<String> {
    let analytics = Analytics::new(storage);
    let stats = analytics.portfolio_stats()?;
    let kpis = analytics.kpis(now)?;

    let mut out = String::new();
    writeln!(out, "{stats}")?;
    writeln!(out)?;
    writeln!(out, "Projects On Track: {:.2}%", kpis.projects_on_track)?;
    writeln!(out, "Average Delay: {:.2}%", kpis.avg_delay_percentage)?;
    writeln!(out, "High Risks: {}", kpis.high_risk_count)?;
    writeln!(out, "Milestone Completion: {:.2}%", kpis.milestone_completion)?;

    writeln!(out, "\nProjects by Status:")?;
    for row in analytics.count_projects_by_status()? {
        writeln!(out, "  {}: {}", row.status, row.count)?;
    }
    writeln!(out, "\nRisks by Severity:")?;
    for row in analytics.count_risks_by_severity()? {
        writeln!(out, "  {}: {}", row.label, row.count)?;
    }
    writeln!(out, "\nCompletion by Owner:")?;
    for row in analytics.completion_by_owner()? {
        writeln!(
            out,
            "  {}: {:.1}% ({} projects)",
            row.owner, row.avg_completion, row.projects
        )?;
    }
    Ok(out)
}

/// Write one export family into `config.export.out_dir`.
pub fn write_export(
    storage: &Storage,
    config: &AppConfig,
    format: ExportFormat,
    now: NaiveDateTime,
) -> AnyhowResult<Vec<ExportedFile>> {
    let bundles = Portfolio::load(storage).context("Failed to load portfolio")?;
    let out_dir = config.export.out_dir.as_path();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();

    let files = match format {
        ExportFormat::Csv => {
            let csv = FlatCsvExporter::new().export(&bundles)?;
            let rows = csv.lines().count().saturating_sub(1);
            let path = write_file(out_dir, &format!("project_export_{stamp}.csv"), &csv)?;
            vec![ExportedFile { path, rows }]
        }
        ExportFormat::Jira => {
            let exporter = JiraExporter::new(config.export.jira_project_key.clone())
                .with_assignee(config.export.jira_assignee.clone());
            let (csv, stats) = exporter.export(&bundles, now)?;
            info!(
                epics = stats.epics,
                stories = stats.stories,
                risks = stats.risks,
                "Jira export built"
            );
            let path = write_file(out_dir, &format!("jira_import_{stamp}.csv"), &csv)?;
            vec![ExportedFile {
                path,
                rows: stats.total(),
            }]
        }
        ExportFormat::Powerbi => {
            let tables = PowerBiExporter::new().export(&bundles, now)?;
            let paths = tables.write_to_dir(out_dir, &stamp)?;
            paths
                .into_iter()
                .zip(PowerBiTable::ALL)
                .map(|(path, table)| ExportedFile {
                    path,
                    rows: tables.rows(table),
                })
                .collect()
        }
    };

    Ok(files)
}

fn write_file(dir: &Path, name: &str, content: &str) -> AnyhowResult<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

/// Main entry point for the CLI
pub async fn main() -> AnyhowResult<()> {
    let cli = Cli::parse();
    cli.run().await
}
