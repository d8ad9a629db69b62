//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use kbagent_ingest::{
    BedrockAgentIngestionClient, DocumentOutcome, DryRunIngestionClient, FileStatus,
    IngestProgress, IngestionClient, ingest_files,
};
use kbagent_query::{BedrockModelClient, S3ObjectStore};
use kbagent_shared::{
    AppConfig, IngestConfig, QueryConfig, QueryEvent, env_vars, init_config, load_config,
    load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// kbagent: feed CSV knowledge into a knowledge base and ask questions about it.
#[derive(Parser)]
#[command(
    name = "kbagent",
    version,
    about = "Ingest CSV files into a knowledge base and answer questions grounded in it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.kbagent/kbagent.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ingest CSV files into the knowledge base, one document per row.
    Ingest {
        /// CSV files to ingest (defaults to the configured list).
        files: Vec<PathBuf>,

        /// Target knowledge base id.
        #[arg(long)]
        knowledge_base_id: Option<String>,

        /// Data source to start ingestion jobs on.
        #[arg(long)]
        data_source_id: Option<String>,

        /// AWS region.
        #[arg(long)]
        region: Option<String>,

        /// Log the ingestion requests without calling the service.
        #[arg(long)]
        dry_run: bool,
    },

    /// Answer a question from the knowledge-base files, like the Lambda handler.
    Query {
        /// Question to ask (defaults to the configured default prompt).
        #[arg(short, long)]
        prompt: Option<String>,

        /// Hosted model id.
        #[arg(long)]
        model_id: Option<String>,

        /// Bucket holding the knowledge-base files.
        #[arg(long)]
        bucket: Option<String>,

        /// Object key to include (repeatable; defaults to the configured list).
        #[arg(long = "file")]
        files: Vec<String>,

        #[arg(long)]
        max_tokens: Option<u32>,

        #[arg(long)]
        temperature: Option<f32>,

        /// Raw handler event as JSON; flags override its fields.
        #[arg(long)]
        event: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration (file + environment).
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "kbagent=info",
        1 => "kbagent=debug",
        _ => "kbagent=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let app = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Ingest {
            files,
            knowledge_base_id,
            data_source_id,
            region,
            dry_run,
        } => {
            let mut config = IngestConfig::from(&app);
            if !files.is_empty() {
                config.csv_files = files;
            }
            if knowledge_base_id.is_some() {
                config.knowledge_base_id = knowledge_base_id;
            }
            if data_source_id.is_some() {
                config.data_source_id = data_source_id;
            }
            if let Some(region) = region {
                config.region = region;
            }
            cmd_ingest(&config, dry_run).await
        }
        Command::Query {
            prompt,
            model_id,
            bucket,
            files,
            max_tokens,
            temperature,
            event,
        } => {
            let mut config = QueryConfig::from(&app);
            if bucket.is_some() {
                config.bucket = bucket;
            }
            if !files.is_empty() {
                config.files = files;
            }

            let mut query_event: QueryEvent = match event {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|e| eyre!("invalid --event JSON: {e}"))?,
                None => QueryEvent::default(),
            };
            query_event.prompt = prompt.or(query_event.prompt);
            query_event.model_id = model_id.or(query_event.model_id);
            query_event.max_tokens = max_tokens.or(query_event.max_tokens);
            query_event.temperature = temperature.or(query_event.temperature);

            cmd_query(query_event, &config, &app.aws.region).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&app).await,
        },
    }
}

/// Config file (explicit or default location) with environment overrides.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    config.apply_env();
    Ok(config)
}

async fn load_sdk_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Message shown instead of ingesting when no knowledge base is configured.
fn missing_knowledge_base_notice(config: &IngestConfig) -> Option<String> {
    config.knowledge_base_id.is_none().then(|| {
        format!(
            "Please set {} environment variable",
            env_vars::KNOWLEDGE_BASE_ID
        )
    })
}

async fn cmd_ingest(config: &IngestConfig, dry_run: bool) -> Result<()> {
    if let Some(notice) = missing_knowledge_base_notice(config) {
        println!("{notice}");
        return Ok(());
    }

    let client: Box<dyn IngestionClient> = match (&config.data_source_id, dry_run) {
        (Some(data_source_id), false) => {
            let sdk_config = load_sdk_config(&config.region).await;
            Box::new(BedrockAgentIngestionClient::from_conf(
                &sdk_config,
                data_source_id.clone(),
            ))
        }
        _ => Box::new(DryRunIngestionClient),
    };

    info!(
        client = client.name(),
        region = %config.region,
        files = config.csv_files.len(),
        "starting ingestion"
    );

    let reporter = CliProgress::new();
    let reports = ingest_files(config, client.as_ref(), &reporter).await;
    reporter.finish();
    let reports = reports?;

    println!();
    for report in &reports {
        match &report.status {
            FileStatus::Missing => {
                println!("  {}: not found", report.path.display());
            }
            FileStatus::Ingested(result) => {
                println!(
                    "  {}: {} submitted, {} failed",
                    report.path.display(),
                    result.submitted(),
                    result.failed()
                );
                for outcome in &result.outcomes {
                    if let DocumentOutcome::Failed { index, error } = outcome {
                        println!("    document {index}: {error}");
                    }
                }
            }
        }
    }
    println!();

    Ok(())
}

async fn cmd_query(event: QueryEvent, config: &QueryConfig, aws_region: &str) -> Result<()> {
    let sdk_config = load_sdk_config(aws_region).await;
    let store = S3ObjectStore::from_conf(&sdk_config);
    let model = BedrockModelClient::from_conf(&sdk_config, config.region.clone());

    let response = kbagent_query::handle(event, config, &store, &model).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.status_code() != 200 {
        return Err(eyre!("query failed with status {}", response.status_code()));
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar per CSV file.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl IngestProgress for CliProgress {
    fn file_started(&self, path: &Path, documents: usize) {
        self.bar.reset();
        self.bar.set_length(documents as u64);
        self.bar.set_message(path.display().to_string());
    }

    fn document_started(&self, _current: usize, _total: usize) {}

    fn document_finished(&self, outcome: &DocumentOutcome) {
        if let DocumentOutcome::Failed { index, .. } = outcome {
            self.bar.println(format!("  document {index} failed"));
        }
        self.bar.inc(1);
    }
}
