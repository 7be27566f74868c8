//! Command-line interface for sandbox-sim
//!
//! # Usage Examples
//!
//! ## Mock payloads
//! ```bash
//! # Three seeded positions from the custodian mock
//! sandbox-sim generate --connector custodian_mock --entity positions --count 3 --seed 12345
//! ```
//!
//! ## Jobs
//! ```bash
//! # Sync ten positions without phase delays
//! sandbox-sim --no-delay job --connector custodian_mock --entity positions --batch-size 10
//!
//! # Always fail with a timeout or rate limit
//! sandbox-sim job --entity invoices --failure-rate 100 \
//!   --error-kind timeout --error-kind rate_limit
//!
//! # Apply mapping rules and dump the audit log as CSV
//! sandbox-sim --export csv job --entity contacts --rules rules.yaml
//! ```
//!
//! ## Replays
//! ```bash
//! sandbox-sim replay --event webhook.test --count 5 \
//!   --webhook-url https://example.test/hooks --header x-tenant=acme
//! ```
//!
//! ## Simulation files
//! ```bash
//! sandbox-sim run demos/simulation.yaml
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sandbox_sim::job::JobProgress;
use sandbox_sim::{
    EngineSettings, ErrorInjectionPolicy, EventKind, InjectedErrorKind, JobConfig, JobKind,
    MemoryRecordSink, ReplayConfig, ReplayProgress, SandboxEngine, SimulationFile, WebhookTarget,
};
use serde::Serialize;
use sim_audit::ExportFormat;
use sim_core::EntityKind;
use sim_mapping::RuleSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sandbox-sim")]
#[command(about = "Simulate connector jobs, field mappings and webhook replays in a sandbox")]
#[command(long_about = None)]
struct Cli {
    /// Skip the artificial pauses between job phases and replayed events
    #[arg(long, global = true)]
    no_delay: bool,

    /// Print the audit log to stdout after the command finishes
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    export: Option<ExportArg>,

    /// Environment recorded on jobs, replays and log entries
    #[arg(
        long,
        global = true,
        env = "SANDBOX_ENVIRONMENT",
        default_value = "sandbox"
    )]
    environment: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a deterministic mock connector payload
    Generate {
        /// Connector the payload is attributed to
        #[arg(long, default_value = "custodian_mock")]
        connector: String,

        /// Entity name (e.g. positions, transactions, contacts)
        #[arg(long)]
        entity: String,

        /// Number of records to generate
        #[arg(long, default_value_t = 10)]
        count: usize,

        /// Reset the generator to this seed first
        #[arg(long)]
        seed: Option<u32>,
    },

    /// Run one simulated connector job
    Job {
        /// Connector the job runs against
        #[arg(long, default_value = "custodian_mock")]
        connector: String,

        /// Job operation
        #[arg(long, value_enum, default_value = "sync")]
        kind: JobKind,

        /// Entity to fetch
        #[arg(long)]
        entity: EntityKind,

        /// Records fetched by the job
        #[arg(long, default_value_t = 10)]
        batch_size: usize,

        /// Reset the generator to this seed before fetching
        #[arg(long)]
        seed: Option<u32>,

        /// YAML file with mapping, transform and validation rules
        #[arg(long, value_name = "PATH")]
        rules: Option<PathBuf>,

        /// Percentage (0-100) chance the job fails before fetching
        #[arg(long)]
        failure_rate: Option<f64>,

        /// Error kinds to inject (repeatable; defaults to every kind)
        #[arg(long = "error-kind", value_enum, value_name = "KIND")]
        error_kinds: Vec<InjectedErrorKind>,

        /// Percentage (0-100) of records whose identifiers are stripped
        #[arg(long)]
        invalid_field_rate: Option<f64>,
    },

    /// Replay synthetic events, optionally to a simulated webhook
    Replay {
        /// Event kind (e.g. webhook.test, invoice.paid)
        #[arg(long)]
        event: EventKind,

        /// Number of events to replay
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Webhook URL deliveries are addressed to
        #[arg(long)]
        webhook_url: Option<String>,

        /// Extra webhook header (format: NAME=VALUE, repeatable)
        #[arg(long = "header", value_name = "NAME=VALUE", requires = "webhook_url")]
        headers: Vec<String>,
    },

    /// Run every job and replay in a simulation file
    Run {
        /// Simulation YAML file
        #[arg(value_name = "PATH")]
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportArg {
    Json,
    Csv,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Json => ExportFormat::Json,
            ExportArg::Csv => ExportFormat::Csv,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for results
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let no_delay = cli.no_delay;

    let engine = match cli.command {
        Commands::Generate {
            connector,
            entity,
            count,
            seed,
        } => {
            let engine = SandboxEngine::new(settings(EngineSettings::default(), no_delay));
            let payload = engine
                .generate_mock_payload(&connector, &entity, count, seed)
                .await?;
            print_json(&payload)?;
            engine
        }
        Commands::Job {
            connector,
            kind,
            entity,
            batch_size,
            seed,
            rules,
            failure_rate,
            error_kinds,
            invalid_field_rate,
        } => {
            let mut config = JobConfig::new(connector, kind, entity, batch_size)
                .with_environment(cli.environment);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            if let Some(path) = rules {
                config = config.with_rules(load_rules(&path)?);
            }
            if failure_rate.is_some() || invalid_field_rate.is_some() || !error_kinds.is_empty() {
                let policy = ErrorInjectionPolicy::failing(failure_rate.unwrap_or(0.0))
                    .with_kinds(error_kinds)
                    .with_invalid_field_rate(invalid_field_rate.unwrap_or(0.0));
                policy.validate().context("Invalid error injection")?;
                config = config.with_error_injection(policy);
            }

            let saved = Arc::new(MemoryRecordSink::new());
            let engine = SandboxEngine::builder(settings(EngineSettings::default(), no_delay))
                .record_sink(saved.clone())
                .build();
            let report = |progress: &JobProgress| {
                eprintln!(
                    "[{:>3}%] {} ({} records)",
                    progress.percent, progress.message, progress.records_processed
                );
            };
            let result = engine.jobs().run(config, Some(&report)).await;
            info!(job_id = %result.job_id, saved = saved.len(), "Job finished");
            print_json(&result)?;
            engine
        }
        Commands::Replay {
            event,
            count,
            webhook_url,
            headers,
        } => {
            let mut config = ReplayConfig::new(cli.environment, event, count);
            if let Some(url) = webhook_url {
                let mut target = WebhookTarget::new(url);
                for header in &headers {
                    let (name, value) = parse_header(header)?;
                    target = target.with_header(name, value);
                }
                config = config.with_webhook(target);
            }

            let engine = SandboxEngine::new(settings(EngineSettings::default(), no_delay));
            let report = |progress: &ReplayProgress| {
                eprintln!(
                    "[{}/{}] {}",
                    progress.current, progress.total, progress.event_id
                );
            };
            let result = engine.replays().run(&config, Some(&report)).await;
            print_json(&result)?;
            engine
        }
        Commands::Run { file } => {
            let simulation = SimulationFile::from_file(&file)
                .with_context(|| format!("Failed to load simulation file {}", file.display()))?;
            let engine = SandboxEngine::new(settings(simulation.settings.clone(), no_delay));
            let report = engine.run_file(&simulation).await;
            print_json(&report)?;
            engine
        }
    };

    if let Some(format) = cli.export {
        let exported = engine
            .log()
            .export(format.into())
            .context("Failed to export audit log")?;
        println!("{exported}");
    }

    Ok(())
}

fn settings(mut settings: EngineSettings, no_delay: bool) -> EngineSettings {
    if no_delay {
        settings.phase_delay_ms = 0;
        settings.event_delay_ms = 0;
    }
    settings
}

fn load_rules(path: &Path) -> anyhow::Result<RuleSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    RuleSet::from_yaml(&content)
        .with_context(|| format!("Failed to parse rules file {}", path.display()))
}

fn parse_header(header: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = header
        .split_once('=')
        .with_context(|| format!("Invalid header '{header}', expected NAME=VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Invalid header '{header}', name is empty");
    }
    Ok((name, value.trim()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
