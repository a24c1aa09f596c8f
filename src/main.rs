use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use fresher_intake::{
    config::Config,
    database::{Database, SeaOrmStore},
    ingestor::IngestionService,
    job_scheduling::SchedulerService,
    models::{IngestionSourceCreateRequest, PostingType, SourceType},
    notifications::NotificationDispatcher,
    repositories::SourceRepository,
    sources::SourceAdapterRegistry,
    utils::{HttpClientFactory, UrlUtils},
    verification::{HttpLinkProber, LinkVerificationService, VerificationStats},
};

#[derive(Parser)]
#[command(name = "fresher-intake")]
#[command(version)]
#[command(about = "Ingests entry-level job postings and quarantines stale apply links")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE", default_value = "config.toml", global = true)]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL", global = true)]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Apply database migrations
    Migrate,
    /// Run one ingestion cycle and print the summary as JSON
    Ingest {
        /// Run only this source, ignoring its re-run interval
        #[arg(long, value_name = "ID")]
        source: Option<Uuid>,
    },
    /// Run one link verification pass and print the summary as JSON
    Verify,
    /// Run both pipelines on their cron schedules until interrupted
    Daemon,
    /// Manage ingestion sources
    Sources {
        #[command(subcommand)]
        command: SourcesCommand,
    },
}

#[derive(Subcommand)]
enum SourcesCommand {
    /// List configured sources
    List,
    /// Register a new source
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        endpoint: String,
        /// json_feed, workday or custom
        #[arg(long = "type")]
        source_type: SourceType,
        /// job, internship or walk_in
        #[arg(long, default_value = "job")]
        posting_type: PostingType,
        #[arg(long, default_value_t = 60)]
        frequency_minutes: i64,
        /// Create the source disabled
        #[arg(long)]
        disabled: bool,
    },
}

struct Pipelines {
    ingestion: Arc<IngestionService<SeaOrmStore>>,
    verification: Arc<LinkVerificationService<SeaOrmStore>>,
}

fn build_pipelines(config: &Config, store: Arc<SeaOrmStore>) -> Result<Pipelines> {
    let factory = HttpClientFactory::from_config(&config.http);
    let fetch_client = factory.create_client(config.http.fetch_timeout)?;
    let registry = Arc::new(SourceAdapterRegistry::with_defaults(fetch_client));
    let dispatcher = NotificationDispatcher::from_config(&config.notifications, &factory);
    let prober = Arc::new(HttpLinkProber::from_config(&config.verification, &factory)?);

    info!(
        "Notification channels: {}",
        dispatcher.channel_names().join(", ")
    );

    Ok(Pipelines {
        ingestion: Arc::new(IngestionService::new(
            store.clone(),
            registry,
            config.ingestion.clone(),
            dispatcher.clone(),
        )),
        verification: Arc::new(LinkVerificationService::new(
            store,
            prober,
            config.verification.clone(),
            dispatcher,
        )),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output on stdout stays machine readable
    let log_filter = format!("fresher_intake={}", cli.log_level);
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| log_filter.into()),
    );
    match cli.log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    let mut config = Config::load_from_file(&cli.config)?;
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    info!(
        "fresher-intake v{} using configuration '{}'",
        env!("CARGO_PKG_VERSION"),
        cli.config
    );

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    let store = Arc::new(database.store());

    match cli.command {
        Command::Migrate => {
            info!("Database is up to date");
        }
        Command::Ingest { source } => {
            if config.ingestion.owner_id().is_none() {
                tracing::warn!(
                    "ingestion.default_owner_id is not set; runs that need to create drafts will fail"
                );
            }
            let pipelines = build_pipelines(&config, store)?;
            match source {
                Some(source_id) => {
                    print_json(&pipelines.ingestion.run_source_by_id(source_id).await?)?
                }
                None => print_json(&pipelines.ingestion.run_cycle().await?)?,
            }
        }
        Command::Verify => {
            let pipelines = build_pipelines(&config, store)?;
            let mut stats = VerificationStats::new();
            let summary = pipelines.verification.run(&mut stats).await?;
            print_json(&summary)?;
        }
        Command::Daemon => {
            let pipelines = build_pipelines(&config, store)?;
            let scheduler = Arc::new(SchedulerService::new(
                pipelines.ingestion,
                pipelines.verification,
                config.scheduler.clone(),
            ));

            let cancellation_token = CancellationToken::new();
            let handle = tokio::spawn(scheduler.run(cancellation_token.clone()));

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
            cancellation_token.cancel();
            handle.await??;
        }
        Command::Sources { command } => match command {
            SourcesCommand::List => {
                for source in store.list_sources().await? {
                    println!(
                        "{}  {:<24} {:<10} every {:>4}m  {:<8} last run {}",
                        source.id,
                        source.name,
                        source.source_type,
                        source.run_frequency_minutes,
                        if source.enabled { "enabled" } else { "disabled" },
                        source
                            .last_run_at
                            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                            .unwrap_or_else(|| "never".to_string())
                    );
                }
            }
            SourcesCommand::Add {
                name,
                endpoint,
                source_type,
                posting_type,
                frequency_minutes,
                disabled,
            } => {
                if !UrlUtils::is_http_url(&endpoint) {
                    anyhow::bail!("endpoint must be an http(s) URL: {endpoint}");
                }
                if frequency_minutes <= 0 {
                    anyhow::bail!("--frequency-minutes must be greater than zero");
                }

                let source = store
                    .create_source(IngestionSourceCreateRequest {
                        name,
                        endpoint,
                        source_type,
                        default_posting_type: posting_type,
                        run_frequency_minutes: frequency_minutes,
                        enabled: !disabled,
                    })
                    .await?;
                print_json(&source)?;
            }
        },
    }

    Ok(())
}
