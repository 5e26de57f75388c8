use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use edgar_lookup::{
    config::Config,
    database::Database,
    dataset::{Dataset, DocumentLayout},
    services::CompanyLookupService,
    sources::{DatasetSourceKind, DocumentSource, FileSource},
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "edgar-lookup")]
#[command(version)]
#[command(about = "Read-only CIK and ticker lookups over EDGAR company data")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Download the dataset from this URL (selects the http source)
    #[arg(long, value_name = "URL", conflicts_with = "dataset_path")]
    dataset_url: Option<String>,

    /// Read the dataset from this file (selects the file source)
    #[arg(long, value_name = "PATH")]
    dataset_path: Option<PathBuf>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL", global = true)]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Replace the `companies` table with the contents of a JSON document
    Import {
        /// JSON document, gzip-compressed or plain
        #[arg(short, long)]
        input: PathBuf,
        /// Key interpretation of the document
        #[arg(long, default_value = "by_identifier")]
        layout: DocumentLayout,
    },
    /// Run a single lookup and print the result as JSON
    Lookup {
        #[arg(long, required_unless_present = "ticker", conflicts_with = "ticker")]
        cik: Option<String>,
        #[arg(long)]
        ticker: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    if cli.write_default_config {
        if Path::new(&cli.config).exists() {
            anyhow::bail!("Refusing to overwrite existing config file {}", cli.config);
        }
        return Config::write_default(&cli.config);
    }

    let mut config = Config::load_from_file(&cli.config)?;
    apply_overrides(&mut config, &cli);
    config.validate()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Import { input, layout } => import(config, &input, layout).await,
        Command::Lookup { cik, ticker } => lookup(config, cik, ticker).await,
    }
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("edgar_lookup={level},tower_http={level}").into());
    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for `lookup` output
    match format {
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
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.web.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(url) = &cli.dataset_url {
        config.dataset.source = DatasetSourceKind::Http;
        config.dataset.url = Some(url.clone());
    }
    if let Some(path) = &cli.dataset_path {
        config.dataset.source = DatasetSourceKind::File;
        config.dataset.path = path.clone();
    }
    if let Some(database_url) = &cli.database_url {
        config.database.url = database_url.clone();
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting EDGAR lookup service v{}", env!("CARGO_PKG_VERSION"));

    let service = Arc::new(CompanyLookupService::from_config(&config).await?);

    if config.dataset.preload {
        match service.preload().await {
            Ok(()) => info!("Dataset preloaded"),
            Err(e) => warn!("Dataset preload failed, will retry on first request: {}", e),
        }
    }

    let web_server = WebServer::new(&config.web, service)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await
}

async fn import(config: Config, input: &Path, layout: DocumentLayout) -> Result<()> {
    let source = FileSource::new(input);
    let raw = source.fetch().await?;
    let dataset = Dataset::from_document(&raw, layout)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    info!("Decoded {} companies from {}", dataset.len(), source.describe());

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    let imported = database
        .company_store()
        .replace_all(dataset.records())
        .await
        .context("Failed to import companies")?;

    info!("Imported {} companies into {}", imported, database.database_type);
    Ok(())
}

async fn lookup(config: Config, cik: Option<String>, ticker: Option<String>) -> Result<()> {
    let service = CompanyLookupService::from_config(&config).await?;

    let output = match (cik, ticker) {
        (Some(cik), _) => match service.find_by_identifier(&cik).await? {
            Some(record) => serde_json::to_string_pretty(&record)?,
            None => anyhow::bail!("CIK not found"),
        },
        (None, Some(ticker)) => match service.find_by_ticker(&ticker).await? {
            Some(records) => serde_json::to_string_pretty(&records)?,
            None => anyhow::bail!("Ticker not found"),
        },
        (None, None) => anyhow::bail!("Either --cik or --ticker is required"),
    };

    println!("{output}");
    Ok(())
}
