// # cfddns - Cloudflare dynamic DNS updater
//
// This binary is a THIN integration layer:
// - DO NOT add cycle logic here; it lives in cfddns-core
// - DO NOT add retry logic; a failed run is retried by the next scheduled run
//
// The cfddns binary is responsible for:
// 1. Loading `.env` and reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP resolver, Cloudflare updater and file state store
// 4. Running one sync cycle (or one lookup) and mapping the result to an
//    exit code
//
// ## Configuration
//
// - `API_TOKEN`: Cloudflare API token (required)
// - `ZONE_ID`, `RECORD_ID`, `RECORD_NAME`: the record to keep in sync
// - `PROXIED`: route traffic through Cloudflare (default: true)
// - `RECORD_TYPE`: A or AAAA (default: A)
// - `IP_FILE`: last applied address (default: current_ip.txt)
// - `IP_LOOKUP_URL`, `IP_LOOKUP_FORMAT`: address lookup service
// - `HTTP_TIMEOUT_SECS`: per-request timeout (default: 5)
// - `CLOUDFLARE_API_BASE`: API endpoint override
// - `DOMAIN_NAME`: domain for `cfddns zone-id`
// - `LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export API_TOKEN=your_token
// export ZONE_ID=023e105f4ecef8ad9ca31a8372d0c353
// export RECORD_ID=372e67954025e0ba6aaa6d586b9e0b59
// export RECORD_NAME='*.example.com'
//
// # crontab: */5 * * * * cd /opt/cfddns && ./cfddns
// cfddns
// ```

mod config;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use cfddns_core::{FileStateStore, SyncController, SyncError, SyncOutcome};
use cfddns_ip_http::HttpAddressResolver;
use cfddns_provider_cloudflare::{CloudflareClient, CloudflareUpdater};

use crate::config::{Config, validate_domain_name};

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CfddnsExitCode {
    /// Cycle completed (updated or unchanged) or lookup succeeded
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Current address could not be resolved, or state could not be read
    ResolutionFailed = 2,
    /// DNS record update failed
    UpdateFailed = 3,
    /// DNS record updated but the state file was not written
    PersistenceFailed = 4,
    /// Runtime error, failed lookup or nothing found
    RuntimeError = 5,
}

impl From<CfddnsExitCode> for ExitCode {
    fn from(code: CfddnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&SyncError> for CfddnsExitCode {
    fn from(err: &SyncError) -> Self {
        match err {
            SyncError::Resolution(_) | SyncError::StateRead(_) => CfddnsExitCode::ResolutionFailed,
            SyncError::Update { .. } => CfddnsExitCode::UpdateFailed,
            SyncError::Persistence { .. } => CfddnsExitCode::PersistenceFailed,
        }
    }
}

/// Keep a Cloudflare DNS record on this host's public IP address
#[derive(Debug, Parser)]
#[command(name = "cfddns", version, about)]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Log level (overrides LOG_LEVEL)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run one sync cycle (default)
    Sync,

    /// Print the zone ID of a domain
    ZoneId {
        /// Domain to look up (defaults to DOMAIN_NAME)
        #[arg(long)]
        domain: Option<String>,
    },

    /// Print the record ID of a DNS record
    RecordId {
        /// Zone to search (defaults to ZONE_ID)
        #[arg(long)]
        zone_id: Option<String>,

        /// Record name to look up (defaults to RECORD_NAME)
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = load_env_file(cli.env_file.as_deref()) {
        eprintln!("Configuration error: {}", e);
        return CfddnsExitCode::ConfigError.into();
    }

    // Load configuration from environment
    let mut config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return CfddnsExitCode::ConfigError.into();
        }
    };

    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return CfddnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&config.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CfddnsExitCode::ConfigError.into();
    }

    // One cycle per process; nothing runs concurrently
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CfddnsExitCode::RuntimeError.into();
        }
    };

    let command = cli.command.unwrap_or(Command::Sync);
    let code = rt.block_on(async {
        match command {
            Command::Sync => run_sync(&config).await,
            Command::ZoneId { domain } => run_zone_id(&config, domain).await,
            Command::RecordId { zone_id, name } => run_record_id(&config, zone_id, name).await,
        }
    });

    code.into()
}

/// Load `path`, or `./.env` when present
///
/// Variables already set in the environment are not overridden.
fn load_env_file(path: Option<&Path>) -> Result<(), dotenvy::Error> {
    match path {
        Some(path) => dotenvy::from_path(path),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(e) if e.not_found() => Ok(()),
            Err(e) => Err(e),
        },
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Run one sync cycle
async fn run_sync(config: &Config) -> CfddnsExitCode {
    let sync = match config.sync_config() {
        Ok(sync) => sync,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return CfddnsExitCode::ConfigError;
        }
    };

    let resolver = match HttpAddressResolver::new(&sync.resolver) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("Failed to create address resolver: {}", e);
            return CfddnsExitCode::ConfigError;
        }
    };

    let updater = match CloudflareUpdater::new(&sync.provider, &sync.record) {
        Ok(updater) => updater,
        Err(e) => {
            error!("Failed to create Cloudflare updater: {}", e);
            return CfddnsExitCode::ConfigError;
        }
    };

    let state_store = match FileStateStore::new(&sync.state_file).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open state file {}: {}", sync.state_file.display(), e);
            return CfddnsExitCode::ConfigError;
        }
    };

    let controller = SyncController::new(
        Box::new(resolver),
        Box::new(updater),
        Box::new(state_store),
        sync.record.reference(),
    );

    info!("Syncing {} via {}", controller.record(), sync.resolver.url);

    match controller.run_cycle().await {
        Ok(outcome) => {
            println!("{}", describe_outcome(&outcome));
            CfddnsExitCode::Success
        }
        Err(e) => {
            eprintln!("{}", e);
            CfddnsExitCode::from(&e)
        }
    }
}

fn describe_outcome(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Unchanged { .. } => "IP address has not changed.".to_string(),
        SyncOutcome::Updated {
            previous: Some(previous),
            current,
        } => format!("IP address changed from {} to {}", previous, current),
        SyncOutcome::Updated {
            previous: None,
            current,
        } => format!("IP address set to {} (no previous address recorded)", current),
    }
}

/// Print the zone ID for a domain
async fn run_zone_id(config: &Config, domain: Option<String>) -> CfddnsExitCode {
    let Some(domain) = domain.or_else(|| config.domain_name.clone()) else {
        eprintln!("DOMAIN_NAME is required. Set it via: export DOMAIN_NAME=example.com, or pass --domain");
        return CfddnsExitCode::ConfigError;
    };
    if let Err(e) = validate_domain_name(&domain) {
        eprintln!("Configuration error: {}", e);
        return CfddnsExitCode::ConfigError;
    }

    let client = match CloudflareClient::new(&config.provider_config()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return CfddnsExitCode::ConfigError;
        }
    };

    match client.find_zone_id(&domain).await {
        Ok(Some(zone_id)) => {
            println!("Zone ID for {}: {}", domain, zone_id);
            CfddnsExitCode::Success
        }
        Ok(None) => {
            println!("No zones found for the given domain.");
            CfddnsExitCode::RuntimeError
        }
        Err(e) => {
            eprintln!("Error fetching Zone ID: {}", e);
            CfddnsExitCode::RuntimeError
        }
    }
}

/// Print the record ID for a record name
async fn run_record_id(
    config: &Config,
    zone_id: Option<String>,
    name: Option<String>,
) -> CfddnsExitCode {
    let Some(zone_id) = zone_id.or_else(|| config.zone_id.clone()) else {
        eprintln!("ZONE_ID is required. Set it via: export ZONE_ID=..., or pass --zone-id");
        return CfddnsExitCode::ConfigError;
    };
    let Some(name) = name.or_else(|| config.record_name.clone()) else {
        eprintln!("RECORD_NAME is required. Set it via: export RECORD_NAME=..., or pass --name");
        return CfddnsExitCode::ConfigError;
    };
    if let Err(e) = validate_domain_name(&name) {
        eprintln!("Configuration error: {}", e);
        return CfddnsExitCode::ConfigError;
    }

    let client = match CloudflareClient::new(&config.provider_config()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return CfddnsExitCode::ConfigError;
        }
    };

    match client.find_record_id(&zone_id, &name).await {
        Ok(Some(record_id)) => {
            println!("Record ID for {}: {}", name, record_id);
            CfddnsExitCode::Success
        }
        Ok(None) => {
            println!("No DNS records found for the given name.");
            CfddnsExitCode::RuntimeError
        }
        Err(e) => {
            eprintln!("Error fetching Record ID: {}", e);
            CfddnsExitCode::RuntimeError
        }
    }
}
