use ci_failure_scan::adapters::outbound::console::StderrProgressReporter;
use ci_failure_scan::adapters::outbound::network::ReqwestHttpClient;
use ci_failure_scan::adapters::outbound::persistence::{InMemoryScanStore, JsonFileScanStore};
use ci_failure_scan::application::dto::{PipelineReport, ScanSettings};
use ci_failure_scan::application::use_cases::RunPipelineUseCase;
use ci_failure_scan::cli::Args;
use ci_failure_scan::config::{self, ConfigFile};
use ci_failure_scan::ports::outbound::ScanStore;
use ci_failure_scan::scanning::domain::Pattern;
use ci_failure_scan::shared::{ExitCode, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // clap exits with code 2 on invalid arguments
    let args = Args::parse_args();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(exit_code) => process::exit(exit_code.as_i32()),
        Err(e) if ExitCode::for_error(&e) == ExitCode::ScanFailures => {
            eprintln!("\n{}\n", "⚠️  Run cancelled before completion".yellow().bold());
            process::exit(ExitCode::ScanFailures.as_i32());
        }
        Err(e) => {
            eprintln!("\n{}\n", "❌ An error occurred:".red().bold());
            eprintln!("{}", e);

            // Display error chain
            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("ci_failure_scan=warn"),
        1 => EnvFilter::new("ci_failure_scan=info"),
        _ => EnvFilter::new("ci_failure_scan=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;
    let settings = args.resolve_settings(&config);
    let patterns = config
        .seed_patterns()
        .unwrap_or_else(config::default_seed_patterns);

    debug!(
        api_base = settings.endpoints.api_base(),
        branch = %settings.branch,
        count = settings.target_count,
        workers = settings.workers,
        cache = settings.cache_enabled,
        "Resolved settings"
    );
    if settings.token.is_empty() {
        warn!("No API token set (CIRCLE_TOKEN); only public projects can be read");
    }

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("⚠️  Interrupted: abandoning outstanding requests...");
            signal_token.cancel();
        }
    });

    let report = match args.store_path(&config) {
        Some(path) => {
            let store = JsonFileScanStore::open(path, patterns.clone())?;
            debug!("Using store {}", store.path().display());
            execute(Arc::new(store), &settings, &cancel).await?
        }
        None => {
            let store = InMemoryScanStore::new(patterns.clone());
            execute(Arc::new(store), &settings, &cancel).await?
        }
    };

    print_summary(&report, &patterns);

    if report.scan.has_failures() || report.scan.cancelled {
        Ok(ExitCode::ScanFailures)
    } else {
        Ok(ExitCode::Success)
    }
}

fn load_config(args: &Args) -> Result<ConfigFile> {
    let loaded = match &args.config {
        Some(path) => Some(config::load_config_from_path(path)?),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            config::discover_config(&cwd)?
        }
    };
    Ok(loaded.unwrap_or_default())
}

async fn execute<S: ScanStore>(
    store: Arc<S>,
    settings: &ScanSettings,
    cancel: &CancellationToken,
) -> Result<PipelineReport> {
    let client = Arc::new(ReqwestHttpClient::new()?);
    let progress_reporter = Arc::new(StderrProgressReporter::new());

    RunPipelineUseCase::new(client, store, progress_reporter)
        .execute(settings, cancel)
        .await
}

fn print_summary(report: &PipelineReport, patterns: &[Pattern]) {
    let scan = &report.scan;

    println!();
    println!("{}", format!("Scan {}", scan.scan_id).bold());
    println!("  Builds ingested:   {}", report.builds_ingested);
    println!(
        "  Builds scanned:    {} of {}",
        scan.succeeded(),
        scan.obligations
    );
    println!("  Timed out:         {}", scan.timed_out);
    println!("  Not pinpointed:    {}", scan.unpinpointed);
    println!("  Matches recorded:  {}", scan.match_count);

    for pattern in patterns {
        if let Some(count) = scan.matches_by_pattern.get(&pattern.id()) {
            println!(
                "    {:>5}  #{} {}",
                count.green(),
                pattern.id(),
                pattern.description()
            );
        }
    }

    if scan.cancelled {
        println!("{}", "  Run was cancelled before completion".yellow());
    }
    if scan.has_failures() {
        println!(
            "{}",
            format!("  {} build(s) could not be scanned", scan.failures.len()).red()
        );
    }
}
