// File: ./src/bin/paperplan.rs
// Binary entry point: generate planners, then publish them to the device.
use anyhow::{Context, Result, bail};
use chrono::Datelike;
use paperplan::aggregate::{AggregatorSettings, DataAggregator};
use paperplan::cli::{self, Command, GenerateArgs, SyncArgs};
use paperplan::client::auth::TokenStore;
use paperplan::client::{
    EventSource, GoogleCalendarClient, HttpClient, MemorySource, TaskSource, TodoistClient,
};
use paperplan::config::{Config, DeviceConfig};
use paperplan::context::{AppContext, StandardContext};
use paperplan::planner::{PlannerOptions, generate_year};
use paperplan::sync::{
    DeviceLibrary, DeviceTransport, MountedTransport, Ssh2Connector, SshTransport, SyncReport,
};
use paperplan::writer::PdfWriter;
use simplelog::{ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let binary_name = args
        .first()
        .and_then(|a| Path::new(a).file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("paperplan")
        .to_string();

    let command = match cli::parse_args(args.get(1..).unwrap_or_default()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run '{} --help' for usage.", binary_name);
            std::process::exit(2);
        }
    };

    match command {
        Command::Help => {
            cli::print_help(&binary_name);
            Ok(())
        }
        Command::Generate(args) => run_generate(args).await,
        Command::Sync(args) => run_sync(args),
    }
}

fn init_logging(verbose: bool, ctx: &dyn AppContext) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_config = simplelog::ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("rustls")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = ctx.get_log_path()
        && let Ok(file) = File::create(&path)
    {
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, file));
    }
    // Only fails if a logger is already installed.
    let _ = CombinedLogger::init(loggers);
}

/// The config file is optional; defaults plus environment overrides are
/// enough for fixture runs and sync.
fn load_config(ctx: &dyn AppContext) -> Result<Config> {
    let mut config = match Config::load(ctx) {
        Ok(config) => config,
        Err(e) if Config::is_missing_config_error(&e) => {
            log::warn!(
                "No config file at {}; using defaults",
                ctx.get_config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            );
            Config::default()
        }
        Err(e) => return Err(e),
    };
    config.apply_env();
    Ok(config)
}

async fn run_generate(args: GenerateArgs) -> Result<()> {
    let ctx = StandardContext::new(args.root.clone());
    init_logging(args.verbose, &ctx);
    let config = load_config(&ctx)?;

    let options = PlannerOptions::from_config(&config)?;
    let year = args.year.unwrap_or_else(|| chrono::Local::now().year());
    let months: Vec<u32> = match args.month {
        Some(month) => vec![month],
        None => (1..=12).collect(),
    };
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.output_dir_for(year));
    let settings = AggregatorSettings::from(&config);

    let written = match &args.fixture {
        Some(fixture) => {
            log::info!("Reading tasks and events from {}", fixture.display());
            let source = MemorySource::load(fixture)?;
            let aggregator = DataAggregator::new(source.clone(), source, settings);
            generate(&aggregator, year, &months, &options, &output_dir).await?
        }
        None => {
            if config.todoist_token.is_empty() {
                bail!(
                    "No Todoist token: set todoist_token in {} or the {} environment variable",
                    ctx.get_config_file_path()?.display(),
                    paperplan::config::TODOIST_TOKEN_ENV
                );
            }
            let http = HttpClient::new()?;
            let tasks = TodoistClient::new(http.clone(), &config.todoist_base_url, &config.todoist_token);
            let token_path = config.token_path(&ctx)?;
            let tokens = TokenStore::load(&token_path)
                .with_context(|| format!("Google credentials at {}", token_path.display()))?;
            let events = GoogleCalendarClient::new(http, &config.google_base_url, tokens);
            let aggregator = DataAggregator::new(tasks, events, settings);
            generate(&aggregator, year, &months, &options, &output_dir).await?
        }
    };
    println!("Generated {} planner file(s) in {}", written.len(), output_dir.display());

    if args.no_sync {
        return Ok(());
    }
    let Some(device) = &config.device else {
        log::debug!("No [device] configured; skipping sync");
        return Ok(());
    };

    let folder = device.folder_for(year);
    match sync_directory(device, &output_dir, &folder, device.update_existing) {
        Ok(report) => finish_sync(&report, device.fail_on_error),
        Err(e) if device.fail_on_error => Err(e),
        Err(e) => {
            log::warn!("Sync skipped: {:#}", e);
            Ok(())
        }
    }
}

async fn generate<T: TaskSource, E: EventSource>(
    aggregator: &DataAggregator<T, E>,
    year: i32,
    months: &[u32],
    options: &PlannerOptions,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let written = generate_year(aggregator, year, months, options, &PdfWriter::new(), output_dir)
        .await
        .with_context(|| format!("Generating the {} planner", year))?;
    Ok(written)
}

fn open_library(device: &DeviceConfig) -> Result<DeviceLibrary<Box<dyn DeviceTransport>>> {
    let transport: Box<dyn DeviceTransport> = match &device.ssh {
        Some(ssh) => Box::new(SshTransport::connect(&Ssh2Connector, ssh)?),
        None => Box::new(MountedTransport::new(&device.root)?),
    };
    Ok(DeviceLibrary::new(transport))
}

/// The device is told about new files even when some uploads failed.
fn finish_transport(library: &DeviceLibrary<Box<dyn DeviceTransport>>) {
    if let Err(e) = library.transport().finish() {
        log::warn!("Device did not pick up the new files: {}", e);
    }
}

fn sync_directory(device: &DeviceConfig, dir: &Path, folder: &str, update_existing: bool) -> Result<SyncReport> {
    let library = open_library(device)?;
    let report = library.upload_directory(dir, Some(folder), update_existing)?;
    if !report.uploaded.is_empty() {
        finish_transport(&library);
    }
    Ok(report)
}

fn finish_sync(report: &SyncReport, fail_on_error: bool) -> Result<()> {
    println!("Synced {} file(s) to the device", report.uploaded.len());
    if !report.is_complete() {
        for (path, e) in &report.failed {
            eprintln!("  failed: {}: {}", path.display(), e);
        }
        if fail_on_error {
            bail!("{} file(s) failed to sync", report.failed.len());
        }
    }
    Ok(())
}

fn run_sync(args: SyncArgs) -> Result<()> {
    let ctx = StandardContext::new(args.root.clone());
    init_logging(args.verbose, &ctx);
    let config = load_config(&ctx)?;

    let Some(device) = &config.device else {
        bail!(
            "No [device] section in {}; set device.root or [device.ssh]",
            ctx.get_config_file_path()?.display()
        );
    };
    let fail_on_error = args.fail_on_error || device.fail_on_error;
    let update_existing = !args.new && device.update_existing;

    let result = if args.path.is_dir() {
        let folder = args
            .folder
            .clone()
            .unwrap_or_else(|| device.folder_for(chrono::Local::now().year()));
        sync_directory(device, &args.path, &folder, update_existing)
    } else {
        sync_single_file(device, &args.path, args.folder.as_deref(), update_existing)
    };

    match result {
        Ok(report) => finish_sync(&report, fail_on_error),
        Err(e) if fail_on_error => Err(e),
        Err(e) => {
            log::warn!("Sync skipped: {:#}", e);
            Ok(())
        }
    }
}

fn sync_single_file(
    device: &DeviceConfig,
    path: &Path,
    folder: Option<&str>,
    update_existing: bool,
) -> Result<SyncReport> {
    let library = open_library(device)?;
    let folder_id = match folder {
        Some(name) => library.get_or_create_folder(name, "")?,
        None => String::new(),
    };
    let outcome = library
        .upload_file(path, &folder_id, update_existing)
        .with_context(|| format!("Uploading {}", path.display()))?;
    finish_transport(&library);
    Ok(SyncReport {
        folder_id,
        uploaded: vec![(path.to_path_buf(), outcome)],
        failed: Vec::new(),
    })
}
