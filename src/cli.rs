// File: ./src/cli.rs
//! Command-line parsing and help text for the `paperplan` binary.
use anyhow::{Result, anyhow};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Defaults to the current year.
    pub year: Option<i32>,
    /// Only this month instead of all twelve.
    pub month: Option<u32>,
    pub root: Option<PathBuf>,
    /// Read tasks and events from a JSON file instead of the live services.
    pub fixture: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub no_sync: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncArgs {
    /// A PDF or a directory of PDFs.
    pub path: PathBuf,
    pub folder: Option<String>,
    /// Upload as new documents even if one with the same name exists.
    pub new: bool,
    pub fail_on_error: bool,
    pub root: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate(GenerateArgs),
    Sync(SyncArgs),
    Help,
}

fn value_of<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("{} needs a value", flag))
}

/// Parses the arguments that follow the binary name.
pub fn parse_args(args: &[String]) -> Result<Command> {
    if args.iter().any(|a| a == "--help" || a == "-h" || a == "help") {
        return Ok(Command::Help);
    }
    if args.first().is_some_and(|a| a == "sync") {
        return parse_sync(&args[1..]);
    }

    let mut parsed = GenerateArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--month" | "-m" => {
                let raw = value_of(args, &mut i, "--month")?;
                let month: u32 = raw
                    .parse()
                    .map_err(|_| anyhow!("Invalid month '{}'", raw))?;
                if !(1..=12).contains(&month) {
                    return Err(anyhow!("Month must be between 1 and 12, got {}", month));
                }
                parsed.month = Some(month);
            }
            "--root" | "-r" => parsed.root = Some(value_of(args, &mut i, "--root")?.into()),
            "--fixture" => parsed.fixture = Some(value_of(args, &mut i, "--fixture")?.into()),
            "--output" | "-o" => parsed.output = Some(value_of(args, &mut i, "--output")?.into()),
            "--no-sync" => parsed.no_sync = true,
            "--verbose" | "-v" => parsed.verbose = true,
            arg if !arg.starts_with('-') && parsed.year.is_none() => {
                let year: i32 = arg.parse().map_err(|_| anyhow!("Invalid year '{}'", arg))?;
                parsed.year = Some(year);
            }
            other => return Err(anyhow!("Unknown argument '{}'", other)),
        }
        i += 1;
    }
    Ok(Command::Generate(parsed))
}

fn parse_sync(args: &[String]) -> Result<Command> {
    let mut path: Option<PathBuf> = None;
    let mut parsed = SyncArgs {
        path: PathBuf::new(),
        folder: None,
        new: false,
        fail_on_error: false,
        root: None,
        verbose: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--folder" | "-f" => parsed.folder = Some(value_of(args, &mut i, "--folder")?.to_string()),
            "--path" => path = Some(value_of(args, &mut i, "--path")?.into()),
            "--root" | "-r" => parsed.root = Some(value_of(args, &mut i, "--root")?.into()),
            "--new" => parsed.new = true,
            "--fail-on-error" => parsed.fail_on_error = true,
            "--verbose" | "-v" => parsed.verbose = true,
            arg if !arg.starts_with('-') && path.is_none() => path = Some(arg.into()),
            other => return Err(anyhow!("Unknown argument '{}'", other)),
        }
        i += 1;
    }

    parsed.path = path.ok_or_else(|| anyhow!("sync needs a file or directory to upload"))?;
    Ok(Command::Sync(parsed))
}

pub fn print_help(binary_name: &str) {
    println!(
        "Paperplan v{} - Printable, hyperlinked monthly planners from your tasks and calendar",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [YEAR] [--month <1-12>] [OPTIONS]", binary_name);
    println!("    {} sync <PATH> [--folder <name>] [--new] [--fail-on-error]", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -m, --month <n>       Generate only this month.");
    println!("    -o, --output <dir>    Output directory (default: planner_<year>).");
    println!("    --fixture <file>      Read tasks and events from a JSON fixture.");
    println!("    --no-sync             Do not upload to the device after generating.");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -v, --verbose         Debug logging.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("SYNC COMMAND:");
    println!("    {} sync planner_2026                    Upload every PDF of a directory", binary_name);
    println!("    {} sync 2026_07_July.pdf --folder 2026  Upload one file into a folder", binary_name);
    println!("    --new                 Create new documents instead of updating in place.");
    println!("    --fail-on-error       Exit with an error if any upload fails.");
    println!();
    println!("CONFIGURATION:");
    println!("    config.toml in the config directory (see --root). The Todoist token can");
    println!("    also come from the TODOIST_API_TOKEN environment variable. Google");
    println!("    credentials are read from token.json in the data directory.");
}
