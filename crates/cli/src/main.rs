// tkmerge CLI - headless track-candidate deduplication

mod dedup;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "tkmerge")]
#[command(about = "Compare and merge duplicate track candidates, epoch by epoch")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate every epoch of a candidate file per a TOML config
    #[command(after_help = "\
Examples:
  tkmerge run dedup.toml
  tkmerge run dedup.toml --json
  tkmerge run dedup.toml --output merged.json -vv")]
    Run {
        /// Path to the dedup TOML config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary only
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides [output] json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate a dedup config without running
    #[command(after_help = "\
Examples:
  tkmerge validate dedup.toml")]
    Validate {
        /// Path to the dedup TOML config file
        config: PathBuf,
    },

    /// Compare and merge a single pair of candidates
    #[command(after_help = "\
Examples:
  tkmerge compare epoch.csv --epoch 100 trk_a trk_b
  tkmerge compare epoch.json --epoch 100 trk_a trk_b --merge-condition 3")]
    Compare {
        /// Candidate file (.csv or .json)
        candidates: PathBuf,

        /// Epoch both candidates belong to
        #[arg(long)]
        epoch: u32,

        /// Id of the master candidate (the one that survives)
        master: String,

        /// Id of the candidate merged into the master
        other: String,

        /// Minimum number of layer matches required to merge (0-8)
        #[arg(long, default_value_t = 1, env = "TKMERGE_MERGE_CONDITION")]
        merge_condition: u32,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nbuild:   ", env!("PROFILE_NAME"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    // Also bridges `log` records from the engine crate.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, json, output } => dedup::cmd_run(config, json, output),
        Commands::Validate { config } => dedup::cmd_validate(config),
        Commands::Compare {
            candidates,
            epoch,
            master,
            other,
            merge_condition,
        } => dedup::cmd_compare(candidates, epoch, &master, &other, merge_condition),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<tkmerge_dedup::DedupError> for CliError {
    fn from(err: tkmerge_dedup::DedupError) -> Self {
        Self::new(exit_codes::dedup_exit_code(&err), err.to_string())
    }
}
