use clap::Parser;
use pair_rotation::config::{LogFormat, OutputFormat, Settings};
use pair_rotation::error::{PairingError, StoreError};
use pair_rotation::models::Record;
use pair_rotation::services::{import_legacy, roster_record, week_record, HistoryStore, ResultWriter};
use pair_rotation::{plan_round, RoundPlan};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pair-rotation", version, about = "Pick this week's pairs, favouring people who have not met recently")]
struct Cli {
    /// Pairing record (JSON Lines); defaults to store.path from the config
    history: Option<PathBuf>,

    /// Path to config file (default: config/default.toml + config/local.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the plan without recording it
    #[arg(long)]
    dry_run: bool,

    /// Output JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Show the weight of each chosen pair
    #[arg(long)]
    show_weights: bool,

    /// Record a new roster before planning (comma separated)
    #[arg(long, value_delimiter = ',')]
    roster: Option<Vec<String>>,

    /// Import a legacy person-keyed table into an empty record and exit
    #[arg(long, value_name = "FILE")]
    import_legacy: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Pairing(#[from] PairingError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", CliError::from(e));
            return ExitCode::from(1);
        }
    };

    init_logging(&settings, cli.verbose);

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Logs go to stderr; stdout carries only the plan
fn init_logging(settings: &Settings, verbose: bool) {
    let level = if verbose { "debug" } else { settings.logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    match settings.logging.format {
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }
}

fn run(cli: &Cli, settings: &Settings) -> Result<(), CliError> {
    let path = cli
        .history
        .clone()
        .or_else(|| settings.store.path.clone())
        .ok_or_else(|| {
            CliError::Usage("no history file given and store.path is not configured".to_string())
        })?;

    let store = HistoryStore::new(&path);
    let writer = ResultWriter::new(&path);

    if let Some(source) = &cli.import_legacy {
        let count = import_legacy(source, &store, &writer)?;
        println!("Imported {} records into {}", count, path.display());
        return Ok(());
    }

    let dry_run = cli.dry_run || settings.schedule.dry_run;

    // A new roster is only written together with the week it produced
    let new_roster = cli.roster.as_ref().map(|names| Record::Roster(roster_record(names)));
    let loaded = store.load_with(new_roster.iter().cloned().collect())?;
    let plan = plan_round(&loaded.roster, &loaded.history, loaded.latest_week)?;

    let format = if cli.json { OutputFormat::Json } else { settings.output.format };
    let show_weights = cli.show_weights || settings.output.show_weights;
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan).map_err(StoreError::from)?;
            println!("{}", json);
        }
        OutputFormat::Table => print!("{}", render_table(&plan, show_weights)),
    }

    if dry_run {
        info!("Dry run, week {} not recorded", plan.week);
    } else {
        let mut records: Vec<Record> = new_roster.into_iter().collect();
        records.push(Record::Week(week_record(&plan)));
        writer.append(&records)?;
        info!("Recorded week {} in {}", plan.week, path.display());
    }

    Ok(())
}

fn render_table(plan: &RoundPlan, show_weights: bool) -> String {
    let pairs = plan.matching.pairs();
    let width = pairs
        .iter()
        .map(|scored| scored.pair.first().as_str().len())
        .max()
        .unwrap_or(0);

    let mut out = format!("Week {}\n", plan.week);
    for scored in pairs {
        let line = format!(
            "  {:<width$}  &  {}",
            scored.pair.first(),
            scored.pair.second(),
            width = width
        );
        if show_weights {
            out.push_str(&format!("{}  ({})\n", line, scored.weight));
        } else {
            out.push_str(&line);
            out.push('\n');
        }
    }
    if let Some(unpaired) = plan.matching.unmatched() {
        out.push_str(&format!("  unpaired: {}\n", unpaired));
    }
    if show_weights {
        out.push_str(&format!("Total weight: {}\n", plan.matching.total_weight()));
    }
    out
}
