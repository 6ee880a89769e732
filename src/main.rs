//! Battlefield - Entry Point
//!
//! Reads battle parameters from a TOML file and/or the command line, runs
//! the battle to completion, prints progress and the result, and writes the
//! per-round snapshot log as JSON.

use std::io;
use std::path::PathBuf;

use battlefield::battle::Battle;
use battlefield::core::config::ConfigFile;
use battlefield::core::error::Result;
use battlefield::report::{BattleReporter, ProgressPrinter, SnapshotLog};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Attrition battle between squad-based armies
#[derive(Parser, Debug)]
#[command(name = "battlefield")]
#[command(about = "Simulate attrition combat between armies until one is left standing")]
struct Args {
    /// TOML file with battle parameters (command-line values take precedence)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of armies (at least 2)
    #[arg(long)]
    armies: Option<usize>,

    /// Targeting strategy for every army: strongest, weakest or random
    #[arg(long)]
    strategy: Option<String>,

    /// Squads per army (at least 2)
    #[arg(long)]
    squads: Option<usize>,

    /// Units per squad (5 to 10)
    #[arg(long)]
    units: Option<usize>,

    /// Rounds between progress printouts
    #[arg(long)]
    report_every: Option<u64>,

    /// Rounds between snapshots kept in the JSON log
    #[arg(long)]
    snapshot_every: Option<u64>,

    /// Call the battle off as undecided after this many rounds
    #[arg(long)]
    max_rounds: Option<u64>,

    /// Where to write the snapshot log
    #[arg(long, short = 'o', default_value = "battle_log.json")]
    output: PathBuf,

    /// Suppress progress printouts
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Args {
    fn overrides(&self) -> ConfigFile {
        ConfigFile {
            seed: self.seed,
            armies_amount: self.armies,
            strategy: self.strategy.clone(),
            squad_amount: self.squads,
            units_amount: self.units,
            report_interval: self.report_every,
            snapshot_interval: self.snapshot_every,
            max_rounds: self.max_rounds,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("battlefield=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let config = file.merge(args.overrides()).resolve()?;
    tracing::info!(
        seed = config.seed,
        armies = config.armies_amount,
        strategy = %config.strategy,
        squads = config.squad_amount,
        units = config.units_amount,
        max_rounds = config.max_rounds,
        "configuration loaded"
    );

    let mut battle = Battle::from_config(&config)?;

    let mut log = SnapshotLog::new(config.snapshot_interval);
    let summary = {
        let mut reporters: Vec<Box<dyn BattleReporter + '_>> = vec![Box::new(&mut log)];
        if !args.quiet {
            reporters.push(Box::new(ProgressPrinter::new(
                io::stdout().lock(),
                config.report_interval,
            )));
        }
        battle.run(&mut reporters)
    };

    log.write_to(&args.output)?;

    println!("{}", summary.outcome);
    Ok(())
}
