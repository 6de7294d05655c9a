use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use racetrace::{
    RaceConfig, RaceDataAssembler, RaceTraceError, StitchPolicy,
    config::{DEFAULT_GRID_CELL_SIZE, ProjectorKind},
    load_session_jsonl, writer,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Config file, defaults to racetrace/config.json in the user config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    Continuous,
    LapMultiplied,
}

impl From<PolicyArg> for StitchPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Continuous => StitchPolicy::ContinuousUnwrap,
            PolicyArg::LapMultiplied => StitchPolicy::LapMultiplied,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the race timeline JSON from a session file
    Build {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, value_enum)]
        policy: Option<PolicyArg>,

        #[arg(long)]
        parallel: bool,

        /// Use the grid spatial index, optionally with a cell size in meters
        #[arg(long, num_args = 0..=1)]
        grid: Option<Option<f64>>,

        #[arg(long)]
        pretty: bool,
    },
    /// Extract only the reference track geometry
    Track {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<RaceConfig, RaceTraceError> {
    match path {
        Some(path) => RaceConfig::from_file(path),
        None => Ok(RaceConfig::from_local_file()
            .unwrap_or_else(|e| {
                info!("No local config used ({}), falling back to defaults", e);
                None
            })
            .unwrap_or_default()),
    }
}

fn build(
    mut config: RaceConfig,
    input: &Path,
    output: &Path,
    policy: Option<PolicyArg>,
    parallel: bool,
    grid: Option<Option<f64>>,
    pretty: bool,
) -> Result<(), RaceTraceError> {
    if let Some(policy) = policy {
        config.stitch_policy = policy.into();
    }
    if let Some(cell_size) = grid {
        config.projector = ProjectorKind::Grid {
            cell_size: cell_size.unwrap_or(DEFAULT_GRID_CELL_SIZE),
        };
    }
    config.parallel |= parallel;
    config.pretty |= pretty;

    let session = load_session_jsonl(input)?;
    let assembler = RaceDataAssembler::new(config);
    let race = assembler.assemble(&session)?;
    writer::write_race_record(output, &race, assembler.config().pretty)
}

fn track(config: RaceConfig, input: &Path, output: Option<&Path>) -> Result<(), RaceTraceError> {
    let session = load_session_jsonl(input)?;
    let assembler = RaceDataAssembler::new(config);
    let track = assembler.track_record(&session)?;
    match output {
        Some(output) => writer::write_json(output, &track, assembler.config().pretty),
        None => {
            let json = serde_json::to_string_pretty(&track)
                .map_err(|e| RaceTraceError::OutputSerializeError { source: e })?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Build {
            input,
            output,
            policy,
            parallel,
            grid,
            pretty,
        } => build(config, input, output, *policy, *parallel, *grid, *pretty),
        Commands::Track { input, output } => track(config, input, output.as_deref()),
    });

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
