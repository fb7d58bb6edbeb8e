use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use cacao_tds::analysis::{DensityEstimator, ReplicationAggregator, ZoneScorer};
use cacao_tds::config::AppConfig;
use cacao_tds::fixtures::{ReplicationGenerator, ReplicationSpec};
use cacao_tds::profile::{AttributeId, ProfileRecord, TastingMode, TastingProfile};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "tds_cli",
    about = "Score, smooth and aggregate TDS tasting records"
)]
struct Cli {
    /// Configuration JSON (defaults to assets/tds_config.json, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Zone scores for one export record
    Score {
        record: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit the flat export columns instead of the full result
        #[arg(long)]
        columns: bool,
    },
    /// Single-session density curve for one export record
    Density {
        record: PathBuf,
        /// Attributes to include (defaults to every tracked attribute)
        #[arg(long, value_delimiter = ',')]
        attributes: Vec<AttributeId>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Population curve across several export records
    Aggregate {
        #[arg(required = true)]
        records: Vec<PathBuf>,
        #[arg(long, value_delimiter = ',')]
        attributes: Vec<AttributeId>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write synthetic export records
    Synth {
        #[arg(long, default_value_t = 10)]
        count: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        expert: bool,
        /// Directory for one JSON record per replication (stdout when omitted)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    cacao_tds::init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::try_load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Score {
            record,
            output,
            columns,
        } => run_score(&config, &record, output, columns),
        Commands::Density {
            record,
            attributes,
            output,
        } => run_density(&config, &record, attributes, output),
        Commands::Aggregate {
            records,
            attributes,
            output,
        } => run_aggregate(&config, &records, attributes, output),
        Commands::Synth {
            count,
            seed,
            expert,
            out_dir,
        } => run_synth(count, seed, expert, out_dir),
    }
}

fn run_score(
    config: &AppConfig,
    record: &Path,
    output: Option<PathBuf>,
    columns: bool,
) -> Result<ExitCode> {
    let profile = load_profile(record)?;
    let result = ZoneScorer::new(config.product.clone()).analyze(&profile);
    if columns {
        emit(&result.export_columns(), output)?;
    } else {
        emit(&result, output)?;
    }
    Ok(ExitCode::from(0))
}

fn run_density(
    config: &AppConfig,
    record: &Path,
    attributes: Vec<AttributeId>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let profile = load_profile(record)?;
    let attributes = or_tracked(config, attributes);
    let curve = DensityEstimator::new(config.density.clone()).estimate_profile(&profile, &attributes);
    emit(&curve, output)?;
    Ok(ExitCode::from(0))
}

fn run_aggregate(
    config: &AppConfig,
    records: &[PathBuf],
    attributes: Vec<AttributeId>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let replications = records
        .iter()
        .map(|path| load_profile(path))
        .collect::<Result<Vec<_>>>()?;
    let attributes = or_tracked(config, attributes);
    let curve =
        ReplicationAggregator::new(config.aggregation.clone()).aggregate(&replications, &attributes);
    emit(
        &AggregateReport {
            significant_spans: curve.significant_spans(),
            curve: &curve,
        },
        output,
    )?;
    Ok(ExitCode::from(0))
}

fn run_synth(count: usize, seed: u64, expert: bool, out_dir: Option<PathBuf>) -> Result<ExitCode> {
    let spec = ReplicationSpec {
        mode: if expert {
            TastingMode::Expert
        } else {
            TastingMode::Normal
        },
        ..ReplicationSpec::default()
    };
    let profiles = ReplicationGenerator::new(spec, seed).generate_many(count);

    match out_dir {
        Some(dir) => {
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
            for profile in &profiles {
                let path = dir.join(format!("{}.json", profile.id()));
                let json = ProfileRecord::from(profile).to_json()?;
                fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            }
            println!("Wrote {} record(s) to {}", profiles.len(), dir.display());
        }
        None => {
            for profile in &profiles {
                println!("{}", serde_json::to_string(profile)?);
            }
        }
    }
    Ok(ExitCode::from(0))
}

fn load_profile(path: &Path) -> Result<TastingProfile> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let record =
        ProfileRecord::from_json(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(record.into_profile())
}

fn or_tracked(config: &AppConfig, attributes: Vec<AttributeId>) -> Vec<AttributeId> {
    if attributes.is_empty() {
        config.product.taxonomy.tracked()
    } else {
        attributes
    }
}

fn emit<T: Serialize>(value: &T, output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(path) = output {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(())
}

#[derive(Serialize)]
struct AggregateReport<'a> {
    curve: &'a cacao_tds::analysis::AggregatedCurve,
    significant_spans: cacao_tds::profile::AttributeMap<Vec<cacao_tds::analysis::SliceSpan>>,
}
