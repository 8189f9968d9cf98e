use std::env;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ruonia_core::analyses::{find_analysis, AnalysisInputs};
use ruonia_core::config::AnalysisConfig;
use ruonia_core::outputs::write_csv;
use ruonia_parser::formats::{RuoniaFormat, UsdRubFormat};
use ruonia_parser::{load_series_from_path, DatedSeries};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod render;

const DEFAULT_RUONIA_PATH: &str = "./data/Ruonia01_01_2022_T02_10_2024.csv";
const DEFAULT_USD_RUB_PATH: &str = "./data/USD_RUB Historical Data.csv";

#[derive(Parser, Debug)]
#[command(author, version, about = "RUONIA and USD/RUB time-series analysis", long_about = None)]
struct Cli {
    /// Analysis config (TOML). Falls back to RUONIA_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// RUONIA rate distribution, rolling averages and bands
    Ruonia(RuoniaArgs),
    /// USD/RUB price trend and daily change distribution
    UsdRub(UsdRubArgs),
    /// Both sources joined on date: overlay, correlation, returns, volatility
    Combined(CombinedArgs),
    /// Load one source and write its normalized table as CSV to stdout
    Normalize(NormalizeArgs),
    /// List known sources and analyses
    List,
}

#[derive(Args, Debug, Default)]
struct RuoniaArgs {
    /// RUONIA CSV export. Falls back to RUONIA_CSV.
    #[arg(long)]
    ruonia: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct UsdRubArgs {
    /// USD/RUB historical data CSV. Falls back to USD_RUB_CSV.
    #[arg(long)]
    usd_rub: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct CombinedArgs {
    #[arg(long)]
    ruonia: Option<PathBuf>,
    #[arg(long)]
    usd_rub: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    /// Source name (`ruonia` or `usd_rub`)
    #[arg(long)]
    source: String,
    /// Input file; defaults to the source's environment variable or default path
    path: Option<PathBuf>,
}

fn main() -> Result<()> {
    // `.env` may carry RUST_LOG, so it is loaded before the filter is built.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Command::Ruonia(args) => {
            let path = resolve_path(args.ruonia, RuoniaFormat::NAME);
            let inputs = AnalysisInputs::new()
                .with_source(RuoniaFormat::NAME, load_source(RuoniaFormat::NAME, &path, &config)?);
            run_analysis("ruonia", &inputs, &config)
        }
        Command::UsdRub(args) => {
            let path = resolve_path(args.usd_rub, UsdRubFormat::NAME);
            let inputs = AnalysisInputs::new()
                .with_source(UsdRubFormat::NAME, load_source(UsdRubFormat::NAME, &path, &config)?);
            run_analysis("usd_rub", &inputs, &config)
        }
        Command::Combined(args) => {
            let ruonia_path = resolve_path(args.ruonia, RuoniaFormat::NAME);
            let usd_rub_path = resolve_path(args.usd_rub, UsdRubFormat::NAME);
            let inputs = AnalysisInputs::new()
                .with_source(
                    RuoniaFormat::NAME,
                    load_source(RuoniaFormat::NAME, &ruonia_path, &config)?,
                )
                .with_source(
                    UsdRubFormat::NAME,
                    load_source(UsdRubFormat::NAME, &usd_rub_path, &config)?,
                );
            run_analysis("combined", &inputs, &config)
        }
        Command::Normalize(args) => {
            let path = resolve_path(args.path, &args.source);
            let series = load_source(&args.source, &path, &config)?;
            write_csv(&series, io::stdout().lock())
                .with_context(|| format!("failed to write normalized {}", args.source))?;
            Ok(())
        }
        Command::List => {
            render::render_catalog();
            Ok(())
        }
    }
}

fn load_config(flag: Option<PathBuf>) -> Result<AnalysisConfig> {
    let Some(path) = flag.or_else(|| env::var_os("RUONIA_CONFIG").map(PathBuf::from)) else {
        return Ok(AnalysisConfig::default());
    };
    info!(path = %path.display(), "loading analysis config");
    AnalysisConfig::from_path(&path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

/// Flag, then environment variable, then the default export file name.
fn resolve_path(flag: Option<PathBuf>, source: &str) -> PathBuf {
    let (variable, default) = if source.eq_ignore_ascii_case(UsdRubFormat::NAME) {
        ("USD_RUB_CSV", DEFAULT_USD_RUB_PATH)
    } else {
        ("RUONIA_CSV", DEFAULT_RUONIA_PATH)
    };
    flag.or_else(|| env::var_os(variable).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(default))
}

fn load_source(name: &str, path: &Path, config: &AnalysisConfig) -> Result<DatedSeries> {
    let schema = config
        .schema_for(name)
        .with_context(|| format!("no schema for source '{name}'"))?;
    info!(source = name, path = %path.display(), "loading source");
    let series = load_series_from_path(path, &schema)
        .with_context(|| format!("failed to load {name} from {}", path.display()))?;
    info!(source = name, rows = series.height(), "source loaded");
    Ok(series)
}

fn run_analysis(code: &str, inputs: &AnalysisInputs, config: &AnalysisConfig) -> Result<()> {
    let analysis =
        find_analysis(code).with_context(|| format!("analysis '{code}' is not registered"))?;
    let report = analysis
        .run(inputs, config)
        .with_context(|| format!("analysis '{code}' failed"))?;
    render::render(&report, config.output)
}
