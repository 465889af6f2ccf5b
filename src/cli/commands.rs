use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cli::error::{parse_frequency, parse_positive, parse_quantile};
use crate::cli::output::{
    ageing_table, cfd_table, forecast_table, format_table, histogram_table, is_tty, net_flow_table,
    percentiles_table, records_table, scatter_table, throughput_table, wip_table, write_csv, Table,
};
use crate::config::Config;
use crate::cycle::{build_records, Extraction};
use crate::error::ConfigError;
use crate::flow::{ageing_wip, calculate_cfd, calculate_throughput, net_flow, weekly_wip, Frequency};
use crate::forecast::{burnup_forecast, BurnupOptions, DEFAULT_FORECAST_QUANTILES};
use crate::models::{Analysis, StepType};
use crate::source::load_histories;
use crate::stats::{cycle_time_histogram, cycle_time_percentiles, scatter_points};
use crate::utils::{fuzzy, parse_date_expr};

#[derive(Parser)]
#[command(name = "cycletime")]
#[command(about = "Cycle time, flow and forecast analytics for issue tracker exports")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Config file (default: ~/.cycletime/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build cycle records and write them plus optional aggregate tables
    Extract {
        /// Issue export (JSON)
        input: PathBuf,
        /// Record table destination
        output: PathBuf,
        /// Write the record table as JSON instead of CSV
        #[arg(long)]
        json: bool,
        /// Cumulative flow table (CSV)
        #[arg(long, value_name = "FILE")]
        cfd: Option<PathBuf>,
        /// Cycle time percentiles (CSV)
        #[arg(long, value_name = "FILE")]
        percentiles: Option<PathBuf>,
        /// Cycle time histogram (CSV)
        #[arg(long, value_name = "FILE")]
        histogram: Option<PathBuf>,
        /// Throughput per period (CSV)
        #[arg(long, value_name = "FILE")]
        throughput: Option<PathBuf>,
        /// Cycle time scatter points (CSV)
        #[arg(long, value_name = "FILE")]
        scatter: Option<PathBuf>,
        /// Only process the first N items
        #[arg(short = 'n', long = "max-results", value_parser = parse_positive)]
        max_results: Option<usize>,
        /// Percentile to report, repeatable (e.g. 0.85 or 85%)
        #[arg(long = "quantile", value_parser = parse_quantile)]
        quantiles: Vec<f64>,
        /// Histogram bucket count
        #[arg(long, value_parser = parse_positive)]
        bins: Option<usize>,
        /// Throughput period: day or week
        #[arg(long, value_parser = parse_frequency)]
        frequency: Option<Frequency>,
    },
    /// Forecast when the done column reaches the backlog size
    Forecast {
        /// Issue export (JSON)
        input: PathBuf,
        /// Number of Monte Carlo trials
        #[arg(long, value_parser = parse_positive)]
        trials: Option<usize>,
        /// Target item count (default: backlog size)
        #[arg(long)]
        target: Option<u64>,
        /// Seed for reproducible trials
        #[arg(long)]
        seed: Option<u64>,
        /// Throughput sampling period: day or week
        #[arg(long, value_parser = parse_frequency)]
        frequency: Option<Frequency>,
        /// Finish-date percentile to report, repeatable
        #[arg(long = "quantile", value_parser = parse_quantile)]
        quantiles: Vec<f64>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show how long each in-progress item has been in flight
    Ageing {
        /// Issue export (JSON)
        input: PathBuf,
        /// First in-progress step (default: first accepted step)
        #[arg(long)]
        start: Option<String>,
        /// Last in-progress step (default: the step before the last)
        #[arg(long)]
        end: Option<String>,
        /// Reference date: YYYY-MM-DD, today, yesterday (default: today)
        #[arg(long)]
        today: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the weekly spread of daily work in progress
    Wip {
        /// Issue export (JSON)
        input: PathBuf,
        /// First in-progress column (default: second step)
        #[arg(long)]
        start: Option<String>,
        /// Column that ends WIP (default: last step)
        #[arg(long)]
        end: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show weekly arrivals, departures and net flow
    NetFlow {
        /// Issue export (JSON)
        input: PathBuf,
        /// Arrivals column (default: second step)
        #[arg(long)]
        start: Option<String>,
        /// Departures column (default: last step)
        #[arg(long)]
        end: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    handle_command(cli)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

fn handle_command(cli: Cli) -> Result<()> {
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Extract {
            input,
            output,
            json,
            cfd,
            percentiles,
            histogram,
            throughput,
            scatter,
            max_results,
            quantiles,
            bins,
            frequency,
        } => {
            let outputs = AggregateOutputs { cfd, percentiles, histogram, throughput, scatter };
            handle_extract(&config, &input, &output, json, &outputs, max_results, quantiles, bins, frequency)
        }
        Commands::Forecast { input, trials, target, seed, frequency, quantiles, json } => {
            let options = BurnupOptions {
                trials: trials.unwrap_or(config.analysis.trials),
                target,
                backlog_column: None,
                done_column: None,
                quantiles: if quantiles.is_empty() {
                    DEFAULT_FORECAST_QUANTILES.to_vec()
                } else {
                    quantiles
                },
                seed: seed.or(config.analysis.seed),
            };
            handle_forecast(&config, &input, frequency.unwrap_or(config.analysis.frequency), &options, json)
        }
        Commands::Ageing { input, start, end, today, json } => {
            handle_ageing(&config, &input, start, end, today, json)
        }
        Commands::Wip { input, start, end, json } => {
            handle_wip(&config, &input, start.as_deref(), end.as_deref(), json)
        }
        Commands::NetFlow { input, start, end, json } => {
            handle_net_flow(&config, &input, start.as_deref(), end.as_deref(), json)
        }
    }
}

/// Optional aggregate table destinations for `extract`
struct AggregateOutputs {
    cfd: Option<PathBuf>,
    percentiles: Option<PathBuf>,
    histogram: Option<PathBuf>,
    throughput: Option<PathBuf>,
    scatter: Option<PathBuf>,
}

/// Load the export and build records, warning once per unmapped status
fn load_records(config: &Config, input: &Path, limit: Option<usize>) -> Result<Extraction> {
    let mut histories = load_histories(input)?;
    if let Some(n) = limit {
        histories.truncate(n);
    }

    let extraction = build_records(&histories, &config.cycle, &config.extract);

    let known: Vec<&str> = config
        .cycle
        .steps()
        .iter()
        .flat_map(|step| step.aliases.iter().map(String::as_str))
        .collect();
    for (status, count) in extraction.unmapped_summary() {
        log::warn!(
            "Status '{}' is not part of the workflow ({} transition(s) ignored){}",
            status,
            count,
            fuzzy::suggestion_hint(&status, &known)
        );
    }

    Ok(extraction)
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_table_file(path: &Path, table: &Table) -> Result<()> {
    let mut writer = create_writer(path)?;
    write_csv(&mut writer, table)
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

/// Write an aggregate when its destination was requested. A `NoData`
/// aggregate is reported and skipped; it never fails the run.
fn write_analysis<T>(
    path: Option<&PathBuf>,
    what: &str,
    analysis: Analysis<T>,
    to_table: impl FnOnce(&T) -> Table,
) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    match analysis {
        Analysis::Ready(value) => write_table_file(path, &to_table(&value)),
        Analysis::NoData => {
            log::warn!("No data for {}; {} not written", what, path.display());
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_extract(
    config: &Config,
    input: &Path,
    output: &Path,
    json: bool,
    outputs: &AggregateOutputs,
    max_results: Option<usize>,
    quantiles: Vec<f64>,
    bins: Option<usize>,
    frequency: Option<Frequency>,
) -> Result<()> {
    let extraction = load_records(config, input, max_results)?;
    let records = &extraction.records;

    if json {
        let mut writer = create_writer(output)?;
        serde_json::to_writer_pretty(&mut writer, records)
            .context("Failed to serialize records")?;
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", output.display()))?;
    } else {
        let step_names = config.cycle.step_names();
        let attributes: Vec<&str> = config.extract.attributes.keys().map(String::as_str).collect();
        write_table_file(output, &records_table(records, &step_names, &attributes))?;
    }

    let quantiles = if quantiles.is_empty() {
        config.analysis.quantiles.clone()
    } else {
        quantiles
    };
    let bins = bins.unwrap_or(config.analysis.bins);
    let frequency = frequency.unwrap_or(config.analysis.frequency);

    write_analysis(outputs.cfd.as_ref(), "cumulative flow", calculate_cfd(records, &config.cycle), cfd_table)?;
    write_analysis(
        outputs.percentiles.as_ref(),
        "cycle time percentiles",
        cycle_time_percentiles(records, &quantiles),
        |p| percentiles_table(p),
    )?;
    write_analysis(
        outputs.histogram.as_ref(),
        "cycle time histogram",
        cycle_time_histogram(records, bins),
        histogram_table,
    )?;
    write_analysis(
        outputs.throughput.as_ref(),
        "throughput",
        calculate_throughput(records, frequency),
        throughput_table,
    )?;
    let points = scatter_points(records);
    write_analysis(
        outputs.scatter.as_ref(),
        "scatter",
        Analysis::from(Some(points).filter(|p| !p.is_empty())),
        |p| scatter_table(p),
    )?;

    println!("Extracted {} records to {}", records.len(), output.display());
    Ok(())
}

fn handle_forecast(
    config: &Config,
    input: &Path,
    frequency: Frequency,
    options: &BurnupOptions,
    json: bool,
) -> Result<()> {
    let extraction = load_records(config, input, None)?;
    let records = &extraction.records;

    let forecast = match (
        calculate_cfd(records, &config.cycle),
        calculate_throughput(records, frequency),
    ) {
        (Analysis::Ready(cfd), Analysis::Ready(throughput)) => burnup_forecast(&cfd, &throughput, options)?,
        _ => Analysis::NoData,
    };

    let Analysis::Ready(forecast) = forecast else {
        if json {
            println!("{}", serde_json::to_string_pretty(&Analysis::<()>::NoData)?);
        } else {
            println!("No data: nothing to forecast from.");
        }
        return Ok(());
    };

    if json {
        let summary = json!({
            "backlog_column": forecast.backlog_column,
            "done_column": forecast.done_column,
            "start_date": forecast.start_date,
            "start_value": forecast.start_value,
            "target": forecast.target,
            "trials": forecast.trials.len(),
            "frequency": frequency.as_str(),
            "finish_dates": forecast.finish_dates,
            "paths": forecast
                .trials
                .iter()
                .map(|t| t.clipped(forecast.target))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Forecast from {}: {} of {} items in '{}' ({} trials, per {})",
            forecast.start_date,
            forecast.start_value,
            forecast.target,
            forecast.done_column,
            forecast.trials.len(),
            frequency.as_str()
        );
        print!("{}", format_table(&forecast_table(&forecast), is_tty()));
    }
    Ok(())
}

fn handle_ageing(
    config: &Config,
    input: &Path,
    start: Option<String>,
    end: Option<String>,
    today: Option<String>,
    json: bool,
) -> Result<()> {
    let today = match today {
        Some(expr) => parse_date_expr(&expr)?,
        None => Utc::now().date_naive(),
    };

    let steps = config.cycle.steps();
    let start = match start {
        Some(name) => name,
        None => steps
            .iter()
            .find(|s| s.step_type == StepType::Accepted)
            .map(|s| s.name.clone())
            .context("Workflow has no accepted step")?,
    };
    let end = match end {
        Some(name) => name,
        None => steps
            .get(steps.len().saturating_sub(2))
            .map(|s| s.name.clone())
            .context("Workflow has too few steps")?,
    };

    let extraction = load_records(config, input, None)?;
    let items = ageing_wip(&extraction.records, &config.cycle, &start, &end, None, today)
        .map_err(|e| with_step_hint(e, config))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    match items {
        Analysis::Ready(items) => print!("{}", format_table(&ageing_table(&items), is_tty())),
        Analysis::NoData => println!("No data: no items in progress."),
    }
    Ok(())
}

fn handle_wip(
    config: &Config,
    input: &Path,
    start: Option<&str>,
    end: Option<&str>,
    json: bool,
) -> Result<()> {
    let extraction = load_records(config, input, None)?;
    let weeks = match calculate_cfd(&extraction.records, &config.cycle) {
        Analysis::Ready(cfd) => weekly_wip(&cfd, start, end).map_err(|e| with_step_hint(e, config))?,
        Analysis::NoData => Analysis::NoData,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&weeks)?);
        return Ok(());
    }
    match weeks {
        Analysis::Ready(weeks) => print!("{}", format_table(&wip_table(&weeks), is_tty())),
        Analysis::NoData => println!("No data: no transitions recorded."),
    }
    Ok(())
}

fn handle_net_flow(
    config: &Config,
    input: &Path,
    start: Option<&str>,
    end: Option<&str>,
    json: bool,
) -> Result<()> {
    let extraction = load_records(config, input, None)?;
    let weeks = match calculate_cfd(&extraction.records, &config.cycle) {
        Analysis::Ready(cfd) => net_flow(&cfd, start, end).map_err(|e| with_step_hint(e, config))?,
        Analysis::NoData => Analysis::NoData,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&weeks)?);
        return Ok(());
    }
    match weeks {
        Analysis::Ready(weeks) => print!("{}", format_table(&net_flow_table(&weeks), is_tty())),
        Analysis::NoData => println!("No data: no transitions recorded."),
    }
    Ok(())
}

/// Attach a "did you mean" hint to unknown step names
fn with_step_hint(err: ConfigError, config: &Config) -> anyhow::Error {
    let hint = match &err {
        ConfigError::UnknownStep(name) => Some(format!(
            "Unknown workflow step '{}'{}",
            name,
            fuzzy::suggestion_hint(name, &config.cycle.step_names())
        )),
        _ => None,
    };
    let err = anyhow::Error::new(err);
    match hint {
        Some(message) => err.context(message),
        None => err,
    }
}
