//! ieval CLI: score interactive retrieval runs per topic and across topics.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ieval::eval::{format_aggregate, format_topic, load_runs, to_json, unique_kinds, Report};
use ieval::{evaluate_topic, Aggregator, Config, MeasureKind};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Evaluate interactive retrieval runs.
#[derive(Parser, Debug)]
#[command(name = "ieval")]
#[command(about = "Compute per-topic and aggregate evaluation measures for interactive runs")]
struct Args {
    /// Path to the run file (JSON array of topics).
    runs: PathBuf,

    /// Path to a TOML config file (default: $IEVAL_CONFIG or ./ieval.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measure kind to compute; repeat for several (default: output.measures from config).
    #[arg(short, long = "measure", value_parser = parse_kind)]
    measures: Vec<MeasureKind>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Skip per-topic scores.
    #[arg(long)]
    no_topics: bool,

    /// Skip the aggregate over all topics.
    #[arg(long)]
    no_aggregate: bool,
}

fn parse_kind(s: &str) -> Result<MeasureKind, String> {
    s.parse()
}

fn main() -> Result<()> {
    // Scores go to stdout, logs to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let requested = if args.measures.is_empty() {
        &config.output.measures
    } else {
        &args.measures
    };
    let kinds = unique_kinds(requested);
    if kinds.len() < requested.len() {
        log::warn!("Repeated measure kinds are computed once");
    }
    let precision = config.output.precision;

    let runs = load_runs(&args.runs)
        .with_context(|| format!("Failed to load runs from {}", args.runs.display()))?;
    if runs.is_empty() {
        anyhow::bail!("No topics in {}", args.runs.display());
    }

    let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
    log::info!("Evaluating {} topics ({})", runs.len(), names.join(", "));

    let mut aggregator = Aggregator::new();
    let mut report = Report::new(precision);

    for run in &runs {
        let measures = evaluate_topic(run, &kinds, &config)
            .with_context(|| format!("Failed to evaluate topic {}", run.topic_id))?;

        for measure in &measures {
            aggregator.add(measure)?;
        }

        if args.no_topics {
            continue;
        }
        match args.format {
            Format::Text => {
                for measure in &measures {
                    for line in format_topic(measure, precision)? {
                        println!("{}", line);
                    }
                }
            }
            Format::Json => report.push_topic(&run.topic_id, &measures)?,
        }
    }

    let aggregate = aggregator.finish();
    match args.format {
        Format::Text => {
            if !args.no_aggregate {
                for line in format_aggregate(&aggregate, precision) {
                    println!("{}", line);
                }
            }
        }
        Format::Json => {
            if !args.no_aggregate {
                report.set_aggregate(&aggregate);
            }
            println!("{}", to_json(&report)?);
        }
    }

    Ok(())
}
