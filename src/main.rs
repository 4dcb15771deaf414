//! CLI entry point for the IPEDS visualizer.
//!
//! Provides subcommands for building the interactive map and data tables,
//! dumping College Scorecard earnings, and shaping a single IPEDS subject.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ipeds_viz::{
    config::Settings,
    earnings::{adjust_all, fetch_wages},
    infra::scorecard::client::ScorecardClient,
    output::{print_json, write_dataset, write_json},
    pipeline::{build_map, build_table},
    services::scorecard_api::WageStat,
    shape::{YearSelector, shape},
    source::CsvSource,
    subject::{Specification, Subject},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ipeds_viz")]
#[command(about = "Maps and tables of men in US higher education", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the interactive map
    Map {
        /// Output HTML path (defaults to MAP_OUTPATH)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave out the school search box
        #[arg(long, default_value_t = false)]
        no_search: bool,
    },
    /// Build the tabbed data tables
    Table {
        /// Output HTML path (defaults to TABLE_OUTPATH)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch male/female earnings from the College Scorecard
    Earnings {
        /// Wage statistic: mean or median
        #[arg(short, long, default_value_t = WageStat::Median)]
        stat: WageStat,

        /// Minimum student body size
        #[arg(short, long, default_value_t = 0)]
        poplimit: u32,

        /// Adjust to the dollars of the most recent year (INFLATION_ADJUST)
        #[arg(long, default_value_t = false)]
        adjust: bool,

        /// JSON file to write; logged when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Shape one IPEDS subject and write it as CSV
    Shape {
        /// admissions, enrollment, completion or graduation
        #[arg(long)]
        subject: Subject,

        /// Student or degree level, e.g. undergrad, grad, assc, bach
        #[arg(long)]
        spec: Option<Specification>,

        /// A year, a range (2013..2023) or a list (2003,2013,2023)
        #[arg(short, long)]
        years: YearSelector,

        /// Minimum population in the latest selected year
        #[arg(short, long, default_value_t = 0)]
        poplimit: u32,

        /// CSV file to write
        #[arg(short, long, default_value = "shaped.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ipeds_viz.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ipeds_viz.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let source = CsvSource::new(&settings.data_dir);

    match cli.command {
        Commands::Map { output, no_search } => {
            let api = ScorecardClient::new(settings.scorecard_key()?.to_string());
            let out = output.unwrap_or_else(|| settings.map_outpath.clone());
            build_map(&settings, &source, &api, &out, !no_search)?;
        }
        Commands::Table { output } => {
            let api = ScorecardClient::new(settings.scorecard_key()?.to_string());
            let out = output.unwrap_or_else(|| settings.table_outpath.clone());
            build_table(&settings, &source, &api, &out)?;
        }
        Commands::Earnings {
            stat,
            poplimit,
            adjust,
            output,
        } => {
            let api = ScorecardClient::new(settings.scorecard_key()?.to_string());
            let mut wages = fetch_wages(&api, stat, poplimit)?;
            if adjust {
                wages = adjust_all(&wages, settings.inflation_adjust()?);
            }
            match output {
                Some(path) => write_json(&path, &wages)?,
                None => print_json(&wages)?,
            }
            info!(schools = wages.len(), "Earnings fetched");
        }
        Commands::Shape {
            subject,
            spec,
            years,
            poplimit,
            output,
        } => {
            let shaped = shape(&source, subject, spec, &years, poplimit)?;
            write_dataset(&output, &shaped)?;
            info!(rows = shaped.len(), output = %output.display(), "Records shaped");
        }
    }

    Ok(())
}
