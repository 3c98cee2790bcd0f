use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dedupbench::{
    BenchConfig, BenchmarkDriver, ConsoleSeriesSink, CsvReportSink, CsvSeriesSink, ProbeKind,
    RunOutcome, Strategy, TableReportSink, TrackingAllocator,
};

#[global_allocator]
static ALLOCATOR: TrackingAllocator = TrackingAllocator::system();

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Sweep the selected strategies over unique and repeated inputs.
    Run {
        /// Dataset growth per trial [env: DEDUPBENCH_UNIT_SIZE]
        #[arg(long)]
        unit_size: Option<usize>,
        /// Trials per strategy and shape [env: DEDUPBENCH_NUM_UNITS]
        #[arg(long)]
        num_units: Option<usize>,
        /// Pause between trials in milliseconds [env: DEDUPBENCH_PAUSE_MS]
        #[arg(long)]
        pause_ms: Option<u64>,
        /// Where memory readings come from
        #[arg(long, value_enum, default_value_t = ProbeKind::Allocator)]
        probe: ProbeKind,
        /// Strategy to run; repeat for several. All when omitted.
        #[arg(long = "strategy")]
        strategies: Vec<String>,
        /// Write series.csv and report.csv into this directory
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Only print the final report
        #[arg(long)]
        quiet: bool,
    },
    /// Print strategy names in run order.
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);
    match cli.cmd {
        Cmd::Run {
            unit_size,
            num_units,
            pause_ms,
            probe,
            strategies,
            csv,
            quiet,
        } => {
            let mut config = BenchConfig::from_env();
            if let Some(unit_size) = unit_size {
                config.unit_size = unit_size;
            }
            if let Some(num_units) = num_units {
                config.num_units = num_units;
            }
            if let Some(pause_ms) = pause_ms {
                config.pause = Duration::from_millis(pause_ms);
            }
            config.probe = probe;
            config.output_dir = csv;
            config.select_strategies(strategies.as_slice())?;
            run(config, quiet).await
        }
        Cmd::List => {
            for strategy in Strategy::ALL {
                println!("{strategy}");
            }
            Ok(())
        }
    }
}

async fn run(config: BenchConfig, quiet: bool) -> Result<()> {
    let plan = config.plan().context("invalid benchmark configuration")?;
    let driver = BenchmarkDriver::new(plan, config.strategies.clone(), config.probe);

    let csv_dir = config.output_dir.as_deref();
    let csv_series = csv_dir
        .map(CsvSeriesSink::create)
        .transpose()
        .context("failed to create series csv")?;
    let console = (!quiet).then(|| ConsoleSeriesSink::stdout(plan.num_units));
    let mut series = (console, csv_series);
    let mut report = (TableReportSink::stdout(), csv_dir.map(CsvReportSink::new));

    let outcome = driver
        .run(&mut series, &mut report)
        .await
        .context("benchmark run aborted")?;
    if let RunOutcome::Completed(table) = outcome {
        if let Some(dir) = csv_dir {
            println!("=> wrote {} rows to {}", table.len(), dir.display());
        }
    }
    Ok(())
}

fn setup_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
