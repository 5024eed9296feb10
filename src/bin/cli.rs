//! selftime CLI - run the reference nested workload and inspect the report

use std::path::{Path, PathBuf};
use std::time::Duration;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use selftime::{
    init_with_level, version,
    config::{ConfigManager, ProfilerConfig},
    error::{ProfilerError, ProfilerResult},
    profiling::workload::{reference_expectation, run_reference_workload},
    ManualClock, OutputFormat, ReportFormatter, TimerReport, TimerSnapshot,
};

#[derive(Parser)]
#[command(name = "selftime")]
#[command(about = "Hierarchical self-time profiler")]
#[command(version = version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile the reference nested workload
    Demo {
        /// Advance a simulated clock instead of sleeping
        #[arg(long)]
        simulate: bool,

        /// Multiply every wait of the workload by this factor
        #[arg(long, default_value = "1.0")]
        scale: f64,

        /// Report format (table, json); overrides the configuration
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate configuration template
    Config {
        /// Output path for configuration file
        #[arg(short, long, default_value = "./selftime.json")]
        output: PathBuf,
    },
}

fn main() -> ProfilerResult<()> {
    let cli = Cli::parse();

    let mut manager = ConfigManager::new();
    if let Some(config_path) = &cli.config {
        manager.load_from_file(config_path)?;
    }
    let config = manager.get_config().clone();

    let verbose = cli.verbose || config.development.verbose_logging;
    init_with_level(if verbose { "debug" } else { "info" })?;

    match cli.command {
        Commands::Demo { simulate, scale, format, output } => {
            run_demo(&config, simulate, scale, format, output)?;
        }

        Commands::Config { output } => {
            generate_config(&output)?;
        }
    }

    Ok(())
}

fn run_demo(
    config: &ProfilerConfig,
    simulate: bool,
    scale: f64,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
) -> ProfilerResult<()> {
    if !scale.is_finite() || scale < 0.0 {
        return Err(ProfilerError::config_error(
            "demo",
            format!("scale must be a non-negative number, got {}", scale),
        ));
    }
    if !config.profiling.enabled {
        warn!("Profiling is disabled in the configuration; the report will be empty");
    }

    info!("Running reference workload (simulate: {}, scale: {})", simulate, scale);

    let clock = ManualClock::new();
    let mut profiler = if simulate {
        config.build_profiler_with_clock(clock.clone())
    } else {
        config.build_profiler()
    };
    let mut wait: Box<dyn FnMut(Duration)> = if simulate {
        Box::new(move |d| clock.advance(d.mul_f64(scale)))
    } else {
        Box::new(move |d| std::thread::sleep(d.mul_f64(scale)))
    };

    run_reference_workload(profiler.as_mut(), wait.as_mut())?;
    let report = profiler.timers();

    let format = format.unwrap_or(config.output.format);
    let rendered = ReportFormatter::new(format).render(&report)?;

    match output.or_else(|| config.output.path.clone()) {
        Some(path) => {
            std::fs::write(&path, &rendered)?;
            info!("Report written to {:?}", path);
        }
        None => {
            println!("{}", rendered);
            println!("Expected:");
            println!("{}", ReportFormatter::new(format).render(&expected_report(scale))?);
        }
    }

    Ok(())
}

fn expected_report(scale: f64) -> TimerReport {
    let mut report = TimerReport::new();
    for (name, snapshot) in reference_expectation() {
        let seconds = Duration::from_secs_f64(snapshot.duration * scale);
        report.insert(name, TimerSnapshot::new(snapshot.count, seconds));
    }
    report
}

fn generate_config(output_path: &Path) -> ProfilerResult<()> {
    info!("Generating configuration template at {:?}", output_path);

    let manager = ConfigManager::new();
    manager.save_to_file(output_path)?;

    info!("Configuration template generated successfully!");
    Ok(())
}
