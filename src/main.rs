use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tempstat::error::Error;
use tempstat::ingest::read_path;
use tempstat::pipeline::Pipeline;
use tempstat::report::Report;
use tempstat::runtime::{self, Runtime, RuntimeClient};
use tempstat::sample::Sample;

#[derive(Parser)]
#[command(
    name = "tempstat",
    about = "Min/max/mean and tail-trimmed histogram of a temperature dataset",
    version,
    long_about = None
)]
struct Cli {
    /// Weather records, one `location year month day time temperature` per line
    #[arg(required_unless_present = "list")]
    input: Option<PathBuf>,

    /// Platform index (see --list)
    #[arg(short, long, default_value_t = runtime::CPU_PLATFORM)]
    platform: usize,

    /// Device index within the platform
    #[arg(short, long, default_value_t = 0)]
    device: usize,

    /// List platforms and devices, then exit
    #[arg(short, long)]
    list: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_on<R: Runtime>(platform: usize, device: usize, samples: &[Sample]) -> Result<Report> {
    let selected = R::enumerate_devices()
        .into_iter()
        .nth(device)
        .ok_or(Error::NoDevice { platform, device })?;
    let client = R::default_client(&selected)
        .with_context(|| format!("failed to open device {device} on platform {platform}"))?;
    println!("{}", runtime::running_on::<R>(client.device()));
    let report = Pipeline::<R>::new(client).run(samples)?;
    Ok(report)
}

fn run(cli: Cli) -> Result<()> {
    if cli.list {
        print!("{}", runtime::format_platforms(&runtime::list_platforms()));
        return Ok(());
    }

    let input = cli
        .input
        .context("an input file is required unless --list is given")?;
    let ingested = read_path(&input)?;
    if !ingested.rejected.is_empty() {
        tracing::warn!(
            rejected = ingested.rejected.len(),
            "some records were skipped"
        );
    }
    tracing::info!(samples = ingested.samples.len(), path = %input.display(), "dataset loaded");

    let report = match cli.platform {
        runtime::CPU_PLATFORM => {
            run_on::<runtime::cpu::CpuRuntime>(cli.platform, cli.device, &ingested.samples)?
        }
        #[cfg(feature = "wgpu")]
        runtime::WGPU_PLATFORM => {
            run_on::<runtime::wgpu::WgpuRuntime>(cli.platform, cli.device, &ingested.samples)?
        }
        other => {
            return Err(Error::invalid_argument(
                "platform",
                format!("no platform {other}; run with --list to see available platforms"),
            )
            .into());
        }
    };

    print!("{report}");
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "tempstat failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
