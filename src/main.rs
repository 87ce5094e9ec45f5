use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use convunroll::metrics::benchmark::{print_report, run_benchmark};
use convunroll::metrics::verify::check_layer;
use convunroll::network::Network;

/// Inspect darknet-style network configs and exercise the im2col conversions.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the per-layer parameter report.
    Params {
        cfg: PathBuf,
    },
    /// Cross-check batch and streaming conversion on synthetic data.
    Check {
        cfg: PathBuf,
        /// Only check this layer.
        #[arg(short, long)]
        layer: Option<usize>,
        /// Override every layer's stride.
        #[arg(short, long)]
        stride: Option<usize>,
    },
    /// Time both conversions and compare their working sets.
    Bench {
        cfg: PathBuf,
        #[arg(short, long, default_value_t = 3)]
        iterations: usize,
    },
}

fn load(cfg: &Path) -> Result<Network> {
    Network::from_path(cfg).with_context(|| format!("loading {}", cfg.display()))
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber, writing to stderr.
fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default().with(log_filter()).with(fmt_layer).init();
}

fn main() -> Result<ExitCode> {
    init_tracing();

    let args = Args::parse();
    match args.command {
        Command::Params { cfg } => {
            let net = load(&cfg)?;
            print!("{}", net.parameters());
        }
        Command::Check { cfg, layer, stride } => {
            let net = load(&cfg)?;
            let ids: Vec<usize> = match layer {
                Some(id) => {
                    net.layer(id)?;
                    vec![id]
                }
                None => (0..net.layer_number()).collect(),
            };
            let mut failures = 0;
            for id in ids {
                let desc = net.layer(id)?;
                let stride = stride.unwrap_or(desc.stride);
                let check = check_layer(desc, id, desc.padding, stride)
                    .with_context(|| format!("layer {id}"))?;
                println!(
                    "layer {:<3} pad={} stride={} positions={} patch={} read={} stream={} product={}",
                    id,
                    check.padding,
                    check.stride,
                    check.positions,
                    check.patch_len,
                    check.stats.elements_read,
                    if check.stream_matches { "ok" } else { "MISMATCH" },
                    if check.product_matches { "ok" } else { "MISMATCH" },
                );
                if !check.passed() {
                    failures += 1;
                }
            }
            if failures > 0 {
                eprintln!("{failures} layer(s) failed");
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Bench { cfg, iterations } => {
            let net = load(&cfg)?;
            print_report(&run_benchmark(&net, iterations));
        }
    }
    Ok(ExitCode::SUCCESS)
}
