use anyhow::Result;
use clap::{Parser, Subcommand};
use inflation_panel::{PanelConfig, Pipeline};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Monthly inflation feature panel from SCB, MI, KI and Nord Pool workbooks"
)]
struct Args {
    /// YAML (or .json) config; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the config's data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Also write the panel as Parquet.
    #[arg(long)]
    parquet: bool,
    /// Extract the sources in parallel.
    #[arg(long)]
    parallel: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Command {
    /// Raw workbooks -> intermediate CSVs.
    Extract,
    /// Intermediate CSVs -> features_merged.csv.
    Merge,
    /// Both, writing nothing unless every source extracts.
    Run,
}

fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    // ─── 2) config ───────────────────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => PanelConfig::load(path)?,
        None => PanelConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    config.parquet |= args.parquet;
    config.parallel |= args.parallel;

    let command = args.command.unwrap_or(Command::Run);
    info!(?command, data_dir = %config.data_dir.display(), "startup");

    // ─── 3) stages ───────────────────────────────────────────────────
    let pipeline = Pipeline::new(config);
    match command {
        Command::Extract => {
            pipeline.run_extract()?;
        }
        Command::Merge => {
            pipeline.run_merge()?;
        }
        Command::Run => {
            pipeline.run()?;
        }
    }
    info!("done");
    Ok(())
}
