//! ---
//! chm_section: "31-cli"
//! chm_subsection: "binary"
//! chm_type: "source"
//! chm_scope: "code"
//! chm_description: "Command-line front-end for the chiller health monitor."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chm_common::config::AppConfig;
use chm_common::logging::init_tracing;
use chm_explain::{Explainer, ModelSettings};
use chm_logging::{chm_info, LogContext};
use chm_sim::{anomaly_histogram, HealthKpis, SnapshotCache, TelemetryDataset};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use tracing::info;

mod render;
mod views;

use render::OutputFormat;
use views::DashboardView;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Chiller health monitor: simulated fleet telemetry, summaries and explanations",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", global = true, help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Override the simulation seed")]
    seed: Option<u64>,

    #[arg(long, global = true, help = "Override the simulated window in days")]
    days: Option<u32>,

    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Simulate fleet telemetry and write it as CSV or JSON")]
    Simulate {
        #[arg(long, short, value_name = "FILE", help = "Output file (.csv or .json); stdout when omitted")]
        output: Option<PathBuf>,
    },
    #[command(about = "Show simulated maintenance due dates and priorities")]
    Maintenance,
    #[command(about = "Show simulated anomaly counts per chiller")]
    Anomalies,
    #[command(about = "Show design-power health KPIs")]
    Kpi {
        #[arg(long, help = "Restrict to one chiller")]
        chiller: Option<String>,
    },
    #[command(about = "Show the anomaly score distribution across the fleet")]
    Histogram {
        #[arg(long, default_value_t = 40)]
        bins: usize,
    },
    #[command(about = "Explain the telemetry of one chiller")]
    Explain(ExplainArgs),
    #[command(about = "List dashboard views and their preset questions")]
    Views,
}

#[derive(Debug, Args)]
struct ExplainArgs {
    #[arg(long, short, help = "Free-form question")]
    query: Option<String>,
    #[arg(long, value_enum, help = "Dashboard view whose preset question to ask")]
    view: Option<DashboardView>,
    #[arg(long, default_value_t = 0, help = "Index of the view's preset question")]
    preset: usize,
    #[arg(long, help = "Chiller to explain; defaults to the first configured chiller")]
    chiller: Option<String>,
    #[arg(long, value_name = "FILE", help = "Recorded dataset (.csv or .json) instead of simulated telemetry")]
    dataset: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("chmctl {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    if let Commands::Views = command {
        println!("{}", render::views(cli.format)?);
        return Ok(());
    }

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/chm.toml"));
    candidates.push(PathBuf::from("config.json"));
    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    if let Some(seed) = cli.seed {
        config.simulation.random_seed = Some(seed);
    }
    if let Some(days) = cli.days {
        config.simulation.days = days;
    }
    config.validate()?;
    init_tracing("chmctl", &config.logging)?;
    info!(
        config_path = %loaded.source.display(),
        chillers = config.chillers.len(),
        days = config.simulation.days,
        "configuration loaded"
    );

    let cache = SnapshotCache::new();
    let format = cli.format;
    match command {
        Commands::Simulate { output } => simulate(&config, &cache, output, format)?,
        Commands::Maintenance => {
            let snapshot = cache.get_or_generate(&config)?;
            print(format, &snapshot.maintenance, render::maintenance)?;
        }
        Commands::Anomalies => {
            let snapshot = cache.get_or_generate(&config)?;
            print(format, &snapshot.anomalies, render::anomalies)?;
        }
        Commands::Kpi { chiller } => {
            let snapshot = cache.get_or_generate(&config)?;
            let chillers = match chiller {
                Some(chiller) => vec![chiller],
                None => config.chillers.clone(),
            };
            let kpis: Vec<HealthKpis> = chillers
                .iter()
                .map(|chiller| HealthKpis::for_chiller(&snapshot.telemetry, chiller))
                .collect();
            print(format, &kpis, render::kpis)?;
        }
        Commands::Histogram { bins } => {
            let snapshot = cache.get_or_generate(&config)?;
            let histogram = anomaly_histogram(&snapshot.telemetry, bins)
                .ok_or_else(|| anyhow!("no anomaly scores to bin (bins = {bins})"))?;
            print(format, &histogram, render::histogram)?;
        }
        Commands::Explain(args) => explain(&config, &cache, args, format).await?,
        Commands::Views => println!("{}", render::views(format)?),
    }
    Ok(())
}

fn print<T, F>(format: OutputFormat, value: &[T], text: F) -> Result<()>
where
    T: serde::Serialize,
    F: Fn(&[T]) -> String,
{
    let rendered = match format {
        OutputFormat::Text => text(value),
        OutputFormat::Json => render::json(value)?,
    };
    println!("{rendered}");
    Ok(())
}

fn simulate(
    config: &AppConfig,
    cache: &SnapshotCache,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = cache.get_or_generate(config)?;
    match output {
        Some(path) => {
            snapshot
                .telemetry
                .to_path(&path)
                .with_context(|| format!("unable to write telemetry to {}", path.display()))?;
            info!(
                path = %path.display(),
                rows = snapshot.telemetry.len(),
                "telemetry written"
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            match format {
                OutputFormat::Text => snapshot.telemetry.write_csv(&mut stdout)?,
                OutputFormat::Json => {
                    snapshot.telemetry.write_json(&mut stdout)?;
                    writeln!(stdout)?;
                }
            }
        }
    }
    Ok(())
}

async fn explain(
    config: &AppConfig,
    cache: &SnapshotCache,
    args: ExplainArgs,
    format: OutputFormat,
) -> Result<()> {
    let query = match (args.query, args.view) {
        (Some(query), _) => query,
        (None, Some(view)) => view.preset(args.preset).map(str::to_owned).ok_or_else(|| {
            anyhow!(
                "view {} has {} preset questions, --preset {} is out of range",
                view.slug(),
                view.presets().len(),
                args.preset
            )
        })?,
        (None, None) => bail!("provide --query or --view"),
    };
    let anchor = config
        .anchor_chiller()
        .context("configuration has no chillers")?;
    let chiller = match args.view {
        Some(view) if view.is_fleet_level() => anchor.to_owned(),
        _ => args.chiller.unwrap_or_else(|| anchor.to_owned()),
    };

    let recorded;
    let snapshot;
    let dataset = match &args.dataset {
        Some(path) => {
            recorded = TelemetryDataset::from_path(path)
                .with_context(|| format!("unable to load dataset {}", path.display()))?;
            &recorded
        }
        None => {
            snapshot = cache.get_or_generate(config)?;
            &snapshot.telemetry
        }
    };

    let mut ctx = LogContext::new().with_chiller(&chiller);
    if let Some(view) = args.view {
        ctx = ctx.with_view(view.slug());
    }
    chm_info!(context = ctx, "explaining {} telemetry rows", dataset.len());

    let settings = ModelSettings::from_config(&config.model)?;
    let explanation = Explainer::from_settings(&settings)
        .explain(&query, dataset, &chiller)
        .await;
    match format {
        OutputFormat::Text => println!("{explanation}"),
        OutputFormat::Json => println!("{}", render::json(&explanation)?),
    }
    Ok(())
}
