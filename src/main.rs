use agrivis::panel::PanelInputs;
use agrivis::{Config, dataset, panel};

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "agrivis",
    about = "Render the agricultural and environmental metrics panel from a World Bank CSV"
)]
struct Cli {
    /// Path to the indicator CSV
    #[arg(long, default_value = "Infographics_Data.csv")]
    data: PathBuf,

    /// Optional TOML config overriding the built-in report
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path (overrides the config)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logger - defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(output) = cli.output {
        config.panel.output = output;
    }
    config.validate()?;

    if let Err(e) = run(&cli.data, &config) {
        error!("{e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run(data: &PathBuf, config: &Config) -> agrivis::Result<()> {
    info!("Loading dataset from {}", data.display());

    // Every series must resolve before anything is drawn; a missing series
    // aborts here with its diagnostic instead of failing mid-render.
    let series = &config.series;
    let (emissions, _) = dataset::process_series(&series.emissions, data)?;
    let (fertilizer, _) = dataset::process_series(&series.fertilizer, data)?;
    let (_, imports) = dataset::process_series(&series.imports, data)?;
    let (_, exports) = dataset::process_series(&series.exports, data)?;
    let (freshwater, _) = dataset::process_series(&series.freshwater, data)?;

    info!(
        "Loaded 5 series ({} countries, {} years)",
        emissions.len(),
        emissions.years().len()
    );

    let inputs = PanelInputs {
        emissions: &emissions,
        fertilizer: &fertilizer,
        imports: &imports,
        exports: &exports,
        freshwater: &freshwater,
    };

    let output = panel::save_panel(&inputs, config)?;
    info!("Panel saved to: {}", output.display());

    Ok(())
}
