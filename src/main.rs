pub mod types;
pub mod config;
pub mod color;
pub mod data;
pub mod boundary;
pub mod render;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration (defaults to ./config.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Spreadsheet with the school rows (.xlsx or .csv)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// HTML file to write
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let app_config = config::AppConfig::resolve(cli.config.as_deref())?
        .with_overrides(cli.input, cli.output);

    // 1. Load schools
    let loaded = data::load_records(&app_config)?;

    // 2. Boundary overlay (fetch errors are fatal)
    let boundary = boundary::load_boundary(&app_config)?;

    // 3. Assemble
    let document = render::MapDocument::assemble(&app_config, loaded, boundary);

    // 4. Save; failures are reported, not raised
    render::save_and_report(&document, &app_config.output.html);

    Ok(())
}
