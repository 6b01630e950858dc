//! docview TUI: interactive terminal viewer for generated documentation.
//!
//! Opens a saved `result.json` or a Markdown file and shows its outline
//! next to the selected section, built with `ratatui` + `crossterm`.

mod app;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// docview-tui: browse generated documentation in the terminal.
#[derive(Parser)]
#[command(name = "docview-tui", version, long_about = None)]
struct Args {
    /// `result.json` written by `docview generate`, or any Markdown file.
    file: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_file_logging()?;
    app::run(&args.file)
}

/// Log to `docview-tui.log` in the config dir, only when `DOCVIEW_LOG` is set.
///
/// The value is used as the filter directive, e.g. `DOCVIEW_LOG=docview=debug`.
fn init_file_logging() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let Ok(directive) = std::env::var("DOCVIEW_LOG") else {
        return Ok(());
    };

    let dir = docview_shared::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("docview-tui.log"))?;

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("docview=debug"));
    fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}
