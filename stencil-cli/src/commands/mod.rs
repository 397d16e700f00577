pub mod bootstrap;
pub mod inspect;
pub mod render;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use stencil_core::{config, dom, Diagnostics, FillOptions, Handle, Severity};

pub(crate) fn read_page(path: &Path) -> Result<Handle> {
    let html = fs::read_to_string(path)
        .with_context(|| format!("failed to read page {}", path.display()))?;
    Ok(dom::parse_document(&html))
}

/// Options from `--config`, else from the user config file, else defaults.
pub(crate) fn fill_options(config_path: Option<&Path>) -> Result<FillOptions> {
    match config_path {
        Some(path) => config::load_options_at(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => config::load_options().context("failed to load user config"),
    }
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

/// Serialize the whole document to `output`, or stdout when absent.
pub(crate) fn write_page(document: &Handle, output: Option<&PathBuf>) -> Result<()> {
    let html = dom::to_html(document).context("failed to serialize page")?;
    match output {
        Some(path) => fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub(crate) fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        let label = match diagnostic.severity() {
            Severity::Warning => "warning".yellow().bold(),
            Severity::Error => "error".red().bold(),
        };
        eprintln!("{label}: {diagnostic}");
    }
}
