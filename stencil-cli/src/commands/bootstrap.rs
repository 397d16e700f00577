//! `stencil bootstrap` — fill every `[data-source]` element of a page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use stencil_runtime::{bootstrap, DefaultLoader, Filler, SourceCache};

use super::{fill_options, print_diagnostics, read_page, runtime, write_page};

/// Arguments for `stencil bootstrap`.
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// HTML page with `data-source` elements and their `<template for>`s.
    pub page: PathBuf,

    /// Directory relative sources are read from. Defaults to the page's
    /// directory.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Options file (YAML). Defaults to the user config.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the filled page here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl BootstrapArgs {
    pub fn run(self) -> Result<()> {
        let document = read_page(&self.page)?;
        let options = fill_options(self.config.as_deref())?;
        let base = match self.base_dir {
            Some(dir) => dir,
            None => self
                .page
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default(),
        };

        let filler = Filler::new(&document, options);
        let cache = SourceCache::new(DefaultLoader::new(base));
        let report = runtime()?
            .block_on(bootstrap(&filler, &cache))
            .context("bootstrap failed")?;

        for bound in &report.bound {
            eprintln!(
                "{} #{} <- {} ({} nodes)",
                "bound".green().bold(),
                bound.id,
                bound.source,
                bound.inserted
            );
        }
        print_diagnostics(&report.diagnostics);
        write_page(&document, self.output.as_ref())
    }
}
