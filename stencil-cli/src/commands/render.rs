//! `stencil render` — fill one template into one target.

use std::cell::RefCell;
use std::io::Read;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use futures::stream;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use stencil_runtime::{Filler, RecordSource};

use super::{fill_options, print_diagnostics, read_page, runtime, write_page};

/// Arguments for `stencil render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// HTML page holding the target and the template.
    pub page: PathBuf,

    /// JSON data file, or `-` for stdin. A top-level array is one record
    /// per entry.
    #[arg(long, short)]
    pub data: String,

    /// Selector of the element receiving the filled copies.
    #[arg(long)]
    pub target: String,

    /// Selector of the `<template>` element.
    #[arg(long)]
    pub template: String,

    /// Read newline-delimited JSON, one record per line, filling as lines
    /// arrive.
    #[arg(long)]
    pub ndjson: bool,

    /// Options file (YAML). Defaults to the user config.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the filled page here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let document = read_page(&self.page)?;
        let options = fill_options(self.config.as_deref())?;
        let filler = Filler::new(&document, options);

        let failure: Rc<RefCell<Option<anyhow::Error>>> = Rc::default();
        let outcome = runtime()?.block_on(async {
            let records = if self.ndjson {
                ndjson_records(open_lines(&self.data).await?, failure.clone())
            } else {
                RecordSource::from(read_json(&self.data)?)
            };
            filler
                .fill(
                    self.target.as_str().into(),
                    self.template.as_str().into(),
                    records,
                )
                .await
                .context("render failed")
        })?;

        if let Some(err) = failure.borrow_mut().take() {
            return Err(err);
        }
        print_diagnostics(&outcome.diagnostics);
        tracing::info!(
            records = outcome.records,
            inserted = outcome.inserted.len(),
            "rendered"
        );
        write_page(&document, self.output.as_ref())
    }
}

fn read_json(data: &str) -> Result<Value> {
    let text = if data == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read data from stdin")?;
        text
    } else {
        std::fs::read_to_string(data).with_context(|| format!("failed to read data {data}"))?
    };
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {data}"))
}

async fn open_lines(data: &str) -> Result<Box<dyn AsyncBufRead + Unpin>> {
    if data == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(data)
        .await
        .with_context(|| format!("failed to open data {data}"))?;
    Ok(Box::new(BufReader::new(file)))
}

/// One record per non-blank line. The first unreadable or invalid line ends
/// the stream and is parked in `failure`.
fn ndjson_records(
    reader: Box<dyn AsyncBufRead + Unpin>,
    failure: Rc<RefCell<Option<anyhow::Error>>>,
) -> RecordSource<'static> {
    let records = stream::unfold((reader.lines(), 0usize), move |(mut lines, mut number)| {
        let failure = failure.clone();
        async move {
            loop {
                number += 1;
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => return None,
                    Err(err) => {
                        *failure.borrow_mut() = Some(anyhow!(err).context("failed to read data"));
                        return None;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Value>(&line) {
                    Ok(record) => return Some((record, (lines, number))),
                    Err(err) => {
                        *failure.borrow_mut() =
                            Some(anyhow!(err).context(format!("line {number}: invalid JSON")));
                        return None;
                    }
                }
            }
        }
    });
    RecordSource::stream(records)
}
