//! `stencil inspect` — what a page's templates bind and where its data
//! sources point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use stencil_core::{binding_key, dom, FillOptions, Handle};
use stencil_runtime::SOURCE_ATTRIBUTE;

use super::{fill_options, read_page};

/// Arguments for `stencil inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    pub page: PathBuf,

    /// Options file (YAML). Defaults to the user config.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl InspectArgs {
    pub fn run(self) -> Result<()> {
        let document = read_page(&self.page)?;
        let options = fill_options(self.config.as_deref())?;
        let report = build_report(&document, &options);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize inspect JSON")?
            );
            return Ok(());
        }
        print_tables(report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct InspectReport {
    templates: Vec<TemplateSummary>,
    sources: Vec<SourceSummary>,
}

#[derive(Debug, Serialize)]
struct TemplateSummary {
    name: String,
    keys: Vec<String>,
    directives: usize,
    placeholders: usize,
}

#[derive(Debug, Serialize)]
struct SourceSummary {
    id: Option<String>,
    source: String,
    template: bool,
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "template")]
    name: String,
    #[tabled(rename = "keys")]
    keys: String,
    #[tabled(rename = "directives")]
    directives: usize,
    #[tabled(rename = "placeholders")]
    placeholders: usize,
}

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "element")]
    id: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "template")]
    template: String,
}

fn build_report(document: &Handle, options: &FillOptions) -> InspectReport {
    let elements = dom::elements(document);
    let templates: Vec<&Handle> = elements
        .iter()
        .filter(|e| dom::local_name(e) == Some("template"))
        .collect();

    let template_summaries = templates
        .iter()
        .filter_map(|template| {
            let content = dom::template_content(template)?;
            let mut summary = TemplateSummary {
                name: template_name(template),
                keys: Vec::new(),
                directives: 0,
                placeholders: 0,
            };
            summarize(&content, options, &mut summary);
            Some(summary)
        })
        .collect();

    let sources = elements
        .iter()
        .filter_map(|element| {
            let source = dom::attribute(element, SOURCE_ATTRIBUTE)?;
            let id = dom::attribute(element, "id").filter(|id| !id.is_empty());
            let template = id.as_deref().is_some_and(|id| {
                templates
                    .iter()
                    .any(|t| dom::attribute(t, "for").as_deref() == Some(id))
            });
            Some(SourceSummary {
                id,
                source,
                template,
            })
        })
        .collect();

    InspectReport {
        templates: template_summaries,
        sources,
    }
}

fn template_name(template: &Handle) -> String {
    if let Some(id) = dom::attribute(template, "id") {
        return format!("#{id}");
    }
    if let Some(target) = dom::attribute(template, "for") {
        return format!("for={target}");
    }
    dom::describe(template)
}

/// Walk `node`'s subtree, nested template content included.
fn summarize(node: &Handle, options: &FillOptions, summary: &mut TemplateSummary) {
    for child in dom::children(node) {
        if let Some((target, _)) = dom::instruction(&child) {
            if target == options.directive_target {
                summary.directives += 1;
            }
            continue;
        }
        if let Some(key) = binding_key(&child, options) {
            if !summary.keys.contains(&key) {
                summary.keys.push(key);
            }
        }
        summary.placeholders += dom::attributes(&child)
            .iter()
            .filter(|(_, value)| value.contains("${"))
            .count();
        if let Some(content) = dom::template_content(&child) {
            summarize(&content, options, summary);
        }
        summarize(&child, options, summary);
    }
}

fn print_tables(report: InspectReport) {
    println!("{}", "TEMPLATES".bold());
    if report.templates.is_empty() {
        println!("No templates found.");
    } else {
        let rows: Vec<TemplateRow> = report
            .templates
            .into_iter()
            .map(|t| TemplateRow {
                name: t.name,
                keys: t.keys.join(", "),
                directives: t.directives,
                placeholders: t.placeholders,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if report.sources.is_empty() {
        return;
    }
    println!("{}", "DATA SOURCES".bold());
    let rows: Vec<SourceRow> = report
        .sources
        .into_iter()
        .map(|s| SourceRow {
            id: s.id.map(|id| format!("#{id}")).unwrap_or_else(|| "(no id)".red().to_string()),
            source: s.source,
            template: if s.template {
                "yes".green().to_string()
            } else {
                "missing".red().to_string()
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_keys_directives_and_placeholders() {
        let doc = dom::parse_document(
            r#"<template id="card"><a title="${t}" data-key="link"><?attr name="href" key="url"?></a>
               <template data-key="author"><b data-key="name"></b><i data-key="name"></i></template></template>
               <ul id="list" data-source="people.json"></ul>
               <p data-source="orphan.json"></p>"#,
        );
        let report = build_report(&doc, &FillOptions::default());

        assert_eq!(report.templates.len(), 1);
        let card = &report.templates[0];
        assert_eq!(card.name, "#card");
        assert_eq!(card.keys, ["link", "author", "name"]);
        assert_eq!(card.directives, 1);
        assert_eq!(card.placeholders, 1);

        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.sources[0].id.as_deref(), Some("list"));
        assert!(!report.sources[0].template);
        assert!(report.sources[1].id.is_none());
    }
}
