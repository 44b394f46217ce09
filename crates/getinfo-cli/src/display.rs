//! Display formatting for CLI output
//!
//! Renders an [`Output`] as JSON, YAML or an aligned table.

use clap::ValueEnum;
use getinfo_core::{Command, Output, OutputItem, SchedulingField};
use std::collections::BTreeMap;

use crate::color::colorize_json;
use crate::error::{CliError, Result};

const NONE: &str = "<none>";
const GAP: usize = 2;

/// Output format selected with `-o`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

/// Everything that shapes how an output is printed
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub command: Command,
    pub field: Option<SchedulingField>,
    pub format: OutputFormat,
    pub color: bool,
    /// Whether the queried type is namespaced
    pub namespaced: bool,
}

/// Render the output; `None` means nothing should be printed
pub fn render(output: &Output, options: &RenderOptions) -> Result<Option<String>> {
    match options.format {
        OutputFormat::Json => {
            let text = if options.color {
                colorize_json(&serde_json::to_value(output).map_err(CliError::json)?)
            } else {
                serde_json::to_string_pretty(output).map_err(CliError::json)?
            };
            Ok(Some(text))
        }
        OutputFormat::Yaml => {
            let text = serde_yaml::to_string(output).map_err(CliError::yaml)?;
            Ok(Some(text.trim_end().to_string()))
        }
        OutputFormat::Table => Ok(render_table(output, options)),
    }
}

/// Aligned table with a dashed separator row; `None` when there are no items
pub fn render_table(output: &Output, options: &RenderOptions) -> Option<String> {
    if output.items.is_empty() {
        return None;
    }

    let mut table = Table::new(header(options));
    for item in &output.items {
        for row in rows(item, options) {
            table.push(row);
        }
    }
    Some(table.render())
}

fn header(options: &RenderOptions) -> Vec<&'static str> {
    let mut columns = vec!["NAME"];
    if options.namespaced {
        columns.push("NAMESPACE");
    }

    match options.command {
        Command::Labels => columns.push("LABELS"),
        Command::Annotations => columns.push("ANNOTATIONS"),
        Command::Owner => {
            if options.namespaced {
                columns.push("OWNER NAMESPACE");
            }
            columns.extend(["OWNER KIND", "OWNER NAME"]);
        }
        Command::Scheduling => match options.field {
            None => columns.extend(["NODESELECTOR", "AFFINITY", "TOLERATIONS", "RESOURCES"]),
            Some(field) => columns.push(field_header(field)),
        },
    }

    columns
}

fn field_header(field: SchedulingField) -> &'static str {
    match field {
        SchedulingField::Tolerations => "TOLERATIONS",
        SchedulingField::Affinity => "AFFINITY",
        SchedulingField::NodeSelector => "NODESELECTOR",
        SchedulingField::Resources => "RESOURCES",
        SchedulingField::Topology => "TOPOLOGY SPREAD CONSTRAINTS",
        SchedulingField::Priority => "PRIORITY",
        SchedulingField::Runtime => "RUNTIME",
    }
}

fn rows(item: &OutputItem, options: &RenderOptions) -> Vec<Vec<String>> {
    let mut identity = vec![item.name.clone()];
    if options.namespaced {
        identity.push(item.namespace.clone().unwrap_or_default());
    }

    let values: Vec<Vec<String>> = match options.command {
        Command::Labels => vec![vec![pairs(item.labels.as_ref())]],
        Command::Annotations => vec![vec![pairs(item.annotations.as_ref())]],
        Command::Owner => owner_cells(item, options.namespaced),
        Command::Scheduling => vec![match options.field {
            None => summary_cells(item),
            Some(field) => vec![field_cell(item, field)],
        }],
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, cells)| {
            // Continuation rows leave the identity columns blank
            let mut row = if i == 0 {
                identity.clone()
            } else {
                vec![String::new(); identity.len()]
            };
            row.extend(cells);
            row
        })
        .collect()
}

fn owner_cells(item: &OutputItem, namespaced: bool) -> Vec<Vec<String>> {
    let width = if namespaced { 3 } else { 2 };
    match item.owner_references.as_deref() {
        None | Some([]) => vec![vec![NONE.to_string(); width]],
        Some(owners) => owners
            .iter()
            .map(|owner| {
                let mut cells = Vec::with_capacity(width);
                if namespaced {
                    cells.push(owner.namespace.clone().unwrap_or_else(|| NONE.to_string()));
                }
                cells.push(owner.kind.clone());
                cells.push(owner.name.clone());
                cells
            })
            .collect(),
    }
}

fn summary_cells(item: &OutputItem) -> Vec<String> {
    let Some(snapshot) = &item.scheduling else {
        return vec![NONE.to_string(); 4];
    };

    vec![
        pairs(snapshot.node_selector.as_ref()),
        present(snapshot.affinity.is_some()),
        count(snapshot.tolerations.as_ref().map(Vec::len), "item(s)"),
        present(snapshot.resource_requests.is_some() || snapshot.resource_limits.is_some()),
    ]
}

fn field_cell(item: &OutputItem, field: SchedulingField) -> String {
    match field {
        SchedulingField::Tolerations => count(item.tolerations.as_ref().map(Vec::len), "toleration(s)"),
        SchedulingField::Affinity => present(item.affinity.is_some()),
        SchedulingField::NodeSelector => pairs(item.node_selector.as_ref()),
        SchedulingField::Resources => count(item.resources.as_ref().map(Vec::len), "container(s)"),
        SchedulingField::Topology => count(
            item.topology_spread_constraints.as_ref().map(Vec::len),
            "constraint(s)",
        ),
        SchedulingField::Priority => present(item.priority.is_some()),
        SchedulingField::Runtime => present(item.runtime.is_some()),
    }
}

/// `k=v` pairs sorted by key and comma-joined
fn pairs(map: Option<&BTreeMap<String, String>>) -> String {
    match map {
        Some(map) if !map.is_empty() => map
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(","),
        _ => NONE.to_string(),
    }
}

fn present(present: bool) -> String {
    if present { "present" } else { NONE }.to_string()
}

fn count(len: Option<usize>, unit: &str) -> String {
    match len {
        Some(n) if n > 0 => format!("{n} {unit}"),
        _ => NONE.to_string(),
    }
}

/// Column-aligned text table
struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(header: Vec<&'static str>) -> Self {
        let separator = header.iter().map(|h| "-".repeat(h.len())).collect();
        Self {
            rows: vec![header.into_iter().map(String::from).collect(), separator],
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        self.rows
            .iter()
            .map(|row| {
                let mut line = String::new();
                for (c, cell) in row.iter().enumerate() {
                    if c + 1 == row.len() {
                        line.push_str(cell);
                    } else {
                        line.push_str(&format!("{:<width$}", cell, width = widths[c] + GAP));
                    }
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
