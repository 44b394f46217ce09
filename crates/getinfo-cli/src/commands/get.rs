//! Shared runner for the labels, annotations, owner and scheduling commands

use getinfo_core::{Command, Output, SchedulingField, build_item};
use getinfo_kube::{ClusterClient, Query, QueryResult};
use std::io::{self, Write};
use tracing::debug;

use crate::display::{OutputFormat, RenderOptions, render};
use crate::error::Result;

/// A fully parsed invocation of one of the reporting commands
#[derive(Debug, Clone)]
pub struct Request {
    pub command: Command,
    pub field: Option<SchedulingField>,
    pub query: Query,
    pub format: OutputFormat,
    pub color: bool,
}

/// Run the request against the current kubeconfig context
pub async fn run(request: &Request) -> Result<()> {
    let cluster = ClusterClient::connect().await?;
    let result = cluster.run(&request.query).await?;
    debug!(
        command = %request.command,
        resource = %result.coordinate,
        count = result.documents.len(),
        "query finished"
    );

    if let Some(text) = present(&result, request)? {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")?;
    }
    Ok(())
}

/// Turn retrieved documents into printable text
pub fn present(result: &QueryResult, request: &Request) -> Result<Option<String>> {
    let namespaced = result.coordinate.namespaced;
    let output: Output = result
        .documents
        .iter()
        .map(|doc| build_item(doc, request.command, request.field, namespaced))
        .collect();

    render(
        &output,
        &RenderOptions {
            command: request.command,
            field: request.field,
            format: request.format,
            color: request.color,
            namespaced,
        },
    )
}
