//! `send` and `preview` commands

use std::error::Error;
use std::sync::Arc;

use crate::core::compose::{
    ComposeRequest, Destination, DryRunSink, MessageComposer, MessageSink,
};
use crate::core::config::Config;
use crate::core::mention::{DirectoryLookup, NormalizeWarning, OfflineDirectory};
use crate::graph::{GraphClient, ACCESS_TOKEN_ENV};

fn composer_for(config: &Config, graph: Option<&GraphClient>) -> MessageComposer {
    let directory: Arc<dyn DirectoryLookup> = match graph {
        Some(client) => Arc::new(client.clone()),
        None => Arc::new(OfflineDirectory),
    };
    MessageComposer::new(directory).with_lookup_timeout(config.lookup_timeout())
}

fn print_warnings(warnings: &[NormalizeWarning]) {
    for warning in warnings {
        eprintln!("⚠️  {warning}");
    }
}

pub async fn run_send(
    config: &Config,
    destination: Destination,
    request: ComposeRequest,
    dry_run: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = GraphClient::from_env(config.graph_base_url())?;
    if graph.is_none() && !dry_run {
        return Err(format!(
            "{ACCESS_TOKEN_ENV} is not set. Export a bearer token or use --dry-run."
        )
        .into());
    }

    let composer = composer_for(config, graph.as_ref());
    let sink: &dyn MessageSink = match (&graph, dry_run) {
        (Some(client), false) => client,
        _ => &DryRunSink,
    };

    let (composed, receipt) = composer.send(sink, &destination, &request).await?;
    print_warnings(&composed.warnings);

    if !dry_run {
        match receipt.message_id {
            Some(id) => println!("✅ Sent message {id} to {destination}"),
            None => println!("✅ Sent message to {destination}"),
        }
    }
    Ok(())
}

pub async fn run_preview(config: &Config, request: ComposeRequest) -> Result<(), Box<dyn Error>> {
    let graph = GraphClient::from_env(config.graph_base_url())?;
    let composer = composer_for(config, graph.as_ref());

    let composed = composer.compose(&request).await?;
    print_warnings(&composed.warnings);
    println!("{}", serde_json::to_string_pretty(&composed.message)?);
    Ok(())
}
