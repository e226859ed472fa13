//! Offline classification tool.
//!
//! Runs the gateway's classifier on a single request without a server, for
//! checking where a path would go and what the backend would receive.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use cmdb_gateway::config::load_config;
use cmdb_gateway::routing::{Classifier, FallbackChain, LegacyTemplate, RoutableRequest, LEGACY_ROUTES};

#[derive(Parser)]
#[command(name = "routectl")]
#[command(about = "Inspect how the gateway classifies and rewrites requests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one request and print the backend and rewritten URI
    Classify {
        /// Request URI, e.g. /api/v3/cc/update_inst/
        uri: String,

        /// Inline JSON request body
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the request body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Gateway config whose fallback routes should apply
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the legacy endpoint mapping
    Legacy,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { uri, body, body_file, config } => {
            let body = match (body, body_file) {
                (Some(inline), _) => inline.into_bytes(),
                (None, Some(path)) => std::fs::read(path)?,
                (None, None) => Vec::new(),
            };

            let classifier = match config {
                Some(path) => {
                    let config = load_config(&path)?;
                    Classifier::with_fallback(Arc::new(FallbackChain::from_config(&config.fallback_routes)))
                }
                None => Classifier::new(),
            };

            let output = match classifier.classify(RoutableRequest::new(uri, body)) {
                Ok(result) => json!({
                    "backend": result.target.identifier(),
                    "path": result.request.path(),
                    "uri": result.request.uri(),
                    "legacy": result.legacy,
                }),
                Err(e) => json!({
                    "backend": e.backend().identifier(),
                    "error": e.to_string(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Legacy => {
            let rows: Vec<_> = LEGACY_ROUTES
                .iter()
                .map(|route| {
                    let target = match route.template {
                        LegacyTemplate::Fixed(path) => path.to_string(),
                        LegacyTemplate::Object(base) => format!("{base}/{{bk_obj_id}}"),
                        LegacyTemplate::ObjectInstance(base) => format!("{base}/{{bk_obj_id}}/inst/{{bk_inst_id}}"),
                        LegacyTemplate::Association(base) => format!("{base}/{{id}}"),
                    };
                    json!({
                        "old_path": route.old_path,
                        "required_fields": route.template.required_fields(),
                        "new_path": target,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
