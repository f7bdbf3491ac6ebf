//! pipeline-gateway binary.
//!
//! Serves the pipelines named in a config file. Only the diagnostic `echo`
//! action is registered here; embedders register their own actions and call
//! [`pipeline_gateway::lifecycle::run`].

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::Json;
use clap::Parser;
use serde_json::{json, Value};

use pipeline_gateway::actions::{ActionRegistry, Handler, Outcome};
use pipeline_gateway::config::GatewayConfig;
use pipeline_gateway::error::HandlerError;
use pipeline_gateway::lifecycle::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "pipeline-gateway")]
#[command(about = "Declarative API gateway pipelines", long_about = None)]
struct Cli {
    /// Path to the gateway config (.json, otherwise TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Reload pipelines when the config file changes
    #[arg(short, long)]
    watch: bool,
}

fn builtin_actions() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register("echo", |_params: &Value, _config: &GatewayConfig| {
        let handler = |req: Request<Body>| async move {
            let body = json!({ "result": "echo", "url": req.uri().to_string() });
            Ok::<_, HandlerError>(Outcome::respond(Json(body)))
        };
        Ok(Arc::new(handler) as Arc<dyn Handler>)
    });
    registry
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = StartupOptions {
        config_path: cli.config,
        watch: cli.watch,
    };

    match lifecycle::run(options, builtin_actions()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialized if the config never loaded
            eprintln!("pipeline-gateway: {e}");
            tracing::error!(error = %e, "Gateway exited with error");
            ExitCode::FAILURE
        }
    }
}
