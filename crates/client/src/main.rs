//! `datactl` entry point.

use clap::Parser;
use client::cli::Cli;
use client::{ClientError, Config, HttpTransport, Session};
use orchestrator::Outcome;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // 1. Initialize tracing on stderr; stdout carries the JSON result
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ClientError::Metrics(e.to_string()))?;

    // 3. Start the session
    let transport = HttpTransport::new(config.api_url.clone())?;
    let session = Session::start(&config, transport).await;

    // 4. Dispatch and wait for the completion
    let default_token_type = config.token.as_ref().map(|_| config.token_type.as_str());
    let intent = cli.to_intent(default_token_type)?;
    let completion = session.dispatch(intent).completion().await?;

    let (status, payload) = match &completion.outcome {
        Outcome::Success { payload, .. } => ("success", payload.clone()),
        Outcome::Fail { kind, .. } => (kind.as_str(), serde_json::Value::Null),
    };
    let output = json!({
        "status": status,
        "collection": completion.collection,
        "payload": payload,
        "errors": session.current_errors().await,
        "store": session.state().await.to_json(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if cli.metrics {
        println!("{}", metrics_handle.render());
    }

    session.shutdown().await
}
