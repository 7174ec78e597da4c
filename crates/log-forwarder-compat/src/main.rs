// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, warn};

use log_forwarder::{
    aws::{self, CloudWatchLogsService, SsmParameterStore},
    config::{Config, ForwarderFunction},
    error::ConfigError,
    logger,
    pipeline::{
        delivery::DeliveryRequest,
        reingest::{ReingestionClient, StreamTarget},
        LogPipeline,
    },
    subscriptions,
    transform::{AccessLogTransformer, EventTransformer, ExecutionLogTransformer},
};

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Error loading log forwarder configuration")?;

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(logger::env_filter(&config.log_level)?)
        .event_format(logger::Formatter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    debug!("Logging subsystem enabled");

    let function = config
        .function
        .ok_or(ConfigError::Missing("LOG_FORWARDER_FUNCTION"))?;

    let result = match function {
        ForwarderFunction::AccessLogsTransformer => {
            transform(&config, Arc::new(AccessLogTransformer)).await
        }
        ForwarderFunction::ExecutionLogsTransformer => {
            transform(&config, Arc::new(ExecutionLogTransformer)).await
        }
        ForwarderFunction::Subscriber => subscribe(&config).await,
    };

    if let Err(e) = &result {
        error!("{function:?} failed: {e:#}");
    }
    result
}

/// Reads a delivery from stdin and writes the response to stdout.
async fn transform(config: &Config, transformer: Arc<dyn EventTransformer>) -> anyhow::Result<()> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read delivery from stdin")?;
    let request: DeliveryRequest =
        serde_json::from_str(&input).context("Failed to parse delivery")?;

    let target = StreamTarget::from_request(&request)?;
    let sink = aws::record_sink_for(&target).await;
    let client = ReingestionClient::new(target, sink)
        .with_max_attempts(config.reingest_max_attempts)
        .with_concurrency(config.reingest_concurrency);

    let response = LogPipeline::new(transformer).process(request, &client).await?;

    let mut output = serde_json::to_vec(&response)?;
    output.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&output).await?;
    stdout.flush().await?;
    Ok(())
}

async fn subscribe(config: &Config) -> anyhow::Result<()> {
    let sdk_config = aws::load_sdk_config(&config.region).await;
    let store = SsmParameterStore::from_sdk_config(&sdk_config);
    let logs = Arc::new(CloudWatchLogsService::from_sdk_config(&sdk_config));

    let summary = subscriptions::run_subscriber(config, &store, logs).await?;
    if summary.failed > 0 {
        warn!(
            "SUBSCRIBER | {} subscriptions will be retried on the next run",
            summary.failed
        );
    }
    Ok(())
}
