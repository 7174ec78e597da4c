// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! AWS SDK implementations of the service traits.

pub mod cloudwatch_logs;
pub mod firehose;
pub mod kinesis;
pub mod ssm;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_kinesis::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::debug;

use crate::pipeline::reingest::{PutRecordOutcome, RecordSink, SinkKind, StreamTarget};

pub use cloudwatch_logs::CloudWatchLogsService;
pub use firehose::FirehoseDeliveryStreamSink;
pub use kinesis::KinesisStreamSink;
pub use ssm::SsmParameterStore;

pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

/// Builds the sink that reingests into `target`, in the target's region.
pub async fn record_sink_for(target: &StreamTarget) -> Arc<dyn RecordSink> {
    let sdk_config = load_sdk_config(&target.region).await;
    debug!(
        "REINGEST | Using {} {} in {}",
        target.kind, target.name, target.region
    );
    match target.kind {
        SinkKind::Stream => Arc::new(KinesisStreamSink::new(
            aws_sdk_kinesis::Client::new(&sdk_config),
            target.name.as_str(),
        )),
        SinkKind::DeliveryStream => Arc::new(FirehoseDeliveryStreamSink::new(
            aws_sdk_firehose::Client::new(&sdk_config),
            target.name.as_str(),
        )),
    }
}

/// Renders an SDK error as `Code: message` for service errors and with its
/// full source chain otherwise.
pub(crate) fn sdk_error_message<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(service_err) => {
            let inner = service_err.err();
            format!(
                "{}: {}",
                inner.code().unwrap_or("Unknown"),
                inner.message().unwrap_or("no message")
            )
        }
        SdkError::TimeoutError(_) => "request timed out".to_string(),
        other => DisplayErrorContext(other).to_string(),
    }
}

/// Both put APIs report a failed entry by setting its error code.
pub(crate) fn put_record_outcome(
    error_code: Option<&str>,
    error_message: Option<&str>,
) -> PutRecordOutcome {
    match error_code {
        Some(code) => PutRecordOutcome::Failed {
            code: code.to_string(),
            message: error_message.unwrap_or_default().to_string(),
        },
        None => PutRecordOutcome::Accepted,
    }
}
