// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while loading the forwarder configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Reasons a single delivery record could not be decoded into an envelope.
///
/// These never fail an invocation: the pipeline turns them into a
/// `ProcessingFailed` record outcome.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("record data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("record data is not valid gzip: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("decompressed record is not a valid envelope: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a single put call against a record sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to build put request: {0}")]
    Request(String),

    #[error("Put call failed: {0}")]
    Service(String),

    #[error("Sink returned {actual} outcomes for {expected} records")]
    MalformedResponse { expected: usize, actual: usize },
}

/// Final failure of one reingestion batch
#[derive(Debug, thiserror::Error)]
pub enum ReingestionError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Could not put records after {attempts} attempts, {remaining} records still failing")]
    AttemptsExhausted { attempts: u32, remaining: usize },
}

/// Errors that fail a whole pipeline invocation.
///
/// The caller reports them upstream, which redelivers the original batch.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Delivery carries neither sourceKinesisStreamArn nor deliveryStreamArn")]
    MissingStreamArn,

    #[error("Invalid stream ARN: {0}")]
    InvalidStreamArn(String),

    #[error("Delivery came from {delivery} but reingestion targets {client}")]
    StreamTargetMismatch { delivery: String, client: String },

    #[error("Failed to build reingestion record for {record_id}: {source}")]
    ReingestionRecord {
        record_id: String,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to reingest records: {0}")]
    Reingestion(#[from] ReingestionError),
}

/// Failure reported by the log service (listing or filter creation).
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct LogsServiceError {
    pub operation: &'static str,
    pub message: String,
}

impl LogsServiceError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error("Parameter {0} not found")]
    NotFound(String),

    #[error("Failed to read parameter {name}: {message}")]
    Service { name: String, message: String },
}

/// Errors that abort a reconciliation run before any subscription is created
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("Failed to list log groups with prefix {prefix}: {source}")]
    ListLogGroups {
        prefix: String,
        #[source]
        source: LogsServiceError,
    },

    #[error("Failed to list subscription filters of {log_group}: {source}")]
    ListSubscriptionFilters {
        log_group: String,
        #[source]
        source: LogsServiceError,
    },
}
