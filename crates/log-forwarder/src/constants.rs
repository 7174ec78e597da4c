// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Limits imposed by the downstream sinks and defaults for the subscriber.

/// Maximum base64-encoded payload size of a single transformed record.
///
/// A record over this size is marked `ProcessingFailed` regardless of its
/// siblings.
pub const MAX_RECORD_PAYLOAD_BYTES: usize = 6_000_000;

/// Maximum aggregate size of the response returned to the sink.
///
/// The real hard limit is 6,291,456 bytes (6MB); the difference covers the
/// JSON framing the projected size does not count.
pub const MAX_RESPONSE_PAYLOAD_BYTES: usize = 6_000_000;

/// Maximum number of records per reingestion put call.
pub const MAX_REINGESTION_BATCH_RECORDS: usize = 500;

/// Maximum number of put calls issued for one reingestion batch.
pub const MAX_REINGESTION_ATTEMPTS: u32 = 20;

/// Maximum number of sealed reingestion batches in flight at once.
pub const DEFAULT_REINGESTION_CONCURRENCY: usize = 4;

/// Maximum number of log groups inspected concurrently during reconciliation.
pub const DEFAULT_INSPECT_CONCURRENCY: usize = 8;

pub const DEFAULT_REGION: &str = "us-east-1";

pub const EXECUTION_LOG_GROUP_PREFIX: &str = "API-Gateway-Execution-Logs_";
pub const ACCESS_LOG_GROUP_PREFIX: &str = "API-Gateway-Access-Logs_";

pub const ROLE_ARN_PARAMETER: &str = "/product/analytics/cloudwatch-kinesis-role-arn";
pub const EXECUTION_LOGS_DESTINATION_PARAMETER: &str =
    "/product/analytics/execution-logs/kinesis-delivery-stream-arn";
pub const ACCESS_LOGS_DESTINATION_PARAMETER: &str =
    "/product/analytics/access-logs/kinesis-delivery-stream-arn";

/// Name given to every subscription filter the subscriber creates.
pub const SUBSCRIPTION_FILTER_NAME: &str = "ApiAnalytics";

/// Empty pattern: forward every event of the log group.
pub const SUBSCRIPTION_FILTER_PATTERN: &str = "";
