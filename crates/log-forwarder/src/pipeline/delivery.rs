// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire types of one delivery: the request handed to the transformer and the
//! response returned to the sink.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisRecordMetadata {
    pub partition_key: String,
    #[serde(default)]
    pub shard_id: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<String>,
}

/// One record of a delivery, as received from the sink.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    pub record_id: String,
    /// Base64 of the gzip-compressed envelope.
    pub data: String,
    /// Present when the delivery stream reads from a Kinesis stream.
    #[serde(default)]
    pub kinesis_record_metadata: Option<KinesisRecordMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequest {
    pub records: Vec<InputRecord>,
    #[serde(default)]
    pub delivery_stream_arn: Option<String>,
    #[serde(default)]
    pub source_kinesis_stream_arn: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordResult {
    Ok,
    Dropped,
    ProcessingFailed,
}

/// Outcome of one input record.
///
/// `data` is present if and only if `result` is [`RecordResult::Ok`]; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
    record_id: String,
    result: RecordResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl RecordOutcome {
    #[must_use]
    pub fn ok(record_id: impl Into<String>, data: String) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::Ok,
            data: Some(data),
        }
    }

    #[must_use]
    pub fn dropped(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::Dropped,
            data: None,
        }
    }

    #[must_use]
    pub fn processing_failed(record_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            result: RecordResult::ProcessingFailed,
            data: None,
        }
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn result(&self) -> RecordResult {
        self.result
    }

    /// Base64 payload, only set for `Ok` outcomes.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Bytes this outcome contributes to the response: record id plus payload.
    /// Only `Ok` outcomes count.
    pub fn projected_size(&self) -> usize {
        match &self.data {
            Some(data) if self.result == RecordResult::Ok => self.record_id.len() + data.len(),
            _ => 0,
        }
    }

    /// Reclassifies an `Ok` outcome as `Dropped`, returning the stripped
    /// payload. Other outcomes are left untouched and yield `None`.
    pub fn demote_to_dropped(&mut self) -> Option<String> {
        if self.result != RecordResult::Ok {
            return None;
        }
        self.result = RecordResult::Dropped;
        self.data.take()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResponse {
    pub records: Vec<RecordOutcome>,
}
