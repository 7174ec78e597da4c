// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::types::PutRecordsRequestEntry;

use crate::aws::{put_record_outcome, sdk_error_message};
use crate::error::SinkError;
use crate::pipeline::reingest::{PutRecordOutcome, RecordSink, ReingestionRecord};

/// Reingests into a Kinesis data stream with `PutRecords`.
#[derive(Debug, Clone)]
pub struct KinesisStreamSink {
    client: aws_sdk_kinesis::Client,
    stream_name: String,
}

impl KinesisStreamSink {
    pub fn new(client: aws_sdk_kinesis::Client, stream_name: impl Into<String>) -> Self {
        KinesisStreamSink {
            client,
            stream_name: stream_name.into(),
        }
    }
}

#[async_trait]
impl RecordSink for KinesisStreamSink {
    async fn put_batch(
        &self,
        records: &[ReingestionRecord],
    ) -> Result<Vec<PutRecordOutcome>, SinkError> {
        let entries = records
            .iter()
            .map(|record| {
                PutRecordsRequestEntry::builder()
                    .data(Blob::new(record.data.clone()))
                    .partition_key(record.partition_key.clone().unwrap_or_default())
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SinkError::Request(e.to_string()))?;

        let output = self
            .client
            .put_records()
            .stream_name(&self.stream_name)
            .set_records(Some(entries))
            .send()
            .await
            .map_err(|e| SinkError::Service(sdk_error_message(&e)))?;

        Ok(output
            .records()
            .iter()
            .map(|entry| put_record_outcome(entry.error_code(), entry.error_message()))
            .collect())
    }
}
