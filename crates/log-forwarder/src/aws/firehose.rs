// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use aws_sdk_firehose::primitives::Blob;
use aws_sdk_firehose::types::Record;

use crate::aws::{put_record_outcome, sdk_error_message};
use crate::error::SinkError;
use crate::pipeline::reingest::{PutRecordOutcome, RecordSink, ReingestionRecord};

/// Reingests into a Firehose delivery stream with `PutRecordBatch`.
#[derive(Debug, Clone)]
pub struct FirehoseDeliveryStreamSink {
    client: aws_sdk_firehose::Client,
    delivery_stream_name: String,
}

impl FirehoseDeliveryStreamSink {
    pub fn new(client: aws_sdk_firehose::Client, delivery_stream_name: impl Into<String>) -> Self {
        FirehoseDeliveryStreamSink {
            client,
            delivery_stream_name: delivery_stream_name.into(),
        }
    }
}

#[async_trait]
impl RecordSink for FirehoseDeliveryStreamSink {
    async fn put_batch(
        &self,
        records: &[ReingestionRecord],
    ) -> Result<Vec<PutRecordOutcome>, SinkError> {
        let records = records
            .iter()
            .map(|record| Record::builder().data(Blob::new(record.data.clone())).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SinkError::Request(e.to_string()))?;

        let output = self
            .client
            .put_record_batch()
            .delivery_stream_name(&self.delivery_stream_name)
            .set_records(Some(records))
            .send()
            .await
            .map_err(|e| SinkError::Service(sdk_error_message(&e)))?;

        Ok(output
            .request_responses()
            .iter()
            .map(|entry| put_record_outcome(entry.error_code(), entry.error_message()))
            .collect())
    }
}
