// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Reingestion of records that did not fit in the response.
//!
//! Records are put back into the stream the delivery came from so they are
//! redelivered and transformed again later. Two stream kinds exist:
//!
//! - **Stream** (Kinesis Data Streams): records carry a partition key.
//! - **Delivery stream** (Firehose): records carry data only.
//!
//! Both report one outcome per submitted record. Only the failed subset is
//! resubmitted, until the attempt budget runs out.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::constants;
use crate::error::{DecodeError, PipelineError, ReingestionError, SinkError};
use crate::pipeline::delivery::{DeliveryRequest, InputRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Stream,
    DeliveryStream,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Stream => write!(f, "stream"),
            SinkKind::DeliveryStream => write!(f, "delivery stream"),
        }
    }
}

impl SinkKind {
    /// Builds the record put back into the origin stream for `record`: its
    /// original, still compressed, bytes.
    pub fn reingestion_record(&self, record: &InputRecord) -> Result<ReingestionRecord, DecodeError> {
        let data = base64::engine::general_purpose::STANDARD.decode(&record.data)?;
        let partition_key = match self {
            SinkKind::Stream => Some(
                record
                    .kinesis_record_metadata
                    .as_ref()
                    .map_or_else(|| record.record_id.clone(), |m| m.partition_key.clone()),
            ),
            SinkKind::DeliveryStream => None,
        };
        Ok(ReingestionRecord {
            data,
            partition_key,
        })
    }
}

/// Stream a delivery came from, derived once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    pub kind: SinkKind,
    pub name: String,
    pub region: String,
}

impl StreamTarget {
    /// Parses an ARN such as
    /// `arn:aws:kinesis:us-east-1:123456789012:stream/access-logs`.
    pub fn from_arn(kind: SinkKind, arn: &str) -> Result<Self, PipelineError> {
        let invalid = || PipelineError::InvalidStreamArn(arn.to_string());

        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" {
            return Err(invalid());
        }
        let region = parts[3];
        let (_, name) = parts[5].split_once('/').ok_or_else(invalid)?;
        if region.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(StreamTarget {
            kind,
            name: name.to_string(),
            region: region.to_string(),
        })
    }

    /// `sourceKinesisStreamArn` takes precedence: a delivery stream reading
    /// from a Kinesis stream reingests into that stream.
    pub fn from_request(request: &DeliveryRequest) -> Result<Self, PipelineError> {
        match (
            &request.source_kinesis_stream_arn,
            &request.delivery_stream_arn,
        ) {
            (Some(arn), _) => Self::from_arn(SinkKind::Stream, arn),
            (None, Some(arn)) => Self::from_arn(SinkKind::DeliveryStream, arn),
            (None, None) => Err(PipelineError::MissingStreamArn),
        }
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.region)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReingestionRecord {
    pub data: Vec<u8>,
    /// Only set for [`SinkKind::Stream`].
    pub partition_key: Option<String>,
}

/// Outcome of one record within a put call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutRecordOutcome {
    Accepted,
    Failed { code: String, message: String },
}

impl PutRecordOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PutRecordOutcome::Failed { .. })
    }
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Submits `records` in one call. On success, returns one outcome per
    /// record, in submission order.
    async fn put_batch(
        &self,
        records: &[ReingestionRecord],
    ) -> Result<Vec<PutRecordOutcome>, SinkError>;
}

/// Puts sealed batches back into the origin stream.
#[derive(Clone)]
pub struct ReingestionClient {
    target: StreamTarget,
    sink: Arc<dyn RecordSink>,
    max_attempts: u32,
    concurrency: usize,
}

impl fmt::Debug for ReingestionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReingestionClient")
            .field("target", &self.target)
            .field("max_attempts", &self.max_attempts)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl ReingestionClient {
    #[must_use]
    pub fn new(target: StreamTarget, sink: Arc<dyn RecordSink>) -> Self {
        ReingestionClient {
            target,
            sink,
            max_attempts: constants::MAX_REINGESTION_ATTEMPTS,
            concurrency: constants::DEFAULT_REINGESTION_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn target(&self) -> &StreamTarget {
        &self.target
    }

    /// Submits one batch, resubmitting the records the sink reports as
    /// failed until none remain or `max_attempts` calls have been made.
    pub async fn submit(&self, batch: Vec<ReingestionRecord>) -> Result<(), ReingestionError> {
        let mut pending = batch;
        let mut attempts: u32 = 0;

        while !pending.is_empty() {
            let outcomes = self.sink.put_batch(&pending).await?;
            attempts += 1;

            if outcomes.len() != pending.len() {
                return Err(SinkError::MalformedResponse {
                    expected: pending.len(),
                    actual: outcomes.len(),
                }
                .into());
            }

            let failed: Vec<ReingestionRecord> = pending
                .into_iter()
                .zip(outcomes)
                .filter(|(_, outcome)| outcome.is_failed())
                .map(|(record, _)| record)
                .collect();

            if failed.is_empty() {
                return Ok(());
            }
            if attempts >= self.max_attempts {
                return Err(ReingestionError::AttemptsExhausted {
                    attempts,
                    remaining: failed.len(),
                });
            }

            debug!(
                "REINGEST | {} records failed on attempt {attempts} to {} {}, retrying",
                failed.len(),
                self.target.kind,
                self.target.name
            );
            pending = failed;
        }

        Ok(())
    }

    /// Submits every batch with at most `concurrency` in flight and waits for
    /// all of them. Fails with the first failing batch, in batch order, once
    /// every batch has settled.
    pub async fn submit_all(
        &self,
        batches: Vec<Vec<ReingestionRecord>>,
        total_records: usize,
    ) -> Result<(), ReingestionError> {
        let to_reingest: usize = batches.iter().map(Vec::len).sum();

        let results: Vec<(usize, Result<(), ReingestionError>)> = stream::iter(batches)
            .map(|batch| async move {
                let len = batch.len();
                (len, self.submit(batch).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut reingested = 0;
        let mut first_error = None;
        for (len, result) in results {
            match result {
                Ok(()) => {
                    reingested += len;
                    info!(
                        "REINGEST | Reingested {reingested}/{to_reingest} records out of {total_records} in to {} stream",
                        self.target.name
                    );
                }
                Err(e) => {
                    warn!("REINGEST | Failed to reingest batch of {len} records: {e}");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => {
                error!("REINGEST | Failed to reingest records. {e}");
                Err(e)
            }
            None => Ok(()),
        }
    }
}
