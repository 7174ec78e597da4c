// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery processing: decode, transform, fit the response, reingest.

pub mod assembler;
pub mod delivery;
pub mod envelope;
pub mod reingest;
pub mod splitter;

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::pipeline::assembler::BatchAssembler;
use crate::pipeline::delivery::{
    DeliveryRequest, DeliveryResponse, InputRecord, RecordOutcome, RecordResult,
};
use crate::pipeline::reingest::{ReingestionClient, StreamTarget};
use crate::pipeline::splitter::SizeBudgetSplitter;
use crate::transform::EventTransformer;

/// Processes one delivery with an injected transformer.
#[derive(Clone)]
pub struct LogPipeline {
    transformer: Arc<dyn EventTransformer>,
    assembler: BatchAssembler,
    splitter: SizeBudgetSplitter,
}

impl LogPipeline {
    #[must_use]
    pub fn new(transformer: Arc<dyn EventTransformer>) -> Self {
        LogPipeline {
            transformer,
            assembler: BatchAssembler::default(),
            splitter: SizeBudgetSplitter::default(),
        }
    }

    #[must_use]
    pub fn with_assembler(mut self, assembler: BatchAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    #[must_use]
    pub fn with_splitter(mut self, splitter: SizeBudgetSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Returns one outcome per input record, in input order.
    ///
    /// The delivery's stream ARN must name the stream `client` reingests
    /// into; this is checked before any record is processed. Records that do
    /// not fit in the response are reingested through `client` before
    /// returning; the invocation fails if any of them could not be
    /// reingested.
    pub async fn process(
        &self,
        request: DeliveryRequest,
        client: &ReingestionClient,
    ) -> Result<DeliveryResponse, PipelineError> {
        let target = StreamTarget::from_request(&request)?;
        if &target != client.target() {
            return Err(PipelineError::StreamTargetMismatch {
                delivery: target.to_string(),
                client: client.target().to_string(),
            });
        }

        let total_records = request.records.len();
        debug!("PIPELINE | Processing {total_records} records");

        let mut outcomes = join_all(
            request
                .records
                .iter()
                .map(|record| self.process_record(record)),
        )
        .await;

        let batches = self
            .splitter
            .split(&mut outcomes, &request.records, target.kind)?;
        log_summary(&outcomes);

        if batches.is_empty() {
            info!("PIPELINE | No records needed to be reingested");
        } else {
            client.submit_all(batches, total_records).await?;
        }

        Ok(DeliveryResponse { records: outcomes })
    }

    async fn process_record(&self, record: &InputRecord) -> RecordOutcome {
        match envelope::decode(&record.data) {
            Ok(envelope) => {
                self.assembler
                    .assemble(&record.record_id, envelope, self.transformer.as_ref())
                    .await
            }
            Err(e) => {
                warn!("PIPELINE | Failed to decode record {}: {e}", record.record_id);
                RecordOutcome::processing_failed(record.record_id.as_str())
            }
        }
    }
}

fn log_summary(outcomes: &[RecordOutcome]) {
    let count = |result: RecordResult| outcomes.iter().filter(|o| o.result() == result).count();
    info!(
        "PIPELINE | {} records Ok, {} Dropped, {} ProcessingFailed",
        count(RecordResult::Ok),
        count(RecordResult::Dropped),
        count(RecordResult::ProcessingFailed)
    );
}
