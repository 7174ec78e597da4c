// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use base64::Engine;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::constants;
use crate::pipeline::delivery::RecordOutcome;
use crate::pipeline::envelope::{DataMessage, Envelope};
use crate::transform::EventTransformer;

/// Turns a decoded envelope into the outcome of its record.
#[derive(Debug, Clone, Copy)]
pub struct BatchAssembler {
    /// Maximum base64 payload size of a single record
    pub(crate) max_record_payload_bytes: usize,
}

impl Default for BatchAssembler {
    fn default() -> Self {
        BatchAssembler {
            max_record_payload_bytes: constants::MAX_RECORD_PAYLOAD_BYTES,
        }
    }
}

impl BatchAssembler {
    #[must_use]
    pub fn new(max_record_payload_bytes: usize) -> Self {
        BatchAssembler {
            max_record_payload_bytes,
        }
    }

    pub async fn assemble(
        &self,
        record_id: &str,
        envelope: Envelope,
        transformer: &dyn EventTransformer,
    ) -> RecordOutcome {
        match envelope {
            Envelope::Control => RecordOutcome::dropped(record_id),
            Envelope::Data(message) => self.assemble_data(record_id, &message, transformer).await,
            Envelope::Unrecognized(message_type) => {
                warn!("PIPELINE | Record {record_id} has unrecognized message type {message_type}");
                RecordOutcome::processing_failed(record_id)
            }
        }
    }

    async fn assemble_data(
        &self,
        record_id: &str,
        message: &DataMessage,
        transformer: &dyn EventTransformer,
    ) -> RecordOutcome {
        // join_all keeps input order whatever the completion order
        let fragments = join_all(
            message
                .log_events
                .iter()
                .map(|event| transformer.transform(event)),
        )
        .await;
        let payload = fragments.concat();
        let encoded = base64::engine::general_purpose::STANDARD.encode(payload);

        if encoded.len() <= self.max_record_payload_bytes {
            debug!(
                "PIPELINE | Record {record_id}: {} events from {} -> {} bytes",
                message.log_events.len(),
                message.log_group,
                encoded.len()
            );
            RecordOutcome::ok(record_id, encoded)
        } else {
            warn!(
                "PIPELINE | Record {record_id} payload of {} bytes exceeds the {} bytes limit",
                encoded.len(),
                self.max_record_payload_bytes
            );
            RecordOutcome::processing_failed(record_id)
        }
    }
}
