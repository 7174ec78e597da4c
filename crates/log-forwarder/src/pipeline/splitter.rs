// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fits the response under the sink's payload ceiling.
//!
//! Outcomes are scanned front to back; while the projected response is over
//! the ceiling, each `Ok` outcome met is demoted to `Dropped` and its original
//! record queued for reingestion. The scan stops as soon as the response
//! fits, so the demoted records are always the leading `Ok` records.

use tracing::debug;

use crate::constants;
use crate::error::PipelineError;
use crate::pipeline::delivery::{InputRecord, RecordOutcome};
use crate::pipeline::reingest::{ReingestionRecord, SinkKind};

#[derive(Debug, Clone, Copy)]
pub struct SizeBudgetSplitter {
    /// Ceiling on the sum of record ids and payloads of `Ok` outcomes
    pub(crate) max_response_bytes: usize,
    /// Maximum records per sealed reingestion batch
    pub(crate) max_batch_records: usize,
}

impl Default for SizeBudgetSplitter {
    fn default() -> Self {
        SizeBudgetSplitter {
            max_response_bytes: constants::MAX_RESPONSE_PAYLOAD_BYTES,
            max_batch_records: constants::MAX_REINGESTION_BATCH_RECORDS,
        }
    }
}

impl SizeBudgetSplitter {
    #[must_use]
    pub fn new(max_response_bytes: usize, max_batch_records: usize) -> Self {
        SizeBudgetSplitter {
            max_response_bytes,
            max_batch_records: max_batch_records.max(1),
        }
    }

    /// Demotes leading `Ok` outcomes until the response fits and returns the
    /// sealed reingestion batches. `outcomes[i]` must belong to `records[i]`.
    pub fn split(
        &self,
        outcomes: &mut [RecordOutcome],
        records: &[InputRecord],
        kind: SinkKind,
    ) -> Result<Vec<Vec<ReingestionRecord>>, PipelineError> {
        let mut projected_size: usize = outcomes.iter().map(RecordOutcome::projected_size).sum();
        let mut batches = Vec::new();
        let mut current = Vec::new();

        for (outcome, record) in outcomes.iter_mut().zip(records) {
            if projected_size <= self.max_response_bytes {
                break;
            }
            let Some(payload) = outcome.demote_to_dropped() else {
                continue;
            };
            let reingestion_record = kind.reingestion_record(record).map_err(|source| {
                PipelineError::ReingestionRecord {
                    record_id: record.record_id.clone(),
                    source,
                }
            })?;

            projected_size -= payload.len();
            current.push(reingestion_record);
            if current.len() == self.max_batch_records {
                batches.push(std::mem::take(&mut current));
            }
        }

        if !current.is_empty() {
            batches.push(current);
        }

        debug!(
            "PIPELINE | Projected response size {projected_size} bytes, {} reingestion batches",
            batches.len()
        );
        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::delivery::RecordResult;
    use proptest::prelude::*;

    fn input(i: usize) -> InputRecord {
        InputRecord {
            record_id: format!("r{i}"),
            data: "AQID".to_string(),
            kinesis_record_metadata: None,
        }
    }

    fn ok(i: usize, payload_len: usize) -> RecordOutcome {
        RecordOutcome::ok(format!("r{i}"), "x".repeat(payload_len))
    }

    #[test]
    fn test_under_budget_is_untouched() {
        let mut outcomes = vec![ok(0, 10), ok(1, 10)];
        let records = vec![input(0), input(1)];
        let batches = SizeBudgetSplitter::new(24, 500)
            .split(&mut outcomes, &records, SinkKind::DeliveryStream)
            .unwrap();
        assert!(batches.is_empty());
        assert!(outcomes.iter().all(|o| o.result() == RecordResult::Ok));
    }

    #[test]
    fn test_demotes_leading_ok_records_only() {
        // each outcome projects 2 + 10 bytes
        let mut outcomes = vec![
            RecordOutcome::processing_failed("r0"),
            ok(1, 10),
            RecordOutcome::dropped("r2"),
            ok(3, 10),
            ok(4, 10),
        ];
        let records: Vec<_> = (0..5).map(input).collect();
        let batches = SizeBudgetSplitter::new(14, 500)
            .split(&mut outcomes, &records, SinkKind::DeliveryStream)
            .unwrap();

        let results: Vec<_> = outcomes.iter().map(RecordOutcome::result).collect();
        assert_eq!(
            results,
            vec![
                RecordResult::ProcessingFailed,
                RecordResult::Dropped,
                RecordResult::Dropped,
                RecordResult::Dropped,
                RecordResult::Ok,
            ]
        );
        assert_eq!(outcomes[3].data(), None);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn test_only_payload_length_is_subtracted() {
        // projected = (2 + 10) * 2 = 24; dropping r0 subtracts only 10, which
        // leaves 14 > 13, so r1 goes as well
        let mut outcomes = vec![ok(0, 10), ok(1, 10)];
        let records = vec![input(0), input(1)];
        let batches = SizeBudgetSplitter::new(13, 500)
            .split(&mut outcomes, &records, SinkKind::DeliveryStream)
            .unwrap();
        assert_eq!(batches.concat().len(), 2);
    }

    #[test]
    fn test_seals_batches_at_limit() {
        let mut outcomes: Vec<_> = (0..7).map(|i| ok(i, 10)).collect();
        let records: Vec<_> = (0..7).map(input).collect();
        let batches = SizeBudgetSplitter::new(0, 3)
            .split(&mut outcomes, &records, SinkKind::Stream)
            .unwrap();
        let sizes: Vec<_> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert!(batches
            .iter()
            .flatten()
            .all(|r| r.partition_key.is_some() && r.data == vec![1, 2, 3]));
    }

    #[test]
    fn test_reingests_original_record_data() {
        let mut outcomes = vec![ok(0, 10)];
        let records = vec![InputRecord {
            record_id: "r0".to_string(),
            data: "H4sIAAAAAAAAAA==".to_string(),
            kinesis_record_metadata: None,
        }];
        let batches = SizeBudgetSplitter::new(0, 500)
            .split(&mut outcomes, &records, SinkKind::DeliveryStream)
            .unwrap();
        assert_eq!(
            batches[0][0].data,
            vec![0x1f, 0x8b, 0x08, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    proptest! {
        #[test]
        fn prop_demoted_records_fit_budget(
            payloads in prop::collection::vec(prop::option::of(0usize..64), 0..60),
            max_response_bytes in 0usize..2048,
            max_batch_records in 1usize..8,
        ) {
            let mut outcomes: Vec<_> = payloads
                .iter()
                .enumerate()
                .map(|(i, p)| match p {
                    Some(len) => ok(i, *len),
                    None => RecordOutcome::processing_failed(format!("r{i}")),
                })
                .collect();
            let original = outcomes.clone();
            let records: Vec<_> = (0..payloads.len()).map(input).collect();

            let batches = SizeBudgetSplitter::new(max_response_bytes, max_batch_records)
                .split(&mut outcomes, &records, SinkKind::DeliveryStream)
                .unwrap();

            let demoted: Vec<usize> = original
                .iter()
                .zip(&outcomes)
                .enumerate()
                .filter(|(_, (before, after))| before.result() != after.result())
                .map(|(i, _)| i)
                .collect();

            // every demoted record lands in exactly one batch
            prop_assert_eq!(batches.iter().map(Vec::len).sum::<usize>(), demoted.len());
            prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= max_batch_records));

            // demoted records are the leading Ok records
            let ok_indices: Vec<usize> = original
                .iter()
                .enumerate()
                .filter(|(_, o)| o.result() == RecordResult::Ok)
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(&demoted[..], &ok_indices[..demoted.len()]);

            // the remaining projection fits, unless every Ok record was demoted
            let removed_payload: usize = demoted
                .iter()
                .map(|i| original[*i].data().map_or(0, str::len))
                .sum();
            let projected = original.iter().map(RecordOutcome::projected_size).sum::<usize>()
                - removed_payload;
            prop_assert!(projected <= max_response_bytes || demoted.len() == ok_indices.len());
            for outcome in &outcomes {
                prop_assert_eq!(outcome.data().is_some(), outcome.result() == RecordResult::Ok);
            }
        }
    }
}
