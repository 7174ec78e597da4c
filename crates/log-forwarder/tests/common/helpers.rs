// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Builders for delivery payloads

use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use log_forwarder::pipeline::delivery::{DeliveryRequest, InputRecord};
use serde_json::json;
use std::io::Write;

#[allow(dead_code)]
pub const DELIVERY_STREAM_ARN: &str =
    "arn:aws:firehose:us-east-1:123456789012:deliverystream/api-analytics";

#[allow(dead_code)]
/// Gzip then base64, the way CloudWatch Logs ships envelopes
pub fn compress(payload: &str) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload.as_bytes())
        .expect("Failed to compress payload");
    base64::engine::general_purpose::STANDARD.encode(encoder.finish().expect("Failed to finish gzip"))
}

#[allow(dead_code)]
pub fn data_message(log_group: &str, messages: &[&str]) -> String {
    let log_events: Vec<_> = messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            json!({
                "id": format!("3682179618763741000{i}"),
                "timestamp": 1680997508000_i64 + i as i64,
                "message": message,
            })
        })
        .collect();
    json!({
        "messageType": "DATA_MESSAGE",
        "owner": "123456789012",
        "logGroup": log_group,
        "logStream": "0e109eae-d723-11ed-9703-263563b74b58",
        "subscriptionFilters": ["ApiAnalytics"],
        "logEvents": log_events,
    })
    .to_string()
}

#[allow(dead_code)]
pub fn control_message() -> String {
    json!({
        "messageType": "CONTROL_MESSAGE",
        "owner": "CloudwatchLogs",
        "logGroup": "",
        "logStream": "",
        "subscriptionFilters": [],
        "logEvents": [{"id": "", "timestamp": 1680997508000_i64, "message": "CWL CONTROL MESSAGE: Checking health of destination Firehose."}],
    })
    .to_string()
}

#[allow(dead_code)]
pub fn record(record_id: &str, data: String) -> InputRecord {
    InputRecord {
        record_id: record_id.to_string(),
        data,
        kinesis_record_metadata: None,
    }
}

#[allow(dead_code)]
pub fn delivery(records: Vec<InputRecord>) -> DeliveryRequest {
    DeliveryRequest {
        records,
        delivery_stream_arn: Some(DELIVERY_STREAM_ARN.to_string()),
        source_kinesis_stream_arn: None,
    }
}
