// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoding of CloudWatch Logs subscription envelopes.
//!
//! Each delivery record holds one envelope, gzip-compressed then base64
//! encoded:
//!
//! ```json
//! {
//!   "messageType": "DATA_MESSAGE",
//!   "owner": "123456789012",
//!   "logGroup": "log_group_name",
//!   "logStream": "log_stream_name",
//!   "subscriptionFilters": ["subscription_filter_name"],
//!   "logEvents": [
//!     {"id": "01234567890123456789012345678901234567890123456789012345", "timestamp": 1510109208016, "message": "log message 1"}
//!   ]
//! }
//! ```
//!
//! `CONTROL_MESSAGE` envelopes are sent by CloudWatch Logs to check that the
//! destination is reachable and carry no events.

use std::io::Read;

use base64::Engine;
use flate2::read::GzDecoder;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::DecodeError;

const DATA_MESSAGE: &str = "DATA_MESSAGE";
const CONTROL_MESSAGE: &str = "CONTROL_MESSAGE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogEvent {
    pub id: String,
    pub timestamp: i64,
    pub message: String,
}

/// Payload of a `DATA_MESSAGE` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMessage {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub log_group: String,
    #[serde(default)]
    pub log_stream: String,
    #[serde(default)]
    pub subscription_filters: Vec<String>,
    #[serde(default)]
    pub log_events: Vec<LogEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Control,
    Data(DataMessage),
    /// Carries the unexpected message type.
    Unrecognized(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeHeader {
    message_type: String,
}

/// Decodes one base64 record into an [`Envelope`].
///
/// Base64, gzip and JSON failures are all reported as [`DecodeError`]; none of
/// them is retried.
pub fn decode(data: &str) -> Result<Envelope, DecodeError> {
    let compressed = base64::engine::general_purpose::STANDARD.decode(data)?;
    let decompressed = gunzip(&compressed)?;
    parse(&decompressed)
}

fn gunzip(compressed: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = GzDecoder::new(compressed);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(DecodeError::Decompress)?;
    Ok(decompressed)
}

/// Classifies on `messageType` alone; the body is only read for data
/// envelopes.
fn parse(decompressed: &[u8]) -> Result<Envelope, DecodeError> {
    let object: Map<String, Value> = serde_json::from_slice(decompressed)?;
    let envelope = Value::Object(object);
    let header = EnvelopeHeader::deserialize(&envelope)?;
    Ok(match header.message_type.as_str() {
        DATA_MESSAGE => Envelope::Data(DataMessage::deserialize(envelope)?),
        CONTROL_MESSAGE => Envelope::Control,
        _ => Envelope::Unrecognized(header.message_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    fn encode(raw: &[u8]) -> String {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).unwrap();
        base64::engine::general_purpose::STANDARD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn test_decode_data_message() {
        let data = encode(
            br#"{
                "messageType": "DATA_MESSAGE",
                "owner": "123456789012",
                "logGroup": "API-Gateway-Execution-Logs_kyc8nws4p1/main",
                "logStream": "stream",
                "subscriptionFilters": ["ApiAnalytics"],
                "logEvents": [
                    {"id": "1", "timestamp": 1510109208016, "message": "log message 1"},
                    {"id": "2", "timestamp": 1510109208017, "message": "log message 2"}
                ]
            }"#,
        );
        let Envelope::Data(message) = decode(&data).unwrap() else {
            panic!("expected a data envelope");
        };
        assert_eq!(message.log_group, "API-Gateway-Execution-Logs_kyc8nws4p1/main");
        assert_eq!(message.subscription_filters, vec!["ApiAnalytics"]);
        assert_eq!(
            message.log_events,
            vec![
                LogEvent {
                    id: "1".to_string(),
                    timestamp: 1510109208016,
                    message: "log message 1".to_string(),
                },
                LogEvent {
                    id: "2".to_string(),
                    timestamp: 1510109208017,
                    message: "log message 2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_decode_control_message() {
        let data = encode(
            br#"{"messageType":"CONTROL_MESSAGE","owner":"CloudwatchLogs","logGroup":"","logStream":"","subscriptionFilters":[],"logEvents":[{"id":"","timestamp":1432826855000,"message":"CWL CONTROL MESSAGE: Checking health of destination Firehose."}]}"#,
        );
        assert_eq!(decode(&data).unwrap(), Envelope::Control);
    }

    #[test]
    fn test_decode_control_message_ignores_body() {
        for body in [
            br#"{"messageType":"CONTROL_MESSAGE","logEvents":[{"message":"x"}]}"#.as_slice(),
            br#"{"messageType":"CONTROL_MESSAGE","owner":null}"#.as_slice(),
            br#"{"messageType":"CONTROL_MESSAGE","logEvents":"none"}"#.as_slice(),
        ] {
            assert_eq!(decode(&encode(body)).unwrap(), Envelope::Control);
        }
    }

    #[test]
    fn test_decode_unrecognized_message_ignores_body() {
        let data = encode(br#"{"messageType":"HEARTBEAT","logEvents":[{"id":1}]}"#);
        assert_eq!(
            decode(&data).unwrap(),
            Envelope::Unrecognized("HEARTBEAT".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_malformed_data_events() {
        let data = encode(br#"{"messageType":"DATA_MESSAGE","logEvents":[{"message":"x"}]}"#);
        assert!(matches!(decode(&data), Err(DecodeError::Parse(_))));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let data = encode(br#"["DATA_MESSAGE"]"#);
        assert!(matches!(decode(&data), Err(DecodeError::Parse(_))));
    }

    #[test]
    fn test_decode_unrecognized_message() {
        let data = encode(br#"{"messageType":"HEARTBEAT","logEvents":[]}"#);
        assert_eq!(
            decode(&data).unwrap(),
            Envelope::Unrecognized("HEARTBEAT".to_string())
        );
    }

    #[test]
    fn test_decode_data_message_without_events() {
        let data = encode(br#"{"messageType":"DATA_MESSAGE"}"#);
        assert_eq!(decode(&data).unwrap(), Envelope::Data(DataMessage::default()));
    }

    #[test]
    fn test_decode_rejects_uncompressed_data() {
        let data = base64::engine::general_purpose::STANDARD.encode(br#"{"messageType":"DATA_MESSAGE"}"#);
        assert!(matches!(decode(&data), Err(DecodeError::Decompress(_))));
    }

    #[test]
    fn test_decode_rejects_invalid_base64() {
        assert!(matches!(decode("not base64!"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let data = encode(b"{\"messageType\": \"DATA_MESSAGE\", \"logEvents\": [");
        assert!(matches!(decode(&data), Err(DecodeError::Parse(_))));
    }

    #[test]
    fn test_decode_rejects_missing_message_type() {
        let data = encode(br#"{"logEvents":[]}"#);
        assert!(matches!(decode(&data), Err(DecodeError::Parse(_))));
    }
}
