// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::pipeline::envelope::LogEvent;
use crate::transform::EventTransformer;

lazy_static! {
    static ref REQUEST_ID_REGEX: Regex =
        Regex::new(r"[0-9a-fA-F]{8}-([0-9a-fA-F]{4}-){3}[0-9a-fA-F]{12}")
            .expect("failed creating regex");
    static ref QUERY_STRING_REGEX: Regex =
        Regex::new(r"Method request query string:\s(\{.*?\})").expect("failed creating regex");
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryStringEvent<'a> {
    query_string: Map<String, Value>,
    timestamp: i64,
    request_id: &'a str,
}

/// Extracts request query strings from API Gateway execution logs.
///
/// Only `Method request query string: {…}` lines are kept; they become
/// `{"queryString":{…},"timestamp":…,"requestId":"…"}` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionLogTransformer;

impl ExecutionLogTransformer {
    fn extract(event: &LogEvent) -> Option<String> {
        let captures = QUERY_STRING_REGEX.captures(&event.message)?;
        let query_string = parse_query_string(captures.get(1)?.as_str());

        let Some(request_id) = REQUEST_ID_REGEX.find(&event.message) else {
            debug!(
                "PIPELINE | Query string event {} has no request id, skipping",
                event.id
            );
            return None;
        };

        let extracted = QueryStringEvent {
            query_string,
            timestamp: event.timestamp,
            request_id: request_id.as_str(),
        };
        serde_json::to_string(&extracted).ok()
    }
}

/// Parses API Gateway's `{key=value, other=value}` rendering of a query
/// string. Keys keep their order. Values that read as JSON scalars keep their
/// type, quoted values lose their quotes, anything else is kept as a string.
/// Pairs without `=` are skipped.
fn parse_query_string(raw: &str) -> Map<String, Value> {
    let inner = raw.trim().trim_start_matches('{').trim_end_matches('}');
    inner
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .filter_map(|(key, value)| {
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), parse_scalar(value.trim())))
        })
        .collect()
}

fn parse_scalar(value: &str) -> Value {
    match serde_json::from_str::<Value>(value) {
        Ok(scalar @ (Value::Number(_) | Value::Bool(_) | Value::Null | Value::String(_))) => {
            scalar
        }
        _ => Value::String(value.to_string()),
    }
}

#[async_trait]
impl EventTransformer for ExecutionLogTransformer {
    async fn transform(&self, event: &LogEvent) -> String {
        match Self::extract(event) {
            Some(extracted) => {
                debug!("PIPELINE | Adding event to batch {extracted}");
                format!("{extracted}\n")
            }
            None => String::new(),
        }
    }
}
