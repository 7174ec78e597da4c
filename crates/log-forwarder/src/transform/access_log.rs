// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use crate::pipeline::envelope::LogEvent;
use crate::transform::EventTransformer;

/// Access log lines are JSON documents where API Gateway writes `"-"` for
/// every unset variable.
const UNSET_VALUE: &str = r#""-""#;
const EMPTY_VALUE: &str = r#""""#;

/// Forwards API Gateway access log events, blanking unset values.
///
/// Events whose message is not valid JSON are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogTransformer;

impl AccessLogTransformer {
    fn sanitize(message: &str) -> Option<String> {
        if serde_json::from_str::<serde_json::Value>(message).is_err() {
            return None;
        }
        Some(message.replace(UNSET_VALUE, EMPTY_VALUE))
    }
}

#[async_trait]
impl EventTransformer for AccessLogTransformer {
    async fn transform(&self, event: &LogEvent) -> String {
        match Self::sanitize(&event.message) {
            Some(sanitized) => {
                debug!("PIPELINE | Adding matching event {sanitized}");
                format!("{sanitized}\n")
            }
            None => {
                debug!("PIPELINE | Access log event {} is not JSON, skipping", event.id);
                String::new()
            }
        }
    }
}
