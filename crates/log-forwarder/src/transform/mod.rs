// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-event transformations applied by the pipeline.
//!
//! A transformer turns one log event into a text fragment; fragments of a
//! record are concatenated without delimiters, so a transformer that emits
//! something appends its own newline. An empty fragment drops the event.

pub mod access_log;
pub mod execution_log;

use async_trait::async_trait;

use crate::pipeline::envelope::LogEvent;

pub use access_log::AccessLogTransformer;
pub use execution_log::ExecutionLogTransformer;

#[async_trait]
pub trait EventTransformer: Send + Sync {
    /// Produces the fragment for one event. Must be a pure function of the
    /// event: redelivered records are transformed again.
    async fn transform(&self, event: &LogEvent) -> String;
}

#[async_trait]
impl<F> EventTransformer for F
where
    F: Fn(&LogEvent) -> String + Send + Sync,
{
    async fn transform(&self, event: &LogEvent) -> String {
        self(event)
    }
}
