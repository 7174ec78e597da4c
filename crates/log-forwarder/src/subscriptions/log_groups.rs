// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tracing::debug;

use crate::error::LogsServiceError;
use crate::subscriptions::LogsService;

/// Lists every log group whose name starts with a prefix, across pages.
#[derive(Clone)]
pub struct LogGroupEnumerator {
    logs: Arc<dyn LogsService>,
}

impl LogGroupEnumerator {
    #[must_use]
    pub fn new(logs: Arc<dyn LogsService>) -> Self {
        LogGroupEnumerator { logs }
    }

    pub async fn list(&self, prefix: &str) -> Result<Vec<String>, LogsServiceError> {
        let mut names = Vec::new();
        let mut next_token = None;
        let mut pages = 0;

        loop {
            let page = self.logs.list_log_groups(prefix, next_token.take()).await?;
            pages += 1;
            names.extend(page.items);
            match page.next_token.filter(|token| !token.is_empty()) {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!(
            "SUBSCRIBER | Found {} log groups with prefix {prefix} in {pages} pages",
            names.len()
        );
        Ok(names)
    }
}
