// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::LogsServiceError;
use crate::subscriptions::LogsService;

/// Collects the destinations a log group is already subscribed to.
#[derive(Clone)]
pub struct SubscriptionInspector {
    logs: Arc<dyn LogsService>,
}

impl SubscriptionInspector {
    #[must_use]
    pub fn new(logs: Arc<dyn LogsService>) -> Self {
        SubscriptionInspector { logs }
    }

    pub async fn destinations(&self, log_group: &str) -> Result<HashSet<String>, LogsServiceError> {
        let mut destinations = HashSet::new();
        let mut next_token = None;

        loop {
            let page = self
                .logs
                .list_subscription_destinations(log_group, next_token.take())
                .await?;
            destinations.extend(page.items);
            match page.next_token.filter(|token| !token.is_empty()) {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(destinations)
    }
}
