// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};

use crate::constants;
use crate::error::ReconcileError;
use crate::subscriptions::{
    Distribution, LogGroupEnumerator, LogsService, SubscriptionFilterRequest,
    SubscriptionInspector,
};

/// Log groups starting with `log_group_prefix` belong to `destination_arn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRoute {
    pub log_group_prefix: String,
    pub destination_arn: String,
}

impl SubscriptionRoute {
    pub fn new(log_group_prefix: impl Into<String>, destination_arn: impl Into<String>) -> Self {
        SubscriptionRoute {
            log_group_prefix: log_group_prefix.into(),
            destination_arn: destination_arn.into(),
        }
    }
}

/// A log group missing its route's destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionTarget {
    pub log_group_name: String,
    pub destination_arn: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    pub failed: usize,
}

pub struct Reconciler {
    logs: Arc<dyn LogsService>,
    enumerator: LogGroupEnumerator,
    inspector: SubscriptionInspector,
    role_arn: String,
    filter_name: String,
    inspect_concurrency: usize,
}

impl Reconciler {
    #[must_use]
    pub fn new(logs: Arc<dyn LogsService>, role_arn: impl Into<String>) -> Self {
        Reconciler {
            enumerator: LogGroupEnumerator::new(logs.clone()),
            inspector: SubscriptionInspector::new(logs.clone()),
            logs,
            role_arn: role_arn.into(),
            filter_name: constants::SUBSCRIPTION_FILTER_NAME.to_string(),
            inspect_concurrency: constants::DEFAULT_INSPECT_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_filter_name(mut self, filter_name: impl Into<String>) -> Self {
        self.filter_name = filter_name.into();
        self
    }

    #[must_use]
    pub fn with_inspect_concurrency(mut self, inspect_concurrency: usize) -> Self {
        self.inspect_concurrency = inspect_concurrency.max(1);
        self
    }

    /// Lists, for every route, the matching log groups not yet subscribed to
    /// the route's destination. Each target appears once, in listing order.
    /// Any listing failure aborts the whole computation.
    pub async fn determine_subscriptions(
        &self,
        routes: &[SubscriptionRoute],
    ) -> Result<Vec<SubscriptionTarget>, ReconcileError> {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();

        for route in routes {
            let log_groups = self
                .enumerator
                .list(&route.log_group_prefix)
                .await
                .map_err(|source| ReconcileError::ListLogGroups {
                    prefix: route.log_group_prefix.clone(),
                    source,
                })?;

            let inspected: Vec<_> = stream::iter(log_groups)
                .map(|log_group| async move {
                    let destinations = self.inspector.destinations(&log_group).await;
                    (log_group, destinations)
                })
                .buffered(self.inspect_concurrency)
                .collect()
                .await;

            for (log_group, destinations) in inspected {
                let destinations = destinations.map_err(|source| {
                    ReconcileError::ListSubscriptionFilters {
                        log_group: log_group.clone(),
                        source,
                    }
                })?;
                if destinations.contains(&route.destination_arn) {
                    debug!("SUBSCRIBER | {log_group} is already subscribed");
                    continue;
                }
                let target = SubscriptionTarget {
                    log_group_name: log_group,
                    destination_arn: route.destination_arn.clone(),
                };
                if seen.insert(target.clone()) {
                    targets.push(target);
                }
            }
        }

        Ok(targets)
    }

    /// Creates the subscription filter of every target, one after the other.
    /// A failed creation is logged and left for the next run.
    pub async fn apply(&self, targets: &[SubscriptionTarget]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for target in targets {
            let request = SubscriptionFilterRequest {
                log_group_name: target.log_group_name.clone(),
                filter_name: self.filter_name.clone(),
                filter_pattern: constants::SUBSCRIPTION_FILTER_PATTERN.to_string(),
                destination_arn: target.destination_arn.clone(),
                role_arn: self.role_arn.clone(),
                distribution: Distribution::ByLogStream,
            };
            match self.logs.put_subscription_filter(&request).await {
                Ok(()) => {
                    info!(
                        "SUBSCRIBER | Subscribed {} to {}",
                        target.log_group_name, target.destination_arn
                    );
                    summary.created += 1;
                }
                Err(e) => {
                    error!(
                        "SUBSCRIBER | Failed to subscribe {} to {}: {e}",
                        target.log_group_name, target.destination_arn
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    pub async fn reconcile(
        &self,
        routes: &[SubscriptionRoute],
    ) -> Result<ReconcileSummary, ReconcileError> {
        let targets = self.determine_subscriptions(routes).await?;
        if targets.is_empty() {
            info!("SUBSCRIBER | All log groups are already subscribed");
            return Ok(ReconcileSummary::default());
        }
        info!("SUBSCRIBER | {} log groups need a subscription", targets.len());
        Ok(self.apply(&targets).await)
    }
}
