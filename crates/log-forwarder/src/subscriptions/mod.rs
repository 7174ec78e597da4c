// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Keeps log groups routed to their analytics destinations.
//!
//! A run lists the log groups matching each route's prefix, skips those
//! already subscribed to the route's destination and creates the missing
//! subscription filters one at a time. Runs are idempotent: a second run
//! with no state change creates nothing.

pub mod filters;
pub mod log_groups;
pub mod parameters;
pub mod reconciler;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;
use crate::error::{LogsServiceError, ReconcileError};

pub use filters::SubscriptionInspector;
pub use log_groups::LogGroupEnumerator;
pub use parameters::{ParameterStore, SubscriberParameters};
pub use reconciler::{ReconcileSummary, Reconciler, SubscriptionRoute, SubscriptionTarget};

/// One page of a paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` on the last page.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Page {
            items,
            next_token: None,
        }
    }
}

/// How the log service spreads events over a destination's shards. Filters
/// are always created grouped by log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    ByLogStream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionFilterRequest {
    pub log_group_name: String,
    pub filter_name: String,
    pub filter_pattern: String,
    pub destination_arn: String,
    pub role_arn: String,
    pub distribution: Distribution,
}

#[async_trait]
pub trait LogsService: Send + Sync {
    /// Lists log group names starting with `prefix`.
    async fn list_log_groups(
        &self,
        prefix: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>, LogsServiceError>;

    /// Lists the destination ARNs of the subscription filters on `log_group`.
    async fn list_subscription_destinations(
        &self,
        log_group: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>, LogsServiceError>;

    async fn put_subscription_filter(
        &self,
        request: &SubscriptionFilterRequest,
    ) -> Result<(), LogsServiceError>;
}

/// Resolves the destinations from `store` and reconciles both routes:
/// execution log groups and access log groups.
pub async fn run_subscriber(
    config: &Config,
    store: &dyn ParameterStore,
    logs: Arc<dyn LogsService>,
) -> Result<ReconcileSummary, ReconcileError> {
    let parameters = SubscriberParameters::resolve(store, &config.parameter_names).await?;
    let routes = [
        SubscriptionRoute::new(
            config.execution_log_group_prefix.as_str(),
            parameters.execution_logs_destination.as_str(),
        ),
        SubscriptionRoute::new(
            config.access_log_group_prefix.as_str(),
            parameters.access_logs_destination.as_str(),
        ),
    ];

    let reconciler = Reconciler::new(logs, parameters.role_arn)
        .with_filter_name(config.subscription_filter_name.as_str())
        .with_inspect_concurrency(config.inspect_concurrency);
    let summary = reconciler.reconcile(&routes).await?;

    info!(
        "SUBSCRIBER | Run complete: {} subscriptions created, {} failed",
        summary.created, summary.failed
    );
    Ok(summary)
}
