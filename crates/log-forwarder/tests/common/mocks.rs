// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory implementations of the forwarder's service traits

use log_forwarder::error::{LogsServiceError, ParameterError, SinkError};
use log_forwarder::pipeline::reingest::{PutRecordOutcome, RecordSink, ReingestionRecord};
use log_forwarder::subscriptions::{LogsService, Page, ParameterStore, SubscriptionFilterRequest};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Record sink that fails the positions listed for each call, by call index
#[allow(dead_code)]
#[derive(Default)]
pub struct MockRecordSink {
    pub failures_per_call: HashMap<usize, HashSet<usize>>,
    pub calls: Mutex<Vec<Vec<ReingestionRecord>>>,
}

#[allow(dead_code)]
impl MockRecordSink {
    pub fn failing(failures_per_call: HashMap<usize, HashSet<usize>>) -> Self {
        MockRecordSink {
            failures_per_call,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ReingestionRecord>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordSink for MockRecordSink {
    async fn put_batch(
        &self,
        records: &[ReingestionRecord],
    ) -> Result<Vec<PutRecordOutcome>, SinkError> {
        let mut calls = self.calls.lock().unwrap();
        let call_index = calls.len();
        calls.push(records.to_vec());

        let failed = self.failures_per_call.get(&call_index);
        Ok((0..records.len())
            .map(|position| match failed {
                Some(positions) if positions.contains(&position) => PutRecordOutcome::Failed {
                    code: "ServiceUnavailableException".to_string(),
                    message: "Slow down".to_string(),
                },
                _ => PutRecordOutcome::Accepted,
            })
            .collect())
    }
}

/// Log service backed by an in-memory map of log group to destinations.
///
/// Created subscriptions are stored, so a second run observes the first.
/// Listings are served `page_size` items at a time.
#[allow(dead_code)]
pub struct MockLogsService {
    pub log_groups: Vec<String>,
    pub subscriptions: Mutex<HashMap<String, Vec<String>>>,
    pub page_size: usize,
    pub fail_listing_for: Option<String>,
    pub puts: Mutex<Vec<SubscriptionFilterRequest>>,
}

#[allow(dead_code)]
impl MockLogsService {
    pub fn new(log_groups: &[&str]) -> Self {
        MockLogsService {
            log_groups: log_groups.iter().map(ToString::to_string).collect(),
            subscriptions: Mutex::new(HashMap::new()),
            page_size: 1,
            fail_listing_for: None,
            puts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_subscription(self, log_group: &str, destination_arn: &str) -> Self {
        self.subscriptions
            .lock()
            .unwrap()
            .entry(log_group.to_string())
            .or_default()
            .push(destination_arn.to_string());
        self
    }

    pub fn puts(&self) -> Vec<SubscriptionFilterRequest> {
        self.puts.lock().unwrap().clone()
    }

    fn page(&self, items: Vec<String>, next_token: Option<String>) -> Page<String> {
        let start: usize = next_token.map_or(0, |token| token.parse().unwrap());
        let end = (start + self.page_size).min(items.len());
        Page {
            items: items[start..end].to_vec(),
            next_token: (end < items.len()).then(|| end.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl LogsService for MockLogsService {
    async fn list_log_groups(
        &self,
        prefix: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>, LogsServiceError> {
        let matching = self
            .log_groups
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        Ok(self.page(matching, next_token))
    }

    async fn list_subscription_destinations(
        &self,
        log_group: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>, LogsServiceError> {
        if self.fail_listing_for.as_deref() == Some(log_group) {
            return Err(LogsServiceError::new(
                "DescribeSubscriptionFilters",
                "ThrottlingException: Rate exceeded",
            ));
        }
        let destinations = self
            .subscriptions
            .lock()
            .unwrap()
            .get(log_group)
            .cloned()
            .unwrap_or_default();
        Ok(self.page(destinations, next_token))
    }

    async fn put_subscription_filter(
        &self,
        request: &SubscriptionFilterRequest,
    ) -> Result<(), LogsServiceError> {
        self.puts.lock().unwrap().push(request.clone());
        self.subscriptions
            .lock()
            .unwrap()
            .entry(request.log_group_name.clone())
            .or_default()
            .push(request.destination_arn.clone());
        Ok(())
    }
}

#[allow(dead_code)]
#[derive(Default)]
pub struct MockParameterStore {
    pub values: HashMap<String, String>,
}

#[allow(dead_code)]
impl MockParameterStore {
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

#[async_trait::async_trait]
impl ParameterStore for MockParameterStore {
    async fn get(&self, name: &str) -> Result<String, ParameterError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| ParameterError::NotFound(name.to_string()))
    }
}
