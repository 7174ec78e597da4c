// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudwatchlogs::types::Distribution as SdkDistribution;

use crate::aws::sdk_error_message;
use crate::error::LogsServiceError;
use crate::subscriptions::{Distribution, LogsService, Page, SubscriptionFilterRequest};

#[derive(Debug, Clone)]
pub struct CloudWatchLogsService {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchLogsService {
    pub fn new(client: aws_sdk_cloudwatchlogs::Client) -> Self {
        CloudWatchLogsService { client }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self::new(aws_sdk_cloudwatchlogs::Client::new(sdk_config))
    }
}

impl From<Distribution> for SdkDistribution {
    fn from(distribution: Distribution) -> Self {
        match distribution {
            Distribution::ByLogStream => SdkDistribution::ByLogStream,
        }
    }
}

#[async_trait]
impl LogsService for CloudWatchLogsService {
    async fn list_log_groups(
        &self,
        prefix: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>, LogsServiceError> {
        let output = self
            .client
            .describe_log_groups()
            .log_group_name_prefix(prefix)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| LogsServiceError::new("DescribeLogGroups", sdk_error_message(&e)))?;

        Ok(Page {
            items: output
                .log_groups()
                .iter()
                .filter_map(|group| group.log_group_name().map(str::to_string))
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn list_subscription_destinations(
        &self,
        log_group: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>, LogsServiceError> {
        let output = self
            .client
            .describe_subscription_filters()
            .log_group_name(log_group)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                LogsServiceError::new("DescribeSubscriptionFilters", sdk_error_message(&e))
            })?;

        Ok(Page {
            items: output
                .subscription_filters()
                .iter()
                .filter_map(|filter| filter.destination_arn().map(str::to_string))
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn put_subscription_filter(
        &self,
        request: &SubscriptionFilterRequest,
    ) -> Result<(), LogsServiceError> {
        self.client
            .put_subscription_filter()
            .log_group_name(&request.log_group_name)
            .filter_name(&request.filter_name)
            .filter_pattern(&request.filter_pattern)
            .destination_arn(&request.destination_arn)
            .role_arn(&request.role_arn)
            .distribution(request.distribution.into())
            .send()
            .await
            .map_err(|e| LogsServiceError::new("PutSubscriptionFilter", sdk_error_message(&e)))?;
        Ok(())
    }
}
