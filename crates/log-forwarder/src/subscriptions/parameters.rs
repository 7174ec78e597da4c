// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use tracing::debug;

use crate::config::ParameterNames;
use crate::error::ParameterError;

#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fails with [`ParameterError::NotFound`] when `name` does not exist.
    async fn get(&self, name: &str) -> Result<String, ParameterError>;
}

/// Values the subscriber needs before touching any log group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberParameters {
    pub role_arn: String,
    pub execution_logs_destination: String,
    pub access_logs_destination: String,
}

impl SubscriberParameters {
    pub async fn resolve(
        store: &dyn ParameterStore,
        names: &ParameterNames,
    ) -> Result<Self, ParameterError> {
        let role_arn = store.get(&names.role_arn).await?;
        let execution_logs_destination = store.get(&names.execution_logs_destination).await?;
        let access_logs_destination = store.get(&names.access_logs_destination).await?;
        debug!(
            "SUBSCRIBER | Destinations: execution logs {execution_logs_destination}, access logs {access_logs_destination}"
        );

        Ok(SubscriberParameters {
            role_arn,
            execution_logs_destination,
            access_logs_destination,
        })
    }
}
