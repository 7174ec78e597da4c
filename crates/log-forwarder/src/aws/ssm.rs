// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ssm::error::SdkError;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;

use crate::aws::sdk_error_message;
use crate::error::ParameterError;
use crate::subscriptions::ParameterStore;

/// Reads plain parameters from SSM Parameter Store.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        SsmParameterStore { client }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self::new(aws_sdk_ssm::Client::new(sdk_config))
    }
}

fn parameter_error<R: std::fmt::Debug>(
    name: &str,
    err: &SdkError<GetParameterError, R>,
) -> ParameterError {
    match err {
        SdkError::ServiceError(service_err) if service_err.err().is_parameter_not_found() => {
            ParameterError::NotFound(name.to_string())
        }
        other => ParameterError::Service {
            name: name.to_string(),
            message: sdk_error_message(other),
        },
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get(&self, name: &str) -> Result<String, ParameterError> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| parameter_error(name, &e))?;

        output
            .parameter()
            .and_then(|parameter| parameter.value())
            .map(str::to_string)
            .ok_or_else(|| ParameterError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ssm::types::error::{InternalServerError, ParameterNotFound};

    #[test]
    fn test_not_found_is_classified() {
        let err: SdkError<GetParameterError, ()> = SdkError::service_error(
            GetParameterError::ParameterNotFound(ParameterNotFound::builder().build()),
            (),
        );
        assert!(matches!(
            parameter_error("/product/analytics/cloudwatch-kinesis-role-arn", &err),
            ParameterError::NotFound(name) if name == "/product/analytics/cloudwatch-kinesis-role-arn"
        ));
    }

    #[test]
    fn test_other_errors_are_service_errors() {
        let err: SdkError<GetParameterError, ()> = SdkError::service_error(
            GetParameterError::InternalServerError(InternalServerError::builder().build()),
            (),
        );
        assert!(matches!(
            parameter_error("name", &err),
            ParameterError::Service { .. }
        ));
    }
}
