// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::str::FromStr;

use crate::constants;
use crate::error::ConfigError;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Which of the forwarder's functions an invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwarderFunction {
    AccessLogsTransformer,
    ExecutionLogsTransformer,
    Subscriber,
}

impl FromStr for ForwarderFunction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "access-logs-transformer" => Ok(Self::AccessLogsTransformer),
            "execution-logs-transformer" => Ok(Self::ExecutionLogsTransformer),
            "subscriber" => Ok(Self::Subscriber),
            other => Err(ConfigError::Invalid(format!(
                "Unknown function '{other}'. Must be one of: access-logs-transformer, execution-logs-transformer, subscriber"
            ))),
        }
    }
}

/// Names of the parameter store entries the subscriber resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterNames {
    pub role_arn: String,
    pub execution_logs_destination: String,
    pub access_logs_destination: String,
}

impl Default for ParameterNames {
    fn default() -> Self {
        Self {
            role_arn: constants::ROLE_ARN_PARAMETER.to_string(),
            execution_logs_destination: constants::EXECUTION_LOGS_DESTINATION_PARAMETER
                .to_string(),
            access_logs_destination: constants::ACCESS_LOGS_DESTINATION_PARAMETER.to_string(),
        }
    }
}

/// Configuration shared by the transformers and the subscriber
#[derive(Debug, Clone)]
pub struct Config {
    /// Function selected for this process, if any
    pub function: Option<ForwarderFunction>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Region of the parameter store and log service clients
    pub region: String,
    pub parameter_names: ParameterNames,
    pub execution_log_group_prefix: String,
    pub access_log_group_prefix: String,
    pub subscription_filter_name: String,
    /// Put calls allowed per reingestion batch
    pub reingest_max_attempts: u32,
    /// Sealed reingestion batches in flight at once
    pub reingest_concurrency: usize,
    /// Log groups inspected concurrently during reconciliation
    pub inspect_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            function: None,
            log_level: "info".to_string(),
            region: constants::DEFAULT_REGION.to_string(),
            parameter_names: ParameterNames::default(),
            execution_log_group_prefix: constants::EXECUTION_LOG_GROUP_PREFIX.to_string(),
            access_log_group_prefix: constants::ACCESS_LOG_GROUP_PREFIX.to_string(),
            subscription_filter_name: constants::SUBSCRIPTION_FILTER_NAME.to_string(),
            reingest_max_attempts: constants::MAX_REINGESTION_ATTEMPTS,
            reingest_concurrency: constants::DEFAULT_REINGESTION_CONCURRENCY,
            inspect_concurrency: constants::DEFAULT_INSPECT_CONCURRENCY,
        }
    }
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let function = env::var("LOG_FORWARDER_FUNCTION")
            .ok()
            .map(|val| val.parse::<ForwarderFunction>())
            .transpose()?;
        let log_level = env::var("LOG_FORWARDER_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or(defaults.log_level);
        let region = env::var("AWS_REGION").unwrap_or(defaults.region);

        let parameter_names = ParameterNames {
            role_arn: env::var("LOG_FORWARDER_ROLE_ARN_PARAM")
                .unwrap_or(defaults.parameter_names.role_arn),
            execution_logs_destination: env::var("LOG_FORWARDER_EXECUTION_LOGS_DESTINATION_PARAM")
                .unwrap_or(defaults.parameter_names.execution_logs_destination),
            access_logs_destination: env::var("LOG_FORWARDER_ACCESS_LOGS_DESTINATION_PARAM")
                .unwrap_or(defaults.parameter_names.access_logs_destination),
        };

        let config = Self {
            function,
            log_level,
            region,
            parameter_names,
            execution_log_group_prefix: env::var("LOG_FORWARDER_EXECUTION_LOG_GROUP_PREFIX")
                .unwrap_or(defaults.execution_log_group_prefix),
            access_log_group_prefix: env::var("LOG_FORWARDER_ACCESS_LOG_GROUP_PREFIX")
                .unwrap_or(defaults.access_log_group_prefix),
            subscription_filter_name: env::var("LOG_FORWARDER_SUBSCRIPTION_FILTER_NAME")
                .unwrap_or(defaults.subscription_filter_name),
            reingest_max_attempts: parse_env(
                "LOG_FORWARDER_REINGEST_MAX_ATTEMPTS",
                defaults.reingest_max_attempts,
            )?,
            reingest_concurrency: parse_env(
                "LOG_FORWARDER_REINGEST_CONCURRENCY",
                defaults.reingest_concurrency,
            )?,
            inspect_concurrency: parse_env(
                "LOG_FORWARDER_INSPECT_CONCURRENCY",
                defaults.inspect_concurrency,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        if self.region.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "AWS_REGION cannot be empty".to_string(),
            ));
        }

        if self.execution_log_group_prefix.is_empty() || self.access_log_group_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "Log group prefixes cannot be empty".to_string(),
            ));
        }

        if self.subscription_filter_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Subscription filter name cannot be empty".to_string(),
            ));
        }

        if self.reingest_max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "Reingest max attempts must be at least 1".to_string(),
            ));
        }

        if self.reingest_concurrency == 0 || self.inspect_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "Concurrency limits must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid(format!("{name} must be a number, got '{val}'"))),
        Err(_) => Ok(default),
    }
}
