// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Log Forwarder
//!
//! Processes CloudWatch Logs subscription deliveries and keeps log groups
//! subscribed to their analytics destinations.
//!
//! ## Overview
//!
//! Two independent flows live in this crate:
//! - **Pipeline** ([`pipeline`]): decodes gzip-compressed envelopes, runs an
//!   injected [`transform::EventTransformer`] over every log event, fits the
//!   response under the sink's payload ceiling and reingests whatever does not
//!   fit back into the origin stream.
//! - **Subscriptions** ([`subscriptions`]): finds log groups matching known
//!   prefixes that are not yet routed to their destination and creates the
//!   missing subscription filters.
//!
//! Every external service is a trait so callers inject the AWS adapters from
//! [`aws`] in production and substitutes in tests.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aws;
pub mod config;
pub mod constants;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod subscriptions;
pub mod transform;
