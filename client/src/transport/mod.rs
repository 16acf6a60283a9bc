// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! The RPC channel between a queue and the service. A queue only needs the
//! two mutations below; [`graphql`] provides the production implementation.

pub mod graphql;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{credential::AuthScheme, headers::HeaderPair, Result};

pub use self::graphql::{GraphqlClient, GraphqlConnector};

/// Jobs are always delivered with a POST.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    #[serde(rename = "POST")]
    Post,
}

/// A job as submitted to the service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    pub endpoint: String,

    pub method: HttpMethod,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<HeaderPair>>,

    /// The serialized envelope
    pub body: String,

    pub retries: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,

    /// `Some(None)` is sent as `null` and clears the recurrence, `None` is
    /// left out of the request.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub run_every: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A job as stored by the service.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub name: String,

    pub endpoint: String,

    #[serde(default)]
    pub headers: Option<Vec<HeaderPair>>,

    #[serde(default)]
    pub enabled: Option<bool>,

    /// The serialized envelope
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub retries: Option<u32>,

    #[serde(default)]
    pub run_at: Option<String>,

    #[serde(default)]
    pub run_every: Option<String>,
}

#[async_trait]
pub trait TransportAdapter: Send + Sync {
    /// Create the job `name`, or replace it if it exists.
    async fn enqueue_job(&self, name: &str, job: JobInput) -> Result<JobRecord>;

    /// Stop future runs of `name`. `None` if there is no such job.
    async fn cancel_job(&self, name: &str) -> Result<Option<JobRecord>>;
}

/// Builds a [`TransportAdapter`] for one operation.
pub trait Connector: Send + Sync {
    fn connect(&self, endpoint: &str, auth: &AuthScheme) -> Result<Box<dyn TransportAdapter>>;
}
