// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! [`TransportAdapter`] speaking the service's GraphQL API over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use super::{Connector, JobInput, JobRecord, TransportAdapter};
use crate::{credential::AuthScheme, Error, Result};

const REQUEST_TIMEOUT_SEC: u64 = 60;

pub const ENQUEUE_JOB_MUTATION: &str = r#"mutation enqueueJob($name: String!, $job: JobInputType!) {
  enqueueJob(name: $name, job: $job) {
    name
    endpoint
    headers { name value }
    enabled
    body
    retries
    runAt
    runEvery
  }
}"#;

pub const CANCEL_JOB_MUTATION: &str = r#"mutation cancelJob($name: String!) {
  cancelJob(name: $name) {
    name
    endpoint
    headers { name value }
    enabled
    body
    retries
    runAt
    runEvery
  }
}"#;

#[derive(Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize, Debug)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct GraphqlResponse<R> {
    data: Option<R>,

    #[serde(default)]
    errors: Vec<GraphqlError>,
}

impl<R> GraphqlResponse<R> {
    fn into_data(self) -> Result<R> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GraphqlErrors(messages.join("; ")));
        }

        self.data
            .ok_or_else(|| Error::Transport("response carries no data".into()))
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EnqueueJobData {
    enqueue_job: JobRecord,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CancelJobData {
    cancel_job: Option<JobRecord>,
}

/// Creates a [`GraphqlClient`] for every operation.
#[derive(Clone, Debug)]
pub struct GraphqlConnector {
    timeout: Duration,
}

impl Default for GraphqlConnector {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SEC),
        }
    }
}

impl GraphqlConnector {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for GraphqlConnector {
    fn connect(&self, endpoint: &str, auth: &AuthScheme) -> Result<Box<dyn TransportAdapter>> {
        Ok(Box::new(GraphqlClient::new(endpoint, auth, self.timeout)?))
    }
}

pub struct GraphqlClient {
    endpoint: String,
    http_client: reqwest::Client,
}

/// Default request headers: the credentials of `auth`.
fn auth_headers(auth: &AuthScheme) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in auth.headers() {
        let mut value = HeaderValue::from_str(&value)
            .map_err(|e| Error::Config(format!("credential for {name} is not a valid header: {e}")))?;
        if name == crate::credential::HEADER_SECRET {
            value.set_sensitive(true);
        }
        headers.insert(HeaderName::from_static(name), value);
    }

    Ok(headers)
}

impl GraphqlClient {
    pub fn new(endpoint: &str, auth: &AuthScheme, timeout: Duration) -> Result<Self> {
        let mut http_client_builder = reqwest::Client::builder()
            .user_agent(format!("taskless-client/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(auth_headers(auth)?)
            .timeout(timeout);

        #[cfg(all(feature = "rust-crypto", not(feature = "openssl")))]
        {
            http_client_builder = http_client_builder.use_rustls_tls();
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            http_client: http_client_builder
                .build()
                .map_err(|e| Error::Transport(format!("build http client: {e}")))?,
        })
    }

    async fn request<V: Serialize, R: DeserializeOwned>(&self, query: &str, variables: V) -> Result<R> {
        debug!("POST {}", self.endpoint);
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{e}")))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("read response: {e}")))?;

        match serde_json::from_slice::<GraphqlResponse<R>>(&body) {
            Ok(parsed) => parsed.into_data(),
            Err(_) if !status.is_success() => {
                Err(Error::Transport(format!("service responded with {status}")))
            }
            Err(e) => Err(Error::Transport(format!("unrecognized response: {e}"))),
        }
    }
}

#[async_trait]
impl TransportAdapter for GraphqlClient {
    async fn enqueue_job(&self, name: &str, job: JobInput) -> Result<JobRecord> {
        let data: EnqueueJobData = self
            .request(ENQUEUE_JOB_MUTATION, json!({ "name": name, "job": job }))
            .await?;
        Ok(data.enqueue_job)
    }

    async fn cancel_job(&self, name: &str) -> Result<Option<JobRecord>> {
        let data: CancelJobData = self
            .request(CANCEL_JOB_MUTATION, json!({ "name": name }))
            .await?;
        Ok(data.cancel_job)
    }
}
