// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! The contract between [`Queue::receive`] and the web framework that owns
//! the HTTP route the service calls back.
//!
//! [`Queue::receive`]: crate::queue::Queue::receive

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the queue the service delivered the job for
pub const HEADER_QUEUE: &str = "x-taskless-queue";

/// Project the job belongs to
pub const HEADER_PROJECT_ID: &str = "x-taskless-id";

/// A request header that may have been sent more than once.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum HeaderField {
    One(String),
    Many(Vec<String>),
}

impl HeaderField {
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderField::One(value) => Some(value),
            HeaderField::Many(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for HeaderField {
    fn from(value: &str) -> Self {
        HeaderField::One(value.to_string())
    }
}

impl From<String> for HeaderField {
    fn from(value: String) -> Self {
        HeaderField::One(value)
    }
}

impl From<Vec<String>> for HeaderField {
    fn from(values: Vec<String>) -> Self {
        HeaderField::Many(values)
    }
}

pub type InboundHeaders = HashMap<String, HeaderField>;

pub type ResponseHeaders = BTreeMap<String, String>;

/// First value of header `name`. An exact key wins, otherwise keys are
/// compared case-insensitively and the lowest one in byte order is taken.
pub fn first_header<'a>(headers: &'a InboundHeaders, name: &str) -> Option<&'a str> {
    let field = match headers.get(name) {
        Some(field) => field,
        None => headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, field)| field)?,
    };
    field.first()
}

/// Each hosting framework supplies one implementation per inbound request.
#[async_trait]
pub trait ReceiveCallbacks: Send {
    /// The parsed JSON request body, expected to be an envelope.
    async fn get_body(&mut self) -> anyhow::Result<Value>;

    async fn get_headers(&mut self) -> anyhow::Result<InboundHeaders>;

    /// Respond with a success status and `body`.
    async fn send(&mut self, body: Value) -> anyhow::Result<()>;

    /// Respond with `status` and the serialized error.
    async fn send_error(
        &mut self,
        status: u16,
        headers: ResponseHeaders,
        error: Value,
    ) -> anyhow::Result<()>;
}
