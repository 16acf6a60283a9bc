// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::headers::JobHeaders;

pub const DEFAULT_SEPARATOR: &str = "/";

/// The name of a job. Composite identifiers are joined with the queue's
/// separator before they reach the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobIdentifier {
    Single(String),
    Composite(Vec<String>),
}

impl JobIdentifier {
    pub fn pack(&self, separator: &str) -> String {
        match self {
            JobIdentifier::Single(name) => name.clone(),
            JobIdentifier::Composite(parts) => parts.join(separator),
        }
    }
}

impl From<&str> for JobIdentifier {
    fn from(name: &str) -> Self {
        JobIdentifier::Single(name.to_string())
    }
}

impl From<String> for JobIdentifier {
    fn from(name: String) -> Self {
        JobIdentifier::Single(name)
    }
}

impl<S: Into<String>> From<Vec<S>> for JobIdentifier {
    fn from(parts: Vec<S>) -> Self {
        JobIdentifier::Composite(parts.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for JobIdentifier {
    fn from(parts: [S; N]) -> Self {
        JobIdentifier::Composite(parts.into_iter().map(Into::into).collect())
    }
}

/// When the job should run first.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RunAt {
    /// The moment the job is enqueued
    Now,
    At(DateTime<Utc>),
    /// An ISO-8601 timestamp passed through untouched
    Iso(String),
    /// Leave `runAt` out of the request and let the service decide
    Omit,
}

impl From<String> for RunAt {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("now") {
            RunAt::Now
        } else {
            RunAt::Iso(value)
        }
    }
}

impl From<DateTime<Utc>> for RunAt {
    fn from(at: DateTime<Utc>) -> Self {
        RunAt::At(at)
    }
}

impl RunAt {
    pub fn to_iso(&self) -> Option<String> {
        match self {
            RunAt::Now => Some(iso(&Utc::now())),
            RunAt::At(at) => Some(iso(at)),
            RunAt::Iso(s) => Some(s.clone()),
            RunAt::Omit => None,
        }
    }
}

fn iso(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Recurrence of a job, as an ISO-8601 duration such as `PT1H`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunEvery {
    Every(String),
    /// Remove the recurrence of an existing job
    Clear,
}

impl RunEvery {
    pub fn as_duration(&self) -> Option<&str> {
        match self {
            RunEvery::Every(d) => Some(d),
            RunEvery::Clear => None,
        }
    }
}

// `null` clears the recurrence, a missing field leaves it unset.
fn deserialize_run_every<'de, D>(deserializer: D) -> std::result::Result<Option<RunEvery>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match Option::<String>::deserialize(deserializer)? {
        Some(duration) => RunEvery::Every(duration),
        None => RunEvery::Clear,
    }))
}

/// Per job settings. Every field is optional so options can be layered:
/// call site options override the queue defaults, which override
/// [`JobOptions::baseline`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct JobOptions {
    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub headers: Option<JobHeaders>,

    #[serde(default)]
    pub retries: Option<u32>,

    #[serde(default)]
    pub run_at: Option<RunAt>,

    #[serde(default, deserialize_with = "deserialize_run_every")]
    pub run_every: Option<RunEvery>,
}

impl JobOptions {
    /// Job invocations carry JSON unless told otherwise.
    pub fn baseline() -> Self {
        Self {
            headers: Some(JobHeaders::from([(
                "content-type".to_string(),
                Value::String("application/json".to_string()),
            )])),
            ..Default::default()
        }
    }

    /// Layer `other` on top of `self`. Set fields of `other` win; header maps
    /// are merged name by name.
    pub fn merge(mut self, other: &JobOptions) -> Self {
        if let Some(headers) = &other.headers {
            let merged = self.headers.get_or_insert_with(JobHeaders::new);
            merged.extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.retries.is_some() {
            self.retries = other.retries;
        }
        if other.run_at.is_some() {
            self.run_at = other.run_at.clone();
        }
        if other.run_every.is_some() {
            self.run_every = other.run_every.clone();
        }
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers
            .get_or_insert_with(JobHeaders::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn run_at(mut self, run_at: impl Into<RunAt>) -> Self {
        self.run_at = Some(run_at.into());
        self
    }

    pub fn run_every(mut self, duration: impl Into<String>) -> Self {
        self.run_every = Some(RunEvery::Every(duration.into()));
        self
    }

    pub fn clear_run_every(mut self) -> Self {
        self.run_every = Some(RunEvery::Clear);
        self
    }
}

/// A job as known to the service.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job<T> {
    pub name: String,
    pub endpoint: String,
    pub headers: Option<JobHeaders>,
    pub enabled: bool,
    pub payload: T,
    pub retries: u32,
    pub run_at: Option<DateTime<Utc>>,
    pub run_every: Option<String>,
}

/// Routing metadata passed to a handler with every invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobMeta {
    /// Value of the `x-taskless-queue` header
    pub queue: Option<String>,

    /// Value of the `x-taskless-id` header
    pub project_id: Option<String>,

    /// Whether the envelope signature matched an accepted secret
    pub verified: bool,
}
