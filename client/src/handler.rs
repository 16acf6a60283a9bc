// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Job handlers and the errors they report back to the service.

use std::future::Future;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{job::JobMeta, receive::ResponseHeaders};

/// A failure with an explicit response status, e.g. `429` to ask the service
/// to back off. The status and headers are forwarded verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct JobError {
    pub status_code: u16,
    pub headers: ResponseHeaders,
    pub message: String,
}

impl JobError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: ResponseHeaders::new(),
            message: message.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),

    #[error("handler panicked: {0}")]
    Panic(String),
}

impl HandlerError {
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::Job(e) => e.status_code,
            _ => 500,
        }
    }

    pub fn headers(&self) -> ResponseHeaders {
        match self {
            HandlerError::Job(e) => e.headers.clone(),
            _ => ResponseHeaders::new(),
        }
    }

    /// The error as sent to the service.
    pub fn to_json(&self) -> Value {
        match self {
            HandlerError::Job(e) => json!({
                "name": "JobError",
                "message": e.message,
                "statusCode": e.status_code,
                "headers": e.headers,
            }),
            HandlerError::Other(e) => {
                let mut map = Map::new();
                map.insert("name".into(), json!("Error"));
                map.insert("message".into(), json!(e.to_string()));
                let causes: Vec<String> = e.chain().skip(1).map(|c| c.to_string()).collect();
                if !causes.is_empty() {
                    map.insert("cause".into(), json!(causes));
                }
                Value::Object(map)
            }
            HandlerError::Panic(message) => json!({
                "name": "Panic",
                "message": message,
            }),
        }
    }
}

/// What a handler returns. `None` is answered with `{}`.
pub type HandlerResult = Result<Option<Value>, HandlerError>;

#[async_trait]
pub trait JobHandler<T: Send + 'static>: Send + Sync {
    async fn handle(&self, payload: T, meta: JobMeta) -> HandlerResult;
}

#[async_trait]
impl<T, F, Fut> JobHandler<T> for F
where
    T: Send + 'static,
    F: Fn(T, JobMeta) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, payload: T, meta: JobMeta) -> HandlerResult {
        (self)(payload, meta).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn job_error_json() {
        let err = HandlerError::from(JobError::new(429, "slow down").with_header("retry-after", "30"));

        assert_eq!(err.status_code(), 429);
        assert_eq!(
            err.headers(),
            ResponseHeaders::from([("retry-after".to_string(), "30".to_string())])
        );
        assert_json_eq!(
            err.to_json(),
            json!({
                "name": "JobError",
                "message": "slow down",
                "statusCode": 429,
                "headers": {"retry-after": "30"},
            })
        );
    }

    #[test]
    fn generic_error_json() {
        let err = HandlerError::from(anyhow!("connection refused").context("send email"));

        assert_eq!(err.status_code(), 500);
        assert!(err.headers().is_empty());
        assert_json_eq!(
            err.to_json(),
            json!({
                "name": "Error",
                "message": "send email",
                "cause": ["connection refused"],
            })
        );
    }

    #[tokio::test]
    async fn closures_are_handlers() {
        let handler = |payload: u32, meta: JobMeta| async move {
            HandlerResult::Ok(Some(json!({"double": payload * 2, "verified": meta.verified})))
        };

        let result = handler
            .handle(
                21,
                JobMeta {
                    verified: true,
                    ..Default::default()
                },
            )
            .await
            .expect("handler");
        assert_eq!(result, Some(json!({"double": 42, "verified": true})));
    }
}
