// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde_json::Value;
use taskless::{
    AuthScheme, Connector, HeaderField, InboundHeaders, JobInput, JobRecord, ReceiveCallbacks,
    ResponseHeaders, Result, TransportAdapter,
};

#[derive(Default)]
pub struct ServiceState {
    pub jobs: BTreeMap<String, JobRecord>,

    /// Every enqueue request in arrival order
    pub requests: Vec<(String, JobInput)>,

    /// Endpoint and auth of every client that was created
    pub connections: Vec<(String, AuthScheme)>,
}

/// Stands in for the hosted service. Clones share their state.
#[derive(Clone, Default)]
pub struct MemoryService {
    state: Arc<Mutex<ServiceState>>,
}

impl MemoryService {
    pub fn state(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap()
    }
}

impl Connector for MemoryService {
    fn connect(&self, endpoint: &str, auth: &AuthScheme) -> Result<Box<dyn TransportAdapter>> {
        self.state()
            .connections
            .push((endpoint.to_string(), auth.clone()));
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl TransportAdapter for MemoryService {
    async fn enqueue_job(&self, name: &str, job: JobInput) -> Result<JobRecord> {
        let mut state = self.state();
        state.requests.push((name.to_string(), job.clone()));

        let previous_run_every = state.jobs.get(name).and_then(|j| j.run_every.clone());
        let record = JobRecord {
            name: name.to_string(),
            endpoint: job.endpoint,
            headers: job.headers,
            enabled: Some(job.enabled.unwrap_or(true)),
            body: Some(job.body),
            retries: Some(job.retries),
            run_at: job.run_at,
            run_every: match job.run_every {
                Some(run_every) => run_every,
                None => previous_run_every,
            },
        };
        state.jobs.insert(name.to_string(), record.clone());
        Ok(record)
    }

    async fn cancel_job(&self, name: &str) -> Result<Option<JobRecord>> {
        Ok(self.state().jobs.remove(name))
    }
}

/// Receive adapter that records what the queue responded.
pub struct RecordingCallbacks {
    body: Value,
    headers: InboundHeaders,
    pub sent: Vec<Value>,
    pub errors: Vec<(u16, ResponseHeaders, Value)>,
}

impl RecordingCallbacks {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            headers: InboundHeaders::new(),
            sent: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<HeaderField>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }
}

#[async_trait]
impl ReceiveCallbacks for RecordingCallbacks {
    async fn get_body(&mut self) -> anyhow::Result<Value> {
        Ok(self.body.clone())
    }

    async fn get_headers(&mut self) -> anyhow::Result<InboundHeaders> {
        Ok(self.headers.clone())
    }

    async fn send(&mut self, body: Value) -> anyhow::Result<()> {
        self.sent.push(body);
        Ok(())
    }

    async fn send_error(
        &mut self,
        status: u16,
        headers: ResponseHeaders,
        error: Value,
    ) -> anyhow::Result<()> {
        self.errors.push((status, headers, error));
        Ok(())
    }
}
