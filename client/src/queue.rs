// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Queue
//!
//! A [`Queue`] is configured once and can then be shared across tasks. Each
//! `enqueue` and `cancel` resolves credentials and the endpoint afresh and
//! talks to the service through a new [`TransportAdapter`]. `receive` runs
//! the configured handler for one inbound callback.

use std::{any::Any, fmt, panic::AssertUnwindSafe, sync::Arc};

use chrono::{DateTime, Utc};
use futures::FutureExt;
use log::{debug, error, info, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::{
    config::QueueOptions,
    credential::{resolve_endpoint, AuthScheme},
    envelope::{Envelope, Opened},
    handler::{HandlerError, JobHandler},
    headers::{headers_to_pairs, pairs_to_headers, JobHeaders},
    job::{Job, JobIdentifier, JobMeta, JobOptions, RunAt, DEFAULT_SEPARATOR},
    keyring::KeyRing,
    receive::{first_header, ReceiveCallbacks, ResponseHeaders, HEADER_PROJECT_ID, HEADER_QUEUE},
    transport::{Connector, GraphqlConnector, HttpMethod, JobInput, JobRecord, TransportAdapter},
    Error, Result,
};

const NO_HANDLER_MESSAGE: &str = "This Queue was not configured with a handler";

/// Where the service delivers jobs, either fixed or computed on every
/// enqueue.
#[derive(Clone)]
pub enum Route {
    Static(String),
    Resolver(Arc<dyn Fn() -> String + Send + Sync>),
}

impl Route {
    pub fn resolver(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Route::Resolver(Arc::new(f))
    }

    pub fn get(&self) -> String {
        match self {
            Route::Static(route) => route.clone(),
            Route::Resolver(f) => f(),
        }
    }
}

impl From<&str> for Route {
    fn from(route: &str) -> Self {
        Route::Static(route.to_string())
    }
}

impl From<String> for Route {
    fn from(route: String) -> Self {
        Route::Static(route)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Static(route) => f.debug_tuple("Static").field(route).finish(),
            Route::Resolver(_) => f.write_str("Resolver"),
        }
    }
}

pub struct QueueBuilder<T: Send + 'static, C = GraphqlConnector> {
    name: String,
    route: Route,
    handler: Option<Box<dyn JobHandler<T>>>,
    options: Option<QueueOptions>,
    connector: C,
}

impl<T: Send + 'static, C: Connector> QueueBuilder<T, C> {
    pub fn handler(mut self, handler: impl JobHandler<T> + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Defaults to [`QueueOptions::from_env`].
    pub fn options(mut self, options: QueueOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn connector<C2: Connector>(self, connector: C2) -> QueueBuilder<T, C2> {
        QueueBuilder {
            name: self.name,
            route: self.route,
            handler: self.handler,
            options: self.options,
            connector,
        }
    }

    pub fn build(self) -> Queue<T, C> {
        let options = self.options.unwrap_or_else(QueueOptions::from_env);
        debug!("Queue {} options: {options:?}", self.name);

        Queue {
            secrets: options.signing_secrets(),
            keys: options.encryption_keys(),
            name: self.name,
            route: self.route,
            handler: self.handler,
            options,
            connector: self.connector,
        }
    }
}

pub struct Queue<T: Send + 'static, C = GraphqlConnector> {
    name: String,
    route: Route,
    handler: Option<Box<dyn JobHandler<T>>>,
    options: QueueOptions,
    secrets: KeyRing,
    keys: KeyRing,
    connector: C,
}

impl<T: Send + 'static> Queue<T> {
    pub fn builder(name: impl Into<String>, route: impl Into<Route>) -> QueueBuilder<T> {
        QueueBuilder {
            name: name.into(),
            route: route.into(),
            handler: None,
            options: None,
            connector: GraphqlConnector::default(),
        }
    }
}

impl<T, C> Queue<T, C>
where
    T: Serialize + DeserializeOwned + Send + 'static,
    C: Connector,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &QueueOptions {
        &self.options
    }

    pub fn pack_name(&self, name: &JobIdentifier) -> String {
        name.pack(self.options.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR))
    }

    /// Fully qualified URL the service should call. Routes that already are
    /// `http://` or `https://` URLs are used as they are, anything else is
    /// appended to the base URL with exactly one `/` in between.
    pub fn resolve_route(&self) -> String {
        let route = self.route.get();
        if route.starts_with("http://") || route.starts_with("https://") {
            return route;
        }

        let base_url = self.options.base_url.as_deref().unwrap_or_default();
        let resolved = if route.starts_with('/') {
            format!("{base_url}{route}")
        } else {
            format!("{base_url}/{route}")
        };
        debug!("Resolved route {route} to {resolved}");
        resolved
    }

    pub fn wrap_payload(&self, payload: &T) -> Result<Envelope> {
        Envelope::seal(payload, &self.secrets, &self.keys)
    }

    /// Open `envelope` and apply the signature policy. An unverified payload
    /// is an error in production unless unverified signatures are allowed;
    /// in development it is logged and accepted.
    pub fn unwrap_payload(&self, envelope: &Envelope) -> Result<Opened<T>> {
        let opened: Opened<T> = envelope.open(&self.secrets, &self.keys)?;
        if opened.verified {
            return Ok(opened);
        }

        if self.options.allow_unverified_signatures {
            warn!(
                "Queue {}: accepting a payload without a valid signature, unverified signatures are allowed",
                self.name
            );
        } else if self.options.runtime.is_development() {
            error!(
                "Queue {}: signature mismatch or no signature available. This happens when a job is enqueued with one secret and received with another. In production this is an error.",
                self.name
            );
        } else {
            return Err(Error::SignatureMismatch);
        }

        Ok(opened)
    }

    fn client(&self) -> Result<Box<dyn TransportAdapter>> {
        let auth = AuthScheme::resolve(
            self.options.credentials.as_ref(),
            &self.name,
            self.options.runtime.mode,
        )?;
        let endpoint = resolve_endpoint(&self.options.runtime);
        self.connector.connect(&endpoint, &auth)
    }

    /// Create the job `name`, or replace the job of that name. `options`
    /// override the queue's default job options.
    pub async fn enqueue(
        &self,
        name: impl Into<JobIdentifier>,
        payload: &T,
        options: Option<JobOptions>,
    ) -> Result<Job<T>> {
        let mut opts = JobOptions::baseline().merge(&self.options.default_job_options);
        if let Some(options) = &options {
            opts = opts.merge(options);
        }

        let client = self.client()?;
        let envelope = self.wrap_payload(payload)?;
        let body = serde_json::to_string(&envelope).map_err(|e| Error::Encode(e.to_string()))?;
        let name = self.pack_name(&name.into());

        let input = JobInput {
            endpoint: self.resolve_route(),
            method: HttpMethod::Post,
            headers: headers_to_pairs(opts.headers.as_ref()),
            body,
            retries: opts.retries.unwrap_or(0),
            run_at: opts.run_at.clone().unwrap_or(RunAt::Now).to_iso(),
            run_every: opts
                .run_every
                .as_ref()
                .map(|every| every.as_duration().map(String::from)),
            enabled: opts.enabled,
        };

        let record = client.enqueue_job(&name, input).await?;
        info!("Queue {}: enqueued job {}", self.name, record.name);
        self.job_from_record(record, opts.headers)
    }

    /// Stop future runs of `name`. Runs already in progress complete. Returns
    /// `None` if the service knows no such job.
    pub async fn cancel(&self, name: impl Into<JobIdentifier>) -> Result<Option<Job<T>>> {
        let client = self.client()?;
        let name = self.pack_name(&name.into());

        let Some(record) = client.cancel_job(&name).await? else {
            debug!("Queue {}: no job {name} to cancel", self.name);
            return Ok(None);
        };

        info!("Queue {}: cancelled job {}", self.name, record.name);
        let headers = record
            .headers
            .as_deref()
            .map(|pairs| pairs_to_headers(Some(pairs)));
        self.job_from_record(record, headers).map(Some)
    }

    fn job_from_record(&self, record: JobRecord, headers: Option<JobHeaders>) -> Result<Job<T>> {
        let body = record
            .body
            .as_deref()
            .ok_or_else(|| Error::InvalidRecord(format!("job {} has no body", record.name)))?;
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| Error::MalformedBody(e.to_string()))?;
        let Opened { payload, .. } = self.unwrap_payload(&envelope)?;

        let run_at = record
            .run_at
            .as_deref()
            .map(|at| {
                DateTime::parse_from_rfc3339(at)
                    .map(|at| at.with_timezone(&Utc))
                    .map_err(|e| Error::InvalidRecord(format!("runAt {at}: {e}")))
            })
            .transpose()?;

        Ok(Job {
            name: record.name,
            endpoint: record.endpoint,
            headers,
            enabled: record.enabled != Some(false),
            payload,
            retries: record.retries.unwrap_or(0),
            run_at,
            run_every: record.run_every,
        })
    }

    /// Handle one callback from the service.
    ///
    /// An envelope that cannot be opened (or fails the signature policy) is
    /// answered through [`ReceiveCallbacks::send_error`] and returned as an
    /// error, the handler is not invoked. Failures of the handler itself,
    /// panics included, are answered through `send_error` as well but do not
    /// make `receive` fail. An `Err` is also returned when the callbacks
    /// themselves fail.
    pub async fn receive<R>(&self, callbacks: &mut R) -> Result<()>
    where
        R: ReceiveCallbacks + ?Sized,
    {
        let Some(handler) = &self.handler else {
            warn!("Queue {} received a job but has no handler", self.name);
            return callbacks
                .send_error(500, ResponseHeaders::new(), json!(NO_HANDLER_MESSAGE))
                .await
                .map_err(respond_error);
        };

        let body = callbacks.get_body().await.map_err(respond_error)?;
        let opened = match Envelope::from_value(body).and_then(|e| self.unwrap_payload(&e)) {
            Ok(opened) => opened,
            Err(e) => {
                error!("Queue {}: rejecting job: {e}", self.name);
                callbacks
                    .send_error(e.status_code(), ResponseHeaders::new(), e.to_json())
                    .await
                    .map_err(respond_error)?;
                return Err(e);
            }
        };

        let headers = callbacks.get_headers().await.map_err(respond_error)?;
        let meta = JobMeta {
            queue: first_header(&headers, HEADER_QUEUE).map(String::from),
            project_id: first_header(&headers, HEADER_PROJECT_ID).map(String::from),
            verified: opened.verified,
        };

        let outcome = AssertUnwindSafe(handler.handle(opened.payload, meta))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(HandlerError::Panic(panic_message(&*panic))));

        match outcome {
            Ok(result) => {
                let body = match result {
                    None | Some(Value::Null) => json!({}),
                    Some(value) => value,
                };
                callbacks.send(body).await.map_err(respond_error)
            }
            Err(e) => {
                error!("Queue {}: job handler failed: {e:#}", self.name);
                callbacks
                    .send_error(e.status_code(), e.headers(), e.to_json())
                    .await
                    .map_err(respond_error)
            }
        }
    }
}

fn respond_error(e: anyhow::Error) -> Error {
    Error::Respond(format!("{e:#}"))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<T: Send + 'static, C> fmt::Debug for Queue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("route", &self.route)
            .field("handler", &self.handler.is_some())
            .field("options", &self.options)
            .finish()
    }
}
