// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Taskless queue client
//!
//! A [`Queue`] enqueues named jobs with the Taskless service and executes
//! them when the service calls back. Payloads travel in a signed and
//! optionally encrypted [`Envelope`]; both signing secrets and encryption
//! keys can be rotated without downtime through [`KeyRing`]s.
//!
//! ```no_run
//! use serde_json::{json, Value};
//! use taskless::{HandlerResult, JobMeta, JobOptions, Queue, QueueOptions};
//!
//! # async fn run() -> taskless::Result<()> {
//! let queue = Queue::<Value>::builder("emails", "/api/jobs/emails")
//!     .options(QueueOptions::from_env())
//!     .handler(|payload: Value, meta: JobMeta| async move {
//!         println!("sending {payload} (verified: {})", meta.verified);
//!         HandlerResult::Ok(None)
//!     })
//!     .build();
//!
//! let options = JobOptions::default().retries(3);
//! queue
//!     .enqueue(["welcome", "42"], &json!({"to": "someone@example.com"}), Some(options))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod headers;
pub mod job;
pub mod keyring;
pub mod queue;
pub mod receive;
pub mod signature;
pub mod transport;

pub use config::{Credentials, QueueOptions, RuntimeEnv, RuntimeMode};
pub use credential::AuthScheme;
pub use envelope::{Envelope, Opened};
pub use error::{Error, Result};
pub use handler::{HandlerError, HandlerResult, JobError, JobHandler};
pub use headers::JobHeaders;
pub use job::{Job, JobIdentifier, JobMeta, JobOptions, RunAt, RunEvery};
pub use keyring::KeyRing;
pub use queue::{Queue, QueueBuilder, Route};
pub use receive::{HeaderField, InboundHeaders, ReceiveCallbacks, ResponseHeaders};
pub use transport::{Connector, GraphqlConnector, JobInput, JobRecord, TransportAdapter};
