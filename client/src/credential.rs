// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Decides which endpoint a queue talks to and how it authenticates.

use std::fmt;

use log::{debug, warn};
use zeroize::Zeroizing;

use crate::{
    config::{Credentials, RuntimeEnv, RuntimeMode},
    Error, Result,
};

pub const TASKLESS_ENDPOINT: &str = "https://taskless.io/api/graphql";
pub const TASKLESS_DEV_ENDPOINT: &str = "http://localhost:3001/api/graphql";

pub const HEADER_AUTH_TYPE: &str = "x-taskless-auth-type";
pub const HEADER_ID: &str = "x-taskless-id";
pub const HEADER_SECRET: &str = "x-taskless-secret";
pub const HEADER_ROLE: &str = "x-taskless-role";
pub const HEADER_APP_ID: &str = "x-taskless-app-id";

/// In development mode `TASKLESS_ENDPOINT` wins over `TASKLESS_DEV_ENDPOINT`,
/// which wins over the local default. In production only
/// `TASKLESS_ENDPOINT` is consulted.
pub fn resolve_endpoint(runtime: &RuntimeEnv) -> String {
    let endpoint = match runtime.mode {
        RuntimeMode::Development => runtime
            .endpoint
            .as_deref()
            .or(runtime.dev_endpoint.as_deref())
            .unwrap_or(TASKLESS_DEV_ENDPOINT),
        RuntimeMode::Production => runtime.endpoint.as_deref().unwrap_or(TASKLESS_ENDPOINT),
    };

    debug!("Using endpoint {endpoint}");
    endpoint.to_string()
}

/// The authentication a transport client presents to the service.
#[derive(Clone, PartialEq)]
pub enum AuthScheme {
    /// Project level auth, scoped to a single queue
    Project {
        project_id: String,
        queue_name: String,
        secret: Zeroizing<String>,
    },
    Application {
        app_id: String,
        secret: Zeroizing<String>,
    },
    /// No credentials, only permitted in development mode
    Anonymous,
}

impl AuthScheme {
    pub fn resolve(
        credentials: Option<&Credentials>,
        queue_name: &str,
        mode: RuntimeMode,
    ) -> Result<Self> {
        match credentials {
            Some(Credentials::Project {
                project_id, secret, ..
            }) if !project_id.is_empty() && !queue_name.is_empty() && !secret.is_empty() => {
                return Ok(AuthScheme::Project {
                    project_id: project_id.clone(),
                    queue_name: queue_name.to_string(),
                    secret: secret.clone(),
                })
            }
            Some(Credentials::Application { app_id, secret, .. })
                if !app_id.is_empty() && !secret.is_empty() =>
            {
                return Ok(AuthScheme::Application {
                    app_id: app_id.clone(),
                    secret: secret.clone(),
                })
            }
            _ => {}
        }

        match mode {
            RuntimeMode::Development => {
                warn!("{}", Error::MissingCredentials);
                Ok(AuthScheme::Anonymous)
            }
            RuntimeMode::Production => Err(Error::MissingCredentials),
        }
    }

    /// Request headers carrying the credentials.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self {
            AuthScheme::Project {
                project_id,
                queue_name,
                secret,
            } => vec![
                (HEADER_AUTH_TYPE, "project".to_string()),
                (HEADER_ID, project_id.clone()),
                (HEADER_SECRET, secret.to_string()),
                (HEADER_ROLE, format!("queue/name:{queue_name}")),
            ],
            AuthScheme::Application { app_id, secret } => vec![
                (HEADER_APP_ID, app_id.clone()),
                (HEADER_SECRET, secret.to_string()),
            ],
            AuthScheme::Anonymous => Vec::new(),
        }
    }
}

impl fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Project {
                project_id,
                queue_name,
                ..
            } => f
                .debug_struct("Project")
                .field("project_id", project_id)
                .field("queue_name", queue_name)
                .field("secret", &"[REDACTED]")
                .finish(),
            AuthScheme::Application { app_id, .. } => f
                .debug_struct("Application")
                .field("app_id", app_id)
                .field("secret", &"[REDACTED]")
                .finish(),
            AuthScheme::Anonymous => write!(f, "Anonymous"),
        }
    }
}
