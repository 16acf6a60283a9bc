// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Queue configuration.
//!
//! [`QueueOptions`] can be assembled in code, read from the environment with
//! [`QueueOptions::from_env`], or loaded from any file format the `config`
//! crate understands with [`QueueOptions::from_file`]. Values missing from a
//! file are filled in from the environment.

use std::{env, fmt, path::Path};

use config::{Config, File};
use log::{debug, info};
use serde::Deserialize;
use strum::{AsRefStr, EnumString};
use zeroize::Zeroizing;

use crate::{job::JobOptions, keyring::KeyRing, Error, Result};

pub const ENV_RUNTIME_MODE: &str = "TASKLESS_ENV";
pub const ENV_ENDPOINT: &str = "TASKLESS_ENDPOINT";
pub const ENV_DEV_ENDPOINT: &str = "TASKLESS_DEV_ENDPOINT";
pub const ENV_BASE_URL: &str = "TASKLESS_BASE_URL";
pub const ENV_PROJECT_ID: &str = "TASKLESS_ID";
pub const ENV_SECRET: &str = "TASKLESS_SECRET";
pub const ENV_APP_ID: &str = "TASKLESS_APP_ID";
pub const ENV_APP_SECRET: &str = "TASKLESS_APP_SECRET";
pub const ENV_PREVIOUS_SECRETS: &str = "TASKLESS_PREVIOUS_SECRETS";
pub const ENV_ENCRYPTION_KEY: &str = "TASKLESS_ENCRYPTION_KEY";
pub const ENV_PREVIOUS_ENCRYPTION_KEYS: &str = "TASKLESS_PREVIOUS_ENCRYPTION_KEYS";

/// Read an environment variable, treating an empty value as unset.
fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read a comma separated list from the environment.
fn env_list(name: &str) -> Vec<String> {
    env_var(name)
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[derive(EnumString, AsRefStr, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[strum(ascii_case_insensitive)]
pub enum RuntimeMode {
    #[strum(serialize = "development")]
    Development,

    #[default]
    #[strum(serialize = "production")]
    Production,
}

/// Process level settings that decide how strict the client is and which
/// endpoint it talks to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeEnv {
    pub mode: RuntimeMode,

    /// Endpoint override, honored in every mode
    pub endpoint: Option<String>,

    /// Endpoint override honored in development mode only
    pub dev_endpoint: Option<String>,
}

impl RuntimeEnv {
    pub fn from_env() -> Self {
        let mode = match env_var(ENV_RUNTIME_MODE) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                info!("Unknown {ENV_RUNTIME_MODE}={raw}, running in production mode");
                RuntimeMode::Production
            }),
            None => RuntimeMode::Production,
        };

        Self {
            mode,
            endpoint: env_var(ENV_ENDPOINT),
            dev_endpoint: env_var(ENV_DEV_ENDPOINT),
        }
    }

    pub fn development() -> Self {
        Self {
            mode: RuntimeMode::Development,
            ..Default::default()
        }
    }

    pub fn is_development(&self) -> bool {
        self.mode == RuntimeMode::Development
    }
}

/// Credentials of a project or of an application. The shape is decided once,
/// when the options are built.
#[derive(Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Credentials {
    Project {
        project_id: String,
        secret: Zeroizing<String>,
        #[serde(default)]
        expired_secrets: Vec<Zeroizing<String>>,
    },
    Application {
        app_id: String,
        secret: Zeroizing<String>,
        #[serde(default)]
        expired_secrets: Vec<Zeroizing<String>>,
    },
}

impl Credentials {
    pub fn project(project_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials::Project {
            project_id: project_id.into(),
            secret: Zeroizing::new(secret.into()),
            expired_secrets: Vec::new(),
        }
    }

    pub fn application(app_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials::Application {
            app_id: app_id.into(),
            secret: Zeroizing::new(secret.into()),
            expired_secrets: Vec::new(),
        }
    }

    /// Add secrets that are still accepted when verifying envelopes.
    pub fn with_expired_secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expired = match &mut self {
            Credentials::Project {
                expired_secrets, ..
            }
            | Credentials::Application {
                expired_secrets, ..
            } => expired_secrets,
        };
        expired.extend(secrets.into_iter().map(|s| Zeroizing::new(s.into())));
        self
    }

    /// Project credentials take precedence over application credentials.
    /// `TASKLESS_SECRET` serves as the application secret when
    /// `TASKLESS_APP_SECRET` is not set.
    pub fn from_env() -> Option<Self> {
        let credentials = if let (Some(id), Some(secret)) =
            (env_var(ENV_PROJECT_ID), env_var(ENV_SECRET))
        {
            Self::project(id, secret)
        } else if let (Some(id), Some(secret)) = (
            env_var(ENV_APP_ID),
            env_var(ENV_APP_SECRET).or_else(|| env_var(ENV_SECRET)),
        ) {
            Self::application(id, secret)
        } else {
            return None;
        };

        Some(credentials.with_expired_secrets(env_list(ENV_PREVIOUS_SECRETS)))
    }

    pub fn secret(&self) -> &str {
        match self {
            Credentials::Project { secret, .. } | Credentials::Application { secret, .. } => secret,
        }
    }

    pub fn expired_secrets(&self) -> &[Zeroizing<String>] {
        match self {
            Credentials::Project {
                expired_secrets, ..
            }
            | Credentials::Application {
                expired_secrets, ..
            } => expired_secrets,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Project {
                project_id,
                expired_secrets,
                ..
            } => f
                .debug_struct("Project")
                .field("project_id", project_id)
                .field("secret", &"[REDACTED]")
                .field("expired_secrets", &expired_secrets.len())
                .finish(),
            Credentials::Application {
                app_id,
                expired_secrets,
                ..
            } => f
                .debug_struct("Application")
                .field("app_id", app_id)
                .field("secret", &"[REDACTED]")
                .field("expired_secrets", &expired_secrets.len())
                .finish(),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct QueueOptions {
    /// Prefix of routes that are not fully qualified URLs
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Current encryption key. Without one, payloads travel in plain text.
    #[serde(default)]
    pub encryption_key: Option<Zeroizing<String>>,

    /// Retired encryption keys, still accepted when decoding
    #[serde(default)]
    pub expired_encryption_keys: Vec<Zeroizing<String>>,

    /// Options every enqueued job starts from
    #[serde(default)]
    pub default_job_options: JobOptions,

    /// Joins composite job identifiers, `/` if unset
    #[serde(default)]
    pub separator: Option<String>,

    /// Accept envelopes whose signature does not verify. Meant for local
    /// development only.
    #[serde(default)]
    pub allow_unverified_signatures: bool,

    #[serde(skip)]
    pub runtime: RuntimeEnv,
}

impl QueueOptions {
    pub fn from_env() -> Self {
        let mut options = Self::default();
        options.fill_from_env();
        options
    }

    /// Load options from a configuration file. Supported formats are all
    /// formats supported by the `config` crate.
    pub fn from_file(path: &str) -> Result<Self> {
        debug!("Using configuration file {path}");
        if !Path::new(path).exists() {
            return Err(Error::Config(format!("config file {path} not found")));
        }

        let c = Config::builder()
            .add_source(File::with_name(path))
            .build()
            .map_err(|e| Error::Config(format!("failed to read {path}: {e}")))?;

        let mut options: QueueOptions = c
            .try_deserialize()
            .map_err(|e| Error::Config(format!("failed to parse {path}: {e}")))?;
        options.fill_from_env();
        Ok(options)
    }

    fn fill_from_env(&mut self) {
        if self.base_url.is_none() {
            self.base_url = env_var(ENV_BASE_URL);
        }
        if self.credentials.is_none() {
            self.credentials = Credentials::from_env();
        }
        if self.encryption_key.is_none() {
            self.encryption_key = env_var(ENV_ENCRYPTION_KEY).map(Zeroizing::new);
        }
        if self.expired_encryption_keys.is_empty() {
            self.expired_encryption_keys = env_list(ENV_PREVIOUS_ENCRYPTION_KEYS)
                .into_iter()
                .map(Zeroizing::new)
                .collect();
        }
        self.runtime = RuntimeEnv::from_env();
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(Zeroizing::new(key.into()));
        self
    }

    pub fn with_expired_encryption_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expired_encryption_keys
            .extend(keys.into_iter().map(|k| Zeroizing::new(k.into())));
        self
    }

    pub fn with_default_job_options(mut self, options: JobOptions) -> Self {
        self.default_job_options = options;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn with_unverified_signatures_allowed(mut self, allowed: bool) -> Self {
        self.allow_unverified_signatures = allowed;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeEnv) -> Self {
        self.runtime = runtime;
        self
    }

    /// Secrets used to sign (current) and verify (all) envelopes.
    pub fn signing_secrets(&self) -> KeyRing {
        match &self.credentials {
            Some(credentials) => KeyRing::new(
                Some(credentials.secret().to_string()),
                credentials
                    .expired_secrets()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            None => KeyRing::default(),
        }
    }

    pub fn encryption_keys(&self) -> KeyRing {
        KeyRing::new(
            self.encryption_key.as_ref().map(|k| k.to_string()),
            self.expired_encryption_keys
                .iter()
                .map(|k| k.to_string())
                .collect(),
        )
    }
}

impl fmt::Debug for QueueOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueOptions")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "expired_encryption_keys",
                &self.expired_encryption_keys.len(),
            )
            .field("default_job_options", &self.default_job_options)
            .field("separator", &self.separator)
            .field(
                "allow_unverified_signatures",
                &self.allow_unverified_signatures,
            )
            .field("runtime", &self.runtime)
            .finish()
    }
}
