// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use serde_json::{json, Value};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::envelope::ENVELOPE_VERSION;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, IntoStaticStr)]
pub enum Error {
    #[error(
        "unsupported envelope version {0}, only {supported} supported",
        supported = ENVELOPE_VERSION
    )]
    UnsupportedEnvelopeVersion(String),

    #[error("unrecognized payload body: {0}")]
    MalformedBody(String),

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error(
        "missing credentials: either TASKLESS_ID/TASKLESS_SECRET or TASKLESS_APP_ID/TASKLESS_APP_SECRET"
    )]
    MissingCredentials,

    #[error("encode payload failed: {0}")]
    Encode(String),

    #[error("decode payload failed: {0}")]
    Decode(String),

    #[error("sign envelope failed: {0}")]
    Sign(String),

    #[error("transport request failed: {0}")]
    Transport(String),

    #[error("service responded with errors: {0}")]
    GraphqlErrors(String),

    #[error("invalid job record: {0}")]
    InvalidRecord(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("receive adapter failed: {0}")]
    Respond(String),
}

impl Error {
    /// Status code reported to the service when an inbound envelope is
    /// rejected before reaching the handler.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::UnsupportedEnvelopeVersion(_) | Error::MalformedBody(_) => 400,
            Error::SignatureMismatch => 401,
            _ => 500,
        }
    }

    /// The error as reported to the service, `{ "name", "message" }`.
    pub fn to_json(&self) -> Value {
        let name: &'static str = self.into();
        json!({
            "name": name,
            "message": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_json_diff::assert_json_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::Error;

    #[rstest]
    #[case(Error::UnsupportedEnvelopeVersion("2".into()), 400)]
    #[case(Error::MalformedBody("x".into()), 400)]
    #[case(Error::SignatureMismatch, 401)]
    #[case(Error::Decode("x".into()), 500)]
    #[case(Error::MissingCredentials, 500)]
    fn status_code(#[case] err: Error, #[case] expected: u16) {
        assert_eq!(err.status_code(), expected);
    }

    #[test]
    fn serialized() {
        assert_json_eq!(
            Error::UnsupportedEnvelopeVersion("2".into()).to_json(),
            json!({
                "name": "UnsupportedEnvelopeVersion",
                "message": "unsupported envelope version 2, only 1 supported",
            })
        );
    }
}
