// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Job envelope
//!
//! Every job payload travels inside an envelope:
//!
//! ```json
//! {
//!     "v": 1,
//!     "transport": { "ev": 1, "alg": "aes-256-gcm", "iv": "...", "at": "...", "atl": 128 },
//!     "text": "...",
//!     "signature": "..."
//! }
//! ```
//!
//! `text` is the JSON payload, encrypted when an encryption key is
//! configured, and `signature` is computed over `text` exactly as it is
//! transported. Envelopes without `text` may carry a plain `json` payload
//! instead. Those are accepted for compatibility with legacy producers but are
//! never considered verified.

pub mod codec;
pub mod transport;

use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

pub use self::codec::{decode, encode};
pub use self::transport::{Cipher, Transport, TRANSPORT_VERSION};

use crate::{keyring::KeyRing, signature, Error, Result};

pub const ENVELOPE_VERSION: u64 = 1;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Compared numerically, so `1.0` is version 1. A missing version is
    /// rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,

    /// Possibly ciphered payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Signature of the `text` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Unsigned payload of legacy producers. A present `null` is kept as
    /// `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub json: Option<Value>,
}

fn deserialize_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The payload carrying part of an [`Envelope`] once its version is checked.
#[derive(Debug, PartialEq)]
pub enum Contents<'a> {
    Sealed {
        transport: &'a Transport,
        text: &'a str,
        signature: Option<&'a str>,
    },
    Legacy(&'a Value),
}

/// A payload taken out of an envelope. `verified` tells whether the
/// signature matched one of the accepted secrets. Whether an unverified
/// payload may be used is up to the caller.
#[derive(Debug, PartialEq)]
pub struct Opened<T> {
    pub payload: T,
    pub verified: bool,
}

impl Envelope {
    /// Parse an inbound body. Anything that is not shaped like an envelope
    /// is a [`Error::MalformedBody`].
    pub fn from_value(body: Value) -> Result<Self> {
        serde_json::from_value(body).map_err(|e| Error::MalformedBody(e.to_string()))
    }

    pub fn contents(&self) -> Result<Contents<'_>> {
        match &self.v {
            Some(v) if v.as_f64() == Some(ENVELOPE_VERSION as f64) => {}
            Some(v) => return Err(Error::UnsupportedEnvelopeVersion(v.to_string())),
            None => return Err(Error::UnsupportedEnvelopeVersion("none".into())),
        }

        match (&self.text, &self.json) {
            (Some(text), _) => {
                let transport = self.transport.as_ref().ok_or_else(|| {
                    Error::MalformedBody("`text` present without `transport`".into())
                })?;
                Ok(Contents::Sealed {
                    transport,
                    text,
                    signature: self.signature.as_deref(),
                })
            }
            (None, Some(json)) => Ok(Contents::Legacy(json)),
            (None, None) => Err(Error::MalformedBody(
                "neither `text` nor `json` present".into(),
            )),
        }
    }

    /// Encode `payload` with the current encryption key (if any) and sign the
    /// result with the current secret. Without a secret the text is signed
    /// with the empty secret, which no receiver accepts.
    pub fn seal<T: Serialize + ?Sized>(
        payload: &T,
        secrets: &KeyRing,
        keys: &KeyRing,
    ) -> Result<Self> {
        let (transport, text) = encode(payload, keys.current())?;
        let signature = signature::sign(&text, secrets.current().unwrap_or_default())?;

        Ok(Self {
            v: Some(ENVELOPE_VERSION.into()),
            transport: Some(transport),
            text: Some(text),
            signature: Some(signature),
            json: None,
        })
    }

    /// Verify and decode the payload against every accepted secret and key.
    /// A signature mismatch is not an error here, it is reported through
    /// [`Opened::verified`].
    pub fn open<T: DeserializeOwned>(&self, secrets: &KeyRing, keys: &KeyRing) -> Result<Opened<T>> {
        match self.contents()? {
            Contents::Sealed {
                transport,
                text,
                signature: sig,
            } => {
                let verified = sig
                    .map(|s| signature::verify(text, &secrets.candidates(), s))
                    .unwrap_or(false);
                let payload = decode(text, transport, &keys.candidates())?;
                Ok(Opened { payload, verified })
            }
            Contents::Legacy(json) => {
                debug!("Envelope carries an unsigned json payload");
                let payload = serde_json::from_value(json.clone())
                    .map_err(|e| Error::Decode(format!("json payload: {e}")))?;
                Ok(Opened {
                    payload,
                    verified: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_json_diff::assert_json_eq;
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::*;

    fn ring(current: &str, retired: &[&str]) -> KeyRing {
        KeyRing::new(
            Some(current.to_string()),
            retired.iter().map(|r| r.to_string()).collect(),
        )
    }

    #[test]
    fn plain_envelope_layout() {
        let envelope =
            Envelope::seal(&json!({"hello": "world"}), &ring("s", &[]), &KeyRing::default())
                .expect("seal");
        let serialized = serde_json::to_value(&envelope).expect("serialize");

        assert_json_eq!(
            serialized,
            json!({
                "v": 1,
                "transport": { "ev": 1, "alg": "none" },
                "text": "{\"hello\":\"world\"}",
                "signature": signature::sign("{\"hello\":\"world\"}", "s").unwrap(),
            })
        );
    }

    #[test]
    fn sealed_round_trip_with_rotation() {
        let payload = json!({"id": 42, "tags": ["a", "b"]});
        let envelope = Envelope::seal(&payload, &ring("s_old", &[]), &ring("k_old", &[]))
            .expect("seal");
        assert!(envelope.transport.as_ref().is_some_and(Transport::is_encrypted));

        let mut secrets = ring("s_old", &[]);
        let mut keys = ring("k_old", &[]);
        secrets.rotate("s_new");
        keys.rotate("k_new");

        let opened: Opened<Value> = envelope.open(&secrets, &keys).expect("open");
        assert_eq!(opened, Opened { payload, verified: true });

        secrets.retire("s_old");
        let opened: Opened<Value> = envelope.open(&secrets, &keys).expect("open");
        assert!(!opened.verified);

        keys.retire("k_old");
        assert!(matches!(
            envelope.open::<Value>(&secrets, &keys),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn forged_plain_text_decodes_but_is_not_verified() {
        let mut envelope =
            Envelope::seal(&json!({"amount": 1}), &ring("s", &[]), &KeyRing::default())
                .expect("seal");
        envelope.text = Some("{\"amount\":1000}".into());

        let opened: Opened<Value> = envelope
            .open(&ring("s", &[]), &KeyRing::default())
            .expect("open");
        assert_eq!(opened.payload, json!({"amount": 1000}));
        assert!(!opened.verified);
    }

    #[test]
    fn legacy_json_is_never_verified() {
        let envelope = Envelope::from_value(json!({"v": 1, "json": {"a": 1}})).expect("parse");
        let opened: Opened<Value> = envelope
            .open(&ring("s", &[]), &KeyRing::default())
            .expect("open");
        assert_eq!(opened, Opened { payload: json!({"a": 1}), verified: false });
    }

    #[test]
    fn legacy_null_json_reaches_the_handler() {
        let envelope = Envelope::from_value(json!({"v": 1, "json": null})).expect("parse");
        assert_eq!(envelope.contents().expect("contents"), Contents::Legacy(&Value::Null));

        let opened: Opened<Value> = envelope
            .open(&ring("s", &[]), &KeyRing::default())
            .expect("open");
        assert_eq!(opened, Opened { payload: Value::Null, verified: false });
    }

    #[rstest]
    #[case(json!({"v": 1.0, "json": {"a": 1}}))]
    #[case(json!({"v": 1, "json": {"a": 1}}))]
    fn version_compares_numerically(#[case] body: Value) {
        let envelope = Envelope::from_value(body).expect("parse");
        let opened: Opened<Value> = envelope
            .open(&KeyRing::default(), &KeyRing::default())
            .expect("open");
        assert_eq!(opened.payload, json!({"a": 1}));
    }

    #[rstest]
    #[case(json!({"v": 1.5, "json": {}}), "1.5")]
    #[case(json!({"v": -1, "json": {}}), "-1")]
    #[case(json!({"v": 2, "json": {}}), "2")]
    #[case(json!({"json": {}}), "none")]
    fn unsupported_versions(#[case] body: Value, #[case] reported: &str) {
        let err = Envelope::from_value(body)
            .and_then(|e| e.open::<Value>(&KeyRing::default(), &KeyRing::default()))
            .expect_err("must be rejected");
        match err {
            Error::UnsupportedEnvelopeVersion(v) => assert_eq!(v, reported),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[rstest]
    #[case(json!({"v": 2, "json": {}}), "UnsupportedEnvelopeVersion")]
    #[case(json!({"json": {}}), "UnsupportedEnvelopeVersion")]
    #[case(json!({"v": 1}), "MalformedBody")]
    #[case(json!({"v": 1, "text": "{}"}), "MalformedBody")]
    #[case(json!({"v": 1, "transport": {"ev": 1, "alg": "aes-256-gcm"}, "text": "x"}), "MalformedBody")]
    #[case(json!("just a string"), "MalformedBody")]
    fn rejected_bodies(#[case] body: Value, #[case] kind: &str) {
        let err = Envelope::from_value(body)
            .and_then(|e| e.open::<Value>(&KeyRing::default(), &KeyRing::default()))
            .expect_err("must be rejected");
        assert!(format!("{err:?}").starts_with(kind), "{err:?}");
    }
}
