// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use serde::{Deserialize, Serialize};

pub const TRANSPORT_VERSION: u64 = 1;

/// Describes how the `text` of an envelope was produced.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transport {
    /// The envelope encoding version
    pub ev: u64,

    #[serde(flatten)]
    pub cipher: Cipher,
}

/// Cipher parameters, tagged by `alg`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "alg")]
pub enum Cipher {
    /// `text` is the plaintext JSON payload
    #[serde(rename = "none")]
    Plain,

    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm {
        /// base64 encoded IV
        iv: String,

        /// base64 encoded authentication tag
        at: String,

        /// Length of the authentication tag in bits
        atl: u32,
    },
}

impl Transport {
    pub fn plain() -> Self {
        Self {
            ev: TRANSPORT_VERSION,
            cipher: Cipher::Plain,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        !matches!(self.cipher, Cipher::Plain)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{Cipher, Transport};

    #[rstest]
    #[case(json!({"ev": 1, "alg": "none"}), Transport::plain())]
    #[case(
        json!({"ev": 1, "alg": "aes-256-gcm", "iv": "aXY=", "at": "YXQ=", "atl": 128}),
        Transport {
            ev: 1,
            cipher: Cipher::Aes256Gcm { iv: "aXY=".into(), at: "YXQ=".into(), atl: 128 },
        }
    )]
    fn parse(#[case] raw: serde_json::Value, #[case] expected: Transport) {
        let parsed: Transport = serde_json::from_value(raw.clone()).expect("deserialize failed");
        assert_eq!(parsed, expected);
        assert_eq!(serde_json::to_value(&parsed).expect("serialize failed"), raw);
    }

    #[rstest]
    #[case(json!({"ev": 1, "alg": "aes-256-gcm", "iv": "aXY="}))]
    #[case(json!({"ev": 1, "alg": "A256CTR"}))]
    #[case(json!({"ev": 1}))]
    fn reject(#[case] raw: serde_json::Value) {
        assert!(serde_json::from_value::<Transport>(raw).is_err());
    }
}
