// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Envelope signatures: HMAC-SHA256 over the transport encoded `text`,
//! hex encoded.

use log::warn;

use crate::{Error, Result};

pub fn sign(text: &str, secret: &str) -> Result<String> {
    crypto::hmac_sha256_hex(secret.as_bytes(), text.as_bytes())
        .map_err(|e| Error::Sign(format!("{e:#}")))
}

/// Check `signature` against every candidate secret in order and stop at the
/// first match. Empty candidates are skipped, so an empty list never
/// verifies.
pub fn verify(text: &str, secrets: &[&str], signature: &str) -> bool {
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };

    for secret in secrets.iter().filter(|s| !s.is_empty()) {
        match crypto::hmac_sha256_verify(secret.as_bytes(), text.as_bytes(), &signature) {
            Ok(true) => return true,
            Ok(false) => continue,
            Err(e) => warn!("Signature check with a configured secret failed: {e:#}"),
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{sign, verify};

    #[test]
    fn signatures_are_deterministic() {
        let a = sign("text", "secret").expect("sign");
        let b = sign("text", "secret").expect("sign");
        assert_eq!(a, b);
        assert_ne!(a, sign("text ", "secret").expect("sign"));
    }

    #[rstest]
    #[case(&["s_new", "s_old"], true)]
    #[case(&["s_old"], true)]
    #[case(&["s_new"], false)]
    #[case(&["", "s_new"], false)]
    #[case(&[], false)]
    fn rotation(#[case] candidates: &[&str], #[case] expected: bool) {
        let signature = sign("{\"a\":1}", "s_old").expect("sign");
        assert_eq!(verify("{\"a\":1}", candidates, &signature), expected);
    }

    #[test]
    fn garbage_signature_never_verifies() {
        assert!(!verify("text", &["secret"], "not hex at all"));
        assert!(!verify("text", &["secret"], ""));
    }
}
