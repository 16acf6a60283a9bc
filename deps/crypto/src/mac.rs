// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! APIs for keyed message authentication codes

use anyhow::Result;

#[cfg(feature = "openssl")]
use crate::native::*;

#[cfg(all(feature = "rust-crypto", not(feature = "openssl")))]
use crate::rust::*;

/// Compute HMAC-SHA256 of `data` under `key`. Keys of any length,
/// including empty ones, are accepted.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    hmacsha256::sign_sha256(key, data)
}

/// Check `tag` against HMAC-SHA256 of `data` under `key` in constant time.
pub fn hmac_sha256_verify(key: &[u8], data: &[u8], tag: &[u8]) -> Result<bool> {
    hmacsha256::verify_sha256(key, data, tag)
}

/// Same as [`hmac_sha256`], hex encoded.
pub fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> Result<String> {
    Ok(hex::encode(hmac_sha256(key, data)?))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    // RFC 4231 test cases 1 and 2
    #[rstest]
    #[case(
        &[0x0b; 20],
        b"Hi There",
        "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
    )]
    #[case(
        b"Jefe",
        b"what do ya want for nothing?",
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    )]
    fn known_answers(#[case] key: &[u8], #[case] data: &[u8], #[case] expected: &str) {
        assert_eq!(hmac_sha256_hex(key, data).expect("hmac"), expected);

        let tag = hex::decode(expected).expect("hex");
        assert!(hmac_sha256_verify(key, data, &tag).expect("verify"));
        assert!(!hmac_sha256_verify(b"other", data, &tag).expect("verify"));
    }

    #[test]
    fn empty_key_is_accepted() {
        let tag = hmac_sha256(b"", b"text").expect("hmac");
        assert_eq!(tag.len(), 32);
    }
}
