// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! APIs for symmetric keys

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

#[cfg(feature = "openssl")]
use crate::native::*;

#[cfg(all(feature = "rust-crypto", not(feature = "openssl")))]
use crate::rust::*;

pub const AES_GCM_256_KEY_BITS: u32 = 256;

/// IV length for A256GCM: 12 bytes
pub const AES_GCM_256_IV_LENGTH: usize = 12;

/// Length of the detached authentication tag in bytes
pub const AES_GCM_256_TAG_LENGTH: usize = 16;

/// Supported WrapType, s.t. the cipher used to seal a job envelope. The
/// serialized name is the `alg` tag carried in the envelope's transport
/// metadata.
#[derive(EnumString, AsRefStr, Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub enum WrapType {
    #[strum(serialize = "aes-256-gcm")]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

pub struct AeadCipher {
    pub tag: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Turn arbitrary key material (e.g. a passphrase read from the
/// environment) into a 256 bit key.
pub fn derive_key(material: &[u8]) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(Sha256::new().chain_update(material).finalize().to_vec())
}

/// Encrypt the given `plaintext`, returning the ciphertext and the detached
/// authentication tag.
pub fn encrypt_aead(
    key: &[u8],
    plaintext: &[u8],
    iv: &[u8],
    aad: &[u8],
    wrap_type: WrapType,
) -> Result<AeadCipher> {
    check_lengths(key, iv)?;
    match wrap_type {
        WrapType::Aes256Gcm => aes256gcm::seal(key, plaintext, iv, aad),
    }
}

/// Decrypt the given `ciphertext`. Fails if the authentication tag does not
/// match, which is how a wrong key is detected.
pub fn decrypt_aead(
    key: &[u8],
    ciphertext: &[u8],
    iv: &[u8],
    aad: &[u8],
    tag: &[u8],
    wrap_type: WrapType,
) -> Result<Vec<u8>> {
    check_lengths(key, iv)?;
    match wrap_type {
        WrapType::Aes256Gcm => {
            if tag.len() != AES_GCM_256_TAG_LENGTH {
                bail!(
                    "Illegal length of authentication tag: {}, expected {AES_GCM_256_TAG_LENGTH}",
                    tag.len()
                );
            }
            aes256gcm::open(key, ciphertext, iv, aad, tag)
        }
    }
}

// The aes-gcm types panic on bad slice lengths, so reject them up front.
fn check_lengths(key: &[u8], iv: &[u8]) -> Result<()> {
    if key.len() * 8 != AES_GCM_256_KEY_BITS as usize {
        bail!("Illegal length of key: {} bytes", key.len());
    }
    if iv.len() != AES_GCM_256_IV_LENGTH {
        bail!("Illegal length of iv: {} bytes", iv.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[test]
    fn wrap_type_names() {
        assert_eq!(WrapType::Aes256Gcm.as_ref(), "aes-256-gcm");
        assert_eq!(
            WrapType::from_str("aes-256-gcm").expect("parse"),
            WrapType::Aes256Gcm
        );
        assert!(WrapType::from_str("A256CTR").is_err());
    }

    #[test]
    fn derived_key_is_stable() {
        let a = derive_key(b"passphrase");
        let b = derive_key(b"passphrase");
        assert_eq!(a.len() * 8, AES_GCM_256_KEY_BITS as usize);
        assert_eq!(*a, *b);
        assert_ne!(*a, *derive_key(b"other"));
    }

    #[rstest]
    #[case(b"short key".to_vec(), vec![0u8; 12])]
    #[case(vec![0u8; 32], vec![0u8; 16])]
    fn bad_lengths_are_rejected(#[case] key: Vec<u8>, #[case] iv: Vec<u8>) {
        assert!(encrypt_aead(&key, b"data", &iv, b"", WrapType::Aes256Gcm).is_err());
    }

    // Test cases 13 and 14 of the GCM specification
    #[rstest]
    #[case(b"", "", "530f8afbc74536b9a963b4f1c4cb738b")]
    #[case(
        &[0u8; 16],
        "cea7403d4d606b6e074ec5d3baf39d18",
        "d0d1c8a799996bf0265b98b5d48ab919"
    )]
    fn known_answers(#[case] plaintext: &[u8], #[case] ciphertext: &str, #[case] tag: &str) {
        let key = [0u8; 32];
        let iv = [0u8; AES_GCM_256_IV_LENGTH];

        let sealed = encrypt_aead(&key, plaintext, &iv, b"", WrapType::Aes256Gcm).expect("encrypt");
        assert_eq!(hex::encode(&sealed.ciphertext), ciphertext);
        assert_eq!(hex::encode(&sealed.tag), tag);

        let opened = decrypt_aead(&key, &sealed.ciphertext, &iv, b"", &sealed.tag, WrapType::Aes256Gcm)
            .expect("decrypt");
        assert_eq!(opened, plaintext);
    }

    #[rstest]
    #[case(b"{\"hello\":\"world\"}", b"")]
    #[case(b"plaintext", b"test-aad")]
    fn round_trip_with_aad(#[case] plaintext: &[u8], #[case] aad: &[u8]) {
        let key = derive_key(b"k");
        let iv = [1u8; AES_GCM_256_IV_LENGTH];
        let sealed = encrypt_aead(&key, plaintext, &iv, aad, WrapType::Aes256Gcm).expect("encrypt");
        assert_ne!(sealed.ciphertext, plaintext);

        let opened = decrypt_aead(&key, &sealed.ciphertext, &iv, aad, &sealed.tag, WrapType::Aes256Gcm)
            .expect("decrypt");
        assert_eq!(opened, plaintext);
        assert!(decrypt_aead(&key, &sealed.ciphertext, &iv, b"other", &sealed.tag, WrapType::Aes256Gcm).is_err());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let iv = [7u8; AES_GCM_256_IV_LENGTH];
        let sealed = encrypt_aead(
            &derive_key(b"right"),
            b"payload",
            &iv,
            b"",
            WrapType::Aes256Gcm,
        )
        .expect("encrypt");

        assert_eq!(sealed.tag.len(), AES_GCM_256_TAG_LENGTH);
        let res = decrypt_aead(
            &derive_key(b"wrong"),
            &sealed.ciphertext,
            &iv,
            b"",
            &sealed.tag,
            WrapType::Aes256Gcm,
        );
        assert!(res.is_err());

        let truncated = decrypt_aead(
            &derive_key(b"right"),
            &sealed.ciphertext,
            &iv,
            b"",
            &sealed.tag[..8],
            WrapType::Aes256Gcm,
        );
        assert!(truncated.is_err());
    }
}
