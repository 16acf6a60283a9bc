// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Turns payloads into envelope `text` plus [`Transport`] metadata and back.

use base64::{engine::general_purpose::STANDARD, Engine};
use crypto::{WrapType, AES_GCM_256_IV_LENGTH};
use log::debug;
use serde::{de::DeserializeOwned, Serialize};

use super::transport::{Cipher, Transport, TRANSPORT_VERSION};
use crate::{Error, Result};

/// Serialize `payload` to JSON and, when `key` is given, encrypt it with
/// AES-256-GCM under a key derived from `key`.
pub fn encode<T: Serialize + ?Sized>(payload: &T, key: Option<&str>) -> Result<(Transport, String)> {
    let plaintext = serde_json::to_string(payload).map_err(|e| Error::Encode(e.to_string()))?;

    let Some(key) = key else {
        return Ok((Transport::plain(), plaintext));
    };

    let iv = crypto::rand::random_bytes::<AES_GCM_256_IV_LENGTH>();
    let sealed = crypto::encrypt_aead(
        &crypto::derive_key(key.as_bytes()),
        plaintext.as_bytes(),
        &iv,
        &[],
        WrapType::Aes256Gcm,
    )
    .map_err(|e| Error::Encode(format!("{e:#}")))?;

    let transport = Transport {
        ev: TRANSPORT_VERSION,
        cipher: Cipher::Aes256Gcm {
            iv: STANDARD.encode(iv),
            at: STANDARD.encode(&sealed.tag),
            atl: (sealed.tag.len() * 8) as u32,
        },
    };

    Ok((transport, STANDARD.encode(sealed.ciphertext)))
}

/// Inverse of [`encode`]. Encrypted text is tried against every key in
/// order, the first one whose authentication tag checks out wins.
pub fn decode<T: DeserializeOwned>(text: &str, transport: &Transport, keys: &[&str]) -> Result<T> {
    if transport.ev != TRANSPORT_VERSION {
        return Err(Error::Decode(format!(
            "unsupported transport version {}",
            transport.ev
        )));
    }

    match &transport.cipher {
        Cipher::Plain => serde_json::from_str(text).map_err(|e| Error::Decode(e.to_string())),
        Cipher::Aes256Gcm { iv, at, atl } => {
            let iv = STANDARD
                .decode(iv)
                .map_err(|e| Error::Decode(format!("base64 decode iv failed: {e}")))?;
            let tag = STANDARD
                .decode(at)
                .map_err(|e| Error::Decode(format!("base64 decode auth tag failed: {e}")))?;
            let ciphertext = STANDARD
                .decode(text)
                .map_err(|e| Error::Decode(format!("base64 decode text failed: {e}")))?;

            if tag.len() * 8 != *atl as usize {
                return Err(Error::Decode(format!(
                    "auth tag is {} bits, transport declares {atl}",
                    tag.len() * 8
                )));
            }

            for (index, key) in keys.iter().enumerate() {
                let plaintext = match crypto::decrypt_aead(
                    &crypto::derive_key(key.as_bytes()),
                    &ciphertext,
                    &iv,
                    &[],
                    &tag,
                    WrapType::Aes256Gcm,
                ) {
                    Ok(plaintext) => plaintext,
                    Err(e) => {
                        debug!("Encryption key #{index} does not open the envelope: {e:#}");
                        continue;
                    }
                };

                return serde_json::from_slice(&plaintext).map_err(|e| Error::Decode(e.to_string()));
            }

            Err(Error::Decode(format!(
                "none of the {} configured encryption keys opens the envelope",
                keys.len()
            )))
        }
    }
}
