// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! AES-256-GCM with a detached authentication tag, on top of `aes-gcm`.

use aes_gcm::{AeadInPlace, Aes256Gcm, KeyInit, Nonce, Tag};
use anyhow::{anyhow, Result};

use crate::AeadCipher;

fn cipher(key: &[u8]) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key).map_err(|_| anyhow!("aes-256-gcm key is {} bytes", key.len()))
}

pub fn seal(key: &[u8], plaintext: &[u8], iv: &[u8], aad: &[u8]) -> Result<AeadCipher> {
    let mut ciphertext = plaintext.to_vec();
    let tag = cipher(key)?
        .encrypt_in_place_detached(Nonce::from_slice(iv), aad, &mut ciphertext)
        .map_err(|e| anyhow!("aes-256-gcm encryption failed: {e}"))?;

    Ok(AeadCipher {
        tag: tag.to_vec(),
        ciphertext,
    })
}

pub fn open(key: &[u8], ciphertext: &[u8], iv: &[u8], aad: &[u8], tag: &[u8]) -> Result<Vec<u8>> {
    let mut plaintext = ciphertext.to_vec();
    cipher(key)?
        .decrypt_in_place_detached(Nonce::from_slice(iv), aad, &mut plaintext, Tag::from_slice(tag))
        .map_err(|e| anyhow!("aes-256-gcm authentication failed: {e}"))?;

    Ok(plaintext)
}
