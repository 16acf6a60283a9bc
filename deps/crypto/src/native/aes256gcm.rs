// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! AES-256-GCM with a detached authentication tag, on top of openssl.

use anyhow::{Context, Result};
use openssl::symm::{decrypt_aead, encrypt_aead, Cipher};

use crate::{AeadCipher, AES_GCM_256_TAG_LENGTH};

pub fn seal(key: &[u8], plaintext: &[u8], iv: &[u8], aad: &[u8]) -> Result<AeadCipher> {
    let mut tag = vec![0; AES_GCM_256_TAG_LENGTH];
    let ciphertext = encrypt_aead(Cipher::aes_256_gcm(), key, Some(iv), aad, plaintext, &mut tag)
        .context("aes-256-gcm encryption failed")?;

    Ok(AeadCipher { tag, ciphertext })
}

pub fn open(key: &[u8], ciphertext: &[u8], iv: &[u8], aad: &[u8], tag: &[u8]) -> Result<Vec<u8>> {
    decrypt_aead(Cipher::aes_256_gcm(), key, Some(iv), aad, ciphertext, tag)
        .context("aes-256-gcm authentication failed")
}
