// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! This mod implements HMAC-SHA256.

use anyhow::*;
use openssl::{hash::MessageDigest, memcmp, pkey::PKey, sign::Signer};

pub fn sign_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let key = PKey::hmac(key).map_err(|e| anyhow!("init hmac-sha256 key failed: {e}"))?;
    let mut signer = Signer::new(MessageDigest::sha256(), &key)
        .map_err(|e| anyhow!("init hmac-sha256 failed: {e}"))?;
    signer
        .update(data)
        .map_err(|e| anyhow!("hmac-sha256 update failed: {e}"))?;
    signer
        .sign_to_vec()
        .map_err(|e| anyhow!("hmac-sha256 finalize failed: {e}"))
}

pub fn verify_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> Result<bool> {
    let expected = sign_sha256(key, data)?;
    if expected.len() != tag.len() {
        return Ok(false);
    }
    Ok(memcmp::eq(&expected, tag))
}
