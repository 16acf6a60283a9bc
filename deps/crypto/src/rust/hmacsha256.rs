// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! This mod implements HMAC-SHA256.

use anyhow::*;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub fn sign_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| anyhow!("init hmac-sha256 failed: {e}"))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn verify_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> Result<bool> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| anyhow!("init hmac-sha256 failed: {e}"))?;
    mac.update(data);
    Ok(mac.verify_slice(tag).is_ok())
}
