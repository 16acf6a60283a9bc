// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Conversion between the flat header map used by [`JobOptions`] and the
//! list of name/value pairs the service stores.
//!
//! [`JobOptions`]: crate::job::JobOptions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Headers sent along with a job invocation. Values are usually strings,
/// numbers are accepted and stringified on the wire.
pub type JobHeaders = BTreeMap<String, Value>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

/// Strings and numbers keep their value, anything else is sent as `""`.
pub fn headers_to_pairs(headers: Option<&JobHeaders>) -> Option<Vec<HeaderPair>> {
    let headers = headers?;

    Some(
        headers
            .iter()
            .map(|(name, value)| HeaderPair {
                name: name.clone(),
                value: match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => String::new(),
                },
            })
            .collect(),
    )
}

/// A missing list becomes an empty map. For repeated names the last pair
/// wins.
pub fn pairs_to_headers(pairs: Option<&[HeaderPair]>) -> JobHeaders {
    pairs
        .unwrap_or_default()
        .iter()
        .map(|pair| (pair.name.clone(), Value::String(pair.value.clone())))
        .collect()
}
