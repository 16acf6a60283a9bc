// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! Crypto suites implemented by purely rust

pub mod aes256gcm;
pub mod hmacsha256;
