// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Crypto
//!
//! This crate encapsulates the crypto primitives the job envelope relies on,
//! in both purely rust and openssl (native). Features can be enabled to
//! determine which underlying implementation is used:
//! - `rust-crypto`: Use purely rust.
//! - `openssl`: Use openssl. If `rust-crypto` and `openssl` are both
//!   enabled, use `openssl`.
//!
//! ## Components
//!
//! This crate include the following public submodules:
//! - `symmetric`: AEAD en/decryption and key derivation
//! - `mac`: Keyed message authentication codes
//! - `rand`: Random material such as IVs

#[macro_use]
extern crate strum;

#[cfg(feature = "openssl")]
mod native;
#[cfg(all(feature = "rust-crypto", not(feature = "openssl")))]
mod rust;

mod symmetric;
pub use symmetric::*;

mod mac;
pub use mac::*;

pub mod rand;
