// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

use rand::Rng;

pub fn random_bytes<const N: usize>() -> Vec<u8> {
    let mut buffer = vec![0u8; N];
    rand::rng().fill(&mut buffer[..]);
    buffer
}

#[cfg(test)]
mod tests {
    use super::random_bytes;

    #[test]
    fn length_and_freshness() {
        let a = random_bytes::<12>();
        let b = random_bytes::<12>();
        assert_eq!(a.len(), 12);
        assert_ne!(a, b);
    }
}
