// Copyright (c) 2026 The Taskless Client Authors
//
// SPDX-License-Identifier: Apache-2.0
//

//! # Rotating key material
//!
//! Signing secrets and encryption keys rotate the same way. One *current*
//! value is used for every write, and an ordered list of *retired* values is
//! still accepted on reads. Rotation is an explicit two-step operation:
//!
//! 1. [`KeyRing::rotate`] installs a new current value. The previous current
//!    value becomes the first retired value, so anything produced with it
//!    can still be read.
//! 2. Once nothing produced with the old value is in flight any more,
//!    [`KeyRing::retire`] drops it for good.

use std::fmt;

use zeroize::Zeroizing;

#[derive(Clone, Default)]
pub struct KeyRing {
    current: Option<Zeroizing<String>>,
    retired: Vec<Zeroizing<String>>,
}

impl KeyRing {
    /// Empty values are ignored, both as current and as retired entries.
    pub fn new(current: Option<String>, retired: Vec<String>) -> Self {
        Self {
            current: current.filter(|c| !c.is_empty()).map(Zeroizing::new),
            retired: retired
                .into_iter()
                .filter(|r| !r.is_empty())
                .map(Zeroizing::new)
                .collect(),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref().map(String::as_str)
    }

    pub fn retired(&self) -> impl Iterator<Item = &str> {
        self.retired.iter().map(|r| r.as_str())
    }

    /// All values accepted on reads, current first.
    pub fn candidates(&self) -> Vec<&str> {
        self.current().into_iter().chain(self.retired()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.retired.is_empty()
    }

    pub fn rotate(&mut self, next: impl Into<String>) {
        let next = next.into();
        if next.is_empty() {
            return;
        }

        self.retired.retain(|r| r.as_str() != next);
        if let Some(previous) = self.current.replace(Zeroizing::new(next)) {
            self.retired.insert(0, previous);
        }
    }

    /// Stop accepting `old` on reads. Returns whether anything was removed.
    /// The current value can not be retired, rotate first.
    pub fn retire(&mut self, old: &str) -> bool {
        let before = self.retired.len();
        self.retired.retain(|r| r.as_str() != old);
        before != self.retired.len()
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing")
            .field("current", &self.current.as_ref().map(|_| "[REDACTED]"))
            .field("retired", &self.retired.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::KeyRing;

    #[test]
    fn candidates_put_current_first() {
        let ring = KeyRing::new(
            Some("new".into()),
            vec!["old".into(), "".into(), "older".into()],
        );
        assert_eq!(ring.candidates(), vec!["new", "old", "older"]);
        assert!(KeyRing::new(Some("".into()), vec![]).is_empty());
    }

    #[test]
    fn two_step_rotation() {
        let mut ring = KeyRing::new(Some("s1".into()), vec![]);

        ring.rotate("s2");
        assert_eq!(ring.current(), Some("s2"));
        assert_eq!(ring.candidates(), vec!["s2", "s1"]);

        assert!(!ring.retire("s2"));
        assert!(ring.retire("s1"));
        assert_eq!(ring.candidates(), vec!["s2"]);
        assert!(!ring.retire("s1"));
    }

    #[test]
    fn rotating_back_to_a_retired_value_does_not_duplicate_it() {
        let mut ring = KeyRing::new(Some("a".into()), vec!["b".into()]);
        ring.rotate("b");
        assert_eq!(ring.candidates(), vec!["b", "a"]);
    }

    #[test]
    fn debug_hides_material() {
        let ring = KeyRing::new(Some("top-secret".into()), vec!["old-secret".into()]);
        let printed = format!("{ring:?}");
        assert!(!printed.contains("secret"));
    }
}
