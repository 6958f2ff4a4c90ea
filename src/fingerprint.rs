// Copyright (c) 2024-present, visited-link-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use md5::{Digest, Md5};

/// Number of salt bytes mixed into every fingerprint.
pub const SALT_SIZE: usize = 8;

/// Per-file random salt.
///
/// Prevents precomputing fingerprints for a table one has never seen.
pub type Salt = [u8; SALT_SIZE];

/// A 64-bit table search key derived from a salted digest of a URL.
///
/// Not persisted on its own; it is recomputed from `(salt, url)` on every
/// lookup.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Computes the fingerprint of `key` under the given salt.
    ///
    /// The file format keys its table on the first 8 bytes of
    /// `MD5(salt || key)`, read as a little-endian word. The exact digest and
    /// truncation rule are load-bearing; any other hash would produce a table
    /// incompatible with Chromium's.
    #[must_use]
    pub fn of<K: AsRef<[u8]>>(salt: &Salt, key: K) -> Self {
        // Fresh context per call, never shared mutable hashing state
        let mut hasher = Md5::new();
        hasher.update(salt);
        hasher.update(key.as_ref());
        let digest = hasher.finalize();

        // NOTE: cannot fail, an MD5 digest is 16 bytes
        #[allow(clippy::expect_used)]
        let word = *digest
            .as_slice()
            .first_chunk::<8>()
            .expect("MD5 digest is 16 bytes");

        Self(u64::from_le_bytes(word))
    }

    /// Wraps a raw slot value.
    #[must_use]
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw 64-bit integer.
    #[must_use]
    pub fn into_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
