// Copyright (c) 2024-present, visited-link-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Reader and updater for Chromium "Visited Links" table files.
//!
//! Chromium records which URLs a profile has visited in an on-disk,
//! open-addressed hash table (the `Visited Links` file inside a profile
//! directory). Each URL is reduced to a 64-bit fingerprint by hashing it
//! together with a per-file salt; the fingerprint's residue modulo the table
//! length selects a slot, and collisions are resolved by linear probing.
//!
//! This crate parses and validates the fixed 24-byte file header, probes the
//! slot region to answer "is this URL visited", and can toggle the visited
//! state of a URL in place with fsync durability.
//!
//! ```no_run
//! # fn main() -> visited_link::Result<()> {
//! let table = visited_link::VisitedLinks::open("Visited Links")?;
//!
//! for url in ["https://www.rust-lang.org/", "https://example.com/"] {
//!     println!("{url}: {}", table.is_visited(url));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The table is never cached in memory: every lookup re-reads the file, so
//! mutations by an external writer (e.g. a running browser) are observed.

#![deny(clippy::all, missing_docs)]
#![warn(clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]

#[doc(hidden)]
pub mod coding;

mod error;
mod fingerprint;
mod header;
mod slot;
mod table;

pub use crate::{
    error::{Error, Result},
    fingerprint::{Fingerprint, Salt, SALT_SIZE},
    header::{FormatError, Header, HEADER_SIZE, SIGNATURE, SLOT_SIZE, VERSION},
    slot::Slot,
    table::VisitedLinks,
};
