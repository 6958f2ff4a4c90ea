// Copyright (c) 2024-present, visited-link-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{Decode, Encode};
use crate::fingerprint::Fingerprint;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// One 8-byte cell of the on-disk table.
///
/// The wire format marks an empty cell with the literal value `0`. A real
/// fingerprint of exactly zero would be indistinguishable from an empty
/// slot; the format assumes such a fingerprint never occurs (a 1-in-2^64
/// salted-digest outcome) rather than escaping it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Slot {
    /// Cell holds no entry, terminating every probe chain through it
    Empty,

    /// Cell holds the fingerprint of a visited URL
    Occupied(Fingerprint),
}

impl Slot {
    /// Interprets a raw slot value.
    #[must_use]
    pub fn from_raw(value: u64) -> Self {
        if value == 0 {
            Self::Empty
        } else {
            Self::Occupied(Fingerprint::from_raw(value))
        }
    }

    /// Returns the raw wire value.
    #[must_use]
    pub fn to_raw(self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Occupied(fp) => fp.into_u64(),
        }
    }

    /// Whether this slot matches the searched-for fingerprint.
    #[must_use]
    pub fn matches(self, fp: Fingerprint) -> bool {
        self == Self::Occupied(fp)
    }
}

impl Encode for Slot {
    fn encode_into<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u64::<LittleEndian>(self.to_raw())
    }
}

impl Decode for Slot {
    fn decode_from<R: Read>(reader: &mut R) -> crate::Result<Self> {
        Ok(Self::from_raw(reader.read_u64::<LittleEndian>()?))
    }
}
