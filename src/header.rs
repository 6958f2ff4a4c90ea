// Copyright (c) 2024-present, visited-link-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{Decode, Encode};
use crate::fingerprint::{Salt, SALT_SIZE};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Magic constant identifying a visited link table file.
pub const SIGNATURE: i32 = 0x6b6e_4c56;

/// The only supported format version.
pub const VERSION: i32 = 3;

/// Size of the fixed file header in bytes.
pub const HEADER_SIZE: u64 = 24;

/// Size of one table slot in bytes.
pub const SLOT_SIZE: u64 = 8;

/// The file header failed validation
#[derive(Debug, Eq, PartialEq)]
pub enum FormatError {
    /// The first header field is not the magic constant
    BadSignature {
        /// Value found in the file
        got: i32,
    },

    /// Unsupported format version
    BadVersion {
        /// Value found in the file
        got: i32,
    },

    /// The occupied-slot counter exceeds the table length
    BadUsedCount {
        /// Occupied-slot counter found in the file
        used: i32,

        /// Table length found in the file
        length: i32,
    },

    /// The file size does not match the table length declared in the header
    BadFileSize {
        /// Actual file size in bytes
        got: u64,

        /// File size the header calls for (negative for a garbage length)
        expected: i64,
    },
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadSignature { got } => {
                write!(f, "bad signature: {got:x}, want: {SIGNATURE:x}")
            }
            Self::BadVersion { got } => write!(f, "bad version: {got}, want: {VERSION}"),
            Self::BadUsedCount { used, length } => {
                write!(f, "bad used count: {used}, table length is {length}")
            }
            Self::BadFileSize { got, expected } => {
                write!(f, "bad file size: {got}, want: {expected}")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// The fixed 24-byte header of a visited link table file.
///
/// All fields are stored little-endian, in declaration order, followed
/// immediately by `length` 8-byte slots.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    /// File format magic, must be [`SIGNATURE`]
    pub signature: i32,

    /// Format version, must be [`VERSION`]
    pub version: i32,

    /// Number of 8-byte slots in the table
    pub length: i32,

    /// Occupied slot count
    ///
    /// Maintained by the owning application; informational only and not
    /// required to be consistent with the number of non-zero slots.
    pub used: i32,

    /// Per-file salt mixed into every fingerprint
    pub salt: Salt,
}

impl Header {
    /// Creates a header for a fresh, empty table of `length` slots.
    #[must_use]
    pub fn new(length: i32, salt: Salt) -> Self {
        Self {
            signature: SIGNATURE,
            version: VERSION,
            length,
            used: 0,
            salt,
        }
    }

    /// Validates the header against the actual file size in bytes.
    ///
    /// Checks run in a fixed order: signature, version, used count, file
    /// size. The size equation `length * 8 + 24` is the sole structural
    /// integrity check of the format.
    pub fn validate(&self, file_size: u64) -> Result<(), FormatError> {
        if self.signature != SIGNATURE {
            return Err(FormatError::BadSignature {
                got: self.signature,
            });
        }

        if self.version != VERSION {
            return Err(FormatError::BadVersion { got: self.version });
        }

        if self.used > self.length {
            return Err(FormatError::BadUsedCount {
                used: self.used,
                length: self.length,
            });
        }

        // 8 bytes per slot plus the 24-byte header; a negative length can
        // never satisfy this, so it is rejected here as well
        let expected = i64::from(self.length) * 8 + 24;

        if expected < 0 || file_size != expected.cast_unsigned() {
            return Err(FormatError::BadFileSize {
                got: file_size,
                expected,
            });
        }

        Ok(())
    }

    /// Number of slots in the table.
    ///
    /// Meaningful after [`Header::validate`], which guarantees the length is
    /// non-negative.
    #[must_use]
    pub fn slot_count(&self) -> u64 {
        u64::from(self.length.cast_unsigned())
    }

    /// Byte offset of the given slot index.
    #[must_use]
    pub fn slot_offset(slot: u64) -> u64 {
        HEADER_SIZE + slot * SLOT_SIZE
    }
}

impl Encode for Header {
    fn encode_into<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<LittleEndian>(self.signature)?;
        writer.write_i32::<LittleEndian>(self.version)?;
        writer.write_i32::<LittleEndian>(self.length)?;
        writer.write_i32::<LittleEndian>(self.used)?;
        writer.write_all(&self.salt)?;
        Ok(())
    }
}

impl Decode for Header {
    fn decode_from<R: Read>(reader: &mut R) -> crate::Result<Self> {
        let signature = reader.read_i32::<LittleEndian>()?;
        let version = reader.read_i32::<LittleEndian>()?;
        let length = reader.read_i32::<LittleEndian>()?;
        let used = reader.read_i32::<LittleEndian>()?;

        let mut salt = [0; SALT_SIZE];
        reader.read_exact(&mut salt)?;

        Ok(Self {
            signature,
            version,
            length,
            used,
            salt,
        })
    }
}
