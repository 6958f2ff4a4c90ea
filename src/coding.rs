// Copyright (c) 2024-present, visited-link-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::io::{Read, Write};

/// Trait to serialize stuff
pub trait Encode {
    /// Serializes into writer.
    fn encode_into<W: Write>(&self, writer: &mut W) -> std::io::Result<()>;

    /// Serializes into vector.
    #[allow(unused)]
    fn encode_into_vec(&self) -> Vec<u8> {
        let mut v = vec![];

        // NOTE: Writing into a Vec cannot fail
        #[allow(clippy::expect_used)]
        self.encode_into(&mut v).expect("cannot fail");

        v
    }
}

/// Trait to deserialize stuff
pub trait Decode {
    /// Deserializes from reader.
    fn decode_from<R: Read>(reader: &mut R) -> crate::Result<Self>
    where
        Self: Sized;
}
