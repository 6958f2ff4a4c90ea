use std::fs::File;
use std::path::{Path, PathBuf};
use visited_link::coding::Encode;
use visited_link::{Header, Salt, Slot};

/// Writes a table file with an explicit header, ignoring whether it is
/// consistent with the slot data.
pub fn write_file(dir: &Path, header: &Header, raw_slots: &[u64]) -> visited_link::Result<PathBuf> {
    let path = dir.join("Visited Links");
    let mut file = File::create(&path)?;

    header.encode_into(&mut file)?;

    for &raw in raw_slots {
        Slot::from_raw(raw).encode_into(&mut file)?;
    }

    file.sync_all()?;
    Ok(path)
}

/// Writes a well-formed table file whose length matches the slot data.
#[allow(unused)]
pub fn write_table(dir: &Path, salt: Salt, raw_slots: &[u64]) -> visited_link::Result<PathBuf> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let header = Header::new(raw_slots.len() as i32, salt);

    write_file(dir, &header, raw_slots)
}
