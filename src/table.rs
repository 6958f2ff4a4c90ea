// Copyright (c) 2024-present, visited-link-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::{Decode, Encode};
use crate::fingerprint::{Fingerprint, Salt};
use crate::header::{Header, SLOT_SIZE};
use crate::slot::Slot;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::Path;

/// An open visited link table file.
///
/// The handle is exclusively owned for the lifetime of this value and closed
/// on drop, on every exit path. Slot contents are never cached: each lookup
/// re-reads the file, so writes by an external process are observed on the
/// next query.
pub struct VisitedLinks {
    file: File,
    header: Header,
}

impl VisitedLinks {
    /// Opens a table file read-only.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or its header does not validate.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Self::from_file(File::open(path)?)
    }

    /// Opens a table file read-write, allowing [`VisitedLinks::toggle`].
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or its header does not validate.
    pub fn open_writable<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::from_file(file)
    }

    /// Creates a fresh, zero-filled table of `slot_count` slots with a
    /// random salt, returning a writable handle to it.
    ///
    /// # Errors
    ///
    /// Fails if the file already exists or cannot be written.
    pub fn create<P: AsRef<Path>>(path: P, slot_count: u32) -> crate::Result<Self> {
        let length = i32::try_from(slot_count).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "slot count exceeds i32::MAX",
            )
        })?;

        let salt: Salt = rand::random();
        let header = Header::new(length, salt);

        let mut file = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)?;

        header.encode_into(&mut file)?;

        let slot_bytes = u64::from(slot_count) * SLOT_SIZE;
        std::io::copy(
            &mut std::io::Read::take(std::io::repeat(0), slot_bytes),
            &mut file,
        )?;

        file.sync_all()?;

        log::debug!("created visited link table with {slot_count} slots");

        Ok(Self { file, header })
    }

    fn from_file(file: File) -> crate::Result<Self> {
        let header = Header::decode_from(&mut &file)?;
        header.validate(file.metadata()?.len())?;

        log::debug!(
            "opened visited link table: {} slots, {} used",
            header.slot_count(),
            header.used,
        );

        Ok(Self { file, header })
    }

    /// Returns the parsed and validated file header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns whether `url` is recorded as visited.
    ///
    /// I/O failures while probing degrade to `false` (conservatively "not
    /// visited") instead of surfacing an error; that includes a probe chain
    /// running off the end of the table, which the format does not wrap.
    #[must_use]
    pub fn is_visited<K: AsRef<[u8]>>(&self, url: K) -> bool {
        let fp = Fingerprint::of(&self.header.salt, url);

        let Some(start_slot) = self.start_slot(fp) else {
            return false;
        };

        probe(&self.file, fp, start_slot)
    }

    /// Toggles the visited state of `url`, returning the new state (`true`
    /// if the URL is now recorded as visited).
    ///
    /// The slot write is fsynced before this returns, so a crash afterwards
    /// cannot lose it. The informational `used` counter in the header is
    /// deliberately left untouched.
    ///
    /// # Errors
    ///
    /// Any seek/read/write failure aborts the operation. No write is issued
    /// before a terminal slot is found, so a failed toggle leaves the table
    /// unchanged. A chain of foreign fingerprints reaching the end of the
    /// table (or a zero-length table) fails with an `UnexpectedEof` I/O
    /// error, as the scan does not wrap around.
    pub fn toggle<K: AsRef<[u8]>>(&mut self, url: K) -> crate::Result<bool> {
        let fp = Fingerprint::of(&self.header.salt, url.as_ref());

        let Some(start_slot) = self.start_slot(fp) else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "table has no slots",
            )
            .into());
        };

        toggle(&self.file, fp, start_slot)
    }

    /// Slot index where the probe chain for `fp` begins.
    fn start_slot(&self, fp: Fingerprint) -> Option<u64> {
        let count = self.header.slot_count();
        (count > 0).then(|| fp.into_u64() % count)
    }
}

/// Linear-probe scan for `fp`, reading consecutive slots from `start_slot`.
///
/// Terminates on an empty slot, a matching fingerprint, or any I/O error
/// (end-of-file included); only a match reports `true`.
fn probe(mut file: &File, fp: Fingerprint, start_slot: u64) -> bool {
    if file
        .seek(SeekFrom::Start(Header::slot_offset(start_slot)))
        .is_err()
    {
        return false;
    }

    loop {
        let Ok(slot) = Slot::decode_from(&mut file) else {
            return false;
        };

        match slot {
            Slot::Empty => return false,
            _ if slot.matches(fp) => return true,
            Slot::Occupied(_) => {}
        }
    }
}

/// Linear-probe update for `fp` starting at `start_slot`.
///
/// Writes the terminal slot at its own byte offset (the sequential scan has
/// already advanced past it) and fsyncs before returning.
fn toggle(mut file: &File, fp: Fingerprint, start_slot: u64) -> crate::Result<bool> {
    let mut slot_index = start_slot;

    file.seek(SeekFrom::Start(Header::slot_offset(start_slot)))?;

    loop {
        let slot = Slot::decode_from(&mut file)?;

        match slot {
            Slot::Empty => {
                log::trace!("recording {fp} in slot {slot_index}");
                write_slot(file, slot_index, Slot::Occupied(fp))?;
                return Ok(true);
            }
            _ if slot.matches(fp) => {
                log::trace!("clearing {fp} from slot {slot_index}");
                write_slot(file, slot_index, Slot::Empty)?;
                return Ok(false);
            }
            Slot::Occupied(_) => slot_index += 1,
        }
    }
}

fn write_slot(mut file: &File, slot_index: u64, value: Slot) -> crate::Result<()> {
    file.seek(SeekFrom::Start(Header::slot_offset(slot_index)))?;
    value.encode_into(&mut file)?;

    // Durability: after a crash, at most the single in-flight write is lost,
    // never an invisibly buffered one
    file.sync_all()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::Encode;
    use crate::fingerprint::SALT_SIZE;
    use crate::Error;
    use std::io::Write;
    use std::path::PathBuf;
    use test_log::test;

    const ZERO_SALT: Salt = [0; SALT_SIZE];

    fn write_raw_table(dir: &Path, salt: Salt, slots: &[u64]) -> crate::Result<PathBuf> {
        let path = dir.join("Visited Links");
        let mut file = File::create(&path)?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        Header::new(slots.len() as i32, salt).encode_into(&mut file)?;

        for &raw in slots {
            Slot::from_raw(raw).encode_into(&mut file)?;
        }

        file.sync_all()?;
        Ok(path)
    }

    #[test]
    fn probe_chain_stops_at_empty() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;

        // Searched-for fingerprint 8 maps to slot 0 (8 % 4), which starts a
        // chain of two foreign entries terminated by an empty slot
        let path = write_raw_table(dir.path(), ZERO_SALT, &[4, 12, 0, 0])?;
        let file = File::open(path)?;

        assert!(!probe(&file, Fingerprint::from_raw(8), 0));
        assert!(probe(&file, Fingerprint::from_raw(4), 0));
        assert!(probe(&file, Fingerprint::from_raw(12), 0));

        Ok(())
    }

    #[test]
    fn probe_finds_displaced_entry() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;

        let path = write_raw_table(dir.path(), ZERO_SALT, &[4, 12, 8, 0])?;
        let file = File::open(path)?;

        assert!(probe(&file, Fingerprint::from_raw(8), 0));

        Ok(())
    }

    #[test]
    fn probe_does_not_wrap_around() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;

        // Both slots hold foreign entries; the scan runs off the end of the
        // file instead of wrapping to slot 0
        let path = write_raw_table(dir.path(), ZERO_SALT, &[4, 12])?;
        let file = File::open(&path)?;

        assert!(!probe(&file, Fingerprint::from_raw(8), 0));

        let writable = OpenOptions::new().read(true).write(true).open(&path)?;
        let before = std::fs::read(&path)?;

        assert!(matches!(
            toggle(&writable, Fingerprint::from_raw(8), 0),
            Err(Error::Io(_)),
        ));

        // A failed toggle leaves the table untouched
        assert_eq!(before, std::fs::read(&path)?);

        Ok(())
    }

    #[test]
    fn toggle_writes_at_terminal_slot_offset() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;

        let path = write_raw_table(dir.path(), ZERO_SALT, &[4, 12, 0, 0])?;
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        // Scan passes slots 0 and 1 before claiming the empty slot 2
        assert!(toggle(&file, Fingerprint::from_raw(8), 0)?);

        let bytes = std::fs::read(&path)?;
        assert_eq!(
            Some(8u64.to_le_bytes().as_slice()),
            bytes.get(40..48),
            "fingerprint must land at slot 2's own offset",
        );

        // Toggling again clears the same slot
        assert!(!toggle(&file, Fingerprint::from_raw(8), 0)?);

        let bytes = std::fs::read(&path)?;
        assert_eq!(Some(0u64.to_le_bytes().as_slice()), bytes.get(40..48));

        Ok(())
    }

    #[test]
    fn zero_length_table() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;

        let path = write_raw_table(dir.path(), ZERO_SALT, &[])?;
        assert_eq!(24, std::fs::metadata(&path)?.len());

        let mut table = VisitedLinks::open_writable(&path)?;
        assert!(!table.is_visited("http://example.com/"));
        assert!(matches!(
            table.toggle("http://example.com/"),
            Err(Error::Io(_)),
        ));

        Ok(())
    }

    #[test]
    fn create_then_reopen() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Visited Links");

        {
            let table = VisitedLinks::create(&path, 8)?;
            assert_eq!(8, table.header().slot_count());
            assert_eq!(0, table.header().used);
        }

        assert_eq!(24 + 8 * 8, std::fs::metadata(&path)?.len());

        let table = VisitedLinks::open(&path)?;
        assert!(!table.is_visited("https://www.rust-lang.org/"));

        Ok(())
    }

    #[test]
    fn create_refuses_to_overwrite() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("Visited Links");

        let mut file = File::create(&path)?;
        file.write_all(b"not a table")?;
        drop(file);

        assert!(matches!(
            VisitedLinks::create(&path, 8),
            Err(Error::Io(_)),
        ));

        Ok(())
    }
}
