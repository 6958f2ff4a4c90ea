mod common;

use test_log::test;
use visited_link::{SALT_SIZE, VisitedLinks};

#[test]
fn toggle_round_trip() -> visited_link::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = common::write_table(dir.path(), [0; SALT_SIZE], &[0; 16])?;

    let mut table = VisitedLinks::open_writable(&path)?;

    let url = "https://www.rust-lang.org/";
    assert!(!table.is_visited(url));

    // First toggle records the URL
    assert!(table.toggle(url)?);
    assert!(table.is_visited(url));

    // Second toggle is its own inverse
    assert!(!table.toggle(url)?);
    assert!(!table.is_visited(url));

    Ok(())
}

#[test]
fn toggle_keys_independent() -> visited_link::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = common::write_table(dir.path(), [0; SALT_SIZE], &[0; 16])?;

    let mut table = VisitedLinks::open_writable(&path)?;

    let a = "http://example.com/";
    let b = "https://www.rust-lang.org/";

    assert!(table.toggle(a)?);
    assert!(table.is_visited(a));
    assert!(!table.is_visited(b));

    assert!(table.toggle(b)?);
    assert!(table.is_visited(a));
    assert!(table.is_visited(b));

    assert!(!table.toggle(a)?);
    assert!(!table.is_visited(a));
    assert!(table.is_visited(b));

    Ok(())
}

#[test]
fn toggle_survives_reopen() -> visited_link::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Visited Links");

    {
        let mut table = VisitedLinks::create(&path, 64)?;
        assert!(table.toggle("https://www.rust-lang.org/")?);
    }

    let table = VisitedLinks::open(&path)?;
    assert!(table.is_visited("https://www.rust-lang.org/"));
    assert!(!table.is_visited("http://example.com/"));

    Ok(())
}
