use test_log::test;
use visited_link::VisitedLinks;

#[test]
fn fresh_table_reports_nothing_visited() -> visited_link::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Visited Links");

    let table = VisitedLinks::create(&path, 128)?;

    for url in (0..100).map(|_| nanoid::nanoid!()) {
        assert!(!table.is_visited(&url));
    }

    Ok(())
}
