//! Properties that hold for any pair of files

use crate::common::assertions::assert_names;
use crate::common::sample_data::{self, events, hit_x, hit_y, run_number, track_px};
use crate::common::TestFixture;
use coldiff::{diff_files, CompareOptions, Status, TableBuilder, WriterOptions};
use std::path::PathBuf;

fn events_options() -> CompareOptions {
    CompareOptions::new(vec!["Events".to_string()])
}

/// Two files that differ in every way a table can differ
fn divergent_pair(fixture: &TestFixture) -> (PathBuf, PathBuf) {
    let mut y = hit_y();
    y[0][3] ^= 0xff;

    let a = fixture
        .create_file("a.cdf", vec![events().column("Only.first", vec![vec![1]])])
        .unwrap();
    let b = fixture
        .create_file(
            "b.cdf",
            vec![TableBuilder::new("Events", 1124)
                .column("Hit.x", hit_x())
                .column("Hit.y", y)
                .column("Track.px", track_px())
                .column("RunHeader.runNumber", run_number())
                .column("Only.second", vec![vec![2]])],
        )
        .unwrap();
    (a, b)
}

#[test]
fn test_swapping_files_swaps_only_lists() {
    let fixture = TestFixture::new().unwrap();
    let (a, b) = divergent_pair(&fixture);

    let forward = diff_files(&a, &b, &events_options()).unwrap();
    let backward = diff_files(&b, &a, &events_options()).unwrap();

    let forward = forward.table("Events").unwrap();
    let backward = backward.table("Events").unwrap();

    assert_names(&forward.only_in_first, &["Only.first"]);
    assert_names(&forward.only_in_second, &["Only.second"]);
    assert_names(&forward.differing, &["Hit.y"]);
    assert_eq!(&forward.swapped(), backward);
}

#[test]
fn test_file_against_itself_matches() {
    let fixture = TestFixture::new().unwrap();
    let (a, b) = divergent_pair(&fixture);

    for path in [&a, &b] {
        let report = diff_files(path, path, &events_options()).unwrap();
        assert_eq!(report.status(), Status::Match);
    }
}

#[test]
fn test_ignoring_everything_matches() {
    let fixture = TestFixture::new().unwrap();
    let (a, b) = divergent_pair(&fixture);

    // the empty string is a substring of every name
    let options = events_options().ignore(vec![String::new()]);
    let report = diff_files(&a, &b, &options).unwrap();
    assert_eq!(report.status(), Status::Match);
}

#[test]
fn test_ignore_applies_to_both_sides() {
    let fixture = TestFixture::new().unwrap();
    let (a, b) = divergent_pair(&fixture);

    let options = events_options().ignore(vec!["Only".to_string(), "Hit".to_string()]);
    for (first, second) in [(&a, &b), (&b, &a)] {
        let report = diff_files(first, second, &options).unwrap();
        assert_eq!(report.status(), Status::Match);
    }
}

#[test]
fn test_chunk_count_difference_is_content_difference() {
    let fixture = TestFixture::new().unwrap();
    let mut split = hit_x();
    let tail = split.pop().unwrap();
    split.last_mut().unwrap().extend(tail);

    let a = fixture.create_file("a.cdf", vec![events()]).unwrap();
    let b = fixture
        .create_file(
            "b.cdf",
            vec![TableBuilder::new("Events", 1124)
                .column("Hit.x", split)
                .column("Hit.y", hit_y())
                .column("Track.px", track_px())
                .column("RunHeader.runNumber", run_number())],
        )
        .unwrap();

    let report = diff_files(&a, &b, &events_options()).unwrap();
    assert_names(&report.table("Events").unwrap().differing, &["Hit.x"]);
}

#[test]
fn test_record_count_mismatch_marks_shared_columns_differing() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture
        .create_file("a.cdf", vec![events().column("Only.first", vec![vec![1]])])
        .unwrap();
    let b = fixture
        .create_file(
            "b.cdf",
            vec![TableBuilder::new("Events", 1000)
                .column("Hit.x", hit_x())
                .column("Hit.y", hit_y())
                .column("Track.px", track_px())
                .column("RunHeader.runNumber", run_number())],
        )
        .unwrap();

    // chunk bytes are identical, the record counts alone make them differ
    let report = diff_files(&a, &b, &events_options()).unwrap();
    assert_eq!(report.status(), Status::Mismatch);

    let diff = report.table("Events").unwrap();
    assert_names(
        &diff.differing,
        &["Hit.x", "Hit.y", "Track.px", "RunHeader.runNumber"],
    );
    assert_names(&diff.only_in_first, &["Only.first"]);
    assert!(diff.only_in_second.is_empty());

    let ignoring = events_options().ignore(vec!["Hit".to_string(), "Only".to_string()]);
    let report = diff_files(&a, &b, &ignoring).unwrap();
    assert_names(
        &report.table("Events").unwrap().differing,
        &["Track.px", "RunHeader.runNumber"],
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let fixture = TestFixture::new().unwrap();
    let (a, b) = divergent_pair(&fixture);

    let first = diff_files(&a, &b, &events_options()).unwrap();
    let second = diff_files(&a, &b, &events_options()).unwrap();
    assert_eq!(first.tables, second.tables);
}

#[test]
fn test_compression_does_not_affect_equality() {
    let fixture = TestFixture::new().unwrap();
    let zstd = fixture.create_file("zstd.cdf", vec![events()]).unwrap();
    let zlib = fixture
        .create_file_with("zlib.cdf", sample_data::zlib(), vec![events()])
        .unwrap();
    let raw = fixture
        .create_file_with("raw.cdf", WriterOptions::uncompressed(), vec![events()])
        .unwrap();

    for (first, second) in [(&zstd, &zlib), (&zlib, &raw), (&raw, &zstd)] {
        let report = diff_files(first, second, &events_options()).unwrap();
        assert_eq!(report.status(), Status::Match);
    }
}

#[test]
fn test_column_order_does_not_matter() {
    let fixture = TestFixture::new().unwrap();
    let a = fixture.create_file("a.cdf", vec![events()]).unwrap();
    let b = fixture
        .create_file(
            "b.cdf",
            vec![TableBuilder::new("Events", 1124)
                .column("RunHeader.runNumber", run_number())
                .column("Track.px", track_px())
                .column("Hit.y", hit_y())
                .column("Hit.x", hit_x())],
        )
        .unwrap();

    let report = diff_files(&a, &b, &events_options()).unwrap();
    assert_eq!(report.status(), Status::Match);
}
