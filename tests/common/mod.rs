//! Common test utilities and helpers

use coldiff::container::compression::Algorithm;
use coldiff::container::format::{self, Directory, TRAILER_LEN};
use coldiff::{ContainerWriter, Result, Status, TableBuilder, WriterOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary container files
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write a container file with default (zstd) compression
    pub fn create_file(&self, name: &str, tables: Vec<TableBuilder>) -> Result<PathBuf> {
        self.create_file_with(name, WriterOptions::default(), tables)
    }

    pub fn create_file_with(
        &self,
        name: &str,
        options: WriterOptions,
        tables: Vec<TableBuilder>,
    ) -> Result<PathBuf> {
        let mut writer = ContainerWriter::create(self.path(name), options)?;
        for table in tables {
            writer.write_table(table)?;
        }
        writer.finish()
    }

    /// Re-serialize the table directory of an existing file after applying `edit`
    pub fn rewrite_directory(&self, path: &Path, edit: impl FnOnce(&mut Directory)) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let trailer_at = bytes.len() - TRAILER_LEN as usize;
        let (offset, length) = format::decode_trailer(&bytes[trailer_at..])?;
        let (offset, length) = (offset as usize, length as usize);

        let mut directory: Directory = serde_json::from_slice(&bytes[offset..offset + length])?;
        edit(&mut directory);
        let json = serde_json::to_vec(&directory)?;

        let mut out = bytes[..offset].to_vec();
        out.extend_from_slice(&json);
        out.extend(format::encode_trailer(offset as u64, json.len() as u64));
        std::fs::write(path, out)?;
        Ok(())
    }

    /// Create a file that is not a container at all
    pub fn create_corrupted_file(&self, name: &str) -> Result<PathBuf> {
        let path = self.path(name);
        std::fs::write(&path, b"\x00\x01\x02\x03invalid_data\xff\xfe padded past the trailer")?;
        Ok(path)
    }
}

/// Helper for running the CLI in-process
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Parse and execute a command line, returning the exit status it maps to
    pub fn run(&self, args: &[&str]) -> Status {
        use clap::Parser;
        use coldiff::cli::Cli;
        use coldiff::commands::execute_command;

        let mut cmd_args = vec!["coldiff"];
        cmd_args.extend(args);

        match Cli::try_parse_from(cmd_args) {
            Ok(cli) => execute_command(cli),
            Err(_) => Status::FailedToRun,
        }
    }

    pub fn exit_code(&self, args: &[&str]) -> i32 {
        self.run(args).exit_code()
    }
}

/// Sample tables for testing
pub mod sample_data {
    use super::*;

    pub fn hit_x() -> Vec<Vec<u8>> {
        vec![pattern(0, 512), pattern(1, 512), pattern(2, 100)]
    }

    pub fn hit_y() -> Vec<Vec<u8>> {
        vec![pattern(3, 512), pattern(4, 512), pattern(5, 100)]
    }

    pub fn track_px() -> Vec<Vec<u8>> {
        vec![pattern(6, 2048), pattern(7, 300)]
    }

    pub fn run_number() -> Vec<Vec<u8>> {
        vec![vec![0, 0, 0, 42]]
    }

    /// Deterministic, compressible chunk content
    pub fn pattern(seed: u8, len: usize) -> Vec<u8> {
        (0..len).map(|i| seed.wrapping_mul(31).wrapping_add((i % 13) as u8)).collect()
    }

    /// "Events" with hits, a track and a run header
    pub fn events() -> TableBuilder {
        TableBuilder::new("Events", 1124)
            .column("Hit.x", hit_x())
            .column("Hit.y", hit_y())
            .column("Track.px", track_px())
            .column("RunHeader.runNumber", run_number())
    }

    pub fn run() -> TableBuilder {
        TableBuilder::new("Run", 1)
            .column("RunHeader.runNumber", run_number())
            .column("RunHeader.numEvents", vec![vec![0, 0, 4, 100]])
    }

    pub fn zlib() -> WriterOptions {
        WriterOptions::compressed(Algorithm::Zlib, 6)
    }
}

/// Assertion helpers for diff results
pub mod assertions {
    use coldiff::TableDiff;

    pub fn assert_names(actual: &[String], expected: &[&str]) {
        let actual: Vec<&str> = actual.iter().map(String::as_str).collect();
        assert_eq!(actual, expected);
    }

    /// No name appears in any of the three lists
    pub fn assert_absent(diff: &TableDiff, name: &str) {
        for list in [&diff.only_in_first, &diff.only_in_second, &diff.differing] {
            assert!(
                !list.iter().any(|n| n == name),
                "'{}' should not be reported, got {:?}",
                name,
                diff
            );
        }
    }
}
