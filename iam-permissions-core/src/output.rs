//! Output sinks for fetched policy records.
//!
//! File modes append comma-separated pretty JSON; the file is deliberately not
//! wrapped in an enclosing array, so it matches the layout downstream tooling
//! already consumes (wrap in `[...]` to parse it as JSON).

use crate::error::ReportResult;
use crate::types::PolicyRecord;
use chrono::NaiveDate;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// How fetched records are emitted, chosen once per run from `--outputmode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// `"1"`: write only each record's `Statement` elements to the file.
    StatementsFile,
    /// `"2"`: write each full record to the file.
    FullRecordFile,
    /// Anything else: pretty-print each full record to stdout.
    Console,
}

impl OutputMode {
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "1" => Self::StatementsFile,
            "2" => Self::FullRecordFile,
            _ => Self::Console,
        }
    }

    pub fn writes_file(self) -> bool {
        !matches!(self, Self::Console)
    }
}

/// The per-user output file name: `iam_permissions_<user>_<DDMonYYYY>.json`.
pub fn output_file_name(user_name: &str, date: NaiveDate) -> String {
    format!("iam_permissions_{}_{}.json", user_name, date.format("%d%b%Y"))
}

/// Destination for one user's records: a mode plus the resolved file path.
///
/// Built fresh per user and threaded through the enumerator, so there is no
/// process-wide output state.
#[derive(Debug)]
pub struct OutputSink {
    mode: OutputMode,
    path: PathBuf,
}

impl OutputSink {
    pub fn for_user(mode: OutputMode, user_name: &str, date: NaiveDate) -> Self {
        Self {
            mode,
            path: PathBuf::from(output_file_name(user_name, date)),
        }
    }

    #[cfg(test)]
    fn at_path(mode: OutputMode, path: PathBuf) -> Self {
        Self { mode, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the output file. Called once before a user's records are
    /// written, so a rerun on the same day replaces the previous report.
    pub fn truncate(&self) -> ReportResult<()> {
        if self.mode.writes_file() {
            File::create(&self.path)?;
        }
        Ok(())
    }

    /// Emit one record according to the run's output mode.
    pub fn write(&self, record: &PolicyRecord) -> ReportResult<()> {
        match self.mode {
            OutputMode::Console => {
                println!("{}", serde_json::to_string_pretty(record)?);
                Ok(())
            }
            OutputMode::FullRecordFile => self.append_record(record),
            OutputMode::StatementsFile => self.append_statements(record),
        }
    }

    fn append_record(&self, record: &PolicyRecord) -> ReportResult<()> {
        let mut file = self.open_for_append()?;
        if file.metadata()?.len() != 0 {
            file.write_all(b"\n,")?;
        }
        serde_json::to_writer_pretty(&mut file, record)?;
        Ok(())
    }

    fn append_statements(&self, record: &PolicyRecord) -> ReportResult<()> {
        let statements = record.statements();
        if statements.is_empty() {
            return Ok(());
        }

        let mut file = self.open_for_append()?;
        if file.metadata()?.len() != 0 {
            file.write_all(b",\n")?;
        }
        for (i, statement) in statements.iter().enumerate() {
            if i > 0 {
                file.write_all(b",\n")?;
            }
            serde_json::to_writer_pretty(&mut file, statement)?;
        }
        Ok(())
    }

    fn open_for_append(&self) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}
