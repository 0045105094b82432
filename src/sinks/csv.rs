//! CSV sink
//!
//! Writes a finished table to `<output-dir>/<label>--<yyyymmddHHMM>.csv`,
//! header line first, fields joined with `", "`.

use crate::types::{Result, Table};
use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write one table; returns the path of the created file.
    pub fn write(&self, label: &str, table: &Table) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let stamp = Local::now().format("%Y%m%d%H%M");
        let path = self.output_dir.join(format!("{}--{}.csv", label, stamp));
        write_table(&path, table)?;
        Ok(path)
    }
}

fn write_table(path: &Path, table: &Table) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", table.header.join(", "))?;
    for row in &table.rows {
        writeln!(writer, "{}", row.fields(table.kind).join(", "))?;
    }

    writer.flush()?;
    Ok(())
}
