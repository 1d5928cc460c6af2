use crate::core::incentive::IncentiveResult;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub trait Output: Debug {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location key to `<file_stem>__<location_key>.json` inside a directory.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_stem: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_stem: String) -> Self {
        Self {
            directory_path,
            file_stem,
        }
    }

    pub fn path_for_location_key(&self, location_key: &str) -> PathBuf {
        self.directory_path
            .join(format!("{}__{location_key}.json", self.file_stem))
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(
            self.path_for_location_key(location_key),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(&self, location_key: &str) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}

pub const RESULT_LOCATION_KEY: &str = "result";

/// Write the JSON export of a result under the given location key.
pub fn write_result(
    output: &impl Output,
    location_key: &str,
    result: &IncentiveResult,
) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }
    let mut writer = output.writer_for_location_key(location_key)?;
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

pub fn result_to_json(result: &IncentiveResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

pub fn result_from_json(json: &str) -> Result<IncentiveResult, serde_json::Error> {
    serde_json::from_str(json)
}

/// Format an amount in euro the Italian way, e.g. `1.234,56 €`.
pub fn format_eur(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (idx, digit) in integer_part.chars().enumerate() {
        if idx > 0 && (integer_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0. && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped},{decimal_part} €")
}
