//! Reading input tables and pre-groupings from files and writing the export table.

use crate::error::{Error, Result};
use crate::pregroup::PreGrouping;
use crate::result::GroupingResult;
use crate::table::Table;
use log::debug;
use std::path::Path;

/// File formats understood by the readers, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Tsv,
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Format> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Format::Csv),
            "tsv" | "tab" | "txt" => Ok(Format::Tsv),
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(Error::DataFormat(format!(
                "unreadable file extension '{}' of {}",
                ext,
                path.display()
            ))),
        }
    }
}

/// Read the cost table from a file, choosing the reader by extension.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    debug!("Reading {:?} table from {}", format, path.display());
    read_table_from(std::fs::File::open(path)?, format)
}

pub fn read_table_from<R: std::io::Read>(reader: R, format: Format) -> Result<Table> {
    match format {
        Format::Csv | Format::Tsv => {
            let (header, rows) = read_delimited(reader, format)?;
            Table::new(header, rows)
        }
        Format::Json => Ok(serde_json::from_reader(reader)?),
        Format::Yaml => Ok(serde_yaml::from_reader(reader)?),
    }
}

/// Read a pre-grouping from a file. Delimited files have a header and two columns, subject and
/// group; YAML and JSON files hold a list of `{subject, group}` entries.
pub fn read_pre_grouping<P: AsRef<Path>>(path: P) -> Result<PreGrouping> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    read_pre_grouping_from(std::fs::File::open(path)?, format)
}

pub fn read_pre_grouping_from<R: std::io::Read>(reader: R, format: Format) -> Result<PreGrouping> {
    match format {
        Format::Csv | Format::Tsv => {
            let (_header, rows) = read_delimited(reader, format)?;
            PreGrouping::from_rows(rows)
        }
        Format::Json => Ok(serde_json::from_reader(reader)?),
        Format::Yaml => Ok(serde_yaml::from_reader(reader)?),
    }
}

fn read_delimited<R: std::io::Read>(
    reader: R,
    format: Format,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(if format == Format::Tsv { b'\t' } else { b',' })
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let header = reader.headers()?.iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|record| Ok::<_, Error>(record?.iter().map(String::from).collect()))
        .collect::<Result<Vec<Vec<String>>>>()?;
    Ok((header, rows))
}

/// Write one `subject,group` line per subject as CSV.
pub fn write_export<W: std::io::Write>(writer: W, result: &GroupingResult) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([result.input().subject_column(), "group"])?;
    for row in result.export() {
        writer.write_record([row.subject.as_str(), row.group.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
