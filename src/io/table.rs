//! CSV tables of point records.

use anyhow::{bail, Context, Result};
use hashbrown::HashSet;
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::{info, warn};

use super::open_input;
use crate::models::{CoordinateColumns, Properties, Record};

/// A CSV file: its header plus one record per row
#[derive(Debug, Clone)]
pub struct Table {
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    /// Load a CSV file (optionally gzipped) with a header row
    pub fn read(path: &Path, columns: &CoordinateColumns) -> Result<Self> {
        info!("Loading records from {}", path.display());
        let reader = open_input(path)?;
        Self::from_reader(reader, columns)
            .with_context(|| format!("Failed to read CSV {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R, columns: &CoordinateColumns) -> Result<Self> {
        // Short or long rows are kept; missing fields just leave coordinates unset
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();

        {
            let mut seen = HashSet::new();
            for column in &header {
                if !seen.insert(column.as_str()) {
                    bail!("duplicate column '{}' in header", column);
                }
            }
        }

        for column in [&columns.longitude, &columns.latitude] {
            if !header.contains(column) {
                warn!("Column '{}' not found; no record will be matched", column);
            }
        }

        let mut records = Vec::new();
        for result in csv_reader.records() {
            let row = result?;
            if row.len() != header.len() {
                warn!(
                    "Row {} has {} fields, header has {}",
                    records.len() + 1,
                    row.len(),
                    header.len()
                );
            }
            let properties: Properties = header
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect();
            records.push(Record::from_properties(properties, columns));
        }

        let without_point = records.iter().filter(|r| r.point.is_none()).count();
        if without_point > 0 {
            warn!(
                "{} of {} rows have no usable coordinates",
                without_point,
                records.len()
            );
        }

        info!("Loaded {} records", records.len());

        Ok(Self { header, records })
    }

    /// Header followed by any keys the records gained after loading
    pub fn output_header(&self, extra_keys: &[String]) -> Vec<String> {
        self.header
            .iter()
            .chain(extra_keys.iter().filter(|k| !self.header.contains(k)))
            .cloned()
            .collect()
    }

    /// Write the table with `extra_keys` as trailing columns
    pub fn write(&self, path: &Path, extra_keys: &[String]) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        self.to_writer(BufWriter::new(file), extra_keys)
            .with_context(|| format!("Failed to write CSV {}", path.display()))?;
        info!("Wrote {} rows to {}", self.records.len(), path.display());
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: W, extra_keys: &[String]) -> Result<()> {
        let header = self.output_header(extra_keys);
        let mut csv_writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);

        csv_writer.write_record(&header)?;
        for record in &self.records {
            csv_writer.write_record(
                header
                    .iter()
                    .map(|key| record.properties.get(key).unwrap_or("")),
            )?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
