//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Prism.
//! The Prism project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::{PrError, Result};
use crate::record::{PrCEnrichedRecord, PrCRecordBatch};

/// Record file layouts understood by [`PrCRecordIO`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrCRecordFormat {
    /// A single JSON array of records.
    Json,
    /// One record object per line.
    Jsonl,
}

/// Loads enriched record batches, validating each record on the way in.
pub struct PrCRecordIO;

impl PrCRecordIO {
    #[allow(non_snake_case)]
    pub fn PrFDetectFormat(path: impl AsRef<Path>) -> Option<PrCRecordFormat> {
        let ext = path
            .as_ref()
            .extension()?
            .to_string_lossy()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(PrCRecordFormat::Json),
            "jsonl" | "ndjson" => Some(PrCRecordFormat::Jsonl),
            _ => None,
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFLoadAuto(path: impl AsRef<Path>) -> Result<PrCRecordBatch> {
        let format = Self::PrFDetectFormat(&path)
            .ok_or_else(|| PrError::validation("unable to detect record format from extension"))?;
        match format {
            PrCRecordFormat::Json => Self::PrFLoadJson(path),
            PrCRecordFormat::Jsonl => Self::PrFLoadJsonl(path),
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFLoadJson(path: impl AsRef<Path>) -> Result<PrCRecordBatch> {
        let text = fs::read_to_string(path)?;
        Self::PrFParseJson(&text)
    }

    /// Parses a JSON array of records. Errors name the 1-based index.
    #[allow(non_snake_case)]
    pub fn PrFParseJson(text: &str) -> Result<PrCRecordBatch> {
        let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
        values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let record: PrCEnrichedRecord = serde_json::from_value(value)
                    .map_err(|err| PrError::validation(format!("record {}: {}", idx + 1, err)))?;
                _checked(record, "record", idx + 1)
            })
            .collect()
    }

    #[allow(non_snake_case)]
    pub fn PrFLoadJsonl(path: impl AsRef<Path>) -> Result<PrCRecordBatch> {
        let file = File::open(path)?;
        Self::PrFLoadJsonlReader(BufReader::new(file))
    }

    /// Reads JSONL from any buffered reader; blank lines are skipped and
    /// errors name the 1-based line.
    #[allow(non_snake_case)]
    pub fn PrFLoadJsonlReader<R: BufRead>(reader: R) -> Result<PrCRecordBatch> {
        reader
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| match line {
                Ok(content) if content.trim().is_empty() => None,
                Ok(content) => Some(_parse_line(&content, idx + 1)),
                Err(err) => Some(Err(err.into())),
            })
            .collect()
    }

    #[allow(non_snake_case)]
    pub fn PrFWriteJsonl(path: impl AsRef<Path>, batch: &[PrCEnrichedRecord]) -> Result<()> {
        let file = File::create(path)?;
        Self::PrFWriteJsonlWriter(BufWriter::new(file), batch)
    }

    #[allow(non_snake_case)]
    pub fn PrFWriteJsonlWriter<W: Write>(mut writer: W, batch: &[PrCEnrichedRecord]) -> Result<()> {
        for record in batch {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn _parse_line(content: &str, line_no: usize) -> Result<PrCEnrichedRecord> {
    let record: PrCEnrichedRecord = serde_json::from_str(content)
        .map_err(|err| PrError::validation(format!("line {}: {}", line_no, err)))?;
    _checked(record, "line", line_no)
}

fn _checked(record: PrCEnrichedRecord, unit: &str, position: usize) -> Result<PrCEnrichedRecord> {
    record.PrFValidate().map_err(|err| match err {
        PrError::Validation { message } => PrError::validation(format!("{} {}: {}", unit, position, message)),
        other => other,
    })?;
    Ok(record)
}
