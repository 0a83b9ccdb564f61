//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Prism.
//! The Prism project belongs to the Dunimd project team.
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

//! # Tabular (CSV) Export
//!
//! One header line with the fixed field order, one line per record, then a
//! blank line and a `#`-prefixed metadata block. Text cells are always
//! double-quoted with embedded quotes doubled; scores are bare numbers with
//! three decimals.
//!
//! [`PrCTabularReader`] reads such a file back, stopping at the first blank
//! line outside a quoted cell.

use csv::ReaderBuilder;

use crate::config::PrCExportConfig;
use crate::errors::{PrError, Result};
use crate::flatten::{PrCFieldKind, PrCFieldSpec, PrCFlatRow, PrCFlatValue, PrFFieldNames};
use crate::metadata::PrCExportMetadata;
use crate::serializer::{PrCPayload, PrCSerializer};

pub const PR_CSV_MIME: &str = "text/csv;charset=utf-8";

/// Wraps a value in double quotes, doubling embedded quotes.
#[allow(non_snake_case)]
pub fn PrFQuoteCsv(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Renders one cell according to its field kind.
#[allow(non_snake_case)]
pub fn PrFCsvCell(spec: &PrCFieldSpec, value: &PrCFlatValue) -> String {
    match (spec.kind, value) {
        (PrCFieldKind::Score, PrCFlatValue::Number(_)) => value.PrFRender(),
        _ => PrFQuoteCsv(&value.PrFRender()),
    }
}

/// Renders the selected columns of a row as a CSV line, without newline.
#[allow(non_snake_case)]
pub fn PrFCsvLine(row: &PrCFlatRow, columns: &[usize]) -> String {
    let fields: Vec<_> = row.PrFFields().collect();
    columns
        .iter()
        .map(|&index| {
            let (spec, value) = fields[index];
            PrFCsvCell(spec, value)
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// `#` comment lines describing the export, shared with other text formats.
#[allow(non_snake_case)]
pub fn PrFMetadataComment(metadata: &PrCExportMetadata) -> Vec<String> {
    vec![
        "# Export Metadata".to_string(),
        format!("# Export Date: {}", metadata.PrFGeneratedAt()),
        format!("# Total Records: {}", metadata.total_records),
        format!("# Average Quality Score: {}", metadata.PrFQualityDisplay()),
        format!("# Confidence Threshold: {}", metadata.confidence_threshold),
        format!("# Undefined Data: {}", metadata.PrFUndefinedDisplay()),
    ]
}

#[derive(Debug, Clone)]
pub struct PrCTabularSerializer {
    file_stem: String,
}

impl PrCTabularSerializer {
    #[allow(non_snake_case)]
    pub fn PrFNew(config: &PrCExportConfig) -> Self {
        Self {
            file_stem: config.file_stem.clone(),
        }
    }
}

impl PrCSerializer for PrCTabularSerializer {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn serialize(&self, rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> Result<PrCPayload> {
        let columns: Vec<usize> = (0..PrFFieldNames().len()).collect();
        let mut out = String::new();
        out.push_str(&PrFFieldNames().join(","));
        out.push('\n');
        for row in rows {
            out.push_str(&PrFCsvLine(row, &columns));
            out.push('\n');
        }
        out.push('\n');
        for line in PrFMetadataComment(metadata) {
            out.push_str(&line);
            out.push('\n');
        }
        Ok(PrCPayload::PrFText(out, PR_CSV_MIME, format!("{}.csv", self.file_stem)))
    }
}

/// Reads CSV produced by [`PrCTabularSerializer`] back into rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrCTabularReader;

impl PrCTabularReader {
    #[allow(non_snake_case)]
    pub fn PrFParse(text: &str) -> Result<Vec<PrCFlatRow>> {
        let table = Self::PrFTableSection(text);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .comment(Some(b'#'))
            .from_reader(table.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers != PrFFieldNames() {
            return Err(PrError::validation("CSV header does not match the export field order"));
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let cells: Vec<&str> = record.iter().collect();
            let row = PrCFlatRow::PrFFromTextCells(&cells)
                .map_err(|e| PrError::validation(format!("row {}: {}", index + 1, e)))?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Text up to the first blank line that is not inside a quoted cell.
    #[allow(non_snake_case)]
    pub fn PrFTableSection(text: &str) -> &str {
        let mut in_quotes = false;
        let mut line_start = 0;
        for (index, ch) in text.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                '\n' if !in_quotes => {
                    if text[line_start..index].trim_end_matches('\r').is_empty() {
                        return &text[..line_start];
                    }
                    line_start = index + 1;
                }
                _ => {}
            }
        }
        text
    }

    /// `(key, value)` pairs from the trailing `# Key: Value` block.
    #[allow(non_snake_case)]
    pub fn PrFParseMetadataBlock(text: &str) -> Vec<(String, String)> {
        let table_len = Self::PrFTableSection(text).len();
        text[table_len..]
            .lines()
            .filter_map(|line| line.strip_prefix("# "))
            .filter_map(|line| line.split_once(": "))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }
}
