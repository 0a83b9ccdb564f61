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

//! # Multi-Sheet Workbook Export
//!
//! Text stand-in for the `xlsx` format: a Summary sheet followed by one sheet
//! per analytical dimension, each a standalone CSV table. Every sheet starts
//! with a `# Sheet: <name>` marker line and sheets are separated by a line of
//! eighty `=` characters.
//!
//! Dimension sheets lead with `ID` and `Name` so rows can be joined across
//! sheets.

use crate::config::PrCExportConfig;
use crate::errors::{PrError, Result};
use crate::export::tabular::{PrFCsvLine, PrFQuoteCsv, PR_CSV_MIME};
use crate::flatten::{PrCDimension, PrCFlatRow, PrFFieldIndex, PrFFieldIndices, PR_FLAT_FIELDS};
use crate::metadata::{PrCExportMetadata, PrFFormatPercent};
use crate::serializer::{PrCPayload, PrCSerializer};

pub const PR_SHEET_MARKER: &str = "# Sheet: ";

/// Line placed between sheets.
#[allow(non_snake_case)]
pub fn PrFSheetSeparator() -> String {
    "=".repeat(80)
}

/// A named sheet: title plus CSV body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrCSheet {
    pub name: String,
    pub csv: String,
}

#[derive(Debug, Clone)]
pub struct PrCWorkbookSerializer {
    file_stem: String,
}

impl PrCWorkbookSerializer {
    #[allow(non_snake_case)]
    pub fn PrFNew(config: &PrCExportConfig) -> Self {
        Self {
            file_stem: config.file_stem.clone(),
        }
    }

    fn summary_sheet(metadata: &PrCExportMetadata) -> PrCSheet {
        let mut lines = vec!["Metric,Value".to_string()];
        let mut push = |metric: &str, value: String| {
            lines.push(format!("{},{}", PrFQuoteCsv(metric), value));
        };
        push("Export Date", PrFQuoteCsv(&metadata.PrFGeneratedAt()));
        push("Total Records", metadata.total_records.to_string());
        push("Average Quality Score (%)", PrFFormatPercent(metadata.average_quality_score));
        push("Confidence Threshold", metadata.confidence_threshold.to_string());
        push("Undefined Data (%)", PrFFormatPercent(metadata.undefined_data_percentage));
        for (key, value) in metadata.PrFFilterPairs() {
            push(&format!("Filter: {}", key), PrFQuoteCsv(&value));
        }
        PrCSheet {
            name: "Summary".to_string(),
            csv: lines.join("\n") + "\n",
        }
    }

    fn dimension_sheet(dimension: PrCDimension, rows: &[PrCFlatRow]) -> Result<PrCSheet> {
        let identity = ["ID", "Name"]
            .iter()
            .map(|name| {
                PrFFieldIndex(name)
                    .ok_or_else(|| PrError::internal(format!("field '{}' missing from layout", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        let columns: Vec<usize> = identity
            .into_iter()
            .chain(PrFFieldIndices(dimension))
            .collect();

        let mut csv = columns
            .iter()
            .map(|&index| PR_FLAT_FIELDS[index].name)
            .collect::<Vec<_>>()
            .join(",");
        csv.push('\n');
        for row in rows {
            csv.push_str(&PrFCsvLine(row, &columns));
            csv.push('\n');
        }
        Ok(PrCSheet {
            name: dimension.PrFTitle().to_string(),
            csv,
        })
    }

    /// Builds all sheets in workbook order.
    #[allow(non_snake_case)]
    pub fn PrFSheets(rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> Result<Vec<PrCSheet>> {
        let mut sheets = vec![Self::summary_sheet(metadata)];
        for dimension in PrCDimension::ANALYTICAL {
            sheets.push(Self::dimension_sheet(dimension, rows)?);
        }
        Ok(sheets)
    }
}

impl PrCSerializer for PrCWorkbookSerializer {
    fn name(&self) -> &'static str {
        "workbook"
    }

    fn serialize(&self, rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> Result<PrCPayload> {
        let separator = format!("{}\n", PrFSheetSeparator());
        let text = Self::PrFSheets(rows, metadata)?
            .iter()
            .map(|sheet| format!("{}{}\n{}", PR_SHEET_MARKER, sheet.name, sheet.csv))
            .collect::<Vec<_>>()
            .join(&separator);
        Ok(PrCPayload::PrFText(text, PR_CSV_MIME, format!("{}.xlsx.csv", self.file_stem)))
    }
}

/// Splits a workbook payload back into its sheets. Marker and separator
/// lines only count as boundaries outside a quoted cell.
#[allow(non_snake_case)]
pub fn PrFSplitSheets(text: &str) -> Result<Vec<PrCSheet>> {
    let separator = PrFSheetSeparator();
    let mut sheets = Vec::new();
    let mut current: Option<PrCSheet> = None;
    let mut in_quotes = false;
    for line in text.lines() {
        if !in_quotes {
            if line == separator {
                sheets.extend(current.take());
                continue;
            }
            if let Some(name) = line.strip_prefix(PR_SHEET_MARKER) {
                sheets.extend(current.take());
                current = Some(PrCSheet {
                    name: name.to_string(),
                    csv: String::new(),
                });
                continue;
            }
        }
        if line.matches('"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
        match current.as_mut() {
            Some(sheet) => {
                sheet.csv.push_str(line);
                sheet.csv.push('\n');
            }
            None if line.trim().is_empty() => {}
            None => {
                return Err(PrError::validation(format!(
                    "content before the first sheet marker: '{}'",
                    line
                )))
            }
        }
    }
    if in_quotes {
        return Err(PrError::validation("workbook ends inside a quoted cell"));
    }
    sheets.extend(current);
    Ok(sheets)
}
