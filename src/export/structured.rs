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

//! # Structured (JSON) Export
//!
//! Emits `{metadata, data, summary}`. Each `data` entry is a flat row keyed
//! by field name in export order, with scores as JSON numbers at full
//! precision and flags as booleans, so parsing the document yields the same
//! rows.

use serde::{Deserialize, Serialize};

use crate::config::PrCExportConfig;
use crate::errors::Result;
use crate::flatten::{PrCDimension, PrCFlatRow};
use crate::metadata::PrCExportMetadata;
use crate::serializer::{PrCPayload, PrCSerializer};

pub const PR_JSON_MIME: &str = "application/json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrCStructuredSummary {
    pub total_records: usize,
    pub dimensions_covered: Vec<String>,
    pub export_version: String,
}

/// Parsed form of a JSON export.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PrCStructuredDocument {
    pub metadata: PrCExportMetadata,
    pub data: Vec<PrCFlatRow>,
    pub summary: PrCStructuredSummary,
}

#[derive(Serialize)]
struct DocumentView<'a> {
    metadata: &'a PrCExportMetadata,
    data: &'a [PrCFlatRow],
    summary: PrCStructuredSummary,
}

#[derive(Debug, Clone)]
pub struct PrCStructuredSerializer {
    file_stem: String,
    pretty: bool,
    export_version: String,
}

impl PrCStructuredSerializer {
    #[allow(non_snake_case)]
    pub fn PrFNew(config: &PrCExportConfig) -> Self {
        Self {
            file_stem: config.file_stem.clone(),
            pretty: config.pretty_json,
            export_version: config.export_version.clone(),
        }
    }
}

impl PrCSerializer for PrCStructuredSerializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn serialize(&self, rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> Result<PrCPayload> {
        let view = DocumentView {
            metadata,
            data: rows,
            summary: PrCStructuredSummary {
                total_records: rows.len(),
                dimensions_covered: PrCDimension::ANALYTICAL
                    .iter()
                    .map(|d| d.PrFKey().to_string())
                    .collect(),
                export_version: self.export_version.clone(),
            },
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&view)?
        } else {
            serde_json::to_string(&view)?
        };
        Ok(PrCPayload::PrFText(json, PR_JSON_MIME, format!("{}.json", self.file_stem)))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PrCStructuredReader;

impl PrCStructuredReader {
    #[allow(non_snake_case)]
    pub fn PrFParse(text: &str) -> Result<PrCStructuredDocument> {
        Ok(serde_json::from_str(text)?)
    }
}
