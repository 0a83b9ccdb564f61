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

//! # Export Metadata Module
//!
//! Derives the export-wide statistics embedded in every output format. The
//! metadata is computed once per export from the full batch and never changes
//! afterwards.
//!
//! Percentages are kept at full precision in memory. Every rendering, serde
//! included, goes through [`PrFRoundPercent`], so all formats agree on the
//! same one-decimal value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{PrError, Result};
use crate::record::PrCEnrichedRecord;

/// Classification threshold of the upstream generators. Informational only.
pub const PR_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Filters the caller applied before exporting, reproduced verbatim.
pub type PrCAppliedFilters = Map<String, Value>;

/// Rounds a percentage to one decimal place.
#[allow(non_snake_case)]
pub fn PrFRoundPercent(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Formats a percentage with one decimal place, without the `%` sign.
#[allow(non_snake_case)]
pub fn PrFFormatPercent(value: f64) -> String {
    format!("{:.1}", PrFRoundPercent(value))
}

fn serialize_percent<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(PrFRoundPercent(*value))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrCExportMetadata {
    pub generated_date: String,
    pub generated_time: String,
    pub applied_filters: PrCAppliedFilters,
    pub total_records: usize,
    /// Mean of `dataQuality.confidence`, as a percentage.
    #[serde(serialize_with = "serialize_percent")]
    pub average_quality_score: f64,
    pub confidence_threshold: f64,
    /// Share of records with any undefined field, as a percentage.
    #[serde(serialize_with = "serialize_percent")]
    pub undefined_data_percentage: f64,
}

impl PrCExportMetadata {
    /// `"<date> <time>"`, used by the text formats.
    #[allow(non_snake_case)]
    pub fn PrFGeneratedAt(&self) -> String {
        format!("{} {}", self.generated_date, self.generated_time)
    }

    #[allow(non_snake_case)]
    pub fn PrFQualityDisplay(&self) -> String {
        format!("{}%", PrFFormatPercent(self.average_quality_score))
    }

    #[allow(non_snake_case)]
    pub fn PrFUndefinedDisplay(&self) -> String {
        format!("{}%", PrFFormatPercent(self.undefined_data_percentage))
    }

    /// Filters rendered as `key: value` pairs in key order. String values are
    /// shown bare, everything else as compact JSON.
    #[allow(non_snake_case)]
    pub fn PrFFilterPairs(&self) -> Vec<(String, String)> {
        self.applied_filters
            .iter()
            .map(|(key, value)| {
                let shown = match value {
                    Value::String(text) => text.clone(),
                    Value::Array(items) => items
                        .iter()
                        .map(|item| match item {
                            Value::String(text) => text.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                    other => other.to_string(),
                };
                (key.clone(), shown)
            })
            .collect()
    }
}

/// Computes [`PrCExportMetadata`] from a record batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrCMetadataCalculator;

impl PrCMetadataCalculator {
    /// Computes metadata stamped with the current wall-clock time.
    #[allow(non_snake_case)]
    pub fn PrFCompute(records: &[PrCEnrichedRecord], filters: &PrCAppliedFilters) -> Result<PrCExportMetadata> {
        Self::PrFComputeAt(records, filters, Utc::now())
    }

    /// Computes metadata stamped with `generated_at`.
    #[allow(non_snake_case)]
    pub fn PrFComputeAt(
        records: &[PrCEnrichedRecord],
        filters: &PrCAppliedFilters,
        generated_at: DateTime<Utc>,
    ) -> Result<PrCExportMetadata> {
        if records.is_empty() {
            return Err(PrError::EmptyBatch);
        }

        let total = records.len();
        let confidence_sum: f64 = records.iter().map(|r| r.data_quality.confidence).sum();
        let undefined = records.iter().filter(|r| r.PrFHasUndefinedData()).count();

        Ok(PrCExportMetadata {
            generated_date: generated_at.format("%Y-%m-%d").to_string(),
            generated_time: generated_at.format("%H:%M:%S").to_string(),
            applied_filters: filters.clone(),
            total_records: total,
            average_quality_score: confidence_sum / total as f64 * 100.0,
            confidence_threshold: PR_CONFIDENCE_THRESHOLD,
            undefined_data_percentage: 100.0 * undefined as f64 / total as f64,
        })
    }
}
