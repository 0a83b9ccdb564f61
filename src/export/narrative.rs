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

//! # Narrative Report Export
//!
//! Plain-text report delivered for the `pdf` format. Sections always appear
//! in this order: banner, export metadata, applied filters, executive
//! summary, then one detailed block per record in input order, each closed by
//! a separator line. No binary PDF structure is produced.
//!
//! The executive summary line comes from a [`PrCSummaryProvider`], so hosts
//! with their own statistics service can supply the prose.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use crate::config::PrCExportConfig;
use crate::errors::{PrError, Result};
use crate::flatten::{PrCFlatRow, PrFSplitList};
use crate::metadata::PrCExportMetadata;
use crate::serializer::{PrCPayload, PrCSerializer};

pub const PR_TEXT_MIME: &str = "text/plain;charset=utf-8";

const RULE_WIDTH: usize = 80;

/// Supplies the executive summary line of the narrative report.
pub trait PrCSummaryProvider: std::fmt::Debug + Send + Sync {
    fn executive_summary(&self, rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> anyhow::Result<String>;
}

/// Summary derived from the exported rows themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrCDerivedSummary;

impl PrCDerivedSummary {
    /// Most frequent rendered value of a field. Ties go to the
    /// alphabetically first value.
    #[allow(non_snake_case)]
    pub fn PrFMostFrequent(rows: &[PrCFlatRow], field: &str) -> Option<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in rows {
            *counts.entry(row.PrFRendered(field)).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
    }
}

impl PrCSummaryProvider for PrCDerivedSummary {
    fn executive_summary(&self, rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> anyhow::Result<String> {
        let mut line = format!(
            "Analysis of {} political entities across 6 dimensions with {} average data quality and {} undefined data.",
            metadata.total_records,
            metadata.PrFQualityDisplay(),
            metadata.PrFUndefinedDisplay()
        );
        if let Some((polarity, count)) = Self::PrFMostFrequent(rows, "Sentiment_Polarity") {
            write!(line, " Dominant sentiment: {} ({} of {}).", polarity, count, rows.len())?;
        }
        if let Some((area, _)) = Self::PrFMostFrequent(rows, "Primary_Policy_Area") {
            write!(line, " Leading policy area: {}.", area)?;
        }
        Ok(line)
    }
}

#[derive(Debug, Clone)]
pub struct PrCNarrativeSerializer {
    file_stem: String,
    title: String,
    summary: Arc<dyn PrCSummaryProvider>,
}

impl PrCNarrativeSerializer {
    #[allow(non_snake_case)]
    pub fn PrFNew(config: &PrCExportConfig, summary: Arc<dyn PrCSummaryProvider>) -> Self {
        Self {
            file_stem: config.file_stem.clone(),
            title: config.report_title.clone(),
            summary,
        }
    }

    fn heading(out: &mut String, title: &str) -> std::fmt::Result {
        writeln!(out, "{}", title)?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))
    }

    fn list_or_none(joined: &str) -> String {
        let items = PrFSplitList(joined);
        if items.is_empty() {
            "None".to_string()
        } else {
            items.join(", ")
        }
    }

    fn record_block(out: &mut String, position: usize, total: usize, row: &PrCFlatRow) -> std::fmt::Result {
        let get = |name: &str| row.PrFRendered(name);
        writeln!(out, "Record {} of {}: {} ({})", position, total, get("Name"), get("ID"))?;
        writeln!(
            out,
            "  Identity: party {}, position {}, region {}",
            get("Party"),
            get("Position"),
            get("Region")
        )?;
        writeln!(
            out,
            "  Geographic: {} > {} > {} > {} > {} (confidence {})",
            get("Country"),
            get("State"),
            get("LGA"),
            get("Ward"),
            get("Polling_Unit"),
            get("Geographic_Confidence")
        )?;
        writeln!(
            out,
            "  Demographic: education {}, occupation {}, age group {}, gender {} (confidence {})",
            get("Education"),
            get("Occupation"),
            get("Age_Group"),
            get("Gender"),
            get("Demographic_Confidence")
        )?;
        writeln!(
            out,
            "  Sentiment: {} ({}), primary emotion {}, intensity {} ({}), complexity {}, model agreement {}",
            get("Sentiment_Polarity"),
            get("Sentiment_Score"),
            get("Primary_Emotion"),
            get("Emotional_Intensity"),
            get("Intensity_Score"),
            get("Complexity"),
            get("Model_Agreement")
        )?;
        writeln!(
            out,
            "  Emotions: joy {}, anger {}, fear {}, sadness {}, disgust {}",
            get("Joy"),
            get("Anger"),
            get("Fear"),
            get("Sadness"),
            get("Disgust")
        )?;
        writeln!(
            out,
            "  Topics: {}; issues: {}; events: {}; trending {}",
            get("Primary_Policy_Area"),
            Self::list_or_none(&get("Campaign_Issues")),
            Self::list_or_none(&get("Event_Types")),
            get("Trending_Score")
        )?;
        writeln!(
            out,
            "  Engagement: {}, virality {}, quality {}, influencer amplified {}",
            get("Engagement_Level"),
            get("Virality_Score"),
            get("Quality_Score"),
            get("Influencer_Amplified")
        )?;
        writeln!(
            out,
            "  Temporal: peak hours {}; active days {}; phase {}",
            Self::list_or_none(&get("Peak_Hours")),
            Self::list_or_none(&get("Active_Days")),
            get("Election_Phase")
        )?;
        writeln!(
            out,
            "  Data Quality: completeness {}, confidence {}, last updated {}",
            get("Data_Completeness"),
            get("Data_Confidence"),
            get("Last_Updated")
        )?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))
    }

    /// Renders the full report around an already computed summary line.
    #[allow(non_snake_case)]
    pub fn PrFRender(&self, rows: &[PrCFlatRow], metadata: &PrCExportMetadata, summary: &str) -> Result<String> {
        let mut out = String::new();
        let banner = "=".repeat(RULE_WIDTH);
        writeln!(out, "{}", banner)?;
        writeln!(out, "{}", self.title)?;
        writeln!(out, "{}", banner)?;
        writeln!(out)?;

        Self::heading(&mut out, "EXPORT METADATA")?;
        writeln!(out, "Generated: {}", metadata.PrFGeneratedAt())?;
        writeln!(out, "Total Records: {}", metadata.total_records)?;
        writeln!(out, "Average Quality Score: {}", metadata.PrFQualityDisplay())?;
        writeln!(out, "Confidence Threshold: {}", metadata.confidence_threshold)?;
        writeln!(out, "Undefined Data: {}", metadata.PrFUndefinedDisplay())?;
        writeln!(out)?;

        Self::heading(&mut out, "APPLIED FILTERS")?;
        let filters = metadata.PrFFilterPairs();
        if filters.is_empty() {
            writeln!(out, "None")?;
        }
        for (key, value) in filters {
            writeln!(out, "{}: {}", key, value)?;
        }
        writeln!(out)?;

        Self::heading(&mut out, "EXECUTIVE SUMMARY")?;
        writeln!(out, "{}", summary)?;
        writeln!(out)?;

        Self::heading(&mut out, "DETAILED ANALYSIS")?;
        for (index, row) in rows.iter().enumerate() {
            Self::record_block(&mut out, index + 1, rows.len(), row)?;
        }
        writeln!(out)?;
        writeln!(out, "{}", banner)?;
        writeln!(out, "END OF REPORT")?;
        writeln!(out, "{}", banner)?;
        Ok(out)
    }
}

impl PrCSerializer for PrCNarrativeSerializer {
    fn name(&self) -> &'static str {
        "narrative"
    }

    fn serialize(&self, rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> Result<PrCPayload> {
        let summary = self
            .summary
            .executive_summary(rows, metadata)
            .map_err(|e| PrError::serializer(self.name(), format!("summary provider failed: {:#}", e)))?;
        let text = self.PrFRender(rows, metadata, &summary)?;
        Ok(PrCPayload::PrFText(text, PR_TEXT_MIME, format!("{}-report.txt", self.file_stem)))
    }
}
