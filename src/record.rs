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

//! # Prism Record Module
//!
//! This module provides the enriched record consumed by the export pipeline.
//! A record describes one political entity together with six independent
//! analytical dimensions: geographic, demographic, sentiment, topics,
//! engagement and temporal, plus an authoritative data-quality summary.
//!
//! ## Design Principles
//!
//! - **Explicit shape**: every dimension is a named struct, so serializers never
//!   check optional keys
//! - **Tolerant decoding**: missing nested values decode to documented defaults
//!   (`0` for scores, `"Undefined"` for labels, empty lists)
//! - **Boundary validation**: [`PrCEnrichedRecord::PrFValidate`] checks the
//!   invariants once, where records enter the system
//!
//! Records use camelCase keys on the wire, matching the upstream generators.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{PrError, Result};

/// Label used by upstream classifiers for a value they could not determine.
pub const PR_UNDEFINED_LABEL: &str = "Undefined";

/// Emotion keys carried into the flattened row, in output order.
pub const PR_TRACKED_EMOTIONS: [&str; 5] = ["joy", "anger", "fear", "sadness", "disgust"];

fn undefined_label() -> String {
    PR_UNDEFINED_LABEL.to_string()
}

/// One level of the geographic hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCGeoLevel {
    pub name: String,
    pub confidence_score: f64,
    pub is_undefined: bool,
}

impl Default for PrCGeoLevel {
    fn default() -> Self {
        Self::PrFUndefined()
    }
}

impl PrCGeoLevel {
    #[allow(non_snake_case)]
    pub fn PrFDefined(name: impl Into<String>, confidence_score: f64) -> Self {
        Self {
            name: name.into(),
            confidence_score,
            is_undefined: false,
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFUndefined() -> Self {
        Self {
            name: undefined_label(),
            confidence_score: 0.0,
            is_undefined: true,
        }
    }

    /// Display name, resolving undefined or blank levels to the sentinel.
    #[allow(non_snake_case)]
    pub fn PrFDisplayName(&self) -> &str {
        if self.is_undefined || self.name.trim().is_empty() {
            PR_UNDEFINED_LABEL
        } else {
            &self.name
        }
    }
}

/// Hierarchical location, coarsest level first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCGeographic {
    pub country: PrCGeoLevel,
    pub state: PrCGeoLevel,
    pub lga: PrCGeoLevel,
    pub ward: PrCGeoLevel,
    pub polling_unit: PrCGeoLevel,
}

impl PrCGeographic {
    /// Levels ordered from country down to polling unit.
    #[allow(non_snake_case)]
    pub fn PrFLevels(&self) -> [(&'static str, &PrCGeoLevel); 5] {
        [
            ("country", &self.country),
            ("state", &self.state),
            ("lga", &self.lga),
            ("ward", &self.ward),
            ("pollingUnit", &self.polling_unit),
        ]
    }

    /// Marks `from` and every finer level undefined, zeroing their confidence.
    #[allow(non_snake_case)]
    pub fn PrFFallbackFrom(mut self, from: &str) -> Self {
        let mut hit = false;
        for (name, level) in [
            ("country", &mut self.country),
            ("state", &mut self.state),
            ("lga", &mut self.lga),
            ("ward", &mut self.ward),
            ("pollingUnit", &mut self.polling_unit),
        ] {
            hit |= name == from;
            if hit {
                *level = PrCGeoLevel::PrFUndefined();
            }
        }
        self
    }
}

/// A demographic classification and its confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCDemographicField {
    #[serde(alias = "level", alias = "category", alias = "range", alias = "value")]
    pub label: String,
    pub confidence_score: f64,
}

impl Default for PrCDemographicField {
    fn default() -> Self {
        Self {
            label: undefined_label(),
            confidence_score: 0.0,
        }
    }
}

impl PrCDemographicField {
    #[allow(non_snake_case)]
    pub fn PrFNew(label: impl Into<String>, confidence_score: f64) -> Self {
        Self {
            label: label.into(),
            confidence_score,
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFIsUndefined(&self) -> bool {
        self.label == PR_UNDEFINED_LABEL
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCDemographic {
    pub education: PrCDemographicField,
    pub occupation: PrCDemographicField,
    pub age_group: PrCDemographicField,
    pub gender: PrCDemographicField,
}

impl PrCDemographic {
    #[allow(non_snake_case)]
    pub fn PrFFields(&self) -> [(&'static str, &PrCDemographicField); 4] {
        [
            ("education", &self.education),
            ("occupation", &self.occupation),
            ("ageGroup", &self.age_group),
            ("gender", &self.gender),
        ]
    }

    #[allow(non_snake_case)]
    pub fn PrFHasUndefined(&self) -> bool {
        self.PrFFields().iter().any(|(_, field)| field.PrFIsUndefined())
    }

    /// Mean confidence over the classified fields. `"Undefined"` labels are
    /// left out; a fully undefined profile averages to zero.
    #[allow(non_snake_case)]
    pub fn PrFAverageConfidence(&self) -> f64 {
        let (sum, count) = self
            .PrFFields()
            .iter()
            .filter(|(_, field)| !field.PrFIsUndefined())
            .fold((0.0, 0usize), |(sum, count), (_, field)| {
                (sum + field.confidence_score, count + 1)
            });
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCSentiment {
    pub polarity_label: String,
    pub polarity_score: f64,
    pub primary_emotion: String,
    pub emotion_scores: BTreeMap<String, f64>,
    pub intensity_label: String,
    pub intensity_score: f64,
    pub complexity_label: String,
    pub model_agreement: f64,
}

impl Default for PrCSentiment {
    fn default() -> Self {
        Self {
            polarity_label: undefined_label(),
            polarity_score: 0.0,
            primary_emotion: undefined_label(),
            emotion_scores: BTreeMap::new(),
            intensity_label: undefined_label(),
            intensity_score: 0.0,
            complexity_label: undefined_label(),
            model_agreement: 0.0,
        }
    }
}

impl PrCSentiment {
    /// Score for a named emotion, zero when the classifier did not report it.
    #[allow(non_snake_case)]
    pub fn PrFEmotion(&self, name: &str) -> f64 {
        self.emotion_scores.get(name).copied().unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCTopics {
    pub primary_policy_area: String,
    pub campaign_issues: Vec<String>,
    pub event_types: Vec<String>,
    pub trending_score: f64,
}

impl Default for PrCTopics {
    fn default() -> Self {
        Self {
            primary_policy_area: undefined_label(),
            campaign_issues: Vec::new(),
            event_types: Vec::new(),
            trending_score: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCEngagement {
    pub level: String,
    pub virality_score: f64,
    pub quality_score: f64,
    pub influencer_amplified: bool,
}

impl Default for PrCEngagement {
    fn default() -> Self {
        Self {
            level: undefined_label(),
            virality_score: 0.0,
            quality_score: 0.0,
            influencer_amplified: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCTemporal {
    pub peak_hours: Vec<String>,
    pub active_days: Vec<String>,
    pub election_phase: String,
}

impl Default for PrCTemporal {
    fn default() -> Self {
        Self {
            peak_hours: Vec::new(),
            active_days: Vec::new(),
            election_phase: undefined_label(),
        }
    }
}

/// Authoritative per-record quality summary used for aggregate statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCDataQuality {
    pub completeness: f64,
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
}

/// One analyzed political entity with its six dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrCEnrichedRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub party: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, alias = "region")]
    pub region_label: String,
    #[serde(default)]
    pub geographic: PrCGeographic,
    #[serde(default)]
    pub demographic: PrCDemographic,
    #[serde(default)]
    pub sentiment: PrCSentiment,
    #[serde(default)]
    pub topics: PrCTopics,
    #[serde(default)]
    pub engagement: PrCEngagement,
    #[serde(default)]
    pub temporal: PrCTemporal,
    #[serde(default)]
    pub data_quality: PrCDataQuality,
}

impl PrCEnrichedRecord {
    /// Constructs a record with identity fields set and every dimension at
    /// its default.
    #[allow(non_snake_case)]
    pub fn PrFNew(
        id: impl Into<String>,
        name: impl Into<String>,
        party: impl Into<String>,
        position: impl Into<String>,
        region_label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            party: party.into(),
            position: position.into(),
            region_label: region_label.into(),
            geographic: PrCGeographic::default(),
            demographic: PrCDemographic::default(),
            sentiment: PrCSentiment::default(),
            topics: PrCTopics::default(),
            engagement: PrCEngagement::default(),
            temporal: PrCTemporal::default(),
            data_quality: PrCDataQuality::default(),
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFWithGeographic(mut self, geographic: PrCGeographic) -> Self {
        self.geographic = geographic;
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithDemographic(mut self, demographic: PrCDemographic) -> Self {
        self.demographic = demographic;
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithSentiment(mut self, sentiment: PrCSentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithTopics(mut self, topics: PrCTopics) -> Self {
        self.topics = topics;
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithEngagement(mut self, engagement: PrCEngagement) -> Self {
        self.engagement = engagement;
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithTemporal(mut self, temporal: PrCTemporal) -> Self {
        self.temporal = temporal;
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithDataQuality(mut self, data_quality: PrCDataQuality) -> Self {
        self.data_quality = data_quality;
        self
    }

    /// True when the record carries any undefined field that counts toward
    /// the export's undefined-data rate: an undefined state, or any
    /// demographic labelled `"Undefined"`.
    #[allow(non_snake_case)]
    pub fn PrFHasUndefinedData(&self) -> bool {
        self.geographic.state.is_undefined || self.demographic.PrFHasUndefined()
    }

    /// Checks the record against the data-model invariants.
    #[allow(non_snake_case)]
    pub fn PrFValidate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PrError::validation("record id must not be empty"));
        }
        let ctx = |field: &str| format!("record '{}': {}", self.id, field);

        let mut coarser_undefined: Option<&str> = None;
        for (name, level) in self.geographic.PrFLevels() {
            check_unit(&ctx(&format!("geographic.{}.confidenceScore", name)), level.confidence_score)?;
            if level.is_undefined && level.confidence_score != 0.0 {
                return Err(PrError::validation(format!(
                    "{} is undefined but has confidence {}",
                    ctx(&format!("geographic.{}", name)),
                    level.confidence_score
                )));
            }
            match (coarser_undefined, level.is_undefined) {
                (Some(parent), false) => {
                    return Err(PrError::validation(format!(
                        "{} is defined below undefined level '{}'",
                        ctx(&format!("geographic.{}", name)),
                        parent
                    )));
                }
                (None, true) => coarser_undefined = Some(name),
                _ => {}
            }
        }

        for (name, field) in self.demographic.PrFFields() {
            check_unit(&ctx(&format!("demographic.{}.confidenceScore", name)), field.confidence_score)?;
        }

        let sentiment = &self.sentiment;
        check_range(&ctx("sentiment.polarityScore"), sentiment.polarity_score, -1.0, 1.0)?;
        for (emotion, score) in &sentiment.emotion_scores {
            check_unit(&ctx(&format!("sentiment.emotionScores.{}", emotion)), *score)?;
        }
        check_unit(&ctx("sentiment.intensityScore"), sentiment.intensity_score)?;
        check_unit(&ctx("sentiment.modelAgreement"), sentiment.model_agreement)?;
        check_unit(&ctx("topics.trendingScore"), self.topics.trending_score)?;
        check_unit(&ctx("engagement.viralityScore"), self.engagement.virality_score)?;
        check_unit(&ctx("engagement.qualityScore"), self.engagement.quality_score)?;
        check_unit(&ctx("dataQuality.completeness"), self.data_quality.completeness)?;
        check_unit(&ctx("dataQuality.confidence"), self.data_quality.confidence)?;
        Ok(())
    }
}

fn check_unit(field: &str, value: f64) -> Result<()> {
    check_range(field, value, 0.0, 1.0)
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(PrError::validation(format!(
            "{} must be within [{}, {}], got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

/// Convenience alias for working on batches of records.
pub type PrCRecordBatch = Vec<PrCEnrichedRecord>;
