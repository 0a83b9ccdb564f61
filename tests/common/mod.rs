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

//! Shared fixtures for the integration tests.

#![allow(dead_code, non_snake_case)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chrono::{DateTime, TimeZone, Utc};

use prism::export::{PrCChartRequest, PrCChartSource};
use prism::metadata::PrCAppliedFilters;
use prism::progress::{PrCProgressCallback, PrCProgressEvent};
use prism::record::{
    PrCDataQuality, PrCDemographic, PrCDemographicField, PrCEngagement, PrCEnrichedRecord,
    PrCGeoLevel, PrCGeographic, PrCSentiment, PrCTemporal, PrCTopics, PR_UNDEFINED_LABEL,
};
use prism::serializer::PrCPayload;
use prism::sink::PrCSink;

pub const PR_T_SVG: &str = r#"<div class="chart"><svg xmlns="http://www.w3.org/2000/svg" width="400" height="200"><rect width="10" height="20"/></svg></div>"#;

pub fn PrFTClock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
}

pub fn PrFTFilters() -> PrCAppliedFilters {
    let mut filters = PrCAppliedFilters::new();
    filters.insert("party".into(), serde_json::json!("PDP"));
    filters.insert("states".into(), serde_json::json!(["Lagos", "Kano"]));
    filters
}

/// A fully classified record: every level defined, no `Undefined` labels.
pub fn PrFTRecord(id: &str, name: &str) -> PrCEnrichedRecord {
    let mut emotions = BTreeMap::new();
    emotions.insert("joy".to_string(), 0.7);
    emotions.insert("anger".to_string(), 0.1);
    emotions.insert("fear".to_string(), 0.05);
    emotions.insert("sadness".to_string(), 0.1);
    emotions.insert("disgust".to_string(), 0.05);

    PrCEnrichedRecord::PrFNew(id, name, "PDP", "Senator", "South West")
        .PrFWithGeographic(PrCGeographic {
            country: PrCGeoLevel::PrFDefined("Nigeria", 0.95),
            state: PrCGeoLevel::PrFDefined("Lagos", 0.88),
            lga: PrCGeoLevel::PrFDefined("Ikeja", 0.8),
            ward: PrCGeoLevel::PrFDefined("Ward 3", 0.7),
            polling_unit: PrCGeoLevel::PrFDefined("PU 012", 0.65),
        })
        .PrFWithDemographic(PrCDemographic {
            education: PrCDemographicField::PrFNew("Tertiary", 0.8),
            occupation: PrCDemographicField::PrFNew("Public Servant", 0.7),
            age_group: PrCDemographicField::PrFNew("36-45", 0.75),
            gender: PrCDemographicField::PrFNew("Female", 0.9),
        })
        .PrFWithSentiment(PrCSentiment {
            polarity_label: "Positive".into(),
            polarity_score: 0.62,
            primary_emotion: "joy".into(),
            emotion_scores: emotions,
            intensity_label: "Moderate".into(),
            intensity_score: 0.55,
            complexity_label: "Nuanced".into(),
            model_agreement: 0.82,
        })
        .PrFWithTopics(PrCTopics {
            primary_policy_area: "Economy".into(),
            campaign_issues: vec!["Fuel subsidy".into(), "Jobs; youth".into()],
            event_types: vec!["Rally".into()],
            trending_score: 0.4,
        })
        .PrFWithEngagement(PrCEngagement {
            level: "High".into(),
            virality_score: 0.6,
            quality_score: 0.75,
            influencer_amplified: true,
        })
        .PrFWithTemporal(PrCTemporal {
            peak_hours: vec!["18:00".into(), "20:00".into()],
            active_days: vec!["Monday".into(), "Friday".into()],
            election_phase: "Campaign".into(),
        })
        .PrFWithDataQuality(PrCDataQuality {
            completeness: 0.9,
            confidence: 0.8,
            last_updated: PrFTClock(),
        })
}

/// Record whose state (and every finer level) could not be resolved.
pub fn PrFTUndefinedStateRecord(id: &str) -> PrCEnrichedRecord {
    let mut record = PrFTRecord(id, "Unplaced Candidate");
    record.geographic = record.geographic.clone().PrFFallbackFrom("state");
    record
}

/// Record whose education level is the `Undefined` sentinel.
pub fn PrFTUndefinedEducationRecord(id: &str) -> PrCEnrichedRecord {
    let mut record = PrFTRecord(id, "Unclassified Candidate");
    record.demographic.education = PrCDemographicField::PrFNew(PR_UNDEFINED_LABEL, 0.0);
    record
}

pub fn PrFTBatch(size: usize) -> Vec<PrCEnrichedRecord> {
    (0..size)
        .map(|i| PrFTRecord(&format!("entity-{:03}", i), &format!("Candidate {}", i)))
        .collect()
}

pub fn PrFTChart(markup: &str) -> PrCChartRequest {
    PrCChartRequest::PrFNew(PrCChartSource::PrFNew("sentiment-trend", markup))
}

/// Progress callback that records every event it sees.
pub fn PrFTRecorder() -> (PrCProgressCallback, Arc<Mutex<Vec<PrCProgressEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: PrCProgressCallback = Box::new(move |event: &PrCProgressEvent| {
        sink.lock().unwrap().push(event.clone());
    });
    (callback, events)
}

/// Sink that rejects every payload but counts the attempts.
#[derive(Debug, Default)]
pub struct PrCTFailingSink {
    pub attempts: usize,
}

impl PrCSink for PrCTFailingSink {
    fn deliver(&mut self, _payload: &PrCPayload) -> anyhow::Result<()> {
        self.attempts += 1;
        Err(anyhow!("disk full"))
    }
}
