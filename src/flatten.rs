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

//! # Dimension Flattener Module
//!
//! Projects an enriched record into a flat, ordered row of scalar fields that
//! every serializer consumes. [`PR_FLAT_FIELDS`] is the single field table:
//! CSV headers, JSON object keys and workbook columns all come from it, so
//! the formats cannot drift apart.
//!
//! Flattening never fails. Missing or non-finite scores become `0`, blank
//! labels become `"Undefined"`, and list-valued fields are joined with `"; "`
//! after backslash-escaping any `;` or `\` inside an element, which keeps
//! the join reversible through [`PrFSplitList`].

use chrono::SecondsFormat;
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{PrError, Result};
use crate::record::{PrCEnrichedRecord, PR_TRACKED_EMOTIONS, PR_UNDEFINED_LABEL};

/// How a flat field is typed and rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrCFieldKind {
    /// Free text or categorical label.
    Text,
    /// Ordered list joined with `"; "`.
    List,
    /// Confidence or score, three decimals in text formats.
    Score,
    /// Boolean, `Yes`/`No` in text formats.
    Flag,
    /// RFC 3339 timestamp.
    Timestamp,
}

/// Which part of the record a flat field comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrCDimension {
    Identity,
    Geographic,
    Demographic,
    Sentiment,
    Topics,
    Engagement,
    Temporal,
    DataQuality,
}

impl PrCDimension {
    /// The six analytical dimensions, in export order.
    pub const ANALYTICAL: [PrCDimension; 6] = [
        PrCDimension::Geographic,
        PrCDimension::Demographic,
        PrCDimension::Sentiment,
        PrCDimension::Topics,
        PrCDimension::Engagement,
        PrCDimension::Temporal,
    ];

    #[allow(non_snake_case)]
    pub fn PrFTitle(&self) -> &'static str {
        match self {
            PrCDimension::Identity => "Identity",
            PrCDimension::Geographic => "Geographic",
            PrCDimension::Demographic => "Demographic",
            PrCDimension::Sentiment => "Sentiment",
            PrCDimension::Topics => "Topics",
            PrCDimension::Engagement => "Engagement",
            PrCDimension::Temporal => "Temporal",
            PrCDimension::DataQuality => "Data Quality",
        }
    }

    /// Lower-case key used in JSON summaries.
    #[allow(non_snake_case)]
    pub fn PrFKey(&self) -> &'static str {
        match self {
            PrCDimension::Identity => "identity",
            PrCDimension::Geographic => "geographic",
            PrCDimension::Demographic => "demographic",
            PrCDimension::Sentiment => "sentiment",
            PrCDimension::Topics => "topics",
            PrCDimension::Engagement => "engagement",
            PrCDimension::Temporal => "temporal",
            PrCDimension::DataQuality => "dataQuality",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrCFieldSpec {
    pub name: &'static str,
    pub kind: PrCFieldKind,
    pub dimension: PrCDimension,
}

const fn field(name: &'static str, kind: PrCFieldKind, dimension: PrCDimension) -> PrCFieldSpec {
    PrCFieldSpec { name, kind, dimension }
}

use self::PrCDimension as D;
use self::PrCFieldKind as K;

/// Ordered flat-row layout. Reordering this table changes the CSV contract.
pub static PR_FLAT_FIELDS: [PrCFieldSpec; 42] = [
    field("ID", K::Text, D::Identity),
    field("Name", K::Text, D::Identity),
    field("Party", K::Text, D::Identity),
    field("Position", K::Text, D::Identity),
    field("Region", K::Text, D::Identity),
    field("Country", K::Text, D::Geographic),
    field("State", K::Text, D::Geographic),
    field("LGA", K::Text, D::Geographic),
    field("Ward", K::Text, D::Geographic),
    field("Polling_Unit", K::Text, D::Geographic),
    field("Geographic_Confidence", K::Score, D::Geographic),
    field("Education", K::Text, D::Demographic),
    field("Occupation", K::Text, D::Demographic),
    field("Age_Group", K::Text, D::Demographic),
    field("Gender", K::Text, D::Demographic),
    field("Demographic_Confidence", K::Score, D::Demographic),
    field("Sentiment_Polarity", K::Text, D::Sentiment),
    field("Sentiment_Score", K::Score, D::Sentiment),
    field("Primary_Emotion", K::Text, D::Sentiment),
    field("Joy", K::Score, D::Sentiment),
    field("Anger", K::Score, D::Sentiment),
    field("Fear", K::Score, D::Sentiment),
    field("Sadness", K::Score, D::Sentiment),
    field("Disgust", K::Score, D::Sentiment),
    field("Emotional_Intensity", K::Text, D::Sentiment),
    field("Intensity_Score", K::Score, D::Sentiment),
    field("Complexity", K::Text, D::Sentiment),
    field("Model_Agreement", K::Score, D::Sentiment),
    field("Primary_Policy_Area", K::Text, D::Topics),
    field("Campaign_Issues", K::List, D::Topics),
    field("Event_Types", K::List, D::Topics),
    field("Trending_Score", K::Score, D::Topics),
    field("Engagement_Level", K::Text, D::Engagement),
    field("Virality_Score", K::Score, D::Engagement),
    field("Quality_Score", K::Score, D::Engagement),
    field("Influencer_Amplified", K::Flag, D::Engagement),
    field("Peak_Hours", K::List, D::Temporal),
    field("Active_Days", K::List, D::Temporal),
    field("Election_Phase", K::Text, D::Temporal),
    field("Data_Completeness", K::Score, D::DataQuality),
    field("Data_Confidence", K::Score, D::DataQuality),
    field("Last_Updated", K::Timestamp, D::DataQuality),
];

/// Header names in CSV order.
#[allow(non_snake_case)]
pub fn PrFFieldNames() -> Vec<&'static str> {
    PR_FLAT_FIELDS.iter().map(|spec| spec.name).collect()
}

/// Column indices belonging to a dimension.
#[allow(non_snake_case)]
pub fn PrFFieldIndices(dimension: PrCDimension) -> Vec<usize> {
    PR_FLAT_FIELDS
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.dimension == dimension)
        .map(|(index, _)| index)
        .collect()
}

/// Column index of a field by name.
#[allow(non_snake_case)]
pub fn PrFFieldIndex(name: &str) -> Option<usize> {
    PR_FLAT_FIELDS.iter().position(|spec| spec.name == name)
}

/// A single scalar in a flat row.
#[derive(Clone, Debug, PartialEq)]
pub enum PrCFlatValue {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl PrCFlatValue {
    /// Text rendering shared by the CSV, workbook and narrative formats.
    #[allow(non_snake_case)]
    pub fn PrFRender(&self) -> String {
        match self {
            PrCFlatValue::Text(text) => text.clone(),
            PrCFlatValue::Number(value) => format!("{:.3}", value),
            PrCFlatValue::Flag(true) => "Yes".to_string(),
            PrCFlatValue::Flag(false) => "No".to_string(),
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFAsText(&self) -> Option<&str> {
        match self {
            PrCFlatValue::Text(text) => Some(text),
            _ => None,
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFAsNumber(&self) -> Option<f64> {
        match self {
            PrCFlatValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            PrCFlatValue::Text(text) => Value::String(text.clone()),
            PrCFlatValue::Number(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or_else(|| Value::from(0)),
            PrCFlatValue::Flag(flag) => Value::Bool(*flag),
        }
    }
}

/// Format-agnostic projection of one record, aligned with [`PR_FLAT_FIELDS`].
#[derive(Clone, Debug, PartialEq)]
pub struct PrCFlatRow {
    values: Vec<PrCFlatValue>,
}

impl PrCFlatRow {
    /// Builds a row from values already in field order.
    #[allow(non_snake_case)]
    pub fn PrFFromValues(values: Vec<PrCFlatValue>) -> Result<Self> {
        if values.len() != PR_FLAT_FIELDS.len() {
            return Err(PrError::validation(format!(
                "flat row needs {} values, got {}",
                PR_FLAT_FIELDS.len(),
                values.len()
            )));
        }
        Ok(Self { values })
    }

    #[allow(non_snake_case)]
    pub fn PrFValues(&self) -> &[PrCFlatValue] {
        &self.values
    }

    #[allow(non_snake_case)]
    pub fn PrFGet(&self, name: &str) -> Option<&PrCFlatValue> {
        PrFFieldIndex(name).map(|index| &self.values[index])
    }

    /// Rendered text of a field, empty when the name is unknown.
    #[allow(non_snake_case)]
    pub fn PrFRendered(&self, name: &str) -> String {
        self.PrFGet(name).map(PrCFlatValue::PrFRender).unwrap_or_default()
    }

    /// `(spec, value)` pairs in field order.
    #[allow(non_snake_case)]
    pub fn PrFFields(&self) -> impl Iterator<Item = (&'static PrCFieldSpec, &PrCFlatValue)> {
        PR_FLAT_FIELDS.iter().zip(self.values.iter())
    }

    /// Parses text cells, as produced by [`PrCFlatValue::PrFRender`], back
    /// into a typed row.
    #[allow(non_snake_case)]
    pub fn PrFFromTextCells<S: AsRef<str>>(cells: &[S]) -> Result<Self> {
        if cells.len() != PR_FLAT_FIELDS.len() {
            return Err(PrError::validation(format!(
                "expected {} columns, got {}",
                PR_FLAT_FIELDS.len(),
                cells.len()
            )));
        }
        let values = PR_FLAT_FIELDS
            .iter()
            .zip(cells)
            .map(|(spec, cell)| parse_cell(spec, cell.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { values })
    }

    /// Rebuilds a row from a JSON object keyed by field name.
    #[allow(non_snake_case)]
    pub fn PrFFromJsonObject(object: &Map<String, Value>) -> Result<Self> {
        let values = PR_FLAT_FIELDS
            .iter()
            .map(|spec| {
                let value = object
                    .get(spec.name)
                    .ok_or_else(|| PrError::validation(format!("missing field '{}'", spec.name)))?;
                let typed = match (spec.kind, value) {
                    (K::Score, Value::Number(number)) => number.as_f64().map(PrCFlatValue::Number),
                    (K::Flag, Value::Bool(flag)) => Some(PrCFlatValue::Flag(*flag)),
                    (K::Text | K::List | K::Timestamp, Value::String(text)) => {
                        Some(PrCFlatValue::Text(text.clone()))
                    }
                    _ => None,
                };
                typed.ok_or_else(|| {
                    PrError::validation(format!("field '{}' has unexpected value {}", spec.name, value))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { values })
    }

    /// Equality that tolerates `tolerance` on numeric fields.
    #[allow(non_snake_case)]
    pub fn PrFApproxEq(&self, other: &PrCFlatRow, tolerance: f64) -> bool {
        self.values.iter().zip(other.values.iter()).all(|pair| match pair {
            (PrCFlatValue::Number(a), PrCFlatValue::Number(b)) => (a - b).abs() <= tolerance,
            (a, b) => a == b,
        })
    }
}

fn parse_cell(spec: &PrCFieldSpec, cell: &str) -> Result<PrCFlatValue> {
    match spec.kind {
        K::Text | K::List | K::Timestamp => Ok(PrCFlatValue::Text(cell.to_string())),
        K::Score => cell
            .trim()
            .parse::<f64>()
            .map(PrCFlatValue::Number)
            .map_err(|_| PrError::validation(format!("field '{}' is not numeric: '{}'", spec.name, cell))),
        K::Flag => match cell.trim() {
            "Yes" | "yes" | "true" => Ok(PrCFlatValue::Flag(true)),
            "No" | "no" | "false" => Ok(PrCFlatValue::Flag(false)),
            other => Err(PrError::validation(format!(
                "field '{}' is not a flag: '{}'",
                spec.name, other
            ))),
        },
    }
}

impl Serialize for PrCFlatRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (spec, value) in self.PrFFields() {
            map.serialize_entry(spec.name, &value.to_json())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PrCFlatRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        PrCFlatRow::PrFFromJsonObject(&object).map_err(D::Error::custom)
    }
}

/// Joins list items with `"; "`, escaping `\` and `;` inside items.
///
/// An empty list and a list holding one empty string both join to `""`.
/// [`PrFSplitList`] reads `""` back as the empty list.
#[allow(non_snake_case)]
pub fn PrFJoinList(items: &[String]) -> String {
    items
        .iter()
        .map(|item| item.replace('\\', "\\\\").replace(';', "\\;"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Inverse of [`PrFJoinList`]. An empty string yields an empty list, so
/// `[""]` does not survive a round trip. Empty items beside other items do.
#[allow(non_snake_case)]
pub fn PrFSplitList(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = joined.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ';' => {
                items.push(std::mem::take(&mut current));
                if chars.peek() == Some(&' ') {
                    chars.next();
                }
            }
            other => current.push(other),
        }
    }
    items.push(current);
    items
}

fn label(value: &str) -> PrCFlatValue {
    if value.trim().is_empty() {
        PrCFlatValue::Text(PR_UNDEFINED_LABEL.to_string())
    } else {
        PrCFlatValue::Text(value.to_string())
    }
}

fn score(value: f64) -> PrCFlatValue {
    PrCFlatValue::Number(if value.is_finite() { value } else { 0.0 })
}

fn text(value: &str) -> PrCFlatValue {
    PrCFlatValue::Text(value.to_string())
}

fn list(items: &[String]) -> PrCFlatValue {
    PrCFlatValue::Text(PrFJoinList(items))
}

/// Flattens enriched records into [`PrCFlatRow`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrCDimensionFlattener;

impl PrCDimensionFlattener {
    #[allow(non_snake_case)]
    pub fn PrFFlatten(record: &PrCEnrichedRecord) -> PrCFlatRow {
        let geo = &record.geographic;
        let demo = &record.demographic;
        let sentiment = &record.sentiment;
        let topics = &record.topics;
        let engagement = &record.engagement;
        let temporal = &record.temporal;
        let quality = &record.data_quality;

        let mut values = Vec::with_capacity(PR_FLAT_FIELDS.len());
        values.extend([
            text(&record.id),
            text(&record.name),
            text(&record.party),
            text(&record.position),
            text(&record.region_label),
        ]);
        values.extend(geo.PrFLevels().iter().map(|(_, level)| text(level.PrFDisplayName())));
        values.push(score(geo.state.confidence_score));
        values.extend(demo.PrFFields().iter().map(|(_, field)| label(&field.label)));
        values.push(score(demo.PrFAverageConfidence()));
        values.extend([
            label(&sentiment.polarity_label),
            score(sentiment.polarity_score),
            label(&sentiment.primary_emotion),
        ]);
        values.extend(PR_TRACKED_EMOTIONS.iter().map(|name| score(sentiment.PrFEmotion(name))));
        values.extend([
            label(&sentiment.intensity_label),
            score(sentiment.intensity_score),
            label(&sentiment.complexity_label),
            score(sentiment.model_agreement),
            label(&topics.primary_policy_area),
            list(&topics.campaign_issues),
            list(&topics.event_types),
            score(topics.trending_score),
            label(&engagement.level),
            score(engagement.virality_score),
            score(engagement.quality_score),
            PrCFlatValue::Flag(engagement.influencer_amplified),
            list(&temporal.peak_hours),
            list(&temporal.active_days),
            label(&temporal.election_phase),
            score(quality.completeness),
            score(quality.confidence),
            text(&quality.last_updated.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ]);
        debug_assert_eq!(values.len(), PR_FLAT_FIELDS.len());
        PrCFlatRow { values }
    }

    /// Flattens a batch, preserving input order.
    #[allow(non_snake_case)]
    pub fn PrFFlattenAll(records: &[PrCEnrichedRecord]) -> Vec<PrCFlatRow> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            records.par_iter().map(Self::PrFFlatten).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            records.iter().map(Self::PrFFlatten).collect()
        }
    }
}
