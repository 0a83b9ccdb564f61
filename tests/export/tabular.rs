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

#[path = "../common/mod.rs"]
mod common;

use common::{PrFTBatch, PrFTClock, PrFTFilters, PrFTRecord, PrFTUndefinedStateRecord};
use prism::config::PrCExportConfig;
use prism::export::{PrCTabularReader, PrCTabularSerializer};
use prism::flatten::{PrCDimensionFlattener, PrFFieldIndex};
use prism::metadata::{PrCAppliedFilters, PrCMetadataCalculator};
use prism::serializer::PrCSerializer;
use proptest::prelude::*;

fn PrFTRender(records: &[prism::PrCEnrichedRecord]) -> String {
    let metadata = PrCMetadataCalculator::PrFComputeAt(records, &PrFTFilters(), PrFTClock()).unwrap();
    let rows = PrCDimensionFlattener::PrFFlattenAll(records);
    let payload = PrCTabularSerializer::PrFNew(&PrCExportConfig::default())
        .serialize(&rows, &metadata)
        .unwrap();
    assert_eq!(payload.suggested_filename, "multi-dimensional-analysis.csv");
    assert_eq!(payload.mime_type, "text/csv;charset=utf-8");
    payload.PrFAsText().into_owned()
}

#[test]
fn PrFTTabularUndefinedStateScenario() {
    let records = vec![PrFTUndefinedStateRecord("u-1")];
    let text = PrFTRender(&records);
    let mut lines = text.lines();

    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    let confidence_column = header.iter().position(|name| *name == "Geographic_Confidence").unwrap();
    assert_eq!(Some(confidence_column), PrFFieldIndex("Geographic_Confidence"));

    let rows = PrCTabularReader::PrFParse(&text).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].PrFRendered("Geographic_Confidence"), "0.000");
    assert_eq!(rows[0].PrFRendered("State"), "Undefined");

    let block = PrCTabularReader::PrFParseMetadataBlock(&text);
    assert!(block.contains(&("Undefined Data".to_string(), "100.0%".to_string())));
    assert!(block.contains(&("Total Records".to_string(), "1".to_string())));
}

#[test]
fn PrFTTabularLayoutQuotesTextAndLeavesScoresBare() {
    let text = PrFTRender(&[PrFTRecord("c-1", "Ngozi \"Nk\" Eze")]);
    let data_line = text.lines().nth(1).unwrap();

    assert!(data_line.starts_with("\"c-1\",\"Ngozi \"\"Nk\"\" Eze\",\"PDP\""));
    assert!(data_line.contains(",0.880,"));
    assert!(data_line.contains(",\"Yes\","));
}

#[test]
fn PrFTTabularMetadataBlockFollowsBlankLine() {
    let text = PrFTRender(&PrFTBatch(2));
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[3], "");
    assert_eq!(
        &lines[4..],
        &[
            "# Export Metadata",
            "# Export Date: 2026-03-14 09:30:00",
            "# Total Records: 2",
            "# Average Quality Score: 80.0%",
            "# Confidence Threshold: 0.6",
            "# Undefined Data: 0.0%",
        ]
    );
}

#[test]
fn PrFTTabularStandardReaderStopsAtBlankLine() {
    let text = PrFTRender(&PrFTBatch(3));
    let table = PrCTabularReader::PrFTableSection(&text);
    let mut reader = csv::ReaderBuilder::new().from_reader(table.as_bytes());
    assert_eq!(reader.records().count(), 3);
}

#[test]
fn PrFTTabularIsIdempotent() {
    let batch = PrFTBatch(4);
    assert_eq!(PrFTRender(&batch), PrFTRender(&batch));
}

#[test]
fn PrFTTabularRejectsForeignHeader() {
    let err = PrCTabularReader::PrFParse("a,b\n1,2\n").unwrap_err();
    assert!(err.is_validation());
}

proptest! {
    #[test]
    fn PrFTTabularRoundTrip(
        names in proptest::collection::vec("[A-Za-z \",;#\\n]{0,12}", 1..5),
        issues in proptest::collection::vec("[a-z ;\"]{1,6}", 0..4),
        confidence in 0.0f64..=1.0,
    ) {
        let records: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut record = PrFTRecord(&format!("r-{}", i), name);
                record.topics.campaign_issues = issues.clone();
                record.data_quality.confidence = confidence;
                record
            })
            .collect();

        let metadata = PrCMetadataCalculator::PrFComputeAt(&records, &PrCAppliedFilters::new(), PrFTClock()).unwrap();
        let rows = PrCDimensionFlattener::PrFFlattenAll(&records);
        let payload = PrCTabularSerializer::PrFNew(&PrCExportConfig::default())
            .serialize(&rows, &metadata)
            .unwrap();
        let parsed = PrCTabularReader::PrFParse(&payload.PrFAsText()).unwrap();

        prop_assert_eq!(parsed.len(), rows.len());
        for (left, right) in parsed.iter().zip(rows.iter()) {
            prop_assert!(left.PrFApproxEq(right, 1e-3), "{:?} != {:?}", left, right);
        }
    }
}
