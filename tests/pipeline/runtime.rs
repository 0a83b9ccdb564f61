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

use std::sync::mpsc::channel;
use std::sync::Arc;

use common::{
    PrCTFailingSink, PrFTBatch, PrFTChart, PrFTClock, PrFTFilters, PrFTRecorder,
    PrFTUndefinedEducationRecord, PrFTUndefinedStateRecord, PR_T_SVG,
};
use prism::config::{PrCChartOptions, PrCExportConfig};
use prism::errors::PrError;
use prism::export::{PrCExportManifest, PrCStructuredReader, PrFPayloadHash};
use prism::metadata::PrCAppliedFilters;
use prism::pipeline::{PrCExportFormat, PrCExportPipeline};
use prism::progress::{PrCCancellationToken, PrCExportStage, PrCProgressEvent, PrFChannelProgress};
use prism::serializer::PrCPayload;
use prism::sink::{PrCFileSink, PrCMemorySink, PrCSink, PR_MANIFEST_FILENAME};
use tempfile::tempdir;

fn PrFTStages(events: &[PrCProgressEvent]) -> Vec<PrCExportStage> {
    events.iter().map(|event| event.stage).collect()
}

#[test]
fn PrFTPipelineCsvSuccessEmitsEveryStage() {
    let (callback, events) = PrFTRecorder();
    let pipeline = PrCExportPipeline::PrFNew()
        .PrFWithProgress(callback)
        .PrFWithFixedClock(PrFTClock());
    let mut sink = PrCMemorySink::PrFNew();

    let receipt = pipeline
        .PrFExport(&PrFTBatch(3), &PrFTFilters(), PrCExportFormat::Csv, None, &mut sink)
        .unwrap();

    assert_eq!(receipt.format, PrCExportFormat::Csv);
    assert_eq!(receipt.filename, "multi-dimensional-analysis.csv");
    assert_eq!(receipt.metadata.total_records, 3);
    assert_eq!(sink.delivered.len(), 1);
    assert_eq!(sink.PrFLast().unwrap().PrFLen(), receipt.bytes);

    let events = events.lock().unwrap();
    assert_eq!(
        PrFTStages(&events),
        vec![
            PrCExportStage::Preparing,
            PrCExportStage::Processing,
            PrCExportStage::Generating,
            PrCExportStage::Downloading,
            PrCExportStage::Complete,
        ]
    );
    let percents: Vec<u8> = events.iter().map(|event| event.progress_percent).collect();
    assert_eq!(percents, vec![0, 25, 50, 75, 100]);
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
    let estimates: Vec<Option<u32>> = events.iter().map(|event| event.estimated_seconds_remaining).collect();
    assert_eq!(estimates, vec![None, Some(3), Some(2), Some(1), Some(0)]);
    assert_eq!(events[2].message, "Generating CSV export");
}

#[test]
fn PrFTPipelineJsonFourRecordScenario() {
    let mut records = PrFTBatch(3);
    records.push(PrFTUndefinedEducationRecord("entity-x"));
    let mut sink = PrCMemorySink::PrFNew();

    PrCExportPipeline::PrFNew()
        .PrFExportNamed(&records, &PrCAppliedFilters::new(), "json", None, &mut sink)
        .unwrap();

    let document = PrCStructuredReader::PrFParse(&sink.PrFLast().unwrap().PrFAsText()).unwrap();
    assert_eq!(document.summary.total_records, 4);
    assert_eq!(document.metadata.undefined_data_percentage, 25.0);
}

#[test]
fn PrFTPipelineSvgWithoutChartFailsBeforeProcessing() {
    let (callback, events) = PrFTRecorder();
    let pipeline = PrCExportPipeline::PrFNew().PrFWithProgress(callback);
    let mut sink = PrCMemorySink::PrFNew();

    let err = pipeline
        .PrFExport(&PrFTBatch(2), &PrCAppliedFilters::new(), PrCExportFormat::Svg, None, &mut sink)
        .unwrap_err();

    assert_eq!(
        err,
        PrError::ChartSourceRequired {
            format: "svg".to_string()
        }
    );
    assert!(sink.delivered.is_empty());
    let events = events.lock().unwrap();
    assert_eq!(PrFTStages(&events), vec![PrCExportStage::Preparing, PrCExportStage::Error]);
    let last = events.last().unwrap();
    assert_eq!(last.progress_percent, 0);
    assert_eq!(last.message, err.to_string());
}

#[test]
fn PrFTPipelineUnknownFormatFailsAfterPreparing() {
    let (callback, events) = PrFTRecorder();
    let pipeline = PrCExportPipeline::PrFNew().PrFWithProgress(callback);
    let mut sink = PrCMemorySink::PrFNew();

    let err = pipeline
        .PrFExportNamed(&PrFTBatch(1), &PrCAppliedFilters::new(), "docx", None, &mut sink)
        .unwrap_err();

    assert!(matches!(err, PrError::UnsupportedFormat { ref format } if format == "docx"));
    assert_eq!(
        PrFTStages(&events.lock().unwrap()),
        vec![PrCExportStage::Preparing, PrCExportStage::Error]
    );
    assert!(sink.delivered.is_empty());
}

#[test]
fn PrFTPipelineEmptyBatchIsRejected() {
    let mut sink = PrCMemorySink::PrFNew();
    let err = PrCExportPipeline::PrFNew()
        .PrFExport(&[], &PrCAppliedFilters::new(), PrCExportFormat::Json, None, &mut sink)
        .unwrap_err();
    assert_eq!(err, PrError::EmptyBatch);
    assert!(sink.delivered.is_empty());
}

#[test]
fn PrFTPipelineSinkFailureIsReportedThenPropagated() {
    let (callback, events) = PrFTRecorder();
    let pipeline = PrCExportPipeline::PrFNew().PrFWithProgress(callback);
    let mut sink = PrCTFailingSink::default();

    let err = pipeline
        .PrFExport(&PrFTBatch(2), &PrCAppliedFilters::new(), PrCExportFormat::Xlsx, None, &mut sink)
        .unwrap_err();

    assert_eq!(sink.attempts, 1);
    match &err {
        PrError::SinkDelivery { message } => assert!(message.contains("disk full")),
        other => panic!("unexpected error {:?}", other),
    }
    let events = events.lock().unwrap();
    assert_eq!(events[events.len() - 2].stage, PrCExportStage::Downloading);
    assert_eq!(events.last().unwrap().stage, PrCExportStage::Error);
    assert!(events.iter().all(|event| event.stage != PrCExportStage::Complete));
}

#[test]
fn PrFTPipelineNoVectorContentSurfacesAsError() {
    let (callback, events) = PrFTRecorder();
    let pipeline = PrCExportPipeline::PrFNew().PrFWithProgress(callback);
    let mut sink = PrCMemorySink::PrFNew();
    let chart = PrFTChart("<canvas></canvas>");

    let err = pipeline
        .PrFExport(&PrFTBatch(1), &PrCAppliedFilters::new(), PrCExportFormat::Svg, Some(&chart), &mut sink)
        .unwrap_err();

    assert_eq!(err, PrError::NoVectorContent);
    assert!(sink.delivered.is_empty());
    let events = events.lock().unwrap();
    assert_eq!(events.last().unwrap().message, "no vector content found in chart source");
}

#[test]
fn PrFTPipelineChartFormatsSucceedWithSource() {
    let chart = PrFTChart(PR_T_SVG);
    let pipeline = PrCExportPipeline::PrFNew().PrFWithFixedClock(PrFTClock());
    let mut sink = PrCMemorySink::PrFNew();

    let svg = pipeline
        .PrFExport(&PrFTBatch(2), &PrCAppliedFilters::new(), PrCExportFormat::Svg, Some(&chart), &mut sink)
        .unwrap();
    let png = pipeline
        .PrFExport(&PrFTBatch(2), &PrCAppliedFilters::new(), PrCExportFormat::Png, Some(&chart), &mut sink)
        .unwrap();

    assert_eq!(svg.mime_type, "image/svg+xml");
    assert_eq!(png.filename, "sentiment-trend-chart.png.txt");
    assert_eq!(sink.delivered.len(), 2);
}

#[test]
fn PrFTPipelineRejectsInvalidChartOptions() {
    let chart = PrFTChart(PR_T_SVG).PrFWithOptions(PrCChartOptions {
        quality: 0.0,
        ..PrCChartOptions::default()
    });
    let mut sink = PrCMemorySink::PrFNew();
    let err = PrCExportPipeline::PrFNew()
        .PrFExport(&PrFTBatch(1), &PrCAppliedFilters::new(), PrCExportFormat::Png, Some(&chart), &mut sink)
        .unwrap_err();
    assert!(err.is_validation());
    assert!(sink.delivered.is_empty());
}

#[test]
fn PrFTPipelineCancelledBeforeStartNeverReachesSink() {
    let (callback, events) = PrFTRecorder();
    let token = PrCCancellationToken::PrFNew();
    token.PrFCancel();
    let pipeline = PrCExportPipeline::PrFNew()
        .PrFWithProgress(callback)
        .PrFWithCancellation(token);
    let mut sink = PrCMemorySink::PrFNew();

    let err = pipeline
        .PrFExport(&PrFTBatch(1), &PrCAppliedFilters::new(), PrCExportFormat::Csv, None, &mut sink)
        .unwrap_err();

    assert_eq!(
        err,
        PrError::Cancelled {
            stage: "processing".to_string()
        }
    );
    assert!(sink.delivered.is_empty());
    assert_eq!(
        PrFTStages(&events.lock().unwrap()),
        vec![PrCExportStage::Preparing, PrCExportStage::Error]
    );
}

#[test]
fn PrFTPipelineCancelledMidRunStopsBeforeDownloading() {
    let token = PrCCancellationToken::PrFNew();
    let trigger = token.clone();
    let pipeline = PrCExportPipeline::PrFNew()
        .PrFWithProgress(Box::new(move |event: &PrCProgressEvent| {
            if event.stage == PrCExportStage::Generating {
                trigger.PrFCancel();
            }
        }))
        .PrFWithCancellation(token);
    let mut sink = PrCMemorySink::PrFNew();

    let err = pipeline
        .PrFExport(&PrFTBatch(2), &PrCAppliedFilters::new(), PrCExportFormat::Pdf, None, &mut sink)
        .unwrap_err();

    assert_eq!(
        err,
        PrError::Cancelled {
            stage: "downloading".to_string()
        }
    );
    assert!(sink.delivered.is_empty());
}

#[test]
fn PrFTPipelineChannelProgressDeliversEvents() {
    let (tx, rx) = channel();
    let pipeline = PrCExportPipeline::PrFNew().PrFWithProgress(PrFChannelProgress(tx));
    let mut sink = PrCMemorySink::PrFNew();

    pipeline
        .PrFExport(&PrFTBatch(1), &PrCAppliedFilters::new(), PrCExportFormat::Json, None, &mut sink)
        .unwrap();
    drop(pipeline);

    let stages: Vec<PrCExportStage> = rx.iter().map(|event| event.stage).collect();
    assert_eq!(stages.first(), Some(&PrCExportStage::Preparing));
    assert_eq!(stages.last(), Some(&PrCExportStage::Complete));
    assert_eq!(stages.len(), 5);
}

#[test]
fn PrFTPipelineLeavesRecordsUntouched() {
    let records = vec![PrFTUndefinedStateRecord("u"), PrFTUndefinedEducationRecord("e")];
    let before = records.clone();
    let mut sink = PrCMemorySink::PrFNew();
    for format in [PrCExportFormat::Csv, PrCExportFormat::Json, PrCExportFormat::Pdf, PrCExportFormat::Xlsx] {
        PrCExportPipeline::PrFNew()
            .PrFExport(&records, &PrFTFilters(), format, None, &mut sink)
            .unwrap();
    }
    assert_eq!(records, before);
    assert_eq!(sink.delivered.len(), 4);
}

#[test]
fn PrFTPipelineFixedClockMakesOutputReproducible() {
    let pipeline = PrCExportPipeline::PrFNew().PrFWithFixedClock(PrFTClock());
    let batch = PrFTBatch(5);
    for format in PrCExportFormat::ALL.iter().filter(|format| !format.PrFRequiresChart()) {
        let mut first = PrCMemorySink::PrFNew();
        let mut second = PrCMemorySink::PrFNew();
        pipeline.PrFExport(&batch, &PrFTFilters(), *format, None, &mut first).unwrap();
        pipeline.PrFExport(&batch, &PrFTFilters(), *format, None, &mut second).unwrap();
        assert_eq!(first.delivered, second.delivered, "format {}", format);
    }
}

#[test]
fn PrFTPipelineConcurrentInvocationsAreIndependent() {
    let pipeline = Arc::new(PrCExportPipeline::PrFNew().PrFWithFixedClock(PrFTClock()));
    let records = Arc::new(PrFTBatch(20));

    let outputs: Vec<Vec<PrCPayload>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                let records = Arc::clone(&records);
                scope.spawn(move || {
                    let mut sink = PrCMemorySink::PrFNew();
                    for format in [PrCExportFormat::Csv, PrCExportFormat::Xlsx] {
                        pipeline
                            .PrFExport(&records, &PrCAppliedFilters::new(), format, None, &mut sink)
                            .unwrap();
                    }
                    sink.delivered
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(outputs.len(), 4);
    assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn PrFTPipelineFileSinkWritesAtomicallyWithManifest() {
    let dir = tempdir().unwrap();
    let mut sink = PrCFileSink::PrFNew(dir.path()).unwrap();
    let config = PrCExportConfig::PrFFromYaml("file_stem: lagos-q1\npretty_json: false\n").unwrap();
    let pipeline = PrCExportPipeline::PrFNew().PrFWithConfig(config);

    pipeline
        .PrFExport(&PrFTBatch(2), &PrCAppliedFilters::new(), PrCExportFormat::Csv, None, &mut sink)
        .unwrap();
    pipeline
        .PrFExport(&PrFTBatch(3), &PrCAppliedFilters::new(), PrCExportFormat::Json, None, &mut sink)
        .unwrap();
    pipeline
        .PrFExport(&PrFTBatch(4), &PrCAppliedFilters::new(), PrCExportFormat::Csv, None, &mut sink)
        .unwrap();

    let csv_bytes = std::fs::read(dir.path().join("lagos-q1.csv")).unwrap();
    let json_text = std::fs::read_to_string(dir.path().join("lagos-q1.json")).unwrap();
    assert!(!json_text.contains('\n'));

    let manifest_text = std::fs::read_to_string(dir.path().join(PR_MANIFEST_FILENAME)).unwrap();
    let manifest = PrCExportManifest::PrFFromJson(&manifest_text).unwrap();
    assert_eq!(manifest.files.len(), 2);
    let csv_entry = manifest.PrFFile("lagos-q1.csv").unwrap();
    assert_eq!(csv_entry.hash, PrFPayloadHash(&csv_bytes));
    assert_eq!(csv_entry.size, csv_bytes.len() as u64);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let reopened = PrCFileSink::PrFNew(dir.path()).unwrap();
    assert_eq!(reopened.PrFManifest().files.len(), 2);
}

#[test]
fn PrFTFileSinkRejectsEscapingFilenames() {
    let dir = tempdir().unwrap();
    let mut sink = PrCFileSink::PrFNew(dir.path()).unwrap();
    let payload = PrCPayload::PrFText("x".to_string(), "text/plain", "../escape.txt");
    assert!(sink.deliver(&payload).is_err());
    assert!(!dir.path().join("../escape.txt").exists());
}

#[test]
fn PrFTFileSinkWithoutManifestWritesOnlyPayload() {
    let dir = tempdir().unwrap();
    let mut sink = PrCFileSink::PrFNew(dir.path()).unwrap().PrFWithoutManifest();
    PrCExportPipeline::PrFNew()
        .PrFExport(&PrFTBatch(1), &PrCAppliedFilters::new(), PrCExportFormat::Pdf, None, &mut sink)
        .unwrap();

    assert!(sink.PrFRoot().join("multi-dimensional-analysis-report.txt").exists());
    assert!(!dir.path().join(PR_MANIFEST_FILENAME).exists());
    assert!(sink.PrFManifest().files.is_empty());
}

#[test]
fn PrFTPipelineRejectsInvalidConfig() {
    let mut sink = PrCMemorySink::PrFNew();
    let pipeline = PrCExportPipeline::PrFNew().PrFWithConfig(PrCExportConfig::default().with_file_stem("a/b"));
    let err = pipeline
        .PrFExport(&PrFTBatch(1), &PrCAppliedFilters::new(), PrCExportFormat::Csv, None, &mut sink)
        .unwrap_err();
    assert!(err.is_validation());
    assert!(sink.delivered.is_empty());
}

#[test]
fn PrFTFileSinkManifestFailureLeavesNoNewFile() {
    let dir = tempdir().unwrap();
    let mut sink = PrCFileSink::PrFNew(dir.path()).unwrap();
    std::fs::create_dir(dir.path().join(PR_MANIFEST_FILENAME)).unwrap();

    let payload = PrCPayload::PrFText("a,b\n".to_string(), "text/csv", "out.csv");
    assert!(sink.deliver(&payload).is_err());
    assert!(!dir.path().join("out.csv").exists());
    assert!(sink.PrFManifest().files.is_empty());

    let err = PrCExportPipeline::PrFNew()
        .PrFExport(&PrFTBatch(1), &PrCAppliedFilters::new(), PrCExportFormat::Csv, None, &mut sink)
        .unwrap_err();
    assert!(matches!(err, PrError::SinkDelivery { .. }));
    assert!(!dir.path().join("multi-dimensional-analysis.csv").exists());
}

#[test]
fn PrFTFileSinkManifestFailureRestoresPreviousFile() {
    let dir = tempdir().unwrap();
    let mut sink = PrCFileSink::PrFNew(dir.path()).unwrap();
    let first = PrCPayload::PrFText("first\n".to_string(), "text/plain", "report.txt");
    sink.deliver(&first).unwrap();

    let manifest_path = dir.path().join(PR_MANIFEST_FILENAME);
    std::fs::remove_file(&manifest_path).unwrap();
    std::fs::create_dir(&manifest_path).unwrap();

    let second = PrCPayload::PrFText("second\n".to_string(), "text/plain", "report.txt");
    assert!(sink.deliver(&second).is_err());
    assert_eq!(std::fs::read_to_string(dir.path().join("report.txt")).unwrap(), "first\n");
    assert_eq!(sink.PrFManifest().PrFFile("report.txt").unwrap().hash, PrFPayloadHash(b"first\n"));
}
