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

//! # Prism Core Library
//!
//! Prism renders batches of multi-dimensional analytical records into
//! external representations: CSV, JSON, a narrative text report, a
//! multi-sheet CSV bundle and chart snapshots. Every output embeds the same
//! derived data-quality metadata.
//!
//! ## Module Overview
//!
//! - **record**: Enriched record model with its six analytical dimensions
//! - **metadata**: Export-wide statistics derived once per invocation
//! - **flatten**: Ordered, format-agnostic flat rows and the field schema
//! - **serializer**: Serializer contract and payload type
//! - **export**: One serializer per target format, plus the file manifest
//! - **pipeline**: Stage-driven orchestrator with progress and cancellation
//! - **progress**: Progress events, callbacks and cancellation tokens
//! - **sink**: Delivery targets for rendered payloads
//! - **config**: Export and chart options, loadable from YAML or JSON
//! - **io**: Loading record batches from JSON and JSONL
//!
//! ## Feature Flags
//!
//! - `parallel`: Flattens records with rayon (order preserved)
//! - `full`: Enables all features
//!
//! ## Quick Start
//!
//! ```rust
//! use prism::{PrCEnrichedRecord, PrCExportFormat, PrCExportPipeline, PrCMemorySink};
//! use prism::metadata::PrCAppliedFilters;
//!
//! let records = vec![PrCEnrichedRecord::PrFNew("c-1", "Ada Obi", "PDP", "Senator", "Lagos")];
//! let mut sink = PrCMemorySink::PrFNew();
//!
//! let receipt = PrCExportPipeline::PrFNew()
//!     .PrFExport(&records, &PrCAppliedFilters::new(), PrCExportFormat::Csv, None, &mut sink)
//!     .unwrap();
//!
//! assert_eq!(receipt.filename, "multi-dimensional-analysis.csv");
//! assert_eq!(sink.delivered.len(), 1);
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, PrError>`. Failed exports never reach
//! the sink.

#![allow(non_snake_case)]

pub mod config;
pub mod errors;
pub mod export;
pub mod flatten;
pub mod io;
pub mod metadata;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod serializer;
pub mod sink;

pub use config::{PrCChartOptions, PrCExportConfig};
pub use errors::{PrError, Result};
pub use export::{PrCChartRequest, PrCChartSource, PrCDerivedSummary, PrCSummaryProvider};
pub use flatten::{PrCDimension, PrCDimensionFlattener, PrCFlatRow, PrCFlatValue, PR_FLAT_FIELDS};
pub use io::{PrCRecordFormat, PrCRecordIO};
pub use metadata::{PrCAppliedFilters, PrCExportMetadata, PrCMetadataCalculator, PR_CONFIDENCE_THRESHOLD};
pub use pipeline::{PrCExportFormat, PrCExportPipeline, PrCExportReceipt};
pub use progress::{
    PrCCancellationToken, PrCExportStage, PrCProgressCallback, PrCProgressEvent, PrFChannelProgress,
};
pub use record::{
    PrCDataQuality, PrCDemographic, PrCDemographicField, PrCEngagement, PrCEnrichedRecord,
    PrCGeoLevel, PrCGeographic, PrCRecordBatch, PrCSentiment, PrCTemporal, PrCTopics,
    PR_UNDEFINED_LABEL,
};
pub use serializer::{PrCPayload, PrCSerializer};
pub use sink::{PrCFileSink, PrCMemorySink, PrCSink};
