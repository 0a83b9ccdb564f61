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

//! # Format Serializers Module
//!
//! One serializer per export target, all implementing
//! [`PrCSerializer`](crate::serializer::PrCSerializer), plus the manifest kept
//! by file-based sinks.
//!
//! ## Module Components
//!
//! - **Tabular** ([tabular.rs](tabular/index.html)): CSV with a trailing `#` metadata block
//! - **Structured** ([structured.rs](structured/index.html)): JSON document with metadata and summary
//! - **Narrative** ([narrative.rs](narrative/index.html)): Plain-text report for the `pdf` format
//! - **Workbook** ([workbook.rs](workbook/index.html)): Multi-sheet CSV bundle for the `xlsx` format
//! - **Vector** ([vector.rs](vector/index.html)): SVG passthrough with metadata comment
//! - **Raster** ([raster.rs](raster/index.html)): Notification stub for the `png` format
//! - **Manifest** ([manifest.rs](manifest/index.html)): Checksummed record of written files
//!
//! ## Filenames
//!
//! | format | filename |
//! |--------|----------|
//! | csv    | `<stem>.csv` |
//! | json   | `<stem>.json` |
//! | pdf    | `<stem>-report.txt` |
//! | xlsx   | `<stem>.xlsx.csv` |
//! | svg    | `<chart>-chart.svg` |
//! | png    | `<chart>-chart.png.txt` |

pub mod chart;
pub mod manifest;
pub mod narrative;
pub mod raster;
pub mod structured;
pub mod tabular;
pub mod vector;
pub mod workbook;

pub use chart::{PrCChartRequest, PrCChartSource};
pub use manifest::{PrCExportManifest, PrCManifestBuilder, PrCManifestFile, PrFPayloadHash};
pub use narrative::{PrCDerivedSummary, PrCNarrativeSerializer, PrCSummaryProvider};
pub use raster::PrCRasterSerializer;
pub use structured::{PrCStructuredDocument, PrCStructuredReader, PrCStructuredSerializer, PrCStructuredSummary};
pub use tabular::{PrCTabularReader, PrCTabularSerializer};
pub use vector::PrCVectorSerializer;
pub use workbook::{PrCSheet, PrCWorkbookSerializer, PrFSplitSheets};
