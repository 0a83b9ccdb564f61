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

//! # Prism Export Pipeline
//!
//! Drives one export invocation through its stages:
//!
//! ```text
//! preparing(0) -> processing(25) -> generating(50) -> downloading(75) -> complete(100)
//!                                                                   \-> error(0)
//! ```
//!
//! Each stage emits exactly one progress event before its work begins. A
//! failure anywhere emits a single `error` event carrying the error message
//! and is then returned to the caller. The sink is only reached once a
//! payload has been fully rendered.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::config::PrCExportConfig;
use crate::errors::{PrError, Result};
use crate::export::{
    PrCChartRequest, PrCDerivedSummary, PrCNarrativeSerializer, PrCRasterSerializer,
    PrCStructuredSerializer, PrCSummaryProvider, PrCTabularSerializer, PrCVectorSerializer,
    PrCWorkbookSerializer,
};
use crate::flatten::{PrCDimensionFlattener, PrCFlatRow};
use crate::metadata::{PrCAppliedFilters, PrCExportMetadata, PrCMetadataCalculator};
use crate::progress::{PrCCancellationToken, PrCExportStage, PrCProgressCallback, PrCProgressEvent};
use crate::record::PrCEnrichedRecord;
use crate::serializer::{PrCPayload, PrCSerializer, PrFExecuteSerializer};
use crate::sink::PrCSink;

/// Export targets. `Pdf` and `Xlsx` produce text surrogates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrCExportFormat {
    Csv,
    Json,
    Pdf,
    Xlsx,
    Png,
    Svg,
}

impl PrCExportFormat {
    pub const ALL: [PrCExportFormat; 6] = [
        PrCExportFormat::Csv,
        PrCExportFormat::Json,
        PrCExportFormat::Pdf,
        PrCExportFormat::Xlsx,
        PrCExportFormat::Png,
        PrCExportFormat::Svg,
    ];

    #[allow(non_snake_case)]
    pub fn PrFLabel(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// Chart formats render from a chart source instead of the rows.
    #[allow(non_snake_case)]
    pub fn PrFRequiresChart(self) -> bool {
        matches!(self, Self::Png | Self::Svg)
    }
}

impl fmt::Display for PrCExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.PrFLabel())
    }
}

impl FromStr for PrCExportFormat {
    type Err = PrError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.PrFLabel() == wanted)
            .ok_or_else(|| PrError::UnsupportedFormat {
                format: s.to_string(),
            })
    }
}

/// Outcome of a successful export.
#[derive(Clone, Debug, PartialEq)]
pub struct PrCExportReceipt {
    pub format: PrCExportFormat,
    pub filename: String,
    pub mime_type: String,
    pub bytes: usize,
    pub metadata: PrCExportMetadata,
    pub elapsed_ms: u128,
}

/// Orchestrates exports. One pipeline may serve any number of invocations,
/// including concurrent ones from several threads; invocations share no
/// mutable state and never modify the records they are given.
pub struct PrCExportPipeline {
    config: PrCExportConfig,
    progress: Option<PrCProgressCallback>,
    cancellation: Option<PrCCancellationToken>,
    summary: Arc<dyn PrCSummaryProvider>,
    clock: Option<DateTime<Utc>>,
}

impl fmt::Debug for PrCExportPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrCExportPipeline")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .field("cancellation", &self.cancellation)
            .field("summary", &self.summary)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for PrCExportPipeline {
    fn default() -> Self {
        Self {
            config: PrCExportConfig::default(),
            progress: None,
            cancellation: None,
            summary: Arc::new(PrCDerivedSummary),
            clock: None,
        }
    }
}

impl PrCExportPipeline {
    #[allow(non_snake_case)]
    pub fn PrFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn PrFWithConfig(mut self, config: PrCExportConfig) -> Self {
        self.config = config;
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithProgress(mut self, callback: PrCProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithCancellation(mut self, token: PrCCancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFWithSummaryProvider(mut self, provider: Arc<dyn PrCSummaryProvider>) -> Self {
        self.summary = provider;
        self
    }

    /// Pins the generation timestamp, making every output byte-reproducible.
    #[allow(non_snake_case)]
    pub fn PrFWithFixedClock(mut self, at: DateTime<Utc>) -> Self {
        self.clock = Some(at);
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFConfig(&self) -> &PrCExportConfig {
        &self.config
    }

    /// Exports `records` as `format` and hands the payload to `sink`.
    ///
    /// `chart` is required for [`PrCExportFormat::Png`] and
    /// [`PrCExportFormat::Svg`] and ignored otherwise.
    #[allow(non_snake_case)]
    pub fn PrFExport(
        &self,
        records: &[PrCEnrichedRecord],
        filters: &PrCAppliedFilters,
        format: PrCExportFormat,
        chart: Option<&PrCChartRequest>,
        sink: &mut dyn PrCSink,
    ) -> Result<PrCExportReceipt> {
        self.run(records, filters, Ok(format), chart, sink)
    }

    /// Like [`PrFExport`](Self::PrFExport) with the format given by name.
    /// Unknown names fail with `UnsupportedFormat` after the `preparing`
    /// event.
    #[allow(non_snake_case)]
    pub fn PrFExportNamed(
        &self,
        records: &[PrCEnrichedRecord],
        filters: &PrCAppliedFilters,
        format: &str,
        chart: Option<&PrCChartRequest>,
        sink: &mut dyn PrCSink,
    ) -> Result<PrCExportReceipt> {
        self.run(records, filters, format.parse(), chart, sink)
    }

    fn run(
        &self,
        records: &[PrCEnrichedRecord],
        filters: &PrCAppliedFilters,
        format: Result<PrCExportFormat>,
        chart: Option<&PrCChartRequest>,
        sink: &mut dyn PrCSink,
    ) -> Result<PrCExportReceipt> {
        let started = Instant::now();
        self.emit(PrCProgressEvent::PrFAt(PrCExportStage::Preparing, "Preparing export"));

        match self.stages(records, filters, format, chart, sink, started) {
            Ok(receipt) => {
                self.emit(PrCProgressEvent::PrFAt(
                    PrCExportStage::Complete,
                    format!("Export complete: {}", receipt.filename),
                ));
                log::info!(
                    "exported {} records as {} to {} ({} bytes, {} ms)",
                    receipt.metadata.total_records,
                    receipt.format,
                    receipt.filename,
                    receipt.bytes,
                    receipt.elapsed_ms
                );
                Ok(receipt)
            }
            Err(err) => {
                match &err {
                    PrError::Cancelled { .. } => log::warn!("{}", err),
                    _ => log::error!("export failed: {}", err),
                }
                self.emit(PrCProgressEvent::PrFAt(PrCExportStage::Error, err.to_string()));
                Err(err)
            }
        }
    }

    fn stages(
        &self,
        records: &[PrCEnrichedRecord],
        filters: &PrCAppliedFilters,
        format: Result<PrCExportFormat>,
        chart: Option<&PrCChartRequest>,
        sink: &mut dyn PrCSink,
        started: Instant,
    ) -> Result<PrCExportReceipt> {
        let format = format?;
        self.validate(records, format, chart)?;

        self.enter(
            PrCExportStage::Processing,
            format!("Processing {} records across 6 dimensions", records.len()),
        )?;
        let metadata = match self.clock {
            Some(at) => PrCMetadataCalculator::PrFComputeAt(records, filters, at)?,
            None => PrCMetadataCalculator::PrFCompute(records, filters)?,
        };
        let rows = PrCDimensionFlattener::PrFFlattenAll(records);

        self.enter(
            PrCExportStage::Generating,
            format!("Generating {} export", format.PrFLabel().to_ascii_uppercase()),
        )?;
        let payload = self.render(format, chart, &rows, &metadata)?;

        self.enter(
            PrCExportStage::Downloading,
            format!("Delivering {}", payload.suggested_filename),
        )?;
        sink.deliver(&payload).map_err(|err| PrError::sink(&err))?;

        Ok(PrCExportReceipt {
            format,
            filename: payload.suggested_filename,
            mime_type: payload.mime_type,
            bytes: payload.bytes.len(),
            metadata,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }

    /// Input checks, all before leaving `preparing`.
    fn validate(
        &self,
        records: &[PrCEnrichedRecord],
        format: PrCExportFormat,
        chart: Option<&PrCChartRequest>,
    ) -> Result<()> {
        if records.is_empty() {
            return Err(PrError::EmptyBatch);
        }
        if format.PrFRequiresChart() {
            let request = chart.ok_or_else(|| PrError::ChartSourceRequired {
                format: format.to_string(),
            })?;
            request.options.PrFValidate()?;
        }
        self.config.PrFValidate()
    }

    fn enter(&self, stage: PrCExportStage, message: String) -> Result<()> {
        if let Some(token) = &self.cancellation {
            if token.PrFIsCancelled() {
                return Err(PrError::Cancelled {
                    stage: stage.to_string(),
                });
            }
        }
        log::debug!("export stage {}: {}", stage, message);
        self.emit(PrCProgressEvent::PrFAt(stage, message));
        Ok(())
    }

    fn emit(&self, event: PrCProgressEvent) {
        if let Some(callback) = &self.progress {
            callback(&event);
        }
    }

    fn render(
        &self,
        format: PrCExportFormat,
        chart: Option<&PrCChartRequest>,
        rows: &[PrCFlatRow],
        metadata: &PrCExportMetadata,
    ) -> Result<PrCPayload> {
        let chart_request = || {
            chart.cloned().ok_or_else(|| PrError::ChartSourceRequired {
                format: format.to_string(),
            })
        };
        let serializer: Box<dyn PrCSerializer> = match format {
            PrCExportFormat::Csv => Box::new(PrCTabularSerializer::PrFNew(&self.config)),
            PrCExportFormat::Json => Box::new(PrCStructuredSerializer::PrFNew(&self.config)),
            PrCExportFormat::Pdf => Box::new(PrCNarrativeSerializer::PrFNew(
                &self.config,
                Arc::clone(&self.summary),
            )),
            PrCExportFormat::Xlsx => Box::new(PrCWorkbookSerializer::PrFNew(&self.config)),
            PrCExportFormat::Png => Box::new(PrCRasterSerializer::PrFNew(chart_request()?)),
            PrCExportFormat::Svg => Box::new(PrCVectorSerializer::PrFNew(chart_request()?)),
        };
        PrFExecuteSerializer(serializer.as_ref(), rows, metadata)
    }
}
