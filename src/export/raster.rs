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

//! # Raster Snapshot Export
//!
//! No rasterization happens here. The `png` format yields a plain-text
//! notification describing the requested image, delivered like any other
//! payload, so the text is reproducible for a given request and metadata.

use crate::errors::Result;
use crate::export::chart::PrCChartRequest;
use crate::export::narrative::PR_TEXT_MIME;
use crate::flatten::PrCFlatRow;
use crate::metadata::PrCExportMetadata;
use crate::serializer::{PrCPayload, PrCSerializer};

#[derive(Debug, Clone)]
pub struct PrCRasterSerializer {
    request: PrCChartRequest,
}

impl PrCRasterSerializer {
    #[allow(non_snake_case)]
    pub fn PrFNew(request: PrCChartRequest) -> Self {
        Self { request }
    }

    #[allow(non_snake_case)]
    pub fn PrFNotification(&self, metadata: &PrCExportMetadata) -> String {
        let options = &self.request.options;
        format!(
            "PNG export requested for chart '{}' at {}x{} pixels, quality {:.2}.\n\
             Raster rendering is not available; export the chart as SVG for a full-fidelity snapshot.\n\
             Export Date: {}\n\
             Records: {}\n\
             Quality Score: {}\n",
            self.request.source.PrFSlug(),
            options.width,
            options.height,
            options.quality,
            metadata.PrFGeneratedAt(),
            metadata.total_records,
            metadata.PrFQualityDisplay()
        )
    }
}

impl PrCSerializer for PrCRasterSerializer {
    fn name(&self) -> &'static str {
        "png"
    }

    fn serialize(&self, _rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> Result<PrCPayload> {
        log::info!(
            "png export for '{}' is a notification stub; no image is produced",
            self.request.source.chart_type
        );
        Ok(PrCPayload::PrFText(
            self.PrFNotification(metadata),
            PR_TEXT_MIME,
            self.request.PrFFilename("png.txt"),
        ))
    }
}
