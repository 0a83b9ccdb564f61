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

//! # Prism Serializer Module
//!
//! Defines the contract shared by all format serializers. A serializer turns
//! flattened rows plus the export metadata into a [`PrCPayload`] and performs
//! no I/O of its own; delivering the payload is the sink's job.
//!
//! ```rust
//! use prism::serializer::{PrCPayload, PrCSerializer};
//! use prism::flatten::PrCFlatRow;
//! use prism::metadata::PrCExportMetadata;
//! use prism::errors::Result;
//!
//! #[derive(Debug)]
//! struct CountOnly;
//!
//! impl PrCSerializer for CountOnly {
//!     fn name(&self) -> &'static str {
//!         "count"
//!     }
//!
//!     fn serialize(&self, rows: &[PrCFlatRow], _meta: &PrCExportMetadata) -> Result<PrCPayload> {
//!         Ok(PrCPayload::PrFText(rows.len().to_string(), "text/plain", "count.txt"))
//!     }
//! }
//! ```

use crate::errors::{PrError, Result};
use crate::flatten::PrCFlatRow;
use crate::metadata::PrCExportMetadata;

/// A rendered export ready for delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrCPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub suggested_filename: String,
}

impl PrCPayload {
    #[allow(non_snake_case)]
    pub fn PrFText(text: String, mime_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            bytes: text.into_bytes(),
            mime_type: mime_type.into(),
            suggested_filename: filename.into(),
        }
    }

    /// Payload bytes as UTF-8, lossily.
    #[allow(non_snake_case)]
    pub fn PrFAsText(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    #[allow(non_snake_case)]
    pub fn PrFLen(&self) -> usize {
        self.bytes.len()
    }
}

/// Contract every format serializer fulfills.
///
/// Implementations must be deterministic: the same rows and metadata always
/// produce byte-identical payloads.
pub trait PrCSerializer: std::fmt::Debug {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Renders rows and metadata into a payload.
    fn serialize(&self, rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> Result<PrCPayload>;
}

/// Runs a serializer, tagging any failure with the serializer's name.
#[allow(non_snake_case)]
pub fn PrFExecuteSerializer(
    serializer: &dyn PrCSerializer,
    rows: &[PrCFlatRow],
    metadata: &PrCExportMetadata,
) -> Result<PrCPayload> {
    serializer.serialize(rows, metadata).map_err(|err| match err {
        PrError::Serializer { .. } | PrError::NoVectorContent => err,
        other => PrError::serializer(serializer.name(), other.to_string()),
    })
}
