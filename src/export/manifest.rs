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

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{PrError, Result};
use crate::serializer::PrCPayload;

/// BLAKE3 digest of a payload, hex encoded.
#[allow(non_snake_case)]
pub fn PrFPayloadHash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrCManifestFile {
    pub path: String,
    pub size: u64,
    pub hash: String,
    pub mime_type: String,
    pub written_at: DateTime<Utc>,
}

impl PrCManifestFile {
    #[allow(non_snake_case)]
    pub fn PrFFromPayload(payload: &PrCPayload, written_at: DateTime<Utc>) -> Self {
        Self {
            path: payload.suggested_filename.clone(),
            size: payload.bytes.len() as u64,
            hash: PrFPayloadHash(&payload.bytes),
            mime_type: payload.mime_type.clone(),
            written_at,
        }
    }
}

/// Record of every file a sink has written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrCExportManifest {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub total_size: u64,
    pub files: Vec<PrCManifestFile>,
    pub metadata: BTreeMap<String, String>,
}

impl Default for PrCExportManifest {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            created_at: Utc::now(),
            total_size: 0,
            files: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }
}

impl PrCExportManifest {
    /// Adds a file entry, replacing any earlier entry for the same path.
    #[allow(non_snake_case)]
    pub fn PrFRecord(&mut self, file: PrCManifestFile) {
        self.files.retain(|existing| existing.path != file.path);
        self.files.push(file);
        self.total_size = self.files.iter().map(|f| f.size).sum();
    }

    #[allow(non_snake_case)]
    pub fn PrFFile(&self, path: &str) -> Option<&PrCManifestFile> {
        self.files.iter().find(|f| f.path == path)
    }

    #[allow(non_snake_case)]
    pub fn PrFToJson(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PrError::internal(format!("Failed to serialize manifest: {}", e)))
    }

    #[allow(non_snake_case)]
    pub fn PrFFromJson(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PrError::validation(format!("Invalid manifest JSON: {}", e)))
    }
}

#[derive(Debug, Default)]
pub struct PrCManifestBuilder {
    manifest: PrCExportManifest,
}

impl PrCManifestBuilder {
    #[allow(non_snake_case)]
    pub fn PrFNew() -> Self {
        Self {
            manifest: PrCExportManifest::default(),
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFAddFile(mut self, file: PrCManifestFile) -> Self {
        self.manifest.PrFRecord(file);
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFAddMetadata(mut self, key: &str, value: &str) -> Self {
        self.manifest.metadata.insert(key.to_string(), value.to_string());
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFBuild(self) -> PrCExportManifest {
        self.manifest
    }
}
