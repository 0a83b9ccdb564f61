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

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{PrError, Result};

/// Export-wide settings shared by the serializers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrCExportConfig {
    /// Stem for generated filenames.
    pub file_stem: String,
    /// Pretty-print JSON output.
    pub pretty_json: bool,
    /// Version string written into JSON summaries.
    pub export_version: String,
    /// Banner line of the narrative report.
    pub report_title: String,
}

impl Default for PrCExportConfig {
    fn default() -> Self {
        Self {
            file_stem: "multi-dimensional-analysis".to_string(),
            pretty_json: true,
            export_version: "1.0".to_string(),
            report_title: "MULTI-DIMENSIONAL POLITICAL ANALYSIS REPORT".to_string(),
        }
    }
}

impl PrCExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_stem(mut self, stem: &str) -> Self {
        self.file_stem = stem.to_string();
        self
    }

    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    pub fn with_export_version(mut self, version: &str) -> Self {
        self.export_version = version.to_string();
        self
    }

    pub fn with_report_title(mut self, title: &str) -> Self {
        self.report_title = title.to_string();
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFValidate(&self) -> Result<()> {
        let stem = self.file_stem.trim();
        if stem.is_empty() {
            return Err(PrError::validation("file_stem must not be empty"));
        }
        if stem.contains(['/', '\\']) {
            return Err(PrError::validation(format!(
                "file_stem '{}' must not contain path separators",
                stem
            )));
        }
        Ok(())
    }

    #[allow(non_snake_case)]
    pub fn PrFFromYaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.PrFValidate()?;
        Ok(config)
    }

    #[allow(non_snake_case)]
    pub fn PrFFromJson(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.PrFValidate()?;
        Ok(config)
    }

    /// Loads a config file, choosing the parser from its extension.
    #[allow(non_snake_case)]
    pub fn PrFLoad(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Self::PrFFromYaml(&text),
            "json" => Self::PrFFromJson(&text),
            other => Err(PrError::validation(format!(
                "unsupported config extension '{}'",
                other
            ))),
        }
    }
}

/// Rendering options for chart snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrCChartOptions {
    pub width: u32,
    pub height: u32,
    /// Encoder quality in `(0, 1]`.
    pub quality: f64,
    /// Embed export metadata in vector output.
    pub include_metadata: bool,
}

impl Default for PrCChartOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            quality: 0.95,
            include_metadata: true,
        }
    }
}

impl PrCChartOptions {
    #[allow(non_snake_case)]
    pub fn PrFValidate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PrError::validation(format!(
                "chart size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(PrError::validation(format!(
                "chart quality must be within (0, 1], got {}",
                self.quality
            )));
        }
        Ok(())
    }
}
