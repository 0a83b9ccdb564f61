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

use serde::{Deserialize, Serialize};

use crate::config::PrCChartOptions;

/// Markup handed over by the chart-rendering collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrCChartSource {
    /// Chart kind, e.g. `sentiment-trend`. Drives the output filename.
    pub chart_type: String,
    /// Rendered element markup, expected to contain an `<svg>` element.
    pub markup: String,
}

impl PrCChartSource {
    #[allow(non_snake_case)]
    pub fn PrFNew(chart_type: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            chart_type: chart_type.into(),
            markup: markup.into(),
        }
    }

    /// Filename-safe chart type: lower-case ASCII alphanumerics joined by
    /// single dashes, `chart` when nothing usable remains.
    #[allow(non_snake_case)]
    pub fn PrFSlug(&self) -> String {
        let mut slug = String::new();
        for ch in self.chart_type.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-').to_string();
        if slug.is_empty() {
            "chart".to_string()
        } else {
            slug
        }
    }
}

/// Chart source plus rendering options for the `svg` and `png` formats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrCChartRequest {
    pub source: PrCChartSource,
    #[serde(default)]
    pub options: PrCChartOptions,
}

impl PrCChartRequest {
    #[allow(non_snake_case)]
    pub fn PrFNew(source: PrCChartSource) -> Self {
        Self {
            source,
            options: PrCChartOptions::default(),
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFWithOptions(mut self, options: PrCChartOptions) -> Self {
        self.options = options;
        self
    }

    /// `<slug>-chart.<extension>`
    #[allow(non_snake_case)]
    pub fn PrFFilename(&self, extension: &str) -> String {
        format!("{}-chart.{}", self.source.PrFSlug(), extension)
    }
}
