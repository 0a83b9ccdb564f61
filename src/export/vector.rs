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

//! # Vector Snapshot Export
//!
//! Passes the chart's SVG through unchanged, optionally injecting a comment
//! block with export metadata right after the opening `<svg ...>` tag.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{PrError, Result};
use crate::export::chart::PrCChartRequest;
use crate::flatten::PrCFlatRow;
use crate::metadata::PrCExportMetadata;
use crate::serializer::{PrCPayload, PrCSerializer};

pub const PR_SVG_MIME: &str = "image/svg+xml";

/// Opening, closing or self-closing `svg` tag.
const SVG_TAG: &str = r"(?i)<(/?)svg\b[^>]*>";

static SVG_TAG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn svg_tag_regex() -> Result<&'static Regex> {
    SVG_TAG_REGEX
        .get_or_init(|| Regex::new(SVG_TAG).ok())
        .as_ref()
        .ok_or_else(|| PrError::internal("svg tag pattern failed to compile"))
}

/// Outermost `<svg>` element located in chart markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrCSvgElement<'a> {
    /// Full element text, opening tag through the matching close.
    pub text: &'a str,
    /// Byte offset just past the opening tag, relative to `text`.
    pub open_tag_end: usize,
    /// The element is a single `<svg ... />` tag.
    pub self_closing: bool,
}

#[derive(Debug, Clone)]
pub struct PrCVectorSerializer {
    request: PrCChartRequest,
}

impl PrCVectorSerializer {
    #[allow(non_snake_case)]
    pub fn PrFNew(request: PrCChartRequest) -> Self {
        Self { request }
    }

    /// First top-level `<svg>` element in the markup. Nested `svg` elements
    /// are kept inside it by tracking tag depth.
    #[allow(non_snake_case)]
    pub fn PrFExtractSvg(markup: &str) -> Result<PrCSvgElement<'_>> {
        let mut start: Option<(usize, usize)> = None;
        let mut depth = 0usize;
        for tag in svg_tag_regex()?.captures_iter(markup) {
            let Some(whole) = tag.get(0) else {
                continue;
            };
            let closing = tag.get(1).map_or(false, |slash| !slash.as_str().is_empty());
            let self_closing = !closing && whole.as_str().ends_with("/>");
            match start {
                None if closing => continue,
                None if self_closing => {
                    return Ok(PrCSvgElement {
                        text: whole.as_str(),
                        open_tag_end: whole.len(),
                        self_closing: true,
                    });
                }
                None => {
                    start = Some((whole.start(), whole.end()));
                    depth = 1;
                }
                Some(_) if self_closing => {}
                Some(_) if closing => depth -= 1,
                Some(_) => depth += 1,
            }
            if let (Some((begin, open_end)), 0) = (start, depth) {
                return Ok(PrCSvgElement {
                    text: &markup[begin..whole.end()],
                    open_tag_end: open_end - begin,
                    self_closing: false,
                });
            }
        }
        Err(PrError::NoVectorContent)
    }

    /// Comment block embedded into exported SVGs.
    #[allow(non_snake_case)]
    pub fn PrFMetadataComment(metadata: &PrCExportMetadata) -> String {
        format!(
            "<!--\n  Multi-Dimensional Analysis Export\n  Export Date: {}\n  Records: {}\n  Quality Score: {}\n-->",
            metadata.PrFGeneratedAt(),
            metadata.total_records,
            metadata.PrFQualityDisplay()
        )
    }

    fn inject(element: &PrCSvgElement<'_>, comment: &str) -> String {
        if element.self_closing {
            return element.text.to_string();
        }
        let (open, rest) = element.text.split_at(element.open_tag_end);
        let mut out = String::with_capacity(element.text.len() + comment.len() + 1);
        out.push_str(open);
        out.push('\n');
        out.push_str(comment);
        out.push_str(rest);
        out
    }
}

impl PrCSerializer for PrCVectorSerializer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn serialize(&self, _rows: &[PrCFlatRow], metadata: &PrCExportMetadata) -> Result<PrCPayload> {
        let element = Self::PrFExtractSvg(&self.request.source.markup)?;
        let body = if self.request.options.include_metadata {
            Self::inject(&element, &Self::PrFMetadataComment(metadata))
        } else {
            element.text.to_string()
        };
        Ok(PrCPayload::PrFText(body, PR_SVG_MIME, self.request.PrFFilename("svg")))
    }
}
