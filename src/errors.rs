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

//! # Prism Error Module
//!
//! This module defines the error type shared by every stage of the export
//! pipeline, from record validation through serialization to delivery.
//!
//! ## Error Categories
//!
//! - **EmptyBatch**: An export was requested for zero records
//! - **UnsupportedFormat**: The requested target format is not recognized
//! - **ChartSourceRequired**: An image format was requested without a chart source
//! - **NoVectorContent**: The chart source does not embed any SVG markup
//! - **SinkDelivery**: The sink collaborator failed to accept the payload
//! - **Cancelled**: The caller cancelled the export at a stage boundary
//! - **Validation**: Records or options violate their invariants
//! - **Serializer**: A format serializer failed while rendering
//! - **Serde / Io / Internal**: Wrapped lower-level failures
//!
//! Validation-class errors are raised before the pipeline leaves its
//! `preparing` stage. Everything else is reported through a terminal
//! `error` progress event and then returned to the caller.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Prism.
pub type Result<T> = std::result::Result<T, PrError>;

/// Canonical error enumeration for Prism.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrError {
    /// The record batch handed to the pipeline was empty.
    #[error("cannot export an empty record batch")]
    EmptyBatch,

    /// The requested export format is not one of the supported targets.
    #[error("unsupported export format '{format}'")]
    UnsupportedFormat { format: String },

    /// Chart exports need a chart source to render from.
    #[error("a chart source is required for '{format}' export")]
    ChartSourceRequired { format: String },

    /// The chart source carries no `<svg>` element.
    #[error("no vector content found in chart source")]
    NoVectorContent,

    /// The sink rejected or failed to deliver the payload.
    #[error("sink delivery failed: {message}")]
    SinkDelivery { message: String },

    /// The export was cancelled before the named stage started.
    #[error("export cancelled before stage '{stage}'")]
    Cancelled { stage: String },

    /// Validation errors triggered by invalid records or options.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Any failure raised by a format serializer.
    #[error("serializer '{serializer}' failed: {message}")]
    Serializer { serializer: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for PrError {
    fn from(err: io::Error) -> Self {
        PrError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PrError {
    fn from(err: serde_json::Error) -> Self {
        PrError::Serde(err.to_string())
    }
}

impl From<serde_yaml::Error> for PrError {
    fn from(err: serde_yaml::Error) -> Self {
        PrError::Serde(err.to_string())
    }
}

impl From<std::fmt::Error> for PrError {
    fn from(err: std::fmt::Error) -> Self {
        PrError::Internal(format!("formatting failed: {}", err))
    }
}

impl From<csv::Error> for PrError {
    fn from(err: csv::Error) -> Self {
        PrError::Serde(format!("csv: {}", err))
    }
}

impl PrError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        PrError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct serializer errors.
    pub fn serializer(name: impl Into<String>, message: impl Into<String>) -> Self {
        PrError::Serializer {
            serializer: name.into(),
            message: message.into(),
        }
    }

    /// Wraps a sink failure, keeping the whole cause chain in the message.
    pub fn sink(err: &anyhow::Error) -> Self {
        PrError::SinkDelivery {
            message: format!("{:#}", err),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        PrError::Internal(message.into())
    }

    /// Returns true for errors detected while validating the request, before
    /// any export work starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PrError::EmptyBatch
                | PrError::UnsupportedFormat { .. }
                | PrError::ChartSourceRequired { .. }
                | PrError::Validation { .. }
        )
    }
}
