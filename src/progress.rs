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

//! # Prism Progress Reporting
//!
//! Stage events emitted by the export pipeline and the cancellation token it
//! checks between stages. Callbacks run synchronously on the exporting thread.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Stage of a single export invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrCExportStage {
    Preparing,
    Processing,
    Generating,
    Downloading,
    Complete,
    Error,
}

impl PrCExportStage {
    #[allow(non_snake_case)]
    pub fn PrFPercent(self) -> u8 {
        match self {
            Self::Preparing => 0,
            Self::Processing => 25,
            Self::Generating => 50,
            Self::Downloading => 75,
            Self::Complete => 100,
            Self::Error => 0,
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFEstimatedSeconds(self) -> Option<u32> {
        match self {
            Self::Processing => Some(3),
            Self::Generating => Some(2),
            Self::Downloading => Some(1),
            Self::Complete => Some(0),
            Self::Preparing | Self::Error => None,
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFLabel(self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Processing => "processing",
            Self::Generating => "generating",
            Self::Downloading => "downloading",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    #[allow(non_snake_case)]
    pub fn PrFIsTerminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl fmt::Display for PrCExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.PrFLabel())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrCProgressEvent {
    pub stage: PrCExportStage,
    pub progress_percent: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub estimated_seconds_remaining: Option<u32>,
}

impl PrCProgressEvent {
    /// Event for `stage` with the stage's fixed percent and estimate.
    #[allow(non_snake_case)]
    pub fn PrFAt(stage: PrCExportStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress_percent: stage.PrFPercent(),
            message: message.into(),
            estimated_seconds_remaining: stage.PrFEstimatedSeconds(),
        }
    }
}

pub type PrCProgressCallback = Box<dyn Fn(&PrCProgressEvent) + Send + Sync>;

/// Forwards every event into a channel. Send failures are ignored since a
/// dropped receiver only means nobody is listening anymore.
#[allow(non_snake_case)]
pub fn PrFChannelProgress(sender: Sender<PrCProgressEvent>) -> PrCProgressCallback {
    let sender = Mutex::new(sender);
    Box::new(move |event: &PrCProgressEvent| {
        if let Ok(sender) = sender.lock() {
            let _ = sender.send(event.clone());
        }
    })
}

/// Shared flag checked by the pipeline at stage boundaries.
#[derive(Clone, Debug, Default)]
pub struct PrCCancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl PrCCancellationToken {
    #[allow(non_snake_case)]
    pub fn PrFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn PrFCancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[allow(non_snake_case)]
    pub fn PrFIsCancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
