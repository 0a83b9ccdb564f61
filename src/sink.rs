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

//! # Prism Delivery Sinks
//!
//! A sink receives a finished payload and hands it to the outside world. The
//! pipeline calls [`PrCSink::deliver`] exactly once per successful export and
//! never for a failed one.
//!
//! - [`PrCMemorySink`] keeps payloads in memory, mostly for tests and embedding.
//! - [`PrCFileSink`] writes payloads into a directory atomically and keeps an
//!   `export-manifest.json` with a BLAKE3 digest for each file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::Utc;

use crate::export::manifest::{PrCExportManifest, PrCManifestFile};
use crate::serializer::PrCPayload;

pub const PR_MANIFEST_FILENAME: &str = "export-manifest.json";

/// Destination for rendered payloads.
pub trait PrCSink {
    fn deliver(&mut self, payload: &PrCPayload) -> anyhow::Result<()>;
}

/// Collects delivered payloads in order.
#[derive(Debug, Default, Clone)]
pub struct PrCMemorySink {
    pub delivered: Vec<PrCPayload>,
}

impl PrCMemorySink {
    #[allow(non_snake_case)]
    pub fn PrFNew() -> Self {
        Self::default()
    }

    #[allow(non_snake_case)]
    pub fn PrFLast(&self) -> Option<&PrCPayload> {
        self.delivered.last()
    }
}

impl PrCSink for PrCMemorySink {
    fn deliver(&mut self, payload: &PrCPayload) -> anyhow::Result<()> {
        self.delivered.push(payload.clone());
        Ok(())
    }
}

/// Writes each payload under its suggested filename inside `root`.
#[derive(Debug)]
pub struct PrCFileSink {
    root: PathBuf,
    manifest: PrCExportManifest,
    write_manifest: bool,
}

impl PrCFileSink {
    /// Opens a sink on `root`, picking up an existing manifest if one is there.
    #[allow(non_snake_case)]
    pub fn PrFNew(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("creating export directory {}", root.display()))?;
        let manifest_path = root.join(PR_MANIFEST_FILENAME);
        let manifest = if manifest_path.exists() {
            let text = fs::read_to_string(&manifest_path)
                .with_context(|| format!("reading {}", manifest_path.display()))?;
            PrCExportManifest::PrFFromJson(&text)?
        } else {
            PrCExportManifest::default()
        };
        Ok(Self {
            root,
            manifest,
            write_manifest: true,
        })
    }

    #[allow(non_snake_case)]
    pub fn PrFWithoutManifest(mut self) -> Self {
        self.write_manifest = false;
        self
    }

    #[allow(non_snake_case)]
    pub fn PrFRoot(&self) -> &Path {
        &self.root
    }

    #[allow(non_snake_case)]
    pub fn PrFManifest(&self) -> &PrCExportManifest {
        &self.manifest
    }

    #[allow(non_snake_case)]
    pub fn PrFPathFor(&self, payload: &PrCPayload) -> PathBuf {
        self.root.join(&payload.suggested_filename)
    }

    /// Hidden sibling used for write-then-rename.
    fn temp_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("output");
        let parent = path.parent().unwrap_or(Path::new("."));
        parent.join(format!(".{}.tmp", name))
    }

    fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
        let temp = Self::temp_path(path);
        fs::write(&temp, bytes).with_context(|| format!("writing {}", temp.display()))?;
        if let Err(err) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(err).with_context(|| format!("moving export into place at {}", path.display()));
        }
        Ok(())
    }
}

impl PrCSink for PrCFileSink {
    /// Writes the payload and then the updated manifest. If the manifest
    /// cannot be written, the payload path is restored to what it held
    /// before and the in-memory manifest is left unchanged.
    fn deliver(&mut self, payload: &PrCPayload) -> anyhow::Result<()> {
        let filename = payload.suggested_filename.as_str();
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.starts_with('.') {
            bail!("refusing to write payload with unsafe filename '{}'", filename);
        }

        let path = self.PrFPathFor(payload);
        if !self.write_manifest {
            Self::write_atomic(&path, &payload.bytes)?;
            log::debug!("wrote {} bytes to {}", payload.PrFLen(), path.display());
            return Ok(());
        }

        let mut next = self.manifest.clone();
        next.PrFRecord(PrCManifestFile::PrFFromPayload(payload, Utc::now()));
        let json = next.PrFToJson()?;
        let previous = if path.is_file() {
            Some(fs::read(&path).with_context(|| format!("reading {}", path.display()))?)
        } else {
            None
        };

        Self::write_atomic(&path, &payload.bytes)?;
        if let Err(err) = Self::write_atomic(&self.root.join(PR_MANIFEST_FILENAME), json.as_bytes()) {
            let rollback = match &previous {
                Some(bytes) => Self::write_atomic(&path, bytes),
                None => fs::remove_file(&path).map_err(anyhow::Error::from),
            };
            if let Err(rollback_err) = rollback {
                log::warn!("could not roll back {}: {:#}", path.display(), rollback_err);
            }
            return Err(err);
        }

        self.manifest = next;
        log::debug!("wrote {} bytes to {}", payload.PrFLen(), path.display());
        Ok(())
    }
}
