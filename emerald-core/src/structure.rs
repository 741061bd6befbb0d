//! Capability interface for the external 3-D structure viewer.
//!
//! The viewer is owned by the caller and injected here. This module only
//! hands it a structure source plus the merged safety windows as residue
//! ranges, and forwards the load outcome to an event sink.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ResidueRange, SequenceSafetyWindow};
use crate::windows::to_residue_ranges;

/// Where the viewer should load the structure from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructureSource {
    UniprotId(String),
    PdbId(String),
    PdbUrl(String),
    PdbContent(String),
}

impl StructureSource {
    pub fn kind(&self) -> &'static str {
        match self {
            StructureSource::UniprotId(_) => "uniprot",
            StructureSource::PdbId(_) => "pdb-id",
            StructureSource::PdbUrl(_) => "pdb-url",
            StructureSource::PdbContent(_) => "pdb-content",
        }
    }
}

/// Operations this crate needs from a structure viewer.
pub trait StructureViewer {
    fn load_structure(&mut self, source: &StructureSource, sequence: &str) -> Result<(), String>;
    fn set_highlight(&mut self, ranges: &[ResidueRange]);
    fn dispose(&mut self);
}

/// Callbacks for the load outcome.
pub trait StructureEvents {
    fn on_structure_loaded(&self);
    fn on_error(&self, message: &str);
}

/// Owns a viewer for its lifetime and disposes it on drop.
pub struct StructureSession<V: StructureViewer> {
    viewer: V,
    highlighted: Vec<ResidueRange>,
}

impl<V: StructureViewer> StructureSession<V> {
    pub fn new(viewer: V) -> Self {
        Self {
            viewer,
            highlighted: Vec::new(),
        }
    }

    /// Load `source` and highlight `windows` (expected to be merged).
    ///
    /// Exactly one of the two callbacks fires.
    pub fn load(
        &mut self,
        source: &StructureSource,
        sequence: &str,
        windows: &[SequenceSafetyWindow],
        events: &dyn StructureEvents,
    ) {
        log::info!("Loading structure from {} ({} residues)", source.kind(), sequence.len());
        match self.viewer.load_structure(source, sequence) {
            Ok(()) => {
                self.highlight(windows);
                events.on_structure_loaded();
            }
            Err(message) => {
                log::warn!("Structure load failed: {}", message);
                events.on_error(&message);
            }
        }
    }

    /// Replace the highlighted ranges.
    pub fn highlight(&mut self, windows: &[SequenceSafetyWindow]) {
        self.highlighted = to_residue_ranges(windows);
        self.viewer.set_highlight(&self.highlighted);
    }

    pub fn highlighted(&self) -> &[ResidueRange] {
        &self.highlighted
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }
}

impl<V: StructureViewer> Drop for StructureSession<V> {
    fn drop(&mut self) {
        self.viewer.dispose();
    }
}

/// State reported by a readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Ready,
    Pending,
    /// The container went away; waiting longer cannot succeed.
    Gone,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("Viewer container not ready after {0:?}")]
    TimedOut(Duration),

    #[error("Viewer container was removed before it became ready")]
    ContainerGone,
}

/// Poll `probe` every `poll_interval` until it reports ready, bounded by `timeout`.
pub async fn wait_until_ready<F>(mut probe: F, timeout: Duration, poll_interval: Duration) -> Result<(), ReadinessError>
where
    F: FnMut() -> ProbeState,
{
    let polling = async {
        loop {
            match probe() {
                ProbeState::Ready => return Ok(()),
                ProbeState::Gone => return Err(ReadinessError::ContainerGone),
                ProbeState::Pending => tokio::time::sleep(poll_interval).await,
            }
        }
    };
    match tokio::time::timeout(timeout, polling).await {
        Ok(result) => result,
        Err(_) => Err(ReadinessError::TimedOut(timeout)),
    }
}
