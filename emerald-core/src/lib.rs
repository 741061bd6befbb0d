//! Emerald Core Library
//!
//! Alignment data model, safety-window extraction and merging, coordinate
//! transforms, URL share state, and the structure-viewer capability.

pub mod types;
pub mod windows;
pub mod coords;
pub mod share;
pub mod structure;

// Re-export commonly used types and functions
pub use types::{
    AlignmentDot, AlignmentEdge, AlignmentSafetyWindowMapping, AlignmentSegment, ResidueRange, SeqPos,
    SequenceSafetyWindow, TickMark,
};
pub use windows::{
    extract_safety_windows, merge_mapping, merge_safety_windows, merged_safety_windows, to_residue_ranges,
    windows_contain, SafetyWindowMemo,
};
pub use coords::{CoordinateTransform, LinearScale, ScaleBinding, TransformError};
pub use share::{ShareError, ShareState};
pub use structure::{StructureEvents, StructureSession, StructureSource, StructureViewer};

/// Version information for the Emerald core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
