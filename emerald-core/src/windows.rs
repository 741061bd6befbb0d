//! Safety-window extraction and merging.
//!
//! Safety windows arrive as rectangles in alignment space (a start and an end
//! corner). Each rectangle projects onto one window per sequence; overlapping
//! or touching windows on the same sequence are then coalesced so downstream
//! consumers see a minimal disjoint set.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::{AlignmentSafetyWindowMapping, AlignmentSegment, ResidueRange, SeqPos, SequenceSafetyWindow};

/// Project every safety-window segment onto both sequences.
///
/// Segments without both corners are edge traces and are skipped. A corner
/// pair that does not describe a non-empty window on an axis (non-finite,
/// negative or inverted coordinates) contributes nothing to that axis.
pub fn extract_safety_windows(segments: &[AlignmentSegment]) -> AlignmentSafetyWindowMapping {
    let mut mapping = AlignmentSafetyWindowMapping::default();

    for segment in segments {
        let Some((start, end)) = segment.window_corners() else {
            continue;
        };
        let color = (!segment.color.trim().is_empty()).then(|| segment.color.clone());

        if let Some(w) = project_axis(start.member_index(), end.member_index(), color.clone()) {
            mapping.sequence_b.push(w);
        }
        if let Some(w) = project_axis(start.representative_index(), end.representative_index(), color) {
            mapping.sequence_a.push(w);
        }
    }

    log::debug!(
        "Extracted safety windows from {} segments: {} on A, {} on B",
        segments.len(),
        mapping.sequence_a.len(),
        mapping.sequence_b.len()
    );
    mapping
}

// Lattice coordinate `c` sits just before residue `floor(c) + 1`.
fn project_axis(start: f64, end: f64, color: Option<String>) -> Option<SequenceSafetyWindow> {
    if !start.is_finite() || !end.is_finite() {
        return None;
    }
    let start_position = start.floor() + 1.0;
    let end_position = end.floor();
    if start_position <= 0.0 || end_position < start_position {
        return None;
    }
    SequenceSafetyWindow::new(start_position as SeqPos, end_position as SeqPos, color)
}

/// Coalesce overlapping or adjacent windows (`next.start <= current.end + 1`).
///
/// The result is sorted by start position, pairwise separated by at least one
/// uncovered position, and keeps the color of the first window of each run.
pub fn merge_safety_windows(windows: &[SequenceSafetyWindow]) -> Vec<SequenceSafetyWindow> {
    if windows.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&SequenceSafetyWindow> = windows.iter().collect();
    // Stable: ties keep their input order, so the first color wins.
    sorted.sort_by_key(|w| w.start_position);

    let mut merged: Vec<SequenceSafetyWindow> = Vec::with_capacity(sorted.len());
    for window in sorted {
        match merged.last_mut() {
            Some(current) if window.start_position <= current.end_position.saturating_add(1) => {
                current.end_position = current.end_position.max(window.end_position);
            }
            _ => merged.push(window.clone()),
        }
    }
    merged
}

/// Merge both sequences of a mapping.
pub fn merge_mapping(mapping: &AlignmentSafetyWindowMapping) -> AlignmentSafetyWindowMapping {
    AlignmentSafetyWindowMapping {
        sequence_a: merge_safety_windows(&mapping.sequence_a),
        sequence_b: merge_safety_windows(&mapping.sequence_b),
    }
}

/// Extract and merge in one step.
pub fn merged_safety_windows(segments: &[AlignmentSegment]) -> AlignmentSafetyWindowMapping {
    merge_mapping(&extract_safety_windows(segments))
}

/// Whether any window covers the 1-indexed `position`.
pub fn windows_contain(windows: &[SequenceSafetyWindow], position: SeqPos) -> bool {
    windows.iter().any(|w| w.contains(position))
}

/// 0-based half-open ranges for residue-indexed consumers such as structure viewers.
pub fn to_residue_ranges(windows: &[SequenceSafetyWindow]) -> Vec<ResidueRange> {
    windows.iter().map(SequenceSafetyWindow::to_residue_range).collect()
}

/// Caches the merged mapping for the last segment list seen.
///
/// Inputs are compared by value, so handing in a freshly built but equal list
/// returns the cached mapping without recomputation.
#[derive(Default)]
pub struct SafetyWindowMemo {
    last: Mutex<Option<(Vec<AlignmentSegment>, Arc<AlignmentSafetyWindowMapping>)>>,
}

impl SafetyWindowMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, segments: &[AlignmentSegment]) -> Arc<AlignmentSafetyWindowMapping> {
        let mut last = self.last.lock();
        if let Some((input, mapping)) = last.as_ref() {
            if input.as_slice() == segments {
                return Arc::clone(mapping);
            }
        }
        let mapping = Arc::new(merged_safety_windows(segments));
        *last = Some((segments.to_vec(), Arc::clone(&mapping)));
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlignmentDot, AlignmentEdge};

    fn w(start: SeqPos, end: SeqPos) -> SequenceSafetyWindow {
        SequenceSafetyWindow::new(start, end, None).unwrap()
    }

    fn colored(start: SeqPos, end: SeqPos, color: &str) -> SequenceSafetyWindow {
        SequenceSafetyWindow::new(start, end, Some(color.to_string())).unwrap()
    }

    #[test]
    fn test_extract_empty() {
        let mapping = extract_safety_windows(&[]);
        assert!(mapping.sequence_a.is_empty());
        assert!(mapping.sequence_b.is_empty());
    }

    #[test]
    fn test_extract_axis_convention() {
        let seg = AlignmentSegment::window("green", AlignmentDot::new(4.0, 9.0), AlignmentDot::new(10.0, 20.0));
        let mapping = extract_safety_windows(&[seg]);
        assert_eq!(mapping.sequence_b.len(), 1);
        assert_eq!(mapping.sequence_b[0].start_position, 5);
        assert_eq!(mapping.sequence_b[0].end_position, 10);
        assert_eq!(mapping.sequence_a[0].start_position, 10);
        assert_eq!(mapping.sequence_a[0].end_position, 20);
        assert_eq!(mapping.sequence_a[0].color.as_deref(), Some("green"));
    }

    #[test]
    fn test_extract_skips_traces_and_invalid() {
        let trace = AlignmentSegment::trace("red", vec![AlignmentEdge::new([0.0, 0.0], [1.0, 1.0], 1.0)]);
        let half = AlignmentSegment {
            start_dot: Some(AlignmentDot::new(1.0, 1.0)),
            ..Default::default()
        };
        let nan = AlignmentSegment::window("", AlignmentDot::new(f64::NAN, 2.0), AlignmentDot::new(5.0, 8.0));
        let inverted = AlignmentSegment::window("", AlignmentDot::new(5.0, 5.0), AlignmentDot::new(3.0, 3.0));
        let negative = AlignmentSegment::window("", AlignmentDot::new(-3.0, -3.0), AlignmentDot::new(-1.0, -1.0));

        let mapping = extract_safety_windows(&[trace, half, nan, inverted, negative]);
        assert!(mapping.sequence_b.is_empty());
        // The NaN only poisons the x axis.
        assert_eq!(mapping.sequence_a, vec![w(3, 8)]);
    }

    #[test]
    fn test_extract_single_residue_and_fractional() {
        let seg = AlignmentSegment::window("", AlignmentDot::new(2.7, 0.0), AlignmentDot::new(3.2, 1.0));
        let mapping = extract_safety_windows(&[seg]);
        assert_eq!(mapping.sequence_b, vec![w(3, 3)]);
        assert_eq!(mapping.sequence_a, vec![w(1, 1)]);
    }

    #[test]
    fn test_merge_adjacent() {
        assert_eq!(merge_safety_windows(&[w(1, 5), w(6, 9)]), vec![w(1, 9)]);
    }

    #[test]
    fn test_merge_keeps_gaps() {
        assert_eq!(merge_safety_windows(&[w(10, 12), w(1, 3)]), vec![w(1, 3), w(10, 12)]);
    }

    #[test]
    fn test_merge_contained_and_first_color() {
        let merged = merge_safety_windows(&[colored(3, 4, "b"), colored(1, 10, "a"), colored(1, 2, "c")]);
        assert_eq!(merged, vec![colored(1, 10, "a")]);
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_safety_windows(&[]).is_empty());
    }

    #[test]
    fn test_windows_contain() {
        let windows = vec![w(1, 3), w(10, 12)];
        assert!(windows_contain(&windows, 3));
        assert!(!windows_contain(&windows, 4));
        assert!(windows_contain(&windows, 10));
    }

    #[test]
    fn test_to_residue_ranges() {
        let ranges = to_residue_ranges(&[w(1, 3), w(10, 12)]);
        assert_eq!(ranges, vec![ResidueRange { start: 0, end: 3 }, ResidueRange { start: 9, end: 12 }]);
    }

    #[test]
    fn test_memo_reuses_equal_input() {
        let memo = SafetyWindowMemo::new();
        let segs = vec![AlignmentSegment::window("", AlignmentDot::new(0.0, 0.0), AlignmentDot::new(3.0, 3.0))];
        let first = memo.get(&segs);
        let second = memo.get(&segs.clone());
        assert!(Arc::ptr_eq(&first, &second));

        let other = vec![AlignmentSegment::window("", AlignmentDot::new(0.0, 0.0), AlignmentDot::new(4.0, 4.0))];
        let third = memo.get(&other);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.sequence_a, vec![w(1, 4)]);
    }
}
