use serde::{Deserialize, Serialize};

/// 1-indexed residue position on a single sequence.
pub type SeqPos = u64;

pub const DEFAULT_DOT_COLOR: &str = "orange";

/// A point in alignment space.
///
/// `x` indexes sequence B (the member), `y` indexes sequence A (the
/// representative). Use the named accessors instead of the raw fields so the
/// axis convention lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentDot {
    pub x: f64,
    pub y: f64,
}

impl AlignmentDot {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Index along sequence B (member).
    pub fn member_index(&self) -> f64 {
        self.x
    }

    /// Index along sequence A (representative).
    pub fn representative_index(&self) -> f64 {
        self.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for AlignmentDot {
    fn from(p: [f64; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

impl From<AlignmentDot> for [f64; 2] {
    fn from(dot: AlignmentDot) -> Self {
        [dot.x, dot.y]
    }
}

/// One step of a traced alignment path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentEdge {
    pub from: [f64; 2],
    pub to: [f64; 2],
    /// In (0, 1].
    pub probability: f64,
}

impl AlignmentEdge {
    pub fn new(from: [f64; 2], to: [f64; 2], probability: f64) -> Self {
        Self { from, to, probability }
    }

    pub fn from_dot(&self) -> AlignmentDot {
        self.from.into()
    }

    pub fn to_dot(&self) -> AlignmentDot {
        self.to.into()
    }

    /// Probability clamped to [0, 1]; non-finite values count as 0.
    pub fn clamped_probability(&self) -> f64 {
        if self.probability.is_finite() {
            self.probability.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Output unit of the alignment computation.
///
/// With both `start_dot` and `end_dot` set the segment describes a safety
/// window rectangle; otherwise it is the raw edge trace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentSegment {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub edges: Vec<AlignmentEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_dot: Option<AlignmentDot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_dot: Option<AlignmentDot>,
}

impl AlignmentSegment {
    pub fn trace(color: impl Into<String>, edges: Vec<AlignmentEdge>) -> Self {
        Self {
            color: color.into(),
            edges,
            start_dot: None,
            end_dot: None,
        }
    }

    pub fn window(color: impl Into<String>, start: AlignmentDot, end: AlignmentDot) -> Self {
        Self {
            color: color.into(),
            edges: Vec::new(),
            start_dot: Some(start),
            end_dot: Some(end),
        }
    }

    /// Both corners, if this segment is a safety window rectangle.
    pub fn window_corners(&self) -> Option<(AlignmentDot, AlignmentDot)> {
        match (self.start_dot, self.end_dot) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Color used for dots; falls back to [`DEFAULT_DOT_COLOR`].
    pub fn dot_color(&self) -> &str {
        if self.color.trim().is_empty() {
            DEFAULT_DOT_COLOR
        } else {
            &self.color
        }
    }
}

/// Inclusive, 1-indexed range on one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSafetyWindow {
    pub start_position: SeqPos,
    pub end_position: SeqPos,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SequenceSafetyWindow {
    /// Returns `None` unless `end >= start > 0`.
    pub fn new(start_position: SeqPos, end_position: SeqPos, color: Option<String>) -> Option<Self> {
        if start_position > 0 && end_position >= start_position {
            Some(Self {
                start_position,
                end_position,
                color,
            })
        } else {
            None
        }
    }

    pub fn len(&self) -> SeqPos {
        self.end_position - self.start_position + 1
    }

    pub fn contains(&self, position: SeqPos) -> bool {
        self.start_position <= position && position <= self.end_position
    }

    /// 0-based half-open range, as expected by residue-indexed viewers.
    pub fn to_residue_range(&self) -> ResidueRange {
        ResidueRange {
            start: self.start_position - 1,
            end: self.end_position,
        }
    }
}

/// 0-based half-open residue range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidueRange {
    pub start: u64,
    pub end: u64,
}

impl ResidueRange {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Safety windows projected onto both sequences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentSafetyWindowMapping {
    /// Representative (y axis).
    pub sequence_a: Vec<SequenceSafetyWindow>,
    /// Member (x axis).
    pub sequence_b: Vec<SequenceSafetyWindow>,
}

impl AlignmentSafetyWindowMapping {
    pub fn is_empty(&self) -> bool {
        self.sequence_a.is_empty() && self.sequence_b.is_empty()
    }
}

/// Axis tick supplied by the alignment collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMark {
    pub value: f64,
    pub label: String,
}

impl TickMark {
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self { value, label: label.into() }
    }

    /// One tick per residue, labelled with the residue letter.
    pub fn for_sequence(sequence: &str) -> Vec<TickMark> {
        sequence
            .chars()
            .enumerate()
            .map(|(i, c)| TickMark::new(i as f64, c.to_string()))
            .collect()
    }

    /// 1-indexed residue position this tick labels, if it is a valid index.
    pub fn position(&self) -> Option<SeqPos> {
        if self.value.is_finite() && self.value >= 0.0 {
            Some(self.value.floor() as SeqPos + 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_validation() {
        assert!(SequenceSafetyWindow::new(0, 5, None).is_none());
        assert!(SequenceSafetyWindow::new(6, 5, None).is_none());
        let single = SequenceSafetyWindow::new(7, 7, None).unwrap();
        assert_eq!(single.len(), 1);
        assert!(single.contains(7));
        assert!(!single.contains(8));
    }

    #[test]
    fn test_residue_range_is_zero_based() {
        let w = SequenceSafetyWindow::new(5, 10, None).unwrap();
        let r = w.to_residue_range();
        assert_eq!((r.start, r.end), (4, 10));
        assert_eq!(r.len(), 6);
    }

    #[test]
    fn test_segment_serde_uses_camel_case() {
        let json = r##"{"color":"#f00","edges":[{"from":[0,0],"to":[1,1],"probability":0.9}],"startDot":{"x":1,"y":2},"endDot":{"x":3,"y":4}}"##;
        let seg: AlignmentSegment = serde_json::from_str(json).unwrap();
        let (start, end) = seg.window_corners().unwrap();
        assert_eq!(start.member_index(), 1.0);
        assert_eq!(end.representative_index(), 4.0);
        assert_eq!(seg.edges.len(), 1);
    }

    #[test]
    fn test_dot_color_default() {
        let seg = AlignmentSegment::trace("", Vec::new());
        assert_eq!(seg.dot_color(), DEFAULT_DOT_COLOR);
        let seg = AlignmentSegment::trace("#123456", Vec::new());
        assert_eq!(seg.dot_color(), "#123456");
    }

    #[test]
    fn test_ticks_for_sequence() {
        let ticks = TickMark::for_sequence("MKV");
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[2].label, "V");
        assert_eq!(ticks[2].position(), Some(3));
    }
}
