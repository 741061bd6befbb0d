//! Sequence-index to pixel mapping.
//!
//! The live view keeps one base [`LinearScale`] per axis plus a single
//! [`CoordinateTransform`] describing the current pan/zoom. Exporters rebuild
//! fresh base scales at their own resolution and apply the same transform,
//! which keeps every output geometrically identical to the screen.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Transform scale must be finite and non-zero (got {axis}={value})")]
    InvalidScale { axis: char, value: f64 },

    #[error("Transform translation must be finite (got {axis}={value})")]
    InvalidTranslation { axis: char, value: f64 },
}

/// Monotonic linear map from a domain interval to a range interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    fn domain_span(&self) -> f64 {
        self.domain.1 - self.domain.0
    }

    fn range_span(&self) -> f64 {
        self.range.1 - self.range.0
    }

    /// Domain value to range value. A collapsed domain maps to the range start.
    pub fn map(&self, value: f64) -> f64 {
        let span = self.domain_span();
        if span == 0.0 {
            return self.range.0;
        }
        self.range.0 + (value - self.domain.0) / span * self.range_span()
    }

    /// Range value back to the domain. A collapsed range maps to the domain start.
    pub fn invert(&self, pixel: f64) -> f64 {
        let span = self.range_span();
        if span == 0.0 {
            return self.domain.0;
        }
        self.domain.0 + (pixel - self.range.0) / span * self.domain_span()
    }

    /// Pixels per domain unit.
    pub fn bandwidth(&self) -> f64 {
        let span = self.domain_span();
        if span == 0.0 {
            0.0
        } else {
            (self.range_span() / span).abs()
        }
    }

    /// Scale whose output equals `transform` applied along x to this scale.
    pub fn rescaled_x(&self, transform: &CoordinateTransform) -> LinearScale {
        LinearScale {
            domain: (
                self.invert(transform.invert_x(self.range.0)),
                self.invert(transform.invert_x(self.range.1)),
            ),
            range: self.range,
        }
    }

    /// Scale whose output equals `transform` applied along y to this scale.
    pub fn rescaled_y(&self, transform: &CoordinateTransform) -> LinearScale {
        LinearScale {
            domain: (
                self.invert(transform.invert_y(self.range.0)),
                self.invert(transform.invert_y(self.range.1)),
            ),
            range: self.range,
        }
    }
}

/// Pan/zoom state: `pixel' = pixel * scale + translate`, per axis.
///
/// Deserializes from either `{scaleX, scaleY, translateX, translateY}` or a
/// d3-style `{k, x, y}`, validating both forms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TransformRepr")]
pub struct CoordinateTransform {
    scale_x: f64,
    scale_y: f64,
    translate_x: f64,
    translate_y: f64,
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CoordinateTransform {
    pub const IDENTITY: CoordinateTransform = CoordinateTransform {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn new(scale_x: f64, scale_y: f64, translate_x: f64, translate_y: f64) -> Result<Self, TransformError> {
        for (axis, value) in [('x', scale_x), ('y', scale_y)] {
            if !value.is_finite() || value == 0.0 {
                return Err(TransformError::InvalidScale { axis, value });
            }
        }
        for (axis, value) in [('x', translate_x), ('y', translate_y)] {
            if !value.is_finite() {
                return Err(TransformError::InvalidTranslation { axis, value });
            }
        }
        Ok(Self {
            scale_x,
            scale_y,
            translate_x,
            translate_y,
        })
    }

    /// Uniform zoom `k` with translation `(x, y)`.
    pub fn from_zoom(k: f64, x: f64, y: f64) -> Result<Self, TransformError> {
        Self::new(k, k, x, y)
    }

    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn translate_x(&self) -> f64 {
        self.translate_x
    }

    pub fn translate_y(&self) -> f64 {
        self.translate_y
    }

    pub fn apply_x(&self, x: f64) -> f64 {
        x * self.scale_x + self.translate_x
    }

    pub fn apply_y(&self, y: f64) -> f64 {
        y * self.scale_y + self.translate_y
    }

    pub fn apply(&self, point: (f64, f64)) -> (f64, f64) {
        (self.apply_x(point.0), self.apply_y(point.1))
    }

    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.translate_x) / self.scale_x
    }

    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.translate_y) / self.scale_y
    }

    pub fn invert(&self, point: (f64, f64)) -> (f64, f64) {
        (self.invert_x(point.0), self.invert_y(point.1))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TransformRepr {
    #[serde(rename_all = "camelCase")]
    Affine {
        scale_x: f64,
        scale_y: f64,
        translate_x: f64,
        translate_y: f64,
    },
    Zoom {
        k: f64,
        x: f64,
        y: f64,
    },
}

impl TryFrom<TransformRepr> for CoordinateTransform {
    type Error = TransformError;

    fn try_from(repr: TransformRepr) -> Result<Self, Self::Error> {
        match repr {
            TransformRepr::Affine {
                scale_x,
                scale_y,
                translate_x,
                translate_y,
            } => CoordinateTransform::new(scale_x, scale_y, translate_x, translate_y),
            TransformRepr::Zoom { k, x, y } => CoordinateTransform::from_zoom(k, x, y),
        }
    }
}

/// Pair of base scales plus the shared transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBinding {
    pub base_x: LinearScale,
    pub base_y: LinearScale,
    pub transform: CoordinateTransform,
}

impl ScaleBinding {
    pub fn new(base_x: LinearScale, base_y: LinearScale, transform: CoordinateTransform) -> Self {
        Self { base_x, base_y, transform }
    }

    pub fn x(&self, value: f64) -> f64 {
        self.transform.apply_x(self.base_x.map(value))
    }

    pub fn y(&self, value: f64) -> f64 {
        self.transform.apply_y(self.base_y.map(value))
    }

    pub fn point(&self, value: (f64, f64)) -> (f64, f64) {
        (self.x(value.0), self.y(value.1))
    }

    pub fn invert_x(&self, pixel: f64) -> f64 {
        self.base_x.invert(self.transform.invert_x(pixel))
    }

    pub fn invert_y(&self, pixel: f64) -> f64 {
        self.base_y.invert(self.transform.invert_y(pixel))
    }

    pub fn zoomed_x(&self) -> LinearScale {
        self.base_x.rescaled_x(&self.transform)
    }

    pub fn zoomed_y(&self) -> LinearScale {
        self.base_y.rescaled_y(&self.transform)
    }

    /// Domain currently covered by the base ranges, clamped to the base domains.
    ///
    /// Returned as `((x0, x1), (y0, y1))` with `x0 <= x1` and `y0 <= y1`.
    pub fn visible_domain(&self) -> ((f64, f64), (f64, f64)) {
        let clamp_sorted = |a: f64, b: f64, domain: (f64, f64)| {
            let (lo, hi) = (domain.0.min(domain.1), domain.0.max(domain.1));
            let (a, b) = (a.min(b), a.max(b));
            (a.clamp(lo, hi), b.clamp(lo, hi))
        };
        let x = clamp_sorted(
            self.invert_x(self.base_x.range.0),
            self.invert_x(self.base_x.range.1),
            self.base_x.domain,
        );
        let y = clamp_sorted(
            self.invert_y(self.base_y.range.0),
            self.invert_y(self.base_y.range.1),
            self.base_y.domain,
        );
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_scale_map_and_invert() {
        let s = LinearScale::new((0.0, 100.0), (50.0, 550.0));
        assert!((s.map(0.0) - 50.0).abs() < EPS);
        assert!((s.map(100.0) - 550.0).abs() < EPS);
        assert!((s.invert(300.0) - 50.0).abs() < EPS);
        assert!((s.bandwidth() - 5.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_scale() {
        let s = LinearScale::new((3.0, 3.0), (0.0, 10.0));
        assert_eq!(s.map(42.0), 0.0);
        assert_eq!(s.bandwidth(), 0.0);
        let s = LinearScale::new((0.0, 10.0), (5.0, 5.0));
        assert_eq!(s.invert(7.0), 0.0);
    }

    #[test]
    fn test_transform_rejects_zero_scale() {
        assert!(matches!(
            CoordinateTransform::new(0.0, 1.0, 0.0, 0.0),
            Err(TransformError::InvalidScale { axis: 'x', .. })
        ));
        assert!(CoordinateTransform::from_zoom(1.0, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_transform_roundtrip() {
        let t = CoordinateTransform::from_zoom(2.5, -40.0, 12.0).unwrap();
        let p = t.apply((10.0, 20.0));
        let back = t.invert(p);
        assert!((back.0 - 10.0).abs() < EPS && (back.1 - 20.0).abs() < EPS);
    }

    #[test]
    fn test_rescaled_matches_apply() {
        let base = LinearScale::new((0.0, 200.0), (60.0, 760.0));
        let t = CoordinateTransform::from_zoom(3.0, -500.0, 0.0).unwrap();
        let zoomed = base.rescaled_x(&t);
        for v in [0.0, 17.0, 120.0] {
            assert!((zoomed.map(v) - t.apply_x(base.map(v))).abs() < 1e-6);
        }
    }

    #[test]
    fn test_visible_domain_under_zoom() {
        let base_x = LinearScale::new((0.0, 100.0), (0.0, 100.0));
        let base_y = LinearScale::new((0.0, 50.0), (0.0, 100.0));
        let t = CoordinateTransform::from_zoom(2.0, -100.0, 0.0).unwrap();
        let binding = ScaleBinding::new(base_x, base_y, t);
        let ((x0, x1), (y0, y1)) = binding.visible_domain();
        assert!((x0 - 50.0).abs() < EPS && (x1 - 100.0).abs() < EPS);
        assert!((y0 - 0.0).abs() < EPS && (y1 - 25.0).abs() < EPS);
    }

    #[test]
    fn test_transform_deserializes_both_forms() {
        let affine: CoordinateTransform =
            serde_json::from_str(r#"{"scaleX":2,"scaleY":3,"translateX":-4,"translateY":5}"#).unwrap();
        assert_eq!(affine.scale_y(), 3.0);
        assert_eq!(affine.translate_x(), -4.0);

        let zoom: CoordinateTransform = serde_json::from_str(r#"{"k":1.5,"x":10,"y":-2}"#).unwrap();
        assert_eq!(zoom.scale_x(), 1.5);
        assert_eq!(zoom.scale_y(), 1.5);
        assert_eq!(zoom.translate_y(), -2.0);

        assert!(serde_json::from_str::<CoordinateTransform>(r#"{"k":0,"x":0,"y":0}"#).is_err());
    }
}
