//! Translation between pointer positions on a drawing surface and the
//! normalized domain coordinates stored by the editor.
//!
//! Position runs left to right over `[0, 100]`. Intensity runs bottom to top
//! over an [`IntensityScale`], so the top edge of the surface is the scale
//! maximum. Both directions are pure functions of their inputs.

use serde::{Deserialize, Serialize};

/// Lowest storable story position.
pub const POSITION_MIN: f64 = 0.0;
/// Highest storable story position.
pub const POSITION_MAX: f64 = 100.0;

/// Clamp a story position into `[0, 100]`.
///
/// Callers must reject non-finite input first; NaN passes through `clamp`.
pub fn clamp_position(position: f64) -> f64 {
    position.clamp(POSITION_MIN, POSITION_MAX)
}

/// A point in screen space (pixels, or whatever unit the surface uses).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal coordinate, growing to the right.
    pub x: f64,
    /// Vertical coordinate, growing downwards.
    pub y: f64,
}

impl ScreenPoint {
    /// Create a screen point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True if both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A normalized `(position, intensity)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainPoint {
    /// Story position in `[0, 100]`.
    pub position: f64,
    /// Intensity within the owning curve's scale.
    pub intensity: f64,
}

impl DomainPoint {
    /// Create a domain point without clamping.
    pub fn new(position: f64, intensity: f64) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// The bounding rectangle of the surface the pointer moves over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width; zero or negative widths are treated as degenerate.
    pub width: f64,
    /// Height; zero or negative heights are treated as degenerate.
    pub height: f64,
}

impl SurfaceRect {
    /// Create a rectangle from its top-left corner and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// True if every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The vertical value range of a curve.
///
/// Deserialization goes through [`IntensityScale::new`], so a hand-written
/// scale with its bounds reversed is stored in order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawScale")]
pub struct IntensityScale {
    /// Value at the bottom edge of the surface.
    pub min: f64,
    /// Value at the top edge of the surface.
    pub max: f64,
}

impl IntensityScale {
    /// The momentum curve scale, `[1, 10]`.
    pub const MOMENTUM: Self = Self {
        min: 1.0,
        max: 10.0,
    };

    /// The tension curve scale, `[0, 10]`.
    pub const TENSION: Self = Self {
        min: 0.0,
        max: 10.0,
    };

    /// Create a scale, swapping the bounds if given in reverse.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// The scale with its bounds in order, or `None` if either bound or
    /// the span between them is not a finite number.
    pub fn normalized(self) -> Option<Self> {
        let scale = Self::new(self.min, self.max);
        scale.span().is_finite().then_some(scale)
    }

    /// Distance between the bounds.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp a value into the scale.
    ///
    /// Never panics, even on a scale built with reversed public fields.
    pub fn clamp(&self, value: f64) -> f64 {
        let ordered = Self::new(self.min, self.max);
        value.max(ordered.min).min(ordered.max)
    }
}

#[derive(Deserialize)]
struct RawScale {
    min: f64,
    max: f64,
}

impl From<RawScale> for IntensityScale {
    fn from(raw: RawScale) -> Self {
        Self::new(raw.min, raw.max)
    }
}

/// Map a horizontal pointer coordinate to a clamped story position.
///
/// Returns `None` for non-finite input. A degenerate (zero or negative)
/// width maps everything to position `0`.
pub fn to_position(x: f64, rect: SurfaceRect) -> Option<f64> {
    if !x.is_finite() || !rect.is_finite() {
        return None;
    }
    if rect.width <= 0.0 {
        return Some(POSITION_MIN);
    }
    Some(clamp_position((x - rect.left) / rect.width * POSITION_MAX))
}

/// Map a vertical pointer coordinate to a clamped intensity.
///
/// The axis is inverted: `rect.top` maps to `scale.max`. A degenerate height
/// maps everything to `scale.min`.
pub fn to_intensity(y: f64, rect: SurfaceRect, scale: IntensityScale) -> Option<f64> {
    if !y.is_finite() || !rect.is_finite() {
        return None;
    }
    if rect.height <= 0.0 {
        return Some(scale.min);
    }
    Some(scale.clamp(scale.max - (y - rect.top) / rect.height * scale.span()))
}

/// Convert a pointer position into domain coordinates.
///
/// `None` means "no movement": the caller keeps whatever value it had.
pub fn to_domain(
    pointer: ScreenPoint,
    rect: SurfaceRect,
    scale: IntensityScale,
) -> Option<DomainPoint> {
    let position = to_position(pointer.x, rect)?;
    let intensity = to_intensity(pointer.y, rect, scale)?;
    Some(DomainPoint::new(position, intensity))
}

/// Horizontal screen coordinate of a story position.
pub fn position_to_x(position: f64, rect: SurfaceRect) -> f64 {
    rect.left + position / POSITION_MAX * rect.width
}

/// Vertical screen coordinate of an intensity value.
pub fn intensity_to_y(intensity: f64, rect: SurfaceRect, scale: IntensityScale) -> f64 {
    let span = scale.span();
    if span <= 0.0 {
        return rect.top;
    }
    rect.top + (scale.max - intensity) / span * rect.height
}

/// Convert domain coordinates back into a screen point; the inverse of
/// [`to_domain`] for points inside the rectangle.
pub fn to_screen(point: DomainPoint, rect: SurfaceRect, scale: IntensityScale) -> ScreenPoint {
    ScreenPoint::new(
        position_to_x(point.position, rect),
        intensity_to_y(point.intensity, rect, scale),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> SurfaceRect {
        SurfaceRect::new(20.0, 10.0, 400.0, 200.0)
    }

    #[test]
    fn centre_maps_to_middle_of_domain() {
        let p = to_domain(ScreenPoint::new(220.0, 110.0), rect(), IntensityScale::TENSION).unwrap();
        assert!((p.position - 50.0).abs() < 1e-9);
        assert!((p.intensity - 5.0).abs() < 1e-9);
    }

    #[test]
    fn top_edge_is_scale_max() {
        let p = to_domain(ScreenPoint::new(20.0, 10.0), rect(), IntensityScale::MOMENTUM).unwrap();
        assert_eq!(p.position, 0.0);
        assert_eq!(p.intensity, 10.0);
    }

    #[test]
    fn bottom_edge_is_scale_min() {
        let p = to_domain(ScreenPoint::new(420.0, 210.0), rect(), IntensityScale::MOMENTUM).unwrap();
        assert_eq!(p.position, 100.0);
        assert_eq!(p.intensity, 1.0);
    }

    #[test]
    fn outside_pointer_is_clamped() {
        let p = to_domain(ScreenPoint::new(-50.0, 900.0), rect(), IntensityScale::TENSION).unwrap();
        assert_eq!(p.position, 0.0);
        assert_eq!(p.intensity, 0.0);

        let p = to_domain(ScreenPoint::new(5000.0, -900.0), rect(), IntensityScale::TENSION).unwrap();
        assert_eq!(p.position, 100.0);
        assert_eq!(p.intensity, 10.0);
    }

    #[test]
    fn degenerate_rect_yields_lower_bound() {
        let flat = SurfaceRect::new(0.0, 0.0, 0.0, 0.0);
        let p = to_domain(ScreenPoint::new(30.0, 30.0), flat, IntensityScale::MOMENTUM).unwrap();
        assert_eq!(p.position, 0.0);
        assert_eq!(p.intensity, 1.0);
        assert!(!p.position.is_nan());
    }

    #[test]
    fn non_finite_input_is_no_movement() {
        assert!(to_domain(ScreenPoint::new(f64::NAN, 0.0), rect(), IntensityScale::TENSION).is_none());
        let bad = SurfaceRect::new(0.0, 0.0, f64::INFINITY, 10.0);
        assert!(to_domain(ScreenPoint::new(1.0, 1.0), bad, IntensityScale::TENSION).is_none());
        assert!(to_position(f64::NEG_INFINITY, rect()).is_none());
    }

    #[test]
    fn screen_round_trip() {
        let scale = IntensityScale::MOMENTUM;
        let start = ScreenPoint::new(123.5, 77.25);
        let back = to_screen(to_domain(start, rect(), scale).unwrap(), rect(), scale);
        assert!((back.x - start.x).abs() < 1e-9);
        assert!((back.y - start.y).abs() < 1e-9);
    }

    #[test]
    fn reversed_scale_is_normalized() {
        let s = IntensityScale::new(10.0, 1.0);
        assert_eq!(s, IntensityScale::MOMENTUM);
        assert_eq!(s.clamp(42.0), 10.0);
    }

    #[test]
    fn reversed_fields_clamp_without_panicking() {
        let s = IntensityScale {
            min: 10.0,
            max: 1.0,
        };
        assert_eq!(s.clamp(42.0), 10.0);
        assert_eq!(s.clamp(-3.0), 1.0);
        assert_eq!(s.clamp(4.5), 4.5);
    }

    #[test]
    fn deserialized_scale_is_ordered() {
        let s: IntensityScale = serde_json::from_str(r#"{ "min": 10, "max": 1 }"#).unwrap();
        assert_eq!(s, IntensityScale::MOMENTUM);
    }

    #[test]
    fn normalized_rejects_unbounded_span() {
        assert_eq!(
            IntensityScale::new(10.0, 0.0).normalized(),
            Some(IntensityScale::TENSION)
        );
        assert!(IntensityScale::new(f64::NAN, 1.0).normalized().is_none());
        assert!(IntensityScale::new(-f64::MAX, f64::MAX).normalized().is_none());
    }
}
