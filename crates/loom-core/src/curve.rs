//! Momentum and tension curves: draggable intensity-over-position samples.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::{DomainPoint, IntensityScale, clamp_position};
use crate::error::{EditError, EditResult};
use crate::ids::PointId;

/// Which story curve a point set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// Narrative momentum, scored 1 to 10. Accented points are key beats.
    Momentum,
    /// Dramatic tension, scored 0 to 10. Accented points are major peaks.
    Tension,
}

impl CurveKind {
    /// The scale this kind uses unless configured otherwise.
    pub fn default_scale(self) -> IntensityScale {
        match self {
            Self::Momentum => IntensityScale::MOMENTUM,
            Self::Tension => IntensityScale::TENSION,
        }
    }

    /// What an accented point means on this curve.
    pub fn accent_name(self) -> &'static str {
        match self {
            Self::Momentum => "key beat",
            Self::Tension => "major peak",
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Momentum => write!(f, "momentum"),
            Self::Tension => write!(f, "tension"),
        }
    }
}

/// A single `(position, intensity)` sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Unique identifier.
    pub id: PointId,
    /// Story position in `[0, 100]`.
    pub position: f64,
    /// Value within the curve's scale.
    pub intensity: f64,
    /// Optional caption.
    pub label: Option<String>,
    /// Key beat (momentum) or major peak (tension).
    pub accent: bool,
}

impl CurvePoint {
    /// The point as a bare domain coordinate.
    pub fn coords(&self) -> DomainPoint {
        DomainPoint::new(self.position, self.intensity)
    }
}

/// An insertion-ordered set of curve points.
///
/// Storage order is never trusted for geometry; [`Curve::derive_path`]
/// sorts by position every time.
#[derive(Debug, Clone)]
pub struct Curve {
    kind: CurveKind,
    scale: IntensityScale,
    points: Vec<CurvePoint>,
}

impl Curve {
    /// Create an empty curve of the given kind and scale.
    ///
    /// Reversed bounds are swapped. A scale with a non-finite bound or span
    /// is replaced by the kind's default scale.
    pub fn new(kind: CurveKind, scale: IntensityScale) -> Self {
        let scale = scale.normalized().unwrap_or_else(|| {
            tracing::warn!(curve = %kind, ?scale, "Unusable curve scale, using default");
            kind.default_scale()
        });
        Self {
            kind,
            scale,
            points: Vec::new(),
        }
    }

    /// Create an empty curve using the kind's default scale.
    pub fn with_default_scale(kind: CurveKind) -> Self {
        Self::new(kind, kind.default_scale())
    }

    /// The curve kind.
    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    /// The intensity range.
    pub fn scale(&self) -> IntensityScale {
        self.scale
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Get a point by ID.
    pub fn point(&self, id: PointId) -> Option<&CurvePoint> {
        self.points.iter().find(|p| p.id == id)
    }

    fn point_mut(&mut self, id: PointId) -> Option<&mut CurvePoint> {
        self.points.iter_mut().find(|p| p.id == id)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point; both coordinates are clamped into range.
    #[tracing::instrument(skip(self, label), fields(curve = %self.kind))]
    pub fn add_point(
        &mut self,
        position: f64,
        intensity: f64,
        label: Option<String>,
    ) -> EditResult<PointId> {
        if !position.is_finite() || !intensity.is_finite() {
            return Err(EditError::NonFinite("curve point"));
        }
        let point = CurvePoint {
            id: PointId::new(),
            position: clamp_position(position),
            intensity: self.scale.clamp(intensity),
            label,
            accent: false,
        };
        let id = point.id;
        self.points.push(point);
        tracing::debug!(point = %id, count = self.points.len(), "Added curve point");
        Ok(id)
    }

    /// Move a point in one step. Each coordinate is clamped on its own.
    pub fn move_point(
        &mut self,
        id: PointId,
        position: f64,
        intensity: f64,
    ) -> EditResult<DomainPoint> {
        if !position.is_finite() || !intensity.is_finite() {
            return Err(EditError::NonFinite("curve point"));
        }
        let scale = self.scale;
        let point = self.point_mut(id).ok_or(EditError::PointNotFound(id))?;
        point.position = clamp_position(position);
        point.intensity = scale.clamp(intensity);
        tracing::trace!(point = %id, position = point.position, intensity = point.intensity, "Moved curve point");
        Ok(point.coords())
    }

    /// Remove a point.
    pub fn remove_point(&mut self, id: PointId) -> EditResult<CurvePoint> {
        let index = self
            .points
            .iter()
            .position(|p| p.id == id)
            .ok_or(EditError::PointNotFound(id))?;
        Ok(self.points.remove(index))
    }

    /// Set or clear a point's caption.
    pub fn set_label(&mut self, id: PointId, label: Option<String>) -> EditResult<()> {
        let point = self.point_mut(id).ok_or(EditError::PointNotFound(id))?;
        point.label = label;
        Ok(())
    }

    /// Mark or unmark a point as a key beat / major peak.
    pub fn set_accent(&mut self, id: PointId, accent: bool) -> EditResult<()> {
        let point = self.point_mut(id).ok_or(EditError::PointNotFound(id))?;
        point.accent = accent;
        Ok(())
    }

    /// Points ordered by position; equal positions keep insertion order.
    pub fn sorted_points(&self) -> Vec<&CurvePoint> {
        let mut sorted: Vec<&CurvePoint> = self.points.iter().collect();
        // Stable sort: ties stay in insertion order.
        sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
        sorted
    }

    /// The sequence to draw the connecting line through, non-decreasing in
    /// position regardless of the order points were added.
    pub fn derive_path(&self) -> Vec<DomainPoint> {
        self.sorted_points().into_iter().map(CurvePoint::coords).collect()
    }

    /// The highest point; the earliest one wins a tie.
    pub fn peak(&self) -> Option<&CurvePoint> {
        self.sorted_points()
            .into_iter()
            .fold(None, |best: Option<&CurvePoint>, p| match best {
                Some(b) if b.intensity >= p.intensity => Some(b),
                _ => Some(p),
            })
    }

    /// Accented points in path order.
    pub fn accents(&self) -> Vec<&CurvePoint> {
        self.sorted_points().into_iter().filter(|p| p.accent).collect()
    }
}
