//! Read-only views of an editor session, ready to hand to a view layer.

use serde::Serialize;

use crate::coords::IntensityScale;
use crate::curve::{Curve, CurveKind, CurvePoint};
use crate::distribution::{Category, Distribution, DistributionKind};
use crate::ids::{EventId, TrackId};
use crate::track::{Track, TrackGraph};

/// Everything the view layer needs to draw the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorSnapshot {
    /// Tracks in lane order, events in insertion order.
    pub tracks: Vec<TrackView>,
    /// The momentum curve in path order.
    pub momentum: CurveView,
    /// The tension curve in path order.
    pub tension: CurveView,
    /// Scene type, scene length, and stakes mixes.
    pub distributions: Vec<DistributionView>,
    /// Event waiting for a second connect gesture.
    pub pending_source: Option<EventId>,
}

/// A track with its events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackView {
    /// Track ID.
    pub id: TrackId,
    /// Display name.
    pub label: String,
    /// Color token.
    pub color: String,
    /// Events in insertion order.
    pub events: Vec<EventView>,
}

/// An event with its resolved connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    /// Event ID.
    pub id: EventId,
    /// Story position.
    pub position: f64,
    /// Event label.
    pub label: String,
    /// Outgoing connection, if any. Always refers to a live event.
    pub connection_target: Option<EventId>,
    /// Number of events pointing at this one.
    pub incoming: usize,
}

/// A curve with its points sorted for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveView {
    /// Curve kind.
    pub kind: CurveKind,
    /// Intensity range.
    pub scale: IntensityScale,
    /// Points in path order.
    pub points: Vec<CurvePoint>,
}

/// A distribution with its running total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionView {
    /// Which mix.
    pub kind: DistributionKind,
    /// Categories in definition order.
    pub categories: Vec<Category>,
    /// Sum of weights.
    pub total: f64,
    /// True if the total is 100.
    pub balanced: bool,
}

impl TrackView {
    pub(crate) fn from_track(track: &Track, graph: &TrackGraph) -> Self {
        Self {
            id: track.id,
            label: track.label.clone(),
            color: track.color.clone(),
            events: track
                .events()
                .iter()
                .map(|e| EventView {
                    id: e.id,
                    position: e.position,
                    label: e.label.clone(),
                    connection_target: graph.connection_target(e.id),
                    incoming: graph.incoming(e.id).len(),
                })
                .collect(),
        }
    }
}

impl From<&Curve> for CurveView {
    fn from(curve: &Curve) -> Self {
        Self {
            kind: curve.kind(),
            scale: curve.scale(),
            points: curve.sorted_points().into_iter().cloned().collect(),
        }
    }
}

impl DistributionView {
    pub(crate) fn new(kind: DistributionKind, dist: &Distribution) -> Self {
        Self {
            kind,
            categories: dist.categories().to_vec(),
            total: dist.total_weight(),
            balanced: dist.is_balanced(),
        }
    }
}

impl EditorSnapshot {
    /// Find a track view by ID.
    pub fn track(&self, id: TrackId) -> Option<&TrackView> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Find an event view by ID across all tracks.
    pub fn event(&self, id: EventId) -> Option<&EventView> {
        self.tracks
            .iter()
            .flat_map(|t| t.events.iter())
            .find(|e| e.id == id)
    }
}
