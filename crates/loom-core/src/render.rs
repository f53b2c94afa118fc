//! Pure functions turning editor state into drawable primitives.
//!
//! Nothing here mutates or caches; call again after every change.

use std::collections::HashMap;

use serde::Serialize;

use crate::coords::{
    DomainPoint, IntensityScale, POSITION_MAX, POSITION_MIN, ScreenPoint, SurfaceRect,
    intensity_to_y, position_to_x, to_screen,
};
use crate::curve::Curve;
use crate::ids::{EventId, PointId, TrackId};
use crate::track::TrackGraph;

/// A timeline event placed on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMarker {
    /// The event drawn.
    pub id: EventId,
    /// Its owning track.
    pub track: TrackId,
    /// Centre of the marker.
    pub at: ScreenPoint,
    /// The track's color token.
    pub color: String,
    /// The event label.
    pub label: String,
}

/// A curve point placed on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMarker {
    /// The point drawn.
    pub id: PointId,
    /// Centre of the marker.
    pub at: ScreenPoint,
    /// Key beat / major peak.
    pub accent: bool,
    /// Optional caption.
    pub label: Option<String>,
}

/// A cubic Bézier joining two connected events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    /// Source event.
    pub source: EventId,
    /// Target event.
    pub target: EventId,
    /// Start of the curve (source marker centre).
    pub from: ScreenPoint,
    /// End of the curve (target marker centre).
    pub to: ScreenPoint,
    /// First control point.
    pub control_a: ScreenPoint,
    /// Second control point.
    pub control_b: ScreenPoint,
}

impl Connector {
    /// The connector as an SVG path `d` attribute.
    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            fmt_num(self.from.x),
            fmt_num(self.from.y),
            fmt_num(self.control_a.x),
            fmt_num(self.control_a.y),
            fmt_num(self.control_b.x),
            fmt_num(self.control_b.y),
            fmt_num(self.to.x),
            fmt_num(self.to.y),
        )
    }
}

/// A tick label on one of the axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    /// Text to draw.
    pub text: String,
    /// Anchor point of the tick.
    pub at: ScreenPoint,
}

/// Vertical centre of lane `index` when `count` lanes share the surface.
pub fn lane_y(index: usize, count: usize, rect: SurfaceRect) -> f64 {
    let count = count.max(1) as f64;
    rect.top + rect.height * (index as f64 + 0.5) / count
}

/// One marker per event, lanes stacked top to bottom in track order.
pub fn event_markers(graph: &TrackGraph, rect: SurfaceRect) -> Vec<EventMarker> {
    let count = graph.track_count();
    graph
        .tracks()
        .iter()
        .enumerate()
        .flat_map(|(lane, track)| {
            let y = lane_y(lane, count, rect);
            track.events_by_position().into_iter().map(move |event| EventMarker {
                id: event.id,
                track: track.id,
                at: ScreenPoint::new(position_to_x(event.position, rect), y),
                color: track.color.clone(),
                label: event.label.clone(),
            })
        })
        .collect()
}

/// One connector per connection, bowing through the vertical midpoint.
pub fn connectors(graph: &TrackGraph, rect: SurfaceRect) -> Vec<Connector> {
    let centres: HashMap<EventId, ScreenPoint> = event_markers(graph, rect)
        .into_iter()
        .map(|m| (m.id, m.at))
        .collect();

    graph
        .connections()
        .into_iter()
        .filter_map(|(source, target)| {
            let from = *centres.get(&source)?;
            let to = *centres.get(&target)?;
            let mid_y = (from.y + to.y) / 2.0;
            Some(Connector {
                source,
                target,
                from,
                to,
                control_a: ScreenPoint::new(from.x, mid_y),
                control_b: ScreenPoint::new(to.x, mid_y),
            })
        })
        .collect()
}

/// Markers for every curve point, in path order.
pub fn curve_markers(curve: &Curve, rect: SurfaceRect) -> Vec<PointMarker> {
    curve
        .sorted_points()
        .into_iter()
        .map(|p| PointMarker {
            id: p.id,
            at: to_screen(p.coords(), rect, curve.scale()),
            accent: p.accent,
            label: p.label.clone(),
        })
        .collect()
}

/// Screen vertices of the curve line, left to right.
pub fn curve_polyline(curve: &Curve, rect: SurfaceRect) -> Vec<ScreenPoint> {
    curve
        .derive_path()
        .into_iter()
        .map(|p: DomainPoint| to_screen(p, rect, curve.scale()))
        .collect()
}

/// `M x y L x y ...` for a list of vertices; empty input gives an empty string.
pub fn svg_polyline_path(points: &[ScreenPoint]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let cmd = if i == 0 { "M" } else { "L" };
            format!("{cmd} {} {}", fmt_num(p.x), fmt_num(p.y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ticks along the bottom edge every `step` percent of the story.
///
/// Steps finer than one percent give no ticks.
pub fn position_axis(rect: SurfaceRect, step: f64) -> Vec<AxisLabel> {
    if !step.is_finite() || step < 1.0 {
        return Vec::new();
    }
    let mut labels = Vec::new();
    let mut position = POSITION_MIN;
    while position <= POSITION_MAX + f64::EPSILON {
        labels.push(AxisLabel {
            text: format!("{}%", fmt_num(position)),
            at: ScreenPoint::new(position_to_x(position, rect), rect.bottom()),
        });
        position += step;
    }
    labels
}

/// Most labels [`intensity_axis`] hands out, whatever the scale.
pub const MAX_INTENSITY_TICKS: usize = 20;

/// Ticks along the left edge, top down, on whole numbers of the scale.
///
/// Every whole number gets a tick while the span fits in
/// [`MAX_INTENSITY_TICKS`]; wider scales tick on a coarser whole step.
pub fn intensity_axis(rect: SurfaceRect, scale: IntensityScale) -> Vec<AxisLabel> {
    let Some(scale) = scale.normalized() else {
        return Vec::new();
    };
    let step = (scale.span() / MAX_INTENSITY_TICKS as f64).ceil().max(1.0);
    let mut labels = Vec::new();
    let mut value = (scale.max / step).floor() * step;
    while value >= scale.min && labels.len() <= MAX_INTENSITY_TICKS {
        labels.push(AxisLabel {
            text: fmt_num(value),
            at: ScreenPoint::new(rect.left, intensity_to_y(value, rect, scale)),
        });
        value -= step;
    }
    labels
}

/// Two decimals at most, trailing zeros dropped.
pub fn fmt_num(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
