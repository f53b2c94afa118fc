//! Editor commands as plain values, for replay and scripting.

use serde::{Deserialize, Serialize};

use crate::coords::{ScreenPoint, SurfaceRect};
use crate::curve::CurveKind;
use crate::distribution::DistributionKind;
use crate::error::EditError;
use crate::ids::{EventId, PointId, TrackId};
use crate::session::DragTarget;

/// One operation on an editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Append a track.
    AddTrack,
    /// Remove a track and everything on it.
    RemoveTrack {
        /// Track to remove.
        track: TrackId,
    },
    /// Rename a track.
    RenameTrack {
        /// Track to rename.
        track: TrackId,
        /// New display name.
        label: String,
    },
    /// Place an event on a track.
    AddEvent {
        /// Owning track.
        track: TrackId,
        /// Story position (clamped).
        position: f64,
        /// Event label.
        #[serde(default)]
        label: String,
    },
    /// Move an event along its track.
    MoveEvent {
        /// Event to move.
        event: EventId,
        /// New position (clamped).
        position: f64,
    },
    /// Change an event's label.
    RelabelEvent {
        /// Event to relabel.
        event: EventId,
        /// New label.
        label: String,
    },
    /// Remove one event.
    RemoveEvent {
        /// Event to remove.
        event: EventId,
    },
    /// Connect two events directly.
    Connect {
        /// Source event.
        source: EventId,
        /// Target event.
        target: EventId,
    },
    /// Clear an event's outgoing connection.
    Disconnect {
        /// Source event.
        event: EventId,
    },
    /// Two-step connect: select a source, then a target.
    ConnectGesture {
        /// Event the gesture was made on.
        event: EventId,
    },
    /// Add a curve point.
    AddPoint {
        /// Which curve.
        curve: CurveKind,
        /// Story position (clamped).
        position: f64,
        /// Intensity (clamped to the curve's scale).
        intensity: f64,
        /// Optional caption.
        #[serde(default)]
        label: Option<String>,
    },
    /// Move a curve point.
    MovePoint {
        /// Which curve.
        curve: CurveKind,
        /// Point to move.
        point: PointId,
        /// New position.
        position: f64,
        /// New intensity.
        intensity: f64,
    },
    /// Remove a curve point.
    RemovePoint {
        /// Which curve.
        curve: CurveKind,
        /// Point to remove.
        point: PointId,
    },
    /// Set or clear a curve point's caption.
    LabelPoint {
        /// Which curve.
        curve: CurveKind,
        /// Point to label.
        point: PointId,
        /// New caption.
        #[serde(default)]
        label: Option<String>,
    },
    /// Mark a point as key beat / major peak.
    AccentPoint {
        /// Which curve.
        curve: CurveKind,
        /// Point to mark.
        point: PointId,
        /// Whether the accent is on.
        accent: bool,
    },
    /// Set one category weight.
    SetWeight {
        /// Which mix.
        distribution: DistributionKind,
        /// Category key.
        key: String,
        /// Weight in percent.
        percent: f64,
    },
    /// Start dragging an element.
    BeginDrag {
        /// What is being dragged.
        target: DragTarget,
    },
    /// Pointer moved during a drag.
    DragTo {
        /// Pointer position.
        pointer: ScreenPoint,
        /// Bounds of the surface the pointer is over.
        surface: SurfaceRect,
    },
    /// Pointer released.
    EndDrag,
}

/// Something a command created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementRef {
    /// A new track.
    Track {
        /// Its ID.
        id: TrackId,
    },
    /// A new event.
    Event {
        /// Its ID.
        id: EventId,
    },
    /// A new curve point.
    Point {
        /// The curve it lives on.
        curve: CurveKind,
        /// Its ID.
        id: PointId,
    },
}

/// What happened when a command was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// State changed (or the command was a harmless no-op like ending no drag).
    Applied,
    /// A new element exists.
    Created(ElementRef),
    /// The command was ignored; the session is unchanged.
    Rejected(EditError),
}

impl CommandOutcome {
    /// True unless the command was rejected.
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// The created element, if any.
    pub fn created(&self) -> Option<ElementRef> {
        match self {
            Self::Created(element) => Some(*element),
            _ => None,
        }
    }
}

impl<T> From<Result<T, EditError>> for CommandOutcome {
    fn from(result: Result<T, EditError>) -> Self {
        match result {
            Ok(_) => Self::Applied,
            Err(e) => Self::Rejected(e),
        }
    }
}
