//! The editor session: the single owner of all timeline editor state.
//!
//! A session is created when an editor opens and dropped when it closes.
//! Every mutation goes through `&mut self`, so one session never sees two
//! operations interleave. Share it across threads only behind a mutex.

use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandOutcome, ElementRef};
use crate::config::EditorConfig;
use crate::coords::{ScreenPoint, SurfaceRect, to_domain, to_position};
use crate::curve::{Curve, CurveKind};
use crate::distribution::{DistributionKind, Distributions};
use crate::error::{EditError, EditResult};
use crate::ids::{EventId, PointId, TrackId};
use crate::snapshot::{CurveView, DistributionView, EditorSnapshot, TrackView};
use crate::track::{Event, Track, TrackGraph};

/// The element a drag gesture moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragTarget {
    /// A timeline event; only the horizontal axis matters.
    Event {
        /// The event being dragged.
        event: EventId,
    },
    /// A curve point; both axes matter.
    Point {
        /// The curve the point lives on.
        curve: CurveKind,
        /// The point being dragged.
        point: PointId,
    },
}

/// Result of a connect gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectGesture {
    /// The event is now the pending source.
    Pending(EventId),
    /// The pending source was connected to this event.
    Connected {
        /// Source event.
        source: EventId,
        /// Target event.
        target: EventId,
        /// Target of the connection this one replaced.
        replaced: Option<EventId>,
    },
    /// The gesture hit the pending source again and cleared it.
    Cancelled(EventId),
}

/// Owns the tracks, curves, and distributions of one open editor.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    graph: TrackGraph,
    momentum: Curve,
    tension: Curve,
    distributions: Distributions,
    pending_source: Option<EventId>,
    drag: Option<DragTarget>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Open a session with the configured number of empty tracks.
    pub fn new(config: EditorConfig) -> Self {
        let graph = TrackGraph::new(&config);
        let momentum = Curve::new(CurveKind::Momentum, config.momentum_scale);
        let tension = Curve::new(CurveKind::Tension, config.tension_scale);
        tracing::debug!(tracks = graph.track_count(), "Opened editor session");
        Self {
            config,
            graph,
            momentum,
            tension,
            distributions: Distributions::default(),
            pending_source: None,
            drag: None,
        }
    }

    /// The configuration this session was opened with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The track graph.
    pub fn graph(&self) -> &TrackGraph {
        &self.graph
    }

    /// One of the two story curves.
    pub fn curve(&self, kind: CurveKind) -> &Curve {
        match kind {
            CurveKind::Momentum => &self.momentum,
            CurveKind::Tension => &self.tension,
        }
    }

    fn curve_mut(&mut self, kind: CurveKind) -> &mut Curve {
        match kind {
            CurveKind::Momentum => &mut self.momentum,
            CurveKind::Tension => &mut self.tension,
        }
    }

    /// The percentage mixes.
    pub fn distributions(&self) -> &Distributions {
        &self.distributions
    }

    // -----------------------------------------------------------------------
    // Tracks and events
    // -----------------------------------------------------------------------

    /// Append a track (no-op at the track limit).
    pub fn add_track(&mut self) -> EditResult<TrackId> {
        self.graph.add_track()
    }

    /// Remove a track and everything attached to it (no-op on the last track).
    pub fn remove_track(&mut self, id: TrackId) -> EditResult<Track> {
        let track = self.graph.remove_track(id)?;
        self.forget_removed_events(track.events().iter().map(|e| e.id));
        Ok(track)
    }

    /// Rename a track.
    pub fn rename_track(&mut self, id: TrackId, label: impl Into<String>) -> EditResult<()> {
        self.graph.rename_track(id, label)
    }

    /// Place an event on a track.
    pub fn add_event(
        &mut self,
        track: TrackId,
        position: f64,
        label: impl Into<String>,
    ) -> EditResult<EventId> {
        self.graph.add_event(track, position, label)
    }

    /// Move an event along its track.
    pub fn move_event(&mut self, id: EventId, position: f64) -> EditResult<f64> {
        self.graph.move_event(id, position)
    }

    /// Change an event's label.
    pub fn relabel_event(&mut self, id: EventId, label: impl Into<String>) -> EditResult<()> {
        self.graph.relabel_event(id, label)
    }

    /// Remove an event and every connection touching it.
    pub fn remove_event(&mut self, id: EventId) -> EditResult<Event> {
        let event = self.graph.remove_event(id)?;
        self.forget_removed_events(std::iter::once(id));
        Ok(event)
    }

    /// Connect `source` to `target`, replacing `source`'s previous connection.
    pub fn connect(&mut self, source: EventId, target: EventId) -> EditResult<Option<EventId>> {
        self.graph.connect(source, target)
    }

    /// Clear an event's outgoing connection.
    pub fn disconnect(&mut self, id: EventId) -> EditResult<Option<EventId>> {
        self.graph.disconnect(id)
    }

    fn forget_removed_events(&mut self, removed: impl IntoIterator<Item = EventId>) {
        for id in removed {
            if self.pending_source == Some(id) {
                self.pending_source = None;
            }
            if self.drag == Some(DragTarget::Event { event: id }) {
                self.drag = None;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Connect mode
    // -----------------------------------------------------------------------

    /// Handle a connect gesture on `event`.
    ///
    /// The first gesture selects a source. A gesture on another event
    /// connects the two and clears the selection; a gesture on the selected
    /// source clears it without connecting.
    pub fn connect_gesture(&mut self, event: EventId) -> EditResult<ConnectGesture> {
        if !self.graph.contains_event(event) {
            return Err(EditError::EventNotFound(event));
        }
        match self.pending_source {
            None => {
                self.pending_source = Some(event);
                tracing::debug!(%event, "Connect source selected");
                Ok(ConnectGesture::Pending(event))
            }
            Some(source) if source == event => {
                self.pending_source = None;
                tracing::debug!(%event, "Connect cancelled");
                Ok(ConnectGesture::Cancelled(event))
            }
            Some(source) => {
                let replaced = self.graph.connect(source, event)?;
                self.pending_source = None;
                Ok(ConnectGesture::Connected {
                    source,
                    target: event,
                    replaced,
                })
            }
        }
    }

    /// The event waiting for a second connect gesture.
    pub fn pending_source(&self) -> Option<EventId> {
        self.pending_source
    }

    /// Leave connect mode without connecting.
    pub fn cancel_connect(&mut self) -> Option<EventId> {
        self.pending_source.take()
    }

    // -----------------------------------------------------------------------
    // Curves
    // -----------------------------------------------------------------------

    /// Add a point to a curve.
    pub fn add_point(
        &mut self,
        kind: CurveKind,
        position: f64,
        intensity: f64,
        label: Option<String>,
    ) -> EditResult<PointId> {
        self.curve_mut(kind).add_point(position, intensity, label)
    }

    /// Move a curve point.
    pub fn move_point(
        &mut self,
        kind: CurveKind,
        id: PointId,
        position: f64,
        intensity: f64,
    ) -> EditResult<()> {
        self.curve_mut(kind).move_point(id, position, intensity)?;
        Ok(())
    }

    /// Remove a curve point.
    pub fn remove_point(&mut self, kind: CurveKind, id: PointId) -> EditResult<()> {
        self.curve_mut(kind).remove_point(id)?;
        if self.drag == Some(DragTarget::Point { curve: kind, point: id }) {
            self.drag = None;
        }
        Ok(())
    }

    /// Set or clear a curve point's caption.
    pub fn set_point_label(
        &mut self,
        kind: CurveKind,
        id: PointId,
        label: Option<String>,
    ) -> EditResult<()> {
        self.curve_mut(kind).set_label(id, label)
    }

    /// Mark a point as key beat / major peak.
    pub fn set_point_accent(&mut self, kind: CurveKind, id: PointId, accent: bool) -> EditResult<()> {
        self.curve_mut(kind).set_accent(id, accent)
    }

    // -----------------------------------------------------------------------
    // Distributions
    // -----------------------------------------------------------------------

    /// Set one category weight; siblings are left alone.
    pub fn set_weight(&mut self, kind: DistributionKind, key: &str, percent: f64) -> EditResult<f64> {
        self.distributions.set_weight(kind, key, percent)
    }

    // -----------------------------------------------------------------------
    // Drag gestures
    // -----------------------------------------------------------------------

    /// Start dragging an element. Replaces any gesture already in progress.
    pub fn begin_drag(&mut self, target: DragTarget) -> EditResult<()> {
        match target {
            DragTarget::Event { event } if !self.graph.contains_event(event) => {
                return Err(EditError::EventNotFound(event));
            }
            DragTarget::Point { curve, point } if self.curve(curve).point(point).is_none() => {
                return Err(EditError::PointNotFound(point));
            }
            _ => {}
        }
        self.drag = Some(target);
        tracing::debug!(?target, "Drag started");
        Ok(())
    }

    /// Move the dragged element to where the pointer is.
    ///
    /// Non-finite input leaves the element where it was. If the element has
    /// disappeared since the drag began, the gesture ends.
    pub fn drag_to(&mut self, pointer: ScreenPoint, surface: SurfaceRect) -> EditResult<()> {
        let target = self.drag.ok_or(EditError::NoActiveDrag)?;
        let result = match target {
            DragTarget::Event { event } => {
                let position =
                    to_position(pointer.x, surface).ok_or(EditError::NonFinite("drag pointer"))?;
                self.graph.move_event(event, position).map(|_| ())
            }
            DragTarget::Point { curve, point } => {
                let scale = self.curve(curve).scale();
                let domain =
                    to_domain(pointer, surface, scale).ok_or(EditError::NonFinite("drag pointer"))?;
                self.curve_mut(curve)
                    .move_point(point, domain.position, domain.intensity)
                    .map(|_| ())
            }
        };
        if matches!(
            result,
            Err(EditError::EventNotFound(_) | EditError::PointNotFound(_))
        ) {
            tracing::debug!(?target, "Drag target vanished");
            self.drag = None;
        }
        result
    }

    /// Release the pointer. The last position is final.
    pub fn end_drag(&mut self) -> Option<DragTarget> {
        let ended = self.drag.take();
        if let Some(target) = ended {
            tracing::debug!(?target, "Drag ended");
        }
        ended
    }

    /// The element currently being dragged.
    pub fn active_drag(&self) -> Option<DragTarget> {
        self.drag
    }

    // -----------------------------------------------------------------------
    // Queries and commands
    // -----------------------------------------------------------------------

    /// A read-only copy of everything the view layer draws.
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            tracks: self
                .graph
                .tracks()
                .iter()
                .map(|t| TrackView::from_track(t, &self.graph))
                .collect(),
            momentum: CurveView::from(&self.momentum),
            tension: CurveView::from(&self.tension),
            distributions: self
                .distributions
                .iter()
                .map(|(kind, dist)| DistributionView::new(kind, dist))
                .collect(),
            pending_source: self.pending_source,
        }
    }

    /// Apply a command. Never fails: rejected commands leave the session
    /// unchanged and say why.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        let outcome = match command {
            Command::AddTrack => created(self.add_track(), |id| ElementRef::Track { id }),
            Command::RemoveTrack { track } => self.remove_track(track).into(),
            Command::RenameTrack { track, label } => self.rename_track(track, label).into(),
            Command::AddEvent {
                track,
                position,
                label,
            } => created(self.add_event(track, position, label), |id| {
                ElementRef::Event { id }
            }),
            Command::MoveEvent { event, position } => self.move_event(event, position).into(),
            Command::RelabelEvent { event, label } => self.relabel_event(event, label).into(),
            Command::RemoveEvent { event } => self.remove_event(event).into(),
            Command::Connect { source, target } => self.connect(source, target).into(),
            Command::Disconnect { event } => self.disconnect(event).into(),
            Command::ConnectGesture { event } => self.connect_gesture(event).into(),
            Command::AddPoint {
                curve,
                position,
                intensity,
                label,
            } => created(self.add_point(curve, position, intensity, label), |id| {
                ElementRef::Point { curve, id }
            }),
            Command::MovePoint {
                curve,
                point,
                position,
                intensity,
            } => self.move_point(curve, point, position, intensity).into(),
            Command::RemovePoint { curve, point } => self.remove_point(curve, point).into(),
            Command::LabelPoint {
                curve,
                point,
                label,
            } => self.set_point_label(curve, point, label).into(),
            Command::AccentPoint {
                curve,
                point,
                accent,
            } => self.set_point_accent(curve, point, accent).into(),
            Command::SetWeight {
                distribution,
                key,
                percent,
            } => self.set_weight(distribution, &key, percent).into(),
            Command::BeginDrag { target } => self.begin_drag(target).into(),
            Command::DragTo { pointer, surface } => self.drag_to(pointer, surface).into(),
            Command::EndDrag => {
                self.end_drag();
                CommandOutcome::Applied
            }
        };
        if let CommandOutcome::Rejected(error) = &outcome {
            tracing::debug!(%error, "Command ignored");
        }
        outcome
    }
}

fn created<T>(result: EditResult<T>, wrap: impl FnOnce(T) -> ElementRef) -> CommandOutcome {
    match result {
        Ok(id) => CommandOutcome::Created(wrap(id)),
        Err(e) => CommandOutcome::Rejected(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditorSession {
        EditorSession::default()
    }

    fn lanes(s: &EditorSession) -> (TrackId, TrackId) {
        (s.graph().tracks()[0].id, s.graph().tracks()[1].id)
    }

    #[test]
    fn new_session_has_two_tracks_and_empty_curves() {
        let s = session();
        assert_eq!(s.graph().track_count(), 2);
        assert!(s.curve(CurveKind::Momentum).is_empty());
        assert!(s.curve(CurveKind::Tension).is_empty());
        assert_eq!(s.curve(CurveKind::Momentum).scale().min, 1.0);
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = session();
        let b = session();
        a.add_track().unwrap();
        assert_eq!(a.graph().track_count(), 3);
        assert_eq!(b.graph().track_count(), 2);
    }

    #[test]
    fn connect_gesture_two_steps() {
        let mut s = session();
        let (first, second) = lanes(&s);
        let a = s.add_event(first, 10.0, "A").unwrap();
        let b = s.add_event(second, 30.0, "B").unwrap();

        assert_eq!(s.connect_gesture(a).unwrap(), ConnectGesture::Pending(a));
        assert_eq!(s.pending_source(), Some(a));
        assert_eq!(
            s.connect_gesture(b).unwrap(),
            ConnectGesture::Connected {
                source: a,
                target: b,
                replaced: None
            }
        );
        assert_eq!(s.pending_source(), None);
        assert_eq!(s.graph().connection_target(a), Some(b));
    }

    #[test]
    fn connect_gesture_toggles_off_on_same_event() {
        let mut s = session();
        let (first, _) = lanes(&s);
        let a = s.add_event(first, 10.0, "A").unwrap();

        s.connect_gesture(a).unwrap();
        assert_eq!(s.connect_gesture(a).unwrap(), ConnectGesture::Cancelled(a));
        assert_eq!(s.pending_source(), None);
        assert_eq!(s.graph().connection_count(), 0);
    }

    #[test]
    fn pending_source_cleared_when_its_track_goes() {
        let mut s = session();
        let (_, second) = lanes(&s);
        let b = s.add_event(second, 30.0, "B").unwrap();
        s.connect_gesture(b).unwrap();
        s.remove_track(second).unwrap();
        assert_eq!(s.pending_source(), None);
    }

    #[test]
    fn drag_point_outside_surface_clamps() {
        let mut s = session();
        let id = s.add_point(CurveKind::Tension, 50.0, 5.0, None).unwrap();
        let surface = SurfaceRect::sized(300.0, 100.0);

        s.begin_drag(DragTarget::Point {
            curve: CurveKind::Tension,
            point: id,
        })
        .unwrap();
        s.drag_to(ScreenPoint::new(-50.0, 25.0), surface).unwrap();
        s.end_drag();

        let point = s.curve(CurveKind::Tension).point(id).unwrap();
        assert_eq!(point.position, 0.0);
        assert!((point.intensity - 7.5).abs() < 1e-9);
        assert_eq!(s.active_drag(), None);
    }

    #[test]
    fn drag_with_nan_keeps_last_position() {
        let mut s = session();
        let (first, _) = lanes(&s);
        let e = s.add_event(first, 10.0, "A").unwrap();
        let surface = SurfaceRect::sized(200.0, 50.0);

        s.begin_drag(DragTarget::Event { event: e }).unwrap();
        s.drag_to(ScreenPoint::new(100.0, 0.0), surface).unwrap();
        assert!(s.drag_to(ScreenPoint::new(f64::NAN, 0.0), surface).is_err());
        assert_eq!(s.graph().event(e).unwrap().position, 50.0);
        assert!(s.active_drag().is_some());
    }

    #[test]
    fn drag_ends_when_target_removed() {
        let mut s = session();
        let (first, _) = lanes(&s);
        let e = s.add_event(first, 10.0, "A").unwrap();
        s.begin_drag(DragTarget::Event { event: e }).unwrap();
        s.remove_event(e).unwrap();
        assert_eq!(s.active_drag(), None);
        assert_eq!(
            s.drag_to(ScreenPoint::new(1.0, 1.0), SurfaceRect::sized(10.0, 10.0)),
            Err(EditError::NoActiveDrag)
        );
    }

    #[test]
    fn begin_drag_requires_existing_target() {
        let mut s = session();
        let ghost = PointId::new();
        assert!(
            s.begin_drag(DragTarget::Point {
                curve: CurveKind::Momentum,
                point: ghost
            })
            .is_err()
        );
        assert_eq!(s.active_drag(), None);
    }

    #[test]
    fn apply_reports_creation_and_rejection() {
        let mut s = EditorSession::new(EditorConfig::default().with_initial_tracks(1));
        let only = s.graph().tracks()[0].id;

        let outcome = s.apply(Command::RemoveTrack { track: only });
        assert_eq!(outcome, CommandOutcome::Rejected(EditError::LastTrack));
        assert_eq!(s.graph().track_count(), 1);

        let outcome = s.apply(Command::AddEvent {
            track: only,
            position: 120.0,
            label: "Finale".into(),
        });
        let Some(ElementRef::Event { id }) = outcome.created() else {
            panic!("expected an event, got {outcome:?}");
        };
        assert_eq!(s.graph().event(id).unwrap().position, 100.0);
    }

    #[test]
    fn snapshot_resolves_connections() {
        let mut s = session();
        let (first, second) = lanes(&s);
        let a = s.add_event(first, 10.0, "A").unwrap();
        let b = s.add_event(second, 30.0, "B").unwrap();
        s.connect(a, b).unwrap();
        s.add_point(CurveKind::Momentum, 80.0, 4.0, None).unwrap();
        s.add_point(CurveKind::Momentum, 20.0, 6.0, None).unwrap();

        let snap = s.snapshot();
        assert_eq!(snap.event(a).unwrap().connection_target, Some(b));
        assert_eq!(snap.event(b).unwrap().incoming, 1);
        assert_eq!(snap.momentum.points[0].position, 20.0);
        assert_eq!(snap.distributions.len(), 3);
        assert!(snap.distributions.iter().all(|d| d.balanced));

        s.remove_track(second).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.event(a).unwrap().connection_target, None);
        assert!(snap.track(second).is_none());
    }
}
