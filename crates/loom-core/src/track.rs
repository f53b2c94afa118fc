//! Viewpoint tracks and the events placed on them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::coords::clamp_position;
use crate::error::{EditError, EditResult};
use crate::graph::ConnectionMap;
use crate::ids::{EventId, TrackId};

/// A positioned narrative beat on one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,
    /// The track that owns this event.
    pub track: TrackId,
    /// Story position in `[0, 100]`.
    pub position: f64,
    /// Free-text description.
    pub label: String,
}

/// One parallel storyline lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique, stable identifier.
    pub id: TrackId,
    /// Display name.
    pub label: String,
    /// Opaque display attribute handed to the view layer.
    pub color: String,
    events: Vec<Event>,
}

impl Track {
    fn new(label: String, color: String) -> Self {
        Self {
            id: TrackId::new(),
            label,
            color,
            events: Vec::new(),
        }
    }

    /// Events in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events ordered by position; ties keep insertion order.
    pub fn events_by_position(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self.events.iter().collect();
        events.sort_by(|a, b| a.position.total_cmp(&b.position));
        events
    }
}

/// Owns every track, every event, and the connections between events.
#[derive(Debug, Clone)]
pub struct TrackGraph {
    tracks: Vec<Track>,
    connections: ConnectionMap,

    // Indexes
    owner: HashMap<EventId, TrackId>,

    config: EditorConfig,
    created: usize,
}

impl TrackGraph {
    /// Create a graph holding `config.initial_tracks` empty tracks.
    pub fn new(config: &EditorConfig) -> Self {
        let mut graph = Self {
            tracks: Vec::new(),
            connections: ConnectionMap::new(),
            owner: HashMap::new(),
            config: config.clone(),
            created: 0,
        };
        for _ in 0..config.effective_initial_tracks() {
            graph.push_track();
        }
        graph
    }

    fn push_track(&mut self) -> TrackId {
        let label = format!("{} {}", self.config.track_label_prefix, self.created + 1);
        let color = self.config.color_for(self.created);
        self.created += 1;
        let track = Track::new(label, color);
        let id = track.id;
        self.tracks.push(track);
        id
    }

    // -----------------------------------------------------------------------
    // Tracks
    // -----------------------------------------------------------------------

    /// Append a new empty track with a generated label and color.
    #[tracing::instrument(skip(self))]
    pub fn add_track(&mut self) -> EditResult<TrackId> {
        let max = self.max_tracks();
        if self.tracks.len() >= max {
            return Err(EditError::TrackLimitReached { max });
        }
        let id = self.push_track();
        tracing::debug!(track = %id, count = self.tracks.len(), "Added track");
        Ok(id)
    }

    /// Remove a track with all its events and every edge touching them.
    #[tracing::instrument(skip(self))]
    pub fn remove_track(&mut self, id: TrackId) -> EditResult<Track> {
        let index = self
            .track_index(id)
            .ok_or(EditError::TrackNotFound(id))?;
        if self.tracks.len() == 1 {
            return Err(EditError::LastTrack);
        }

        let track = self.tracks.remove(index);
        let mut edges = 0;
        for event in &track.events {
            self.owner.remove(&event.id);
            edges += self.connections.remove_event(event.id);
        }
        tracing::debug!(
            track = %id,
            events = track.events.len(),
            edges,
            "Removed track"
        );
        Ok(track)
    }

    /// Change a track's display name.
    pub fn rename_track(&mut self, id: TrackId, label: impl Into<String>) -> EditResult<()> {
        let track = self.track_mut(id).ok_or(EditError::TrackNotFound(id))?;
        track.label = label.into();
        Ok(())
    }

    /// Get a track by ID.
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Lane index of a track (its position in the track list).
    pub fn track_index(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// All tracks in creation order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// The configured track limit.
    pub fn max_tracks(&self) -> usize {
        self.config.effective_max_tracks()
    }

    /// True if another track can be added.
    pub fn can_add_track(&self) -> bool {
        self.tracks.len() < self.max_tracks()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Place a new event on a track. The position is clamped into `[0, 100]`.
    #[tracing::instrument(skip(self, label))]
    pub fn add_event(
        &mut self,
        track: TrackId,
        position: f64,
        label: impl Into<String>,
    ) -> EditResult<EventId> {
        if !position.is_finite() {
            return Err(EditError::NonFinite("event position"));
        }
        let owner = self
            .track_mut(track)
            .ok_or(EditError::TrackNotFound(track))?;
        let event = Event {
            id: EventId::new(),
            track,
            position: clamp_position(position),
            label: label.into(),
        };
        let id = event.id;
        owner.events.push(event);
        self.owner.insert(id, track);
        tracing::debug!(event = %id, "Added event");
        Ok(id)
    }

    /// Move an event along its track. Returns the stored (clamped) position.
    pub fn move_event(&mut self, id: EventId, position: f64) -> EditResult<f64> {
        if !position.is_finite() {
            return Err(EditError::NonFinite("event position"));
        }
        let event = self.event_mut(id).ok_or(EditError::EventNotFound(id))?;
        event.position = clamp_position(position);
        tracing::trace!(event = %id, position = event.position, "Moved event");
        Ok(event.position)
    }

    /// Change an event's label.
    pub fn relabel_event(&mut self, id: EventId, label: impl Into<String>) -> EditResult<()> {
        let event = self.event_mut(id).ok_or(EditError::EventNotFound(id))?;
        event.label = label.into();
        Ok(())
    }

    /// Remove an event and every edge that starts or ends at it.
    #[tracing::instrument(skip(self))]
    pub fn remove_event(&mut self, id: EventId) -> EditResult<Event> {
        let track_id = self
            .owner
            .get(&id)
            .copied()
            .ok_or(EditError::EventNotFound(id))?;
        let track = self
            .track_mut(track_id)
            .ok_or(EditError::TrackNotFound(track_id))?;
        let index = track
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or(EditError::EventNotFound(id))?;
        let event = track.events.remove(index);
        self.owner.remove(&id);
        let edges = self.connections.remove_event(id);
        tracing::debug!(event = %id, edges, "Removed event");
        Ok(event)
    }

    /// Get an event by ID.
    pub fn event(&self, id: EventId) -> Option<&Event> {
        let track = self.owner.get(&id)?;
        self.track(*track)?.events.iter().find(|e| e.id == id)
    }

    fn event_mut(&mut self, id: EventId) -> Option<&mut Event> {
        let track = *self.owner.get(&id)?;
        self.track_mut(track)?.events.iter_mut().find(|e| e.id == id)
    }

    /// True if the event exists on some track.
    pub fn contains_event(&self, id: EventId) -> bool {
        self.owner.contains_key(&id)
    }

    /// Total number of events across all tracks.
    pub fn event_count(&self) -> usize {
        self.owner.len()
    }

    /// Events of one track ordered by position.
    pub fn events_in_order(&self, track: TrackId) -> Vec<&Event> {
        self.track(track)
            .map(Track::events_by_position)
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Point `source` at `target`, replacing any earlier outgoing connection.
    ///
    /// Returns the replaced target, if any.
    #[tracing::instrument(skip(self))]
    pub fn connect(&mut self, source: EventId, target: EventId) -> EditResult<Option<EventId>> {
        if source == target {
            return Err(EditError::SelfConnection(source));
        }
        if !self.contains_event(source) {
            return Err(EditError::EventNotFound(source));
        }
        if !self.contains_event(target) {
            return Err(EditError::EventNotFound(target));
        }
        let previous = self.connections.connect(source, target)?;
        if let Some(old) = previous {
            tracing::debug!(%source, %target, replaced = %old, "Replaced connection");
        } else {
            tracing::debug!(%source, %target, "Connected events");
        }
        Ok(previous)
    }

    /// Clear an event's outgoing connection. Returns the former target.
    pub fn disconnect(&mut self, source: EventId) -> EditResult<Option<EventId>> {
        if !self.contains_event(source) {
            return Err(EditError::EventNotFound(source));
        }
        Ok(self.connections.disconnect(source))
    }

    /// The event that `source` points at.
    pub fn connection_target(&self, source: EventId) -> Option<EventId> {
        self.connections.target_of(source)
    }

    /// Every event pointing at `target`.
    pub fn incoming(&self, target: EventId) -> &[EventId] {
        self.connections.sources_of(target)
    }

    /// Number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// All connections in track order, then event insertion order.
    pub fn connections(&self) -> Vec<(EventId, EventId)> {
        self.tracks
            .iter()
            .flat_map(|t| t.events.iter())
            .filter_map(|e| self.connections.target_of(e.id).map(|t| (e.id, t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> TrackGraph {
        TrackGraph::new(&EditorConfig::default())
    }

    fn two_lanes(graph: &TrackGraph) -> (TrackId, TrackId) {
        (graph.tracks()[0].id, graph.tracks()[1].id)
    }

    #[test]
    fn starts_with_configured_tracks() {
        let g = graph();
        assert_eq!(g.track_count(), 2);
        assert_eq!(g.tracks()[0].label, "Viewpoint 1");
        assert_eq!(g.tracks()[1].label, "Viewpoint 2");
        assert_eq!(g.tracks()[0].color, "indigo");
        assert_eq!(g.tracks()[1].color, "emerald");
    }

    #[test]
    fn add_track_up_to_limit() {
        let mut g = graph();
        g.add_track().unwrap();
        g.add_track().unwrap();
        assert_eq!(g.track_count(), 4);
        assert!(!g.can_add_track());
        assert_eq!(
            g.add_track(),
            Err(EditError::TrackLimitReached { max: 4 })
        );
        assert_eq!(g.track_count(), 4);
    }

    #[test]
    fn labels_keep_counting_after_removal() {
        let mut g = graph();
        let (_, second) = two_lanes(&g);
        g.remove_track(second).unwrap();
        let id = g.add_track().unwrap();
        assert_eq!(g.track(id).unwrap().label, "Viewpoint 3");
    }

    #[test]
    fn last_track_cannot_be_removed() {
        let mut g = TrackGraph::new(&EditorConfig::default().with_initial_tracks(1));
        let only = g.tracks()[0].id;
        assert_eq!(g.remove_track(only), Err(EditError::LastTrack));
        assert_eq!(g.track_count(), 1);
    }

    #[test]
    fn rename_track() {
        let mut g = graph();
        let (first, _) = two_lanes(&g);
        g.rename_track(first, "Elena").unwrap();
        assert_eq!(g.track(first).unwrap().label, "Elena");
        assert!(g.rename_track(TrackId::new(), "Nobody").is_err());
    }

    #[test]
    fn add_event_clamps_position() {
        let mut g = graph();
        let (first, _) = two_lanes(&g);
        let high = g.add_event(first, 120.0, "Climax").unwrap();
        let low = g.add_event(first, -3.0, "Prologue").unwrap();
        assert_eq!(g.event(high).unwrap().position, 100.0);
        assert_eq!(g.event(low).unwrap().position, 0.0);
    }

    #[test]
    fn add_event_rejects_unknown_track_and_nan() {
        let mut g = graph();
        let (first, _) = two_lanes(&g);
        let ghost = TrackId::new();
        assert_eq!(
            g.add_event(ghost, 10.0, "x"),
            Err(EditError::TrackNotFound(ghost))
        );
        assert!(g.add_event(first, f64::NAN, "x").is_err());
        assert_eq!(g.event_count(), 0);
    }

    #[test]
    fn move_event_keeps_connections() {
        let mut g = graph();
        let (first, second) = two_lanes(&g);
        let a = g.add_event(first, 10.0, "A").unwrap();
        let b = g.add_event(second, 20.0, "B").unwrap();
        g.connect(a, b).unwrap();

        assert_eq!(g.move_event(a, 250.0).unwrap(), 100.0);
        assert_eq!(g.event(a).unwrap().track, first);
        assert_eq!(g.connection_target(a), Some(b));
    }

    #[test]
    fn second_connect_replaces_first() {
        let mut g = graph();
        let (first, second) = two_lanes(&g);
        let a = g.add_event(first, 10.0, "A").unwrap();
        let b = g.add_event(second, 20.0, "B").unwrap();
        let c = g.add_event(second, 30.0, "C").unwrap();

        g.connect(a, b).unwrap();
        assert_eq!(g.connect(a, c).unwrap(), Some(b));
        assert_eq!(g.connection_target(a), Some(c));
        assert_eq!(g.connection_count(), 1);
        assert!(g.incoming(b).is_empty());
    }

    #[test]
    fn self_and_dangling_connections_rejected() {
        let mut g = graph();
        let (first, _) = two_lanes(&g);
        let a = g.add_event(first, 10.0, "A").unwrap();
        assert_eq!(g.connect(a, a), Err(EditError::SelfConnection(a)));
        let ghost = EventId::new();
        assert_eq!(g.connect(a, ghost), Err(EditError::EventNotFound(ghost)));
        assert_eq!(g.connection_count(), 0);
    }

    #[test]
    fn removing_track_clears_references_into_it() {
        let mut g = graph();
        let (first, second) = two_lanes(&g);
        let a = g.add_event(first, 10.0, "A").unwrap();
        let b = g.add_event(second, 20.0, "B").unwrap();
        g.connect(a, b).unwrap();
        g.connect(b, a).unwrap();

        let removed = g.remove_track(second).unwrap();
        assert_eq!(removed.events().len(), 1);
        assert_eq!(g.connection_target(a), None);
        assert!(g.event(b).is_none());
        assert_eq!(g.connection_count(), 0);
    }

    #[test]
    fn remove_event_clears_incoming() {
        let mut g = graph();
        let (first, second) = two_lanes(&g);
        let a = g.add_event(first, 10.0, "A").unwrap();
        let c = g.add_event(first, 15.0, "C").unwrap();
        let b = g.add_event(second, 20.0, "B").unwrap();
        g.connect(a, b).unwrap();
        g.connect(c, b).unwrap();

        g.remove_event(b).unwrap();
        assert_eq!(g.connection_target(a), None);
        assert_eq!(g.connection_target(c), None);
        assert!(g.remove_event(b).is_err());
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut g = graph();
        let (first, second) = two_lanes(&g);
        let a = g.add_event(first, 10.0, "A").unwrap();
        let b = g.add_event(second, 20.0, "B").unwrap();
        g.connect(a, b).unwrap();
        assert_eq!(g.disconnect(a).unwrap(), Some(b));
        assert_eq!(g.disconnect(a).unwrap(), None);
    }

    #[test]
    fn events_in_order_sorts_by_position() {
        let mut g = graph();
        let (first, _) = two_lanes(&g);
        g.add_event(first, 70.0, "late").unwrap();
        g.add_event(first, 5.0, "early").unwrap();
        g.add_event(first, 40.0, "middle").unwrap();

        let labels: Vec<&str> = g
            .events_in_order(first)
            .iter()
            .map(|e| e.label.as_str())
            .collect();
        assert_eq!(labels, vec!["early", "middle", "late"]);
        assert_eq!(g.track(first).unwrap().events()[0].label, "late");
    }
}
