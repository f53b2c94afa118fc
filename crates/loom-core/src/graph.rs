//! The sparse directed connection relation between timeline events.
//!
//! Edges live here rather than on the event records so that cascade cleanup
//! and self-loop checks do not depend on how events are stored. Each source
//! has at most one outgoing edge; a target may have any number of sources.

use std::collections::HashMap;

use crate::error::{EditError, EditResult};
use crate::ids::EventId;

/// Adjacency map from source event to target event, with a reverse index.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMap {
    outgoing: HashMap<EventId, EventId>,
    incoming: HashMap<EventId, Vec<EventId>>,
}

impl ConnectionMap {
    /// Create an empty connection map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `source` at `target`, replacing any previous outgoing edge.
    ///
    /// Returns the replaced target, if there was one.
    pub fn connect(&mut self, source: EventId, target: EventId) -> EditResult<Option<EventId>> {
        if source == target {
            return Err(EditError::SelfConnection(source));
        }
        let previous = self.outgoing.insert(source, target);
        if let Some(old) = previous {
            self.unlink_incoming(old, source);
        }
        self.incoming.entry(target).or_default().push(source);
        Ok(previous)
    }

    /// Remove the outgoing edge of `source`, returning its former target.
    pub fn disconnect(&mut self, source: EventId) -> Option<EventId> {
        let target = self.outgoing.remove(&source)?;
        self.unlink_incoming(target, source);
        Some(target)
    }

    /// Drop every edge that starts or ends at `event`. Returns how many went.
    pub fn remove_event(&mut self, event: EventId) -> usize {
        let mut removed = usize::from(self.disconnect(event).is_some());
        if let Some(sources) = self.incoming.remove(&event) {
            for source in sources {
                if self.outgoing.remove(&source).is_some() {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// The target of `source`'s outgoing edge.
    pub fn target_of(&self, source: EventId) -> Option<EventId> {
        self.outgoing.get(&source).copied()
    }

    /// Every source currently pointing at `target`, in connection order.
    pub fn sources_of(&self, target: EventId) -> &[EventId] {
        self.incoming.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All edges as `(source, target)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (EventId, EventId)> + '_ {
        self.outgoing.iter().map(|(s, t)| (*s, *t))
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.outgoing.len()
    }

    /// True if there are no edges.
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty()
    }

    fn unlink_incoming(&mut self, target: EventId, source: EventId) {
        if let Some(sources) = self.incoming.get_mut(&target) {
            sources.retain(|s| *s != source);
            if sources.is_empty() {
                self.incoming.remove(&target);
            }
        }
    }
}
