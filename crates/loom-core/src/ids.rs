use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", &self.0.to_string()[..8])
            }
        }
    };
}

define_id!(
    /// Unique identifier for a viewpoint track.
    TrackId
);

define_id!(
    /// Unique identifier for an event placed on a track.
    EventId
);

define_id!(
    /// Unique identifier for a point on a momentum or tension curve.
    PointId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(TrackId::new(), TrackId::new());
        assert_ne!(EventId::new(), EventId::new());
        assert_ne!(PointId::new(), PointId::new());
    }

    #[test]
    fn display_is_short_prefix() {
        let id = EventId::new();
        let shown = id.to_string();
        assert_eq!(shown.len(), 8);
        assert!(id.0.to_string().starts_with(&shown));
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = PointId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }
}
