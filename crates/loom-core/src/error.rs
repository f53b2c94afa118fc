use crate::ids::{EventId, PointId, TrackId};

/// Alias for `Result<T, EditError>`.
pub type EditResult<T> = Result<T, EditError>;

/// Reasons an editor operation was a no-op.
///
/// None of these are fatal. A store that returns `Err` has left its state
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// The requested track does not exist.
    #[error("track not found: {0}")]
    TrackNotFound(TrackId),

    /// The requested event does not exist on any track.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// The requested curve point does not exist.
    #[error("curve point not found: {0}")]
    PointNotFound(PointId),

    /// The distribution has no category with this key.
    #[error("unknown category: \"{0}\"")]
    CategoryNotFound(String),

    /// Adding another track would exceed the configured maximum.
    #[error("track limit reached ({max} tracks)")]
    TrackLimitReached {
        /// The configured maximum number of tracks.
        max: usize,
    },

    /// The last remaining track cannot be removed.
    #[error("cannot remove the last remaining track")]
    LastTrack,

    /// An event cannot be connected to itself.
    #[error("event {0} cannot connect to itself")]
    SelfConnection(EventId),

    /// A coordinate or rectangle value was NaN or infinite.
    #[error("non-finite input: {0}")]
    NonFinite(&'static str),

    /// A drag update arrived with no gesture in progress.
    #[error("no drag in progress")]
    NoActiveDrag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            EditError::TrackLimitReached { max: 4 }.to_string(),
            "track limit reached (4 tracks)"
        );
        assert_eq!(
            EditError::CategoryNotFound("duel".into()).to_string(),
            "unknown category: \"duel\""
        );
    }
}
