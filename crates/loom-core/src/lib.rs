//! Core editor state for Storyloom's narrative timeline.
//!
//! An [`EditorSession`] owns parallel viewpoint tracks with events linked
//! across tracks, the momentum and tension curves, and the scene mix
//! distributions. Pointer input is turned into domain coordinates by
//! [`coords`], and [`render`] turns state back into drawable primitives.
//! Nothing here touches a screen, a file, or a network.

/// Editor commands as serializable values.
pub mod command;
/// Session configuration.
pub mod config;
/// Pointer-to-domain coordinate mapping.
pub mod coords;
/// Momentum and tension curves.
pub mod curve;
/// Percentage-weighted category mixes.
pub mod distribution;
/// Error types used throughout the crate.
pub mod error;
/// Directed connections between events.
pub mod graph;
/// Identifier types.
pub mod ids;
/// Drawable primitives derived from editor state.
pub mod render;
/// The editor session that owns all state.
pub mod session;
/// Read-only views for the view layer.
pub mod snapshot;
/// Viewpoint tracks and their events.
pub mod track;

/// Re-export command types.
pub use command::{Command, CommandOutcome, ElementRef};
/// Re-export the session configuration.
pub use config::EditorConfig;
/// Re-export coordinate types.
pub use coords::{DomainPoint, IntensityScale, ScreenPoint, SurfaceRect};
/// Re-export curve types.
pub use curve::{Curve, CurveKind, CurvePoint};
/// Re-export distribution types.
pub use distribution::{Distribution, DistributionKind, Distributions};
/// Re-export error types.
pub use error::{EditError, EditResult};
/// Re-export identifier types.
pub use ids::{EventId, PointId, TrackId};
/// Re-export session types.
pub use session::{ConnectGesture, DragTarget, EditorSession};
/// Re-export snapshot types.
pub use snapshot::EditorSnapshot;
/// Re-export track types.
pub use track::{Event, Track, TrackGraph};
