use serde::{Deserialize, Serialize};

use crate::coords::IntensityScale;

/// Configuration for an editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Upper bound on the number of viewpoint tracks.
    pub max_tracks: usize,
    /// Number of tracks a fresh session starts with.
    pub initial_tracks: usize,
    /// Prefix for generated track labels ("Viewpoint 1", "Viewpoint 2", ...).
    pub track_label_prefix: String,
    /// Color tokens handed out to new tracks in rotation.
    pub palette: Vec<String>,
    /// Value range of the momentum curve.
    pub momentum_scale: IntensityScale,
    /// Value range of the tension curve.
    pub tension_scale: IntensityScale,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_tracks: 4,
            initial_tracks: 2,
            track_label_prefix: "Viewpoint".to_string(),
            palette: ["indigo", "emerald", "amber", "rose"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            momentum_scale: IntensityScale::MOMENTUM,
            tension_scale: IntensityScale::TENSION,
        }
    }
}

impl EditorConfig {
    /// Set the maximum track count (at least 1). Lowers `initial_tracks` if needed.
    pub fn with_max_tracks(mut self, max: usize) -> Self {
        self.max_tracks = max.max(1);
        self.initial_tracks = self.initial_tracks.min(self.max_tracks);
        self
    }

    /// Set the number of starting tracks (clamped to 1..=max_tracks).
    pub fn with_initial_tracks(mut self, count: usize) -> Self {
        self.initial_tracks = count.clamp(1, self.max_tracks.max(1));
        self
    }

    /// Set the prefix used for generated track labels.
    pub fn with_track_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.track_label_prefix = prefix.into();
        self
    }

    /// Replace the color palette.
    pub fn with_palette<I, S>(mut self, palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.palette = palette.into_iter().map(Into::into).collect();
        self
    }

    /// Set the momentum curve range.
    pub fn with_momentum_scale(mut self, scale: IntensityScale) -> Self {
        self.momentum_scale = scale;
        self
    }

    /// Set the tension curve range.
    pub fn with_tension_scale(mut self, scale: IntensityScale) -> Self {
        self.tension_scale = scale;
        self
    }

    /// Color token for the `n`-th created track (zero-based).
    pub fn color_for(&self, n: usize) -> String {
        if self.palette.is_empty() {
            return String::from("neutral");
        }
        self.palette[n % self.palette.len()].clone()
    }

    /// Limits as they are enforced, tolerating a hand-edited config.
    pub(crate) fn effective_max_tracks(&self) -> usize {
        self.max_tracks.max(1)
    }

    pub(crate) fn effective_initial_tracks(&self) -> usize {
        self.initial_tracks.clamp(1, self.effective_max_tracks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = EditorConfig::default();
        assert_eq!(config.max_tracks, 4);
        assert_eq!(config.initial_tracks, 2);
        assert_eq!(config.track_label_prefix, "Viewpoint");
        assert_eq!(config.momentum_scale, IntensityScale::MOMENTUM);
        assert_eq!(config.tension_scale, IntensityScale::TENSION);
    }

    #[test]
    fn config_builder_chain() {
        let config = EditorConfig::default()
            .with_max_tracks(6)
            .with_initial_tracks(3)
            .with_track_label_prefix("POV")
            .with_palette(["red", "blue"]);
        assert_eq!(config.max_tracks, 6);
        assert_eq!(config.initial_tracks, 3);
        assert_eq!(config.track_label_prefix, "POV");
        assert_eq!(config.color_for(0), "red");
        assert_eq!(config.color_for(3), "blue");
    }

    #[test]
    fn track_counts_clamped() {
        let config = EditorConfig::default().with_max_tracks(0);
        assert_eq!(config.max_tracks, 1);
        assert_eq!(config.initial_tracks, 1);

        let config = EditorConfig::default().with_initial_tracks(99);
        assert_eq!(config.initial_tracks, 4);
        let config = EditorConfig::default().with_initial_tracks(0);
        assert_eq!(config.initial_tracks, 1);
    }

    #[test]
    fn hand_written_config_is_tolerated() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "max_tracks": 0, "initial_tracks": 7, "palette": [] }"#)
                .unwrap();
        assert_eq!(config.effective_max_tracks(), 1);
        assert_eq!(config.effective_initial_tracks(), 1);
        assert_eq!(config.color_for(2), "neutral");
        assert_eq!(config.track_label_prefix, "Viewpoint");
    }
}
