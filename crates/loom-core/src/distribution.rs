//! Percentage mixes: scene types, scene lengths, and stakes.
//!
//! Weights are meant to add up to 100 but nothing enforces it. Editing one
//! category never touches its siblings; callers check [`Distribution::drift`]
//! or [`Distribution::is_balanced`] when they care.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

/// Absolute difference from 100 still considered balanced.
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// One weighted category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Key, unique within its distribution.
    pub key: String,
    /// Share in percent, `[0, 100]`.
    pub weight: f64,
}

/// A named set of percentage-weighted categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    categories: Vec<Category>,
}

impl Distribution {
    /// Build a distribution. Weights are clamped to `[0, 100]` (non-finite
    /// weights become 0) and repeated keys keep their first occurrence.
    pub fn new<I, K>(categories: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut list: Vec<Category> = Vec::new();
        for (key, weight) in categories {
            let key = key.into();
            if list.iter().any(|c| c.key == key) {
                continue;
            }
            list.push(Category {
                key,
                weight: clamp_weight(weight),
            });
        }
        Self { categories: list }
    }

    /// Categories in definition order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Current weight of a category.
    pub fn weight(&self, key: &str) -> Option<f64> {
        self.categories.iter().find(|c| c.key == key).map(|c| c.weight)
    }

    /// Set one category's weight. Returns the stored (clamped) value.
    pub fn set_weight(&mut self, key: &str, percent: f64) -> EditResult<f64> {
        if !percent.is_finite() {
            return Err(EditError::NonFinite("category weight"));
        }
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.key == key)
            .ok_or_else(|| EditError::CategoryNotFound(key.to_string()))?;
        category.weight = clamp_weight(percent);
        Ok(category.weight)
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.categories.iter().map(|c| c.weight).sum()
    }

    /// `total_weight() - 100`.
    pub fn drift(&self) -> f64 {
        self.total_weight() - 100.0
    }

    /// True if the weights add up to 100.
    pub fn is_balanced(&self) -> bool {
        self.drift().abs() < BALANCE_TOLERANCE
    }
}

fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Which of the editor's mixes a distribution is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    /// Action / dialogue / reflection / description.
    SceneTypes,
    /// Short / medium / long scenes.
    SceneLengths,
    /// What the characters stand to lose.
    Stakes,
}

impl DistributionKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 3] = [Self::SceneTypes, Self::SceneLengths, Self::Stakes];
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SceneTypes => write!(f, "scene types"),
            Self::SceneLengths => write!(f, "scene lengths"),
            Self::Stakes => write!(f, "stakes"),
        }
    }
}

/// The three mixes an editor session owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distributions {
    scene_types: Distribution,
    scene_lengths: Distribution,
    stakes: Distribution,
}

impl Default for Distributions {
    fn default() -> Self {
        Self {
            scene_types: Distribution::new([
                ("action", 25.0),
                ("dialogue", 25.0),
                ("reflection", 25.0),
                ("description", 25.0),
            ]),
            scene_lengths: Distribution::new([
                ("short", 30.0),
                ("medium", 50.0),
                ("long", 20.0),
            ]),
            stakes: Distribution::new([
                ("personal", 20.0),
                ("relational", 20.0),
                ("professional", 20.0),
                ("societal", 20.0),
                ("existential", 20.0),
            ]),
        }
    }
}

impl Distributions {
    /// Borrow one distribution.
    pub fn get(&self, kind: DistributionKind) -> &Distribution {
        match kind {
            DistributionKind::SceneTypes => &self.scene_types,
            DistributionKind::SceneLengths => &self.scene_lengths,
            DistributionKind::Stakes => &self.stakes,
        }
    }

    /// Mutably borrow one distribution.
    pub fn get_mut(&mut self, kind: DistributionKind) -> &mut Distribution {
        match kind {
            DistributionKind::SceneTypes => &mut self.scene_types,
            DistributionKind::SceneLengths => &mut self.scene_lengths,
            DistributionKind::Stakes => &mut self.stakes,
        }
    }

    /// Set a weight in one distribution.
    pub fn set_weight(&mut self, kind: DistributionKind, key: &str, percent: f64) -> EditResult<f64> {
        let stored = self.get_mut(kind).set_weight(key, percent)?;
        tracing::debug!(distribution = %kind, key, weight = stored, total = self.get(kind).total_weight(), "Set weight");
        Ok(stored)
    }

    /// All distributions with their kinds.
    pub fn iter(&self) -> impl Iterator<Item = (DistributionKind, &Distribution)> {
        DistributionKind::ALL.into_iter().map(|k| (k, self.get(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_balanced() {
        let all = Distributions::default();
        for (kind, dist) in all.iter() {
            assert!(dist.is_balanced(), "{kind} should start at 100");
        }
    }

    #[test]
    fn set_weight_does_not_renormalize() {
        let mut all = Distributions::default();
        all.set_weight(DistributionKind::SceneLengths, "short", 50.0)
            .unwrap();
        let lengths = all.get(DistributionKind::SceneLengths);
        assert_eq!(lengths.weight("medium"), Some(50.0));
        assert_eq!(lengths.weight("long"), Some(20.0));
        assert!((lengths.total_weight() - 120.0).abs() < 1e-9);
        assert!((lengths.drift() - 20.0).abs() < 1e-9);
        assert!(!lengths.is_balanced());
    }

    #[test]
    fn weights_are_clamped() {
        let mut dist = Distribution::new([("a", 150.0), ("b", -4.0)]);
        assert_eq!(dist.weight("a"), Some(100.0));
        assert_eq!(dist.weight("b"), Some(0.0));
        assert_eq!(dist.set_weight("b", 300.0).unwrap(), 100.0);
    }

    #[test]
    fn unknown_key_and_nan_rejected() {
        let mut dist = Distribution::new([("a", 60.0), ("b", 40.0)]);
        assert_eq!(
            dist.set_weight("c", 10.0),
            Err(EditError::CategoryNotFound("c".into()))
        );
        assert!(dist.set_weight("a", f64::NAN).is_err());
        assert_eq!(dist.weight("a"), Some(60.0));
        assert!(dist.is_balanced());
    }

    #[test]
    fn duplicate_keys_keep_first() {
        let dist = Distribution::new([("a", 10.0), ("a", 90.0)]);
        assert_eq!(dist.categories().len(), 1);
        assert_eq!(dist.weight("a"), Some(10.0));
    }
}
