//! Pretrained predictive artifacts used as a buy confirmation filter.
//!
//! An artifact pairs a [`Predictor`] with the [`FeatureSpec`] it was trained
//! on and the threshold a score must exceed to confirm a buy. Artifacts are
//! grouped into named [`ModelSet`]s held by an immutable
//! [`registry::ArtifactRegistry`].

pub mod features;
pub mod fusion;
pub mod registry;

use crate::domain::ohlcv::PriceBar;
use features::{FeatureError, FeatureSpec};
use std::fmt;

/// How a predictor's raw score should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreScale {
    /// Score in [0, 1]; confirms above 0.5.
    Probability,
    /// Unconstrained real score; confirms above 0.
    Unbounded,
}

impl ScoreScale {
    pub fn default_threshold(&self) -> f64 {
        match self {
            ScoreScale::Probability => 0.5,
            ScoreScale::Unbounded => 0.0,
        }
    }
}

/// A pretrained model. Implementations must be safe to share read-only
/// across concurrent simulations.
pub trait Predictor: Send + Sync + fmt::Debug {
    fn predict(&self, features: &[f64]) -> f64;
    fn input_len(&self) -> usize;
    fn scale(&self) -> ScoreScale;
}

fn weighted_sum(weights: &[f64], bias: f64, features: &[f64]) -> f64 {
    weights
        .iter()
        .zip(features)
        .map(|(w, x)| w * x)
        .sum::<f64>()
        + bias
}

/// Linear score, unbounded scale.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        weighted_sum(&self.weights, self.bias, features)
    }

    fn input_len(&self) -> usize {
        self.weights.len()
    }

    fn scale(&self) -> ScoreScale {
        ScoreScale::Unbounded
    }
}

/// Sigmoid of a linear score, probability scale.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl Predictor for LogisticModel {
    fn predict(&self, features: &[f64]) -> f64 {
        let z = weighted_sum(&self.weights, self.bias, features);
        1.0 / (1.0 + (-z).exp())
    }

    fn input_len(&self) -> usize {
        self.weights.len()
    }

    fn scale(&self) -> ScoreScale {
        ScoreScale::Probability
    }
}

#[derive(Debug)]
pub struct ModelArtifact {
    name: String,
    predictor: Box<dyn Predictor>,
    features: FeatureSpec,
    threshold: f64,
}

impl ModelArtifact {
    /// Registers a predictor with its feature contract. The confirmation
    /// threshold defaults to the predictor's scale.
    pub fn new(
        name: impl Into<String>,
        predictor: impl Predictor + 'static,
        features: FeatureSpec,
    ) -> Result<Self, FeatureError> {
        if predictor.input_len() != features.len() {
            return Err(FeatureError::WeightCount {
                expected: features.len(),
                actual: predictor.input_len(),
            });
        }
        let threshold = predictor.scale().default_threshold();
        Ok(Self {
            name: name.into(),
            predictor: Box::new(predictor),
            features,
            threshold,
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn features(&self) -> &FeatureSpec {
        &self.features
    }

    pub fn scale(&self) -> ScoreScale {
        self.predictor.scale()
    }

    /// Score for bar `index`, or `None` when the features are unavailable or
    /// the prediction is not finite.
    pub fn score(&self, bars: &[PriceBar], index: usize) -> Option<f64> {
        let features = self.features.extract(bars, index)?;
        let score = self.predictor.predict(&features);
        score.is_finite().then_some(score)
    }
}

#[derive(Debug, Default)]
pub struct ModelSet {
    models: Vec<ModelArtifact>,
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: ModelArtifact) -> Self {
        self.models.retain(|m| m.name != model.name);
        self.models.push(model);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ModelArtifact> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn models(&self) -> &[ModelArtifact] {
        &self.models
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Shared threshold of all members; `None` if empty or thresholds differ.
    pub fn ensemble_threshold(&self) -> Option<f64> {
        let first = self.models.first()?.threshold;
        self.models
            .iter()
            .all(|m| m.threshold == first)
            .then_some(first)
    }
}

/// Which model of a set confirms buys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    Named(String),
    /// Mean score of every model in the set.
    Ensemble,
}

impl From<&str> for ModelChoice {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("ensemble") {
            ModelChoice::Ensemble
        } else {
            ModelChoice::Named(s.to_string())
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelChoice::Named(name) => f.write_str(name),
            ModelChoice::Ensemble => f.write_str("Ensemble"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub set: String,
    pub model: ModelChoice,
}

impl ModelSelection {
    pub fn new(set: impl Into<String>, model: &str) -> Self {
        Self {
            set: set.into(),
            model: ModelChoice::from(model),
        }
    }
}
