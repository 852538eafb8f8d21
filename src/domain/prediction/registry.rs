//! Immutable registry of predictive model sets.
//!
//! The registry is built once when the process starts and then only read.
//! A set that fails to load stays in the registry as unavailable, with the
//! reason, so a run that asks for it can degrade instead of failing.
//!
//! INI layout read by [`ArtifactRegistry::load`]:
//!
//! ```ini
//! [registry]
//! sets = SetA,SetB
//!
//! [SetA]
//! models = RandomForest,GradientBoosting
//!
//! [SetA.RandomForest]
//! kind = logistic
//! features = Open,High,Low,Close,Volume
//! weights = 0.1,0.2,-0.1,0.05,0.0
//! bias = -0.3
//! threshold = 0.5
//! ```

use crate::domain::error::AlgoError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::prediction::features::FeatureSpec;
use crate::domain::prediction::{
    LinearModel, LogisticModel, ModelArtifact, ModelChoice, ModelSelection, ModelSet,
};
use crate::ports::config_port::ConfigPort;
use std::collections::BTreeMap;
use tracing::{error, info};

#[derive(Debug)]
pub enum SetEntry {
    Loaded(ModelSet),
    Unavailable(String),
}

#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    sets: BTreeMap<String, SetEntry>,
}

/// A resolved model selection, ready to score bars.
#[derive(Debug, Clone, Copy)]
pub enum Scorer<'a> {
    Single(&'a ModelArtifact),
    Ensemble { set: &'a ModelSet, threshold: f64 },
}

impl Scorer<'_> {
    pub fn threshold(&self) -> f64 {
        match self {
            Scorer::Single(model) => model.threshold(),
            Scorer::Ensemble { threshold, .. } => *threshold,
        }
    }

    /// Single-model score, or the mean score of the set. `None` if any
    /// member cannot score the bar.
    pub fn score(&self, bars: &[PriceBar], index: usize) -> Option<f64> {
        match self {
            Scorer::Single(model) => model.score(bars, index),
            Scorer::Ensemble { set, .. } => {
                let scores: Option<Vec<f64>> =
                    set.models().iter().map(|m| m.score(bars, index)).collect();
                let scores = scores?;
                Some(scores.iter().sum::<f64>() / scores.len() as f64)
            }
        }
    }
}

impl ArtifactRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_set(mut self, name: impl Into<String>, set: ModelSet) -> Self {
        self.sets.insert(name.into(), SetEntry::Loaded(set));
        self
    }

    pub fn with_unavailable(mut self, name: impl Into<String>, reason: impl Into<String>) -> Self {
        self.sets
            .insert(name.into(), SetEntry::Unavailable(reason.into()));
        self
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &SetEntry)> {
        self.sets.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn is_available(&self, set: &str) -> bool {
        matches!(self.sets.get(set), Some(SetEntry::Loaded(_)))
    }

    pub fn resolve(&self, selection: &ModelSelection) -> Result<Scorer<'_>, AlgoError> {
        let unavailable = |reason: String| AlgoError::ArtifactUnavailable {
            set: selection.set.clone(),
            reason,
        };

        let set = match self.sets.get(&selection.set) {
            Some(SetEntry::Loaded(set)) => set,
            Some(SetEntry::Unavailable(reason)) => return Err(unavailable(reason.clone())),
            None => return Err(unavailable("not registered".into())),
        };

        match &selection.model {
            ModelChoice::Named(name) => set
                .get(name)
                .map(Scorer::Single)
                .ok_or_else(|| unavailable(format!("model {} is not in the set", name))),
            ModelChoice::Ensemble => match set.ensemble_threshold() {
                Some(threshold) => Ok(Scorer::Ensemble { set, threshold }),
                None if set.is_empty() => Err(unavailable("set has no models".into())),
                None => Err(unavailable(
                    "ensemble members disagree on confirmation threshold".into(),
                )),
            },
        }
    }

    /// Load every set listed under `[registry] sets`. Never fails: a set that
    /// cannot be built is kept as unavailable.
    pub fn load(config: &dyn ConfigPort) -> Self {
        let mut registry = Self::empty();
        let names = config.get_string("registry", "sets").unwrap_or_default();

        for name in split_list(&names) {
            match load_set(config, &name) {
                Ok(set) => {
                    info!(set = %name, models = set.models().len(), "model set loaded");
                    registry = registry.with_set(name, set);
                }
                Err(e) => {
                    error!(set = %name, error = %e, "model set unavailable");
                    registry = registry.with_unavailable(name, e.to_string());
                }
            }
        }

        registry
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_floats(section: &str, key: &str, value: &str) -> Result<Vec<f64>, AlgoError> {
    split_list(value)
        .iter()
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| AlgoError::invalid(section, key, format!("not a number: {}", v)))
        })
        .collect()
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, AlgoError> {
    config
        .get_string(section, key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AlgoError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn load_set(config: &dyn ConfigPort, name: &str) -> Result<ModelSet, AlgoError> {
    let models = split_list(&required(config, name, "models")?);
    let mut set = ModelSet::new();
    for model in models {
        set = set.with_model(load_model(config, name, &model)?);
    }
    Ok(set)
}

fn load_model(config: &dyn ConfigPort, set: &str, model: &str) -> Result<ModelArtifact, AlgoError> {
    let section = format!("{}.{}", set, model);

    let features = FeatureSpec::parse(&required(config, &section, "features")?)
        .map_err(|e| AlgoError::invalid(&section, "features", e.to_string()))?;
    let weights = parse_floats(&section, "weights", &required(config, &section, "weights")?)?;
    let bias = match config.get_string(&section, "bias") {
        Some(v) => v
            .trim()
            .parse::<f64>()
            .map_err(|_| AlgoError::invalid(&section, "bias", "not a number"))?,
        None => 0.0,
    };

    let kind = required(config, &section, "kind")?;
    let artifact = match kind.trim().to_lowercase().as_str() {
        "logistic" => ModelArtifact::new(model, LogisticModel { weights, bias }, features),
        "linear" => ModelArtifact::new(model, LinearModel { weights, bias }, features),
        other => {
            return Err(AlgoError::invalid(
                &section,
                "kind",
                format!("unknown model kind {} (expected logistic or linear)", other),
            ));
        }
    }
    .map_err(|e| AlgoError::invalid(&section, "weights", e.to_string()))?;

    match config.get_string(&section, "threshold") {
        Some(v) => {
            let threshold = v
                .trim()
                .parse::<f64>()
                .map_err(|_| AlgoError::invalid(&section, "threshold", "not a number"))?;
            Ok(artifact.with_threshold(threshold))
        }
        None => Ok(artifact),
    }
}
