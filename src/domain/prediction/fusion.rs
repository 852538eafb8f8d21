//! Prediction fusion: a model score as a confirmation filter on buys.
//!
//! A buy survives only if the selected model scores the bar above its
//! confirmation threshold. Sells are never touched. Without a selection the
//! signals pass through unchanged; with a selection that cannot be resolved
//! they also pass through unchanged, and the outcome records why.

use crate::domain::ohlcv::PriceBar;
use crate::domain::prediction::registry::ArtifactRegistry;
use crate::domain::prediction::ModelSelection;
use crate::domain::signal::SignalSeries;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "status",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Confirmation {
    NotRequested,
    Applied {
        set: String,
        model: String,
        threshold: f64,
        suppressed_buys: usize,
    },
    Unavailable {
        set: String,
        model: String,
        reason: String,
    },
}

impl Confirmation {
    pub fn was_applied(&self) -> bool {
        matches!(self, Confirmation::Applied { .. })
    }
}

#[derive(Debug, Clone)]
pub struct FusionOutcome {
    pub signals: SignalSeries,
    pub confirmation: Confirmation,
}

pub fn fuse(
    mut signals: SignalSeries,
    bars: &[PriceBar],
    registry: &ArtifactRegistry,
    selection: Option<&ModelSelection>,
) -> FusionOutcome {
    let Some(selection) = selection else {
        return FusionOutcome {
            signals,
            confirmation: Confirmation::NotRequested,
        };
    };

    let scorer = match registry.resolve(selection) {
        Ok(scorer) => scorer,
        Err(e) => {
            warn!(
                set = %selection.set,
                model = %selection.model,
                error = %e,
                "predictive model unavailable, buys are not confirmed"
            );
            return FusionOutcome {
                signals,
                confirmation: Confirmation::Unavailable {
                    set: selection.set.clone(),
                    model: selection.model.to_string(),
                    reason: e.to_string(),
                },
            };
        }
    };

    let threshold = scorer.threshold();
    let mut suppressed_buys = 0;

    for (i, point) in signals.points.iter_mut().enumerate() {
        if !point.buy {
            continue;
        }
        let confirmed = scorer.score(bars, i).is_some_and(|s| s > threshold);
        if !confirmed {
            point.buy = false;
            suppressed_buys += 1;
        }
    }

    debug!(
        set = %selection.set,
        model = %selection.model,
        suppressed_buys,
        "prediction fusion applied"
    );

    FusionOutcome {
        signals,
        confirmation: Confirmation::Applied {
            set: selection.set.clone(),
            model: selection.model.to_string(),
            threshold,
            suppressed_buys,
        },
    }
}
