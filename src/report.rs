//! Strong-binder classification.
//!
//! A pure predicate over the canonical table: a row is a strong binder when
//! its configured metric falls below the threshold. Exactly one metric is
//! consulted per classification; rows missing that metric never match.

use serde::{Deserialize, Serialize};

use crate::core::prediction::{BindingPrediction, ResultTable};

/// Which metric the strong-binder predicate consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMetric {
    /// Predicted affinity in nanomolar; lower binds tighter.
    AffinityNm,
    /// Percentile rank against the engine's background; lower is better.
    PercentileRank,
}

impl ThresholdMetric {
    /// Conventional cutoff for this metric: 100 nM affinity, 0.5% rank.
    #[must_use]
    pub fn default_threshold(self) -> f64 {
        match self {
            Self::AffinityNm => 100.0,
            Self::PercentileRank => 0.5,
        }
    }
}

impl std::fmt::Display for ThresholdMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AffinityNm => write!(f, "affinity < threshold nM"),
            Self::PercentileRank => write!(f, "percentile rank < threshold"),
        }
    }
}

/// Metric plus cutoff value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinderThreshold {
    pub metric: ThresholdMetric,
    pub value: f64,
}

impl BinderThreshold {
    /// Build a threshold, falling back to the metric's conventional cutoff.
    #[must_use]
    pub fn new(metric: ThresholdMetric, value: Option<f64>) -> Self {
        Self {
            metric,
            value: value.unwrap_or_else(|| metric.default_threshold()),
        }
    }

    #[must_use]
    pub fn affinity(value: f64) -> Self {
        Self {
            metric: ThresholdMetric::AffinityNm,
            value,
        }
    }

    #[must_use]
    pub fn rank(value: f64) -> Self {
        Self {
            metric: ThresholdMetric::PercentileRank,
            value,
        }
    }

    /// The strong-binder predicate for one row.
    #[must_use]
    pub fn is_strong(&self, prediction: &BindingPrediction) -> bool {
        let metric_value = match self.metric {
            ThresholdMetric::AffinityNm => prediction.affinity_nm,
            ThresholdMetric::PercentileRank => prediction.percentile_rank,
        };
        metric_value.is_some_and(|v| v < self.value)
    }
}

/// Rows of `table` meeting the strong-binder predicate, in table order.
#[must_use]
pub fn strong_binders<'a>(
    table: &'a ResultTable,
    threshold: &BinderThreshold,
) -> Vec<&'a BindingPrediction> {
    table.iter().filter(|p| threshold.is_strong(p)).collect()
}
