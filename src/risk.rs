//! Breaking-change risk scoring
//!
//! Likelihood is a step function of the total impact count (direct + cascade):
//! - 0 impacts: none
//! - up to `low_max`: low
//! - up to `medium_max`: medium
//! - above that: high
//!
//! The impact score is a weighted sum that favors forms and views (things
//! users touch) over passive formula references.

use serde::{Deserialize, Serialize};

/// Breaking-change likelihood
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Nothing references the target
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Classify a total impact count under a policy
    pub fn from_count(count: usize, policy: &RiskPolicy) -> Self {
        if count == 0 {
            Self::None
        } else if count <= policy.low_max {
            Self::Low
        } else if count <= policy.medium_max {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-bucket weights for the impact score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactWeights {
    pub forms: f64,
    pub views: f64,
    pub connections: f64,
    pub formulas: f64,
    pub cascade_fields: f64,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            forms: 3.0,
            views: 2.0,
            connections: 2.0,
            formulas: 1.0,
            cascade_fields: 0.5,
        }
    }
}

/// Thresholds and weights for impact risk, loadable from the `[risk]`
/// section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    /// Highest impact count still rated low
    pub low_max: usize,
    /// Highest impact count still rated medium
    pub medium_max: usize,
    pub weights: ImpactWeights,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            low_max: 3,
            medium_max: 10,
            weights: ImpactWeights::default(),
        }
    }
}

/// Impact counts per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpactCounts {
    pub connections: usize,
    pub views: usize,
    pub forms: usize,
    pub formulas: usize,
    pub cascade_fields: usize,
}

impl ImpactCounts {
    pub fn direct(&self) -> usize {
        self.connections + self.views + self.forms + self.formulas
    }

    pub fn total(&self) -> usize {
        self.direct() + self.cascade_fields
    }
}

impl RiskPolicy {
    /// Thresholds must be ordered; swap them if a config got them backwards
    pub fn normalized(mut self) -> Self {
        if self.medium_max < self.low_max {
            std::mem::swap(&mut self.low_max, &mut self.medium_max);
        }
        self
    }

    pub fn likelihood(&self, counts: &ImpactCounts) -> RiskLevel {
        RiskLevel::from_count(counts.total(), self)
    }

    /// Weighted impact score, rounded to one decimal
    pub fn score(&self, counts: &ImpactCounts) -> f64 {
        let w = &self.weights;
        let raw = counts.forms as f64 * w.forms
            + counts.views as f64 * w.views
            + counts.connections as f64 * w.connections
            + counts.formulas as f64 * w.formulas
            + counts.cascade_fields as f64 * w.cascade_fields;
        (raw * 10.0).round() / 10.0
    }
}
