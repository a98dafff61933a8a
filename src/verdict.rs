//! Threshold decisions and the descriptive statistics reported alongside them.

use std::fmt;

use serde::Serialize;

/// Significance threshold used by every comparison unless configured otherwise.
pub const DEFAULT_ALPHA: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Reject,
    FailToReject,
}

impl Decision {
    pub fn is_reject(&self) -> bool {
        matches!(self, Decision::Reject)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Reject => f.write_str("Reject H0"),
            Decision::FailToReject => f.write_str("Fail to reject H0"),
        }
    }
}

/// Reject iff `p_value < alpha`. A p-value equal to alpha is retained.
pub fn decide(p_value: f64, alpha: f64) -> Decision {
    if p_value < alpha {
        Decision::Reject
    } else {
        Decision::FailToReject
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleSummary {
    pub n: usize,
    /// Arithmetic mean; NaN for an empty sample.
    pub mean: f64,
}

impl SampleSummary {
    pub fn from_sample(sample: &[f64]) -> Self {
        let n = sample.len();
        let mean = if n == 0 {
            f64::NAN
        } else {
            sample.iter().sum::<f64>() / n as f64
        };
        Self { n, mean }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub decision: Decision,
    pub alpha: f64,
    pub sample_a: SampleSummary,
    pub sample_b: SampleSummary,
}

impl Verdict {
    pub fn render(p_value: f64, alpha: f64, sample_a: &[f64], sample_b: &[f64]) -> Self {
        Self {
            decision: decide(p_value, alpha),
            alpha,
            sample_a: SampleSummary::from_sample(sample_a),
            sample_b: SampleSummary::from_sample(sample_b),
        }
    }
}
