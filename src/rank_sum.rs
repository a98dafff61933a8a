//! Mann–Whitney U (Wilcoxon rank-sum) two-sample test.
//!
//! Normal approximation with mid-rank ties, tie-corrected variance, and a
//! 0.5 continuity correction toward the null:
//!
//! - greater:   z = (U1 − μ − 0.5) / σ,            p = 1 − Φ(z)
//! - less:      z = (U1 − μ + 0.5) / σ,            p = Φ(z)
//! - two-sided: z = (max(U1, U2) − μ − 0.5) / σ,   p = min(1, 2·(1 − Φ(z)))
//!
//! With these conventions `greater(a, b)` and `less(b, a)` give the same
//! p-value, and the two-sided p-value is twice the smaller one-sided one.

use std::f64::consts::SQRT_2;
use std::fmt;

use serde::Serialize;
use statrs::function::erf::erfc;

/// Alternative hypothesis about sample A relative to sample B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    TwoSided,
    /// A is stochastically larger than B.
    Greater,
    /// A is stochastically smaller than B.
    Less,
}

impl Alternative {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alternative::TwoSided => "two-sided",
            Alternative::Greater => "greater",
            Alternative::Less => "less",
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSide {
    A,
    B,
}

impl fmt::Display for SampleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleSide::A => f.write_str("A"),
            SampleSide::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankSumError {
    #[error("sample {which} is empty")]
    EmptySample { which: SampleSide },
    #[error("sample {which} contains a non-finite value: {value}")]
    NonFiniteValue { which: SampleSide, value: f64 },
    #[error("pooled sample has zero rank variance (all {n} values tied)")]
    ZeroVariance { n: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankSumResult {
    pub alternative: Alternative,
    pub n1: usize,
    pub n2: usize,
    /// Rank sum of sample A in the pooled ranking.
    pub rank_sum_a: f64,
    /// U statistic for sample A (reported statistic).
    pub u1: f64,
    pub u2: f64,
    pub mean_u: f64,
    /// Tie-corrected variance of U.
    pub var_u: f64,
    /// Σ(t³ − t) over tie groups.
    pub tie_term: f64,
    /// Continuity-corrected z. Two-sided tests take it from max(U1, U2),
    /// so it is unsigned there; `effect_size` carries the direction.
    pub z: f64,
    pub p_value: f64,
    /// Rank-biserial correlation, 2·U1/(n1·n2) − 1.
    pub effect_size: f64,
}

impl RankSumResult {
    /// Variance the test would have without any ties.
    pub fn untied_variance(&self) -> f64 {
        let n1 = self.n1 as f64;
        let n2 = self.n2 as f64;
        n1 * n2 * (n1 + n2 + 1.0) / 12.0
    }
}

/// Upper normal tail 1 − Φ(z). Goes through erfc so p-values far below
/// f64 epsilon stay non-zero.
pub(crate) fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// Mid-ranks (1-based) for `values` sorted ascending, plus Σ(t³ − t).
fn midranks_sorted(values: &[f64]) -> (Vec<f64>, f64) {
    let n = values.len();
    let mut ranks = vec![0.0; n];
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[j] == values[i] {
            j += 1;
        }
        // Positions i..j (0-based) share ranks i+1..=j.
        let rank = (i + 1 + j) as f64 / 2.0;
        for r in &mut ranks[i..j] {
            *r = rank;
        }
        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }
    (ranks, tie_term)
}

fn check_sample(sample: &[f64], which: SampleSide) -> Result<(), RankSumError> {
    if sample.is_empty() {
        return Err(RankSumError::EmptySample { which });
    }
    if let Some(&value) = sample.iter().find(|v| !v.is_finite()) {
        return Err(RankSumError::NonFiniteValue { which, value });
    }
    Ok(())
}

/// Two-sample rank-sum test of `sample_a` against `sample_b`.
///
/// Inputs are not required to be sorted; the result depends only on the
/// multisets of values.
pub fn mann_whitney_u(
    sample_a: &[f64],
    sample_b: &[f64],
    alternative: Alternative,
) -> Result<RankSumResult, RankSumError> {
    check_sample(sample_a, SampleSide::A)?;
    check_sample(sample_b, SampleSide::B)?;

    let n1 = sample_a.len();
    let n2 = sample_b.len();
    let n = n1 + n2;

    let mut pooled: Vec<(f64, bool)> = Vec::with_capacity(n);
    pooled.extend(sample_a.iter().map(|&v| (v, true)));
    pooled.extend(sample_b.iter().map(|&v| (v, false)));
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let values: Vec<f64> = pooled.iter().map(|(v, _)| *v).collect();
    let (ranks, tie_term) = midranks_sorted(&values);

    let rank_sum_a: f64 = ranks
        .iter()
        .zip(&pooled)
        .filter(|(_, (_, from_a))| *from_a)
        .map(|(rank, _)| *rank)
        .sum();

    let n1f = n1 as f64;
    let n2f = n2 as f64;
    let nf = n as f64;
    let product = n1f * n2f;

    let u1 = rank_sum_a - n1f * (n1f + 1.0) / 2.0;
    let u2 = product - u1;
    let mean_u = product / 2.0;

    // n >= 2 here, so the tie denominator is non-zero.
    let var_u = product / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)));
    if var_u.is_nan() || var_u <= 0.0 {
        return Err(RankSumError::ZeroVariance { n });
    }
    let sd = var_u.sqrt();

    let (z, p_value) = match alternative {
        Alternative::Greater => {
            let z = (u1 - mean_u - 0.5) / sd;
            (z, normal_sf(z))
        }
        Alternative::Less => {
            let z = (u1 - mean_u + 0.5) / sd;
            (z, normal_sf(-z))
        }
        Alternative::TwoSided => {
            let z = (u1.max(u2) - mean_u - 0.5) / sd;
            (z, (2.0 * normal_sf(z)).min(1.0))
        }
    };

    Ok(RankSumResult {
        alternative,
        n1,
        n2,
        rank_sum_a,
        u1,
        u2,
        mean_u,
        var_u,
        tie_term,
        z,
        p_value: p_value.clamp(0.0, 1.0),
        effect_size: 2.0 * u1 / product - 1.0,
    })
}
