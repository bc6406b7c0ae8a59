//! Cost-uncertainty distributions.
//!
//! Catalog rows declare a distribution per cost term by name
//! ("Lognormal", "Uniform", "Truncated Normal"). Anything else, or an
//! empty cell, means the nominal value is used in every sample.

use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal};

/// z-score of the 95th percentile; low/high bounds are read as a 90% interval.
const Z_95: f64 = 1.645;

/// Truncated-normal rejection attempts before falling back to clamping.
const MAX_REJECTIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    Lognormal,
    Uniform,
    TruncatedNormal,
}

impl DistributionKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Lognormal"        => Some(Self::Lognormal),
            "Uniform"          => Some(Self::Uniform),
            "Truncated Normal" => Some(Self::TruncatedNormal),
            _ => None,
        }
    }
}

/// A fully parameterised distribution over one cost term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostDistribution {
    /// Always the nominal value.
    Fixed(f64),
    /// Median at `nominal`, spread from the [low, high] interval.
    Lognormal { low: f64, high: f64, nominal: f64 },
    Uniform { low: f64, high: f64 },
    TruncatedNormal { mean: f64, std: f64, min: f64, max: f64 },
}

impl CostDistribution {
    /// Build the distribution for a Fixed/Unit cost term.
    ///
    /// Missing bounds or an undeclared kind collapse to `Fixed(nominal)`.
    pub fn for_cost(
        kind: Option<DistributionKind>,
        nominal: f64,
        low: Option<f64>,
        high: Option<f64>,
    ) -> Self {
        match (kind, low, high) {
            (Some(DistributionKind::Lognormal), Some(low), Some(high)) => {
                Self::Lognormal { low, high, nominal }
            }
            (Some(DistributionKind::Uniform), Some(low), Some(high)) => Self::Uniform { low, high },
            _ => Self::Fixed(nominal),
        }
    }

    /// Build the distribution for an exponent term.
    pub fn for_exponent(
        kind: Option<DistributionKind>,
        mean: f64,
        std: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        match kind {
            Some(DistributionKind::TruncatedNormal) => Self::TruncatedNormal {
                mean,
                std: std.unwrap_or(0.0),
                min: min.unwrap_or(f64::NEG_INFINITY),
                max: max.unwrap_or(f64::INFINITY),
            },
            _ => Self::Fixed(mean),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Fixed(v) => v,
            Self::Lognormal { low, high, nominal } => sample_lognormal(rng, low, high, nominal),
            Self::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    return low;
                }
                Uniform::new_inclusive(low, high).sample(rng)
            }
            Self::TruncatedNormal { mean, std, min, max } => {
                sample_truncated_normal(rng, mean, std, min, max)
            }
        }
    }
}

fn sample_lognormal<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64, nominal: f64) -> f64 {
    if nominal <= 0.0 || low <= 0.0 || high <= low {
        return nominal;
    }
    let sigma = (high / low).ln() / (2.0 * Z_95);
    match LogNormal::new(nominal.ln(), sigma) {
        Ok(dist) => dist.sample(rng),
        Err(_) => nominal,
    }
}

fn sample_truncated_normal<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    std: f64,
    min: f64,
    max: f64,
) -> f64 {
    if std <= 0.0 || min >= max {
        return mean.clamp(min.min(max), max.max(min));
    }
    let normal = match Normal::new(mean, std) {
        Ok(n) => n,
        Err(_) => return mean,
    };
    for _ in 0..MAX_REJECTIONS {
        let x = normal.sample(rng);
        if (min..=max).contains(&x) {
            return x;
        }
    }
    normal.sample(rng).clamp(min, max)
}
