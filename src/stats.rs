use serde::{Deserialize, Serialize};

/// Packet loss as a percentage of attempted probes.
pub fn loss_percent(transmitted: usize, received: usize) -> f64 {
    if transmitted == 0 {
        return 0.0;
    }
    (transmitted.saturating_sub(received) as f64 / transmitted as f64) * 100.0
}

/// Arithmetic mean of the latency samples.
///
/// Undefined for fewer than two samples, matching the jitter requirement.
pub fn mean_latency(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Successive-difference jitter: mean of |sample[i] - sample[i+1]| over
/// consecutive pairs, in issue order. Not a standard deviation.
pub fn jitter(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let sum: f64 = samples.windows(2).map(|pair| (pair[0] - pair[1]).abs()).sum();
    Some(sum / (samples.len() - 1) as f64)
}

/// Qualitative link verdict.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Excellent,
    Normal,
    Poor,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Excellent => "excellent",
            Verdict::Normal => "normal",
            Verdict::Poor => "poor",
        }
    }
}

/// Classify a link from loss percentage and jitter.
///
/// The clauses are evaluated in this exact order; the thresholds are not
/// orthogonal, so zero loss with jitter in [20, 100] falls through to
/// `Normal`.
pub fn verdict(loss_percent: f64, jitter: f64) -> Verdict {
    if loss_percent == 0.0 && jitter < 20.0 {
        Verdict::Excellent
    } else if loss_percent > 0.0 || jitter > 100.0 {
        Verdict::Poor
    } else {
        Verdict::Normal
    }
}
