//! Spacing laws mapping uniform rib fractions to positions along a run.

use serde::{Deserialize, Serialize};

/// The spacing law applied to a normalized position in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    /// Identity mapping.
    #[default]
    Linear,
    /// `x^2`.
    Parabolic,
    /// `x^3`.
    Cubic,
    /// `(cos(pi * x) + 1) / 2`.
    Sinusoidal,
    /// `acos(2x - 1) / pi`, the inverse of the sinusoidal law.
    Asinusoidal,
    /// `sqrt(1 - x^2)`.
    Elliptic,
}

/// A spacing law plus an optional direction reversal.
///
/// Stateless; `apply` has no failure modes. Inputs outside `[0, 1]` are
/// fed through the same formulas, which for the inverse-trigonometric and
/// elliptic laws produces NaN rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    /// The base mapping.
    pub kind: DistributionKind,
    /// Mirror the result: `1 - y` after the base mapping.
    pub reverse: bool,
}

impl Distribution {
    /// Create a distribution with the given law and no reversal.
    pub fn new(kind: DistributionKind) -> Self {
        Self {
            kind,
            reverse: false,
        }
    }

    /// Map a normalized position through the law.
    pub fn apply(&self, x: f64) -> f64 {
        use std::f64::consts::PI;
        let y = match self.kind {
            DistributionKind::Linear => x,
            DistributionKind::Parabolic => x * x,
            DistributionKind::Cubic => x * x * x,
            DistributionKind::Sinusoidal => ((x * PI).cos() + 1.0) / 2.0,
            DistributionKind::Asinusoidal => (2.0 * x - 1.0).acos() / PI,
            DistributionKind::Elliptic => (1.0 - x * x).sqrt(),
        };
        if self.reverse {
            1.0 - y
        } else {
            y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_identity() {
        let d = Distribution::new(DistributionKind::Linear);
        assert_relative_eq!(d.apply(0.0), 0.0);
        assert_relative_eq!(d.apply(0.25), 0.25);
        assert_relative_eq!(d.apply(1.0), 1.0);
    }

    #[test]
    fn test_endpoint_values() {
        for kind in [DistributionKind::Parabolic, DistributionKind::Cubic] {
            let d = Distribution::new(kind);
            assert_relative_eq!(d.apply(0.0), 0.0, epsilon = 1e-12);
            assert_relative_eq!(d.apply(1.0), 1.0, epsilon = 1e-12);
        }
        // The trigonometric pair runs 1 -> 0 over the unit interval
        for kind in [DistributionKind::Sinusoidal, DistributionKind::Asinusoidal] {
            let d = Distribution::new(kind);
            assert_relative_eq!(d.apply(0.0), 1.0, epsilon = 1e-12);
            assert_relative_eq!(d.apply(1.0), 0.0, epsilon = 1e-12);
            assert_relative_eq!(d.apply(0.5), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_asinusoidal_inverts_sinusoidal() {
        let s = Distribution::new(DistributionKind::Sinusoidal);
        let a = Distribution::new(DistributionKind::Asinusoidal);
        for i in 0..=10 {
            let x = i as f64 / 10.0;
            assert_relative_eq!(a.apply(s.apply(x)), x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_elliptic_is_descending() {
        let d = Distribution::new(DistributionKind::Elliptic);
        assert_relative_eq!(d.apply(0.0), 1.0);
        assert_relative_eq!(d.apply(0.5), (0.75_f64).sqrt());
        assert_relative_eq!(d.apply(1.0), 0.0);
    }

    #[test]
    fn test_reverse_mirrors() {
        let d = Distribution {
            kind: DistributionKind::Parabolic,
            reverse: true,
        };
        assert_relative_eq!(d.apply(0.0), 1.0);
        assert_relative_eq!(d.apply(0.5), 0.75);
        assert_relative_eq!(d.apply(1.0), 0.0);
    }

    #[test]
    fn test_out_of_range_elliptic_is_nan() {
        let d = Distribution::new(DistributionKind::Elliptic);
        assert!(d.apply(1.5).is_nan());
    }

    #[test]
    fn test_serde_kind_names() {
        let d = Distribution {
            kind: DistributionKind::Asinusoidal,
            reverse: true,
        };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("asinusoidal"));
        let back: Distribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
