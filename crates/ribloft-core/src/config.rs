//! Configuration record for rib generation.

use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;

/// Settings shared by all rib generation modes.
///
/// A plain record with explicit defaults; modes ignore the fields they do
/// not use. `item_count` counts the generated ribs (interior ribs in
/// segment mode); an `explicit_fractions` list overrides both the count
/// and the distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RibConfig {
    /// Number of ribs to generate (interior ribs in segment mode).
    pub item_count: usize,
    /// Explicit normalized positions. When non-empty this list is used
    /// verbatim and redefines the rib count.
    pub explicit_fractions: Vec<f64>,
    /// Offset from the start of the sweep region, in model units.
    pub offset_start: f64,
    /// Offset from the end of the sweep region, in model units.
    pub offset_end: f64,
    /// Spacing law mapping uniform fractions to positions.
    pub distribution: Distribution,
    /// Total twist in degrees across the run.
    pub twist_angle: f64,
    /// Explicit per-rib twist angles, overriding the continuous twist.
    pub explicit_twists: Vec<f64>,
    /// Extra twist in degrees applied when compensating edge order.
    pub twist_compensation_angle: f64,
    /// Walk reordered edges backwards.
    pub twist_reverse: bool,
    /// Loft the ribs into a surface.
    pub want_surface: bool,
    /// Seal the lofted surface into a solid.
    pub want_solid: bool,
    /// Maximum skinning degree across ribs.
    pub loft_max_degree: usize,
    /// Maximum ribs per lofted segment; 0 disables segmentation.
    pub loft_max_segment_size: usize,
    /// Sample count per edge range when interpolation falls back to
    /// discretization. Clamped to a minimum of 2.
    pub interpolation_point_count: usize,
    /// Skip the congruence test and always interpolate through samples.
    pub force_discretized_interpolation: bool,
    /// Per-axis scaling switches for path mode.
    pub scale_x: bool,
    /// See `scale_x`.
    pub scale_y: bool,
    /// See `scale_x`.
    pub scale_z: bool,
}

impl Default for RibConfig {
    fn default() -> Self {
        Self {
            item_count: 2,
            explicit_fractions: Vec::new(),
            offset_start: 0.0,
            offset_end: 0.0,
            distribution: Distribution::default(),
            twist_angle: 0.0,
            explicit_twists: Vec::new(),
            twist_compensation_angle: 0.0,
            twist_reverse: false,
            want_surface: false,
            want_solid: false,
            loft_max_degree: 5,
            loft_max_segment_size: 16,
            interpolation_point_count: 16,
            force_discretized_interpolation: false,
            scale_x: true,
            scale_y: true,
            scale_z: true,
        }
    }
}

impl RibConfig {
    /// Effective interpolation sample count, never below 2.
    pub fn interpolation_points(&self) -> usize {
        self.interpolation_point_count.max(2)
    }

    /// Which axes path mode may scale along.
    pub fn scale_switches(&self) -> [bool; 3] {
        [self.scale_x, self.scale_y, self.scale_z]
    }

    /// True when no axis scaling is requested at all.
    pub fn scaling_disabled(&self) -> bool {
        !(self.scale_x || self.scale_y || self.scale_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = RibConfig::default();
        assert_eq!(c.loft_max_degree, 5);
        assert_eq!(c.loft_max_segment_size, 16);
        assert_eq!(c.interpolation_points(), 16);
        assert!(!c.want_solid);
    }

    #[test]
    fn test_interpolation_floor() {
        let c = RibConfig {
            interpolation_point_count: 0,
            ..RibConfig::default()
        };
        assert_eq!(c.interpolation_points(), 2);
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = RibConfig {
            item_count: 7,
            twist_angle: 90.0,
            ..RibConfig::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: RibConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.item_count, 7);
        assert_eq!(back.twist_angle, 90.0);
    }
}
