//! Speed tiers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Breakpoints and speed ratios of the far, medium and near tiers.
///
/// Tiers are symmetric, the same table is used whichever way the mechanism is
/// travelling. The table is not validated: out of order breakpoints simply
/// produce the tier the comparisons below select.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tiers {
    /// Remaining error (or time) above which the medium ratio is used.
    pub medium_breakpoint: f64,

    /// Remaining error (or time) above which the far ratio is used.
    pub far_breakpoint: f64,

    /// Ratio applied to the requested speed when close to the setpoint.
    pub near_ratio: f64,

    pub medium_ratio: f64,

    pub far_ratio: f64,
}

/// Signs applied to the demand for each direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionSigns {
    /// Sign used when the error is positive (target above current).
    pub positive: f64,

    /// Sign used when the error is negative.
    pub negative: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The tier a remaining error falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Near,
    Medium,
    Far,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Tiers {
    fn default() -> Self {
        Self {
            medium_breakpoint: 0.5,
            far_breakpoint: 1.0,
            near_ratio: 1.0,
            medium_ratio: 1.0,
            far_ratio: 1.0,
        }
    }
}

impl Tiers {
    /// Classify a remaining magnitude.
    pub fn classify(&self, magnitude: f64) -> Tier {
        if magnitude > self.far_breakpoint {
            Tier::Far
        } else if magnitude > self.medium_breakpoint {
            Tier::Medium
        } else {
            Tier::Near
        }
    }

    /// Speed ratio for a remaining magnitude.
    pub fn ratio(&self, magnitude: f64) -> f64 {
        match self.classify(magnitude) {
            Tier::Far => self.far_ratio,
            Tier::Medium => self.medium_ratio,
            Tier::Near => self.near_ratio,
        }
    }
}

impl DirectionSigns {
    pub fn new(positive: f64, negative: f64) -> Self {
        Self { positive, negative }
    }

    /// Sign for a signed error.
    pub fn for_error(&self, error: f64) -> f64 {
        if error < 0.0 {
            self.negative
        } else {
            self.positive
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify() {
        let tiers = Tiers {
            medium_breakpoint: 10.0,
            far_breakpoint: 100.0,
            near_ratio: 0.3,
            medium_ratio: 0.6,
            far_ratio: 1.0,
        };

        assert_eq!(tiers.classify(1000.0), Tier::Far);
        assert_eq!(tiers.classify(100.0), Tier::Medium);
        assert_eq!(tiers.classify(50.0), Tier::Medium);
        assert_eq!(tiers.classify(10.0), Tier::Near);
        assert_eq!(tiers.ratio(0.0), 0.3);
    }

    #[test]
    fn test_out_of_order_breakpoints_are_permissive() {
        // Far below medium: anything above far is far, medium is unreachable
        let tiers = Tiers {
            medium_breakpoint: 100.0,
            far_breakpoint: 10.0,
            near_ratio: 0.3,
            medium_ratio: 0.6,
            far_ratio: 1.0,
        };

        assert_eq!(tiers.classify(50.0), Tier::Far);
        assert_eq!(tiers.classify(5.0), Tier::Near);
    }
}
