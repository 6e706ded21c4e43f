//! Operating status classification.
//!
//! The status is derived from a level, never stored. The default bands are:
//!
//! | Status     | Level          |
//! |------------|----------------|
//! | `Normal`   | `>= 35`        |
//! | `Alert`    | `20 ..= 34`    |
//! | `Critical` | `< 20`         |

use core::fmt;

use crate::Level;

/// Operating status of the reservoir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Status {
    Normal,
    Alert,
    Critical,
}

impl Status {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Normal => "OK",
            Status::Alert => "ALERT",
            Status::Critical => "CRIT",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Lower bounds of the `Normal` and `Alert` bands.
///
/// Both bounds are inclusive. Anything below `alert_min` is `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Thresholds {
    /// Lowest level still considered normal.
    pub normal_min: u8,
    /// Lowest level still considered an alert rather than critical.
    pub alert_min: u8,
}

impl Thresholds {
    /// Default lower bound for `Normal`.
    pub const DEFAULT_NORMAL_MIN: u8 = 35;

    /// Default lower bound for `Alert`.
    pub const DEFAULT_ALERT_MIN: u8 = 20;

    /// Create thresholds, rejecting overlapping or out of range bands.
    pub fn new(normal_min: u8, alert_min: u8) -> Result<Self, InvalidThresholds> {
        let thresholds = Self {
            normal_min,
            alert_min,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check that `alert_min < normal_min <= 100`.
    pub fn validate(&self) -> Result<(), InvalidThresholds> {
        if self.normal_min > 100 || self.alert_min >= self.normal_min {
            return Err(InvalidThresholds {
                normal_min: self.normal_min,
                alert_min: self.alert_min,
            });
        }
        Ok(())
    }

    /// Classify a level against these thresholds.
    pub fn classify(&self, level: Level) -> Status {
        let percent = level.percent();
        if percent >= self.normal_min {
            Status::Normal
        } else if percent >= self.alert_min {
            Status::Alert
        } else {
            Status::Critical
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            normal_min: Self::DEFAULT_NORMAL_MIN,
            alert_min: Self::DEFAULT_ALERT_MIN,
        }
    }
}

/// Classify a level using the default thresholds (35 / 20).
pub fn classify(level: Level) -> Status {
    Thresholds::default().classify(level)
}

/// Returned by [`Thresholds::new`] when the bands do not make sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidThresholds {
    pub normal_min: u8,
    pub alert_min: u8,
}

impl fmt::Display for InvalidThresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid thresholds: need alert_min ({}) < normal_min ({}) <= 100",
            self.alert_min, self.normal_min
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidThresholds {}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(percent: u8) -> Level {
        Level::new(percent).unwrap()
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(level(35)), Status::Normal);
        assert_eq!(classify(level(34)), Status::Alert);
        assert_eq!(classify(level(20)), Status::Alert);
        assert_eq!(classify(level(19)), Status::Critical);
        assert_eq!(classify(level(0)), Status::Critical);
        assert_eq!(classify(level(100)), Status::Normal);
    }

    #[test]
    fn classify_is_pure() {
        for percent in 0..=100 {
            let first = classify(level(percent));
            let second = classify(level(percent));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn custom_thresholds_shift_bands() {
        let thresholds = Thresholds::new(60, 40).unwrap();
        assert_eq!(thresholds.classify(level(60)), Status::Normal);
        assert_eq!(thresholds.classify(level(59)), Status::Alert);
        assert_eq!(thresholds.classify(level(40)), Status::Alert);
        assert_eq!(thresholds.classify(level(39)), Status::Critical);
    }

    #[test]
    fn rejects_inverted_or_out_of_range() {
        assert!(Thresholds::new(20, 35).is_err());
        assert!(Thresholds::new(30, 30).is_err());
        assert!(Thresholds::new(101, 20).is_err());
        assert!(Thresholds::new(100, 0).is_ok());
    }

    #[test]
    fn status_orders_by_severity() {
        assert!(Status::Critical > Status::Alert);
        assert!(Status::Alert > Status::Normal);
        assert_eq!(Status::Alert.to_string(), "ALERT");
    }
}
