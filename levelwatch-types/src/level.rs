//! Water level as a validated percentage.

use core::fmt;

/// Fill level of the reservoir as an integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Level(u8);

impl Level {
    /// Empty reservoir.
    pub const EMPTY: Level = Level(0);

    /// Full reservoir.
    pub const FULL: Level = Level(100);

    /// Create a level, rejecting values above 100.
    pub const fn new(percent: u8) -> Result<Self, LevelOutOfRange> {
        if percent > 100 {
            Err(LevelOutOfRange(percent))
        } else {
            Ok(Self(percent))
        }
    }

    /// The level as a percentage.
    pub const fn percent(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Level {
    type Error = LevelOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Returned when a raw value does not fit in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelOutOfRange(pub u8);

impl fmt::Display for LevelOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} is outside 0..=100", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LevelOutOfRange {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Level::new(0), Ok(Level::EMPTY));
        assert_eq!(Level::new(100), Ok(Level::FULL));
    }

    #[test]
    fn rejects_above_hundred() {
        assert_eq!(Level::new(101), Err(LevelOutOfRange(101)));
        assert_eq!(Level::try_from(255u8), Err(LevelOutOfRange(255)));
    }

    #[test]
    fn displays_as_percentage() {
        assert_eq!(Level::new(42).unwrap().to_string(), "42%");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_validates_range() {
        let level: Level = serde_json::from_str("64").unwrap();
        assert_eq!(level.percent(), 64);
        assert!(serde_json::from_str::<Level>("150").is_err());
    }
}
