//! Line-tracking ("patrol") sensor decoding.
//!
//! The line register packs both reflectance sensors into one byte: bit 0 is
//! the left sensor, bit 1 the right one. A set bit reads as [`Surface::Dark`]
//! and a cleared bit as [`Surface::Bright`].

use serde::{Deserialize, Serialize};

const LEFT_BIT: u8 = 0x01;
const RIGHT_BIT: u8 = 0x02;

/// Which of the two line sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn mask(self) -> u8 {
        match self {
            Side::Left => LEFT_BIT,
            Side::Right => RIGHT_BIT,
        }
    }
}

/// What a single line sensor currently sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Bit cleared.
    Bright,
    /// Bit set.
    Dark,
}

/// One sample of the line register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatrolReading {
    raw: u8,
}

impl PatrolReading {
    pub fn from_raw(raw: u8) -> Self {
        Self { raw }
    }

    /// The two sensor bits, other bits masked off.
    pub fn raw(self) -> u8 {
        self.raw & (LEFT_BIT | RIGHT_BIT)
    }

    pub fn surface(self, side: Side) -> Surface {
        if self.raw & side.mask() == 0 {
            Surface::Bright
        } else {
            Surface::Dark
        }
    }

    pub fn left(self) -> Surface {
        self.surface(Side::Left)
    }

    pub fn right(self) -> Surface {
        self.surface(Side::Right)
    }

    /// Per-side, per-polarity query.
    ///
    /// A bright query is true when the side's bit is 0, a dark query when it
    /// is 1.
    pub fn is(self, side: Side, surface: Surface) -> bool {
        self.surface(side) == surface
    }
}

/// The single edge a line-tracking subscription waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCondition {
    LeftDark,
    LeftBright,
    RightDark,
    RightBright,
}

impl LineCondition {
    pub fn new(side: Side, surface: Surface) -> Self {
        match (side, surface) {
            (Side::Left, Surface::Dark) => LineCondition::LeftDark,
            (Side::Left, Surface::Bright) => LineCondition::LeftBright,
            (Side::Right, Surface::Dark) => LineCondition::RightDark,
            (Side::Right, Surface::Bright) => LineCondition::RightBright,
        }
    }

    pub fn side(self) -> Side {
        match self {
            LineCondition::LeftDark | LineCondition::LeftBright => Side::Left,
            LineCondition::RightDark | LineCondition::RightBright => Side::Right,
        }
    }

    /// Surface the armed sensor has to move onto.
    pub fn surface(self) -> Surface {
        match self {
            LineCondition::LeftDark | LineCondition::RightDark => Surface::Dark,
            LineCondition::LeftBright | LineCondition::RightBright => Surface::Bright,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_layout_truth_table() {
        let cases = [
            (0b00, Surface::Bright, Surface::Bright),
            (0b01, Surface::Dark, Surface::Bright),
            (0b10, Surface::Bright, Surface::Dark),
            (0b11, Surface::Dark, Surface::Dark),
        ];
        for (raw, left, right) in cases {
            let reading = PatrolReading::from_raw(raw);
            assert_eq!(reading.left(), left, "left of {raw:#04b}");
            assert_eq!(reading.right(), right, "right of {raw:#04b}");
        }
    }

    #[test]
    fn polarity_query() {
        let reading = PatrolReading::from_raw(0b01);
        assert!(reading.is(Side::Left, Surface::Dark));
        assert!(!reading.is(Side::Left, Surface::Bright));
        assert!(reading.is(Side::Right, Surface::Bright));
        assert!(!reading.is(Side::Right, Surface::Dark));
    }

    #[test]
    fn upper_bits_are_ignored() {
        let reading = PatrolReading::from_raw(0xFC);
        assert_eq!(reading.raw(), 0);
        assert_eq!(reading.left(), Surface::Bright);
        assert_eq!(reading.right(), Surface::Bright);
    }

    #[test]
    fn condition_round_trips_through_parts() {
        for cond in [
            LineCondition::LeftDark,
            LineCondition::LeftBright,
            LineCondition::RightDark,
            LineCondition::RightBright,
        ] {
            assert_eq!(LineCondition::new(cond.side(), cond.surface()), cond);
        }
    }
}
