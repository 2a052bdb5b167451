use serde::{Deserialize, Serialize};

/// Color of a single photosite in a Bayer mosaic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BayerColor {
    Red,
    Green,
    Blue,
}

/// Bayer color filter array layout, named after the top-left 2x2 cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum CfaPattern {
    RGGB,
    GRBG,
    GBRG,
    BGGR,
}

impl CfaPattern {
    /// Returns `(row_parity, col_parity)` of the red photosite within the 2x2 cell.
    fn red_position(self) -> (usize, usize) {
        match self {
            Self::RGGB => (0, 0),
            Self::GRBG => (0, 1),
            Self::GBRG => (1, 0),
            Self::BGGR => (1, 1),
        }
    }

    /// Filter color at column `x`, row `y`.
    #[inline]
    pub fn color_at(self, x: usize, y: usize) -> BayerColor {
        let (r_row, r_col) = self.red_position();
        match ((y % 2) == r_row, (x % 2) == r_col) {
            (true, true) => BayerColor::Red,
            (false, false) => BayerColor::Blue,
            _ => BayerColor::Green,
        }
    }
}

impl std::str::FromStr for CfaPattern {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RGGB" => Ok(Self::RGGB),
            "GRBG" => Ok(Self::GRBG),
            "GBRG" => Ok(Self::GBRG),
            "BGGR" => Ok(Self::BGGR),
            other => Err(format!("unknown CFA pattern '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rggb_cell() {
        let p = CfaPattern::RGGB;
        assert_eq!(p.color_at(0, 0), BayerColor::Red);
        assert_eq!(p.color_at(1, 0), BayerColor::Green);
        assert_eq!(p.color_at(0, 1), BayerColor::Green);
        assert_eq!(p.color_at(1, 1), BayerColor::Blue);
        assert_eq!(p.color_at(2, 2), BayerColor::Red);
    }

    #[test]
    fn bggr_is_rggb_shifted() {
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(
                    CfaPattern::BGGR.color_at(x, y),
                    CfaPattern::RGGB.color_at(x + 1, y + 1)
                );
            }
        }
    }

    #[test]
    fn parses_case_insensitive() {
        assert_eq!("grbg".parse::<CfaPattern>().unwrap(), CfaPattern::GRBG);
        assert!("xyz".parse::<CfaPattern>().is_err());
    }
}
