// Compass sector resolution for wind bearings
use serde::Serialize;
use std::f64::consts::{FRAC_PI_4, FRAC_PI_8, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl WindDirection {
    const SECTORS: [WindDirection; 8] = [
        WindDirection::North,
        WindDirection::Northeast,
        WindDirection::East,
        WindDirection::Southeast,
        WindDirection::South,
        WindDirection::Southwest,
        WindDirection::West,
        WindDirection::Northwest,
    ];

    /// Resolves a bearing in radians to its 45-degree sector.
    ///
    /// Any finite angle is accepted and wrapped into `[0, 2π)` first; the
    /// sectors are shifted by half a width so that bearings just below a
    /// full turn still land on North. Non-finite input resolves to North.
    pub fn from_radians(radians: f64) -> Self {
        if !radians.is_finite() {
            return WindDirection::North;
        }
        let wrapped = radians.rem_euclid(TAU);
        let index = ((wrapped + FRAC_PI_8) / FRAC_PI_4).floor() as usize % Self::SECTORS.len();
        Self::SECTORS[index]
    }

    pub fn name(&self) -> &'static str {
        match self {
            WindDirection::North => "North",
            WindDirection::Northeast => "Northeast",
            WindDirection::East => "East",
            WindDirection::Southeast => "Southeast",
            WindDirection::South => "South",
            WindDirection::Southwest => "Southwest",
            WindDirection::West => "West",
            WindDirection::Northwest => "Northwest",
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            WindDirection::North => 0,
            WindDirection::Northeast => 45,
            WindDirection::East => 90,
            WindDirection::Southeast => 135,
            WindDirection::South => 180,
            WindDirection::Southwest => 225,
            WindDirection::West => 270,
            WindDirection::Northwest => 315,
        }
    }

    /// CSS rotation class used by the dashboard arrow icon
    pub fn icon(&self) -> String {
        format!("rotate-{}", self.degrees())
    }
}
