use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Goals,
    Shots,
    ShotsOnTarget,
    Corners,
}

impl Statistic {
    pub const ALL: [Statistic; 4] = [
        Statistic::Goals,
        Statistic::Shots,
        Statistic::ShotsOnTarget,
        Statistic::Corners,
    ];

    /// Stable key used in column names and config files.
    pub fn key(self) -> &'static str {
        match self {
            Statistic::Goals => "goals",
            Statistic::Shots => "shots",
            Statistic::ShotsOnTarget => "shots_on_target",
            Statistic::Corners => "corners",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Goals => "Goals",
            Statistic::Shots => "Shots",
            Statistic::ShotsOnTarget => "Shots on Target",
            Statistic::Corners => "Corners",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let norm = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "goals" | "goals_ft" => Ok(Statistic::Goals),
            "shots" => Ok(Statistic::Shots),
            "shots_on_target" | "shotsontarget" | "sot" => Ok(Statistic::ShotsOnTarget),
            "corners" | "corners_ft" => Ok(Statistic::Corners),
            _ => Err(format!("unknown statistic '{raw}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatLine {
    pub goals: f64,
    pub shots: f64,
    pub shots_on_target: f64,
    pub corners: f64,
}

impl StatLine {
    pub fn get(&self, stat: Statistic) -> f64 {
        match stat {
            Statistic::Goals => self.goals,
            Statistic::Shots => self.shots,
            Statistic::ShotsOnTarget => self.shots_on_target,
            Statistic::Corners => self.corners,
        }
    }

    pub fn set(&mut self, stat: Statistic, value: f64) {
        match stat {
            Statistic::Goals => self.goals = value,
            Statistic::Shots => self.shots = value,
            Statistic::ShotsOnTarget => self.shots_on_target = value,
            Statistic::Corners => self.corners = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_original_sheet_names() {
        assert_eq!("Goals_FT".parse::<Statistic>(), Ok(Statistic::Goals));
        assert_eq!("ShotsOnTarget".parse::<Statistic>(), Ok(Statistic::ShotsOnTarget));
        assert_eq!("shots on target".parse::<Statistic>(), Ok(Statistic::ShotsOnTarget));
        assert_eq!("Corners_FT".parse::<Statistic>(), Ok(Statistic::Corners));
        assert!("cards".parse::<Statistic>().is_err());
    }

    #[test]
    fn stat_line_get_set() {
        let mut line = StatLine::default();
        for (idx, stat) in Statistic::ALL.iter().enumerate() {
            line.set(*stat, idx as f64);
        }
        assert_eq!(line.get(Statistic::Corners), 3.0);
        assert_eq!(line.get(Statistic::Goals), 0.0);
    }
}
