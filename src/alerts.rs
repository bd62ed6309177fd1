use serde::{Deserialize, Serialize};

use crate::pipeline::PredictionRecord;
use crate::stats::Statistic;

pub const NORMAL: &str = "Normal";
pub const LABEL_SEPARATOR: &str = ", ";

/// Strict `>` comparisons on predicted values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertCondition {
    TotalAbove { stat: Statistic, threshold: f64 },
    HomeAbove { stat: Statistic, threshold: f64 },
    AwayAbove { stat: Statistic, threshold: f64 },
}

impl AlertCondition {
    pub fn statistic(&self) -> Statistic {
        match *self {
            AlertCondition::TotalAbove { stat, .. }
            | AlertCondition::HomeAbove { stat, .. }
            | AlertCondition::AwayAbove { stat, .. } => stat,
        }
    }

    pub fn threshold(&self) -> f64 {
        match *self {
            AlertCondition::TotalAbove { threshold, .. }
            | AlertCondition::HomeAbove { threshold, .. }
            | AlertCondition::AwayAbove { threshold, .. } => threshold,
        }
    }

    /// `None` when the statistic was not predicted this run.
    fn holds(&self, record: &PredictionRecord) -> Option<bool> {
        let (home, away) = record.predicted(self.statistic())?;
        let value = match self {
            AlertCondition::TotalAbove { .. } => home + away,
            AlertCondition::HomeAbove { .. } => home,
            AlertCondition::AwayAbove { .. } => away,
        };
        Some(value > self.threshold())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub label: String,
    #[serde(flatten)]
    pub condition: AlertCondition,
}

impl AlertRule {
    pub fn new(label: &str, condition: AlertCondition) -> Self {
        Self {
            label: label.to_string(),
            condition,
        }
    }
}

pub fn default_rules() -> Vec<AlertRule> {
    use AlertCondition::*;
    vec![
        AlertRule::new(
            "Over 1.5 Goals",
            TotalAbove {
                stat: Statistic::Goals,
                threshold: 1.5,
            },
        ),
        AlertRule::new(
            "Over 7.5 Corners",
            TotalAbove {
                stat: Statistic::Corners,
                threshold: 7.5,
            },
        ),
        AlertRule::new(
            "High Home Shots",
            HomeAbove {
                stat: Statistic::Shots,
                threshold: 12.0,
            },
        ),
        AlertRule::new(
            "High Away Shots",
            AwayAbove {
                stat: Statistic::Shots,
                threshold: 12.0,
            },
        ),
        AlertRule::new(
            "High Home Shots on Target",
            HomeAbove {
                stat: Statistic::ShotsOnTarget,
                threshold: 5.0,
            },
        ),
        AlertRule::new(
            "High Away Shots on Target",
            AwayAbove {
                stat: Statistic::ShotsOnTarget,
                threshold: 5.0,
            },
        ),
    ]
}

/// Labels of every matching rule in declaration order, or `"Normal"`.
pub fn evaluate(rules: &[AlertRule], record: &PredictionRecord) -> String {
    let labels: Vec<&str> = rules
        .iter()
        .filter(|rule| rule.condition.holds(record).unwrap_or(false))
        .map(|rule| rule.label.as_str())
        .collect();
    if labels.is_empty() {
        NORMAL.to_string()
    } else {
        labels.join(LABEL_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FixtureFeatureRecord, TeamFeatures};
    use crate::history::Fixture;
    use crate::pipeline::Prediction;

    fn record(preds: &[(Statistic, f64, f64)]) -> PredictionRecord {
        let team = |name: &str| TeamFeatures {
            team: name.into(),
            by_stat: vec![],
        };
        PredictionRecord {
            features: FixtureFeatureRecord {
                fixture: Fixture {
                    home_team: "H".into(),
                    away_team: "A".into(),
                    league: "L".into(),
                    date: "2024-05-01".into(),
                    kickoff_time: "20".into(),
                },
                home: team("H"),
                away: team("A"),
            },
            predictions: preds
                .iter()
                .map(|(stat, home, away)| Prediction {
                    stat: *stat,
                    home: *home,
                    away: *away,
                })
                .collect(),
        }
    }

    fn quiet() -> Vec<(Statistic, f64, f64)> {
        vec![
            (Statistic::Goals, 0.5, 0.5),
            (Statistic::Shots, 8.0, 8.0),
            (Statistic::ShotsOnTarget, 3.0, 3.0),
            (Statistic::Corners, 3.0, 3.0),
        ]
    }

    #[test]
    fn nothing_fires_is_normal() {
        assert_eq!(evaluate(&default_rules(), &record(&quiet())), "Normal");
    }

    #[test]
    fn goals_and_home_shots_join_in_rule_order() {
        let mut preds = quiet();
        preds[0] = (Statistic::Goals, 1.0, 0.8);
        preds[1] = (Statistic::Shots, 12.5, 4.0);
        assert_eq!(
            evaluate(&default_rules(), &record(&preds)),
            "Over 1.5 Goals, High Home Shots"
        );
    }

    #[test]
    fn thresholds_are_exclusive() {
        let preds = vec![
            (Statistic::Goals, 0.75, 0.75),
            (Statistic::Shots, 12.0, 12.0),
            (Statistic::ShotsOnTarget, 5.0, 5.0),
            (Statistic::Corners, 3.5, 4.0),
        ];
        assert_eq!(evaluate(&default_rules(), &record(&preds)), "Normal");
    }

    #[test]
    fn all_rules_fire_together() {
        let preds = vec![
            (Statistic::Goals, 2.0, 2.0),
            (Statistic::Shots, 15.0, 13.0),
            (Statistic::ShotsOnTarget, 6.0, 5.5),
            (Statistic::Corners, 5.0, 5.0),
        ];
        assert_eq!(
            evaluate(&default_rules(), &record(&preds)),
            "Over 1.5 Goals, Over 7.5 Corners, High Home Shots, High Away Shots, \
             High Home Shots on Target, High Away Shots on Target"
        );
    }

    #[test]
    fn negative_predictions_are_compared_as_is() {
        let mut preds = quiet();
        // Clamping the home side to zero would push the total over 1.5.
        preds[0] = (Statistic::Goals, -0.5, 1.9);
        assert_eq!(evaluate(&default_rules(), &record(&preds)), "Normal");
    }

    #[test]
    fn missing_statistic_does_not_fire() {
        let preds = vec![(Statistic::Shots, 20.0, 1.0)];
        assert_eq!(
            evaluate(&default_rules(), &record(&preds)),
            "High Home Shots"
        );
    }

    #[test]
    fn rules_round_trip_through_json() {
        let raw = serde_json::to_string(&default_rules()).unwrap();
        assert!(raw.contains(r#""kind":"total_above""#));
        let back: Vec<AlertRule> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, default_rules());
    }
}
