use serde::{Deserialize, Serialize};

use crate::stats::ResultsSummary;

/// How a metric is compared against each cutoff bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Tier applies when `metric >= bound` (higher is better)
    AtLeast,
    /// Tier applies when `metric < bound` (lower is better)
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutoff {
    pub bound: f64,
    pub label: String,
}

/// Ordered cutoffs, best tier first, plus the label for everything past the last one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub direction: Direction,
    pub cutoffs: Vec<Cutoff>,
    pub fallback: String,
}

impl ThresholdTable {
    pub fn new(direction: Direction, cutoffs: &[(f64, &str)], fallback: &str) -> Self {
        Self {
            direction,
            cutoffs: cutoffs
                .iter()
                .map(|&(bound, label)| Cutoff {
                    bound,
                    label: label.to_string(),
                })
                .collect(),
            fallback: fallback.to_string(),
        }
    }

    /// Number of distinct tiers, fallback included
    pub fn tiers(&self) -> usize {
        self.cutoffs.len() + 1
    }
}

/// A classified metric. `rank` 0 is the best tier of its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier<'a> {
    pub label: &'a str,
    pub rank: usize,
}

impl Tier<'_> {
    pub fn is_fallback(&self, table: &ThresholdTable) -> bool {
        self.rank == table.cutoffs.len()
    }
}

pub fn classify(metric: f64, table: &ThresholdTable) -> Tier<'_> {
    table
        .cutoffs
        .iter()
        .position(|cutoff| match table.direction {
            Direction::AtLeast => metric >= cutoff.bound,
            Direction::Below => metric < cutoff.bound,
        })
        .map(|rank| Tier {
            label: &table.cutoffs[rank].label,
            rank,
        })
        .unwrap_or(Tier {
            label: &table.fallback,
            rank: table.cutoffs.len(),
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTables {
    /// Hit percentage
    pub accuracy: ThresholdTable,
    /// Mean response time in ms
    pub speed: ThresholdTable,
    /// Spread between fastest and slowest response in ms
    pub consistency: ThresholdTable,
}

impl Default for FeedbackTables {
    fn default() -> Self {
        Self {
            accuracy: ThresholdTable::new(
                Direction::AtLeast,
                &[(90.0, "outstanding"), (75.0, "excellent"), (60.0, "good")],
                "needs practice",
            ),
            speed: ThresholdTable::new(
                Direction::Below,
                &[(400.0, "fast"), (600.0, "moderate")],
                "slow",
            ),
            consistency: ThresholdTable::new(
                Direction::Below,
                &[(300.0, "consistent"), (600.0, "fair")],
                "inconsistent",
            ),
        }
    }
}

impl FeedbackTables {
    /// Tables for a single-target reaction test, scored against athlete-level times.
    pub fn reaction() -> Self {
        Self {
            speed: ThresholdTable::new(
                Direction::Below,
                &[
                    (200.0, "outstanding: elite athlete level"),
                    (250.0, "excellent: better than average"),
                    (300.0, "good: around the average range"),
                ],
                "keep practicing",
            ),
            ..Self::default()
        }
    }

    /// Tables for multi-slot tracking, where accuracy is the headline metric.
    pub fn tracking() -> Self {
        Self {
            accuracy: ThresholdTable::new(
                Direction::AtLeast,
                &[(80.0, "excellent tracking"), (60.0, "good tracking")],
                "keep practicing your spatial awareness",
            ),
            ..Self::default()
        }
    }

    /// Classify every metric the summary carries. Metrics without data are skipped.
    pub fn assess<'a>(&'a self, summary: &ResultsSummary) -> Assessment<'a> {
        Assessment {
            accuracy: summary.accuracy_pct.map(|pct| classify(pct, &self.accuracy)),
            speed: summary.timing.map(|t| classify(t.mean_ms, &self.speed)),
            consistency: summary
                .timing
                .map(|t| classify(t.range_ms, &self.consistency)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment<'a> {
    pub accuracy: Option<Tier<'a>>,
    pub speed: Option<Tier<'a>>,
    pub consistency: Option<Tier<'a>>,
}

/// Reference reaction time shown next to the user's mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub label: String,
    pub mean_ms: f64,
}

pub fn default_baselines() -> Vec<Baseline> {
    vec![
        Baseline {
            label: "Average person".to_string(),
            mean_ms: 250.0,
        },
        Baseline {
            label: "Athlete".to_string(),
            mean_ms: 200.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::TimingStats;

    #[test]
    fn test_accuracy_tiers() {
        let tables = FeedbackTables::default();

        assert_eq!(classify(100.0, &tables.accuracy).label, "outstanding");
        assert_eq!(classify(90.0, &tables.accuracy).label, "outstanding");
        assert_eq!(classify(89.9, &tables.accuracy).label, "excellent");
        assert_eq!(classify(75.0, &tables.accuracy).label, "excellent");
        assert_eq!(classify(60.0, &tables.accuracy).label, "good");
        assert_eq!(classify(59.9, &tables.accuracy).label, "needs practice");
        assert_eq!(classify(0.0, &tables.accuracy).rank, 3);
    }

    #[test]
    fn test_speed_tiers_are_strict_below() {
        let tables = FeedbackTables::default();

        assert_eq!(classify(250.0, &tables.speed).label, "fast");
        assert_eq!(classify(400.0, &tables.speed).label, "moderate");
        assert_eq!(classify(599.0, &tables.speed).label, "moderate");
        assert_eq!(classify(600.0, &tables.speed).label, "slow");
    }

    #[test]
    fn test_consistency_tiers() {
        let tables = FeedbackTables::default();

        assert_eq!(classify(150.0, &tables.consistency).label, "consistent");
        assert_eq!(classify(300.0, &tables.consistency).label, "fair");
        let worst = classify(900.0, &tables.consistency);
        assert_eq!(worst.label, "inconsistent");
        assert!(worst.is_fallback(&tables.consistency));
    }

    #[test]
    fn test_empty_table_always_falls_back() {
        let table = ThresholdTable::new(Direction::AtLeast, &[], "n/a");
        assert_eq!(table.tiers(), 1);
        assert_eq!(classify(1e9, &table), Tier { label: "n/a", rank: 0 });
    }

    #[test]
    fn test_reaction_tables_swap_speed_only() {
        let tables = FeedbackTables::reaction();

        assert_eq!(classify(180.0, &tables.speed).rank, 0);
        assert_eq!(classify(240.0, &tables.speed).rank, 1);
        assert_eq!(classify(299.0, &tables.speed).rank, 2);
        assert_eq!(classify(300.0, &tables.speed).label, "keep practicing");
        assert_eq!(tables.accuracy, FeedbackTables::default().accuracy);
    }

    #[test]
    fn test_tracking_tables() {
        let tables = FeedbackTables::tracking();

        assert_eq!(classify(87.5, &tables.accuracy).label, "excellent tracking");
        assert_eq!(classify(62.5, &tables.accuracy).label, "good tracking");
        assert_eq!(classify(50.0, &tables.accuracy).rank, 2);
    }

    #[test]
    fn test_assess_skips_missing_metrics() {
        let tables = FeedbackTables::default();
        let empty = ResultsSummary {
            count: 0,
            hits: 0,
            accuracy_pct: None,
            timing: None,
        };
        let assessment = tables.assess(&empty);

        assert_eq!(assessment.accuracy, None);
        assert_eq!(assessment.speed, None);
        assert_eq!(assessment.consistency, None);
    }

    #[test]
    fn test_assess_full_summary() {
        let tables = FeedbackTables::default();
        let summary = ResultsSummary {
            count: 3,
            hits: 3,
            accuracy_pct: Some(100.0),
            timing: Some(TimingStats {
                samples: 3,
                mean_ms: 116.67,
                min_ms: 50.0,
                max_ms: 200.0,
                range_ms: 150.0,
                std_dev_ms: 62.4,
            }),
        };
        let assessment = tables.assess(&summary);

        assert_eq!(assessment.accuracy.unwrap().label, "outstanding");
        assert_eq!(assessment.speed.unwrap().label, "fast");
        assert_eq!(assessment.consistency.unwrap().label, "consistent");
    }

    #[test]
    fn test_tables_roundtrip_through_json() {
        let tables = FeedbackTables::reaction();
        let json = serde_json::to_string(&tables).unwrap();
        let back: FeedbackTables = serde_json::from_str(&json).unwrap();
        assert_eq!(tables, back);
    }

    #[test]
    fn test_default_baselines() {
        let baselines = default_baselines();
        assert_eq!(baselines.len(), 2);
        assert_eq!(baselines[0].mean_ms, 250.0);
        assert_eq!(baselines[1].label, "Athlete");
    }
}
