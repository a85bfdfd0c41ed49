//! Score → qualitative tier. Each panel keeps its own cutoffs.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreTier {
    Good,
    Improve,
    NeedsWork,
}

impl ScoreTier {
    pub fn color(&self) -> &'static str {
        match self {
            ScoreTier::Good => "#00D4AA",
            ScoreTier::Improve => "#FFB347",
            ScoreTier::NeedsWork => "#FF6B6B",
        }
    }
}

/// A score lands in `Good` above `good_above`, in `Improve` above
/// `improve_above`, and in `NeedsWork` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierScale {
    pub good_above: u8,
    pub improve_above: u8,
    pub labels: [&'static str; 3],
}

pub const ATS_SCALE: TierScale = TierScale {
    good_above: 69,
    improve_above: 49,
    labels: ["Great Job!", "Good Start", "Needs Improvement"],
};

pub const CATEGORY_SCALE: TierScale = TierScale {
    good_above: 70,
    improve_above: 49,
    labels: ["Strong", "Good Start", "Needs Work"],
};

pub const BADGE_SCALE: TierScale = TierScale {
    good_above: 69,
    improve_above: 39,
    labels: ["Strong", "Good Start", "Needs Work"],
};

/// Cards use inclusive 80 / 60 cutoffs.
pub const CARD_SCALE: TierScale = TierScale {
    good_above: 79,
    improve_above: 59,
    labels: ["Excellent", "Good", "Needs Work"],
};

impl TierScale {
    pub fn classify(&self, score: u8) -> ScoreTier {
        if score > self.good_above {
            ScoreTier::Good
        } else if score > self.improve_above {
            ScoreTier::Improve
        } else {
            ScoreTier::NeedsWork
        }
    }

    pub fn label(&self, tier: ScoreTier) -> &'static str {
        match tier {
            ScoreTier::Good => self.labels[0],
            ScoreTier::Improve => self.labels[1],
            ScoreTier::NeedsWork => self.labels[2],
        }
    }

    pub fn rate(&self, score: u8) -> ScoreRating {
        let tier = self.classify(score);
        ScoreRating {
            score,
            tier,
            label: self.label(tier),
            color: tier.color(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreRating {
    pub score: u8,
    pub tier: ScoreTier,
    pub label: &'static str,
    pub color: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALES: [TierScale; 4] = [ATS_SCALE, CATEGORY_SCALE, BADGE_SCALE, CARD_SCALE];

    #[test]
    fn test_every_score_gets_exactly_one_tier() {
        for scale in SCALES {
            for score in 0..=100u8 {
                let tier = scale.classify(score);
                let matches = [
                    score > scale.good_above,
                    score > scale.improve_above && score <= scale.good_above,
                    score <= scale.improve_above,
                ];
                assert_eq!(matches.iter().filter(|m| **m).count(), 1, "score {score}");
                let expected = if matches[0] {
                    ScoreTier::Good
                } else if matches[1] {
                    ScoreTier::Improve
                } else {
                    ScoreTier::NeedsWork
                };
                assert_eq!(tier, expected, "score {score}");
            }
        }
    }

    #[test]
    fn test_tiers_are_monotonic() {
        fn rank(t: ScoreTier) -> u8 {
            match t {
                ScoreTier::NeedsWork => 0,
                ScoreTier::Improve => 1,
                ScoreTier::Good => 2,
            }
        }
        for scale in SCALES {
            for score in 0..100u8 {
                assert!(rank(scale.classify(score)) <= rank(scale.classify(score + 1)));
            }
        }
    }

    #[test]
    fn test_ats_and_category_boundaries_differ() {
        assert_eq!(ATS_SCALE.classify(70), ScoreTier::Good);
        assert_eq!(CATEGORY_SCALE.classify(70), ScoreTier::Improve);
        assert_eq!(ATS_SCALE.classify(50), ScoreTier::Improve);
        assert_eq!(ATS_SCALE.classify(49), ScoreTier::NeedsWork);
        assert_eq!(BADGE_SCALE.classify(40), ScoreTier::Improve);
    }

    #[test]
    fn test_card_labels() {
        assert_eq!(CARD_SCALE.rate(80).label, "Excellent");
        assert_eq!(CARD_SCALE.rate(60).label, "Good");
        assert_eq!(CARD_SCALE.rate(59).label, "Needs Work");
        assert_eq!(ATS_SCALE.rate(95).label, "Great Job!");
        assert_eq!(ATS_SCALE.rate(10).color, "#FF6B6B");
    }
}
