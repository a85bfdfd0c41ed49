//! View models for a record's feedback: summary, ATS panel and detail sections.

use serde::Serialize;

use crate::analysis::feedback::{AtsTip, DetailedTip, Feedback, Tip, TipKind};
use crate::views::score::{ScoreRating, ATS_SCALE, BADGE_SCALE, CATEGORY_SCALE};

/// Tips split by type, original order kept within each side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionedTips<T> {
    pub good: Vec<T>,
    pub improve: Vec<T>,
}

pub fn partition_tips<T: Tip + Clone>(tips: &[T]) -> PartitionedTips<T> {
    let (good, improve): (Vec<T>, Vec<T>) =
        tips.iter().cloned().partition(|t| t.kind() == TipKind::Good);
    PartitionedTips { good, improve }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryScore {
    pub title: &'static str,
    pub rating: ScoreRating,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub overall_score: u8,
    pub categories: Vec<CategoryScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AtsView {
    pub rating: ScoreRating,
    pub tips: PartitionedTips<AtsTip>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailSection {
    pub id: &'static str,
    pub title: &'static str,
    pub badge: ScoreRating,
    pub tips: PartitionedTips<DetailedTip>,
}

pub fn summary_view(feedback: &Feedback) -> SummaryView {
    SummaryView {
        overall_score: feedback.overall_score,
        categories: feedback
            .categories()
            .into_iter()
            .map(|(_, title, category)| CategoryScore {
                title,
                rating: CATEGORY_SCALE.rate(category.score),
            })
            .collect(),
    }
}

pub fn ats_view(feedback: &Feedback) -> AtsView {
    AtsView {
        rating: ATS_SCALE.rate(feedback.ats.score),
        tips: partition_tips(&feedback.ats.tips),
    }
}

pub fn detail_sections(feedback: &Feedback) -> Vec<DetailSection> {
    feedback
        .categories()
        .into_iter()
        .map(|(id, title, category)| DetailSection {
            id,
            title,
            badge: BADGE_SCALE.rate(category.score),
            tips: partition_tips(&category.tips),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::feedback::parse_feedback;
    use crate::analysis::feedback::tests::sample_feedback_json;
    use crate::views::score::ScoreTier;

    #[test]
    fn test_partition_keeps_order() {
        let tips = vec![
            AtsTip { kind: TipKind::Improve, tip: "a".into() },
            AtsTip { kind: TipKind::Good, tip: "b".into() },
            AtsTip { kind: TipKind::Improve, tip: "c".into() },
        ];
        let split = partition_tips(&tips);
        assert_eq!(split.good.len(), 1);
        let improve: Vec<_> = split.improve.iter().map(|t| t.tip.as_str()).collect();
        assert_eq!(improve, vec!["a", "c"]);
    }

    #[test]
    fn test_summary_has_four_categories() {
        let feedback = parse_feedback(&sample_feedback_json(82)).unwrap();
        let summary = summary_view(&feedback);
        assert_eq!(summary.overall_score, 82);
        let titles: Vec<_> = summary.categories.iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Tone & Style", "Content", "Structure", "Skills"]);
        // toneAndStyle is 71: above the category cutoff of 70
        assert_eq!(summary.categories[0].rating.tier, ScoreTier::Good);
        // content is 48
        assert_eq!(summary.categories[1].rating.tier, ScoreTier::NeedsWork);
    }

    #[test]
    fn test_ats_view_rates_and_splits() {
        let feedback = parse_feedback(&sample_feedback_json(82)).unwrap();
        let ats = ats_view(&feedback);
        assert_eq!(ats.rating.score, 74);
        assert_eq!(ats.rating.label, "Great Job!");
        assert_eq!(ats.tips.good.len(), 1);
        assert_eq!(ats.tips.improve.len(), 1);
    }

    #[test]
    fn test_detail_badges_use_badge_cutoffs() {
        let feedback = parse_feedback(&sample_feedback_json(82)).unwrap();
        let sections = detail_sections(&feedback);
        assert_eq!(sections.len(), 4);
        // content is 48: improve on the badge scale, needs work on the summary scale
        assert_eq!(sections[1].badge.tier, ScoreTier::Improve);
        assert_eq!(sections[0].id, "tone-style");
    }
}
