//! Dashboard view: résumé cards plus aggregates over the fetched set.

use serde::Serialize;
use uuid::Uuid;

use crate::resumes::record::{detail_route, ResumeRecord};
use crate::views::score::{ScoreRating, CARD_SCALE};

/// Overall score at or above which a résumé counts as strong.
pub const STRONG_SCORE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    /// Rounded mean of overall scores; pending records count as 0.
    pub average_score: u32,
    pub strong_count: usize,
}

/// Pure function of the records, so repeated calls agree.
pub fn compute_stats(records: &[ResumeRecord]) -> DashboardStats {
    let total = records.len();
    if total == 0 {
        return DashboardStats {
            total: 0,
            average_score: 0,
            strong_count: 0,
        };
    }
    let scores = records.iter().map(|r| r.overall_score().unwrap_or(0) as u32);
    let sum: u32 = scores.clone().sum();
    let average_score = (sum as f64 / total as f64).round() as u32;
    let strong_count = scores.filter(|s| *s >= STRONG_SCORE as u32).count();

    DashboardStats {
        total,
        average_score,
        strong_count,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeCardView {
    pub id: Uuid,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub pending: bool,
    pub rating: Option<ScoreRating>,
    pub ats_score: Option<u8>,
    /// Mean of the content and structure scores, rounded.
    pub quality: Option<u8>,
    pub href: String,
    pub image_url: String,
}

pub fn resume_card(record: &ResumeRecord) -> ResumeCardView {
    ResumeCardView {
        id: record.id,
        company_name: record.company_name.clone(),
        job_title: record.job_title.clone(),
        pending: record.is_pending(),
        rating: record.overall_score().map(|s| CARD_SCALE.rate(s)),
        ats_score: record.feedback.as_ref().map(|f| f.ats.score),
        quality: record.feedback.as_ref().map(|f| {
            let sum = f.content.score as f64 + f.structure.score as f64;
            (sum / 2.0).round() as u8
        }),
        href: detail_route(record.id),
        image_url: format!("/api/v1/resumes/{}/image", record.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::feedback::parse_feedback;
    use crate::analysis::feedback::tests::sample_feedback_json;

    fn record(score: Option<u8>) -> ResumeRecord {
        ResumeRecord {
            id: Uuid::new_v4(),
            resume_path: "r.pdf".to_string(),
            image_path: "r.png".to_string(),
            company_name: Some("Acme".to_string()),
            job_title: None,
            job_description: None,
            feedback: score.map(|s| parse_feedback(&sample_feedback_json(s)).unwrap()),
        }
    }

    #[test]
    fn test_empty_set() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_score, 0);
        assert_eq!(stats.strong_count, 0);
    }

    #[test]
    fn test_average_rounds_and_counts_pending_as_zero() {
        let records = vec![record(Some(82)), record(Some(69)), record(None)];
        let stats = compute_stats(&records);
        assert_eq!(stats.total, 3);
        // (82 + 69 + 0) / 3 = 50.33
        assert_eq!(stats.average_score, 50);
        assert_eq!(stats.strong_count, 1);
    }

    #[test]
    fn test_strong_threshold_is_inclusive() {
        let stats = compute_stats(&[record(Some(70)), record(Some(71))]);
        assert_eq!(stats.strong_count, 2);
        assert_eq!(stats.average_score, 71); // 70.5 rounds up
    }

    #[test]
    fn test_stats_are_idempotent() {
        let records = vec![record(Some(90)), record(Some(40)), record(None)];
        assert_eq!(compute_stats(&records), compute_stats(&records));
    }

    #[test]
    fn test_card_for_pending_record() {
        let card = resume_card(&record(None));
        assert!(card.pending);
        assert!(card.rating.is_none());
        assert!(card.ats_score.is_none());
        assert!(card.quality.is_none());
        assert!(card.href.starts_with("/resume/"));
    }

    #[test]
    fn test_card_rating() {
        let card = resume_card(&record(Some(85)));
        let rating = card.rating.unwrap();
        assert_eq!(rating.label, "Excellent");
    }

    #[test]
    fn test_card_ats_and_quality() {
        let card = resume_card(&record(Some(72)));
        assert_eq!(card.ats_score, Some(74));
        // content 48, structure 90
        assert_eq!(card.quality, Some(69));
    }

    #[test]
    fn test_card_quality_rounds_half_up() {
        let mut record = record(Some(60));
        if let Some(feedback) = record.feedback.as_mut() {
            feedback.content.score = 51;
            feedback.structure.score = 90;
        }
        assert_eq!(resume_card(&record).quality, Some(71)); // 70.5
    }
}
