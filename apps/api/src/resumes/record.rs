use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::analysis::feedback::Feedback;

pub const RECORD_PATTERN: &str = "resume:*";

/// Persisted metadata and feedback for one analysed résumé.
///
/// Written with empty feedback when the upload flow starts, overwritten once
/// when analysis completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: Uuid,
    pub resume_path: String,
    pub image_path: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    /// `None` is stored as the empty-string sentinel.
    #[serde(default, with = "pending_feedback")]
    pub feedback: Option<Feedback>,
}

impl ResumeRecord {
    pub fn key(&self) -> String {
        record_key(self.id)
    }

    pub fn is_pending(&self) -> bool {
        self.feedback.is_none()
    }

    pub fn overall_score(&self) -> Option<u8> {
        self.feedback.as_ref().map(|f| f.overall_score)
    }
}

pub fn record_key(id: Uuid) -> String {
    format!("resume:{id}")
}

/// Front-end route for a record's detail view.
pub fn detail_route(id: Uuid) -> String {
    format!("/resume/{id}")
}

mod pending_feedback {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Ready(Feedback),
        Sentinel(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<Feedback>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(feedback) => feedback.serialize(s),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Feedback>, D::Error> {
        match Option::<Stored>::deserialize(d)? {
            Some(Stored::Ready(feedback)) => Ok(Some(feedback)),
            Some(Stored::Sentinel(_)) | None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::feedback::parse_feedback;
    use crate::analysis::feedback::tests::sample_feedback_json;

    fn record(feedback: Option<Feedback>) -> ResumeRecord {
        ResumeRecord {
            id: Uuid::new_v4(),
            resume_path: "users/ada/1/resume.pdf".to_string(),
            image_path: "users/ada/1/resume.png".to_string(),
            company_name: Some("Acme".to_string()),
            job_title: Some("Engineer".to_string()),
            job_description: None,
            feedback,
        }
    }

    #[test]
    fn test_round_trip_with_feedback() {
        let original = record(Some(parse_feedback(&sample_feedback_json(82)).unwrap()));
        let stored = serde_json::to_string(&original).unwrap();
        let parsed: ResumeRecord = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_round_trip_pending() {
        let original = record(None);
        let stored = serde_json::to_string(&original).unwrap();
        assert!(stored.contains("\"feedback\":\"\""));
        let parsed: ResumeRecord = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed, original);
        assert!(parsed.is_pending());
    }

    #[test]
    fn test_null_or_missing_feedback_is_pending() {
        let id = Uuid::new_v4();
        let with_null = format!(
            r#"{{"id":"{id}","resumePath":"a","imagePath":"b","feedback":null}}"#
        );
        let without = format!(r#"{{"id":"{id}","resumePath":"a","imagePath":"b"}}"#);
        assert!(serde_json::from_str::<ResumeRecord>(&with_null).unwrap().is_pending());
        assert!(serde_json::from_str::<ResumeRecord>(&without).unwrap().is_pending());
    }

    #[test]
    fn test_uses_camel_case_keys() {
        let json = serde_json::to_value(record(None)).unwrap();
        assert_eq!(json["resumePath"], "users/ada/1/resume.pdf");
        assert_eq!(json["companyName"], "Acme");
    }

    #[test]
    fn test_record_key_and_route() {
        let id = Uuid::nil();
        assert_eq!(record_key(id), "resume:00000000-0000-0000-0000-000000000000");
        assert_eq!(detail_route(id), "/resume/00000000-0000-0000-0000-000000000000");
    }
}
