use serde::{Deserialize, Serialize};

/// The canonical optimized résumé. Produced by the model, consumed by the
/// preview and the export codecs.
///
/// Only `header` is mandatory. Every other section is omitted from rendering
/// when absent or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResume {
    pub header: ResumeHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<MatchScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeHeader {
    pub name: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: String,
}

/// Model-estimated résumé/job fit, always within 0..=100.
///
/// Out-of-range and non-integer values fail deserialization instead of being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct MatchScore(u8);

impl MatchScore {
    pub const MAX: u8 = 100;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for MatchScore {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(format!("matchScore {value} is outside 0..=100"))
        }
    }
}

impl From<MatchScore> for u8 {
    fn from(score: MatchScore) -> Self {
        score.0
    }
}

impl StructuredResume {
    pub fn summary_text(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Skills with blank entries dropped.
    pub fn listed_skills(&self) -> Vec<&str> {
        self.skills
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_resume_deserializes_with_defaults() {
        let resume: StructuredResume =
            serde_json::from_str(r#"{"header":{"name":"Jane Doe"}}"#).unwrap();
        assert_eq!(resume.header.name, "Jane Doe");
        assert_eq!(resume.header.contact, "");
        assert!(resume.summary.is_none());
        assert!(resume.skills.is_empty());
        assert!(resume.match_score.is_none(), "absent score means unscored");
    }

    #[test]
    fn test_match_score_round_trips_as_integer() {
        let resume: StructuredResume =
            serde_json::from_str(r#"{"header":{"name":"A","contact":""},"matchScore":87}"#)
                .unwrap();
        assert_eq!(resume.match_score.map(MatchScore::value), Some(87));
        let json = serde_json::to_value(&resume).unwrap();
        assert_eq!(json["matchScore"], 87);
    }

    #[test]
    fn test_match_score_bounds() {
        assert!(MatchScore::try_from(0).is_ok());
        assert!(MatchScore::try_from(100).is_ok());
        assert!(MatchScore::try_from(101).is_err());
        assert!(MatchScore::try_from(-1).is_err());
    }

    #[test]
    fn test_out_of_range_match_score_is_rejected() {
        let result: Result<StructuredResume, _> =
            serde_json::from_str(r#"{"header":{"name":"A"},"matchScore":140}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_textual_match_score_is_rejected() {
        let result: Result<StructuredResume, _> =
            serde_json::from_str(r#"{"header":{"name":"A"},"matchScore":"high"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let result: Result<StructuredResume, _> = serde_json::from_str(r#"{"summary":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_summary_and_skills_are_treated_as_absent() {
        let resume = StructuredResume {
            header: ResumeHeader {
                name: "A".into(),
                contact: String::new(),
            },
            summary: Some("   ".into()),
            skills: vec!["".into(), " Rust ".into()],
            experience: vec![],
            education: vec![],
            match_score: None,
        };
        assert_eq!(resume.summary_text(), None);
        assert_eq!(resume.listed_skills(), vec!["Rust"]);
    }
}
