use serde::{Deserialize, Serialize};

use crate::constants::QUESTION_OPTION_COUNT;

/// Public video metadata, visible to any authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    /// Educational level id; content without a level is never entitled
    pub level: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Duration as "MM:SS" or "HH:MM:SS"
    pub duration: Option<String>,
    pub views: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public course metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub level: Option<String>,
    pub thumbnail_url: Option<String>,
    pub hours: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public test metadata.
/// `questions` is recomputed from the private question set on every write,
/// never taken from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub title: String,
    pub description: String,
    pub level: Option<String>,
    /// Duration in minutes, e.g. "30"
    pub duration: Option<String>,
    pub questions: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Private sibling of a video or course: the actual media URL.
/// Must never be read before the entitlement check passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateSource {
    pub url: String,
}

/// A single test question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Question number, starting from 1
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`, 0..=3
    pub correct_answer: u8,
    pub explanation: Option<String>,
}

impl Question {
    /// Validate shape: four non-empty options and an in-range answer index
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.question.trim().is_empty() {
            return Err(format!("Question {} has no text", self.id));
        }
        if self.options.len() != QUESTION_OPTION_COUNT {
            return Err(format!(
                "Question {} must have exactly {} options",
                self.id, QUESTION_OPTION_COUNT
            ));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(format!("Question {} has an empty option", self.id));
        }
        if usize::from(self.correct_answer) >= QUESTION_OPTION_COUNT {
            return Err(format!(
                "Question {} correct answer index out of range",
                self.id
            ));
        }
        Ok(())
    }
}

/// Private sibling of a test: the gated question set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestContent {
    pub questions_data: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: 1,
            question: "ما هي علامة إعراب الفاعل؟".to_string(),
            options: vec![
                "مرفوع".to_string(),
                "منصوب".to_string(),
                "مجرور".to_string(),
                "مجهول".to_string(),
            ],
            correct_answer: 0,
            explanation: Some("الفاعل دائماً مرفوع".to_string()),
        }
    }

    #[test]
    fn test_valid_question() {
        assert!(question().validate().is_ok());
    }

    #[test]
    fn test_question_requires_four_options() {
        let mut q = question();
        q.options.pop();
        assert!(q.validate().is_err());

        q.options.push("إجابة".to_string());
        q.options.push("زيادة".to_string());
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_answer_index_in_range() {
        let mut q = question();
        q.correct_answer = 4;
        assert!(q.validate().is_err());

        q.correct_answer = 3;
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_empty_text_rejected() {
        let mut q = question();
        q.question = "  ".to_string();
        assert!(q.validate().is_err());

        let mut q = question();
        q.options[2] = String::new();
        assert!(q.validate().is_err());
    }
}
