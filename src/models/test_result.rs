use serde::{Deserialize, Serialize};

use crate::models::content::Question;

/// One graded attempt at a test, created once per completed attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultRecord {
    pub user_id: String,
    pub test_id: String,
    pub score: u32,
    pub percentage: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Chosen option index per question, None where unanswered
    pub answers: Vec<Option<u8>>,
    pub created_at: i64,
}

/// Outcome of grading an answer sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeSummary {
    pub score: u32,
    pub percentage: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
}

/// Grade an answer sheet against the question set.
/// Missing or unanswered entries count as wrong.
pub fn grade(questions: &[Question], answers: &[Option<u8>]) -> GradeSummary {
    let total = questions.len() as u32;
    let mut correct = 0u32;

    for (index, question) in questions.iter().enumerate() {
        if answers.get(index).copied().flatten() == Some(question.correct_answer) {
            correct += 1;
        }
    }

    let percentage = if total == 0 {
        0
    } else {
        ((f64::from(correct) / f64::from(total)) * 100.0).round() as u32
    };

    GradeSummary {
        score: correct,
        percentage,
        total_questions: total,
        correct_answers: correct,
        wrong_answers: total - correct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(correct: &[u8]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(i, &answer)| Question {
                id: i as u32 + 1,
                question: format!("سؤال {}", i + 1),
                options: vec!["أ".into(), "ب".into(), "ج".into(), "د".into()],
                correct_answer: answer,
                explanation: None,
            })
            .collect()
    }

    #[test]
    fn test_all_correct() {
        let qs = questions(&[0, 1, 2, 3]);
        let summary = grade(&qs, &[Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(summary.score, 4);
        assert_eq!(summary.percentage, 100);
        assert_eq!(summary.wrong_answers, 0);
    }

    #[test]
    fn test_partial_and_unanswered() {
        let qs = questions(&[0, 1, 2]);
        // One right, one wrong, one unanswered
        let summary = grade(&qs, &[Some(0), Some(3), None]);
        assert_eq!(summary.score, 1);
        assert_eq!(summary.correct_answers, 1);
        assert_eq!(summary.wrong_answers, 2);
        assert_eq!(summary.percentage, 33);
    }

    #[test]
    fn test_short_answer_sheet() {
        let qs = questions(&[0, 0, 0]);
        // Trailing questions without entries count as wrong
        let summary = grade(&qs, &[Some(0)]);
        assert_eq!(summary.score, 1);
        assert_eq!(summary.wrong_answers, 2);
    }

    #[test]
    fn test_empty_question_set() {
        let summary = grade(&[], &[]);
        assert_eq!(summary.total_questions, 0);
        assert_eq!(summary.percentage, 0);
    }
}
