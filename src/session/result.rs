use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::sentence::SentenceData;
use crate::session::validation::WordValidations;

/// The learner's judgment of one answer, in whichever form the drill collected it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Verdict {
    PerWord {
        #[serde(rename = "wordValidations")]
        word_validations: WordValidations,
        focus_words: Vec<String>,
    },
    Whole {
        #[serde(rename = "isCorrect")]
        is_correct: bool,
    },
}

impl Verdict {
    /// (correct, judged) counts, treating a whole-answer verdict as one judgment.
    pub fn tally(&self) -> (usize, usize) {
        match self {
            Verdict::PerWord {
                word_validations, ..
            } => (word_validations.correct_count(), word_validations.len()),
            Verdict::Whole { is_correct } => (usize::from(*is_correct), 1),
        }
    }
}

/// Body of `POST /sentence_result`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceResult {
    pub sentence_data: SentenceData,
    pub english_translation: String,
    pub user_translation: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// A submitted result as kept in local history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub recorded_at: DateTime<Utc>,
    pub sentence: String,
    pub user_translation: String,
    pub reference: String,
    pub verdict: Verdict,
}

impl HistoryEntry {
    pub fn from_result(result: &SentenceResult) -> Self {
        Self {
            recorded_at: Utc::now(),
            sentence: result.sentence_data.message.clone(),
            user_translation: result.user_translation.clone(),
            reference: result.english_translation.clone(),
            verdict: result.verdict.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::sentence::Token;
    use serde_json::json;

    fn sentence() -> SentenceData {
        SentenceData {
            message: "Er steht auf.".to_string(),
            tokens: vec![Token::new("Er", " ", Some(0))],
            focus_words: vec!["aufstehen".to_string()],
        }
    }

    #[test]
    fn per_word_body_shape() {
        let mut v = WordValidations::new();
        v.judge(&sentence().focus_words, "aufstehen", true);
        let result = SentenceResult {
            sentence_data: sentence(),
            english_translation: "He gets up.".to_string(),
            user_translation: "He gets up".to_string(),
            verdict: Verdict::PerWord {
                word_validations: v,
                focus_words: vec!["aufstehen".to_string()],
            },
        };
        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["sentenceData"]["message"], "Er steht auf.");
        assert_eq!(body["englishTranslation"], "He gets up.");
        assert_eq!(body["userTranslation"], "He gets up");
        assert_eq!(body["wordValidations"], json!({"aufstehen": true}));
        assert_eq!(body["focus_words"], json!(["aufstehen"]));
        assert!(body.get("isCorrect").is_none());
    }

    #[test]
    fn whole_answer_body_shape() {
        let result = SentenceResult {
            sentence_data: sentence(),
            english_translation: "He gets up.".to_string(),
            user_translation: "He stands".to_string(),
            verdict: Verdict::Whole { is_correct: false },
        };
        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["isCorrect"], false);
        assert!(body.get("wordValidations").is_none());
    }

    #[test]
    fn tally_counts_judgments() {
        let focus: Vec<String> = vec!["a".into(), "b".into()];
        let mut v = WordValidations::new();
        v.judge(&focus, "a", true);
        v.judge(&focus, "b", false);
        let verdict = Verdict::PerWord {
            word_validations: v,
            focus_words: focus,
        };
        assert_eq!(verdict.tally(), (1, 2));
        assert_eq!(Verdict::Whole { is_correct: true }.tally(), (1, 1));
    }
}
