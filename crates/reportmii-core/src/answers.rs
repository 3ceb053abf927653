//! Typed answers and the per-analysis answer store.
//!
//! Answers are keyed by `(block id, question index)`. A missing key means the
//! question was never answered; there is no empty sentinel value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::blocks::Block;
use crate::catalog::{Question, QuestionKind};
use crate::error::WizardError;

/// Lowest and highest value of a scale answer.
pub const SCALE_MIN: u8 = 1;
pub const SCALE_MAX: u8 = 5;

/// A recorded answer, tagged by question kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Scale(u8),
    Text(String),
    Choice(String),
}

impl AnswerValue {
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerValue::Scale(_) => QuestionKind::Scale,
            AnswerValue::Text(_) => QuestionKind::Text,
            AnswerValue::Choice(_) => QuestionKind::MultipleChoice,
        }
    }

    /// Interpret raw user input for a question of the given kind.
    ///
    /// Only the shape is checked here; range and option checks happen when the
    /// value is stored.
    pub fn parse(kind: QuestionKind, raw: &str) -> Result<Self, String> {
        match kind {
            QuestionKind::Scale => raw
                .trim()
                .parse::<u8>()
                .map(AnswerValue::Scale)
                .map_err(|_| format!("'{raw}' is not a rating between {SCALE_MIN} and {SCALE_MAX}")),
            QuestionKind::Text => Ok(AnswerValue::Text(raw.to_string())),
            QuestionKind::MultipleChoice => Ok(AnswerValue::Choice(raw.to_string())),
        }
    }

    pub fn as_scale(&self) -> Option<u8> {
        match self {
            AnswerValue::Scale(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerValue::Scale(v) => write!(f, "{v}/{SCALE_MAX}"),
            AnswerValue::Text(s) | AnswerValue::Choice(s) => f.write_str(s),
        }
    }
}

/// Whether `value` counts as an answer to `question`.
pub fn is_answered(question: &Question, value: &AnswerValue) -> bool {
    validate(question, value).is_ok()
}

/// Check `value` against the question's rule, returning the reason on failure.
fn validate(question: &Question, value: &AnswerValue) -> Result<(), String> {
    match (question.kind, value) {
        (QuestionKind::Scale, AnswerValue::Scale(v)) => {
            if (SCALE_MIN..=SCALE_MAX).contains(v) {
                Ok(())
            } else {
                Err(format!("rating {v} is outside {SCALE_MIN}..={SCALE_MAX}"))
            }
        }
        (QuestionKind::Text, AnswerValue::Text(s)) => {
            if s.trim().is_empty() {
                Err("text answer is blank".to_string())
            } else {
                Ok(())
            }
        }
        (QuestionKind::MultipleChoice, AnswerValue::Choice(s)) => {
            if !s.is_empty() && question.options.iter().any(|o| o == s) {
                Ok(())
            } else {
                Err(format!("'{s}' is not one of {:?}", question.options))
            }
        }
        (expected, other) => Err(format!(
            "expected a {expected} answer, got {}",
            other.kind()
        )),
    }
}

/// All answers of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerStore {
    answers: BTreeMap<String, BTreeMap<usize, AnswerValue>>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store an answer, returning the value it replaced.
    ///
    /// # Errors
    /// Returns [`WizardError::UnknownQuestion`] for an index outside the block and
    /// [`WizardError::InvalidAnswerValue`] when the value fails the question's
    /// rule. Rejected writes leave the store unchanged.
    pub fn set_answer(
        &mut self,
        block: &Block,
        question_index: usize,
        value: AnswerValue,
    ) -> Result<Option<AnswerValue>, WizardError> {
        let question = block
            .question(question_index)
            .ok_or_else(|| WizardError::UnknownQuestion {
                block: block.id.clone(),
                index: question_index,
            })?;

        validate(question, &value).map_err(|reason| WizardError::InvalidAnswerValue {
            block: block.id.clone(),
            question: question_index,
            reason,
        })?;

        Ok(self
            .answers
            .entry(block.id.clone())
            .or_default()
            .insert(question_index, value))
    }

    pub fn get_answer(&self, block_id: &str, question_index: usize) -> Option<&AnswerValue> {
        self.answers.get(block_id)?.get(&question_index)
    }

    /// Answers of one block, by question index.
    pub fn block_answers(&self, block_id: &str) -> impl Iterator<Item = (usize, &AnswerValue)> {
        self.answers
            .get(block_id)
            .into_iter()
            .flat_map(|m| m.iter().map(|(i, v)| (*i, v)))
    }

    /// Drop every answer of a block (used when a custom block is removed).
    pub fn remove_block(&mut self, block_id: &str) -> usize {
        self.answers.remove(block_id).map(|m| m.len()).unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Total number of stored answers.
    pub fn len(&self) -> usize {
        self.answers.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Block {
        Block::custom(
            "Mixed",
            vec![
                Question::scale("Rate it"),
                Question::text("Explain"),
                Question::choice("Pick", ["A", "B"]),
            ],
        )
    }

    #[test]
    fn test_scale_range() {
        let q = Question::scale("Rate");
        assert!(is_answered(&q, &AnswerValue::Scale(3)));
        assert!(is_answered(&q, &AnswerValue::Scale(1)));
        assert!(is_answered(&q, &AnswerValue::Scale(5)));
        assert!(!is_answered(&q, &AnswerValue::Scale(0)));
        assert!(!is_answered(&q, &AnswerValue::Scale(6)));
    }

    #[test]
    fn test_text_needs_non_whitespace() {
        let q = Question::text("Why?");
        assert!(is_answered(&q, &AnswerValue::Text(" ok ".to_string())));
        assert!(!is_answered(&q, &AnswerValue::Text(" \t\n".to_string())));
    }

    #[test]
    fn test_choice_must_match_option() {
        let q = Question::choice("Pick", ["A", "B"]);
        assert!(is_answered(&q, &AnswerValue::Choice("B".to_string())));
        assert!(!is_answered(&q, &AnswerValue::Choice("C".to_string())));
        assert!(!is_answered(&q, &AnswerValue::Choice(String::new())));
    }

    #[test]
    fn test_kind_mismatch_is_not_an_answer() {
        let q = Question::scale("Rate");
        assert!(!is_answered(&q, &AnswerValue::Text("3".to_string())));
    }

    #[test]
    fn test_rejected_write_leaves_store_unchanged() {
        let block = block();
        let mut store = AnswerStore::new();
        store.set_answer(&block, 0, AnswerValue::Scale(4)).unwrap();
        let before = store.clone();

        for bad in [0, 6] {
            let err = store.set_answer(&block, 0, AnswerValue::Scale(bad)).unwrap_err();
            assert!(matches!(err, WizardError::InvalidAnswerValue { question: 0, .. }));
        }
        assert!(store.set_answer(&block, 2, AnswerValue::Choice("Z".into())).is_err());
        assert!(matches!(
            store.set_answer(&block, 9, AnswerValue::Scale(3)),
            Err(WizardError::UnknownQuestion { index: 9, .. })
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_overwrite_returns_previous() {
        let block = block();
        let mut store = AnswerStore::new();
        assert_eq!(store.set_answer(&block, 0, AnswerValue::Scale(2)).unwrap(), None);
        assert_eq!(
            store.set_answer(&block, 0, AnswerValue::Scale(5)).unwrap(),
            Some(AnswerValue::Scale(2))
        );
        assert_eq!(store.get_answer(&block.id, 0), Some(&AnswerValue::Scale(5)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let block = block();
        let mut store = AnswerStore::new();
        store.set_answer(&block, 0, AnswerValue::Scale(3)).unwrap();
        store.set_answer(&block, 1, AnswerValue::Text("because".into())).unwrap();
        store.set_answer(&block, 2, AnswerValue::Choice("A".into())).unwrap();

        let json = store.to_json().unwrap();
        assert_eq!(AnswerStore::from_json(&json).unwrap(), store);
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(AnswerValue::parse(QuestionKind::Scale, " 4 "), Ok(AnswerValue::Scale(4)));
        assert!(AnswerValue::parse(QuestionKind::Scale, "four").is_err());
        assert_eq!(
            AnswerValue::parse(QuestionKind::MultipleChoice, "A"),
            Ok(AnswerValue::Choice("A".into()))
        );
    }

    #[test]
    fn test_remove_block_drops_answers() {
        let block = block();
        let mut store = AnswerStore::new();
        store.set_answer(&block, 0, AnswerValue::Scale(3)).unwrap();
        store.set_answer(&block, 1, AnswerValue::Text("x".into())).unwrap();
        assert_eq!(store.remove_block(&block.id), 2);
        assert!(store.is_empty());
    }
}
