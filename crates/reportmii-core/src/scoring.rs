//! Block scores, severity buckets and the finished analysis report.
//!
//! A block's score is the mean of its primary scale answers mapped onto 0-100.
//! Blocks without any primary answer have no score at all rather than 0, so a
//! half-filled analysis never looks worse than it is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::answers::{AnswerStore, SCALE_MAX};
use crate::blocks::Block;
use crate::catalog::QuestionKind;
use crate::progress::block_progress;
use crate::wizard::{ReportDesign, WizardSession};

/// Score of a block in percent, or `None` when no primary question is answered.
pub fn block_score(block: &Block, store: &AnswerStore) -> Option<u8> {
    let values: Vec<u8> = store
        .block_answers(&block.id)
        .filter(|(i, _)| {
            block
                .question(*i)
                .is_some_and(|q| q.is_primary && q.kind == QuestionKind::Scale)
        })
        .filter_map(|(_, v)| v.as_scale())
        .collect();

    if values.is_empty() {
        return None;
    }
    let average = values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64;
    Some((average / f64::from(SCALE_MAX) * 100.0).round() as u8)
}

/// Six-tier severity ladder for a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBucket {
    VeryPoor,
    Poor,
    Fair,
    Moderate,
    Good,
    VeryGood,
}

/// Inclusive upper bounds, ascending. Anything above the last bound is `VeryGood`.
const BUCKET_LADDER: [(u8, ScoreBucket); 5] = [
    (10, ScoreBucket::VeryPoor),
    (25, ScoreBucket::Poor),
    (40, ScoreBucket::Fair),
    (60, ScoreBucket::Moderate),
    (80, ScoreBucket::Good),
];

pub fn score_bucket(percentage: u8) -> ScoreBucket {
    BUCKET_LADDER
        .iter()
        .find(|(upper, _)| percentage <= *upper)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(ScoreBucket::VeryGood)
}

impl ScoreBucket {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBucket::VeryPoor => "very poor",
            ScoreBucket::Poor => "poor",
            ScoreBucket::Fair => "fair",
            ScoreBucket::Moderate => "moderate",
            ScoreBucket::Good => "good",
            ScoreBucket::VeryGood => "very good",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ScoreBucket::VeryPoor => "😫",
            ScoreBucket::Poor => "😟",
            ScoreBucket::Fair => "😐",
            ScoreBucket::Moderate => "🙂",
            ScoreBucket::Good => "😊",
            ScoreBucket::VeryGood => "🤩",
        }
    }
}

/// Report line for one active block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReport {
    pub block_id: String,
    pub title: String,
    pub score: Option<u8>,
    pub bucket: Option<ScoreBucket>,
    pub answered: usize,
    pub total: usize,
}

/// Rendered result of an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: String,
    pub name: String,
    pub design: Option<ReportDesign>,
    pub blocks: Vec<BlockReport>,
    /// Mean of the defined block scores.
    pub overall_score: Option<u8>,
    pub overall_bucket: Option<ScoreBucket>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn build(session: &WizardSession) -> Self {
        let blocks: Vec<BlockReport> = session
            .blocks()
            .active()
            .map(|block| {
                let score = block_score(block, session.answers());
                let progress = block_progress(block, session.answers());
                BlockReport {
                    block_id: block.id.clone(),
                    title: block.title.clone(),
                    score,
                    bucket: score.map(score_bucket),
                    answered: progress.answered,
                    total: progress.total,
                }
            })
            .collect();

        let scored: Vec<u32> = blocks.iter().filter_map(|b| b.score).map(u32::from).collect();
        let overall_score = if scored.is_empty() {
            None
        } else {
            Some((scored.iter().sum::<u32>() as f64 / scored.len() as f64).round() as u8)
        };

        Self {
            analysis_id: session.analysis_id().to_string(),
            name: session.basic_info().name.clone(),
            design: session.design(),
            blocks,
            overall_score,
            overall_bucket: overall_score.map(score_bucket),
            generated_at: Utc::now(),
        }
    }

    /// Plain-text rendering for terminals and e-mail bodies.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Analysis: {}", self.name);
        if let Some(design) = self.design {
            let _ = writeln!(out, "Design:   {design}");
        }
        match (self.overall_score, self.overall_bucket) {
            (Some(score), Some(bucket)) => {
                let _ = writeln!(out, "Overall:  {score}% {} ({})", bucket.emoji(), bucket.label());
            }
            _ => {
                let _ = writeln!(out, "Overall:  not enough answers");
            }
        }
        out.push('\n');

        let width = self.blocks.iter().map(|b| b.title.chars().count()).max().unwrap_or(0);
        for block in &self.blocks {
            let score = match (block.score, block.bucket) {
                (Some(s), Some(b)) => format!("{s:>3}% {} {}", b.emoji(), b.label()),
                _ => "  -".to_string(),
            };
            let _ = writeln!(
                out,
                "  {:<width$}  {}  [{}/{}]",
                block.title, score, block.answered, block.total
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerValue;
    use crate::catalog::Question;

    fn block() -> Block {
        Block::custom(
            "Sales",
            vec![
                Question::scale("A"),
                Question::scale("B"),
                Question {
                    is_primary: false,
                    ..Question::scale("context rating")
                },
                Question::text("Notes"),
            ],
        )
    }

    #[test]
    fn test_no_primary_answers_means_no_score() {
        let block = block();
        let mut store = AnswerStore::new();
        assert_eq!(block_score(&block, &store), None);

        // supplementary answers alone do not produce a score
        store.set_answer(&block, 2, AnswerValue::Scale(5)).unwrap();
        store.set_answer(&block, 3, AnswerValue::Text("fine".into())).unwrap();
        assert_eq!(block_score(&block, &store), None);
    }

    #[test]
    fn test_average_four_is_eighty() {
        let block = block();
        let mut store = AnswerStore::new();
        store.set_answer(&block, 0, AnswerValue::Scale(3)).unwrap();
        store.set_answer(&block, 1, AnswerValue::Scale(5)).unwrap();
        store.set_answer(&block, 2, AnswerValue::Scale(1)).unwrap();
        assert_eq!(block_score(&block, &store), Some(80));
    }

    #[test]
    fn test_partial_primary_answers_score() {
        let block = block();
        let mut store = AnswerStore::new();
        store.set_answer(&block, 1, AnswerValue::Scale(2)).unwrap();
        assert_eq!(block_score(&block, &store), Some(40));
    }

    #[test]
    fn test_bucket_thresholds_are_inclusive() {
        assert_eq!(score_bucket(0), ScoreBucket::VeryPoor);
        assert_eq!(score_bucket(10), ScoreBucket::VeryPoor);
        assert_eq!(score_bucket(11), ScoreBucket::Poor);
        assert_eq!(score_bucket(25), ScoreBucket::Poor);
        assert_eq!(score_bucket(40), ScoreBucket::Fair);
        assert_eq!(score_bucket(41), ScoreBucket::Moderate);
        assert_eq!(score_bucket(60), ScoreBucket::Moderate);
        assert_eq!(score_bucket(80), ScoreBucket::Good);
        assert_eq!(score_bucket(81), ScoreBucket::VeryGood);
        assert_eq!(score_bucket(100), ScoreBucket::VeryGood);
    }

    #[test]
    fn test_buckets_are_ordered() {
        let mut last = score_bucket(0);
        for pct in 1..=100 {
            let bucket = score_bucket(pct);
            assert!(bucket >= last);
            last = bucket;
        }
        assert_eq!(ScoreBucket::VeryGood.label(), "very good");
    }
}
