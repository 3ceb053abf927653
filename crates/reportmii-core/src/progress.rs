//! Completion evaluator.
//!
//! Decides whether questions and blocks are answered and derives the overall
//! completion percentage across active blocks.

use serde::{Deserialize, Serialize};

use crate::answers::{is_answered, AnswerStore};
use crate::blocks::Block;

/// Answered/total counts for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProgress {
    pub answered: usize,
    pub total: usize,
    pub complete: bool,
}

fn answered_count(block: &Block, store: &AnswerStore) -> usize {
    block
        .questions
        .iter()
        .enumerate()
        .filter(|(i, q)| {
            store
                .get_answer(&block.id, *i)
                .is_some_and(|v| is_answered(q, v))
        })
        .count()
}

/// True iff every question of the block has a valid answer.
pub fn is_block_complete(block: &Block, store: &AnswerStore) -> bool {
    answered_count(block, store) == block.questions.len()
}

pub fn block_progress(block: &Block, store: &AnswerStore) -> BlockProgress {
    let answered = answered_count(block, store);
    BlockProgress {
        answered,
        total: block.questions.len(),
        complete: answered == block.questions.len(),
    }
}

/// True iff every question of every given block is answered.
///
/// Gates use this rather than [`progress`], which rounds.
pub fn all_answered<'a, I>(blocks: I, store: &AnswerStore) -> bool
where
    I: IntoIterator<Item = &'a Block>,
{
    blocks.into_iter().all(|block| is_block_complete(block, store))
}

/// Percentage (0-100) of answered questions over the given blocks.
///
/// Callers pass the active blocks; the result does not depend on their order.
/// With no questions at all the progress is 0.
pub fn progress<'a, I>(blocks: I, store: &AnswerStore) -> u8
where
    I: IntoIterator<Item = &'a Block>,
{
    let (answered, total) = blocks.into_iter().fold((0usize, 0usize), |(a, t), block| {
        (a + answered_count(block, store), t + block.questions.len())
    });

    if total == 0 {
        return 0;
    }
    ((answered as f64 * 100.0 / total as f64).round() as u8).min(100)
}
