//! Local progress tracking
//!
//! This module owns the local participant's answer state. The answer sheet
//! records one final answer per question (repeated or out-of-bounds
//! submissions are silently rejected), and the progress summary is derived
//! from it on every accepted answer. Everything here is pure and
//! synchronous; broadcasting the summary to peers is the session's job
//! (see [`crate::battle`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;

/// A derived snapshot of one participant's progress at a point in time
///
/// Invariants: `total_answered == correct + wrong`,
/// `remaining == total questions - total_answered`, and `accuracy_percent`
/// is the rounded percentage of correct answers (0 when nothing is
/// answered yet). Never mutated directly; always recomputed from the
/// answer sheet or received whole from a peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// Number of questions answered correctly
    pub correct: usize,
    /// Number of questions answered incorrectly
    pub wrong: usize,
    /// Number of questions not yet answered
    #[serde(rename = "left")]
    pub remaining: usize,
    /// Total number of questions answered so far
    pub total_answered: usize,
    /// Rounded percentage of answered questions that were correct
    #[serde(rename = "accuracy")]
    pub accuracy_percent: usize,
}

impl ProgressSummary {
    /// The summary of a participant who has not answered anything yet
    ///
    /// Published on entering a competition so peers can render a
    /// placeholder immediately instead of absence-of-data.
    pub fn zero(total_questions: usize) -> Self {
        Self {
            remaining: total_questions,
            ..Self::default()
        }
    }

    /// Returns whether every question has been answered
    pub fn finished(&self) -> bool {
        self.remaining == 0
    }

    /// Checks the summary's internal invariants
    ///
    /// Used at the channel boundary to reject malformed peer broadcasts
    /// before they reach the reconciler.
    pub fn is_consistent(&self) -> bool {
        self.total_answered == self.correct + self.wrong
            && self.accuracy_percent <= 100
            && (self.total_answered > 0 || self.accuracy_percent == 0)
    }
}

/// The local participant's answer record
///
/// Maps question index to the selected option index. A key is assigned at
/// most once: the first answer for a question is final.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerSheet {
    answers: HashMap<usize, usize>,
}

impl AnswerSheet {
    /// Creates an empty answer sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an answer and returns the recomputed summary
    ///
    /// Fails silently (no state change, returns `None`) if the question
    /// was already answered, the question index is out of bounds, or the
    /// option index is out of bounds for that question. The UI disables
    /// answered questions, but the sheet is defensive regardless.
    pub fn submit_answer(
        &mut self,
        arena: &Arena,
        question_index: usize,
        option_index: usize,
    ) -> Option<ProgressSummary> {
        let question = arena.question(question_index)?;
        if option_index >= question.option_count() {
            return None;
        }
        if self.answers.contains_key(&question_index) {
            return None;
        }

        self.answers.insert(question_index, option_index);
        Some(self.summary(arena))
    }

    /// Derives the current progress summary from the recorded answers
    ///
    /// Pure read; always consistent with the sheet's contents.
    pub fn summary(&self, arena: &Arena) -> ProgressSummary {
        let total = arena.len();
        let correct = self
            .answers
            .iter()
            .filter(|&(&question_index, &option_index)| {
                arena
                    .question(question_index)
                    .is_some_and(|q| q.is_correct(option_index))
            })
            .count();
        let total_answered = self.answers.len();
        let wrong = total_answered - correct;
        let accuracy_percent = if total_answered > 0 {
            ((correct as f64 / total_answered as f64) * 100.0).round() as usize
        } else {
            0
        };

        ProgressSummary {
            correct,
            wrong,
            remaining: total - total_answered,
            total_answered,
            accuracy_percent,
        }
    }

    /// Returns the recorded option index for a question, if answered
    pub fn selected(&self, question_index: usize) -> Option<usize> {
        self.answers.get(&question_index).copied()
    }

    /// Returns how many questions have been answered
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }
}
