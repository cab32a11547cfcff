//! Arenas (question sets)
//!
//! An arena is the ordered list of questions a competition is fought over.
//! Arenas are authored elsewhere and fetched by id from the backend (see
//! [`crate::backend::ArenaSource`]); this module defines their shape,
//! validates them on load, and answers correctness queries for the local
//! progress tracker. Questions are immutable once loaded.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single multiple-choice question
///
/// Correctness of an answer is decided purely by comparing the selected
/// option index against `correct_index`; there is no server-side check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Stable identifier assigned by the authoring backend
    #[garde(skip)]
    pub id: String,
    /// The question text shown to participants
    #[garde(length(min = 1, max = crate::constants::arena::MAX_TEXT_LENGTH))]
    pub text: String,
    /// The ordered answer options
    #[garde(
        length(min = crate::constants::arena::MIN_OPTION_COUNT, max = crate::constants::arena::MAX_OPTION_COUNT),
        inner(length(max = crate::constants::arena::MAX_OPTION_LENGTH))
    )]
    pub options: Vec<String>,
    /// Index of the correct option within `options`
    #[garde(skip)]
    pub correct_index: usize,
}

impl Question {
    /// Returns whether the given option index is the correct answer
    pub fn is_correct(&self, option_index: usize) -> bool {
        self.correct_index == option_index
    }

    /// Returns the number of answer options
    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

/// An arena: a named, ordered question set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Arena {
    /// Stable identifier assigned by the authoring backend
    #[garde(skip)]
    pub id: String,
    /// The arena's display name
    #[garde(length(max = crate::constants::arena::MAX_NAME_LENGTH))]
    pub name: String,
    /// The questions, in play order
    #[garde(length(max = crate::constants::arena::MAX_QUESTION_COUNT), dive)]
    pub questions: Vec<Question>,
}

/// Errors detected when an arena is checked on load
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// A question's `correct_index` does not point at one of its options
    #[error("question {question_index} has correct index {correct_index} but only {option_count} options")]
    CorrectIndexOutOfBounds {
        /// Position of the offending question within the arena
        question_index: usize,
        /// The out-of-bounds correct index
        correct_index: usize,
        /// Number of options the question actually has
        option_count: usize,
    },
    /// Field-level validation failed (lengths, option counts)
    #[error("arena failed validation: {0}")]
    Invalid(String),
}

impl Arena {
    /// Checks the arena for structural soundness
    ///
    /// Runs field validation and verifies that every question's correct
    /// index is in bounds. Called once when a competition session is
    /// constructed; a failing arena never becomes a session.
    ///
    /// # Errors
    ///
    /// Returns an [`ArenaError`] describing the first problem found.
    pub fn check(&self) -> Result<(), ArenaError> {
        self.validate()
            .map_err(|report| ArenaError::Invalid(report.to_string()))?;

        for (question_index, question) in self.questions.iter().enumerate() {
            if question.correct_index >= question.option_count() {
                return Err(ArenaError::CorrectIndexOutOfBounds {
                    question_index,
                    correct_index: question.correct_index,
                    option_count: question.option_count(),
                });
            }
        }

        Ok(())
    }

    /// Returns the question at the given index, if any
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Returns the number of questions in the arena
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns whether the arena has no questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns the lightweight reference used in lobbies and listings
    pub fn to_ref(&self) -> ArenaRef {
        ArenaRef {
            id: self.id.clone(),
            name: self.name.clone(),
            question_count: self.len(),
        }
    }
}

/// A lightweight reference to an arena
///
/// Carried in invitations and lobby snapshots so both parties can show
/// what they are about to fight over without fetching the full question
/// set. The full arena is only loaded when the battle starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ArenaRef {
    /// The referenced arena's identifier
    #[garde(skip)]
    pub id: String,
    /// The arena's display name
    #[garde(length(max = crate::constants::arena::MAX_NAME_LENGTH))]
    pub name: String,
    /// How many questions the arena holds
    #[garde(skip)]
    pub question_count: usize,
}
