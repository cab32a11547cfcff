//! Configuration constants for the battleground client
//!
//! This module contains the limits and constraints used throughout the
//! synchronization engine to ensure data integrity and provide consistent
//! boundaries for arenas, participants, battles, and wars.

/// Arena (question set) configuration constants
pub mod arena {
    /// Maximum number of questions allowed in a single arena
    pub const MAX_QUESTION_COUNT: usize = 200;
    /// Maximum length of an arena name in characters
    pub const MAX_NAME_LENGTH: usize = 200;
    /// Maximum length of a question text in characters
    pub const MAX_TEXT_LENGTH: usize = 500;
    /// Minimum number of answer options for a question
    pub const MIN_OPTION_COUNT: usize = 2;
    /// Maximum number of answer options for a question
    pub const MAX_OPTION_COUNT: usize = 8;
    /// Maximum length of a single answer option in characters
    pub const MAX_OPTION_LENGTH: usize = 200;
}

/// Participant profile configuration constants
pub mod participant {
    /// Maximum length of a participant's display name
    pub const MAX_NAME_LENGTH: usize = 100;
}

/// War (N-way competition) configuration constants
pub mod war {
    /// Minimum number of participants a war can be created for
    pub const MIN_PARTICIPANTS: usize = 2;
    /// Maximum number of participants a war can be created for
    pub const MAX_PARTICIPANTS: usize = 100;
    /// Seconds between authoritative war-details polls while in the lobby
    pub const POLL_INTERVAL_SECS: u64 = 3;
}

/// Leaderboard display constants
pub mod leaderboard {
    /// Number of standings shown on the live war leaderboard
    pub const TOP_LIMIT: usize = 10;
}
