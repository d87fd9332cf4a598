//! Shared types for the Lark phonics tutor.
//!
//! This crate provides the foundational types used across all Lark crates:
//! the tutoring session records (exchanges, personalization settings,
//! status snapshots) and the voice profile types that configure speech
//! synthesis.
//!
//! No crate in the workspace depends on anything *except* `lark-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

pub mod voice;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use voice::{SpeechProvider, VoiceProfile};

/// One recorded user utterance paired with the assistant's reply.
///
/// The reply may be recorded empty and filled in later, once the deferred
/// conversational generation completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// When the utterance was recorded.
    pub timestamp: DateTime<Utc>,
    /// What the child said.
    pub user_text: String,
    /// What the assistant said back. Empty until the reply is known.
    pub assistant_text: String,
}

impl Exchange {
    /// Creates an exchange stamped with the current time. Both sides are
    /// whitespace-trimmed on entry.
    pub fn new(user_text: &str, assistant_text: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            user_text: user_text.trim().to_string(),
            assistant_text: assistant_text.trim().to_string(),
        }
    }
}

/// Difficulty tier controlling activity complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Returns the canonical lowercase label for this tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown difficulty label.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown difficulty: {0}")]
pub struct ParseDifficultyError(pub String);

impl std::str::FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// Settings derived from recent conversation, used to personalize teaching.
///
/// Re-derived from the retained exchange window on every record; fields only
/// move when the window contains a matching cue, so earlier derivations
/// persist until they are contradicted or age out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalizationSettings {
    /// The child's name, when they have introduced themselves.
    pub child_name: Option<String>,
    /// The letter currently being taught. Always `A..=Z` when set.
    pub focus_letter: Option<char>,
    /// Current difficulty tier.
    pub difficulty: Difficulty,
}

/// Monitoring snapshot of a tutoring session's conversational state.
///
/// Served by the control panel's status endpoint for UI display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorStatus {
    /// The retained exchange window (most recent three, oldest first).
    pub exchanges: Vec<Exchange>,
    /// Settings derived from the retained window.
    pub settings: PersonalizationSettings,
    /// The activity the child is currently working on, if any.
    pub current_activity: Option<String>,
    /// Every exchange ever recorded, including those evicted from the window.
    pub total_exchange_count: u64,
}

/// A line the agent has spoken (or fallen back to displaying as text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokenMessage {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl SpokenMessage {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_round_trips_through_labels() {
        for tier in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let parsed: Difficulty = tier.as_str().parse().unwrap();
            assert_eq!(parsed, tier);
        }
    }

    #[test]
    fn difficulty_rejects_unknown_labels() {
        let err = "impossible".parse::<Difficulty>().unwrap_err();
        assert_eq!(err, ParseDifficultyError("impossible".to_string()));
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, r#""medium""#);
    }

    #[test]
    fn exchange_trims_both_sides() {
        let ex = Exchange::new("  hello  ", " hi there\n");
        assert_eq!(ex.user_text, "hello");
        assert_eq!(ex.assistant_text, "hi there");
    }

    #[test]
    fn default_settings_start_easy_and_unset() {
        let settings = PersonalizationSettings::default();
        assert_eq!(settings.child_name, None);
        assert_eq!(settings.focus_letter, None);
        assert_eq!(settings.difficulty, Difficulty::Easy);
    }
}
