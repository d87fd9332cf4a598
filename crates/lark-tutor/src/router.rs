//! Per-session utterance classification.
//!
//! The router is a simple rule-based classifier, not a state machine: an
//! utterance either earns an immediate phonics reply (single letter, or a
//! sound attempt while one is awaited) or is recorded for the downstream
//! conversational generation, possibly spawning a new activity.

use std::sync::LazyLock;

use lark_types::TutorStatus;
use rand::Rng;
use regex::Regex;
use tracing::debug;

use crate::memory::MemoryTracker;
use crate::phonics;

/// Phonetic-attempt shapes, checked in order once a pronunciation is
/// awaited: a consonant sound ("buh", "tuh", …) then any vowel sound.
static SOUND_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"([a-z])uh", r"([aeiou])([aeiou])?"]
        .iter()
        .map(|p| Regex::new(p).expect("invalid sound pattern"))
        .collect()
});

/// Routes one session's utterances between phonics feedback and memory.
///
/// Holds exactly one [`MemoryTracker`] and at most one current activity.
/// Callers admit one utterance at a time to completion; the router itself
/// never blocks.
#[derive(Debug, Default)]
pub struct ConversationRouter {
    memory: MemoryTracker,
    current_activity: Option<String>,
    awaiting_pronunciation: bool,
}

impl ConversationRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one incoming utterance.
    ///
    /// Returns the phonics reply when one applies (the exchange is already
    /// recorded with it); returns `None` when the caller should proceed with
    /// normal conversational generation, using [`Self::context_summary`] and
    /// [`Self::current_activity`] as auxiliary prompt context and filling
    /// the reply in later via [`Self::complete_reply`].
    pub fn handle_utterance(&mut self, text: &str, rng: &mut impl Rng) -> Option<String> {
        let lowered = text.trim().to_lowercase();

        // A bare letter is always treated as a pronunciation attempt.
        if let Some(letter) = single_letter(&lowered) {
            let feedback = phonics::feedback_for_letter(letter, &lowered);
            debug!(letter = %letter, "single-letter utterance, replying with feedback");
            self.memory.record(text, &feedback);
            self.awaiting_pronunciation = false;
            return Some(feedback);
        }

        if self.awaiting_pronunciation {
            for pattern in SOUND_PATTERNS.iter() {
                let letter = pattern
                    .captures(&lowered)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| m.as_str().chars().next());
                if let Some(letter) = letter {
                    let feedback = phonics::feedback_for_letter(letter, &lowered);
                    debug!(letter = %letter, "sound attempt while awaiting pronunciation");
                    self.memory.record(text, &feedback);
                    self.awaiting_pronunciation = false;
                    return Some(feedback);
                }
            }
        }

        // Conversational turn: record now, let the caller generate the reply.
        self.memory.record(text, "");

        let settings = self.memory.settings();
        if let (Some(letter), None) = (settings.focus_letter, self.current_activity.as_ref()) {
            let difficulty = settings.difficulty;
            let activity = phonics::activity_for(letter, difficulty, rng);
            debug!(letter = %letter, difficulty = %difficulty, activity = %activity, "generated activity");
            self.current_activity = Some(activity);
            // The activity asks the child to speak, so sound attempts are
            // interpreted as pronunciations until feedback is delivered.
            self.awaiting_pronunciation = true;
        }

        None
    }

    /// Fills in the deferred assistant reply for the last recorded exchange.
    pub fn complete_reply(&mut self, assistant_text: &str) {
        self.memory.fill_pending_reply(assistant_text);
    }

    pub fn current_activity(&self) -> Option<&str> {
        self.current_activity.as_deref()
    }

    /// Clears the current activity so the next focus letter spawns a new one.
    pub fn clear_activity(&mut self) {
        self.current_activity = None;
    }

    pub fn awaiting_pronunciation(&self) -> bool {
        self.awaiting_pronunciation
    }

    pub fn memory(&self) -> &MemoryTracker {
        &self.memory
    }

    /// The memory context block for the next LLM prompt.
    pub fn context_summary(&self) -> String {
        self.memory.build_context_summary()
    }

    /// Snapshot for the status/monitoring surface.
    pub fn status(&self) -> TutorStatus {
        self.memory.status_snapshot(self.current_activity.as_deref())
    }
}

/// Returns the character when the trimmed utterance is exactly one
/// alphabetic character.
fn single_letter(lowered: &str) -> Option<char> {
    let mut chars = lowered.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii_alphabetic() => Some(ch),
        _ => None,
    }
}
