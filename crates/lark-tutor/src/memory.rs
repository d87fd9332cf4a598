//! Short-term conversational memory and derived personalization settings.
//!
//! The tracker retains the last three user/assistant exchanges and
//! re-derives [`PersonalizationSettings`] from their concatenated text on
//! every write. Derivation is an ordered list of pattern-matchers evaluated
//! in fixed priority; a field only moves when the retained window contains
//! a matching cue, so earlier derivations persist until they age out.

use std::fmt::Write as _;
use std::sync::LazyLock;

use lark_types::{Difficulty, Exchange, PersonalizationSettings, TutorStatus};
use regex::Regex;

/// How many exchanges the rolling window retains.
const DEFAULT_MAX_EXCHANGES: usize = 3;

/// Name-introduction patterns, checked in priority order; the first pattern
/// with a match anywhere in the window wins.
static NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"my name is (\w+)",
        r"i am (\w+)",
        r"i'm (\w+)",
        r"call me (\w+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid name pattern"))
    .collect()
});

/// Focus-letter mentions; the last occurrence in the window wins.
static FOCUS_LETTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bletter ([a-z])\b").expect("invalid focus letter pattern"));

/// Cue words that move difficulty. The polarity is intentionally the one
/// observed in production: struggle words drop to easy, ease words step up
/// to medium.
const SIMPLIFY_CUES: [&str; 3] = ["hard", "difficult", "tough"];
const CHALLENGE_CUES: [&str; 3] = ["easy", "simple", "more"];

/// Rolling memory for one tutoring session.
///
/// Exclusively owns the exchange buffer and the settings derived from it.
#[derive(Debug, Clone)]
pub struct MemoryTracker {
    max_exchanges: usize,
    exchanges: Vec<Exchange>,
    settings: PersonalizationSettings,
    total_recorded: u64,
}

impl Default for MemoryTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXCHANGES)
    }
}

impl MemoryTracker {
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            max_exchanges,
            exchanges: Vec::new(),
            settings: PersonalizationSettings::default(),
            total_recorded: 0,
        }
    }

    /// Records a new user/assistant exchange.
    ///
    /// Appends the exchange, evicts the oldest entries beyond the window,
    /// and re-derives the personalization settings. Always succeeds.
    pub fn record(&mut self, user_text: &str, assistant_text: &str) {
        self.exchanges.push(Exchange::new(user_text, assistant_text));

        if self.exchanges.len() > self.max_exchanges {
            let excess = self.exchanges.len() - self.max_exchanges;
            self.exchanges.drain(..excess);
        }

        self.total_recorded += 1;
        self.derive_settings();
    }

    /// Fills the most recent exchange's assistant slot once the deferred
    /// reply is known, then re-derives settings from the completed text.
    ///
    /// A reply that was already recorded is never overwritten.
    pub fn fill_pending_reply(&mut self, assistant_text: &str) {
        let reply = assistant_text.trim();
        if reply.is_empty() {
            return;
        }

        if let Some(last) = self.exchanges.last_mut() {
            if last.assistant_text.is_empty() {
                last.assistant_text = reply.to_string();
                self.derive_settings();
            }
        }
    }

    fn derive_settings(&mut self) {
        let recent_text = self
            .exchanges
            .iter()
            .map(|ex| format!("{} {}", ex.user_text, ex.assistant_text))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        for pattern in NAME_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(&recent_text) {
                self.settings.child_name = Some(title_case(&caps[1]));
                break;
            }
        }

        if let Some(caps) = FOCUS_LETTER_PATTERN.captures_iter(&recent_text).last() {
            if let Some(letter) = caps.get(1).and_then(|m| m.as_str().chars().next()) {
                self.settings.focus_letter = Some(letter.to_ascii_uppercase());
            }
        }

        if SIMPLIFY_CUES.iter().any(|cue| recent_text.contains(cue)) {
            self.settings.difficulty = Difficulty::Easy;
        } else if CHALLENGE_CUES.iter().any(|cue| recent_text.contains(cue)) {
            self.settings.difficulty = Difficulty::Medium;
        }
    }

    /// Formats the retained exchanges and current settings as the memory
    /// block injected into the tutoring instructions.
    ///
    /// Pure formatting; returns an empty string before the first exchange.
    pub fn build_context_summary(&self) -> String {
        if self.exchanges.is_empty() {
            return String::new();
        }

        let mut context = String::from("\n=== RECENT CONVERSATION MEMORY ===\n");
        for (i, exchange) in self.exchanges.iter().enumerate() {
            let _ = writeln!(context, "Exchange {}:", i + 1);
            let _ = writeln!(context, "Child: {}", exchange.user_text);
            if !exchange.assistant_text.is_empty() {
                let _ = writeln!(context, "You: {}", exchange.assistant_text);
            }
            context.push('\n');
        }

        context.push_str("=== PERSONALIZATION SETTINGS ===\n");
        if let Some(name) = &self.settings.child_name {
            let _ = writeln!(context, "Child's name: {}", name);
        }
        if let Some(letter) = self.settings.focus_letter {
            let _ = writeln!(context, "Current focus letter: {}", letter);
        }
        let _ = writeln!(context, "Difficulty level: {}", self.settings.difficulty);
        context.push_str("====================================\n\n");

        context
    }

    pub fn settings(&self) -> &PersonalizationSettings {
        &self.settings
    }

    /// The retained window, oldest first.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Snapshot for the monitoring surface.
    pub fn status_snapshot(&self, current_activity: Option<&str>) -> TutorStatus {
        TutorStatus {
            exchanges: self.exchanges.clone(),
            settings: self.settings.clone(),
            current_activity: current_activity.map(str::to_string),
            total_exchange_count: self.total_recorded,
        }
    }
}

/// Uppercases the first character and lowercases the rest, matching how a
/// captured name token is normalized for display.
fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
