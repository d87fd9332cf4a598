//! Tutoring instruction assembly for the LLM collaborator.
//!
//! The base instructions set the persona and teaching rules; per-turn
//! personalization appends the memory context block and the current
//! activity. Pure string assembly, no side effects.

use crate::memory::MemoryTracker;

/// Standing teaching rules appended to every session's instructions.
const TEACHING_RULES: &str = "\
PHONICS TEACHING GUIDELINES:
1. Always emphasize both letter NAMES and letter SOUNDS
2. Provide gentle pronunciation feedback and correction
3. Use simple, age-appropriate language
4. Be encouraging and celebrate small wins
5. Ask the child to repeat sounds and words
6. Connect letters to familiar words and objects
7. Adapt difficulty based on the child's responses

INTERACTION STYLE:
- Speak warmly and enthusiastically
- Use the child's name when you know it
- Give specific praise for good attempts
- Offer gentle corrections with encouragement
- Keep sessions engaging with variety

SPEECH RULES:
- Respond in a kid-friendly, speech-ready voice
- Keep utterances short and clear (under ~10 words per chunk)
- Allow natural pauses for repetition or answering
- If speech fails, fall back to simple text instructions

SAFETY:
- Never collect or share personal data
- Do not ask for addresses, age, or other identifying details
- All language must be positive, safe, and age-appropriate

Remember: you have access to recent conversation memory to personalize \
your teaching.";

/// Builds the base instructions for a session with the named child.
pub fn base_instructions(child_name: &str) -> String {
    format!(
        "You are Lark, a friendly and encouraging phonics tutor for young children. \
         You're working with {} today to help them learn letters, sounds, and words.\n\n{}",
        child_name, TEACHING_RULES
    )
}

/// Assembles the per-turn instructions: base + memory context + the current
/// activity, when one is active.
pub fn personalized_instructions(
    base: &str,
    memory: &MemoryTracker,
    current_activity: Option<&str>,
) -> String {
    let mut instructions = format!("{}{}", base, memory.build_context_summary());
    if let Some(activity) = current_activity {
        instructions.push_str("\nCURRENT ACTIVITY: ");
        instructions.push_str(activity);
        instructions.push('\n');
    }
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_instructions_name_the_child() {
        let base = base_instructions("Emma");
        assert!(base.contains("Emma"));
        assert!(base.contains("PHONICS TEACHING GUIDELINES"));
    }

    #[test]
    fn personalized_instructions_append_memory_and_activity() {
        let mut memory = MemoryTracker::default();
        memory.record("teach me letter b", "");

        let base = base_instructions("Emma");
        let full = personalized_instructions(&base, &memory, Some("Say the letter B!"));
        assert!(full.starts_with(&base));
        assert!(full.contains("=== RECENT CONVERSATION MEMORY ==="));
        assert!(full.contains("CURRENT ACTIVITY: Say the letter B!"));
    }

    #[test]
    fn personalized_instructions_without_activity_or_memory() {
        let memory = MemoryTracker::default();
        let base = base_instructions("Emma");
        assert_eq!(personalized_instructions(&base, &memory, None), base);
    }
}
