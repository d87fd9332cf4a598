//! Per-session tutoring orchestration.
//!
//! A [`TutorSession`] wires one conversation router to one room connection
//! and one synthesis chain. Sessions are independent, own all of their
//! mutable state, and are looked up by id in the [`SessionRegistry`] — there
//! is no process-global active room.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use lark_tutor::{prompt, ConversationRouter};
use lark_types::{SpokenMessage, TutorStatus};
use lark_voice::{SpeechSynthesizer, TutorRoomClient};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

/// How many spoken messages a session retains for UI display.
const RECENT_MESSAGE_CAP: usize = 10;

/// Outcome of routing one utterance, as reported to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct UtteranceOutcome {
    /// The spoken reply (phonics feedback, or the conversational fallback).
    pub reply: String,
    /// Whether the reply came from the phonics engine rather than the
    /// conversational fallback.
    pub phonics_reply: bool,
    /// The activity the child is currently working on, if any.
    pub activity: Option<String>,
}

/// One live tutoring session.
pub struct TutorSession {
    pub id: String,
    pub child_name: String,
    pub room_name: String,
    router: Mutex<ConversationRouter>,
    /// Room connection; `None` in text-only mode.
    voice: tokio::sync::Mutex<Option<TutorRoomClient>>,
    /// Admits one utterance to completion at a time.
    turn_lock: tokio::sync::Mutex<()>,
    recent_messages: Mutex<VecDeque<SpokenMessage>>,
    active: AtomicBool,
    synthesizer: Arc<SpeechSynthesizer>,
    base_instructions: String,
}

impl TutorSession {
    pub fn new(
        id: String,
        child_name: String,
        room_name: String,
        synthesizer: Arc<SpeechSynthesizer>,
    ) -> Self {
        let base_instructions = prompt::base_instructions(&child_name);
        Self {
            id,
            child_name,
            room_name,
            router: Mutex::new(ConversationRouter::new()),
            voice: tokio::sync::Mutex::new(None),
            turn_lock: tokio::sync::Mutex::new(()),
            recent_messages: Mutex::new(VecDeque::new()),
            active: AtomicBool::new(true),
            synthesizer,
            base_instructions,
        }
    }

    /// Attaches a connected room client and starts draining its
    /// transcriptions into the router.
    pub async fn attach_voice(session: &Arc<Self>, client: TutorRoomClient) {
        let mut rx = client.subscribe_transcriptions();
        *session.voice.lock().await = Some(client);

        let session = Arc::clone(session);
        tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                if !session.is_active() {
                    break;
                }
                debug!(
                    session_id = %session.id,
                    speaker = %event.speaker_identity,
                    "transcription received"
                );
                let outcome = session.process_utterance(&event.text).await;
                session.speak(&outcome.reply).await;
            }
        });
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Routes one utterance to completion and produces the reply to speak.
    ///
    /// Phonics-specific utterances get their feedback straight from the
    /// router; everything else records to memory and falls back to simple
    /// scripted conversation, which is written back as the deferred reply.
    /// An LLM collaborator would slot in exactly where the fallback is,
    /// using [`lark_tutor::prompt::personalized_instructions`].
    pub async fn process_utterance(&self, text: &str) -> UtteranceOutcome {
        let _turn = self.turn_lock.lock().await;

        let mut router = self.router.lock().unwrap_or_else(|e| e.into_inner());
        let mut rng = StdRng::from_entropy();

        if let Some(feedback) = router.handle_utterance(text, &mut rng) {
            return UtteranceOutcome {
                reply: feedback,
                phonics_reply: true,
                activity: router.current_activity().map(str::to_string),
            };
        }

        // This is where an LLM collaborator would generate the reply from
        // the personalized instructions; the scripted fallback stands in.
        let instructions = prompt::personalized_instructions(
            &self.base_instructions,
            router.memory(),
            router.current_activity(),
        );
        debug!(
            session_id = %self.id,
            instruction_chars = instructions.len(),
            "assembled instructions for conversational generation"
        );

        let reply = fallback_reply(text);
        router.complete_reply(&reply);
        UtteranceOutcome {
            reply,
            phonics_reply: false,
            activity: router.current_activity().map(str::to_string),
        }
    }

    /// Speaks a line: records it for UI display, synthesizes it, and
    /// publishes the audio to the room. Synthesis or publish failures
    /// degrade to text-only with a warning; the message is already stored.
    pub async fn speak(&self, text: &str) {
        info!(session_id = %self.id, "tutor saying: {}", text);
        self.push_message(text);

        let audio = match self.synthesizer.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "no speech output available, message stored for display");
                return;
            }
        };

        let voice = self.voice.lock().await;
        match voice.as_ref() {
            Some(client) => {
                if let Err(e) = client.publish_audio(&audio).await {
                    warn!(session_id = %self.id, error = %e, "failed to publish audio");
                }
            }
            None => {
                debug!(session_id = %self.id, "text-only session, skipping audio publish");
            }
        }
    }

    /// The greeting spoken when the session starts.
    pub fn greeting(&self) -> String {
        format!(
            "Hello {}! I'm Lark, your phonics tutor. Are you ready to practice some letters today?",
            self.child_name
        )
    }

    /// Stops the session: marks it inactive and disconnects from the room.
    pub async fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(mut client) = self.voice.lock().await.take() {
            client.disconnect().await;
        }
        info!(session_id = %self.id, "session stopped");
    }

    /// Conversational-state snapshot for the monitoring surface.
    pub fn tutor_status(&self) -> TutorStatus {
        self.router
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .status()
    }

    /// The most recent spoken messages, oldest first, capped at `limit`.
    pub fn recent_messages(&self, limit: usize) -> Vec<SpokenMessage> {
        let messages = self
            .recent_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let skip = messages.len().saturating_sub(limit);
        messages.iter().skip(skip).cloned().collect()
    }

    fn push_message(&self, text: &str) {
        let mut messages = self
            .recent_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        messages.push_back(SpokenMessage::now(text));
        while messages.len() > RECENT_MESSAGE_CAP {
            messages.pop_front();
        }
    }
}

/// Scripted conversational replies for turns the phonics engine does not
/// claim. Stands in for the LLM collaborator so text-only sessions still
/// converse.
fn fallback_reply(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    if lowered.contains("hello") || lowered.contains("hi ") || lowered == "hi" {
        "Hello there! I'm so happy to hear your voice! Should we practice some letters together? \
         Let's start with the letter A!"
            .to_string()
    } else if lowered.contains("help") {
        "Of course I can help! Let's practice letters and sounds. Can you say the letter A for me?"
            .to_string()
    } else if lowered.contains("learn") {
        "Wonderful! I love helping children learn! Let's practice the alphabet. \
         Can you say the letter B?"
            .to_string()
    } else {
        "I heard you! That's great speaking! Let's practice a letter. Can you say the letter A?"
            .to_string()
    }
}

/// All live sessions, keyed by session id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<TutorSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<TutorSession>) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session.id.clone(), session);
    }

    pub fn get(&self, id: &str) -> Option<Arc<TutorSession>> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<TutorSession>> {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
    }

    pub fn list(&self) -> Vec<Arc<TutorSession>> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lark_voice::SpeechConfig;

    fn session() -> Arc<TutorSession> {
        Arc::new(TutorSession::new(
            "s-1".to_string(),
            "Emma".to_string(),
            "phonics-s-1".to_string(),
            Arc::new(SpeechSynthesizer::new(SpeechConfig::default())),
        ))
    }

    #[tokio::test]
    async fn phonics_utterance_gets_phonics_reply() {
        let session = session();
        let outcome = session.process_utterance("b").await;
        assert!(outcome.phonics_reply);
        assert!(outcome.reply.contains('B'));
    }

    #[tokio::test]
    async fn conversational_utterance_gets_fallback_and_fills_reply() {
        let session = session();
        let outcome = session.process_utterance("hello").await;
        assert!(!outcome.phonics_reply);
        assert!(outcome.reply.contains("Hello there"));

        let status = session.tutor_status();
        assert_eq!(status.exchanges.len(), 1);
        assert_eq!(status.exchanges[0].assistant_text, outcome.reply);
    }

    #[tokio::test]
    async fn focus_letter_yields_an_activity_in_the_outcome() {
        let session = session();
        let outcome = session.process_utterance("teach me letter c").await;
        assert!(outcome.activity.is_some());
        assert!(outcome.activity.unwrap().contains('C'));
    }

    #[tokio::test]
    async fn recent_messages_are_capped_and_ordered() {
        let session = session();
        for i in 0..15 {
            session.push_message(&format!("line {}", i));
        }

        let all = session.recent_messages(usize::MAX);
        assert_eq!(all.len(), RECENT_MESSAGE_CAP);
        assert_eq!(all.first().unwrap().text, "line 5");
        assert_eq!(all.last().unwrap().text, "line 14");

        let last_five = session.recent_messages(5);
        assert_eq!(last_five.len(), 5);
        assert_eq!(last_five.first().unwrap().text, "line 10");
    }

    #[tokio::test]
    async fn stop_marks_inactive() {
        let session = session();
        assert!(session.is_active());
        session.stop().await;
        assert!(!session.is_active());
    }

    #[test]
    fn registry_insert_get_remove() {
        let registry = SessionRegistry::new();
        let session = session();
        registry.insert(Arc::clone(&session));

        assert!(registry.get("s-1").is_some());
        assert_eq!(registry.list().len(), 1);
        assert!(registry.remove("s-1").is_some());
        assert!(registry.get("s-1").is_none());
    }

    #[test]
    fn fallback_reply_is_contextual() {
        assert!(fallback_reply("hello!").contains("happy to hear"));
        assert!(fallback_reply("can you help me").contains("Of course"));
        assert!(fallback_reply("I want to learn").contains("alphabet"));
        assert!(fallback_reply("bananas").contains("letter A"));
    }
}
