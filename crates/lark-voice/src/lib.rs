//! Voice infrastructure for the Lark phonics tutor.
//!
//! Integrates with LiveKit for WebRTC voice transport, renders the tutor's
//! replies to audio with a provider fallback chain (hosted synthesis first,
//! system engine second), and transcribes the child's speech back to text
//! for the conversational core.
//!
//! The architecture separates concerns: the child speaks via WebRTC, the
//! tutor sends text that is rendered to audio by this crate, and incoming
//! speech is transcribed to text before it reaches the conversation router.
//! Nothing in the tutor core performs I/O; it all lives here.

pub mod client;
pub mod config;
pub mod error;
pub mod room;
pub mod stt;
pub mod tts;

pub use client::{TranscriptionEvent, TutorRoomClient};
pub use config::{LiveKitConfig, SpeechConfig};
pub use error::VoiceError;
pub use room::RoomService;
pub use stt::TranscriberService;
pub use tts::SpeechSynthesizer;
