//! Voice profile definitions for speech synthesis.
//!
//! A `VoiceProfile` maps a logical ID to a synthesis provider and its
//! parameters. The default profile targets the hosted provider and falls
//! back to the system engine when no API key is configured.

use serde::{Deserialize, Serialize};

/// Supported speech synthesis providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechProvider {
    /// ElevenLabs hosted TTS (HTTP API, high quality).
    #[default]
    ElevenLabs,
    /// System TTS (OS-provided engine, always available).
    System,
}

/// A voice profile configuration.
///
/// Defines how the tutor's voice sounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Unique identifier for the voice profile.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// The synthesis provider.
    pub provider: SpeechProvider,
    /// Provider-side voice identifier (ElevenLabs voice ID).
    pub voice_id: String,
    /// Voice stability (0.0..=1.0, provider-interpreted).
    pub stability: f32,
    /// Similarity boost (0.0..=1.0, provider-interpreted).
    pub similarity_boost: f32,
    /// Speech speed multiplier (1.0 is normal).
    pub speed: f32,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: "Tutor Voice".to_string(),
            provider: SpeechProvider::ElevenLabs,
            voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
            stability: 0.5,
            similarity_boost: 0.5,
            speed: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_serializes_snake_case() {
        let json = serde_json::to_string(&SpeechProvider::ElevenLabs).unwrap();
        assert_eq!(json, r#""eleven_labs""#);
        let json = serde_json::to_string(&SpeechProvider::System).unwrap();
        assert_eq!(json, r#""system""#);
    }

    #[test]
    fn default_profile_targets_hosted_provider() {
        let profile = VoiceProfile::default();
        assert_eq!(profile.provider, SpeechProvider::ElevenLabs);
        assert!(!profile.voice_id.is_empty());
    }
}
