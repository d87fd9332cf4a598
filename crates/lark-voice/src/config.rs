use lark_types::VoiceProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_token_ttl_seconds() -> u64 {
    3600
}

fn default_model_id() -> String {
    "eleven_monolingual_v1".to_string()
}

/// LiveKit connection settings for the room service.
#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    /// Server-side LiveKit API URL.
    pub url: String,
    /// Browser-facing URL, when it differs from `url` (reverse proxies).
    #[serde(default)]
    pub public_url: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    /// JWT token TTL in seconds for LiveKit join tokens. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            public_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("public_url", &self.public_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            public_url: String::new(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

/// Speech synthesis settings for the provider fallback chain.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// ElevenLabs API key. Empty disables the hosted provider and the chain
    /// starts at the system engine.
    #[serde(default, skip_serializing)]
    pub elevenlabs_api_key: String,
    /// ElevenLabs model identifier.
    #[serde(default = "default_model_id")]
    pub elevenlabs_model_id: String,
    /// The voice profile used for synthesis.
    #[serde(default)]
    pub profile: VoiceProfile,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            elevenlabs_api_key: String::new(),
            elevenlabs_model_id: default_model_id(),
            profile: VoiceProfile::default(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("elevenlabs_api_key", &"[REDACTED]")
            .field("elevenlabs_model_id", &self.elevenlabs_model_id)
            .field("profile", &self.profile)
            .finish()
    }
}
