//! Speech synthesis with provider fallback.
//!
//! The chain tries the hosted ElevenLabs API first (when a key is
//! configured) and falls back to the system `espeak-ng` engine, so a
//! session always has a voice even with no cloud credentials. Output is
//! raw PCM (s16le) ready for room publishing.

use crate::config::SpeechConfig;
use crate::error::VoiceError;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

/// Maximum text input size (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_SYNTH_INPUT_BYTES: usize = 64 * 1024;

/// Timeout for a single provider attempt.
const SYNTH_TIMEOUT: Duration = Duration::from_secs(60);

/// Size of the RIFF/WAVE header stripped from WAV output to get raw PCM.
const WAV_HEADER_BYTES: usize = 44;

/// Service for generating speech from text.
#[derive(Debug, Clone)]
pub struct SpeechSynthesizer {
    config: SpeechConfig,
    http: reqwest::Client,
}

impl SpeechSynthesizer {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Synthesizes speech for the given text, walking the provider chain.
    ///
    /// Returns raw PCM audio data. A hosted-provider failure is logged and
    /// the chain continues; the error of the last provider is returned only
    /// when every provider fails, at which point the caller degrades to
    /// text-only output.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if text.len() > MAX_SYNTH_INPUT_BYTES {
            return Err(VoiceError::Synthesis(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_SYNTH_INPUT_BYTES
            )));
        }

        if !self.config.elevenlabs_api_key.is_empty() {
            match self.synthesize_elevenlabs(text).await {
                Ok(audio) => return Ok(audio),
                Err(e) => {
                    warn!(error = %e, "hosted synthesis failed, falling back to system engine");
                }
            }
        }

        self.synthesize_system(text).await
    }

    /// Synthesizes via the ElevenLabs streaming endpoint.
    ///
    /// Requests WAV output and strips the header to return raw PCM.
    async fn synthesize_elevenlabs(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}/stream",
            self.config.profile.voice_id
        );

        let body = serde_json::json!({
            "text": text,
            "model_id": self.config.elevenlabs_model_id,
            "voice_settings": {
                "stability": self.config.profile.stability,
                "similarity_boost": self.config.profile.similarity_boost,
            }
        });

        let response = self
            .http
            .post(&url)
            .header(ACCEPT, "audio/wav")
            .header(CONTENT_TYPE, "application/json")
            .header("xi-api-key", &self.config.elevenlabs_api_key)
            .json(&body)
            .timeout(SYNTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| VoiceError::Synthesis(format!("ElevenLabs request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(VoiceError::Synthesis(format!(
                "ElevenLabs API error: {} - {}",
                status, detail
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Synthesis(format!("ElevenLabs body read failed: {}", e)))?;

        Ok(strip_wav_header(audio.to_vec()))
    }

    /// Synthesizes speech using the system's native TTS engine.
    ///
    /// Uses `espeak-ng` as the cross-platform fallback. It outputs WAV to
    /// stdout via `--stdout`; the header is stripped to return raw PCM.
    async fn synthesize_system(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let mut command = Command::new("espeak-ng");
        command
            .arg("--stdout")
            .arg(text)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command
            .spawn()
            .map_err(|e| VoiceError::Synthesis(format!("Failed to spawn espeak-ng: {}", e)))?;

        let output = tokio::time::timeout(SYNTH_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| {
                VoiceError::Synthesis(format!(
                    "System TTS process timed out after {} seconds",
                    SYNTH_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| VoiceError::Synthesis(format!("Failed to wait for espeak-ng: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Synthesis(format!(
                "espeak-ng failed: {}",
                stderr
            )));
        }

        Ok(strip_wav_header(output.stdout))
    }
}

/// Strips the WAV header from container output, returning raw PCM.
/// Payloads too short to carry a header are returned unchanged.
fn strip_wav_header(wav_data: Vec<u8>) -> Vec<u8> {
    if wav_data.len() > WAV_HEADER_BYTES {
        wav_data[WAV_HEADER_BYTES..].to_vec()
    } else {
        wav_data
    }
}
