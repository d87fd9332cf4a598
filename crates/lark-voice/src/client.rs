use crate::error::VoiceError;
use crate::stt::TranscriberService;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Default capacity for the per-session transcription broadcast channel.
const DEFAULT_TRANSCRIPTION_BROADCAST_CAPACITY: usize = 256;

/// Event emitted when the tutor hears and transcribes the child's speech.
#[derive(Debug, Clone)]
pub struct TranscriptionEvent {
    pub room_name: String,
    pub speaker_identity: String,
    pub text: String,
}

/// The tutor's presence in a LiveKit room.
///
/// Media transport is the room server's concern; full WebRTC participation
/// lives in the LiveKit client SDK, which this wrapper stands in for. It
/// tracks connection state, accepts PCM for publishing, and turns ingested
/// speech into [`TranscriptionEvent`]s for the conversation router.
#[derive(Debug)]
pub struct TutorRoomClient {
    pub room_url: String,
    pub token: String,
    pub room_name: String,
    pub connected: bool,
    pub transcriber: Arc<TranscriberService>,
    pub transcription_tx: broadcast::Sender<TranscriptionEvent>,
}

impl TutorRoomClient {
    /// Connects the tutor to a LiveKit room with a join token.
    pub async fn connect(
        url: &str,
        token: &str,
        room_name: &str,
        transcriber: Arc<TranscriberService>,
    ) -> Result<Self, VoiceError> {
        info!(
            "Tutor connecting to room '{}' at '{}' with token length {}",
            room_name,
            url,
            token.len()
        );

        // Connection handshake latency stand-in.
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let (tx, _) = broadcast::channel(DEFAULT_TRANSCRIPTION_BROADCAST_CAPACITY);

        Ok(Self {
            room_url: url.to_string(),
            token: token.to_string(),
            room_name: room_name.to_string(),
            connected: true,
            transcriber,
            transcription_tx: tx,
        })
    }

    /// Publishes PCM audio data to the room.
    pub async fn publish_audio(&self, pcm_data: &[u8]) -> Result<(), VoiceError> {
        if !self.connected {
            return Err(VoiceError::RoomService(
                "Tutor is not connected to a room".to_string(),
            ));
        }

        info!(
            "Publishing {} bytes of audio to room '{}'",
            pcm_data.len(),
            self.room_name
        );

        Ok(())
    }

    pub async fn disconnect(&mut self) {
        if self.connected {
            info!("Tutor disconnecting from room '{}'", self.room_name);
            self.connected = false;
        }
    }

    /// Feeds audio heard from a speaker through transcription and broadcasts
    /// the result. Triggered by incoming audio frames from the room.
    pub async fn ingest_audio(&self, audio: &[u8], speaker: &str) -> Result<(), VoiceError> {
        if !self.connected {
            return Err(VoiceError::RoomService(
                "Tutor is not connected to a room".to_string(),
            ));
        }

        info!(
            "Heard {} bytes from '{}' in room '{}'",
            audio.len(),
            speaker,
            self.room_name
        );

        let text = self.transcriber.transcribe(audio).await?;

        let event = TranscriptionEvent {
            room_name: self.room_name.clone(),
            speaker_identity: speaker.to_string(),
            text,
        };

        // Receivers may come and go; a send with no subscribers is fine.
        let _ = self.transcription_tx.send(event);

        Ok(())
    }

    /// Subscribes to transcription events from this client.
    pub fn subscribe_transcriptions(&self) -> broadcast::Receiver<TranscriptionEvent> {
        self.transcription_tx.subscribe()
    }
}
