use base64::Engine;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::models::message::{MessageBody, MessageContent, VoiceSource};
use crate::server::config::Config;
use crate::utils::error::{AppError, AppResult};

/// Turns boundary-validated message content into storable content: inline
/// audio is decoded and persisted, and only the asset URL survives. Text and
/// already-stored voice messages pass through.
pub async fn resolve_body(
    config: &Config,
    sender: &str,
    receiver: &str,
    body: MessageBody,
) -> AppResult<MessageContent> {
    match body {
        MessageBody::Text { text } => Ok(MessageContent::Text { text }),
        MessageBody::Voice {
            duration,
            source: VoiceSource::Stored(url),
        } => Ok(MessageContent::Voice { duration, url }),
        MessageBody::Voice {
            duration,
            source: VoiceSource::Inline(data),
        } => {
            let url = store_voice_message(config, sender, receiver, &data).await?;
            Ok(MessageContent::Voice { duration, url })
        }
    }
}

/// Decodes inline base64 audio (with or without a `data:` URI prefix),
/// writes it under the voice-messages directory and returns the absolute
/// URL it will be served from.
pub async fn store_voice_message(
    config: &Config,
    sender: &str,
    receiver: &str,
    encoded: &str,
) -> AppResult<String> {
    let base64_part = encoded.rsplit(',').next().unwrap_or(encoded);

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(base64_part.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid voice message data: {}", e)))?;

    let dir = config.voice_messages_dir();
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create voice directory: {}", e)))?;

    let file_name = format!("{}_{}_{}.wav", sender, receiver, Utc::now().timestamp_millis());
    let path = dir.join(&file_name);

    let mut file = fs::File::create(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create voice file: {}", e)))?;

    file.write_all(&bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write voice file: {}", e)))?;

    tracing::info!(
        "Voice message stored: {} ({} bytes)",
        file_name,
        bytes.len()
    );

    Ok(format!(
        "{}/files/voice_messages/{}",
        config.public_base_url(),
        file_name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_config() -> Config {
        Config::for_tests(std::env::temp_dir().join(format!("pairchat-test-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn inline_audio_is_persisted_and_replaced_by_url() {
        let config = test_config();
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"RIFFfakewav");

        let content = resolve_body(
            &config,
            "alice",
            "bob",
            MessageBody::Voice {
                duration: Some(2.0),
                source: VoiceSource::Inline(format!("data:audio/wav;base64,{}", encoded)),
            },
        )
        .await
        .unwrap();

        let url = content.voice_url().unwrap();
        assert!(url.starts_with("http://127.0.0.1:4000/files/voice_messages/alice_bob_"));

        let file_name = url.rsplit('/').next().unwrap();
        let on_disk = tokio::fs::read(config.voice_messages_dir().join(file_name))
            .await
            .unwrap();
        assert_eq!(on_disk, b"RIFFfakewav");
    }

    #[tokio::test]
    async fn bad_base64_is_a_bad_request() {
        let config = test_config();
        let err = store_voice_message(&config, "alice", "bob", "not base64!!")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn stored_urls_pass_through_untouched() {
        let config = test_config();
        let content = resolve_body(
            &config,
            "alice",
            "bob",
            MessageBody::Voice {
                duration: None,
                source: VoiceSource::Stored("http://example/voice.wav".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(content.voice_url(), Some("http://example/voice.wav"));
    }
}
