use crate::config::LiveKitConfig;
use crate::error::VoiceError;
use livekit_api::access_token::{AccessToken, VideoGrants};
use std::time::Duration;

#[derive(Debug)]
pub struct VoiceService {
    config: LiveKitConfig,
}

impl VoiceService {
    pub fn new(config: LiveKitConfig) -> Self {
        if !config.is_complete() {
            tracing::warn!("LiveKit settings incomplete; voice token issuance disabled");
        }
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_complete()
    }

    pub fn get_url(&self) -> &str {
        &self.config.url
    }

    /// Mints a room-join token that lets the participant talk to the agent.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Disabled` when LiveKit is not configured and
    /// `VoiceError::Config` for an empty room or participant.
    pub fn generate_join_token(
        &self,
        room_name: &str,
        participant_identity: &str,
        participant_name: &str,
    ) -> Result<String, VoiceError> {
        if !self.is_enabled() {
            return Err(VoiceError::Disabled);
        }
        if room_name.trim().is_empty() {
            return Err(VoiceError::Config("room name must not be empty".to_string()));
        }
        if participant_identity.trim().is_empty() {
            return Err(VoiceError::Config(
                "participant identity must not be empty".to_string(),
            ));
        }

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(participant_identity)
            .with_name(participant_name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds));

        let jwt = token.to_jwt()?;
        tracing::info!(
            room = room_name,
            participant = participant_identity,
            "issued voice access token"
        );
        Ok(jwt)
    }
}
