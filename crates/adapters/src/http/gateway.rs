//! HTTP gateway - reqwest implementation of `GatewayPort`
//!
//! Talks to the story backend's REST surface with form-encoded bodies,
//! mirroring what the original web client sends. Non-success responses
//! carry a `{"detail": ...}` body whose text becomes the user-facing
//! error message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use storyweave_domain::{Character, CharacterId, ConversationId, Session};
use storyweave_ports::outbound::{
    GatewayError, GatewayPort, ImageUpload, NavDirection, NavPosition, NewConversation, SavedAs,
    SavedConversation, SettingKey,
};

/// Default per-request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Request timeout from the environment, or the default
pub fn request_timeout_ms() -> u64 {
    std::env::var("STORYWEAVE_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS)
}

pub struct HttpGateway {
    base: Url,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(request_timeout_ms()))
            .build()?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, GatewayError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await.map_err(map_reqwest)?;
        check_status(response).await
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<reqwest::Response, GatewayError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(response).await
    }

    async fn put_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<reqwest::Response, GatewayError> {
        let url = self.endpoint(path)?;
        debug!(%url, "PUT");
        let response = self
            .client
            .put(url)
            .form(form)
            .send()
            .await
            .map_err(map_reqwest)?;
        check_status(response).await
    }
}

fn map_reqwest(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(err.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        detail: String,
    }

    let detail = match response.json::<ErrorBody>().await {
        Ok(body) => body.detail,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    Err(GatewayError::server(status.as_u16(), detail))
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}

#[async_trait]
impl GatewayPort for HttpGateway {
    async fn fetch_state(&self) -> Result<Session, GatewayError> {
        let response = self.get("/api/state").await?;
        decode(response).await
    }

    async fn create_conversation(
        &self,
        request: NewConversation,
    ) -> Result<ConversationId, GatewayError> {
        #[derive(Deserialize)]
        struct Created {
            conversation_id: String,
        }

        let response = self
            .post_form(
                "/api/conversation/new",
                &[
                    ("scenario_description", request.scenario_description.as_str()),
                    ("character1_name", request.character1_name.as_str()),
                    (
                        "character1_description",
                        request.character1_description.as_str(),
                    ),
                    ("character2_name", request.character2_name.as_str()),
                    (
                        "character2_description",
                        request.character2_description.as_str(),
                    ),
                ],
            )
            .await?;
        let created: Created = decode(response).await?;
        Ok(ConversationId::new(created.conversation_id))
    }

    async fn add_character(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Character, GatewayError> {
        #[derive(Deserialize)]
        struct Added {
            character: Character,
        }

        let response = self
            .post_form(
                "/api/character/add",
                &[("name", name), ("description", description)],
            )
            .await?;
        let added: Added = decode(response).await?;
        Ok(added.character)
    }

    async fn generate_message(
        &self,
        character_id: Option<&CharacterId>,
    ) -> Result<(), GatewayError> {
        let mut form: Vec<(&str, &str)> = Vec::new();
        if let Some(id) = character_id {
            form.push(("character_id", id.as_str()));
        }
        self.post_form("/api/message/generate", &form).await?;
        Ok(())
    }

    async fn send_manual_message(
        &self,
        character_id: &CharacterId,
        content: &str,
    ) -> Result<(), GatewayError> {
        self.post_form(
            "/api/message/manual",
            &[("character_id", character_id.as_str()), ("content", content)],
        )
        .await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        index: usize,
        content: &str,
        reaction: Option<&str>,
    ) -> Result<(), GatewayError> {
        let path = format!("/api/message/{index}/edit");
        let mut form: Vec<(&str, &str)> = vec![("content", content)];
        if let Some(reaction) = reaction {
            form.push(("reaction", reaction));
        }
        self.put_form(&path, &form).await?;
        Ok(())
    }

    async fn regenerate_last(&self) -> Result<(), GatewayError> {
        self.post_form("/api/message/regenerate", &[]).await?;
        Ok(())
    }

    async fn navigate(&self, direction: NavDirection) -> Result<NavPosition, GatewayError> {
        let response = self
            .post_form("/api/message/navigate", &[("direction", direction.as_wire())])
            .await?;
        decode(response).await
    }

    async fn toggle_setting(&self, setting: SettingKey, value: bool) -> Result<(), GatewayError> {
        let value = if value { "true" } else { "false" };
        self.post_form(
            "/api/settings/toggle",
            &[("setting", setting.as_wire()), ("value", value)],
        )
        .await?;
        Ok(())
    }

    async fn update_scenario(
        &self,
        what_happens_next: Option<&str>,
        never_forget: Option<&str>,
    ) -> Result<(), GatewayError> {
        let mut form: Vec<(&str, &str)> = Vec::new();
        if let Some(next) = what_happens_next {
            form.push(("what_happens_next", next));
        }
        if let Some(never) = never_forget {
            form.push(("never_forget", never));
        }
        self.post_form("/api/scenario/update", &form).await?;
        Ok(())
    }

    async fn save_conversation(&self) -> Result<SavedAs, GatewayError> {
        let response = self.post_form("/api/conversation/save", &[]).await?;
        decode(response).await
    }

    async fn list_conversations(&self) -> Result<Vec<SavedConversation>, GatewayError> {
        #[derive(Deserialize)]
        struct Listing {
            conversations: Vec<SavedConversation>,
        }

        let response = self.get("/api/conversation/list").await?;
        let listing: Listing = decode(response).await?;
        Ok(listing.conversations)
    }

    async fn load_conversation(&self, filename: &str) -> Result<(), GatewayError> {
        self.post_form("/api/conversation/load", &[("filename", filename)])
            .await?;
        Ok(())
    }

    async fn upload_character_image(
        &self,
        character_id: &CharacterId,
        upload: ImageUpload,
    ) -> Result<String, GatewayError> {
        #[derive(Deserialize)]
        struct Uploaded {
            image_path: String,
        }

        let path = format!("/api/character/{}/image", character_id);
        let url = self.endpoint(&path)?;
        let part = multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest)?;
        let response = check_status(response).await?;
        let uploaded: Uploaded = decode(response).await?;
        Ok(uploaded.image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_against_the_base_url() {
        let gateway = HttpGateway::new("http://localhost:8000").expect("gateway");
        let url = gateway.endpoint("/api/message/3/edit").expect("join");
        assert_eq!(url.as_str(), "http://localhost:8000/api/message/3/edit");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(HttpGateway::new("not a url").is_err());
    }

    #[test]
    fn timeout_defaults_when_env_unset() {
        // Unless the variable is set in the environment, the default applies.
        if std::env::var("STORYWEAVE_REQUEST_TIMEOUT_MS").is_err() {
            assert_eq!(request_timeout_ms(), DEFAULT_REQUEST_TIMEOUT_MS);
        }
    }
}
