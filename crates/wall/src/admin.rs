//! Admin API client.
//!
//! Thin bearer-token HTTP client for the moderation endpoints. A 403 means
//! the stored credential is no longer valid; callers clear it and send the
//! operator back through login.

use protocol::admin::{ModerationAction, ModerationRequest, StickerRecord};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("admin session expired, log in again")]
    SessionExpired,

    #[error("admin API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid admin endpoint: {0}")]
    Url(#[from] url::ParseError),
}

pub struct AdminClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl AdminClient {
    pub fn new(base: Url, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            token: token.into(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, AdminError> {
        Ok(self.base.join(path)?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AdminError> {
        match response.status() {
            StatusCode::FORBIDDEN => Err(AdminError::SessionExpired),
            status if status.is_success() => Ok(response),
            status => Err(AdminError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// All sticker records known to the server.
    pub async fn list(&self) -> Result<Vec<StickerRecord>, AdminError> {
        let url = self.endpoint("api/stickers")?;
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Apply a moderation verb to a sticker.
    pub async fn moderate(
        &self,
        sticker_id: &str,
        action: ModerationAction,
        reason: Option<String>,
    ) -> Result<(), AdminError> {
        let url = self.endpoint(&format!("api/stickers/{sticker_id}"))?;
        debug!("POST {url} ({action})");
        let body = ModerationRequest { action, reason };
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Permanently delete a sticker.
    pub async fn delete(&self, sticker_id: &str) -> Result<(), AdminError> {
        let url = self.endpoint(&format!("stickers/{sticker_id}"))?;
        debug!("DELETE {url}");
        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AdminClient {
        AdminClient::new(Url::parse("http://127.0.0.1:8000/").unwrap(), "secret")
    }

    #[test]
    fn endpoints_join_against_the_base() {
        let client = client();
        assert_eq!(
            client.endpoint("api/stickers").unwrap().as_str(),
            "http://127.0.0.1:8000/api/stickers"
        );
        assert_eq!(
            client.endpoint("stickers/abc").unwrap().as_str(),
            "http://127.0.0.1:8000/stickers/abc"
        );
    }

    #[test]
    fn moderation_route_names_the_sticker() {
        let client = client();
        assert_eq!(
            client.endpoint("api/stickers/abc-123").unwrap().as_str(),
            "http://127.0.0.1:8000/api/stickers/abc-123"
        );
    }

    #[test]
    fn base_with_path_prefix_is_respected() {
        let client = AdminClient::new(Url::parse("http://host/wall/").unwrap(), "t");
        assert_eq!(
            client.endpoint("api/stickers").unwrap().as_str(),
            "http://host/wall/api/stickers"
        );
    }
}
