use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Deserialize;

use crate::errors::CallError;
use crate::settings::Settings;

/// Fetches the access token a room connect needs.
///
/// Single-shot and asynchronous. Failures surface to the screen as a
/// failed connect and are never retried.
pub trait TokenProvider: Send + Sync {
    fn fetch_access_token<'a>(&'a self, room_name: &'a str)
    -> BoxFuture<'a, Result<String, CallError>>;
}

/// Response from the token service.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Requests tokens from an HTTP token service:
/// `GET <base_url>?identity=<identity>&roomName=<room>` returning
/// `{"token": "..."}`.
pub struct HttpTokenProvider {
    base_url: String,
    identity: String,
    client: reqwest::Client,
}

impl HttpTokenProvider {
    pub fn new(base_url: &str, identity: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            identity: identity.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Uses `token_url` from settings; fails when it is not configured.
    pub fn from_settings(settings: &Settings, identity: &str) -> Result<Self, CallError> {
        let url = settings
            .token_url
            .as_deref()
            .ok_or_else(|| CallError::Settings("token_url is not set".into()))?;
        Ok(Self::new(url, identity))
    }

    fn token_url(&self, room_name: &str) -> String {
        format!(
            "{}?identity={}&roomName={}",
            self.base_url,
            urlencoding::encode(&self.identity),
            urlencoding::encode(room_name)
        )
    }

    async fn request_token(&self, room_name: &str) -> Result<String, CallError> {
        let url = self.token_url(room_name);
        tracing::info!("requesting access token for room {room_name}");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CallError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CallError::Auth(format!(
                "token service returned status {}",
                resp.status()
            )));
        }

        let data: TokenResponse = resp
            .json()
            .await
            .map_err(|e| CallError::Auth(format!("invalid token response: {e}")))?;

        Ok(data.token)
    }
}

impl TokenProvider for HttpTokenProvider {
    fn fetch_access_token<'a>(
        &'a self,
        room_name: &'a str,
    ) -> BoxFuture<'a, Result<String, CallError>> {
        self.request_token(room_name).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_url_encodes_query() {
        let provider = HttpTokenProvider::new("https://tokens.example.com/token/", "Zoë B");
        assert_eq!(
            provider.token_url("stand up"),
            "https://tokens.example.com/token?identity=Zo%C3%AB%20B&roomName=stand%20up"
        );
    }

    #[test]
    fn from_settings_requires_token_url() {
        let err = HttpTokenProvider::from_settings(&Settings::default(), "me").err();
        assert!(matches!(err, Some(CallError::Settings(_))));

        let settings = Settings {
            token_url: Some("https://tokens.example.com".into()),
            ..Settings::default()
        };
        let provider = HttpTokenProvider::from_settings(&settings, "me").unwrap();
        assert_eq!(
            provider.token_url("r1"),
            "https://tokens.example.com?identity=me&roomName=r1"
        );
    }

    #[test]
    fn token_response_parses() {
        let data: TokenResponse = serde_json::from_str(r#"{"token":"abc.def"}"#).unwrap();
        assert_eq!(data.token, "abc.def");
    }
}
