use crate::domain::credentials::{Credentials, TokenPair};
use crate::domain::error::{DomainError, DomainResult, RemoteError};
use crate::domain::row::Row;
use crate::domain::services::bookmark_api::BookmarkApi;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::proxy::model::{
    error_message, AddRequest, AddResponse, AuthenticateRequest, AuthenticateResponse,
};
use async_trait::async_trait;
use reqwest::Response;
use std::time::Duration;
use tracing::{debug, instrument, trace};
use url::Url;

pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const ADD_TIMEOUT: Duration = Duration::from_secs(120);

/// [`BookmarkApi`] over the proxy's `POST /authenticate` and `POST /add`.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    base_url: String,
    client: reqwest::Client,
    auth_timeout: Duration,
    add_timeout: Duration,
}

impl ProxyClient {
    pub fn new<S: Into<String>>(base_url: S) -> DomainResult<Self> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url).map_err(|e| {
            DomainError::Configuration(format!("Invalid proxy URL '{}': {}", base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::Configuration(format!(
                "Proxy URL must be http or https: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InfrastructureError::from)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            auth_timeout: AUTH_TIMEOUT,
            add_timeout: ADD_TIMEOUT,
        })
    }

    pub fn with_timeouts(mut self, auth_timeout: Duration, add_timeout: Duration) -> Self {
        self.auth_timeout = auth_timeout;
        self.add_timeout = add_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn failure_text(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    })
}

#[async_trait]
impl BookmarkApi for ProxyClient {
    #[instrument(skip(self, credentials), fields(user = %credentials.identifier))]
    async fn authenticate(&self, credentials: &Credentials) -> DomainResult<TokenPair> {
        let request = AuthenticateRequest {
            username: &credentials.identifier,
            password: &credentials.secret,
        };

        let response = self
            .client
            .post(self.endpoint("authenticate"))
            .timeout(self.auth_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::AuthenticationFailed(InfrastructureError::from(e).to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = failure_text(response).await;
            return Err(DomainError::AuthenticationFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        let body: AuthenticateResponse = response.json().await.map_err(|e| {
            DomainError::AuthenticationFailed(format!("Malformed response: {}", e))
        })?;
        trace!("Authenticate response success={}", body.success);

        if !body.success {
            return Err(DomainError::AuthenticationFailed(
                body.error
                    .unwrap_or_else(|| "Credentials rejected".to_string()),
            ));
        }

        match (body.token, body.token_secret) {
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
                debug!("Received token pair");
                Ok(TokenPair::new(token, secret))
            }
            _ => Err(DomainError::AuthenticationFailed(
                "Response did not contain a token pair".to_string(),
            )),
        }
    }

    #[instrument(level = "debug", skip(self, tokens, row), fields(url = %row.url))]
    async fn add_bookmark(&self, tokens: &TokenPair, row: &Row) -> Result<(), RemoteError> {
        let request = AddRequest {
            token: &tokens.token,
            token_secret: &tokens.token_secret,
            url: &row.url,
            title: &row.title,
            status: row.article_status().as_str(),
        };

        let response = self
            .client
            .post(self.endpoint("add"))
            .timeout(self.add_timeout)
            .json(&request)
            .send()
            .await
            .map_err(InfrastructureError::from)?;

        let status = response.status();
        if !status.is_success() {
            let message = failure_text(response).await;
            return Err(RemoteError::from_status(status.as_u16(), message));
        }

        let body: AddResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::MalformedResponse(e.to_string()))?;

        if body.success {
            Ok(())
        } else {
            Err(RemoteError::Failed(
                body.error
                    .unwrap_or_else(|| "Remote service rejected the article".to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_trailing_slash_when_new_then_endpoint_is_normalised() {
        let client = ProxyClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.endpoint("add"), "http://localhost:3000/add");
    }

    #[test]
    fn given_invalid_proxy_url_when_new_then_configuration_error() {
        let err = ProxyClient::new("not a url").unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));

        let err = ProxyClient::new("ftp://proxy.example.com").unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }
}
