use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;

use crate::shared::config::{ClientConfig, DEFAULT_API_URL};
use crate::shared::entities::{ClassificationResult, Token};
use crate::shared::error::nlu::BotError;
use crate::shared::ports::nlu::{ClassifierPort, NluFuture};
use crate::shared::utils::mask_pii;

/// HTTP adapter for the Recast.AI `/request` endpoint.
///
/// One POST per call, text in the query string, no body. The client keeps no
/// state besides the credential and reqwest's connection pool.
#[derive(Clone, Debug)]
pub struct RecastClient {
    client: Client,
    api_url: String,
    token: Token,
}

impl RecastClient {
    pub fn new(token: &str, api_url: impl Into<String>) -> Result<Self, BotError> {
        let token = Token::new(token)?;
        let client = Client::builder()
            .build()
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            token,
        })
    }

    pub fn with_default_endpoint(token: &str) -> Result<Self, BotError> {
        Self::new(token, DEFAULT_API_URL)
    }

    /// Builds a client from configuration, with `token` taking precedence
    /// over the configured one.
    pub fn from_config(cfg: &ClientConfig, token: Option<&str>) -> Result<Self, BotError> {
        let token = token
            .or(cfg.token.as_deref())
            .ok_or(BotError::InvalidToken)?;
        Self::new(token, cfg.api_url.clone())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Performs the request. Non-2xx statuses are not treated specially: the
    /// service reports failures inside the JSON body.
    pub async fn send(&self, text: &str) -> Result<ClassificationResult, BotError> {
        debug!("[recast] POST {} text={}", self.api_url, mask_pii(text));

        let resp = self
            .client
            .post(&self.api_url)
            .query(&[("text", text)])
            .header(AUTHORIZATION, self.token.header_value())
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let status = resp.status();
        debug!("[recast] status={}", status);
        let body: serde_json::Value = resp.json().await.map_err(body_error)?;
        Ok(ClassificationResult::new(body))
    }
}

/// A body that arrived but is not JSON is a decode failure; a connection
/// dropped mid-body stays a transport failure.
fn body_error(err: reqwest::Error) -> BotError {
    if err.is_decode() {
        BotError::Decode(err.to_string())
    } else {
        BotError::Transport(err.to_string())
    }
}

impl ClassifierPort for RecastClient {
    fn classify(&self, text: String) -> NluFuture<Result<ClassificationResult, BotError>> {
        let this = self.clone();
        Box::pin(async move { this.send(&text).await })
    }
}
