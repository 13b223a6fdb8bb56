use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("API token must not be empty")]
    InvalidToken,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Response is not valid JSON: {0}")]
    Decode(String),
    #[error("[Recast.AI API]: {0}")]
    Api(String),
}

impl BotError {
    /// True for failures that happened before a payload could be inspected.
    pub fn is_transport(&self) -> bool {
        matches!(self, BotError::Transport(_) | BotError::Decode(_))
    }
}
