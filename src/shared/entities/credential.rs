use std::fmt;

use crate::shared::error::nlu::BotError;
use crate::shared::utils::mask_token;

/// API credential, trimmed once at construction and never changed.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(raw: &str) -> Result<Self, BotError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BotError::InvalidToken);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&mask_token(&self.0)).finish()
    }
}
