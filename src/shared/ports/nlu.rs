use std::future::Future;
use std::pin::Pin;

use crate::shared::entities::ClassificationResult;
use crate::shared::error::nlu::BotError;

pub type NluFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Sends one utterance to an intent classification service.
pub trait ClassifierPort: Send + Sync {
    fn classify(&self, text: String) -> NluFuture<Result<ClassificationResult, BotError>>;
}
