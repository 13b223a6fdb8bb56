use std::sync::Arc;

use log::debug;
use tokio::task::JoinHandle;

use crate::interface::recast::RecastClient;
use crate::service::dispatch::{dispatch, DispatchOutcome, HandlerRegistry};
use crate::shared::config::ClientConfig;
use crate::shared::entities::ClassificationResult;
use crate::shared::error::nlu::BotError;
use crate::shared::ports::nlu::ClassifierPort;
use crate::shared::utils::mask_pii;

/// Entry point: sends utterances to the classifier and dispatches each
/// response to a caller-built [`HandlerRegistry`].
///
/// The registry is complete before `process` is called, so handlers can never
/// miss a response that arrives early.
///
/// ```no_run
/// use recast_bot::{Bot, HandlerRegistry};
///
/// # async fn run() -> Result<(), recast_bot::BotError> {
/// let bot = Bot::new("my-token")?;
/// let registry = HandlerRegistry::new()
///     .on("flight_booking", |results, user: &String| {
///         println!("{} wants a flight: {}", user, results);
///     })
///     .otherwise(|_, user| println!("{} said something else", user));
/// let outcome = bot.process("book a flight", &registry, &"alice".to_string()).await;
/// println!("{:?}", outcome);
/// # Ok(())
/// # }
/// ```
pub struct Bot<P = RecastClient> {
    classifier: P,
}

impl Bot<RecastClient> {
    /// Builds a bot for the default endpoint. The token is trimmed and must
    /// not be blank.
    pub fn new(token: &str) -> Result<Self, BotError> {
        Ok(Self::with_classifier(RecastClient::with_default_endpoint(
            token,
        )?))
    }

    /// Builds a bot from configuration; `RECAST_TOKEN`/`cfg.token` must be set.
    pub fn with_config(cfg: &ClientConfig) -> Result<Self, BotError> {
        Ok(Self::with_classifier(RecastClient::from_config(cfg, None)?))
    }
}

impl<P: ClassifierPort> Bot<P> {
    pub fn with_classifier(classifier: P) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &P {
        &self.classifier
    }

    /// Classifies `text` without dispatching.
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult, BotError> {
        self.classifier.classify(text.to_string()).await
    }

    /// Classifies `text` and runs the matching handlers from `registry`,
    /// passing `ctx` to whichever handler fires. Failures end in the error
    /// handler or a log line; this never returns an error.
    pub async fn process<C>(
        &self,
        text: &str,
        registry: &HandlerRegistry<C>,
        ctx: &C,
    ) -> DispatchOutcome {
        debug!("[recast] process text={}", mask_pii(text));
        let outcome = self.classify(text).await;
        let dispatched = dispatch(outcome, registry, ctx);
        debug!("[dispatch] outcome={:?}", dispatched);
        dispatched
    }
}

impl<P: ClassifierPort + 'static> Bot<P> {
    /// Detached form of [`process`](Self::process): the request and the
    /// dispatch run on a tokio task that owns the registry and the context.
    pub fn spawn_process<C>(
        self: &Arc<Self>,
        text: impl Into<String>,
        registry: HandlerRegistry<C>,
        ctx: C,
    ) -> JoinHandle<DispatchOutcome>
    where
        C: Send + Sync + 'static,
    {
        let bot = Arc::clone(self);
        let text = text.into();
        tokio::spawn(async move { bot.process(&text, &registry, &ctx).await })
    }
}
