use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::shared::error::nlu::BotError;

/// Called with the `results` object of the response and the caller's context.
pub type IntentHandler<C> = Box<dyn Fn(&Value, &C) + Send + Sync>;
/// Called with the failure and the caller's context.
pub type ErrorHandler<C> = Box<dyn Fn(&BotError, &C) + Send + Sync>;

/// Handlers for one `process` call, keyed by intent name.
///
/// Built completely before the request is sent and borrowed by the dispatch
/// pass, so there is no window where a response can observe a half-filled
/// registry. Every builder method consumes and returns the registry to allow
/// chaining.
///
/// ```
/// use recast_bot::service::dispatch::HandlerRegistry;
///
/// let registry: HandlerRegistry<()> = HandlerRegistry::new()
///     .on("greetings", |_results, _ctx| println!("hello"))
///     .otherwise(|_results, _ctx| println!("what?"));
/// assert_eq!(registry.handler_count("greetings"), 1);
/// ```
pub struct HandlerRegistry<C> {
    handlers: HashMap<String, Vec<IntentHandler<C>>>,
    any: Option<IntentHandler<C>>,
    unmatched: Option<IntentHandler<C>>,
    error: Option<ErrorHandler<C>>,
}

impl<C> HandlerRegistry<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            any: None,
            unmatched: None,
            error: None,
        }
    }

    /// Appends a handler for `intent`. Repeated registrations accumulate and
    /// run in the order they were added.
    pub fn on<F>(self, intent: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value, &C) + Send + Sync + 'static,
    {
        self.push(intent.into(), Box::new(handler))
    }

    /// Bulk form of [`on`](Self::on). Entries are registered in iteration
    /// order, so pass an ordered collection when ordering between intents
    /// matters.
    pub fn set_handlers<I, K>(self, handlers: I) -> Self
    where
        I: IntoIterator<Item = (K, IntentHandler<C>)>,
        K: Into<String>,
    {
        handlers
            .into_iter()
            .fold(self, |registry, (intent, handler)| {
                registry.push(intent.into(), handler)
            })
    }

    /// Sets the handler for responses nothing else handled. Last write wins.
    pub fn otherwise<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &C) + Send + Sync + 'static,
    {
        self.unmatched = Some(Box::new(handler));
        self
    }

    /// Sets the catch-all for classified intents without a dedicated handler.
    /// Last write wins.
    pub fn any<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &C) + Send + Sync + 'static,
    {
        self.any = Some(Box::new(handler));
        self
    }

    /// Sets the handler for transport failures and API-reported errors. Last
    /// write wins.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&BotError, &C) + Send + Sync + 'static,
    {
        self.error = Some(Box::new(handler));
        self
    }

    pub fn handler_count(&self, intent: &str) -> usize {
        self.handlers.get(intent).map_or(0, Vec::len)
    }

    pub fn intents(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
            && self.any.is_none()
            && self.unmatched.is_none()
            && self.error.is_none()
    }

    pub(crate) fn handlers_for(&self, intent: &str) -> Option<&[IntentHandler<C>]> {
        self.handlers
            .get(intent)
            .map(Vec::as_slice)
            .filter(|list| !list.is_empty())
    }

    pub(crate) fn any_handler(&self) -> Option<&IntentHandler<C>> {
        self.any.as_ref()
    }

    pub(crate) fn unmatched_handler(&self) -> Option<&IntentHandler<C>> {
        self.unmatched.as_ref()
    }

    pub(crate) fn error_handler(&self) -> Option<&ErrorHandler<C>> {
        self.error.as_ref()
    }

    fn push(mut self, intent: String, handler: IntentHandler<C>) -> Self {
        self.handlers.entry(intent).or_default().push(handler);
        self
    }
}

impl<C> Default for HandlerRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for HandlerRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut intents: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        intents.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("intents", &intents)
            .field("any", &self.any.is_some())
            .field("otherwise", &self.unmatched.is_some())
            .field("on_error", &self.error.is_some())
            .finish()
    }
}
