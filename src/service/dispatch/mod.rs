//! dispatch モジュール: 分類結果を登録済みハンドラへ振り分ける。
//! - 1 回の応答につき発火するハンドラ群は 1 つだけ。
//! - 失敗はハンドラ呼び出しかログで終わり、呼び出し元へは戻さない。

use log::{debug, error};
use serde_json::Value;

use crate::shared::entities::ClassificationResult;
use crate::shared::error::nlu::BotError;

pub mod registry;

pub use registry::{ErrorHandler, HandlerRegistry, IntentHandler};

/// Which handler group a dispatch pass ended in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handlers registered for the top intent ran.
    Intent { name: String, handlers: usize },
    /// The top intent had no handler, or the top entry had no usable name,
    /// and the catch-all ran.
    CatchAll { name: Option<String> },
    /// The service reported an error in the payload.
    ApiError { handled: bool },
    /// The unmatched handler ran.
    Unmatched,
    /// The request itself failed (transport or undecodable body).
    Failed { handled: bool },
    /// Nothing was registered for this response.
    Dropped,
}

impl DispatchOutcome {
    /// True when a user handler was called.
    pub fn fired(&self) -> bool {
        match self {
            DispatchOutcome::Intent { .. }
            | DispatchOutcome::CatchAll { .. }
            | DispatchOutcome::Unmatched => true,
            DispatchOutcome::ApiError { handled } | DispatchOutcome::Failed { handled } => *handled,
            DispatchOutcome::Dropped => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::ApiError { .. } | DispatchOutcome::Failed { .. }
        )
    }
}

/// Runs the single dispatch pass for one classification outcome.
///
/// Selection order:
/// 1. a failed request goes to the error handler (or the log) and stops;
/// 2. a non-empty intent list goes to the handlers of its first entry, else
///    to the catch-all; later entries are never consulted;
/// 3. a payload without intents that reports an error (or has no `results`)
///    goes to the error handler (or the log);
/// 4. anything not handled above goes to the unmatched handler, if set.
pub fn dispatch<C>(
    outcome: Result<ClassificationResult, BotError>,
    registry: &HandlerRegistry<C>,
    ctx: &C,
) -> DispatchOutcome {
    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            return match registry.error_handler() {
                Some(handler) => {
                    handler(&err, ctx);
                    DispatchOutcome::Failed { handled: true }
                }
                None => {
                    error!("[RecastBot]: {}", err);
                    DispatchOutcome::Failed { handled: false }
                }
            };
        }
    };

    let results = result.results().unwrap_or(&Value::Null);

    if result.has_intents() {
        let name = result.top_intent();
        if let Some(top) = &name {
            if let Some(handlers) = registry.handlers_for(top) {
                for handler in handlers {
                    handler(results, ctx);
                }
                return DispatchOutcome::Intent {
                    name: top.clone(),
                    handlers: handlers.len(),
                };
            }
        }
        if let Some(handler) = registry.any_handler() {
            handler(results, ctx);
            return DispatchOutcome::CatchAll { name };
        }
        match name {
            Some(name) => debug!("[dispatch] no handler for intent {}", name),
            None => debug!("[dispatch] top intent entry has no name"),
        }
    } else if result.has_api_error() {
        let err = BotError::Api(result.message().unwrap_or("unknown error").to_string());
        return match registry.error_handler() {
            Some(handler) => {
                handler(&err, ctx);
                DispatchOutcome::ApiError { handled: true }
            }
            None => {
                error!("{}", err);
                DispatchOutcome::ApiError { handled: false }
            }
        };
    }

    match registry.unmatched_handler() {
        Some(handler) => {
            handler(results, ctx);
            DispatchOutcome::Unmatched
        }
        None => DispatchOutcome::Dropped,
    }
}
