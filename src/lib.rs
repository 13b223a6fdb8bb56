pub mod interface;
pub mod service;
pub mod shared;

// Short paths for the common surface.
pub use interface::recast;
pub use service::{bot, dispatch};
pub use shared::{config, entities, error, logging, ports, utils};

pub use interface::RecastClient;
pub use service::{Bot, DispatchOutcome, HandlerRegistry};
pub use shared::entities::{ClassificationResult, Token};
pub use shared::error::BotError;
