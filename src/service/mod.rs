pub mod bot;
pub mod dispatch;

pub use bot::Bot;
pub use dispatch::{dispatch, DispatchOutcome, HandlerRegistry};
