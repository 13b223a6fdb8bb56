pub mod nlu;

pub use nlu::BotError;
