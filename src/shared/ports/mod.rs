pub mod nlu;

pub use nlu::{ClassifierPort, NluFuture};
