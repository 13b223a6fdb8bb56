pub mod classification;
pub mod credential;

pub use classification::{intent_name, ClassificationResult};
pub use credential::Token;
