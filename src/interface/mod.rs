pub mod recast;

pub use recast::RecastClient;
