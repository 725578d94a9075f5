pub mod client;
pub mod model;
pub mod monitoring;
pub mod normalize;
pub mod server;
pub mod types;

pub use crate::model::*;
