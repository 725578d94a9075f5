//! Projection of raw upstream records into canonical DTOs, plus parsing of
//! free-form market references.

pub mod market;
pub mod market_ref;

pub use market::{normalize_market, normalize_market_detail, normalize_search};
pub use market_ref::extract_market_ref;
