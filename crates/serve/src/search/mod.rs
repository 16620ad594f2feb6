//! Search API module

pub mod handlers;
pub mod types;

pub use handlers::handle_search;
pub use types::{ApiError, SearchQuery, SearchResponse, SearchResultItem};
