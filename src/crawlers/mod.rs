pub mod fetcher;
pub mod traversal;
pub mod web;

pub use fetcher::PageFetcher;
pub use traversal::{Aggregator, Traversal};
pub use web::HttpFetcher;
