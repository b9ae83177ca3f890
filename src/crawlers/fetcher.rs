use crate::error::FetchError;
use async_trait::async_trait;
use url::Url;

/// Source of raw listing page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the body of the page at `url`
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}
