use crate::config::HttpConfig;
use crate::crawlers::PageFetcher;
use crate::error::{CatalogError, FetchError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Upper bound of a single back-off delay
const MAX_BACKOFF_MS: u64 = 30_000;

/// Fetches listing pages over plain HTTP GET
///
/// Transient failures (connection errors, timeouts, 5xx and 429 responses)
/// are retried with exponential back-off.
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl HttpFetcher {
    /// Create a fetcher from HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| CatalogError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        })
    }

    /// Issues a single GET without retrying
    async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                FetchError::new(url.as_str(), format!("unexpected HTTP status {status}"))
                    .with_status(status.as_u16())
                    .transient(is_retriable_status(status)),
            );
        }

        response.text().await.map_err(|e| transport_error(url, &e))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let started = std::time::Instant::now();
        let mut attempt = 0;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => {
                    ::log::debug!(
                        "Fetched {} ({} bytes) in {:.2} seconds",
                        url,
                        body.len(),
                        started.elapsed().as_secs_f64()
                    );
                    return Ok(body);
                }
                Err(err) if err.transient && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(self.retry_backoff_ms, attempt);
                    ::log::warn!(
                        "Fetching {} failed ({}), retry {} of {} in {} ms",
                        url,
                        err.reason,
                        attempt,
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    ::log::error!("Failed to fetch {}: {}", url, err.reason);
                    return Err(err);
                }
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based)
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(16);
    Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

fn is_retriable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn transport_error(url: &Url, error: &reqwest::Error) -> FetchError {
    let transient = error.is_timeout() || error.is_connect();
    let mut fetch_error = FetchError::new(url.as_str(), error.to_string()).transient(transient);
    if let Some(status) = error.status() {
        fetch_error = fetch_error.with_status(status.as_u16());
    }
    fetch_error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay() {
        assert_eq!(backoff_delay(500, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(500, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(500, 3), Duration::from_millis(2000));
        assert_eq!(backoff_delay(500, 10), Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(backoff_delay(0, 4), Duration::ZERO);
    }

    #[test]
    fn test_retriable_status() {
        assert!(is_retriable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retriable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retriable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retriable_status(StatusCode::NOT_FOUND));
        assert!(!is_retriable_status(StatusCode::FORBIDDEN));
    }

    #[test]
    fn test_new_from_default_config() {
        assert!(HttpFetcher::new(&HttpConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_refused_connection_is_transient() {
        // Reserve a local port, then free it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(&HttpConfig {
            max_retries: 0,
            ..HttpConfig::default()
        })
        .unwrap();
        let url = Url::parse(&format!("http://{addr}/ua/effect_pedals")).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(err.transient, "{err}");
        assert_eq!(err.status, None);
    }
}
