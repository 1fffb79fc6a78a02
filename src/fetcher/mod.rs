pub mod http_fetcher;

use std::time::Duration;

use async_trait::async_trait;

use crate::app::FetchError;

pub use http_fetcher::HttpFetcher;

/// Retrieves the raw results page.
///
/// Implementations make exactly one request per call and never retry; the
/// retry policy lives in the scheduler. An empty or malformed body is still
/// `Ok` and left for the parser to reject.
#[async_trait]
pub trait PageFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}
