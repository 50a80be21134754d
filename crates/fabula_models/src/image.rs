//! Client for GET-templated image generation endpoints.

use crate::excerpt;
use async_trait::async_trait;
use fabula_core::ImageRequest;
use fabula_error::{ConfigError, FabulaResult, HttpError};
use fabula_interface::ImageDriver;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "image-endpoint";

/// Request timeout used when none is configured.
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(60);

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const BROWSER_LANGUAGE: &str = "en-US,en;q=0.5";
const BROWSER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0";

/// Fetches images with `GET {endpoint}?prompt=..&size=..&seed=..&model=..`.
///
/// Requests carry browser-like headers. A non-2xx status is an error; the
/// body of a successful response is returned verbatim.
#[derive(Debug, Clone)]
pub struct ImageEndpointClient {
    client: Client,
    endpoint: Url,
}

impl ImageEndpointClient {
    /// Create a client for `endpoint` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is not a valid URL or the HTTP client
    /// cannot be built.
    #[instrument(skip(timeout), fields(timeout_secs = timeout.as_secs()))]
    pub fn new(endpoint: &str, timeout: Duration) -> FabulaResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ConfigError::new(format!("Invalid image endpoint '{}': {}", endpoint, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_LANGUAGE));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// URL requested for `req`.
    pub fn url_for(&self, req: &ImageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("prompt", req.prompt())
            .append_pair("size", req.size())
            .append_pair("seed", &req.seed().to_string())
            .append_pair("model", req.model());
        url
    }
}

#[async_trait]
impl ImageDriver for ImageEndpointClient {
    #[instrument(skip(self, req), fields(provider = PROVIDER, seed = req.seed(), model = %req.model()))]
    async fn fetch(&self, req: &ImageRequest) -> FabulaResult<Vec<u8>> {
        let url = self.url_for(req);
        debug!(url = %url, "Requesting image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::new(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(HttpError::with_status(status.as_u16(), excerpt(&error_text)).into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::new(format!("Failed to read image body: {}", e)))?;

        debug!(size = bytes.len(), "Received image");
        Ok(bytes.to_vec())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
