//! Bounded-retry image generation.

use fabula_core::ImageRequest;
use fabula_error::{AssetError, AssetErrorKind, BuilderError, FabulaError, FabulaResult};
use fabula_interface::ImageDriver;
use fabula_storage::RunStore;
use rand::Rng;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::strategy::FixedInterval;
use tokio_retry2::{Retry, RetryError};

/// Range the per-image seed is drawn from.
pub const SEED_RANGE: RangeInclusive<u32> = 1000..=1_000_000;

/// Generates images with a bounded, fixed-delay retry per image and saves
/// the payloads through a [`RunStore`].
#[derive(Debug)]
pub struct ResilientAssetGenerator<D, S> {
    driver: D,
    store: S,
    size: String,
    model: String,
}

impl<D: ImageDriver, S: RunStore> ResilientAssetGenerator<D, S> {
    /// Create a generator sending `size` and `model` with every request.
    pub fn new(driver: D, store: S, size: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            driver,
            store,
            size: size.into(),
            model: model.into(),
        }
    }

    /// The wrapped image driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The store payloads are saved to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generate `amount` images for `prompt`.
    ///
    /// Each image gets its own random seed and at most `max_retries`
    /// attempts spaced `retry_delay` apart.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty prompt, zero `amount` or zero
    ///   `max_retries`, before any request is made
    /// - `RetriesExhausted` when every attempt for one image fails
    #[tracing::instrument(
        skip(self, prompt),
        fields(provider = self.driver.provider_name(), prompt_len = prompt.len())
    )]
    pub async fn generate(
        &self,
        prompt: &str,
        amount: u32,
        max_retries: u32,
        retry_delay: Duration,
    ) -> FabulaResult<Vec<Vec<u8>>> {
        if prompt.trim().is_empty() {
            return Err(AssetError::invalid_argument("Prompt cannot be empty").into());
        }
        if amount == 0 {
            return Err(AssetError::invalid_argument("Amount should be greater than 0").into());
        }
        if max_retries == 0 {
            return Err(AssetError::invalid_argument("max_retries should be greater than 0").into());
        }

        let mut images = Vec::new();
        for index in 0..amount {
            let request = ImageRequest::builder()
                .prompt(prompt)
                .size(self.size.as_str())
                .model(self.model.as_str())
                .seed(random_seed())
                .build()
                .map_err(BuilderError::from)?;

            tracing::debug!(image = index + 1, seed = request.seed(), "Requesting image");
            images.push(self.fetch_with_retry(&request, max_retries, retry_delay).await?);
        }

        tracing::info!(count = images.len(), "Generated images");
        Ok(images)
    }

    async fn fetch_with_retry(
        &self,
        request: &ImageRequest,
        max_retries: u32,
        retry_delay: Duration,
    ) -> FabulaResult<Vec<u8>> {
        let attempts = AtomicU32::new(0);
        let strategy = FixedInterval::new(retry_delay).take(max_retries as usize - 1);

        let result = Retry::spawn(strategy, || async {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match self.driver.fetch(request).await {
                Ok(bytes) => Ok(bytes),
                Err(e) => {
                    if attempt < max_retries {
                        tracing::warn!(
                            attempt,
                            max_retries,
                            retry_delay_secs = retry_delay.as_secs(),
                            error = %e,
                            "Image attempt failed, retrying"
                        );
                    }
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
            }
        })
        .await;

        result.map_err(|e: FabulaError| {
            let attempts = attempts.load(Ordering::SeqCst);
            tracing::error!(attempts, error = %e, "Failed to generate image");
            AssetError::new(AssetErrorKind::RetriesExhausted {
                attempts,
                last_error: e.to_string(),
            })
            .into()
        })
    }

    /// Save payloads in order and return the paths written.
    #[tracing::instrument(skip(self, images), fields(count = images.len()))]
    pub async fn save(&self, images: &[Vec<u8>]) -> FabulaResult<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(images.len());
        for image in images {
            paths.push(self.store.save_image(image).await?);
        }
        Ok(paths)
    }
}

fn random_seed() -> u32 {
    rand::thread_rng().gen_range(SEED_RANGE)
}
