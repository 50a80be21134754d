//! Retry policies for the Fabula pipeline.
//!
//! Two policies with deliberately different failure behavior:
//!
//! - [`ResilientCompletionClient`] and [`CooldownRetry`] retry text
//!   generation after a fixed cooldown, unbounded unless configured
//!   otherwise. A long pipeline run waits out an outage instead of
//!   abandoning its progress.
//! - [`ResilientAssetGenerator`] retries each image a bounded number of
//!   times with a fixed delay, then surfaces the failure.

mod asset;
mod completion;
mod cooldown;
mod settings;
mod sleeper;

pub use asset::{ResilientAssetGenerator, SEED_RANGE};
pub use completion::ResilientCompletionClient;
pub use cooldown::CooldownRetry;
pub use settings::RetrySettings;
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
