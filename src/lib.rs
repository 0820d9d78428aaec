//! Rust client for the Valyu search and research API.
//!
//! The [`Valyu`] facade exposes search, content extraction, streamed
//! answers, and datasource discovery directly, with deep research tasks and
//! batches behind [`Valyu::deepresearch`] and [`Valyu::batch`]. Per-call
//! methods return typed responses carrying a `success` flag instead of
//! erroring on remote failures; only construction, the wait helpers, and
//! asset downloads return [`Result`].
//!
//! ```no_run
//! use valyu::Valyu;
//!
//! # async fn demo() -> valyu::Result<()> {
//! let valyu = Valyu::from_env()?;
//! let results = valyu
//!     .search("state space models")
//!     .max_num_results(5)
//!     .run()
//!     .await;
//! for hit in &results.results {
//!     println!("{} ({})", hit.title, hit.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod deepresearch;
pub mod errors;
pub mod http;
pub mod normalize;
pub mod polling;
pub mod streaming;
pub mod types;
pub mod validation;
pub mod webhooks;

pub use batch::{BatchClient, BatchCreateBuilder};
pub use client::{
    AnswerBuilder, ContentsBuilder, ContentsOutcome, SearchBuilder, SummaryConfig, Valyu,
    API_KEY_ENV, DEFAULT_BASE_URL,
};
pub use deepresearch::{DeepResearchBuilder, DeepResearchClient};
pub use errors::{Result, ValyuError};
pub use polling::{Disposition, PollOptions, PollSnapshot};
pub use streaming::{AnswerChunk, AnswerStream};
pub use types::*;
pub use validation::{validate_sources, SUPPORTED_COUNTRY_CODES};
pub use webhooks::verify_webhook;
