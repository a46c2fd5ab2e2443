//! Letterbox batch-converts photographs into letterboxed/pillarboxed JPEG
//! outputs of a target aspect ratio, under a bounded-concurrency engine.
//!
//! # Pipeline overview
//!
//! 1. **Configure**: build a [`ProcessorConfig`] (aspect ratio, background,
//!    quality, padding, concurrency ceiling, force flag) and validate it.
//! 2. **Dispatch**: [`Processor::process`] fans the image list out through
//!    [`run_batch`], which admits at most `concurrency` items at a time
//!    (FIFO), aggregates the first failure, and supports cooperative
//!    cancellation via a [`CancellationToken`].
//! 3. **Transform**: each admitted item runs [`convert_image`]: skip
//!    predicate (mtime staleness), then decode → [`compute_layout`] →
//!    background fill → composite → JPEG encode → write.
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No ambient globals**: configuration is an explicit immutable value
//!   shared read-only across workers.
//! - **Fail-fast, drain fully**: a failure stops future admissions but never
//!   interrupts in-flight work; the batch call returns once admitted work
//!   has drained.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken
#![forbid(unsafe_code)]

pub mod batch;
pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod processor;

pub use batch::run_batch;
pub use config::{AspectRatio, Background, ProcessorConfig, default_concurrency};
pub use error::{LetterboxError, LetterboxResult};
pub use layout::{Layout, PlacementRect, compute_layout};
pub use pipeline::{ItemOutcome, convert_image, destination_for, should_skip};
pub use processor::{BatchReport, Processor};
