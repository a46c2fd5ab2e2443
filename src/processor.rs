use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::batch::run_batch;
use crate::config::ProcessorConfig;
use crate::error::LetterboxResult;
use crate::pipeline::{ItemOutcome, convert_image};

/// Which items a successful batch processed vs skipped.
///
/// Advisory observability data; the correctness contract of a batch is the
/// single success-or-first-failure outcome of [`Processor::process`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Items whose output was (re)produced.
    pub processed: Vec<PathBuf>,
    /// Items whose existing output was already up to date.
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    /// Total number of items the batch looked at.
    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len()
    }
}

/// Batch image processor: a validated configuration plus the concurrency
/// engine.
pub struct Processor {
    config: Arc<ProcessorConfig>,
}

impl Processor {
    /// Validate `config` and build a processor.
    ///
    /// Validation failures surface as [`LetterboxError::Config`] before any
    /// concurrency starts.
    ///
    /// [`LetterboxError::Config`]: crate::LetterboxError::Config
    pub fn new(config: ProcessorConfig) -> LetterboxResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Letterbox every image in `images`, at most `config.concurrency` at a
    /// time.
    ///
    /// Returns the report of processed vs skipped items on success, the
    /// first per-item failure otherwise. See [`run_batch`] for the admission,
    /// failure, and cancellation semantics.
    pub async fn process(
        &self,
        images: Vec<PathBuf>,
        cancel: &CancellationToken,
    ) -> LetterboxResult<BatchReport> {
        let report = Arc::new(Mutex::new(BatchReport::default()));
        let config = Arc::clone(&self.config);
        let sink = Arc::clone(&report);

        run_batch(
            images,
            self.config.concurrency,
            cancel,
            move |path: PathBuf| {
                let outcome = convert_image(&path, &config)?;
                let mut report = sink.lock().unwrap_or_else(PoisonError::into_inner);
                match outcome {
                    ItemOutcome::Processed => report.processed.push(path),
                    ItemOutcome::Skipped => report.skipped.push(path),
                }
                Ok(())
            },
        )
        .await?;

        let report = Arc::try_unwrap(report)
            .map(|mutex| mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
            .unwrap_or_else(|arc| {
                arc.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            });
        Ok(report)
    }
}
