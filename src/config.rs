use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LetterboxError, LetterboxResult};

/// Target aspect ratio, parsed from an `"A:B"` string.
///
/// Both components must be finite and positive. The canvas math never uses
/// the raw components directly; it uses [`AspectRatio::factor`], the
/// dimensionless stretch applied to the source's shorter axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    a: f64,
    b: f64,
}

impl AspectRatio {
    /// Parse an `"A:B"` ratio string, e.g. `"16:9"` or `"1:1"`.
    pub fn parse(s: &str) -> LetterboxResult<Self> {
        let (a, b) = s.split_once(':').ok_or_else(|| {
            LetterboxError::config(format!("aspect ratio '{s}' must have the form A:B"))
        })?;
        let a = parse_component(a, s)?;
        let b = parse_component(b, s)?;
        Ok(Self { a, b })
    }

    /// `max(a, b) / min(a, b)`, always `>= 1`.
    ///
    /// The orientation of the output (letterbox vs pillarbox) comes from the
    /// source image itself, not from the order of the components, so `"16:9"`
    /// and `"9:16"` are the same ratio.
    pub fn factor(self) -> f64 {
        if self.a >= self.b {
            self.a / self.b
        } else {
            self.b / self.a
        }
    }
}

fn parse_component(part: &str, whole: &str) -> LetterboxResult<f64> {
    let n: f64 = part.trim().parse().map_err(|_| {
        LetterboxError::config(format!("aspect ratio '{whole}' has a non-numeric component"))
    })?;
    if !n.is_finite() || n <= 0.0 {
        return Err(LetterboxError::config(format!(
            "aspect ratio '{whole}' components must be positive"
        )));
    }
    Ok(n)
}

impl Default for AspectRatio {
    /// `16:9`.
    fn default() -> Self {
        Self { a: 16.0, b: 9.0 }
    }
}

impl FromStr for AspectRatio {
    type Err = LetterboxError;

    fn from_str(s: &str) -> LetterboxResult<Self> {
        Self::parse(s)
    }
}

/// Canvas fill behind the composited source image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Black fill (the default).
    #[default]
    Black,
    /// White fill.
    White,
}

impl Background {
    /// The RGB fill value.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Black => [0, 0, 0],
            Self::White => [255, 255, 255],
        }
    }
}

/// Immutable batch configuration.
///
/// Built once, validated by [`validate`](ProcessorConfig::validate) before
/// any concurrency starts, then shared read-only across workers. `force` and
/// `background` are deliberately independent fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Directory the letterboxed outputs are written under.
    pub output_dir: PathBuf,
    /// Canvas fill color.
    pub background: Background,
    /// Target aspect ratio.
    pub aspect: AspectRatio,
    /// JPEG output quality, 0-100.
    pub quality: u8,
    /// Padding applied as a percentage inflation of both canvas dimensions.
    pub padding_percent: u32,
    /// Maximum number of images processed concurrently, at least 1.
    pub concurrency: usize,
    /// Reprocess items even when their output is already up to date.
    pub force: bool,
}

impl ProcessorConfig {
    /// Configuration with the documented defaults, writing under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            background: Background::Black,
            aspect: AspectRatio::default(),
            quality: 90,
            padding_percent: 0,
            concurrency: default_concurrency(),
            force: false,
        }
    }

    /// Check the numeric ranges. Failures surface as
    /// [`LetterboxError::Config`].
    pub fn validate(&self) -> LetterboxResult<()> {
        if self.quality > 100 {
            return Err(LetterboxError::config(format!(
                "quality {} out of range 0-100",
                self.quality
            )));
        }
        if self.concurrency == 0 {
            return Err(LetterboxError::config("concurrency must be at least 1"));
        }
        Ok(())
    }

    /// Padding as a fraction (`padding_percent / 100`).
    pub fn padding_fraction(&self) -> f64 {
        f64::from(self.padding_percent) / 100.0
    }
}

/// Available parallelism, falling back to 1 when it cannot be determined.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
