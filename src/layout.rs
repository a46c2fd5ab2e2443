use serde::{Deserialize, Serialize};

use crate::config::AspectRatio;
use crate::error::{LetterboxError, LetterboxResult};

/// Placement rectangle in canvas pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width, always the source width.
    pub width: u32,
    /// Height, always the source height.
    pub height: u32,
}

/// Canvas dimensions plus the centered placement of the source within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Output canvas width.
    pub canvas_width: u32,
    /// Output canvas height.
    pub canvas_height: u32,
    /// Where the source image lands on the canvas.
    pub placement: PlacementRect,
}

/// Compute the letterbox canvas for a source image.
///
/// The larger source axis is kept fixed and the other axis is derived as
/// `larger * aspect.factor()`, so the canvas always fully contains the source
/// without cropping; whether that produces a letterbox or a pillarbox follows
/// from the source's own orientation. `padding_fraction` then inflates both
/// canvas dimensions proportionally (integer-truncated), and the placement
/// rectangle is centered with integer division, biasing any odd remainder
/// toward the top-left.
pub fn compute_layout(
    source_width: u32,
    source_height: u32,
    aspect: AspectRatio,
    padding_fraction: f64,
) -> LetterboxResult<Layout> {
    if source_width == 0 || source_height == 0 {
        return Err(LetterboxError::config("source dimensions must be non-zero"));
    }
    if !padding_fraction.is_finite() || padding_fraction < 0.0 {
        return Err(LetterboxError::config(
            "padding fraction must be non-negative",
        ));
    }

    let f = aspect.factor();
    let w = f64::from(source_width);
    let h = f64::from(source_height);

    // Aspect step: larger axis fixed, shorter axis stretched by `f`.
    let (canvas_w, canvas_h) = if w > h {
        (source_width, (w * f) as u32)
    } else {
        ((h * f) as u32, source_height)
    };

    // Padding step: proportional inflation of both dimensions, truncated.
    let inflate = 1.0 + padding_fraction;
    let canvas_w = (f64::from(canvas_w) * inflate) as u32;
    let canvas_h = (f64::from(canvas_h) * inflate) as u32;

    let placement = PlacementRect {
        x: canvas_w / 2 - source_width / 2,
        y: canvas_h / 2 - source_height / 2,
        width: source_width,
        height: source_height,
    };

    Ok(Layout {
        canvas_width: canvas_w,
        canvas_height: canvas_h,
        placement,
    })
}
